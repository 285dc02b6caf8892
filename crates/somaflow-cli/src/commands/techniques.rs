use serde::Serialize;
use somaflow_core::{BreathCycle, Pattern, Technique, TechniqueName};

#[derive(Serialize)]
struct TechniqueView {
    name: TechniqueName,
    description: &'static str,
    pattern: Pattern,
    phases: Vec<&'static str>,
    cycle_secs: u64,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let views: Vec<TechniqueView> = Technique::all()
        .iter()
        .map(|t| {
            let cycle = BreathCycle::from_pattern(&t.pattern);
            TechniqueView {
                name: t.name,
                description: t.description,
                pattern: t.pattern,
                phases: cycle.steps().iter().map(|s| s.phase.label()).collect(),
                cycle_secs: cycle.period_secs(),
            }
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}
