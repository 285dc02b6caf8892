use somaflow_core::storage::{Settings, SqliteStore};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let settings = Settings::load_or_default(&store);

    println!("Welcome to SomaFlow");
    println!("Breathing exercises for inner peace and balance");
    println!();
    println!(
        "{} minute {} technique",
        settings.duration_minutes, settings.technique
    );
    println!("Run `somaflow breathe` to begin.");
    Ok(())
}
