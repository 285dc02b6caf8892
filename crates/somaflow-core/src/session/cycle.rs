use serde::{Deserialize, Serialize};

use crate::technique::Pattern;

/// One named segment of a breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::HoldIn => "Hold in",
            Phase::Exhale => "Exhale",
            Phase::HoldOut => "Hold out",
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Phase::HoldIn | Phase::HoldOut)
    }

    /// Frame sub-range of the breathing animation played during this phase.
    pub fn animation_range(&self) -> AnimationRange {
        match self {
            Phase::Inhale => AnimationRange { from: 0, to: 100 },
            Phase::HoldIn => AnimationRange { from: 100, to: 100 },
            Phase::Exhale => AnimationRange { from: 100, to: 0 },
            Phase::HoldOut => AnimationRange { from: 0, to: 0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationRange {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStep {
    pub phase: Phase,
    pub duration_secs: u32,
}

/// Ordered phases of one breath, zero-duration phases removed.
///
/// Only [`BreathCycle::from_pattern`] builds one, so no step is ever zero
/// seconds long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreathCycle {
    steps: Vec<PhaseStep>,
}

impl BreathCycle {
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let steps = [
            (Phase::Inhale, pattern.inhale),
            (Phase::HoldIn, pattern.hold),
            (Phase::Exhale, pattern.exhale),
            (Phase::HoldOut, pattern.hold2),
        ]
        .into_iter()
        .filter(|&(_, secs)| secs > 0)
        .map(|(phase, duration_secs)| PhaseStep { phase, duration_secs })
        .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[PhaseStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<PhaseStep> {
        self.steps.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Seconds taken by one full pass through the cycle.
    pub fn period_secs(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration_secs)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique::{Technique, TechniqueName};
    use proptest::prelude::*;

    fn phases(name: TechniqueName) -> Vec<Phase> {
        BreathCycle::from_pattern(&Technique::lookup(name).pattern)
            .steps()
            .iter()
            .map(|s| s.phase)
            .collect()
    }

    #[test]
    fn resonant_has_no_holds() {
        assert_eq!(phases(TechniqueName::Resonant), vec![Phase::Inhale, Phase::Exhale]);
    }

    #[test]
    fn four_seven_eight_has_no_hold_out() {
        assert_eq!(
            phases(TechniqueName::FourSevenEight),
            vec![Phase::Inhale, Phase::HoldIn, Phase::Exhale]
        );
    }

    #[test]
    fn box_breathing_has_all_four() {
        assert_eq!(
            phases(TechniqueName::BoxBreathing),
            vec![Phase::Inhale, Phase::HoldIn, Phase::Exhale, Phase::HoldOut]
        );
        let cycle = BreathCycle::from_pattern(&Technique::lookup(TechniqueName::BoxBreathing).pattern);
        assert_eq!(cycle.period_secs(), 16);
    }

    #[test]
    fn labels_match_display_text() {
        assert_eq!(Phase::HoldIn.label(), "Hold in");
        assert_eq!(Phase::HoldOut.label(), "Hold out");
        assert!(Phase::HoldOut.is_hold());
        assert!(!Phase::Exhale.is_hold());
    }

    proptest! {
        #[test]
        fn cycle_never_contains_zero_duration(
            inhale in 0u32..20, hold in 0u32..20, exhale in 0u32..20, hold2 in 0u32..20
        ) {
            let pattern = Pattern { inhale, hold, exhale, hold2 };
            let cycle = BreathCycle::from_pattern(&pattern);
            let non_zero = [inhale, hold, exhale, hold2].iter().filter(|&&d| d > 0).count();
            prop_assert_eq!(cycle.len(), non_zero);
            prop_assert!(cycle.steps().iter().all(|s| s.duration_secs > 0));
            prop_assert_eq!(cycle.period_secs(), u64::from(inhale + hold + exhale + hold2));
        }
    }
}
