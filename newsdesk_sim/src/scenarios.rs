//! Named panel presets.

use newsdesk_core::SimulationConfig;
use newsdesk_env::{EnvError, RandomSource, ScriptedRandom, SeededRandom, SystemRandom};
use std::sync::Arc;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Default panel: 4 commentators, 5 questions, occasional breaking news
    Panel,

    /// Two commentators who both answer a single question in exactly 1s
    AllAnswer,

    /// One commentator who never answers
    SilentPanel,

    /// Frequent, short breaking news over a talkative panel
    NewsStorm,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Panel,
            ScenarioId::AllAnswer,
            ScenarioId::SilentPanel,
            ScenarioId::NewsStorm,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Panel => "panel",
            ScenarioId::AllAnswer => "all_answer",
            ScenarioId::SilentPanel => "silent_panel",
            ScenarioId::NewsStorm => "news_storm",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Panel => "4 commentators, 5 questions, p=0.75, t=3, b=0.05",
            ScenarioId::AllAnswer => "2 commentators answer 1 question, 1s each, no news",
            ScenarioId::SilentPanel => "1 commentator passes on 1 question, no news",
            ScenarioId::NewsStorm => "3 commentators, 3 questions, b=0.5 with 2s holds",
        }
    }

    /// Returns true if the scenario replays a fixed script instead of a seed.
    pub fn is_scripted(&self) -> bool {
        matches!(self, ScenarioId::AllAnswer | ScenarioId::SilentPanel)
    }

    /// Returns the scenario's parameters at broadcast pace.
    pub fn config(&self) -> SimulationConfig {
        match self {
            ScenarioId::Panel => SimulationConfig::default(),
            ScenarioId::AllAnswer => SimulationConfig::new(2, 1, 1.0, 1.0, 0.0),
            ScenarioId::SilentPanel => SimulationConfig::new(1, 1, 0.0, 3.0, 0.0),
            ScenarioId::NewsStorm => {
                SimulationConfig::new(3, 3, 0.9, 4.0, 0.5).with_news_hold_secs(2.0)
            }
        }
    }

    /// Builds the random source for this scenario.
    ///
    /// Scripted scenarios ignore the seed. Otherwise seed 0 draws from OS
    /// entropy and any other seed is reproducible.
    pub fn random(&self, seed: u64) -> Result<Arc<dyn RandomSource>, EnvError> {
        let random: Arc<dyn RandomSource> = match self {
            ScenarioId::AllAnswer => Arc::new(ScriptedRandom::new(vec![0.0, 0.0, 0.0])?),
            ScenarioId::SilentPanel => Arc::new(ScriptedRandom::constant(0.5)?),
            ScenarioId::Panel | ScenarioId::NewsStorm if seed == 0 => SystemRandom::shared(),
            ScenarioId::Panel | ScenarioId::NewsStorm => SeededRandom::shared(seed),
        };
        Ok(random)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "panel" | "default" => Ok(ScenarioId::Panel),
            "all_answer" | "allanswer" => Ok(ScenarioId::AllAnswer),
            "silent_panel" | "silentpanel" | "silent" => Ok(ScenarioId::SilentPanel),
            "news_storm" | "newsstorm" | "storm" => Ok(ScenarioId::NewsStorm),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert_eq!(scenario.to_string(), scenario.name());
        }
        assert_eq!("STORM".parse::<ScenarioId>(), Ok(ScenarioId::NewsStorm));
        assert!("chaos".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_every_preset_is_valid() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.config().validate(), Ok(()), "{}", scenario);
            assert!(scenario.random(42).is_ok());
        }
    }

    #[test]
    fn test_seed_selection() {
        assert_eq!(ScenarioId::Panel.random(42).unwrap().seed(), 42);
        assert_eq!(ScenarioId::Panel.random(0).unwrap().seed(), 0);
        assert_eq!(ScenarioId::AllAnswer.random(42).unwrap().seed(), 0);
        assert!(ScenarioId::AllAnswer.is_scripted());
        assert!(!ScenarioId::NewsStorm.is_scripted());
    }

    #[test]
    fn test_all_answer_draws() {
        let random = ScenarioId::AllAnswer.random(1).unwrap();
        assert_eq!(random.next_unit(), 0.0);
        assert_eq!(ScenarioId::AllAnswer.config().max_speak_secs, 1.0);
    }
}
