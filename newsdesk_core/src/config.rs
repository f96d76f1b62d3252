//! Simulation parameters.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable parameters of one panel simulation.
///
/// Times are expressed in *simulated seconds*; `pace` is the wall-clock
/// length of one simulated second, so a test can run the real threaded
/// protocol at a fraction of broadcast speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of commentators on the panel (N)
    pub participants: usize,

    /// Number of questions the moderator asks (Q)
    pub questions: usize,

    /// Probability that a commentator answers a question (p)
    pub answer_probability: f64,

    /// Longest possible speech in simulated seconds (t, at least 1)
    pub max_speak_secs: f64,

    /// Probability of breaking news per tick (b)
    pub news_probability: f64,

    /// Interval between breaking-news samples in simulated seconds
    pub tick_interval_secs: f64,

    /// How long breaking news stays on air in simulated seconds
    pub news_hold_secs: f64,

    /// Wall-clock length of one simulated second
    pub pace: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            participants: 4,
            questions: 5,
            answer_probability: 0.75,
            max_speak_secs: 3.0,
            news_probability: 0.05,
            tick_interval_secs: 1.0,
            news_hold_secs: 5.0,
            pace: Duration::from_secs(1),
        }
    }
}

impl SimulationConfig {
    /// Creates a config with the five panel parameters and default pacing.
    pub fn new(
        participants: usize,
        questions: usize,
        answer_probability: f64,
        max_speak_secs: f64,
        news_probability: f64,
    ) -> Self {
        Self {
            participants,
            questions,
            answer_probability,
            max_speak_secs,
            news_probability,
            ..Self::default()
        }
    }

    /// Sets the number of commentators.
    pub fn with_participants(mut self, participants: usize) -> Self {
        self.participants = participants;
        self
    }

    /// Sets the number of questions.
    pub fn with_questions(mut self, questions: usize) -> Self {
        self.questions = questions;
        self
    }

    /// Sets the answer probability.
    pub fn with_answer_probability(mut self, p: f64) -> Self {
        self.answer_probability = p;
        self
    }

    /// Sets the maximum speak duration.
    pub fn with_max_speak_secs(mut self, secs: f64) -> Self {
        self.max_speak_secs = secs;
        self
    }

    /// Sets the breaking-news probability per tick.
    pub fn with_news_probability(mut self, b: f64) -> Self {
        self.news_probability = b;
        self
    }

    /// Sets the breaking-news sampling interval.
    pub fn with_tick_interval_secs(mut self, secs: f64) -> Self {
        self.tick_interval_secs = secs;
        self
    }

    /// Sets the breaking-news hold.
    pub fn with_news_hold_secs(mut self, secs: f64) -> Self {
        self.news_hold_secs = secs;
        self
    }

    /// Sets the wall-clock length of one simulated second.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Checks every parameter against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participants == 0 {
            return Err(ConfigError::NoParticipants);
        }
        if self.questions == 0 {
            return Err(ConfigError::NoQuestions);
        }
        check_probability("answer probability", self.answer_probability)?;
        check_probability("breaking news probability", self.news_probability)?;
        if !self.max_speak_secs.is_finite() || self.max_speak_secs < 1.0 {
            return Err(ConfigError::SpeakDurationTooShort(self.max_speak_secs));
        }
        if !self.tick_interval_secs.is_finite() || self.tick_interval_secs <= 0.0 {
            return Err(ConfigError::InvalidInterval {
                name: "tick interval",
                value: self.tick_interval_secs,
            });
        }
        if !self.news_hold_secs.is_finite() || self.news_hold_secs < 0.0 {
            return Err(ConfigError::InvalidInterval {
                name: "news hold",
                value: self.news_hold_secs,
            });
        }
        if self.pace.is_zero() {
            return Err(ConfigError::ZeroPace);
        }
        self.check_representable("maximum speak duration", self.max_speak_secs)?;
        self.check_representable("tick interval", self.tick_interval_secs)?;
        self.check_representable("news hold", self.news_hold_secs)?;
        Ok(())
    }

    // `scaled` multiplies through `Duration::mul_f64`, which panics past `Duration::MAX`.
    fn check_representable(&self, name: &'static str, secs: f64) -> Result<(), ConfigError> {
        match Duration::try_from_secs_f64(secs * self.pace.as_secs_f64()) {
            Ok(_) => Ok(()),
            Err(_) => Err(ConfigError::InvalidInterval { name, value: secs }),
        }
    }

    /// Draws a speech length uniformly on `[1, t]` from a unit sample.
    pub fn speak_secs(&self, unit: f64) -> f64 {
        1.0 + (self.max_speak_secs - 1.0) * unit
    }

    /// Converts simulated seconds to wall-clock time.
    ///
    /// Only meaningful on a validated config; negative input saturates to zero.
    pub fn scaled(&self, secs: f64) -> Duration {
        self.pace.mul_f64(secs.max(0.0))
    }

    /// Wall-clock interval between breaking-news samples.
    pub fn tick_interval(&self) -> Duration {
        self.scaled(self.tick_interval_secs)
    }

    /// Wall-clock breaking-news hold.
    pub fn news_hold(&self) -> Duration {
        self.scaled(self.news_hold_secs)
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}
