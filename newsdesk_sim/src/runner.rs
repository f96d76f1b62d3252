//! Simulation runner - starts the panel threads, drives breaking-news ticks,
//! and joins everything cooperatively.
//!
//! # Threads
//!
//! ```text
//!   caller ── tick loop ──► BreakingNewsController::try_trigger
//!     │
//!     ├── "news"          BreakingNewsController::run
//!     ├── "commentator-i" CommentatorAgent::run      (×N)
//!     └── "moderator"     TurnCoordinator::run
//! ```
//!
//! The tick loop ends when the moderator closes the panel (which closes the
//! interrupt signal the loop sleeps on) or when a panel thread exits early.

use crate::error::SimError;
use crate::exporter::SimulationReport;
use newsdesk_core::delay::{self, Wake};
use newsdesk_core::{CommentatorAgent, ProtocolViolation, SimulationConfig, Studio, TurnCoordinator};
use newsdesk_env::{CommentatorId, RandomSource};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

type AgentHandle = JoinHandle<Result<usize, ProtocolViolation>>;

/// One threaded panel run.
pub struct Simulation {
    studio: Arc<Studio>,
    random: Arc<dyn RandomSource>,
}

impl Simulation {
    /// Validates the config and prepares a fresh studio.
    pub fn new(config: SimulationConfig, random: Arc<dyn RandomSource>) -> Result<Self, SimError> {
        let studio = Studio::shared(config)?;
        Ok(Self { studio, random })
    }

    /// The shared studio, for observing a run from outside.
    pub fn studio(&self) -> Arc<Studio> {
        Arc::clone(&self.studio)
    }

    /// Runs the panel to completion and returns its report.
    pub fn run(self) -> Result<SimulationReport, SimError> {
        let config = self.studio.config().clone();
        info!(
            "Starting panel: {} commentators, {} questions, p={}, t={}, b={} (seed={})",
            config.participants,
            config.questions,
            config.answer_probability,
            config.max_speak_secs,
            config.news_probability,
            self.random.seed()
        );

        let started = Instant::now();

        let mut crew = Crew::default();
        if let Err(err) = self.spawn_crew(&mut crew) {
            self.studio.shutdown();
            // Whatever did start still has to be joined.
            let _ = crew.join();
            return Err(err);
        }

        let ticks = self.drive_ticks(&crew);
        let rounds_completed = crew.join()?;

        let report = SimulationReport {
            scenario: None,
            seed: self.random.seed(),
            config,
            rounds_completed,
            ticks,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            events: self.studio.journal().entries(),
        };
        info!(
            "Panel closed after {} questions: {} answers, {} skips, {} cut short, {} breaking news",
            report.rounds_completed,
            report.answers(),
            report.skips(),
            report.cut_short(),
            report.news_activations()
        );
        Ok(report)
    }

    fn spawn_crew(&self, crew: &mut Crew) -> Result<(), SimError> {
        let studio = Arc::clone(&self.studio);
        crew.news = Some(spawn("news".to_string(), move || {
            studio.news().run(studio.as_ref())
        })?);

        for id in CommentatorId::all(self.studio.config().participants) {
            let agent = CommentatorAgent::new(id, Arc::clone(&self.studio), Arc::clone(&self.random));
            let name = format!("commentator-{}", id.index());
            let handle = spawn(name.clone(), move || agent.run())?;
            crew.agents.push((name, handle));
        }

        let mut coordinator = TurnCoordinator::new(Arc::clone(&self.studio));
        crew.moderator = Some(spawn("moderator".to_string(), move || coordinator.run())?);
        Ok(())
    }

    /// Samples for breaking news once per tick until the panel closes.
    ///
    /// Returns the number of ticks run.
    fn drive_ticks(&self, crew: &Crew) -> u64 {
        let config = self.studio.config();
        let news = self.studio.news();
        let mut ticks = 0;

        loop {
            if crew.lost_member() {
                if !self.studio.is_over() {
                    warn!("a panel thread exited before the panel closed; stopping");
                    self.studio.shutdown();
                }
                break;
            }
            if self.studio.is_over() {
                break;
            }

            // A zero probability never samples, so scripted draws stay with the panel.
            if config.news_probability > 0.0 && !news.is_active() {
                let draw = self.random.next_unit();
                if draw < config.news_probability && news.try_trigger() {
                    debug!("tick {}: breaking news triggered (draw={:.3})", ticks, draw);
                }
            }
            ticks += 1;

            if delay::sleep(news.interrupt(), config.tick_interval()) == Wake::Closed {
                break;
            }
        }
        debug!("tick loop stopped after {} ticks", ticks);
        ticks
    }
}

/// Handles of every thread a run started.
#[derive(Default)]
struct Crew {
    news: Option<JoinHandle<()>>,
    agents: Vec<(String, AgentHandle)>,
    moderator: Option<AgentHandle>,
}

impl Crew {
    /// True once any panel thread has exited.
    fn lost_member(&self) -> bool {
        self.moderator.as_ref().is_some_and(|h| h.is_finished())
            || self.agents.iter().any(|(_, h)| h.is_finished())
    }

    /// Joins every thread. Returns the moderator's round count, or the first
    /// failure seen.
    fn join(self) -> Result<usize, SimError> {
        let mut first_error: Option<SimError> = None;
        let mut keep = |err: SimError| {
            if first_error.is_none() {
                first_error = Some(err);
            }
        };

        let mut rounds = 0;
        if let Some(handle) = self.moderator {
            match handle.join() {
                Ok(Ok(completed)) => rounds = completed,
                Ok(Err(violation)) => keep(violation.into()),
                Err(_) => keep(SimError::AgentPanicked("moderator".to_string())),
            }
        }
        for (name, handle) in self.agents {
            match handle.join() {
                Ok(Ok(_)) => {}
                Ok(Err(violation)) => keep(violation.into()),
                Err(_) => keep(SimError::AgentPanicked(name)),
            }
        }
        if let Some(handle) = self.news {
            if handle.join().is_err() {
                keep(SimError::AgentPanicked("news".to_string()));
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(rounds),
        }
    }
}

fn spawn<T, F>(name: String, f: F) -> Result<JoinHandle<T>, SimError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .map_err(|source| SimError::Spawn { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use newsdesk_core::PanelEvent;
    use newsdesk_env::{ScriptedRandom, SeededRandom};
    use std::time::Duration;

    fn scripted(values: Vec<f64>) -> Arc<dyn RandomSource> {
        Arc::new(ScriptedRandom::new(values).unwrap())
    }

    fn fast(config: SimulationConfig) -> SimulationConfig {
        config.with_pace(Duration::from_millis(10))
    }

    #[test]
    fn test_two_answering_commentators_one_round() {
        let config = fast(SimulationConfig::new(2, 1, 1.0, 1.0, 0.0));
        let report = Simulation::new(config, scripted(vec![0.0, 0.0, 0.0]))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(report.rounds_completed, 1);
        assert_eq!(report.answers(), 2);
        assert_eq!(report.skips(), 0);
        assert_eq!(report.finished_speeches(), 2);
        assert_eq!(report.news_activations(), 0);
        assert_eq!(report.speaking_order(1), report.queue_order(1));

        let durations: Vec<f64> = report
            .events
            .iter()
            .filter_map(|entry| match entry.event {
                PanelEvent::Speaking { seconds, .. } => Some(seconds),
                _ => None,
            })
            .collect();
        assert_eq!(durations, vec![1.0, 1.0]);

        // One simulated second at 10ms pace
        let spoken: Vec<u64> = report
            .events
            .iter()
            .filter_map(|entry| match entry.event {
                PanelEvent::Finished { spoke_ms, .. } => Some(spoke_ms),
                _ => None,
            })
            .collect();
        assert_eq!(spoken.len(), 2);
        for spoke_ms in spoken {
            assert!(spoke_ms >= 10);
            assert_abs_diff_eq!(spoke_ms as f64, 10.0, epsilon = 5.0);
        }
        assert_eq!(
            report.events.last().map(|e| &e.event),
            Some(&PanelEvent::GameOver { rounds: 1 })
        );
    }

    #[test]
    fn test_clock_starts_with_first_question() {
        let config = fast(SimulationConfig::new(2, 1, 0.0, 1.0, 0.0));
        let simulation = Simulation::new(config, scripted(vec![0.5])).unwrap();
        let studio = simulation.studio();
        assert!(!studio.clock().is_started());

        let report = simulation.run().unwrap();
        assert!(studio.clock().is_started());
        assert_eq!(report.events[0].event, PanelEvent::QuestionAsked { question: 1 });
        assert!(report.events[0].at.as_millis() < 5);
    }

    #[test]
    fn test_single_silent_commentator_is_acknowledged() {
        let config = fast(SimulationConfig::new(1, 1, 0.0, 3.0, 0.0));
        let report = Simulation::new(config, scripted(vec![0.3])).unwrap().run().unwrap();

        let events: Vec<_> = report.events.iter().map(|e| e.event.clone()).collect();
        assert_eq!(
            events,
            vec![
                PanelEvent::QuestionAsked { question: 1 },
                PanelEvent::Skipped {
                    commentator: CommentatorId(0),
                    question: 1
                },
                PanelEvent::SkipAcknowledged {
                    commentator: CommentatorId(0),
                    question: 1
                },
                PanelEvent::GameOver { rounds: 1 },
            ]
        );
    }

    #[test]
    fn test_speaking_order_matches_queue_order_every_round() {
        let config = fast(SimulationConfig::new(4, 3, 0.6, 2.0, 0.0));
        let report = Simulation::new(config, Arc::new(SeededRandom::new(11)))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(report.rounds_completed, 3);
        assert_eq!(report.answers() + report.skips(), 12);
        for question in 1..=3 {
            assert_eq!(report.speaking_order(question), report.queue_order(question));
        }
    }

    #[test]
    fn test_breaking_news_cuts_speaker_short() {
        // Decision draw 0.99 < p = 1.0; speech lasts 1 + 9 * 0.99 simulated seconds
        let config = fast(SimulationConfig::new(1, 1, 1.0, 10.0, 0.0).with_news_hold_secs(2.0));
        let simulation = Simulation::new(config, scripted(vec![0.99])).unwrap();
        let studio = simulation.studio();

        let trigger = thread::spawn(move || {
            let deadline = Instant::now() + Duration::from_secs(5);
            while Instant::now() < deadline {
                let speaking = studio
                    .journal()
                    .events()
                    .iter()
                    .any(|e| matches!(e, PanelEvent::Speaking { .. }));
                if speaking {
                    return studio.news().try_trigger();
                }
                thread::sleep(Duration::from_millis(1));
            }
            false
        });

        let report = simulation.run().unwrap();
        assert!(trigger.join().unwrap());

        assert_eq!(report.cut_short(), 1);
        assert_eq!(report.finished_speeches(), 0);
        assert_eq!(report.news_activations(), 1);

        let stamp = |pred: fn(&PanelEvent) -> bool| {
            report
                .events
                .iter()
                .find(|e| pred(&e.event))
                .map(|e| e.at.as_millis())
                .unwrap()
        };
        let started = stamp(|e| matches!(e, PanelEvent::BreakingNewsStarted));
        let ended = stamp(|e| matches!(e, PanelEvent::BreakingNewsEnded));
        let game_over = stamp(|e| matches!(e, PanelEvent::GameOver { .. }));
        assert!(ended - started >= 20);
        assert!(game_over >= ended);

        let spoke_ms = report
            .events
            .iter()
            .find_map(|e| match e.event {
                PanelEvent::CutShort { spoke_ms, .. } => Some(spoke_ms),
                _ => None,
            })
            .unwrap();
        assert!(spoke_ms < 99);
    }

    #[test]
    fn test_news_storm_still_finishes() {
        let config = fast(
            SimulationConfig::new(3, 2, 1.0, 3.0, 0.5)
                .with_news_hold_secs(1.0)
                .with_tick_interval_secs(1.0),
        );
        let report = Simulation::new(config, Arc::new(SeededRandom::new(3)))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(report.rounds_completed, 2);
        assert_eq!(report.finished_speeches() + report.cut_short(), report.answers());
        assert!(report.ticks > 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig::new(0, 1, 0.5, 2.0, 0.0);
        let err = Simulation::new(config, scripted(vec![0.0])).err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }
}
