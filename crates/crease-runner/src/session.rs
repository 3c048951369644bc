use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crease_core::events::MatchEvent;
use crease_core::progress::{MatchProgress, MatchStatus};
use crease_core::setup::{MatchSetup, SetupError};
use crease_core::store::{MatchStore, StoreError};
use crease_core::sync::{PersistenceSynchronizer, SessionRecord};
use crease_sim::{CricketMatch, TickInput};

use crate::input::{self, Command};

/// Why a session could not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Store(StoreError),
    Setup(SetupError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "could not reach the match store: {e}"),
            Self::Setup(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<SetupError> for SessionError {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

/// Fetch the player's latest setup and check it can be played.
pub async fn load_setup<S: MatchStore>(
    store: &S,
    user_id: &str,
) -> Result<MatchSetup, SessionError> {
    let setup = store
        .fetch_setup(user_id)
        .await?
        .ok_or(SetupError::Missing)?;
    setup.validate()?;
    tracing::info!(
        setup = %setup.id,
        batting = %setup.your_team,
        bowling = %setup.opponent_team,
        overs = setup.overs_limit,
        target = setup.target,
        "Match setup loaded"
    );
    Ok(setup)
}

/// Work handed from the tick loop to the persistence task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistCommand {
    /// The first swing was accepted.
    Started,
    Progress(MatchProgress),
}

/// Pick out the events the store cares about, in order.
pub fn route_events(events: &[MatchEvent]) -> Vec<PersistCommand> {
    events
        .iter()
        .filter_map(|event| match event {
            MatchEvent::MatchStarted => Some(PersistCommand::Started),
            MatchEvent::ProgressChanged(progress) => Some(PersistCommand::Progress(*progress)),
            MatchEvent::MatchFinished { progress, .. } => {
                Some(PersistCommand::Progress(*progress))
            },
            _ => None,
        })
        .collect()
}

/// Spawn the task that mirrors progress to `store`.
///
/// Commands are applied one at a time in arrival order. The task ends when
/// every sender is dropped and hands back the synchronizer.
pub fn spawn_persistence<S: MatchStore + 'static>(
    store: Arc<S>,
    mut sync: PersistenceSynchronizer,
) -> (
    mpsc::UnboundedSender<PersistCommand>,
    JoinHandle<PersistenceSynchronizer>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                PersistCommand::Started => sync.mark_started(),
                PersistCommand::Progress(progress) => {
                    // Logged by the synchronizer and not retried; the player is told.
                    if let Err(e) = sync.sync(&*store, &progress).await {
                        eprintln!("{}", save_failed(&e));
                    }
                },
            }
        }
        sync
    });
    (tx, handle)
}

/// Player-facing line for a failed store write.
pub fn save_failed(error: &StoreError) -> String {
    format!("Could not save match progress ({error}); play continues")
}

/// Player-facing line for an event, if it deserves one.
pub fn describe(event: &MatchEvent) -> Option<String> {
    match event {
        MatchEvent::Ready => Some(
            "Play! a/w/space to attack, d/s to defend, q to quit".to_string(),
        ),
        MatchEvent::DeliveryStarted { delivery, profile } => {
            Some(format!("Ball {delivery}: {profile}"))
        },
        MatchEvent::BatContact { kind, .. } => Some(format!("{kind}!")),
        MatchEvent::RunsScored {
            runs, total_runs, ..
        } => Some(match runs {
            6 => format!("SIX! ({total_runs})"),
            1 => format!("1 run ({total_runs})"),
            n => format!("{n} runs ({total_runs})"),
        }),
        MatchEvent::Wicket { wickets } => Some(format!("OUT! Bowled ({wickets} down)")),
        MatchEvent::MatchFinished { status, .. } => Some(
            match status {
                MatchStatus::Achieved => "Target achieved, you win!",
                MatchStatus::NotAchieved => "Out of balls, target not achieved",
                MatchStatus::Lost => "All out, match lost",
                MatchStatus::OnGoing => "Match over",
            }
            .to_string(),
        ),
        _ => None,
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// The player quit before the result was archived.
    pub quit: bool,
    /// Store-side state once all persistence work drained. `None` if the
    /// persistence task panicked.
    pub record: Option<SessionRecord>,
}

/// Drive `game` at `tick_rate_hz` until it is archived or the player quits.
///
/// Input lines are folded into the next tick. Closing the input leaves the
/// match running without a batter.
pub async fn run<S, R, B>(
    game: &mut CricketMatch<R>,
    store: Arc<S>,
    tick_rate_hz: u32,
    mut lines: Lines<B>,
) -> SessionReport
where
    S: MatchStore + 'static,
    R: Rng,
    B: AsyncBufRead + Unpin,
{
    let sync = PersistenceSynchronizer::new(game.setup().clone(), game.progress());
    let (tx, worker) = spawn_persistence(store, sync);

    let period = Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz.max(1)));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut last = Instant::now();
    let mut pending = TickInput::NONE;
    let mut input_open = true;
    let mut quit = false;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;

                let events = game.update(dt, &std::mem::take(&mut pending));
                for event in &events {
                    if let Some(line) = describe(event) {
                        println!("{line}");
                    }
                    if matches!(event, MatchEvent::ProgressChanged(_)) {
                        println!("{}", game.scoreboard());
                    }
                }
                for cmd in route_events(&events) {
                    if tx.send(cmd).is_err() {
                        tracing::warn!("Persistence task stopped, dropping progress");
                    }
                }
                if game.is_archived() {
                    break;
                }
            }
            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) => match input::parse_command(&line) {
                        Some(Command::Quit) => {
                            tracing::info!(progress = ?game.progress(), "Player quit");
                            quit = true;
                            break;
                        },
                        Some(cmd) => input::merge(&mut pending, cmd),
                        None => {},
                    },
                    Ok(None) => {
                        tracing::debug!("Input closed");
                        input_open = false;
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read input");
                        input_open = false;
                    },
                }
            }
        }
    }

    drop(tx);
    let record = match worker.await {
        Ok(sync) => Some(sync.record().clone()),
        Err(e) => {
            tracing::error!(error = %e, "Persistence task failed");
            None
        },
    };
    SessionReport { quit, record }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_core::events::{HitOutcome, SwingKind};
    use crease_core::geometry::Vec3;
    use crease_core::test_helpers::progress;

    #[test]
    fn routes_only_store_relevant_events() {
        let p = progress(1, 4, 0);
        let events = vec![
            MatchEvent::Ready,
            MatchEvent::MatchStarted,
            MatchEvent::BatContact {
                kind: SwingKind::Shot,
                position: Vec3::ZERO,
            },
            MatchEvent::ProgressChanged(p),
            MatchEvent::MatchFinished {
                status: MatchStatus::Lost,
                progress: p,
            },
            MatchEvent::Archived,
        ];
        assert_eq!(
            route_events(&events),
            vec![
                PersistCommand::Started,
                PersistCommand::Progress(p),
                PersistCommand::Progress(p),
            ]
        );
    }

    #[test]
    fn describes_runs_and_results() {
        let runs = |runs| MatchEvent::RunsScored {
            runs,
            total_runs: 10,
            outcome: HitOutcome {
                kind: SwingKind::Shot,
                power: 0.5,
                exit_position: None,
            },
            peak_height: 40.0,
        };
        assert_eq!(describe(&runs(6)).unwrap(), "SIX! (10)");
        assert_eq!(describe(&runs(1)).unwrap(), "1 run (10)");
        assert_eq!(describe(&runs(3)).unwrap(), "3 runs (10)");
        assert_eq!(
            describe(&MatchEvent::DeliveryStarted {
                delivery: 1,
                profile: "GOOD_LENGTH".to_string(),
            })
            .unwrap(),
            "Ball 1: GOOD_LENGTH"
        );
        assert!(describe(&MatchEvent::Archived).is_none());
        assert!(describe(&MatchEvent::ProgressChanged(progress(0, 0, 0))).is_none());
    }

    #[test]
    fn save_failure_line_names_the_cause() {
        let line = save_failed(&StoreError::Status(500, "db down".to_string()));
        assert!(line.starts_with("Could not save match progress"));
        assert!(line.contains("HTTP 500: db down"));
    }

    #[test]
    fn session_error_from_setup() {
        let err = SessionError::from(SetupError::Missing);
        assert!(err.to_string().contains("no match setup"));
    }
}
