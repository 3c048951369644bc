use std::process::ExitCode;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crease_core::memory_store::MemoryMatchStore;
use crease_core::store::MatchStore;
use crease_http::HttpMatchStore;
use crease_runner::config::RunnerConfig;
use crease_runner::session;
use crease_sim::CricketMatch;
use crease_sim::config::SimConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Crease runner starting");

    let config = RunnerConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return ExitCode::FAILURE;
    }
    let sim = SimConfig::load();

    match config.store.clone() {
        Some(store_cfg) => match HttpMatchStore::new(store_cfg) {
            Ok(store) => play(Arc::new(store), &config, sim).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build store client");
                ExitCode::FAILURE
            },
        },
        None => {
            tracing::info!("No store configured, playing offline");
            let store =
                MemoryMatchStore::new().with_setup(config.offline.to_setup(&config.user_id));
            play(Arc::new(store), &config, sim).await
        },
    }
}

async fn play<S: MatchStore + 'static>(
    store: Arc<S>,
    config: &RunnerConfig,
    sim: SimConfig,
) -> ExitCode {
    let setup = match session::load_setup(&*store, &config.user_id).await {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Cannot start match: {e}");
            return ExitCode::FAILURE;
        },
    };

    let mut game = CricketMatch::new(setup, sim, StdRng::from_os_rng());
    println!("{}", game.scoreboard());
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let report = session::run(&mut game, store, config.tick_rate_hz, lines).await;

    println!("{}", game.scoreboard());
    tracing::info!(status = %game.status(), quit = report.quit, record = ?report.record, "Session ended");
    ExitCode::SUCCESS
}
