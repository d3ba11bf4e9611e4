//! Headless runner: plays one autoplay session, stores its replay and
//! checks that the replay reconstructs the same result.

use anyhow::Context;
use notefall::database::ReplayStore;
use notefall::logic::autoplay::Autoplay;
use notefall::logic::replay_engine::ReplayEngine;
use notefall::models::engine::FRAMES_PER_SECOND;
use notefall::models::settings::GameConfig;
use notefall::state::{GameSession, HandleAction, Transition, Update};
use std::path::PathBuf;

const DEFAULT_SETTINGS: &str = "settings.toml";
const DATA_DIR: &str = "data";
/// Upper bound for sessions without a time limit.
const SAFETY_CAP_SECS: f64 = 120.0;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("MAIN: Booting notefall {}", env!("CARGO_PKG_VERSION"));

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS));
    let config = GameConfig::load_or_default(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;

    let input = config.input_manager();
    let mut session = GameSession::from_config(config);
    let bot = Autoplay::new();
    let dt = 1.0 / FRAMES_PER_SECOND;
    let max_frames = (SAFETY_CAP_SECS * FRAMES_PER_SECOND) as u64;

    loop {
        if let Some(Transition::ToResult(reason)) = session.update(dt) {
            log::info!("MAIN: Session over ({:?})", reason);
            break;
        }
        if session.frame() >= max_frames {
            log::info!("MAIN: Safety cap reached after {} frames", session.frame());
            break;
        }
        for event in bot.key_events(&session, &input) {
            if let Some(action) = input.process(&event) {
                session.handle_action(&action);
            }
        }
    }

    let (summary, replay) = session.finish();

    let store = ReplayStore::new(DATA_DIR);
    let id = store.save(&replay).context("saving replay")?;

    let mut engine = ReplayEngine::new(replay);
    engine.seek_to_frame(engine.get_max_frame());
    let reconstructed = engine.state();
    if reconstructed.score == summary.final_score && reconstructed.max_combo == summary.max_combo {
        log::info!("MAIN: Replay {} verified at frame {}", id, engine.current_frame());
    } else {
        log::warn!(
            "MAIN: Replay {} diverges (score {} vs {}, max combo {} vs {})",
            id,
            reconstructed.score,
            summary.final_score,
            reconstructed.max_combo,
            summary.max_combo
        );
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
