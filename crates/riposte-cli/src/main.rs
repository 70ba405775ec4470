//! Headless duel runner.
//!
//! Plays one duel at a fixed frame rate with a scripted player and prints the
//! result as JSON. The autopilot guards against every telegraphed attack and
//! otherwise alternates attacks from both sides.

mod presentation;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use riposte_core::{
    ActorId, CombatEvent, CombatSession, FixedTimings, JsonFileProgress, ProgressStore,
    SessionBuilder, SessionConfig, SessionOutcome, Side,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::presentation::TracingPresentation;

/// Riposte headless duel runner
#[derive(Parser, Debug)]
#[command(name = "riposte")]
#[command(about = "Run a scripted duel against the opponent AI and report the outcome")]
struct Args {
    /// JSON session config (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum simulated seconds before the duel is called a draw
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Host frame length in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Frames between autopilot attacks
    #[arg(long, default_value_t = 40)]
    attack_every: u64,

    /// Progress file recording the highest unlocked level
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Level being played; a victory unlocks the next one
    #[arg(long, default_value_t = 1)]
    level: u32,
}

/// JSON output structure
#[derive(Serialize)]
struct DuelReport {
    outcome: String,
    seed: u64,
    ticks: u64,
    sim_seconds: f64,
    player_health: f32,
    opponent_health: f32,
    player_hits: usize,
    opponent_hits: usize,
    blocks: usize,
    unlocked_level: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("riposte=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.dt <= 0.0 || !args.dt.is_finite() {
        bail!("--dt must be a positive number of seconds");
    }

    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let next = next_level(args.level)?;
    let mut progress = args.progress.as_ref().map(JsonFileProgress::new);
    if let Some(store) = &progress {
        if !store.is_unlocked(args.level)? {
            bail!(
                "level {} is locked (highest unlocked: {})",
                args.level,
                store.highest_unlocked()?
            );
        }
    }

    let seed = config.seed;
    let mut session = SessionBuilder::new()
        .config(config)
        .timings(FixedTimings::standard())
        .presentation(TracingPresentation)
        .build()
        .context("failed to set up duel")?;

    let tally = run_duel(&mut session, &args);

    let unlocked_level = match (session.outcome(), progress.as_mut()) {
        (SessionOutcome::Victory, Some(store)) => {
            if store.unlock(next)? {
                info!(level = next, path = %store.path().display(), "level unlocked");
            }
            Some(store.highest_unlocked()?)
        }
        (_, Some(store)) => Some(store.highest_unlocked()?),
        (_, None) => None,
    };

    let report = DuelReport {
        outcome: match session.outcome() {
            SessionOutcome::Ongoing => "draw",
            SessionOutcome::Victory => "victory",
            SessionOutcome::Defeat => "defeat",
        }
        .to_string(),
        seed,
        ticks: session.tick(),
        sim_seconds: session.now(),
        player_health: session.player().health(),
        opponent_health: session.opponent().health(),
        player_hits: tally.player_hits,
        opponent_hits: tally.opponent_hits,
        blocks: tally.blocks,
        unlocked_level,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Level a victory on `level` unlocks.
fn next_level(level: u32) -> Result<u32> {
    match level.checked_add(1) {
        Some(next) => Ok(next),
        None => bail!("--level {level} has no successor to unlock"),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SessionConfig::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[derive(Debug, Default)]
struct Tally {
    player_hits: usize,
    opponent_hits: usize,
    blocks: usize,
}

fn run_duel(session: &mut CombatSession, args: &Args) -> Tally {
    let mut tally = Tally::default();
    let mut next_side = Side::Left;
    let limit = f64::from(args.seconds);
    let mut frame: u64 = 0;

    // Runs until both death sequences have played out or time is up.
    while session.now() < limit
        && !session.player().is_removed()
        && !session.opponent().is_removed()
    {
        if !session.is_finished() {
            if let Some(side) = session.pending_impact(ActorId::Opponent) {
                session.player_defend(side);
            } else if frame % args.attack_every.max(1) == 0 {
                session.player_attack(next_side);
                next_side = next_side.opposite();
            }
        }
        session.step(args.dt);
        frame += 1;

        for record in session.take_events() {
            match record.event {
                CombatEvent::DamageApplied {
                    source: ActorId::Player,
                    ..
                } => tally.player_hits += 1,
                CombatEvent::DamageApplied {
                    source: ActorId::Opponent,
                    ..
                } => {
                    tally.opponent_hits += 1;
                }
                CombatEvent::HitBlocked { .. } => tally.blocks += 1,
                CombatEvent::Died { actor } => {
                    info!(actor = %actor, time = record.time, "duelist died");
                }
                _ => {}
            }
        }
    }

    if !session.is_finished() {
        warn!(seconds = args.seconds, "time limit reached without a winner");
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_level_follows_the_played_one() {
        assert_eq!(next_level(1).unwrap(), 2);
    }

    #[test]
    fn last_representable_level_is_rejected() {
        assert!(next_level(u32::MAX).is_err());
    }
}
