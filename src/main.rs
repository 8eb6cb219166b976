//! Headless driver: runs the simulation with a scripted survivor bot
//!
//! Useful for soak-testing the core without a renderer. The bot kites in a
//! wide circle, flees whatever is closest, aims at the nearest enemy, and
//! takes every level-up reward as it comes.
//!
//! Usage: mash-arena [seed] [minutes]

use glam::Vec2;

use mash_arena::consts::SIM_DT;
use mash_arena::sim::{run_frame, GameEvent, GamePhase, SimulationState, TickInput};
use mash_arena::Settings;

fn bot_input(state: &SimulationState) -> TickInput {
    let player = &state.player;
    let nearest = state
        .enemies
        .iter()
        .filter(|e| !e.dead && !e.is_corpse())
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .total_cmp(&b.pos.distance_squared(player.pos))
        });

    // Wide orbit around the spawn point keeps the swarm strung out behind
    let t = state.tick_count as f32 * SIM_DT;
    let orbit = Vec2::new((t * 0.25).cos(), (t * 0.25).sin());

    let mut move_dir = orbit;
    let mut aim = player.pos + Vec2::new(100.0, 0.0);
    if let Some(e) = nearest {
        aim = e.pos;
        if e.pos.distance_squared(player.pos) < 150.0 * 150.0 {
            move_dir = (player.pos - e.pos).normalize_or_zero();
        }
    }

    TickInput {
        move_dir: move_dir.normalize_or_zero(),
        aim,
        ..Default::default()
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(0xC0FFEE);
    let minutes: f32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(10.0);

    let settings = Settings::load();
    log::info!("seed {seed}, running {minutes} min, volume {}", settings.master_volume);

    let mut state = SimulationState::new(seed);
    let mut accumulator = 0.0;
    let total_ticks = (minutes * 60.0 / SIM_DT) as u64;

    while state.tick_count < total_ticks {
        let input = bot_input(&state);
        run_frame(&mut state, &input, SIM_DT, &mut accumulator);

        for event in state.drain_events() {
            match event {
                GameEvent::LevelUp { level, auto, .. } => {
                    if !auto {
                        // Host-side reward pick: the bot takes a random one
                        let upgrade = state.player.random_upgrade(&mut state.rng);
                        state.apply_upgrade(upgrade);
                    }
                    log::info!("level {level}");
                }
                GameEvent::BossSpawned { name, .. } => log::info!("boss: {name}"),
                GameEvent::BossDefeated { kills, .. } => log::info!("boss down ({kills})"),
                GameEvent::GameOver { score } => log::info!("game over, score {score}"),
                GameEvent::Victory { score } => log::info!("victory! score {score}"),
                _ => {}
            }
        }

        if matches!(state.phase, GamePhase::GameOver | GamePhase::Victory) {
            break;
        }
        if state.tick_count % 3600 == 0 {
            log::info!(
                "t={:.0}s level={} enemies={} score={}",
                state.game_time,
                state.player.level,
                state.enemies.len(),
                state.score
            );
        }
    }

    println!(
        "finished: phase={:?} time={:.0}s level={} score={} enemies={}",
        state.phase,
        state.game_time,
        state.player.level,
        state.score,
        state.enemies.len()
    );
}
