//! Fixed timestep simulation tick
//!
//! One tick advances every subsystem strictly in sequence; nothing inside a
//! tick blocks or yields. The host accumulates real time into whole
//! timesteps via [`run_frame`], with the delta clamped so a stall cannot
//! trigger a catch-up spiral.

use glam::Vec2;

use crate::consts::{FLOATING_TEXT_CAP, MAX_FRAME_TIME, SIM_DT};

use super::boss::update_boss;
use super::director::{on_boss_killed, update_director};
use super::enemy::{compute_separation, resolve_death, Archetype, SweepDir};
use super::events::GameEvent;
use super::pickups::update_pickups;
use super::projectile::{update_knives, update_mines, update_projectiles};
use super::state::{GamePhase, SimulationState};
use super::weapons::{run_weapons, WeaponKind};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent, normalized or zero
    pub move_dir: Vec2,
    /// World-space aim point for mouse-directed weapons
    pub aim: Vec2,
    /// Pause toggle (host sends true on the key edge)
    pub pause: bool,
    /// Debug: suppress player damage at the take_damage contract
    pub god_mode: bool,
    /// Debug: grant one level through the normal XP path
    pub force_level_up: bool,
    /// Debug: write a weapon level directly
    pub force_weapon: Option<(WeaponKind, u8)>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }
    // While paused or ended, no entity state changes; timed state machines
    // simply stop being ticked and resume from their stored counters.
    if state.phase != GamePhase::Playing {
        return;
    }

    // Debug overrides route through the same mutation points as gameplay
    state.player.god_mode = input.god_mode;
    if input.force_level_up {
        let needed = state.player.xp_to_next - state.player.xp.min(state.player.xp_to_next);
        let events = &mut state.events;
        state.player.gain_xp(needed.max(1), events);
    }
    if let Some((kind, level)) = input.force_weapon {
        state.player.arsenal.set_level(kind, level);
    }

    state.tick_count += 1;
    state.game_time += dt;

    // Defensive: never let a bad input vector poison positions
    let mut move_dir = input.move_dir;
    if !move_dir.is_finite() {
        move_dir = Vec2::ZERO;
    } else if move_dir.length_squared() > 1.0 {
        move_dir = move_dir.normalize_or_zero();
    }

    // 1. Spawn decisions: bosses, formations, regular cadence, quests
    update_director(state, move_dir);

    // 2. Cosmetic caps, enforced by truncation (lossy on purpose)
    if state.floating_text.len() > FLOATING_TEXT_CAP {
        state.floating_text.truncate(FLOATING_TEXT_CAP);
    }

    // 3. Player movement and weapons
    let hp_before_tick = state.player.hp;
    state.player.integrate(move_dir, dt);
    run_weapons(state, input.aim, dt);

    // 4. Transient combat entities
    {
        let SimulationState {
            projectiles,
            enemies,
            mines,
            knives,
            player,
            rng,
            floating_text,
            events,
            camera,
            ..
        } = state;
        update_projectiles(
            projectiles,
            enemies,
            mines,
            player.pos,
            rng,
            floating_text,
            events,
            dt,
        );
        update_knives(knives, player, events, dt);
        update_mines(mines, enemies, rng, floating_text, events, camera);
    }

    // 5. Broad phase rebuild, then the enemy pass
    rebuild_grid(state);
    advance_enemies(state, dt);

    // 6. Death resolution over a snapshot of the dead set
    resolve_deaths(state);

    // 7. Player death check
    if state.player.hp <= 0.0 && state.phase == GamePhase::Playing {
        state.phase = GamePhase::GameOver;
        let score = state.score;
        state.events.push(GameEvent::GameOver { score });
        log::info!("game over at t={:.1}s, score {}", state.game_time, score);
        return;
    }

    // 8. Gem pool reconciliation and XP intake
    let pickup_mult = state.player.stats.pickup_mult;
    let collected = state.gems.update(state.player.pos, pickup_mult);
    if collected > 0 {
        let events = &mut state.events;
        state.player.gain_xp(collected, events);
    }

    // 9. Pickups (may end the run via the crown)
    update_pickups(state);

    // 10. Cleanup and camera
    for text in &mut state.floating_text {
        text.life = text.life.saturating_sub(1);
    }
    state.floating_text.retain(|t| t.life > 0);

    if state.player.hp < hp_before_tick {
        state.camera.add_shake(10.0);
    }
    let target = state.player.pos;
    state.camera.follow(target);
}

/// Accumulate wall-clock time into fixed ticks. `elapsed` is seconds since
/// the last call; the clamp is the spiral-of-death guard.
pub fn run_frame(
    state: &mut SimulationState,
    input: &TickInput,
    elapsed: f32,
    accumulator: &mut f32,
) {
    *accumulator += elapsed.min(MAX_FRAME_TIME);
    let mut first = true;
    while *accumulator >= SIM_DT {
        // Edge-triggered inputs only apply on the first step of a frame
        let step_input = if first {
            input.clone()
        } else {
            TickInput {
                pause: false,
                force_level_up: false,
                force_weapon: None,
                ..input.clone()
            }
        };
        tick(state, &step_input, SIM_DT);
        *accumulator -= SIM_DT;
        first = false;
    }
}

fn rebuild_grid(state: &mut SimulationState) {
    let SimulationState { grid, enemies, .. } = state;
    grid.clear();
    for (i, e) in enemies.iter().enumerate() {
        if !e.dead {
            grid.insert(i, e.pos);
        }
    }
}

/// The combatant pass: knockback, steering, separation, contact damage
fn advance_enemies(state: &mut SimulationState, dt: f32) {
    let SimulationState {
        enemies,
        player,
        knives,
        camera,
        events,
        grid,
        neighbor_buf,
        separation_buf,
        ..
    } = state;

    compute_separation(enemies, grid, neighbor_buf, separation_buf);

    for i in 0..enemies.len() {
        let e = &mut enemies[i];
        if e.dead || e.is_corpse() {
            continue;
        }

        match &e.archetype {
            Archetype::Boss(_) => {
                e.integrate_knockback();
                update_boss(e, player, knives, camera, events, dt);
            }
            Archetype::Stampede(dir) => {
                let dir = *dir;
                let step = e.speed * dt;
                match dir {
                    SweepDir::Right => e.pos.x += step,
                    SweepDir::Down => e.pos.y += step,
                }
                // Swept past the arena: cull without loot
                if e.pos.x > player.pos.x + 2000.0 || e.pos.y > player.pos.y + 2000.0 {
                    e.kill_silent();
                }
            }
            _ => {
                e.integrate_knockback();
                let vel = e.steer_toward(player.pos);
                // Separation is a per-tick positional correction
                e.pos += vel * dt + separation_buf[i];
            }
        }

        // Contact damage, gated by the player's i-frames
        let reach = e.size + player.radius;
        if !e.dead && e.pos.distance_squared(player.pos) < reach * reach {
            player.take_damage(e.contact_damage(), events);
        }

        e.tick_timers();
    }
}

/// Resolve every latched death this tick. Safe against re-entry: the dead
/// flag is checked and entries removed only after all payouts run.
fn resolve_deaths(state: &mut SimulationState) {
    // Bosses first; the king rewrites the whole world
    while let Some(idx) = state.enemies.iter().position(|e| e.dead && e.is_boss()) {
        on_boss_killed(state, idx);
        // A corpse clears its own dead flag; a chef is removed. Either way
        // this loop terminates.
    }

    let SimulationState {
        enemies,
        gems,
        pickups,
        rng,
        events,
        player,
        score,
        ..
    } = state;
    for e in enemies.iter().filter(|e| e.dead) {
        // Silently culled formation hazards pay nothing
        if matches!(e.archetype, Archetype::Stampede(_)) && e.silent_death {
            continue;
        }
        resolve_death(e, player.level, rng, gems, pickups, score, events);
    }
    enemies.retain(|e| !e.dead);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;

    fn moving_input() -> TickInput {
        TickInput {
            move_dir: Vec2::new(1.0, 0.0),
            aim: Vec2::new(100.0, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn pause_freezes_everything() {
        let mut state = SimulationState::new(1);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &TickInput::default(), SIM_DT);
        let t = state.game_time;

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &TickInput::default(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.game_time, t, "no time passes while paused");

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.game_time > t);
    }

    #[test]
    fn determinism_same_seed_same_trajectory() {
        let mut a = SimulationState::new(424242);
        let mut b = SimulationState::new(424242);
        let input = moving_input();
        for _ in 0..600 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.tick_count, b.tick_count);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.hp, eb.hp);
        }
    }

    #[test]
    fn run_frame_clamps_large_deltas() {
        let mut state = SimulationState::new(1);
        let mut acc = 0.0;
        // A 10 second stall must not step 600 ticks
        run_frame(&mut state, &TickInput::default(), 10.0, &mut acc);
        let max_ticks = (MAX_FRAME_TIME / SIM_DT).ceil() as u64;
        assert!(state.tick_count <= max_ticks);
    }

    #[test]
    fn health_never_negative_when_read_after_tick() {
        let mut state = SimulationState::new(9);
        // Surround the player with contact damage
        for i in 0..20 {
            let id = state.next_entity_id();
            let mut e = Enemy::spawn(id, Vec2::new(5.0 * i as f32, 0.0), 1, &mut state.rng);
            e.pos = Vec2::new(1.0, 0.0);
            state.enemies.push(e);
        }
        let mut ticks = 0;
        while state.phase == GamePhase::Playing && ticks < 10_000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            ticks += 1;
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn god_mode_prevents_game_over() {
        let mut state = SimulationState::new(9);
        for _ in 0..10 {
            let id = state.next_entity_id();
            let mut e = Enemy::spawn(id, Vec2::ZERO, 1, &mut state.rng);
            e.pos = Vec2::new(1.0, 0.0);
            state.enemies.push(e);
        }
        let input = TickInput {
            god_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.hp, state.player.max_hp);
    }

    #[test]
    fn force_level_up_walks_the_xp_path() {
        let mut state = SimulationState::new(9);
        let input = TickInput {
            force_level_up: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.level, 2);
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::LevelUp { auto: false, .. })));
    }

    #[test]
    fn enemies_spawn_and_population_grows() {
        let mut state = SimulationState::new(77);
        let input = moving_input();
        for _ in 0..300 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(!state.enemies.is_empty());
        assert!(state.enemies.len() <= crate::consts::ENEMY_CAP);
    }

    #[test]
    fn dead_enemies_are_purged_same_tick() {
        let mut state = SimulationState::new(3);
        let id = state.next_entity_id();
        let mut e = Enemy::spawn(id, Vec2::new(400.0, 0.0), 1, &mut state.rng);
        e.hp = 0.5;
        state.enemies.push(e);
        state.enemies[0].kill_silent();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.enemies.iter().all(|e| !e.dead));
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut state = SimulationState::new(3);
        let input = TickInput {
            move_dir: Vec2::new(f32::NAN, f32::NAN),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.pos.is_finite());
        assert_eq!(state.player.pos, Vec2::ZERO);
    }
}
