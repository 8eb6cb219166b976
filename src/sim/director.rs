//! Spawn director: enemy cadence and bias, boss pacing, scripted events
//!
//! The boss gate is two independently tracked thresholds (elapsed time,
//! player level) ORed together and rewritten at every boss death. Once the
//! kill count crosses the king threshold both gates collapse to
//! "immediate" and the terminal boss spawns.

use glam::Vec2;
use rand::Rng;

use crate::angle_to_dir;
use crate::consts::{
    BOSS_LEVEL_DELTA, BOSS_TIME_DELTA, ENEMY_CAP, FIRST_BOSS_TIME, KING_KILL_THRESHOLD,
    SPAWN_DISTANCE_MIN, SPAWN_DISTANCE_SPREAD, SPAWN_INTERVAL_BASE, SPAWN_INTERVAL_FLOOR,
};

use super::boss::{enter_corpse_state, BossKind};
use super::enemy::{Enemy, SweepDir};
use super::events::{GameEvent, SoundCue};
use super::pickups::{Pickup, PickupKind};
use super::state::{FloatingText, SimulationState};

/// Sentinel for "level gate disabled" (first boss is time-gated only)
const LEVEL_GATE_OFF: u32 = 999;

/// Ticks between scripted stampede waves
const STAMPEDE_WAVE_GAP: u32 = 180;
const STAMPEDE_WAVES: u32 = 5;
/// Random formation cadence once unlocked (2.5 minutes)
const FORMATION_INTERVAL: u32 = 9000;
/// Spatula quest: lead-in before the first spawn, then a long period
const SPATULA_FIRST_DELAY: u32 = 1200;
const SPATULA_INTERVAL: u32 = 18_000;
const SPATULA_DISTANCE: f32 = 10_000.0;

#[derive(Debug, Clone, Copy)]
struct StampedeSeq {
    wave: u32,
    delay: u32,
}

pub struct SpawnDirector {
    /// False after the terminal boss falls; nothing spawns again
    pub spawn_enabled: bool,
    pub next_boss_time: f32,
    pub next_boss_level: u32,
    pub boss_kills: u32,
    /// Id of the live boss entity, if any. The king's corpse keeps this
    /// occupied forever, which is what blocks further boss spawns.
    pub active_boss: Option<u32>,
    spawn_cooldown: u32,
    formation_timer: u32,
    first_stampede_done: bool,
    stampede: Option<StampedeSeq>,
    spatula_spawned_once: bool,
    spatula_timer: u32,
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self {
            spawn_enabled: true,
            next_boss_time: FIRST_BOSS_TIME,
            next_boss_level: LEVEL_GATE_OFF,
            boss_kills: 0,
            active_boss: None,
            spawn_cooldown: SPAWN_INTERVAL_BASE,
            formation_timer: 0,
            first_stampede_done: false,
            stampede: None,
            spatula_spawned_once: false,
            spatula_timer: 0,
        }
    }

    /// Rewrite both pacing gates after a boss death
    pub fn update_boss_pacing(&mut self, game_time: f32, player_level: u32) {
        if self.boss_kills >= KING_KILL_THRESHOLD {
            // Accelerated pacing: the king comes for the next tick/level
            self.next_boss_time = game_time;
            self.next_boss_level = player_level;
        } else {
            self.next_boss_time = game_time + BOSS_TIME_DELTA;
            self.next_boss_level = player_level + BOSS_LEVEL_DELTA;
        }
    }
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self::new()
    }
}

/// One spawn-director step: boss gate, scripted formations, regular spawns,
/// quest scheduling. `move_dir` is the player's current movement input,
/// used for the behind-the-player spawn bias.
pub fn update_director(state: &mut SimulationState, move_dir: Vec2) {
    boss_gate(state);
    check_formations(state);
    regular_spawns(state, move_dir);
    spatula_quest(state);
}

fn boss_gate(state: &mut SimulationState) {
    let d = &state.director;
    if d.active_boss.is_some() || !d.spawn_enabled {
        return;
    }
    let gate_open =
        state.game_time > d.next_boss_time || state.player.level >= d.next_boss_level;
    if !gate_open {
        return;
    }

    let kills = d.boss_kills;
    let king = kills >= KING_KILL_THRESHOLD;
    let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
    let dist = if king { 1200.0 } else { SPAWN_DISTANCE_MIN };
    let pos = state.player.pos + angle_to_dir(angle) * dist;
    let kind = if king { BossKind::King } else { BossKind::Chef };

    let id = state.next_entity_id();
    let boss = Enemy::boss(id, pos, kind, state.player.level, kills);
    log::info!(
        "boss spawned: {} (hp {}) at t={:.1}s",
        kind.name(),
        boss.max_hp,
        state.game_time
    );
    state.enemies.push(boss);
    state.director.active_boss = Some(id);
    // Hold the time gate shut while this boss is alive
    state.director.next_boss_time = state.game_time + 120.0;

    state.events.push(GameEvent::Sfx(SoundCue::BossRoar));
    state.events.push(GameEvent::BossSpawned {
        kind,
        name: kind.name(),
    });
    state.camera.add_shake(if king { 50.0 } else { 30.0 });
}

/// Resolve the death of the boss at `idx`. The chef pays out and leaves
/// the world; the king flips to its persistent corpse and winds the whole
/// arena down.
pub fn on_boss_killed(state: &mut SimulationState, idx: usize) {
    let kind = match &state.enemies[idx].archetype {
        super::enemy::Archetype::Boss(b) => b.kind,
        _ => return,
    };
    let pos = state.enemies[idx].pos;

    match kind {
        BossKind::Chef => {
            // Gem burst, scattered around the corpse
            for _ in 0..30 {
                let offset = Vec2::new(
                    (state.rng.random::<f32>() - 0.5) * 100.0,
                    (state.rng.random::<f32>() - 0.5) * 100.0,
                );
                state.gems.spawn(pos + offset, 10, super::gems::GemTier::Green);
            }
            for _ in 0..5 {
                let offset = Vec2::new(
                    (state.rng.random::<f32>() - 0.5) * 100.0,
                    (state.rng.random::<f32>() - 0.5) * 100.0,
                );
                state.gems.spawn(pos + offset, 50, super::gems::GemTier::Purple);
            }
            let jitter = |rng: &mut rand_pcg::Pcg32| {
                Vec2::new((rng.random::<f32>() - 0.5) * 80.0, (rng.random::<f32>() - 0.5) * 80.0)
            };
            let o = jitter(&mut state.rng);
            state.pickups.push(Pickup::new(pos + o, PickupKind::Nuke));
            let o = jitter(&mut state.rng);
            state.pickups.push(Pickup::new(pos + o, PickupKind::Chest));
            state.events.push(GameEvent::ChestDropped { pos });

            state.enemies.remove(idx);
            state.score += 1;
            state.director.active_boss = None;
            state.director.boss_kills += 1;
            state
                .director
                .update_boss_pacing(state.game_time, state.player.level);
            state.player.heal_full();
            state.floating_text.push(FloatingText::cue(
                state.player.pos - Vec2::new(0.0, 50.0),
                "BOSS DEFEATED!",
                "gold",
            ));
            log::info!(
                "boss defeated ({} kills); next gate t>{:.0}s or level {}",
                state.director.boss_kills,
                state.director.next_boss_time,
                state.director.next_boss_level
            );
            state.events.push(GameEvent::BossDefeated {
                kind,
                kills: state.director.boss_kills,
            });
        }
        BossKind::King => {
            // Terminal state: the corpse stays, the arena goes quiet
            enter_corpse_state(&mut state.enemies[idx]);
            state.director.boss_kills += 1;
            state.director.spawn_enabled = false;
            state.director.next_boss_time = f32::INFINITY;
            state.director.next_boss_level = u32::MAX;
            state.director.stampede = None;

            let king_id = state.enemies[idx].id;
            state.enemies.retain(|e| e.id == king_id);
            state.projectiles.clear();
            state.knives.clear();
            state.mines.clear();
            state.pickups.clear();
            state.floating_text.clear();
            state.gems.sleeping.clear();
            state.gems.wake_queue.clear();
            state.gems.active.clear();
            state.player.arsenal.disarm();

            state
                .pickups
                .push(Pickup::new(pos + Vec2::new(0.0, 300.0), PickupKind::Crown));
            log::info!("the king has fallen; crown dropped");
            state.events.push(GameEvent::BossDefeated {
                kind,
                kills: state.director.boss_kills,
            });
            state.events.push(GameEvent::Sfx(SoundCue::BossRoar));
        }
    }
}

fn check_formations(state: &mut SimulationState) {
    if !state.director.spawn_enabled {
        return;
    }
    let kills = state.director.boss_kills;

    // Guaranteed trigger the moment the first boss falls
    if kills >= 1 && !state.director.first_stampede_done {
        state.director.first_stampede_done = true;
        start_stampede(state);
    }

    if let Some(mut seq) = state.director.stampede.take() {
        seq.delay = seq.delay.saturating_sub(1);
        if seq.delay > 0 {
            state.director.stampede = Some(seq);
        } else {
            spawn_stampede_wave(state, seq.wave);
            if seq.wave < STAMPEDE_WAVES {
                state.director.stampede = Some(StampedeSeq {
                    wave: seq.wave + 1,
                    delay: STAMPEDE_WAVE_GAP,
                });
            }
        }
    } else if kills >= 1 {
        // Randomized periodic events after the guaranteed first one
        state.director.formation_timer += 1;
        if state.director.formation_timer >= FORMATION_INTERVAL {
            state.director.formation_timer = 0;
            if state.rng.random::<bool>() {
                start_stampede(state);
            } else {
                spawn_onion_ring(state);
            }
        }
    }
}

fn start_stampede(state: &mut SimulationState) {
    state.director.stampede = Some(StampedeSeq { wave: 1, delay: 60 });
    state.floating_text.push(FloatingText::cue(
        state.player.pos - Vec2::new(0.0, 120.0),
        "KNIFE HORDE INCOMING!",
        "red",
    ));
    state.events.push(GameEvent::Sfx(SoundCue::BossRoar));
}

/// Synchronized hazard wall: odd waves sweep down from above, even waves
/// sweep in from the left.
fn spawn_stampede_wave(state: &mut SimulationState, wave: u32) {
    let ppos = state.player.pos;
    let level = state.player.level;
    let top_down = wave % 2 != 0;
    let label = if top_down {
        "KNIVES FROM ABOVE!"
    } else {
        "KNIVES FROM LEFT!"
    };
    if top_down {
        let start = ppos + Vec2::new(-800.0, -600.0);
        for i in 0..30 {
            let id = state.next_entity_id();
            let pos = start + Vec2::new(i as f32 * 60.0, 0.0);
            state
                .enemies
                .push(Enemy::stampede(id, pos, SweepDir::Down, level));
        }
    } else {
        let start = ppos + Vec2::new(-900.0, -600.0);
        for i in 0..20 {
            let id = state.next_entity_id();
            let pos = start + Vec2::new(0.0, i as f32 * 60.0);
            state
                .enemies
                .push(Enemy::stampede(id, pos, SweepDir::Right, level));
        }
    }
    state
        .floating_text
        .push(FloatingText::cue(ppos - Vec2::new(0.0, 200.0), label, "red"));
    state.events.push(GameEvent::FormationWave { wave, label });
    state.events.push(GameEvent::Sfx(SoundCue::BossRoar));
    log::debug!("stampede wave {wave}");
}

/// Ring trap: a circle of slow, tough enemies closing in from all sides
fn spawn_onion_ring(state: &mut SimulationState) {
    let count = 12;
    for i in 0..count {
        let angle = i as f32 * std::f32::consts::TAU / count as f32;
        let pos = state.player.pos + angle_to_dir(angle) * 400.0;
        let id = state.next_entity_id();
        let mut e = Enemy::spawn(id, pos, state.player.level, &mut state.rng);
        e.speed *= 0.5;
        e.max_hp *= 2.0;
        e.hp = e.max_hp;
        state.enemies.push(e);
    }
    state.floating_text.push(FloatingText::cue(
        state.player.pos - Vec2::new(0.0, 150.0),
        "ONION RING TRAP!",
        "purple",
    ));
    state.events.push(GameEvent::FormationWave {
        wave: 0,
        label: "ONION RING TRAP!",
    });
}

fn regular_spawns(state: &mut SimulationState, move_dir: Vec2) {
    if !state.director.spawn_enabled {
        return;
    }
    // Spawning throttles to every third tick while a boss is up
    if state.director.active_boss.is_some() && state.tick_count % 3 != 0 {
        return;
    }

    let interval = SPAWN_INTERVAL_BASE
        .saturating_sub(state.player.level * 2)
        .max(SPAWN_INTERVAL_FLOOR);
    state.director.spawn_cooldown = state.director.spawn_cooldown.saturating_sub(1);
    if state.director.spawn_cooldown > 0 {
        return;
    }
    state.director.spawn_cooldown = interval;

    let count = 1 + (state.player.level as f32 / 2.5) as usize;
    let base_angle = spawn_bias_angle(state, move_dir);

    for _ in 0..count {
        if state.enemies.len() >= ENEMY_CAP {
            return; // lossy by design: the cap beats completeness
        }
        let angle = base_angle + (state.rng.random::<f32>() - 0.5);
        let dist = SPAWN_DISTANCE_MIN + state.rng.random::<f32>() * SPAWN_DISTANCE_SPREAD;
        let pos = state.player.pos + angle_to_dir(angle) * dist;
        let id = state.next_entity_id();
        let enemy = if state.player.level > 5 && state.rng.random::<f32>() < 0.1 {
            Enemy::baked(id, pos, state.player.level)
        } else {
            Enemy::spawn(id, pos, state.player.level, &mut state.rng)
        };
        state.enemies.push(enemy);
    }
}

/// Spawn-direction policy: behind existing swarms once a crowd exists,
/// else behind the player's movement, else anywhere.
fn spawn_bias_angle(state: &mut SimulationState, move_dir: Vec2) -> f32 {
    // Swarm bias: aim at the (sampled) center of mass of the horde
    if state.enemies.len() > 20 && state.rng.random::<f32>() < 0.6 {
        let step = (state.enemies.len() / 20).max(1);
        let mut sum = Vec2::ZERO;
        let mut n = 0;
        for e in state.enemies.iter().step_by(step) {
            sum += e.pos;
            n += 1;
        }
        if n > 0 {
            let center = sum / n as f32;
            let swarm_angle = (center - state.player.pos).to_angle();
            return swarm_angle + (state.rng.random::<f32>() - 0.5) * 0.8;
        }
    }
    // Input bias: spawn behind the direction of travel
    if move_dir != Vec2::ZERO && state.rng.random::<f32>() < 0.9 {
        let rear = move_dir.to_angle() + std::f32::consts::PI;
        return rear + (state.rng.random::<f32>() - 0.5) * 3.5;
    }
    state.rng.random::<f32>() * std::f32::consts::TAU
}

fn spatula_quest(state: &mut SimulationState) {
    if state.director.boss_kills < 1 || !state.director.spawn_enabled {
        return;
    }
    state.director.spatula_timer += 1;

    let due = if state.director.spatula_spawned_once {
        state.director.spatula_timer > SPATULA_INTERVAL
    } else {
        state.director.spatula_timer > SPATULA_FIRST_DELAY
    };
    if !due {
        return;
    }
    state.director.spatula_spawned_once = true;
    state.director.spatula_timer = 0;

    let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
    let pos = state.player.pos + angle_to_dir(angle) * SPATULA_DISTANCE;
    state.pickups.push(Pickup::new(pos, PickupKind::Spatula));
    state.events.push(GameEvent::QuestSpawned { pos });
    state.events.push(GameEvent::Sfx(SoundCue::BossRoar));
    state.floating_text.push(FloatingText::cue(
        state.player.pos - Vec2::new(0.0, 150.0),
        "QUEST UNLOCKED! FOLLOW THE ARROW!",
        "gold",
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Archetype;
    use crate::sim::state::SimulationState;

    #[test]
    fn spawn_cap_holds() {
        let mut state = SimulationState::new(5);
        for _ in 0..ENEMY_CAP {
            let id = state.next_entity_id();
            let e = Enemy::spawn(id, Vec2::new(2000.0, 0.0), 1, &mut state.rng);
            state.enemies.push(e);
        }
        // Burn enough ticks for several spawn intervals
        for _ in 0..(SPAWN_INTERVAL_BASE * 3) {
            state.tick_count += 1;
            regular_spawns(&mut state, Vec2::ZERO);
        }
        assert_eq!(state.enemies.len(), ENEMY_CAP);
    }

    #[test]
    fn first_boss_is_time_gated() {
        let mut state = SimulationState::new(5);
        state.player.level = 50; // level gate must not apply yet
        state.game_time = FIRST_BOSS_TIME - 1.0;
        boss_gate(&mut state);
        assert!(state.director.active_boss.is_none());

        state.game_time = FIRST_BOSS_TIME + 1.0;
        boss_gate(&mut state);
        assert!(state.director.active_boss.is_some());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::BossSpawned { kind: BossKind::Chef, .. })));
    }

    #[test]
    fn no_second_boss_while_one_is_active() {
        let mut state = SimulationState::new(5);
        state.game_time = FIRST_BOSS_TIME + 1.0;
        boss_gate(&mut state);
        let count = state.enemies.len();
        state.game_time += 1000.0;
        boss_gate(&mut state);
        assert_eq!(state.enemies.len(), count);
    }

    #[test]
    fn pacing_rewrites_are_monotonic_until_collapse() {
        let mut d = SpawnDirector::new();
        d.boss_kills = 1;
        d.update_boss_pacing(200.0, 12);
        let (t1, l1) = (d.next_boss_time, d.next_boss_level);

        // Later death, higher level: both gates move outward
        d.boss_kills = 2;
        d.update_boss_pacing(500.0, 20);
        assert!(d.next_boss_time >= t1);
        assert!(d.next_boss_level >= l1);

        // Threshold crossed: both collapse to immediate
        d.boss_kills = KING_KILL_THRESHOLD;
        d.update_boss_pacing(800.0, 25);
        assert_eq!(d.next_boss_time, 800.0);
        assert_eq!(d.next_boss_level, 25);
    }

    #[test]
    fn king_spawns_after_threshold() {
        let mut state = SimulationState::new(5);
        state.director.boss_kills = KING_KILL_THRESHOLD;
        state.director.next_boss_time = 0.0;
        state.game_time = 1.0;
        boss_gate(&mut state);
        let boss = state.enemies.last().unwrap();
        assert!(
            matches!(&boss.archetype, Archetype::Boss(b) if b.kind == BossKind::King)
        );
    }

    #[test]
    fn chef_death_pays_out_and_reschedules() {
        let mut state = SimulationState::new(5);
        state.game_time = 200.0;
        state.player.level = 8;
        state.player.hp = 1.0;
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::boss(id, Vec2::new(500.0, 0.0), BossKind::Chef, 8, 0));
        state.director.active_boss = Some(id);

        on_boss_killed(&mut state, 0);
        assert!(state.enemies.is_empty());
        assert_eq!(state.director.boss_kills, 1);
        assert!(state.director.active_boss.is_none());
        assert_eq!(state.gems.total(), 35);
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.director.next_boss_time, 200.0 + BOSS_TIME_DELTA);
        assert_eq!(state.director.next_boss_level, 18);
        assert!(state
            .pickups
            .iter()
            .any(|p| p.kind == PickupKind::Chest));
    }

    #[test]
    fn king_death_leaves_corpse_and_blocks_bosses() {
        let mut state = SimulationState::new(5);
        state.director.boss_kills = KING_KILL_THRESHOLD;
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::boss(id, Vec2::ZERO, BossKind::King, 30, 3));
        state.director.active_boss = Some(id);
        // Clutter that the wind-down must clear
        let clutter_id = state.next_entity_id();
        let e = Enemy::spawn(clutter_id, Vec2::new(300.0, 0.0), 1, &mut state.rng);
        state.enemies.push(e);

        on_boss_killed(&mut state, 0);

        assert_eq!(state.enemies.len(), 1, "corpse persists, minions cleared");
        assert!(state.enemies[0].is_corpse());
        assert!(!state.director.spawn_enabled);
        assert!(state.director.active_boss.is_some());
        assert!(state.pickups.iter().any(|p| p.kind == PickupKind::Crown));

        // The gate can never open again
        state.game_time = 1e9;
        state.player.level = 99;
        boss_gate(&mut state);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn first_stampede_fires_once_after_first_kill() {
        let mut state = SimulationState::new(5);
        state.director.boss_kills = 1;
        check_formations(&mut state);
        assert!(state.director.stampede.is_some());
        // Lead-in, then wave 1 spawns 30 knives
        for _ in 0..60 {
            check_formations(&mut state);
        }
        assert_eq!(
            state
                .enemies
                .iter()
                .filter(|e| matches!(e.archetype, Archetype::Stampede(_)))
                .count(),
            30
        );
    }

    #[test]
    fn stampede_sequence_runs_five_waves() {
        let mut state = SimulationState::new(5);
        state.director.boss_kills = 1;
        for _ in 0..(60 + STAMPEDE_WAVE_GAP * 5 + 10) {
            check_formations(&mut state);
        }
        assert!(state.director.stampede.is_none());
        let waves: Vec<u32> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::FormationWave { wave, .. } => Some(*wave),
                _ => None,
            })
            .collect();
        assert_eq!(waves, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn spatula_first_spawn_is_delayed() {
        let mut state = SimulationState::new(5);
        state.director.boss_kills = 1;
        for _ in 0..SPATULA_FIRST_DELAY {
            spatula_quest(&mut state);
        }
        assert!(state.pickups.is_empty());
        spatula_quest(&mut state);
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(state.pickups[0].kind, PickupKind::Spatula);
    }
}
