//! Boss combatants and the king's beam state machine
//!
//! Bosses live in the same flat enemy collection as everything else; the
//! spawn director holds the single active-boss id. The terminal king is the
//! one enemy whose death does not remove it from the world: it flips to a
//! corpse state that persists and permanently blocks the boss gate.

use glam::Vec2;

use crate::consts::BOSS_HP_SCALING;

use super::enemy::{Archetype, Enemy};
use super::events::{GameEvent, SoundCue};
use super::player::Player;
use super::projectile::Knife;
use super::state::Camera;

/// Ticks between knife volleys
const CHEF_ATTACK_INTERVAL: u32 = 80;
const KING_ATTACK_INTERVAL: u32 = 50;
/// King beam cadence and telegraph duration
const BEAM_INTERVAL: u32 = 300;
const BEAM_WARMUP: u32 = 60;
/// Beam collision band height and damage
const BEAM_HEIGHT: f32 = 100.0;
const BEAM_DAMAGE: f32 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossKind {
    /// Recurring boss; escalates with each kill
    Chef,
    /// Terminal boss, spawned once the kill threshold is reached
    King,
}

impl BossKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chef => "The Chef",
            Self::King => "THE MASH KING",
        }
    }

    fn size(&self) -> f32 {
        match self {
            Self::Chef => 75.0,
            Self::King => 120.0,
        }
    }

    fn speed(&self) -> f32 {
        match self {
            Self::Chef => 150.0,
            Self::King => 120.0,
        }
    }

    fn attack_interval(&self) -> u32 {
        match self {
            Self::Chef => CHEF_ATTACK_INTERVAL,
            Self::King => KING_ATTACK_INTERVAL,
        }
    }

    fn max_hp(&self, player_level: u32, boss_kills: u32) -> f32 {
        match self {
            Self::Chef => {
                let scaling = 1.0 + boss_kills as f32 * BOSS_HP_SCALING;
                (3000.0 + player_level as f32 * 200.0) * scaling
            }
            Self::King => 60_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamPhase {
    Idle,
    /// Warning period before the damage pulse; the boss stands still
    Telegraph { ticks: u32 },
}

#[derive(Debug, Clone)]
pub struct BossState {
    pub kind: BossKind,
    pub attack_ticks: u32,
    /// Ticks since the last beam completed (king only)
    pub beam_cooldown: u32,
    pub beam: BeamPhase,
    /// Terminal dead state: inert, persistent, blocks further boss spawns
    pub corpse: bool,
}

impl Enemy {
    pub fn boss(id: u32, pos: Vec2, kind: BossKind, player_level: u32, boss_kills: u32) -> Self {
        let mut e = Enemy::base(
            id,
            pos,
            Archetype::Boss(BossState {
                kind,
                attack_ticks: 0,
                beam_cooldown: 0,
                beam: BeamPhase::Idle,
                corpse: false,
            }),
        );
        e.max_hp = kind.max_hp(player_level, boss_kills);
        e.hp = e.max_hp;
        e.size = kind.size();
        e.speed = kind.speed();
        e
    }
}

/// Advance one boss for one tick: pursuit, knife volleys, and (for the
/// king) the telegraphed beam. Contact damage and knockback run in the
/// shared enemy pass.
pub fn update_boss(
    enemy: &mut Enemy,
    player: &mut Player,
    knives: &mut Vec<Knife>,
    camera: &mut Camera,
    events: &mut Vec<GameEvent>,
    dt: f32,
) {
    let speed = enemy.current_speed();
    let pos = enemy.pos;
    let to_player = player.pos - pos;

    let Archetype::Boss(state) = &mut enemy.archetype else {
        return;
    };
    if state.corpse {
        return;
    }

    if let BeamPhase::Telegraph { ticks } = &mut state.beam {
        // Beaming: rooted in place until the pulse fires
        *ticks += 1;
        if *ticks > BEAM_WARMUP {
            events.push(GameEvent::Sfx(SoundCue::Nuke));
            camera.add_shake(30.0);
            if (player.pos.y - pos.y).abs() < BEAM_HEIGHT / 2.0 {
                player.take_damage(BEAM_DAMAGE, events);
            }
            state.beam = BeamPhase::Idle;
            state.beam_cooldown = 0;
        }
        return;
    }

    // Pursuit: bosses turn on a dime, their threat is bulk not finesse
    enemy.pos += to_player.normalize_or_zero() * speed * dt;

    state.attack_ticks += 1;
    if state.attack_ticks > state.kind.attack_interval() {
        state.attack_ticks = 0;
        events.push(GameEvent::Sfx(SoundCue::Knife));
        let aim = to_player.to_angle();
        match state.kind {
            BossKind::Chef => knives.push(Knife::new(pos, aim)),
            BossKind::King => {
                // Wide volley: five knives in a fan
                for i in -2..=2 {
                    knives.push(Knife::new(pos, aim + i as f32 * 0.15));
                }
            }
        }
    }

    if state.kind == BossKind::King {
        state.beam_cooldown += 1;
        if state.beam_cooldown > BEAM_INTERVAL {
            state.beam = BeamPhase::Telegraph { ticks: 0 };
            events.push(GameEvent::Sfx(SoundCue::Lightning));
        }
    }
}

/// Flip the king into its terminal corpse state. The entity stays in the
/// world; callers must not route it through the normal death payout.
pub fn enter_corpse_state(enemy: &mut Enemy) {
    if let Archetype::Boss(state) = &mut enemy.archetype {
        state.corpse = true;
        state.beam = BeamPhase::Idle;
    }
    enemy.knockback = Vec2::ZERO;
    enemy.hp = 0.0;
    // Not a normal death: the latch is released so the sweep keeps the
    // corpse in the world
    enemy.dead = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn king() -> Enemy {
        Enemy::boss(1, Vec2::new(0.0, 0.0), BossKind::King, 20, 3)
    }

    fn ctx() -> (Player, Vec<Knife>, Camera, Vec<GameEvent>) {
        (Player::new(), Vec::new(), Camera::default(), Vec::new())
    }

    #[test]
    fn chef_hp_scales_with_kills() {
        let b0 = Enemy::boss(1, Vec2::ZERO, BossKind::Chef, 10, 0);
        let b2 = Enemy::boss(1, Vec2::ZERO, BossKind::Chef, 10, 2);
        assert_eq!(b0.max_hp, 5000.0);
        assert_eq!(b2.max_hp, 5000.0 * 1.5);
    }

    #[test]
    fn king_volley_is_a_fan_of_five() {
        let (mut player, mut knives, mut camera, mut events) = ctx();
        player.pos = Vec2::new(500.0, 0.0);
        let mut boss = king();
        for _ in 0..=KING_ATTACK_INTERVAL {
            update_boss(&mut boss, &mut player, &mut knives, &mut camera, &mut events, 1.0 / 60.0);
        }
        assert_eq!(knives.len(), 5);
    }

    #[test]
    fn beam_telegraph_then_pulse_hits_aligned_player() {
        let (mut player, mut knives, mut camera, mut events) = ctx();
        // Aligned with the beam band, out of contact range
        player.pos = Vec2::new(2000.0, 10.0);
        let mut boss = king();
        if let Archetype::Boss(state) = &mut boss.archetype {
            state.beam_cooldown = BEAM_INTERVAL; // about to start
        }
        let dt = 1.0 / 60.0;
        update_boss(&mut boss, &mut player, &mut knives, &mut camera, &mut events, dt);
        let Archetype::Boss(state) = &boss.archetype else {
            unreachable!()
        };
        assert!(matches!(state.beam, BeamPhase::Telegraph { .. }));

        // During the warning the boss must not advance
        let held = boss.pos;
        for _ in 0..=BEAM_WARMUP {
            update_boss(&mut boss, &mut player, &mut knives, &mut camera, &mut events, dt);
        }
        assert_eq!(boss.pos, held);
        // Pulse fired and damaged the aligned player
        assert!(player.hp < player.max_hp);
        let Archetype::Boss(state) = &boss.archetype else {
            unreachable!()
        };
        assert_eq!(state.beam, BeamPhase::Idle);
    }

    #[test]
    fn beam_pulse_misses_unaligned_player() {
        let (mut player, mut knives, mut camera, mut events) = ctx();
        player.pos = Vec2::new(2000.0, 500.0);
        let mut boss = king();
        if let Archetype::Boss(state) = &mut boss.archetype {
            state.beam = BeamPhase::Telegraph { ticks: BEAM_WARMUP };
        }
        update_boss(&mut boss, &mut player, &mut knives, &mut camera, &mut events, 1.0 / 60.0);
        assert_eq!(player.hp, player.max_hp);
    }

    #[test]
    fn corpse_is_inert_and_unhittable() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(1);
        let (mut player, mut knives, mut camera, mut events) = ctx();
        let mut boss = king();
        enter_corpse_state(&mut boss);

        let before = boss.pos;
        update_boss(&mut boss, &mut player, &mut knives, &mut camera, &mut events, 1.0 / 60.0);
        assert_eq!(boss.pos, before);
        assert!(knives.is_empty());
        assert!(!boss.hit(1000.0, 0.0, 0.0, &mut rng));
        assert!(!boss.dead, "corpse is a distinct state, not a normal death");
    }
}
