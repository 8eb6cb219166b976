//! Enemy combatants
//!
//! Variants are a tagged enum rather than a class hierarchy; shared behavior
//! (knockback, i-frames, slow, death latch) lives on the one `Enemy` struct
//! and per-archetype behavior branches on the tag.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{
    BOSS_KNOCKBACK_DECAY, HIT_FLASH_TICKS, HIT_INVULN_TICKS, KNOCKBACK_DECAY, KNOCKBACK_EPSILON,
    KNOCKBACK_RESIST, MAX_SEPARATION_CHECKS, PLAYER_SPEED, SEPARATION_FORCE, TURN_LERP,
};
use crate::{angle_to_dir, normalize_angle};

use super::boss::BossState;
use super::events::{GameEvent, SoundCue};
use super::gems::{GemPool, GemTier};
use super::pickups::{Pickup, PickupKind};
use super::spatial::SpatialGrid;
use super::state::FloatingText;

/// Sweep direction for formation hazards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDir {
    Right,
    Down,
}

#[derive(Debug, Clone)]
pub enum Archetype {
    /// Medium pursuit enemy
    Rotten,
    /// Weak and fast, one-shot range
    Fry,
    /// Slow tank with a steam plume
    Baked,
    /// Formation hazard: straight-line sweep, no pursuit
    Stampede(SweepDir),
    Boss(BossState),
}

pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub knockback: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    /// Base speed in px/s; slow status scales it per tick
    pub speed: f32,
    /// Smoothed pursuit heading; None until the first steering tick
    pub heading: Option<f32>,
    pub elite: bool,
    pub archetype: Archetype,
    pub invuln_ticks: u32,
    pub flash_ticks: u32,
    pub slow_ticks: u32,
    pub squash_ticks: u32,
    /// Latched by the death transition; exactly one per enemy
    pub dead: bool,
    /// Mass-kill deaths skip cosmetic feedback
    pub silent_death: bool,
}

impl Enemy {
    pub(super) fn base(id: u32, pos: Vec2, archetype: Archetype) -> Self {
        Self {
            id,
            pos,
            knockback: Vec2::ZERO,
            hp: 1.0,
            max_hp: 1.0,
            size: 15.0,
            speed: 0.0,
            heading: None,
            elite: false,
            archetype,
            invuln_ticks: 0,
            flash_ticks: 0,
            slow_ticks: 0,
            squash_ticks: 0,
            dead: false,
            silent_death: false,
        }
    }

    /// Ordinary spawn: coin-flip rotten/fry, 2% elite with fixed multipliers
    pub fn spawn(id: u32, pos: Vec2, player_level: u32, rng: &mut Pcg32) -> Self {
        let elite = rng.random::<f32>() < 0.02;
        let fry = rng.random::<bool>();
        let mut e = if fry {
            let mut e = Self::base(id, pos, Archetype::Fry);
            e.max_hp = 5.0 + player_level as f32 * 2.0;
            e.speed = PLAYER_SPEED * 0.6 + rng.random::<f32>() * 60.0;
            e.size = 16.0;
            e
        } else {
            let mut e = Self::base(id, pos, Archetype::Rotten);
            e.max_hp = 20.0 + player_level as f32 * 5.0;
            e.speed = PLAYER_SPEED * 0.45;
            e.size = 15.0;
            e
        };
        if elite {
            e.elite = true;
            e.max_hp *= 5.0;
            e.size = 25.0;
        }
        e.hp = e.max_hp;
        e
    }

    pub fn baked(id: u32, pos: Vec2, player_level: u32) -> Self {
        let mut e = Self::base(id, pos, Archetype::Baked);
        e.max_hp = 50.0 + player_level as f32 * 12.0;
        e.hp = e.max_hp;
        e.speed = 30.0;
        e.size = 35.0;
        e
    }

    pub fn stampede(id: u32, pos: Vec2, dir: SweepDir, player_level: u32) -> Self {
        let mut e = Self::base(id, pos, Archetype::Stampede(dir));
        e.max_hp = 10.0 + player_level as f32 * 3.0;
        e.hp = e.max_hp;
        e.speed = 210.0;
        e.size = 20.0;
        e
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.archetype, Archetype::Boss(_))
    }

    pub fn is_corpse(&self) -> bool {
        matches!(&self.archetype, Archetype::Boss(b) if b.corpse)
    }

    /// Contact damage dealt to an overlapping player
    pub fn contact_damage(&self) -> f32 {
        match &self.archetype {
            Archetype::Boss(_) => 20.0,
            Archetype::Stampede(_) => 40.0,
            _ if self.elite => 15.0,
            _ => 5.0,
        }
    }

    fn knockback_decay(&self) -> f32 {
        if self.is_boss() {
            BOSS_KNOCKBACK_DECAY
        } else {
            KNOCKBACK_DECAY
        }
    }

    pub fn apply_slow(&mut self, ticks: u32) {
        self.slow_ticks = self.slow_ticks.max(ticks);
    }

    pub fn apply_squash(&mut self, ticks: u32) {
        self.squash_ticks = ticks;
        self.apply_slow(ticks);
    }

    /// Effective speed after the slow status. Bosses shrug most of it off.
    pub fn current_speed(&self) -> f32 {
        if self.slow_ticks > 0 {
            let mult = if self.is_boss() { 0.65 } else { 0.3 };
            self.speed * mult
        } else {
            self.speed
        }
    }

    /// The single damage entry point for everything that hurts enemies.
    /// No-op inside the post-hit invulnerability window; at most one death
    /// transition ever fires. Returns true if this hit was lethal.
    pub fn hit(&mut self, dmg: f32, kb_angle: f32, kb_force: f32, rng: &mut Pcg32) -> bool {
        if self.invuln_ticks > 0 || self.dead {
            return false;
        }
        if let Archetype::Boss(boss) = &self.archetype {
            if boss.corpse {
                return false;
            }
        }
        self.hp -= dmg;
        self.invuln_ticks = HIT_INVULN_TICKS;
        self.flash_ticks = HIT_FLASH_TICKS;

        if kb_force > 0.0 {
            let mut k = kb_force;
            if self.elite || self.is_boss() {
                k *= KNOCKBACK_RESIST;
            }
            // Jitter keeps stacked enemies from locking into a column
            self.knockback = angle_to_dir(kb_angle) * k
                + Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
        }

        if self.hp <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Mark dead without feedback (nuke and offscreen culls)
    pub fn kill_silent(&mut self) {
        if !self.dead {
            self.dead = true;
            self.silent_death = true;
        }
    }

    /// Advance shared per-tick status timers
    pub fn tick_timers(&mut self) {
        if self.invuln_ticks > 0 {
            self.invuln_ticks -= 1;
        }
        if self.flash_ticks > 0 {
            self.flash_ticks -= 1;
        }
        if self.squash_ticks > 0 {
            self.squash_ticks -= 1;
        }
        if self.slow_ticks > 0 {
            self.slow_ticks -= 1;
        }
    }

    /// Apply knockback as a per-tick displacement and decay it
    /// geometrically; snaps to zero below epsilon so it converges instead
    /// of trailing forever.
    pub fn integrate_knockback(&mut self) {
        self.pos += self.knockback;
        self.knockback *= self.knockback_decay();
        if self.knockback.length_squared() < KNOCKBACK_EPSILON * KNOCKBACK_EPSILON {
            self.knockback = Vec2::ZERO;
        }
    }

    /// Angularly-smoothed pursuit: close a fixed fraction of the wrapped
    /// angular error per tick, producing kiteable movement.
    pub fn steer_toward(&mut self, target: Vec2) -> Vec2 {
        let desired = (target - self.pos).to_angle();
        let current = *self.heading.get_or_insert(desired);
        let diff = normalize_angle(desired - current);
        let heading = current + diff * TURN_LERP;
        self.heading = Some(heading);
        angle_to_dir(heading) * self.current_speed()
    }
}

/// Weapon-facing wrapper around [`Enemy::hit`]: applies the hit through the
/// one damage contract and emits the floating damage number when (and only
/// when) damage landed. Returns true if the hit was lethal.
pub fn strike(
    enemy: &mut Enemy,
    dmg: f32,
    kb_angle: f32,
    kb_force: f32,
    rng: &mut Pcg32,
    texts: &mut Vec<FloatingText>,
) -> bool {
    if enemy.invuln_ticks > 0 || enemy.dead || enemy.is_corpse() {
        return false;
    }
    texts.push(FloatingText::damage(enemy.pos, dmg));
    enemy.hit(dmg, kb_angle, kb_force, rng)
}

/// Per-enemy separation vectors, computed against the spatial grid with a
/// hard cap on comparisons so a packed cell cannot blow the frame budget.
pub fn compute_separation(
    enemies: &[Enemy],
    grid: &SpatialGrid,
    neighbor_buf: &mut Vec<usize>,
    out: &mut Vec<Vec2>,
) {
    out.clear();
    out.resize(enemies.len(), Vec2::ZERO);
    for (i, e) in enemies.iter().enumerate() {
        // Bosses plow through; stampede hazards hold formation
        if e.is_boss() || matches!(e.archetype, Archetype::Stampede(_)) {
            continue;
        }
        grid.neighbors_into(e.pos, neighbor_buf);
        let mut sep = Vec2::ZERO;
        let mut checks = 0;
        for &j in neighbor_buf.iter() {
            if checks >= MAX_SEPARATION_CHECKS {
                break;
            }
            if j == i || j >= enemies.len() {
                continue;
            }
            let other = &enemies[j];
            if other.is_boss() {
                continue;
            }
            let delta = e.pos - other.pos;
            let dist_sq = delta.length_squared();
            let min_dist = e.size + other.size;
            if dist_sq < min_dist * min_dist && dist_sq > 0.0 {
                let dist = dist_sq.sqrt();
                let push = (min_dist - dist) / min_dist;
                sep += delta / dist * push * min_dist;
            }
            checks += 1;
        }
        out[i] = sep * SEPARATION_FORCE;
    }
}

/// Resolve the death payout for one enemy: loot policy, rare drops, score.
/// Bosses never reach this path (the director owns their deaths).
pub fn resolve_death(
    enemy: &Enemy,
    player_level: u32,
    rng: &mut Pcg32,
    gems: &mut GemPool,
    pickups: &mut Vec<Pickup>,
    score: &mut u64,
    events: &mut Vec<GameEvent>,
) {
    debug_assert!(!enemy.is_boss());

    // Gem policy: purple is a rarer tier unlocked by player progression.
    // Elites pay better even before the unlock.
    let (tier, value) = if enemy.elite {
        if player_level >= 15 {
            (GemTier::Purple, 50)
        } else {
            (GemTier::Green, 20)
        }
    } else if player_level >= 20 && rng.random::<f32>() < 0.1 {
        (GemTier::Purple, 50)
    } else {
        (GemTier::Green, 5)
    };
    gems.spawn(enemy.pos, value, tier);

    // Independent low-probability rare drops (one roll, banded)
    let roll = rng.random::<f32>();
    if roll < 0.005 {
        pickups.push(Pickup::new(enemy.pos, PickupKind::Health));
    } else if roll < 0.007 {
        pickups.push(Pickup::new(enemy.pos, PickupKind::Magnet));
    } else if roll < 0.008 {
        pickups.push(Pickup::new(enemy.pos, PickupKind::Nuke));
    }

    *score += 1;

    if !enemy.silent_death {
        events.push(GameEvent::Sfx(SoundCue::Splat));
        events.push(GameEvent::EnemyDied {
            pos: enemy.pos,
            elite: enemy.elite,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn hit_within_invuln_window_applies_once() {
        let mut rng = rng();
        let mut e = Enemy::spawn(1, Vec2::ZERO, 1, &mut rng);
        let hp = e.hp;
        e.hit(3.0, 0.0, 0.0, &mut rng);
        e.hit(3.0, 0.0, 0.0, &mut rng);
        assert_eq!(e.hp, hp - 3.0);
    }

    #[test]
    fn lethal_hit_latches_death_exactly_once() {
        let mut rng = rng();
        let mut e = Enemy::spawn(1, Vec2::ZERO, 1, &mut rng);
        e.hp = 1.0;
        assert!(e.hit(5.0, 0.0, 0.0, &mut rng));
        // A second lethal hit must not re-trigger the transition
        e.invuln_ticks = 0;
        assert!(!e.hit(5.0, 0.0, 0.0, &mut rng));
    }

    #[test]
    fn elite_resists_knockback() {
        let mut rng = rng();
        let mut normal = Enemy::base(1, Vec2::ZERO, Archetype::Rotten);
        normal.max_hp = 100.0;
        normal.hp = 100.0;
        let mut elite = Enemy::base(2, Vec2::ZERO, Archetype::Rotten);
        elite.elite = true;
        elite.max_hp = 100.0;
        elite.hp = 100.0;

        normal.hit(1.0, 0.0, 10.0, &mut rng);
        elite.hit(1.0, 0.0, 10.0, &mut rng);
        // Jitter is sub-unit; the resist factor dominates
        assert!(elite.knockback.length() < normal.knockback.length());
    }

    #[test]
    fn steering_is_smoothed_not_snapped() {
        let mut rng = rng();
        let mut e = Enemy::spawn(1, Vec2::new(100.0, 0.0), 1, &mut rng);
        // First steer initializes the heading directly at the target
        e.steer_toward(Vec2::ZERO);
        let first = e.heading.unwrap();
        // Target jumps 90 degrees; heading must only close a fraction
        e.steer_toward(Vec2::new(100.0, 1000.0));
        let second = e.heading.unwrap();
        let desired = (Vec2::new(100.0, 1000.0) - e.pos).to_angle();
        assert!((second - first).abs() < (desired - first).abs());
    }

    #[test]
    fn separation_caps_comparisons() {
        let mut rng = rng();
        // 100 enemies stacked on one point: the cap keeps this bounded and
        // the computed vector finite.
        let enemies: Vec<Enemy> = (0..100)
            .map(|i| Enemy::spawn(i, Vec2::new(0.01 * i as f32, 0.0), 1, &mut rng))
            .collect();
        let mut grid = SpatialGrid::default();
        for (i, e) in enemies.iter().enumerate() {
            grid.insert(i, e.pos);
        }
        let mut buf = Vec::new();
        let mut out = Vec::new();
        compute_separation(&enemies, &grid, &mut buf, &mut out);
        assert_eq!(out.len(), enemies.len());
        assert!(out.iter().all(|v| v.is_finite()));
    }

    proptest! {
        /// knockback (k, 0) with decay f becomes (k * f^n, 0) after n ticks,
        /// until the snap-to-zero epsilon kicks in
        #[test]
        fn knockback_decays_geometrically(k in 10.0f32..500.0, n in 1u32..20) {
            let mut e = Enemy::base(1, Vec2::ZERO, Archetype::Rotten);
            e.knockback = Vec2::new(k, 0.0);
            for _ in 0..n {
                e.integrate_knockback();
            }
            let expected = k * KNOCKBACK_DECAY.powi(n as i32);
            if expected < KNOCKBACK_EPSILON {
                prop_assert_eq!(e.knockback, Vec2::ZERO);
            } else {
                prop_assert!((e.knockback.x - expected).abs() < expected * 1e-3);
                prop_assert_eq!(e.knockback.y, 0.0);
            }
        }
    }

    #[test]
    fn elite_loot_gated_by_level() {
        let mut rng = rng();
        let mut e = Enemy::spawn(1, Vec2::ZERO, 1, &mut rng);
        e.elite = true;
        e.kill_silent();

        let mut gems = GemPool::new();
        let mut pickups = Vec::new();
        let mut score = 0;
        let mut events = Vec::new();

        // Below the unlock level the elite still pays common tier
        resolve_death(&e, 10, &mut rng, &mut gems, &mut pickups, &mut score, &mut events);
        assert_eq!(gems.sleeping.last().unwrap().tier, GemTier::Green);
        assert_eq!(gems.sleeping.last().unwrap().value, 20);

        resolve_death(&e, 15, &mut rng, &mut gems, &mut pickups, &mut score, &mut events);
        assert_eq!(gems.sleeping.last().unwrap().tier, GemTier::Purple);
        assert_eq!(score, 2);
    }

    #[test]
    fn timers_count_down() {
        let mut rng = rng();
        let mut e = Enemy::spawn(1, Vec2::ZERO, 1, &mut rng);
        e.hit(1.0, 0.0, 0.0, &mut rng);
        assert_eq!(e.invuln_ticks, HIT_INVULN_TICKS);
        e.tick_timers();
        assert_eq!(e.invuln_ticks, HIT_INVULN_TICKS - 1);
        assert_eq!(e.flash_ticks, HIT_FLASH_TICKS - 1);
    }
}
