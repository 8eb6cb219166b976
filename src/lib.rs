//! Mash Arena - a top-down survival arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, combat, weapons, loot)
//! - `settings`: Persisted preferences (volume)
//!
//! Rendering, audio and UI are host concerns: they drive the sim through
//! [`sim::TickInput`], drain [`sim::GameEvent`]s, and draw from
//! [`sim::RenderSnapshot`]. Nothing in `sim` touches a platform API.

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum frame delta fed to the accumulator, to prevent spiral of death
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 300.0;
    pub const PLAYER_MAX_HP: f32 = 150.0;
    pub const PLAYER_RADIUS: f32 = 20.0;
    /// I-frames after the player is hit (ticks)
    pub const PLAYER_INVULN_TICKS: u32 = 10;
    /// Base XP required for level 2; the curve multiplies from here
    pub const XP_BASE: u32 = 50;
    pub const LEVEL_CAP: u32 = 100;

    /// Enemy population hard cap (lag prevention)
    pub const ENEMY_CAP: usize = 300;
    /// Base spawn interval in ticks; shrinks with player level
    pub const SPAWN_INTERVAL_BASE: u32 = 40;
    pub const SPAWN_INTERVAL_FLOOR: u32 = 10;
    /// Enemies spawn in a ring this far from the player
    pub const SPAWN_DISTANCE_MIN: f32 = 1100.0;
    pub const SPAWN_DISTANCE_SPREAD: f32 = 300.0;

    /// Enemy hit feedback
    pub const HIT_INVULN_TICKS: u32 = 5;
    pub const HIT_FLASH_TICKS: u32 = 10;
    /// Geometric knockback decay per tick
    pub const KNOCKBACK_DECAY: f32 = 0.85;
    pub const BOSS_KNOCKBACK_DECAY: f32 = 0.8;
    /// Elites and bosses take reduced knockback
    pub const KNOCKBACK_RESIST: f32 = 0.3;
    /// Knockback below this magnitude snaps to zero
    pub const KNOCKBACK_EPSILON: f32 = 0.5;
    /// Fraction of the angular error closed per tick while turning
    pub const TURN_LERP: f32 = 0.08;
    /// Separation comparisons examined per enemy per tick
    pub const MAX_SEPARATION_CHECKS: usize = 15;
    pub const SEPARATION_FORCE: f32 = 0.8;

    /// Spatial grid cell size
    pub const CELL_SIZE: f32 = 100.0;

    /// Gem pool tuning
    pub const GEM_WAKE_DISTANCE: f32 = 600.0;
    pub const GEM_SLEEP_DISTANCE: f32 = 750.0;
    /// Physics bodies materialized from the wake queue per tick
    pub const GEMS_PER_TICK: usize = 20;
    /// Homing gem speed
    pub const GEM_SPEED: f32 = 720.0;
    /// Base pickup radius, scaled by the player's pickup stat
    pub const PICKUP_RANGE: f32 = 120.0;

    /// Weapon level above which a weapon is evolved
    pub const MAX_WEAPON_LEVEL: u8 = 5;

    /// Boss pacing: first gate is time-only
    pub const FIRST_BOSS_TIME: f32 = 180.0;
    pub const BOSS_TIME_DELTA: f32 = 180.0;
    pub const BOSS_LEVEL_DELTA: u32 = 10;
    /// Boss kills before the terminal king spawns and pacing collapses
    pub const KING_KILL_THRESHOLD: u32 = 3;
    /// Boss health scaling per prior kill
    pub const BOSS_HP_SCALING: f32 = 0.25;

    /// Cosmetic caps, enforced by truncation every tick
    pub const FLOATING_TEXT_CAP: usize = 60;
}

/// Normalize an angle to (-PI, PI]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }
}
