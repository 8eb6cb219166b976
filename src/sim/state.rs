//! Simulation state: every collection the game mutates, in one place
//!
//! Subsystems never reach into ambient scope; they receive this struct (or
//! disjoint borrows of its fields) and nothing else. One instance is one
//! run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::director::SpawnDirector;
use super::enemy::Enemy;
use super::events::GameEvent;
use super::gems::GemPool;
use super::pickups::Pickup;
use super::player::{Player, Upgrade};
use super::projectile::{Knife, Mine, Projectile};
use super::spatial::SpatialGrid;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    /// Clock frozen; every timer resumes from its stored counter
    Paused,
    GameOver,
    Victory,
}

/// Camera follow state. Lives in the sim so pause freezes it with
/// everything else; only the renderer reads it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Camera {
    pub pos: Vec2,
    pub shake: f32,
}

impl Camera {
    pub fn add_shake(&mut self, amount: f32) {
        self.shake = (self.shake + amount).min(60.0);
    }

    /// Smoothed follow with decaying shake. Non-finite positions (a
    /// divide-by-zero somewhere upstream) reset to the target instead of
    /// propagating.
    pub fn follow(&mut self, target: Vec2) {
        if !self.pos.is_finite() {
            self.pos = target;
        }
        self.pos += (target - self.pos) * 0.1;
        self.shake *= 0.9;
        if self.shake < 0.5 {
            self.shake = 0.0;
        }
    }
}

/// Floating combat text, read by the renderer from the snapshot
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: &'static str,
    pub life: u32,
}

impl FloatingText {
    pub fn damage(pos: Vec2, dmg: f32) -> Self {
        Self {
            pos: pos - Vec2::new(0.0, 20.0),
            text: format!("{}", dmg.floor() as i64),
            color: "white",
            life: 40,
        }
    }

    pub fn cue(pos: Vec2, text: &str, color: &'static str) -> Self {
        Self {
            pos,
            text: text.to_owned(),
            color,
            life: 120,
        }
    }
}

pub struct SimulationState {
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub tick_count: u64,
    pub game_time: f32,
    pub score: u64,

    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Boss projectiles, kept apart so player weapons never sweep them
    pub knives: Vec<Knife>,
    pub mines: Vec<Mine>,
    pub pickups: Vec<Pickup>,
    pub gems: GemPool,
    pub director: SpawnDirector,
    pub camera: Camera,
    pub floating_text: Vec<FloatingText>,
    pub events: Vec<GameEvent>,

    pub grid: SpatialGrid,
    // Scratch buffers reused across ticks
    pub(super) neighbor_buf: Vec<usize>,
    pub(super) separation_buf: Vec<Vec2>,
    next_id: u32,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            tick_count: 0,
            game_time: 0.0,
            score: 0,
            player: Player::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            knives: Vec::new(),
            mines: Vec::new(),
            pickups: Vec::new(),
            gems: GemPool::new(),
            director: SpawnDirector::new(),
            camera: Camera::default(),
            floating_text: Vec::new(),
            events: Vec::new(),
            grid: SpatialGrid::default(),
            neighbor_buf: Vec::new(),
            separation_buf: Vec::new(),
            next_id: 1,
        }
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Hand the accumulated events to the host and clear the queue
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Host-side upgrade application (level-up menu choice)
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        self.player.apply_upgrade(upgrade);
    }

    pub fn boss(&self) -> Option<&Enemy> {
        let id = self.director.active_boss?;
        self.enemies.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_playing_and_empty() {
        let state = SimulationState::new(1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.level, 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn entity_ids_are_unique() {
        let mut state = SimulationState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn camera_resets_on_non_finite() {
        let mut camera = Camera::default();
        camera.pos = Vec2::new(f32::NAN, 0.0);
        camera.follow(Vec2::new(10.0, 10.0));
        assert!(camera.pos.is_finite());
    }

    #[test]
    fn drain_events_empties_queue() {
        let mut state = SimulationState::new(1);
        state.events.push(GameEvent::GameOver { score: 0 });
        let drained = state.drain_events();
        assert_eq!(drained.len(), 1);
        assert!(state.events.is_empty());
    }
}
