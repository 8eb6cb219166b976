//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies
//!
//! One tick advances every subsystem in a fixed sequence (spawn decisions,
//! physics/AI, collision, pool reconciliation, cleanup). Hosts feed
//! [`TickInput`], drain [`GameEvent`]s, and draw from [`RenderSnapshot`].

pub mod boss;
pub mod director;
pub mod enemy;
pub mod events;
pub mod gems;
pub mod pickups;
pub mod player;
pub mod projectile;
pub mod snapshot;
pub mod spatial;
pub mod state;
pub mod tick;
pub mod weapons;

pub use boss::{BeamPhase, BossKind, BossState};
pub use director::SpawnDirector;
pub use enemy::{Archetype, Enemy, SweepDir};
pub use events::{GameEvent, SoundCue};
pub use gems::{GemPool, GemTier};
pub use pickups::{Pickup, PickupKind};
pub use player::{PassiveKind, Player, Upgrade};
pub use projectile::{Knife, Mine, Projectile};
pub use snapshot::{snapshot, RenderSnapshot, SpriteKind};
pub use spatial::SpatialGrid;
pub use state::{Camera, GamePhase, SimulationState};
pub use tick::{run_frame, tick, TickInput};
pub use weapons::{Arsenal, WeaponKind, WeaponSlot};
