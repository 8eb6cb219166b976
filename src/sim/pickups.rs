//! World pickups: rare drops, boss chests, the spatula quest, the crown
//!
//! Every pickup implements the same tiny contract: bob in place, check
//! collection against the player, apply its effect through the normal
//! gameplay mutation points, and report whether it stays alive.

use glam::Vec2;

use super::events::{GameEvent, SoundCue};
use super::state::{FloatingText, GamePhase, SimulationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    /// +30 HP
    Health,
    /// Wake every gem on the map, force-homing
    Magnet,
    /// Silently kill every non-boss enemy
    Nuke,
    /// Boss drop: one auto-granted reward
    Chest,
    /// Quest reward far from the player: five auto-granted rewards
    Spatula,
    /// Terminal pickup dropped by the king's corpse; ends the run
    Crown,
}

#[derive(Debug, Clone)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
    /// Cosmetic bob phase, exposed to the renderer
    pub bob: f32,
}

impl Pickup {
    pub fn new(pos: Vec2, kind: PickupKind) -> Self {
        Self {
            pos,
            kind,
            bob: 0.0,
        }
    }

    fn collect_radius(&self, player_radius: f32) -> f32 {
        match self.kind {
            PickupKind::Spatula | PickupKind::Crown => player_radius + 40.0,
            _ => player_radius + 30.0,
        }
    }
}

/// Advance and collect pickups. Effects run through the same entry points
/// normal gameplay uses (damage contract, gem pool, upgrade application).
pub fn update_pickups(state: &mut SimulationState) {
    let SimulationState {
        player,
        enemies,
        gems,
        pickups,
        events,
        rng,
        camera,
        floating_text,
        phase,
        score,
        ..
    } = state;

    pickups.retain_mut(|pickup| {
        pickup.bob += 0.1;

        let dist_sq = pickup.pos.distance_squared(player.pos);
        let collect = pickup.collect_radius(player.radius);
        // Magnet pickups reach out a little on their own
        let magnet_reach = pickup.kind == PickupKind::Magnet && dist_sq < 100.0 * 100.0;
        if dist_sq >= collect * collect && !magnet_reach {
            return true;
        }

        match pickup.kind {
            PickupKind::Health => {
                player.hp = (player.hp + 30.0).min(player.max_hp);
                events.push(GameEvent::Sfx(SoundCue::Heal));
                floating_text.push(FloatingText::cue(player.pos, "+30 HP", "green"));
            }
            PickupKind::Magnet => {
                gems.trigger_magnet();
                events.push(GameEvent::Sfx(SoundCue::Magnet));
            }
            PickupKind::Nuke => {
                // Mass kill: silent deaths, loot still resolves this tick
                for e in enemies.iter_mut() {
                    if !e.is_boss() {
                        e.kill_silent();
                    }
                }
                events.push(GameEvent::Sfx(SoundCue::Nuke));
                camera.add_shake(20.0);
            }
            PickupKind::Chest => {
                let reward = player.random_upgrade(rng);
                player.apply_upgrade(reward);
                events.push(GameEvent::Sfx(SoundCue::Fanfare));
                events.push(GameEvent::LevelUp {
                    level: player.level,
                    choices: 1,
                    auto: true,
                });
            }
            PickupKind::Spatula => {
                for _ in 0..5 {
                    let reward = player.random_upgrade(rng);
                    player.apply_upgrade(reward);
                }
                events.push(GameEvent::Sfx(SoundCue::Fanfare));
                events.push(GameEvent::LevelUp {
                    level: player.level,
                    choices: 5,
                    auto: true,
                });
            }
            PickupKind::Crown => {
                *phase = GamePhase::Victory;
                events.push(GameEvent::Sfx(SoundCue::Fanfare));
                events.push(GameEvent::Victory { score: *score });
            }
        }
        false
    });
}
