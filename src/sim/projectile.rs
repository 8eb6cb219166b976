//! Transient combat entities: player shots, boss knives, mines and pools
//!
//! Every instance carries an active flag and is removed the tick it goes
//! false. Damage, pierce, lifetime and AOE radius are fixed at creation.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::angle_to_dir;

use super::enemy::{strike, Enemy};
use super::events::{GameEvent, SoundCue};
use super::state::{Camera, FloatingText};

/// How far from the player a stray shot may travel before being culled
const SHOT_CULL_DISTANCE: f32 = 1000.0;
const KNIFE_CULL_DISTANCE: f32 = 1200.0;
const KNIFE_SPEED: f32 = 720.0;
const KNIFE_DAMAGE: f32 = 20.0;

/// Masher arc gravity (px/s^2)
const ARC_GRAVITY: f32 = 1800.0;

#[derive(Debug, Clone)]
pub enum ProjectileKind {
    /// Straight shot at a locked target direction; evolved rounds burst
    Spud,
    /// Lobbed overhead, falls under gravity, pierces everything once
    Masher { spin: f32, hit_ids: Vec<u32> },
    /// Ballistic bottle that becomes an oil pool where it lands
    OilBottle {
        start: Vec2,
        target: Vec2,
        progress: f32,
        radius: f32,
        pool_damage: f32,
    },
    /// Short-lived shotgun fragment
    Shard { life_ticks: u32 },
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub evolved: bool,
    pub kind: ProjectileKind,
    pub active: bool,
}

/// Boss-thrown knife aimed at the player
#[derive(Debug, Clone)]
pub struct Knife {
    pub pos: Vec2,
    pub vel: Vec2,
    pub spin: f32,
    pub active: bool,
}

impl Knife {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            vel: angle_to_dir(angle) * KNIFE_SPEED,
            spin: 0.0,
            active: true,
        }
    }
}

/// Ground hazards with a timer
#[derive(Debug, Clone)]
pub enum Mine {
    /// Explosive charge dropped at the player's feet
    Tot {
        pos: Vec2,
        fuse: u32,
        radius: f32,
        damage: f32,
        /// Evolved tots split into a cluster of minis
        cluster: bool,
    },
    /// Damage-over-time puddle, ticking on a fixed cadence
    OilPool {
        pos: Vec2,
        radius: f32,
        damage: f32,
        life: u32,
        /// Evolved pools also slow
        slows: bool,
    },
}

pub fn update_projectiles(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    mines: &mut Vec<Mine>,
    player_pos: Vec2,
    rng: &mut Pcg32,
    texts: &mut Vec<FloatingText>,
    events: &mut Vec<GameEvent>,
    dt: f32,
) {
    for p in projectiles.iter_mut() {
        match &mut p.kind {
            ProjectileKind::Spud => {
                p.pos += p.vel * dt;
                for i in 0..enemies.len() {
                    let hit_dist = enemies[i].size + 10.0;
                    if enemies[i].pos.distance_squared(p.pos) < hit_dist * hit_dist
                        && !enemies[i].dead
                    {
                        if p.evolved {
                            // Explosive round: everything near the impact
                            events.push(GameEvent::Sfx(SoundCue::Pop));
                            for e in enemies.iter_mut() {
                                if e.pos.distance_squared(p.pos) < 100.0 * 100.0 {
                                    let angle = (e.pos - p.pos).to_angle();
                                    strike(e, p.damage, angle, 6.0, rng, texts);
                                }
                            }
                        } else {
                            let angle = p.vel.to_angle();
                            strike(&mut enemies[i], p.damage, angle, 1.0, rng, texts);
                        }
                        p.active = false;
                        break;
                    }
                }
                if p.pos.distance_squared(player_pos) > SHOT_CULL_DISTANCE * SHOT_CULL_DISTANCE {
                    p.active = false;
                }
            }
            ProjectileKind::Masher { spin, hit_ids } => {
                p.pos += p.vel * dt;
                p.vel.y += ARC_GRAVITY * dt;
                *spin += 12.0 * dt;
                for e in enemies.iter_mut() {
                    let hit_dist = e.size + 15.0;
                    if e.pos.distance_squared(p.pos) < hit_dist * hit_dist
                        && !hit_ids.contains(&e.id)
                    {
                        hit_ids.push(e.id);
                        let angle = (e.pos - p.pos).to_angle();
                        strike(e, p.damage, angle, 1.0, rng, texts);
                    }
                }
                // Fell past the bottom of the arc
                if p.pos.y > player_pos.y + 500.0 {
                    p.active = false;
                }
            }
            ProjectileKind::OilBottle {
                start,
                target,
                progress,
                radius,
                pool_damage,
            } => {
                *progress += 3.0 * dt;
                if *progress >= 1.0 {
                    events.push(GameEvent::Sfx(SoundCue::Splat));
                    mines.push(Mine::OilPool {
                        pos: *target,
                        radius: *radius,
                        damage: *pool_damage,
                        life: if p.evolved { 400 } else { 180 },
                        slows: p.evolved,
                    });
                    p.active = false;
                } else {
                    // Lerp with a cosmetic lob; the landing point is fixed
                    let flat = start.lerp(*target, *progress);
                    let lob = (*progress * std::f32::consts::PI).sin() * 100.0;
                    p.pos = Vec2::new(flat.x, flat.y - lob);
                }
            }
            ProjectileKind::Shard { life_ticks } => {
                p.pos += p.vel * dt;
                *life_ticks = life_ticks.saturating_sub(1);
                if *life_ticks == 0 {
                    p.active = false;
                }
                for e in enemies.iter_mut() {
                    let hit_dist = e.size + 20.0;
                    if e.pos.distance_squared(p.pos) < hit_dist * hit_dist && !e.dead {
                        strike(e, p.damage, 0.0, 0.0, rng, texts);
                        p.active = false;
                        break;
                    }
                }
            }
        }
    }
    projectiles.retain(|p| p.active);
}

pub fn update_knives(
    knives: &mut Vec<Knife>,
    player: &mut super::player::Player,
    events: &mut Vec<GameEvent>,
    dt: f32,
) {
    for knife in knives.iter_mut() {
        knife.pos += knife.vel * dt;
        knife.spin += 30.0 * dt;

        let hit_dist = 20.0 + player.radius;
        let to_player = knife.pos.distance_squared(player.pos);
        if to_player < hit_dist * hit_dist {
            player.take_damage(KNIFE_DAMAGE, events);
            knife.active = false;
        } else if to_player > KNIFE_CULL_DISTANCE * KNIFE_CULL_DISTANCE {
            knife.active = false;
        }
    }
    knives.retain(|k| k.active);
}

pub fn update_mines(
    mines: &mut Vec<Mine>,
    enemies: &mut [Enemy],
    rng: &mut Pcg32,
    texts: &mut Vec<FloatingText>,
    events: &mut Vec<GameEvent>,
    camera: &mut Camera,
) {
    let mut spawned = Vec::new();
    mines.retain_mut(|mine| match mine {
        Mine::Tot {
            pos,
            fuse,
            radius,
            damage,
            cluster,
        } => {
            *fuse = fuse.saturating_sub(1);
            if *fuse > 0 {
                return true;
            }
            events.push(GameEvent::Sfx(SoundCue::Pop));
            camera.add_shake(8.0);
            for e in enemies.iter_mut() {
                if e.pos.distance_squared(*pos) < *radius * *radius {
                    let angle = (e.pos - *pos).to_angle();
                    strike(e, *damage, angle, 25.0, rng, texts);
                }
            }
            if *cluster {
                for _ in 0..4 {
                    let angle = rng.random::<f32>() * std::f32::consts::TAU;
                    spawned.push(Mine::Tot {
                        pos: *pos + angle_to_dir(angle) * 60.0,
                        fuse: 30,
                        radius: 160.0,
                        damage: *damage / 2.0,
                        cluster: false,
                    });
                }
            }
            false
        }
        Mine::OilPool {
            pos,
            radius,
            damage,
            life,
            slows,
        } => {
            *life = life.saturating_sub(1);
            if *life % 10 == 0 {
                for e in enemies.iter_mut() {
                    if e.pos.distance_squared(*pos) < *radius * *radius {
                        strike(e, *damage, 0.0, 0.0, rng, texts);
                        if *slows {
                            e.apply_slow(20);
                        }
                    }
                }
            }
            *life > 0
        }
    });
    mines.append(&mut spawned);
}
