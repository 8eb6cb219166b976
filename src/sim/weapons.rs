//! Weapon slots, cooldowns and firing policies
//!
//! Every weapon runs an independent cooldown against a rate that improves
//! with level, with a discontinuous behavior change once the level passes
//! [`crate::consts::MAX_WEAPON_LEVEL`] (the evolved tier). Weapon logic
//! never mutates enemies except through the hit contract in `enemy`, so
//! i-frame and death semantics hold no matter what fired.

use glam::Vec2;
use rand::Rng;

use crate::consts::MAX_WEAPON_LEVEL;
use crate::{angle_to_dir, normalize_angle};

use super::enemy::strike;
use super::events::{GameEvent, SoundCue};
use super::projectile::{Mine, Projectile, ProjectileKind};
use super::state::SimulationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    /// Fires at the nearest enemies
    SpudGun,
    /// Orbital blades
    Peeler,
    /// High lobbed throws
    Masher,
    /// Thrown bottles that leave burning pools
    HotOil,
    /// Lightning on random enemies in range
    FryerStorm,
    /// Damaging aura
    Garlic,
    /// Telegraphed drop on a random target
    GravyPress,
    /// Aimed piercing beam
    Ketchup,
    /// Mines dropped at the player's feet
    Tots,
    /// Shotgun spread at the nearest enemy
    Grater,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 10] = [
        WeaponKind::SpudGun,
        WeaponKind::Peeler,
        WeaponKind::Masher,
        WeaponKind::HotOil,
        WeaponKind::FryerStorm,
        WeaponKind::Garlic,
        WeaponKind::GravyPress,
        WeaponKind::Ketchup,
        WeaponKind::Tots,
        WeaponKind::Grater,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SpudGun => "Spud Gun",
            Self::Peeler => "The Peeler",
            Self::Masher => "Potato Masher",
            Self::HotOil => "Hot Oil",
            Self::FryerStorm => "Fryer Storm",
            Self::Garlic => "Garlic Butter",
            Self::GravyPress => "Gravy Press",
            Self::Ketchup => "Ketchup Laser",
            Self::Tots => "Tater Tots",
            Self::Grater => "Cheese Grater",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeaponSlot {
    /// 0 = unowned
    pub level: u8,
    pub timer: u32,
}

impl WeaponSlot {
    pub fn is_evolved(&self) -> bool {
        self.level > MAX_WEAPON_LEVEL
    }

    /// Advance the cooldown; true when it wraps and the weapon fires
    fn cooled(&mut self, rate: u32) -> bool {
        self.timer += 1;
        if self.timer >= rate {
            self.timer = 0;
            true
        } else {
            false
        }
    }
}

/// Gravy press mid-telegraph
#[derive(Debug, Clone, Copy)]
pub struct PressState {
    pub pos: Vec2,
    /// 0..1; impact at 1
    pub phase: f32,
    pub evolved: bool,
}

/// Ketchup beam afterglow (collision already resolved on fire)
#[derive(Debug, Clone, Copy)]
pub struct BeamState {
    pub angle: f32,
    pub ticks: u32,
    pub width: f32,
    pub evolved: bool,
}

pub struct Arsenal {
    slots: [WeaponSlot; 10],
    pub orbit_angle: f32,
    pub press: Option<PressState>,
    pub beam: Option<BeamState>,
}

impl Arsenal {
    pub fn new() -> Self {
        let mut arsenal = Self {
            slots: [WeaponSlot::default(); 10],
            orbit_angle: 0.0,
            press: None,
            beam: None,
        };
        // Everyone starts with the spud gun
        arsenal.slots[WeaponKind::SpudGun.index()].level = 1;
        arsenal
    }

    pub fn slot(&self, kind: WeaponKind) -> &WeaponSlot {
        &self.slots[kind.index()]
    }

    pub fn slot_mut(&mut self, kind: WeaponKind) -> &mut WeaponSlot {
        &mut self.slots[kind.index()]
    }

    pub fn level_up(&mut self, kind: WeaponKind) {
        let slot = self.slot_mut(kind);
        slot.level = (slot.level + 1).min(MAX_WEAPON_LEVEL + 1);
    }

    pub fn set_level(&mut self, kind: WeaponKind, level: u8) {
        self.slot_mut(kind).level = level.min(MAX_WEAPON_LEVEL + 1);
    }

    /// Silence every weapon (terminal wind-down)
    pub fn disarm(&mut self) {
        for slot in &mut self.slots {
            slot.level = 0;
        }
    }

    pub fn levels(&self) -> [(WeaponKind, u8); 10] {
        let mut out = [(WeaponKind::SpudGun, 0); 10];
        for (i, kind) in WeaponKind::ALL.iter().enumerate() {
            out[i] = (*kind, self.slots[i].level);
        }
        out
    }
}

impl Default for Arsenal {
    fn default() -> Self {
        Self::new()
    }
}

fn grown(base: f32, growth: f32, level: u8) -> f32 {
    base * growth.powi(level as i32)
}

fn dist_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Run every owned weapon for one tick. `aim` is the host's aim point in
/// world space (mouse-directed weapons).
pub fn run_weapons(state: &mut SimulationState, aim: Vec2, dt: f32) {
    let SimulationState {
        player,
        enemies,
        projectiles,
        mines,
        rng,
        events,
        camera,
        floating_text,
        tick_count,
        ..
    } = state;

    let ppos = player.pos;
    let dmg_mult = player.stats.damage_mult;
    let arsenal = &mut player.arsenal;
    let texts = floating_text;

    // 1. Spud gun: nearest-N targets, sorted by distance
    let slot = arsenal.slot_mut(WeaponKind::SpudGun);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let rate = 50u32.saturating_sub(level as u32 * 5).max(5);
        if slot.cooled(rate) {
            let range = 600.0 + level as f32 * 50.0 + if evo { 300.0 } else { 0.0 };
            let mut candidates: Vec<(usize, f32)> = enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.dead && !e.is_corpse())
                .map(|(i, e)| (i, e.pos.distance_squared(ppos)))
                .filter(|(_, d)| *d < range * range)
                .collect();
            candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
            let count = if evo { 10 } else { level as usize };
            candidates.truncate(count);

            if !candidates.is_empty() {
                events.push(GameEvent::Sfx(SoundCue::Shoot));
                let dmg = grown(15.0, 1.3, level) * if evo { 2.0 } else { 1.0 } * dmg_mult;
                let speed = if evo { 900.0 } else { 600.0 };
                for (i, (target, _)) in candidates.iter().enumerate() {
                    // Tiny per-shot spread staggers the volley visually
                    let angle = (enemies[*target].pos - ppos).to_angle() + i as f32 * 0.02;
                    projectiles.push(Projectile {
                        pos: ppos,
                        vel: angle_to_dir(angle) * speed,
                        damage: dmg,
                        evolved: evo,
                        kind: ProjectileKind::Spud,
                        active: true,
                    });
                }
            }
        }
    }

    // 2. Peeler: orbiting blades, direct contact checks every tick
    let slot = *arsenal.slot(WeaponKind::Peeler);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let speed = 1.2 + level as f32 * 0.72 + if evo { 12.0 } else { 0.0 };
        arsenal.orbit_angle += speed * dt;
        let range = 130.0 + level as f32 * 30.0 + if evo { 100.0 } else { 0.0 };
        let dmg = grown(8.0, 1.3, level) * if evo { 3.0 } else { 1.0 } * dmg_mult;
        let count = if evo { 12 } else { level as usize };
        let hit_dist = if evo { 40.0 } else { 25.0 };
        let kb = if evo { 3.0 } else { 1.0 };
        for i in 0..count {
            let theta = arsenal.orbit_angle + i as f32 * std::f32::consts::TAU / count as f32;
            let blade = ppos + angle_to_dir(theta) * range;
            for e in enemies.iter_mut() {
                let total = e.size + hit_dist;
                if e.pos.distance_squared(blade) < total * total {
                    let angle = (e.pos - ppos).to_angle();
                    strike(e, dmg, angle, kb, rng, texts);
                    e.apply_slow(30);
                }
            }
        }
    }

    // 3. Masher: lobbed arcs
    let slot = arsenal.slot_mut(WeaponKind::Masher);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let rate = if evo {
            30
        } else {
            (70u32.saturating_sub(level as u32 * 5)).max(20)
        };
        if slot.cooled(rate) {
            events.push(GameEvent::Sfx(SoundCue::Shoot));
            let count = if evo { 10 } else { 1 + level as usize / 2 };
            let dmg = grown(30.0, 1.3, level) * if evo { 2.0 } else { 1.0 } * dmg_mult;
            let launch = 14.0 + level as f32 * 0.5 + if evo { 4.0 } else { 0.0 };
            let spread = 10.0 + level as f32 * 2.0;
            for _ in 0..count {
                let vx = (rng.random::<f32>() - 0.5) * spread * 60.0;
                projectiles.push(Projectile {
                    pos: ppos,
                    vel: Vec2::new(vx, -launch * 60.0),
                    damage: dmg,
                    evolved: evo,
                    kind: ProjectileKind::Masher {
                        spin: 0.0,
                        hit_ids: Vec::new(),
                    },
                    active: true,
                });
            }
        }
    }

    // 4. Hot oil: bottle thrown at a random enemy in range
    let slot = arsenal.slot_mut(WeaponKind::HotOil);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let rate = (140u32.saturating_sub(level as u32 * 15)).max(30);
        if slot.cooled(rate) {
            let count = if evo { 3 } else { 1 };
            let dmg = grown(6.0, 1.3, level) * if evo { 3.0 } else { 1.0 } * dmg_mult;
            let throw_range = 350.0 + level as f32 * 20.0;
            let radius = 60.0 + level as f32 * 5.0 + if evo { 50.0 } else { 0.0 };
            for _ in 0..count {
                let candidates: Vec<Vec2> = enemies
                    .iter()
                    .filter(|e| !e.dead && e.pos.distance_squared(ppos) < throw_range * throw_range)
                    .take(20)
                    .map(|e| e.pos)
                    .collect();
                let target = if candidates.is_empty() {
                    let angle = rng.random::<f32>() * std::f32::consts::TAU;
                    ppos + angle_to_dir(angle) * (100.0 + rng.random::<f32>() * 200.0)
                } else {
                    candidates[rng.random_range(0..candidates.len())]
                };
                projectiles.push(Projectile {
                    pos: ppos,
                    vel: Vec2::ZERO,
                    damage: dmg,
                    evolved: evo,
                    kind: ProjectileKind::OilBottle {
                        start: ppos,
                        target,
                        progress: 0.0,
                        radius,
                        pool_damage: dmg,
                    },
                    active: true,
                });
            }
        }
    }

    // 5. Fryer storm: lightning on random enemies in sight
    let slot = arsenal.slot_mut(WeaponKind::FryerStorm);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let rate = if evo {
            30
        } else {
            (90u32.saturating_sub(level as u32 * 5)).max(40)
        };
        if slot.cooled(rate) {
            let dmg = grown(40.0, 1.4, level) * if evo { 2.5 } else { 1.0 } * dmg_mult;
            let count = if evo { 10 } else { level as usize };
            let targets: Vec<usize> = enemies
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.dead && e.pos.distance_squared(ppos) < 900.0 * 900.0)
                .map(|(i, _)| i)
                .collect();
            for _ in 0..count {
                if targets.is_empty() {
                    break;
                }
                let i = targets[rng.random_range(0..targets.len())];
                strike(&mut enemies[i], dmg, 0.0, 0.0, rng, texts);
                events.push(GameEvent::Sfx(SoundCue::Lightning));
            }
        }
    }

    // 6. Garlic: aura pulse on a fixed cadence
    let slot = arsenal.slot(WeaponKind::Garlic);
    if slot.level > 0 && *tick_count % 15 == 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let radius = 100.0 + level as f32 * 30.0 + if evo { 100.0 } else { 0.0 };
        let dmg = grown(3.0, 1.3, level) * if evo { 2.0 } else { 1.0 } * dmg_mult;
        let kb = if evo { 5.0 } else { 1.0 };
        for e in enemies.iter_mut() {
            if e.pos.distance_squared(ppos) < radius * radius {
                let angle = (e.pos - ppos).to_angle();
                strike(e, dmg, angle, kb, rng, texts);
                e.apply_slow(40);
            }
        }
    }

    // 7. Gravy press: telegraph, then a squashing impact
    let slot = arsenal.slot_mut(WeaponKind::GravyPress);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        if arsenal.press.is_none() {
            let slot = arsenal.slot_mut(WeaponKind::GravyPress);
            let rate = (480u32.saturating_sub(level as u32 * 30)).max(180);
            if slot.cooled(rate) {
                let candidates: Vec<Vec2> = enemies
                    .iter()
                    .filter(|e| !e.dead && e.pos.distance_squared(ppos) < 450.0 * 450.0)
                    .map(|e| e.pos)
                    .collect();
                let pos = if candidates.is_empty() {
                    let angle = rng.random::<f32>() * std::f32::consts::TAU;
                    ppos + angle_to_dir(angle) * (150.0 + rng.random::<f32>() * 200.0)
                } else {
                    candidates[rng.random_range(0..candidates.len())]
                };
                arsenal.press = Some(PressState {
                    pos,
                    phase: 0.0,
                    evolved: evo,
                });
            }
        } else if let Some(mut press) = arsenal.press.take() {
            press.phase += 0.9 * dt;
            if press.phase < 1.0 {
                arsenal.press = Some(press);
            } else {
                let center = press.pos;
                let mut radius = 200.0 + level as f32 * 30.0;
                if evo {
                    radius *= 2.0;
                }
                let dmg = grown(50.0, 1.4, level) * if evo { 2.0 } else { 1.0 } * dmg_mult;
                events.push(GameEvent::Sfx(SoundCue::Splat));
                camera.add_shake(if evo { 60.0 } else { 30.0 });
                let shockwave = radius * 1.5;
                for e in enemies.iter_mut() {
                    if e.is_boss() {
                        continue;
                    }
                    let d_sq = e.pos.distance_squared(center);
                    if d_sq < radius * radius {
                        e.apply_squash(180);
                        let angle = (e.pos - center).to_angle();
                        strike(e, dmg, angle, 0.5, rng, texts);
                    } else if evo && d_sq < shockwave * shockwave {
                        // Outer ring: light damage, heavy shove
                        let angle = (e.pos - center).to_angle();
                        strike(e, 10.0, angle, 20.0, rng, texts);
                    }
                }
            }
        }
    }

    // 8. Ketchup laser: aimed beam, collision resolved the tick it fires
    let slot = arsenal.slot_mut(WeaponKind::Ketchup);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        if let Some(mut beam) = arsenal.beam.take() {
            beam.ticks = beam.ticks.saturating_sub(1);
            if beam.ticks > 0 {
                arsenal.beam = Some(beam);
            }
        } else {
            let slot = arsenal.slot_mut(WeaponKind::Ketchup);
            let rate = (120u32.saturating_sub(level as u32 * 10)).max(60);
            if slot.cooled(rate) {
                let angle = (aim - ppos).to_angle();
                let width = if evo { 130.0 } else { 70.0 };
                let mut dmg = grown(20.0, 1.5, level);
                if !evo && level == MAX_WEAPON_LEVEL {
                    dmg *= 0.88;
                }
                if evo {
                    dmg *= 2.0;
                }
                dmg *= dmg_mult;
                let kb = if evo { 12.0 } else { 6.0 };
                let tip = ppos + angle_to_dir(angle) * 900.0;
                events.push(GameEvent::Sfx(SoundCue::Laser));
                camera.add_shake(if evo { 8.0 } else { 4.0 });
                for e in enemies.iter_mut() {
                    if dist_to_segment(e.pos, ppos, tip) < width / 2.0 + e.size {
                        strike(e, dmg, angle, kb, rng, texts);
                        // Flash for the whole time the beam is visible
                        e.flash_ticks = e.flash_ticks.max(20);
                    }
                }
                arsenal.beam = Some(BeamState {
                    angle,
                    ticks: 20,
                    width,
                    evolved: evo,
                });
            }
        }
    }

    // 9. Tater tots: mines at the player's feet
    let slot = arsenal.slot_mut(WeaponKind::Tots);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let rate = (270u32.saturating_sub(level as u32 * 30)).max(120);
        if slot.cooled(rate) {
            mines.push(Mine::Tot {
                pos: ppos,
                fuse: 180,
                radius: if evo { 260.0 } else { 160.0 },
                damage: grown(40.0, 1.4, level) * if evo { 2.0 } else { 1.0 } * dmg_mult,
                cluster: evo,
            });
        }
    }

    // 10. Cheese grater: shotgun spread at the nearest enemy
    let slot = arsenal.slot_mut(WeaponKind::Grater);
    if slot.level > 0 {
        let level = slot.level;
        let evo = slot.is_evolved();
        let rate = if evo {
            10
        } else {
            (90u32.saturating_sub(level as u32 * 10)).max(30)
        };
        if slot.cooled(rate) {
            events.push(GameEvent::Sfx(SoundCue::Shoot));
            let aim_angle = enemies
                .iter()
                .filter(|e| !e.dead)
                .min_by(|a, b| {
                    a.pos
                        .distance_squared(ppos)
                        .total_cmp(&b.pos.distance_squared(ppos))
                })
                .map(|e| (e.pos - ppos).to_angle())
                // No targets: sweep in a slow circle
                .unwrap_or(*tick_count as f32 * 0.1);
            let count = if evo { 2 } else { 5 + level as usize };
            let dmg = grown(12.0, 1.2, level) * if evo { 2.25 } else { 1.0 } * dmg_mult;
            for _ in 0..count {
                let offset = (rng.random::<f32>() - 0.5) * std::f32::consts::FRAC_PI_4;
                let angle = normalize_angle(aim_angle + offset);
                let speed = 600.0 + rng.random::<f32>() * 300.0;
                projectiles.push(Projectile {
                    pos: ppos,
                    vel: angle_to_dir(angle) * speed,
                    damage: dmg,
                    evolved: evo,
                    kind: ProjectileKind::Shard {
                        life_ticks: if evo { 40 } else { 20 },
                    },
                    active: true,
                });
            }
        }
    }
}
