//! Read-only snapshot for the rendering/UI layer
//!
//! Built on demand from the live state; nothing here can mutate the sim.
//! Visual state (flash, squash, i-frames) travels as plain flags so the
//! renderer never inspects gameplay types.

use glam::Vec2;

use super::boss::BeamPhase;
use super::enemy::Archetype;
use super::gems::GemTier;
use super::pickups::PickupKind;
use super::projectile::{Mine, ProjectileKind};
use super::state::SimulationState;
use super::weapons::WeaponKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Rotten,
    Fry,
    Baked,
    StampedeKnife,
    Chef,
    King,
    KingCorpse,
    SpudShot,
    MasherThrow,
    OilBottle,
    CheeseShard,
    ButcherKnife,
    TotMine,
    OilPool,
    Gem,
    Pickup(PickupKind),
}

#[derive(Debug, Clone, Copy)]
pub struct EntitySprite {
    pub pos: Vec2,
    pub kind: SpriteKind,
    pub size: f32,
    pub elite: bool,
    pub flash: bool,
    pub squashed: bool,
    pub invulnerable: bool,
    /// Purple tier for gems; unused otherwise
    pub rare: bool,
}

impl EntitySprite {
    fn new(pos: Vec2, kind: SpriteKind, size: f32) -> Self {
        Self {
            pos,
            kind,
            size,
            elite: false,
            flash: false,
            squashed: false,
            invulnerable: false,
            rare: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BossStatus {
    pub name: &'static str,
    pub hp: f32,
    pub max_hp: f32,
    /// Beam warning active: the renderer flashes the danger band
    pub telegraphing: bool,
    pub dead: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerStatus {
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub invulnerable: bool,
    pub weapons: [(WeaponKind, u8); 10],
}

#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub player: PlayerStatus,
    pub boss: Option<BossStatus>,
    pub score: u64,
    pub elapsed: f32,
    pub camera_pos: Vec2,
    pub camera_shake: f32,
    pub entities: Vec<EntitySprite>,
    /// Sleeping and queued gems: position + rare flag, drawn as cheap dots
    pub gem_points: Vec<(Vec2, bool)>,
    pub texts: Vec<(Vec2, String, &'static str)>,
    /// Active ketchup beam: origin angle and width
    pub beam: Option<(f32, f32)>,
    /// Gravy press telegraph: target and phase 0..1
    pub press: Option<(Vec2, f32)>,
}

pub fn snapshot(state: &SimulationState) -> RenderSnapshot {
    let mut entities = Vec::with_capacity(
        state.enemies.len()
            + state.projectiles.len()
            + state.knives.len()
            + state.mines.len()
            + state.pickups.len()
            + state.gems.active.len(),
    );

    for e in &state.enemies {
        let (kind, corpse) = match &e.archetype {
            Archetype::Rotten => (SpriteKind::Rotten, false),
            Archetype::Fry => (SpriteKind::Fry, false),
            Archetype::Baked => (SpriteKind::Baked, false),
            Archetype::Stampede(_) => (SpriteKind::StampedeKnife, false),
            Archetype::Boss(b) => match b.kind {
                super::boss::BossKind::Chef => (SpriteKind::Chef, b.corpse),
                super::boss::BossKind::King => {
                    if b.corpse {
                        (SpriteKind::KingCorpse, true)
                    } else {
                        (SpriteKind::King, false)
                    }
                }
            },
        };
        let mut sprite = EntitySprite::new(e.pos, kind, e.size);
        sprite.elite = e.elite;
        sprite.flash = e.flash_ticks > 0 && !corpse;
        sprite.squashed = e.squash_ticks > 0;
        sprite.invulnerable = e.invuln_ticks > 0;
        entities.push(sprite);
    }

    for p in &state.projectiles {
        let kind = match &p.kind {
            ProjectileKind::Spud => SpriteKind::SpudShot,
            ProjectileKind::Masher { .. } => SpriteKind::MasherThrow,
            ProjectileKind::OilBottle { .. } => SpriteKind::OilBottle,
            ProjectileKind::Shard { .. } => SpriteKind::CheeseShard,
        };
        let mut sprite = EntitySprite::new(p.pos, kind, 10.0);
        sprite.rare = p.evolved;
        entities.push(sprite);
    }

    for k in &state.knives {
        entities.push(EntitySprite::new(k.pos, SpriteKind::ButcherKnife, 20.0));
    }

    for m in &state.mines {
        match m {
            Mine::Tot { pos, .. } => {
                entities.push(EntitySprite::new(*pos, SpriteKind::TotMine, 15.0));
            }
            Mine::OilPool { pos, radius, .. } => {
                entities.push(EntitySprite::new(*pos, SpriteKind::OilPool, *radius));
            }
        }
    }

    for p in &state.pickups {
        entities.push(EntitySprite::new(
            p.pos,
            SpriteKind::Pickup(p.kind),
            24.0,
        ));
    }

    for g in &state.gems.active {
        let mut sprite = EntitySprite::new(g.pos, SpriteKind::Gem, 6.0);
        sprite.rare = g.tier == GemTier::Purple;
        entities.push(sprite);
    }

    let gem_points = state
        .gems
        .sleeping
        .iter()
        .chain(state.gems.wake_queue.iter())
        .map(|s| (s.pos, s.tier == GemTier::Purple))
        .collect();

    let boss = state.boss().map(|e| {
        let Archetype::Boss(b) = &e.archetype else {
            unreachable!("active_boss points at a non-boss entity")
        };
        BossStatus {
            name: b.kind.name(),
            hp: e.hp.max(0.0),
            max_hp: e.max_hp,
            telegraphing: matches!(b.beam, BeamPhase::Telegraph { .. }),
            dead: b.corpse,
        }
    });

    RenderSnapshot {
        player: PlayerStatus {
            pos: state.player.pos,
            hp: state.player.hp.max(0.0),
            max_hp: state.player.max_hp,
            level: state.player.level,
            xp: state.player.xp,
            xp_to_next: state.player.xp_to_next,
            invulnerable: state.player.invuln_ticks > 0,
            weapons: state.player.arsenal.levels(),
        },
        boss,
        score: state.score,
        elapsed: state.game_time,
        camera_pos: state.camera.pos,
        camera_shake: state.camera.shake,
        entities,
        gem_points,
        texts: state
            .floating_text
            .iter()
            .map(|t| (t.pos, t.text.clone(), t.color))
            .collect(),
        beam: state.player.arsenal.beam.map(|b| (b.angle, b.width)),
        press: state.player.arsenal.press.map(|p| (p.pos, p.phase)),
    }
}
