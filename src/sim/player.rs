//! Player combatant: movement, damage intake, XP/level curve, passive stats

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{
    LEVEL_CAP, PLAYER_INVULN_TICKS, PLAYER_MAX_HP, PLAYER_RADIUS, PLAYER_SPEED, XP_BASE,
};

use super::events::{GameEvent, SoundCue};
use super::weapons::{Arsenal, WeaponKind};

/// Passive (non-weapon) upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassiveKind {
    /// Global damage +15%
    DeepFry,
    /// Max HP +25, regen +1/s
    CarboLoad,
    /// Move speed +10%
    GreaseWheels,
    /// Pickup range +30%
    Magnetism,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upgrade {
    Weapon(WeaponKind),
    Passive(PassiveKind),
}

/// Multipliers and rates accumulated from passives
#[derive(Debug, Clone, Copy)]
pub struct PlayerStats {
    pub damage_mult: f32,
    pub pickup_mult: f32,
    pub speed_mult: f32,
    /// HP restored per second
    pub regen: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        // Buffed starters: damage and magnetism begin above 1.0
        Self {
            damage_mult: 1.5,
            pickup_mult: 1.1,
            speed_mult: 1.0,
            regen: 0.0,
        }
    }
}

pub struct Player {
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub radius: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    /// I-frame countdown; damage is a no-op while positive
    pub invuln_ticks: u32,
    pub stats: PlayerStats,
    pub arsenal: Arsenal,
    /// Level-up choices owed to the host UI
    pub pending_choices: u32,
    /// Debug override: suppress all incoming damage
    pub god_mode: bool,
    regen_ticks: u32,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            radius: PLAYER_RADIUS,
            level: 1,
            xp: 0,
            xp_to_next: XP_BASE,
            invuln_ticks: 0,
            stats: PlayerStats::default(),
            arsenal: Arsenal::new(),
            pending_choices: 0,
            god_mode: false,
            regen_ticks: 0,
        }
    }

    pub fn speed(&self) -> f32 {
        PLAYER_SPEED * self.stats.speed_mult
    }

    /// Move by the host's intent vector (already normalized or zero) and
    /// advance timers.
    pub fn integrate(&mut self, move_dir: Vec2, dt: f32) {
        self.pos += move_dir * self.speed() * dt;
        if self.invuln_ticks > 0 {
            self.invuln_ticks -= 1;
        }
        if self.hp < self.max_hp && self.stats.regen > 0.0 {
            self.regen_ticks += 1;
            if self.regen_ticks >= 60 {
                self.hp = (self.hp + self.stats.regen).min(self.max_hp);
                self.regen_ticks = 0;
            }
        }
    }

    /// The single damage entry point. Debug invincibility intercepts here so
    /// it can never bypass i-frame or death semantics. Returns true if the
    /// player died.
    pub fn take_damage(&mut self, amount: f32, events: &mut Vec<GameEvent>) -> bool {
        if self.invuln_ticks > 0 || self.god_mode || self.hp <= 0.0 {
            return false;
        }
        self.hp -= amount;
        self.invuln_ticks = PLAYER_INVULN_TICKS;
        events.push(GameEvent::Sfx(SoundCue::PlayerHurt));
        events.push(GameEvent::PlayerHit { hp: self.hp });
        self.hp <= 0.0
    }

    pub fn heal_full(&mut self) {
        self.hp = self.max_hp;
    }

    /// Grant XP; emits level-up events and accumulates pending choices.
    pub fn gain_xp(&mut self, amount: u32, events: &mut Vec<GameEvent>) {
        if self.level >= LEVEL_CAP {
            return;
        }
        events.push(GameEvent::Sfx(SoundCue::Gem));
        self.xp += amount;
        while self.xp >= self.xp_to_next && self.level < LEVEL_CAP {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.heal_full();
            // Steeper curve to slow the early game
            self.xp_to_next = (self.xp_to_next as f32 * 1.3).ceil() as u32 + 20;
            self.pending_choices += 1;
            events.push(GameEvent::LevelUp {
                level: self.level,
                choices: 3,
                auto: false,
            });
        }
    }

    /// Apply a chosen upgrade through the same path scripted rewards use
    pub fn apply_upgrade(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::Weapon(kind) => self.arsenal.level_up(kind),
            Upgrade::Passive(kind) => match kind {
                PassiveKind::DeepFry => self.stats.damage_mult += 0.15,
                PassiveKind::CarboLoad => {
                    self.max_hp += 25.0;
                    self.hp += 25.0;
                    self.stats.regen += 1.0;
                }
                PassiveKind::GreaseWheels => self.stats.speed_mult += 0.1,
                PassiveKind::Magnetism => self.stats.pickup_mult += 0.3,
            },
        }
        self.pending_choices = self.pending_choices.saturating_sub(1);
    }

    /// Pick a reward the way the scripted auto-grant paths do: prefer
    /// leveling an owned weapon, fall back to a passive.
    pub fn random_upgrade(&self, rng: &mut Pcg32) -> Upgrade {
        let owned: Vec<WeaponKind> = WeaponKind::ALL
            .iter()
            .copied()
            .filter(|k| self.arsenal.slot(*k).level > 0 && !self.arsenal.slot(*k).is_evolved())
            .collect();
        if !owned.is_empty() && rng.random::<f32>() < 0.7 {
            Upgrade::Weapon(owned[rng.random_range(0..owned.len())])
        } else {
            match rng.random_range(0..4u8) {
                0 => Upgrade::Passive(PassiveKind::DeepFry),
                1 => Upgrade::Passive(PassiveKind::CarboLoad),
                2 => Upgrade::Passive(PassiveKind::GreaseWheels),
                _ => Upgrade::Passive(PassiveKind::Magnetism),
            }
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_curve_levels_up_and_heals() {
        let mut player = Player::new();
        player.hp = 10.0;
        let mut events = Vec::new();
        player.gain_xp(XP_BASE, &mut events);
        assert_eq!(player.level, 2);
        assert_eq!(player.hp, player.max_hp);
        assert_eq!(player.xp_to_next, (XP_BASE as f32 * 1.3).ceil() as u32 + 20);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelUp { level: 2, choices: 3, auto: false })));
    }

    #[test]
    fn damage_respects_iframes() {
        let mut player = Player::new();
        let mut events = Vec::new();
        player.take_damage(10.0, &mut events);
        player.take_damage(10.0, &mut events);
        assert_eq!(player.hp, PLAYER_MAX_HP - 10.0);
    }

    #[test]
    fn god_mode_suppresses_damage_at_the_contract() {
        let mut player = Player::new();
        player.god_mode = true;
        let mut events = Vec::new();
        assert!(!player.take_damage(9999.0, &mut events));
        assert_eq!(player.hp, PLAYER_MAX_HP);
        assert!(events.is_empty());
    }

    #[test]
    fn carbo_load_raises_cap_and_regen() {
        let mut player = Player::new();
        player.apply_upgrade(Upgrade::Passive(PassiveKind::CarboLoad));
        assert_eq!(player.max_hp, PLAYER_MAX_HP + 25.0);
        assert_eq!(player.stats.regen, 1.0);
    }
}
