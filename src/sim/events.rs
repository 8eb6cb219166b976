//! Events fired by the core for the host to drain
//!
//! Collaborators (renderer, audio, UI) poll these once per frame. A host
//! with no listener simply drops them; gameplay never depends on a hook
//! being wired.

use glam::Vec2;

use super::boss::BossKind;

/// Sound cues, named after what happened rather than how they sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Shoot,
    Laser,
    Lightning,
    Splat,
    Knife,
    Gem,
    PlayerHurt,
    Heal,
    Magnet,
    Nuke,
    Pop,
    BossRoar,
    Fanfare,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyDied { pos: Vec2, elite: bool },
    PlayerHit { hp: f32 },
    /// `choices` picks rendered by the level-up UI; `auto` means the core
    /// already granted them (scripted rewards) and the UI only animates.
    LevelUp { level: u32, choices: u8, auto: bool },
    BossSpawned { kind: BossKind, name: &'static str },
    BossDefeated { kind: BossKind, kills: u32 },
    FormationWave { wave: u32, label: &'static str },
    QuestSpawned { pos: Vec2 },
    ChestDropped { pos: Vec2 },
    GameOver { score: u64 },
    Victory { score: u64 },
    Sfx(SoundCue),
}
