//! Game state and core simulation types
//!
//! Everything a session owns lives here. The RNG is the single source of
//! randomness, so a seed plus an input script reproduces a run exactly.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::damage::DamageResolver;
use super::enemy::EnemyState;
use super::player::{DivePhase, Player, Weapon};
use super::progression::{UpgradeKind, upgrade_offer};
use super::spawner::Spawner;
use crate::tuning::Tuning;

/// Seedable random source used for every gameplay draw
pub type SimRng = Pcg32;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Leveled up, waiting for an upgrade pick (clock paused)
    ChoosingUpgrade,
    /// Menu pause
    Paused,
    /// Player died, waiting for restart
    GameOver,
}

/// One-shot notifications produced by a tick, in emission order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Damage landed; `position` is where the hit number floats
    Hit {
        position: Vec3,
        amount: f32,
        is_player: bool,
    },
    /// Fires near the end of the enemy's death animation
    EnemyDied { enemy_id: u32, position: Vec3 },
    PlayerDied,
    XpCollected { amount: u32 },
    LeveledUp { level: u32 },
    DiveStarted,
    DiveEnded,
    ShotFired { origin: Vec3, end: Vec3, hit: bool },
    Slashed {
        origin: Vec3,
        direction: Vec3,
        range: f32,
    },
    EnemySpawned { enemy_id: u32, position: Vec3 },
    SlowMoChanged { active: bool },
    UpgradeOffered { options: Vec<UpgradeKind> },
    UpgradeApplied { kind: UpgradeKind },
    WeaponSwitched { weapon: Weapon },
    PhaseChanged { phase: GamePhase },
    SessionReset,
}

impl GameEvent {
    /// Stable short name, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::Hit { .. } => "hit",
            GameEvent::EnemyDied { .. } => "enemy_died",
            GameEvent::PlayerDied => "player_died",
            GameEvent::XpCollected { .. } => "xp_collected",
            GameEvent::LeveledUp { .. } => "leveled_up",
            GameEvent::DiveStarted => "dive_started",
            GameEvent::DiveEnded => "dive_ended",
            GameEvent::ShotFired { .. } => "shot_fired",
            GameEvent::Slashed { .. } => "slashed",
            GameEvent::EnemySpawned { .. } => "enemy_spawned",
            GameEvent::SlowMoChanged { .. } => "slow_mo_changed",
            GameEvent::UpgradeOffered { .. } => "upgrade_offered",
            GameEvent::UpgradeApplied { .. } => "upgrade_applied",
            GameEvent::WeaponSwitched { .. } => "weapon_switched",
            GameEvent::PhaseChanged { .. } => "phase_changed",
            GameEvent::SessionReset => "session_reset",
        }
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Balance values, fixed for the session
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    /// Live enemies and orbs
    pub spawner: Spawner,
    pub damage: DamageResolver,
    /// Upgrades on offer while `ChoosingUpgrade`
    pub upgrade_offer: Vec<UpgradeKind>,
    /// Level-ups still owed an upgrade pick
    pub pending_level_ups: u32,
    /// Simulation tick counter (ticks that advanced gameplay)
    pub time_ticks: u64,
    #[serde(skip)]
    pub(crate) rng: SimRng,
}

impl GameState {
    /// Create a new session with the given seed and tuning
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        log::info!("new session, seed {seed}");
        Self {
            seed,
            player: Player::new(&tuning),
            spawner: Spawner::new(&tuning),
            damage: DamageResolver::new(),
            tuning,
            phase: GamePhase::Playing,
            upgrade_offer: Vec::new(),
            pending_level_ups: 0,
            time_ticks: 0,
            rng: SimRng::seed_from_u64(seed),
        }
    }

    /// Restart after a game over. The RNG stream continues.
    pub fn reset(&mut self) {
        log::info!(
            "session reset after {} kills at level {}",
            self.spawner.kill_count,
            self.player.level
        );
        self.player.reset(&self.tuning);
        self.spawner.clear(&self.tuning);
        self.damage.clear();
        self.phase = GamePhase::Playing;
        self.upgrade_offer.clear();
        self.pending_level_ups = 0;
        self.time_ticks = 0;
    }

    /// Draw a fresh set of upgrade options
    pub fn roll_upgrade_offer(&mut self) -> &[UpgradeKind] {
        self.upgrade_offer = upgrade_offer(&mut self.rng);
        &self.upgrade_offer
    }

    /// Apply the offered upgrade at `index`. Out-of-range picks are ignored.
    pub fn choose_upgrade(&mut self, index: usize) -> Option<UpgradeKind> {
        let kind = *self.upgrade_offer.get(index)?;
        self.player.apply_upgrade(kind, &self.tuning.upgrades);
        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        self.upgrade_offer.clear();
        log::info!(
            "upgrade chosen: {} (x{})",
            kind.as_str(),
            self.player.upgrade_count(kind)
        );
        Some(kind)
    }

    /// Ensure entities are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.spawner.enemies.sort_by_key(|e| e.id);
        self.spawner.orbs.sort_by_key(|o| o.id);
    }

    /// Read-only view for presentation
    pub fn snapshot(&self, clock: &Clock) -> Snapshot {
        let melee = &self.tuning.melee;
        Snapshot {
            tick: self.time_ticks,
            phase: self.phase,
            hp: self.player.hp,
            max_hp: self.player.max_hp,
            xp: self.player.xp,
            xp_to_level: self.player.xp_to_level,
            level: self.player.level,
            kill_count: self.spawner.kill_count,
            weapon: self.player.weapon,
            slow_mo: clock.is_slow_mo(),
            time_scale: clock.time_scale(),
            game_time: clock.elapsed(),
            player_position: self.player.position,
            player_yaw: self.player.yaw,
            dive_phase: self.player.dive().map(|d| d.phase()),
            slash_progress: self.player.slash_progress(melee),
            upgrades: self.player.upgrades.clone(),
            upgrade_offer: self.upgrade_offer.clone(),
            enemies: self
                .spawner
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    position: e.position,
                    yaw: e.yaw,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    attacking: e.state == EnemyState::AttackRange,
                    sliced: matches!(e.state, EnemyState::Dying { sliced: true, .. }),
                    death_progress: e.death_progress(),
                })
                .collect(),
            orbs: self
                .spawner
                .orbs
                .iter()
                .map(|o| OrbView {
                    id: o.id,
                    position: o.position,
                    lifetime: o.lifetime,
                    attracted: o.is_attracted(),
                    blinking: o.is_blinking(),
                })
                .collect(),
        }
    }
}

/// HUD and render data for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub hp: f32,
    pub max_hp: f32,
    pub xp: u32,
    pub xp_to_level: u32,
    pub level: u32,
    pub kill_count: u32,
    pub weapon: Weapon,
    pub slow_mo: bool,
    pub time_scale: f32,
    pub game_time: f64,
    pub player_position: Vec3,
    pub player_yaw: f32,
    pub dive_phase: Option<DivePhase>,
    pub slash_progress: Option<f32>,
    pub upgrades: BTreeMap<UpgradeKind, u32>,
    pub upgrade_offer: Vec<UpgradeKind>,
    pub enemies: Vec<EnemyView>,
    pub orbs: Vec<OrbView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub position: Vec3,
    pub yaw: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Halted next to the player, arms raised
    pub attacking: bool,
    pub sliced: bool,
    pub death_progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbView {
    pub id: u32,
    pub position: Vec3,
    pub lifetime: f32,
    pub attracted: bool,
    pub blinking: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(42, Tuning::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.hp, 100.0);
        assert_eq!(state.player.xp_to_level, 80);
        assert!(state.spawner.enemies.is_empty());
    }

    #[test]
    fn test_upgrade_offer_depends_on_seed() {
        let mut a = GameState::new(5, Tuning::default());
        let mut b = GameState::new(5, Tuning::default());
        assert_eq!(a.roll_upgrade_offer(), b.roll_upgrade_offer());
        assert_eq!(a.upgrade_offer.len(), 3);
    }

    #[test]
    fn test_choose_upgrade() {
        let mut state = GameState::new(1, Tuning::default());
        state.pending_level_ups = 1;
        state.roll_upgrade_offer();
        assert_eq!(state.choose_upgrade(7), None);

        let kind = state.upgrade_offer[1];
        assert_eq!(state.choose_upgrade(1), Some(kind));
        assert_eq!(state.player.upgrade_count(kind), 1);
        assert_eq!(state.pending_level_ups, 0);
        assert!(state.upgrade_offer.is_empty());
    }

    #[test]
    fn test_reset_restores_session() {
        let mut state = GameState::new(3, Tuning::default());
        let mut events = Vec::new();
        state.player.take_damage(100.0);
        state.phase = GamePhase::GameOver;
        state.spawner.spawn_enemy(
            &mut state.rng,
            &state.player,
            &state.tuning.enemies,
            &mut events,
        );
        state.reset();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.player.is_alive());
        assert!(state.spawner.enemies.is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(3, Tuning::default());
        let clock = Clock::new(&state.tuning.slowmo);
        let snapshot = state.snapshot(&clock);
        assert_eq!(snapshot.level, 1);
        assert!(snapshot.dive_phase.is_none());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"playing\""));
    }

    #[test]
    fn test_events_are_tagged() {
        let json = serde_json::to_string(&GameEvent::LeveledUp { level: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"leveled_up","level":2}"#);
        assert_eq!(GameEvent::DiveEnded.kind(), "dive_ended");
        let json = serde_json::to_string(&GameEvent::DiveEnded).unwrap();
        assert_eq!(json, r#"{"type":"dive_ended"}"#);
    }
}
