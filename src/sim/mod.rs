//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Gameplay advances only by the clock's scaled delta
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or input-device dependencies

pub mod clock;
pub mod combat;
pub mod damage;
pub mod enemy;
pub mod geom;
pub mod orb;
pub mod player;
pub mod progression;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::Clock;
pub use combat::{AttackResult, Hit, resolve_melee, resolve_ranged};
pub use damage::DamageResolver;
pub use enemy::{DamageOutcome, Enemy, EnemyState};
pub use orb::{OrbOutcome, OrbState, XpOrb};
pub use player::{Dive, DivePhase, Motion, Player, PlayerStats, SlashState, Weapon};
pub use progression::{UpgradeKind, upgrade_offer, xp_to_level};
pub use spawner::{Spawner, spawn_interval};
pub use state::{EnemyView, GameEvent, GamePhase, GameState, OrbView, SimRng, Snapshot};
pub use tick::{CameraView, TickInput, tick};
