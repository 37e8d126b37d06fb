//! Experience thresholds and upgrade rules

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::shuffled;
use crate::consts::UPGRADE_CHOICES;
use crate::tuning::{UpgradeTuning, XpTuning};

/// Stat upgrades offered on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    RangedDamage,
    FireRate,
    MeleeDamage,
    MeleeRange,
    MoveSpeed,
    MaxHp,
    PickupRadius,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 7] = [
        UpgradeKind::RangedDamage,
        UpgradeKind::FireRate,
        UpgradeKind::MeleeDamage,
        UpgradeKind::MeleeRange,
        UpgradeKind::MoveSpeed,
        UpgradeKind::MaxHp,
        UpgradeKind::PickupRadius,
    ];

    /// Stat increase for one application
    pub fn delta(self, tuning: &UpgradeTuning) -> f32 {
        match self {
            UpgradeKind::RangedDamage => tuning.ranged_damage,
            UpgradeKind::FireRate => tuning.fire_rate,
            UpgradeKind::MeleeDamage => tuning.melee_damage,
            UpgradeKind::MeleeRange => tuning.melee_range,
            UpgradeKind::MoveSpeed => tuning.move_speed,
            UpgradeKind::MaxHp => tuning.max_hp,
            UpgradeKind::PickupRadius => tuning.pickup_radius,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::RangedDamage => "ranged_damage",
            UpgradeKind::FireRate => "fire_rate",
            UpgradeKind::MeleeDamage => "melee_damage",
            UpgradeKind::MeleeRange => "melee_range",
            UpgradeKind::MoveSpeed => "move_speed",
            UpgradeKind::MaxHp => "max_hp",
            UpgradeKind::PickupRadius => "pickup_radius",
        }
    }
}

/// XP needed to go from `level` to `level + 1`: `floor(base * mult^(level-1))`
pub fn xp_to_level(level: u32, tuning: &XpTuning) -> u32 {
    let exponent = level.saturating_sub(1) as i32;
    let raw = tuning.base_xp_to_level as f64 * tuning.xp_multiplier_per_level.powi(exponent);
    // Guard against products like 91.99999999 that should floor to 92
    (raw + 1e-9).floor() as u32
}

/// Distinct upgrade kinds offered on a level-up
pub fn upgrade_offer<R: Rng + ?Sized>(rng: &mut R) -> Vec<UpgradeKind> {
    let mut options = shuffled(rng, &UpgradeKind::ALL);
    options.truncate(UPGRADE_CHOICES);
    options
}
