//! Data-driven game balance
//!
//! Every numeric tunable of the simulation lives here. A [`Tuning`] is loaded
//! once at startup (JSON, any subset of keys), validated, and then held by value
//! in the game state for the rest of the session. Missing keys fall back to the
//! defaults below.

use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    /// The tuning file could not be read
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The tuning file is not valid JSON for [`Tuning`]
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside the range the simulation can work with
    #[error("tuning value `{key}` = {value} is out of range (expected {expected})")]
    OutOfRange {
        key: &'static str,
        value: f64,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: f32,
    pub move_speed: f32,
    pub run_multiplier: f32,
    pub jump_force: f32,
    pub gravity: f32,
    /// Body height (chest height for melee is half of this)
    pub height: f32,
    pub radius: f32,
    pub pickup_radius: f32,
    /// Horizontal velocity kept per reference frame when there is no input
    pub ground_damping: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            move_speed: 8.0,
            run_multiplier: 1.8,
            jump_force: 14.0,
            gravity: 28.0,
            height: 2.2,
            radius: 0.5,
            pickup_radius: 2.5,
            ground_damping: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedTuning {
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub range: f32,
    pub knockback: f32,
    /// Per-axis aim perturbation amplitude
    pub spread: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            damage: 20.0,
            fire_rate: 10.0,
            range: 100.0,
            knockback: 3.0,
            spread: 0.015,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeTuning {
    pub damage: f32,
    pub range: f32,
    /// Half-angle of the swing cone (radians)
    pub cone_half_angle: f32,
    pub knockback: f32,
    pub cooldown: f32,
    /// Length of the swing window during which another swing cannot start
    pub slash_duration: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            damage: 40.0,
            range: 3.5,
            cone_half_angle: PI / 5.0, // 36 degrees
            knockback: 6.0,
            cooldown: 0.35,
            slash_duration: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub base_hp: f32,
    pub base_damage: f32,
    pub base_speed: f32,
    /// Per-level growth of hp and damage
    pub stat_scale_per_level: f64,
    /// Per-level growth of speed
    pub speed_scale_per_level: f64,
    /// Outer radius of the spawn ring
    pub spawn_distance: f32,
    /// Inner radius of the spawn ring
    pub min_spawn_distance: f32,
    /// Seconds between spawns at level 1
    pub initial_spawn_rate: f32,
    pub min_spawn_rate: f32,
    pub spawn_rate_decrease: f32,
    pub max_enemies: usize,
    pub touch_damage_cooldown: f32,
    /// Collision radius
    pub size: f32,
    pub height: f32,
    pub death_anim_duration: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            base_hp: 40.0,
            base_damage: 10.0,
            base_speed: 3.5,
            stat_scale_per_level: 0.12,
            speed_scale_per_level: 0.05,
            spawn_distance: 22.0,
            min_spawn_distance: 16.0,
            initial_spawn_rate: 1.2,
            min_spawn_rate: 0.25,
            spawn_rate_decrease: 0.05,
            max_enemies: 60,
            touch_damage_cooldown: 0.5,
            size: 0.5,
            height: 1.8,
            death_anim_duration: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpTuning {
    pub base_xp_to_level: u32,
    pub xp_multiplier_per_level: f64,
    pub orb_value: u32,
    pub orb_size: f32,
    /// Top homing speed of an attracted orb
    pub orb_speed: f32,
    pub orb_acceleration: f32,
    pub orb_lifetime: f32,
}

impl Default for XpTuning {
    fn default() -> Self {
        Self {
            base_xp_to_level: 80,
            xp_multiplier_per_level: 1.15,
            orb_value: 12,
            orb_size: 0.25,
            orb_speed: 18.0,
            orb_acceleration: 60.0,
            orb_lifetime: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowMoTuning {
    pub time_scale: f32,
    /// Time-scale units per (unscaled) second
    pub transition_speed: f32,
}

impl Default for SlowMoTuning {
    fn default() -> Self {
        Self {
            time_scale: 0.2,
            transition_speed: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiveTuning {
    pub duration: f32,
    /// Horizontal speed during the flight phase
    pub speed: f32,
    /// Peak of the flight arc
    pub height: f32,
}

impl Default for DiveTuning {
    fn default() -> Self {
        Self {
            duration: 0.8,
            speed: 15.0,
            height: 2.0,
        }
    }
}

/// Stat increase granted by one application of each upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    pub ranged_damage: f32,
    pub fire_rate: f32,
    pub melee_damage: f32,
    pub melee_range: f32,
    pub move_speed: f32,
    pub max_hp: f32,
    pub pickup_radius: f32,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            ranged_damage: 8.0,
            fire_rate: 1.5,
            melee_damage: 15.0,
            melee_range: 0.4,
            move_speed: 1.2,
            max_hp: 25.0,
            pickup_radius: 0.6,
        }
    }
}

/// Complete tuning surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub ranged: RangedTuning,
    pub melee: MeleeTuning,
    pub enemies: EnemyTuning,
    pub xp: XpTuning,
    pub slowmo: SlowMoTuning,
    pub dive: DiveTuning,
    pub upgrades: UpgradeTuning,
}

fn check(key: &'static str, value: f64, ok: bool, expected: &'static str) -> Result<(), TuningError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            key,
            value,
            expected,
        })
    }
}

fn positive(key: &'static str, value: f32) -> Result<(), TuningError> {
    check(key, value as f64, value > 0.0, "> 0")
}

fn non_negative(key: &'static str, value: f32) -> Result<(), TuningError> {
    check(key, value as f64, value >= 0.0, ">= 0")
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.player;
        positive("player.max_hp", p.max_hp)?;
        non_negative("player.move_speed", p.move_speed)?;
        positive("player.run_multiplier", p.run_multiplier)?;
        non_negative("player.jump_force", p.jump_force)?;
        positive("player.gravity", p.gravity)?;
        positive("player.height", p.height)?;
        positive("player.radius", p.radius)?;
        non_negative("player.pickup_radius", p.pickup_radius)?;
        check(
            "player.ground_damping",
            p.ground_damping as f64,
            (0.0..=1.0).contains(&p.ground_damping),
            "0..=1",
        )?;

        let r = &self.ranged;
        non_negative("ranged.damage", r.damage)?;
        positive("ranged.fire_rate", r.fire_rate)?;
        positive("ranged.range", r.range)?;
        non_negative("ranged.knockback", r.knockback)?;
        non_negative("ranged.spread", r.spread)?;

        let m = &self.melee;
        non_negative("melee.damage", m.damage)?;
        positive("melee.range", m.range)?;
        check(
            "melee.cone_half_angle",
            m.cone_half_angle as f64,
            m.cone_half_angle > 0.0 && m.cone_half_angle <= PI,
            "0 < angle <= π",
        )?;
        non_negative("melee.knockback", m.knockback)?;
        non_negative("melee.cooldown", m.cooldown)?;
        positive("melee.slash_duration", m.slash_duration)?;

        let e = &self.enemies;
        positive("enemies.base_hp", e.base_hp)?;
        non_negative("enemies.base_damage", e.base_damage)?;
        non_negative("enemies.base_speed", e.base_speed)?;
        check(
            "enemies.stat_scale_per_level",
            e.stat_scale_per_level,
            e.stat_scale_per_level >= 0.0,
            ">= 0",
        )?;
        check(
            "enemies.speed_scale_per_level",
            e.speed_scale_per_level,
            e.speed_scale_per_level >= 0.0,
            ">= 0",
        )?;
        non_negative("enemies.min_spawn_distance", e.min_spawn_distance)?;
        check(
            "enemies.spawn_distance",
            e.spawn_distance as f64,
            e.spawn_distance >= e.min_spawn_distance,
            ">= enemies.min_spawn_distance",
        )?;
        positive("enemies.initial_spawn_rate", e.initial_spawn_rate)?;
        positive("enemies.min_spawn_rate", e.min_spawn_rate)?;
        non_negative("enemies.spawn_rate_decrease", e.spawn_rate_decrease)?;
        non_negative("enemies.touch_damage_cooldown", e.touch_damage_cooldown)?;
        positive("enemies.size", e.size)?;
        positive("enemies.height", e.height)?;
        positive("enemies.death_anim_duration", e.death_anim_duration)?;

        let x = &self.xp;
        check(
            "xp.base_xp_to_level",
            x.base_xp_to_level as f64,
            x.base_xp_to_level > 0,
            "> 0",
        )?;
        check(
            "xp.xp_multiplier_per_level",
            x.xp_multiplier_per_level,
            x.xp_multiplier_per_level >= 1.0,
            ">= 1",
        )?;
        positive("xp.orb_size", x.orb_size)?;
        positive("xp.orb_speed", x.orb_speed)?;
        positive("xp.orb_acceleration", x.orb_acceleration)?;
        positive("xp.orb_lifetime", x.orb_lifetime)?;

        let s = &self.slowmo;
        check(
            "slowmo.time_scale",
            s.time_scale as f64,
            s.time_scale > 0.0 && s.time_scale <= 1.0,
            "0 < scale <= 1",
        )?;
        positive("slowmo.transition_speed", s.transition_speed)?;

        let d = &self.dive;
        positive("dive.duration", d.duration)?;
        non_negative("dive.speed", d.speed)?;
        non_negative("dive.height", d.height)?;

        let u = &self.upgrades;
        non_negative("upgrades.ranged_damage", u.ranged_damage)?;
        non_negative("upgrades.fire_rate", u.fire_rate)?;
        non_negative("upgrades.melee_damage", u.melee_damage)?;
        non_negative("upgrades.melee_range", u.melee_range)?;
        non_negative("upgrades.move_speed", u.move_speed)?;
        non_negative("upgrades.max_hp", u.max_hp)?;
        non_negative("upgrades.pickup_radius", u.pickup_radius)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "enemies": { "base_hp": 55 } }"#).unwrap();
        assert_eq!(tuning.enemies.base_hp, 55.0);
        assert_eq!(tuning.enemies.max_enemies, 60);
        assert_eq!(tuning.player, PlayerTuning::default());
    }

    #[test]
    fn test_stat_scale_key() {
        let tuning = Tuning::from_json(r#"{ "enemies": { "stat_scale_per_level": 0.2 } }"#).unwrap();
        assert_eq!(tuning.enemies.stat_scale_per_level, 0.2);
        let err = Tuning::from_json(r#"{ "enemies": { "stat_scale_per_level": -0.1 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                key: "enemies.stat_scale_per_level",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        let err = Tuning::from_json(r#"{ "player": { "pickup_radius": -1.0 } }"#).unwrap_err();
        match err {
            TuningError::OutOfRange { key, .. } => assert_eq!(key, "player.pickup_radius"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inverted_spawn_ring_is_rejected() {
        let err = Tuning::from_json(
            r#"{ "enemies": { "min_spawn_distance": 30.0, "spawn_distance": 10.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                key: "enemies.spawn_distance",
                ..
            }
        ));
    }

    #[test]
    fn test_slowmo_scale_must_be_a_fraction() {
        let mut tuning = Tuning::default();
        tuning.slowmo.time_scale = 1.5;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        assert!(matches!(
            Tuning::load("/definitely/not/here/tuning.json"),
            Err(TuningError::Io { .. })
        ));
    }
}
