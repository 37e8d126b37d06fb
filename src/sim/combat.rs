//! Targeting and attack resolution
//!
//! Resolvers only read the enemy set. They describe what was hit; applying
//! damage and knockback is the damage resolver's job, in the same tick.

use glam::Vec3;
use rand::Rng;
use serde::Serialize;

use super::enemy::Enemy;
use super::geom::{cone_hit_check, knockback_direction, random_range, ray_capsule};
use super::player::{Player, Weapon};
use super::tick::CameraView;
use crate::horizontal;
use crate::tuning::Tuning;

/// One enemy struck by an attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub enemy_id: u32,
    pub damage: f32,
    /// World-space impact point (presentation)
    pub point: Vec3,
    /// Horizontal unit push direction
    pub knockback_direction: Vec3,
    pub knockback_force: f32,
}

/// Everything one shot or swing produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackResult {
    pub weapon: Weapon,
    /// In hit order: nearest first for ranged, enemy order for melee
    pub hits: Vec<Hit>,
    /// Melee only: swing direction shared by every hit
    pub slice_direction: Option<Vec3>,
    pub origin: Vec3,
    pub direction: Vec3,
    /// Impact point, or the end of the ray/swing when nothing was hit
    pub end: Vec3,
}

impl AttackResult {
    pub fn is_sliced(&self) -> bool {
        self.slice_direction.is_some()
    }
}

/// Hitscan from the camera along the aim, perturbed by spread.
/// At most one enemy is hit: the first along the ray.
pub fn resolve_ranged<R: Rng + ?Sized>(
    rng: &mut R,
    camera: &CameraView,
    player: &Player,
    enemies: &[Enemy],
    tuning: &Tuning,
) -> AttackResult {
    let origin = camera.position;
    let spread = tuning.ranged.spread;
    let half = spread * 0.5;
    let jitter = Vec3::new(
        random_range(rng, -half, half),
        random_range(rng, -half, half),
        random_range(rng, -half, half),
    );
    let direction = (camera.aim + jitter).try_normalize().unwrap_or(camera.aim);

    let size = tuning.enemies.size;
    let foot = Vec3::Y * size;
    let head = Vec3::Y * (tuning.enemies.height - size).max(size);
    let range = tuning.ranged.range;

    let nearest = enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            ray_capsule(origin, direction, e.position + foot, e.position + head, size)
                .filter(|t| *t <= range)
                .map(|t| (t, e))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let mut result = AttackResult {
        weapon: Weapon::Ranged,
        hits: Vec::new(),
        slice_direction: None,
        origin,
        direction,
        end: origin + direction * range,
    };

    if let Some((t, enemy)) = nearest {
        let point = origin + direction * t;
        result.end = point;
        result.hits.push(Hit {
            enemy_id: enemy.id,
            damage: player.stats.ranged_damage,
            point,
            knockback_direction: horizontal(direction).normalize_or_zero(),
            knockback_force: tuning.ranged.knockback,
        });
    }

    result
}

/// Cone sweep from chest height along the player's facing.
/// Every living enemy inside the cone is hit.
pub fn resolve_melee(player: &Player, enemies: &[Enemy], tuning: &Tuning) -> AttackResult {
    let origin = player.position + Vec3::Y * tuning.player.height * 0.5;
    let direction = player.facing();
    let range = player.stats.melee_range;
    let half_angle_cos = tuning.melee.cone_half_angle.cos();

    let hits = enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            let target = e.center(tuning.enemies.height);
            cone_hit_check(origin, direction, target, range, half_angle_cos).then(|| Hit {
                enemy_id: e.id,
                damage: player.stats.melee_damage,
                point: target,
                knockback_direction: knockback_direction(player.position, e.position),
                knockback_force: tuning.melee.knockback,
            })
        })
        .collect();

    AttackResult {
        weapon: Weapon::Melee,
        hits,
        slice_direction: Some(direction),
        origin,
        direction,
        end: origin + direction * range,
    }
}
