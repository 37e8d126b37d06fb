//! Enemies: chase AI, contact cooldown, death animation gating

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geom::lerp_angle;
use crate::consts::{
    CONTACT_RANGE_FACTOR, ENEMY_ATTACK_RANGE, ENEMY_TURN_MIN_DIST, ENEMY_TURN_RATE,
    KNOCKBACK_DISPLACEMENT,
};
use crate::tuning::EnemyTuning;
use crate::{horizontal, yaw_toward};

/// Enemy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking toward the player
    Chasing,
    /// Close enough to touch: halted, arms raised
    AttackRange,
    /// Death animation running. `sliced` marks a melee kill.
    Dying {
        timer: f32,
        sliced: bool,
        slice_direction: Option<Vec3>,
    },
    /// Inert, waiting for removal
    Dead,
}

/// What a damage call did to the enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Already dying or dead; nothing changed
    Ignored,
    Wounded,
    Killed,
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        !matches!(self, DamageOutcome::Ignored)
    }
}

/// Level-scaled hp/damage multiplier: `floor(base * (1 + (level-1) * per_level))`
pub fn scaled_stat(base: f32, level: u32, per_level: f64) -> f32 {
    let scale = 1.0 + level.saturating_sub(1) as f64 * per_level;
    (base as f64 * scale + 1e-9).floor() as f32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Contact damage per touch
    pub damage: f32,
    pub speed: f32,
    pub state: EnemyState,
    /// Player level when spawned
    pub level: u32,
    /// Seconds until the next contact hit is allowed
    contact_cooldown: f32,
    death_duration: f32,
}

impl Enemy {
    /// Spawn with stats fixed from the player's current level
    pub fn new(id: u32, position: Vec3, level: u32, tuning: &EnemyTuning) -> Self {
        let hp = scaled_stat(tuning.base_hp, level, tuning.stat_scale_per_level);
        let speed_scale = 1.0 + level.saturating_sub(1) as f64 * tuning.speed_scale_per_level;
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            hp,
            max_hp: hp,
            damage: scaled_stat(tuning.base_damage, level, tuning.stat_scale_per_level),
            speed: (tuning.base_speed as f64 * speed_scale) as f32,
            state: EnemyState::Chasing,
            level,
            contact_cooldown: 0.0,
            death_duration: tuning.death_anim_duration,
        }
    }

    /// Can be targeted, damaged and deal contact damage
    pub fn is_alive(&self) -> bool {
        matches!(self.state, EnemyState::Chasing | EnemyState::AttackRange)
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, EnemyState::Dying { .. })
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, EnemyState::Dead)
    }

    pub fn update(&mut self, player_position: Vec3, dt: f32) {
        match &mut self.state {
            EnemyState::Dead => return,
            EnemyState::Dying { timer, .. } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    self.state = EnemyState::Dead;
                    self.velocity = Vec3::ZERO;
                }
                return;
            }
            EnemyState::Chasing | EnemyState::AttackRange => {}
        }

        self.contact_cooldown = (self.contact_cooldown - dt).max(0.0);

        let to_player = horizontal(player_position - self.position);
        let dist = to_player.length();

        if dist > ENEMY_ATTACK_RANGE {
            self.velocity = to_player / dist * self.speed;
            self.state = EnemyState::Chasing;
        } else {
            self.velocity = Vec3::ZERO;
            self.state = EnemyState::AttackRange;
        }

        self.position.x += self.velocity.x * dt;
        self.position.z += self.velocity.z * dt;

        if dist > ENEMY_TURN_MIN_DIST {
            self.yaw = lerp_angle(self.yaw, yaw_toward(to_player), ENEMY_TURN_RATE * dt);
        }
    }

    pub fn take_damage(
        &mut self,
        amount: f32,
        sliced: bool,
        slice_direction: Option<Vec3>,
    ) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }

        self.hp -= amount;
        if self.hp > 0.0 {
            return DamageOutcome::Wounded;
        }

        self.hp = 0.0;
        self.velocity = Vec3::ZERO;
        self.state = EnemyState::Dying {
            timer: self.death_duration,
            sliced,
            slice_direction,
        };
        DamageOutcome::Killed
    }

    /// Instant horizontal displacement along `direction`
    pub fn apply_knockback(&mut self, direction: Vec3, force: f32) {
        let dir = horizontal(direction).normalize_or_zero();
        self.position += dir * force * KNOCKBACK_DISPLACEMENT;
    }

    pub fn is_colliding_with(&self, player_position: Vec3, player_radius: f32, size: f32) -> bool {
        let threshold = (size + player_radius) * CONTACT_RANGE_FACTOR;
        self.position.distance(player_position) < threshold
    }

    pub fn can_deal_contact_damage(&self) -> bool {
        self.is_alive() && self.contact_cooldown <= 0.0
    }

    pub fn did_deal_contact_damage(&mut self, cooldown: f32) {
        self.contact_cooldown = cooldown;
    }

    /// 0 while alive, `1 - timer/duration` while dying, 1 once dead
    pub fn death_progress(&self) -> f32 {
        match self.state {
            EnemyState::Dying { timer, .. } if self.death_duration > 0.0 => {
                (1.0 - timer / self.death_duration).clamp(0.0, 1.0)
            }
            EnemyState::Dying { .. } | EnemyState::Dead => 1.0,
            EnemyState::Chasing | EnemyState::AttackRange => 0.0,
        }
    }

    /// Mid-body point used as the melee target
    pub fn center(&self, height: f32) -> Vec3 {
        self.position + Vec3::Y * height * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy_at(position: Vec3) -> Enemy {
        Enemy::new(1, position, 1, &EnemyTuning::default())
    }

    #[test]
    fn test_level_scaling() {
        let t = EnemyTuning::default();
        let cases = [(1, 40.0), (2, 44.0), (5, 59.0), (10, 83.0)];
        for (level, hp) in cases {
            let e = Enemy::new(1, Vec3::ZERO, level, &t);
            assert_eq!(e.hp, hp, "level {level}");
            assert_eq!(e.max_hp, hp);
        }
        let e = Enemy::new(1, Vec3::ZERO, 2, &t);
        assert_eq!(e.damage, 11.0);
        let e = Enemy::new(1, Vec3::ZERO, 3, &t);
        assert!((e.speed - 3.85).abs() < 1e-5);
    }

    #[test]
    fn test_stat_scale_drives_hp_and_damage() {
        let t = EnemyTuning {
            stat_scale_per_level: 0.5,
            ..EnemyTuning::default()
        };
        let e = Enemy::new(1, Vec3::ZERO, 3, &t);
        assert_eq!(e.hp, 80.0);
        assert_eq!(e.damage, 20.0);
    }

    #[test]
    fn test_dying_enemy_ignores_further_damage() {
        let mut e = enemy_at(Vec3::ZERO);
        assert_eq!(e.take_damage(20.0, false, None), DamageOutcome::Wounded);
        assert_eq!(e.take_damage(20.0, false, None), DamageOutcome::Killed);
        assert!(e.is_dying());
        assert_eq!(e.take_damage(5.0, false, None), DamageOutcome::Ignored);
        assert_eq!(e.hp, 0.0);
        assert!(!e.can_deal_contact_damage());
    }

    #[test]
    fn test_sliced_kill_records_direction() {
        let mut e = enemy_at(Vec3::ZERO);
        e.take_damage(100.0, true, Some(Vec3::X));
        match e.state {
            EnemyState::Dying {
                sliced,
                slice_direction,
                ..
            } => {
                assert!(sliced);
                assert_eq!(slice_direction, Some(Vec3::X));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_death_animation_finishes() {
        let mut e = enemy_at(Vec3::ZERO);
        e.take_damage(100.0, false, None);
        assert_eq!(e.death_progress(), 0.0);
        e.update(Vec3::new(5.0, 0.0, 0.0), 0.2);
        assert!((e.death_progress() - 0.5).abs() < 1e-5);
        // Dying enemies do not move
        assert_eq!(e.position, Vec3::ZERO);
        e.update(Vec3::new(5.0, 0.0, 0.0), 0.2);
        assert!(e.is_dead());
        assert_eq!(e.death_progress(), 1.0);
    }

    #[test]
    fn test_chases_then_halts_in_attack_range() {
        let mut e = enemy_at(Vec3::new(0.0, 0.0, -10.0));
        e.update(Vec3::ZERO, 0.1);
        assert_eq!(e.state, EnemyState::Chasing);
        assert!((e.position.z - (-10.0 + 0.35)).abs() < 1e-5);
        assert!((e.velocity.length() - 3.5).abs() < 1e-5);

        let mut e = enemy_at(Vec3::new(0.0, 0.0, -0.7));
        e.update(Vec3::ZERO, 0.1);
        assert_eq!(e.state, EnemyState::AttackRange);
        assert_eq!(e.velocity, Vec3::ZERO);
        assert_eq!(e.position, Vec3::new(0.0, 0.0, -0.7));
    }

    #[test]
    fn test_turns_toward_player() {
        // Player straight down +X from the enemy
        let mut e = enemy_at(Vec3::new(-10.0, 0.0, 0.0));
        for _ in 0..60 {
            e.update(Vec3::new(10.0, 0.0, 0.0), 1.0 / 60.0);
        }
        let facing = crate::yaw_forward(e.yaw);
        assert!(facing.dot(Vec3::X) > 0.99);
    }

    #[test]
    fn test_contact_cooldown_counts_down() {
        let mut e = enemy_at(Vec3::new(0.0, 0.0, -0.5));
        assert!(e.can_deal_contact_damage());
        e.did_deal_contact_damage(0.5);
        assert!(!e.can_deal_contact_damage());
        e.update(Vec3::ZERO, 0.3);
        assert!(!e.can_deal_contact_damage());
        e.update(Vec3::ZERO, 0.3);
        assert!(e.can_deal_contact_damage());
    }

    #[test]
    fn test_collision_threshold() {
        let e = enemy_at(Vec3::new(0.0, 0.0, -1.4));
        assert!(e.is_colliding_with(Vec3::ZERO, 0.5, 0.5));
        let e = enemy_at(Vec3::new(0.0, 0.0, -1.6));
        assert!(!e.is_colliding_with(Vec3::ZERO, 0.5, 0.5));
    }

    #[test]
    fn test_knockback_is_horizontal() {
        let mut e = enemy_at(Vec3::ZERO);
        e.apply_knockback(Vec3::new(0.0, 5.0, -2.0), 3.0);
        assert_eq!(e.position.y, 0.0);
        assert!((e.position.z + 0.9).abs() < 1e-5);
    }
}
