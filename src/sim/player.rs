//! The player: movement, jump/dive state machine, weapon gates, XP and upgrades

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geom::lerp;
use super::progression::{UpgradeKind, xp_to_level};
use super::state::GameEvent;
use super::tick::{CameraView, TickInput};
use crate::consts::{DAMPING_REFERENCE_HZ, DIVE_FALL_FRACTION, DIVE_FLIGHT_FRACTION};
use crate::tuning::{MeleeTuning, Tuning, UpgradeTuning, XpTuning};
use crate::{horizontal, yaw_forward};

/// Height of the weapon above the player's feet (tracer start)
pub const MUZZLE_HEIGHT: f32 = 1.4;

/// Equipped weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    /// Dual pistols: hitscan, single target
    #[default]
    Ranged,
    /// Sword: cone, multi-target
    Melee,
}

impl Weapon {
    /// Slot 0 is the ranged weapon, any other slot the melee weapon
    pub fn from_slot(slot: u8) -> Self {
        if slot == 0 { Weapon::Ranged } else { Weapon::Melee }
    }

    pub fn other(self) -> Self {
        match self {
            Weapon::Ranged => Weapon::Melee,
            Weapon::Melee => Weapon::Ranged,
        }
    }
}

/// Dive timeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivePhase {
    Flying,
    Falling,
    GetUp,
}

/// An in-progress dive. Phases are derived from elapsed time only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dive {
    /// Horizontal launch direction captured at entry
    pub direction: Vec3,
    /// Countdown to the end of the dive
    pub timer: f32,
    pub duration: f32,
    pub start_y: f32,
}

impl Dive {
    pub fn elapsed(&self) -> f32 {
        self.duration - self.timer
    }

    pub fn phase(&self) -> DivePhase {
        let elapsed = self.elapsed();
        let fly = self.duration * DIVE_FLIGHT_FRACTION;
        let fall = self.duration * DIVE_FALL_FRACTION;
        if elapsed < fly {
            DivePhase::Flying
        } else if elapsed < fly + fall {
            DivePhase::Falling
        } else {
            DivePhase::GetUp
        }
    }

    /// 0..1 progress within the current phase (pose blending)
    pub fn phase_progress(&self) -> f32 {
        let elapsed = self.elapsed();
        let fly = self.duration * DIVE_FLIGHT_FRACTION;
        let fall = self.duration * DIVE_FALL_FRACTION;
        let getup = self.duration - fly - fall;
        let progress = match self.phase() {
            DivePhase::Flying => elapsed / fly,
            DivePhase::Falling => (elapsed - fly) / fall,
            DivePhase::GetUp => (elapsed - fly - fall) / getup,
        };
        progress.clamp(0.0, 1.0)
    }
}

/// Locomotion state. Diving excludes normal movement by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Grounded,
    /// Jumping or falling
    Airborne,
    Diving(Dive),
}

/// Melee swing window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SlashState {
    #[default]
    Inactive,
    Active { remaining: f32 },
}

/// Upgradeable stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub move_speed: f32,
    pub ranged_damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub melee_damage: f32,
    pub melee_range: f32,
    pub pickup_radius: f32,
}

impl PlayerStats {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            move_speed: tuning.player.move_speed,
            ranged_damage: tuning.ranged.damage,
            fire_rate: tuning.ranged.fire_rate,
            melee_damage: tuning.melee.damage,
            melee_range: tuning.melee.range,
            pickup_radius: tuning.player.pickup_radius,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Body yaw, follows the camera (player always faces away from it)
    pub yaw: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub xp: u32,
    pub xp_to_level: u32,
    pub level: u32,
    pub weapon: Weapon,
    pub stats: PlayerStats,
    pub motion: Motion,
    pub slash: SlashState,
    /// Applied count per upgrade kind
    pub upgrades: BTreeMap<UpgradeKind, u32>,
    /// Game time of the last shot / swing
    last_fire: Option<f64>,
    last_slash: Option<f64>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            hp: tuning.player.max_hp,
            max_hp: tuning.player.max_hp,
            xp: 0,
            xp_to_level: xp_to_level(1, &tuning.xp),
            level: 1,
            weapon: Weapon::default(),
            stats: PlayerStats::from_tuning(tuning),
            motion: Motion::Grounded,
            slash: SlashState::Inactive,
            upgrades: BTreeMap::new(),
            last_fire: None,
            last_slash: None,
        }
    }

    /// Back to session-start defaults
    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning);
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self.motion, Motion::Grounded)
    }

    pub fn is_diving(&self) -> bool {
        matches!(self.motion, Motion::Diving(_))
    }

    pub fn dive(&self) -> Option<&Dive> {
        match &self.motion {
            Motion::Diving(dive) => Some(dive),
            _ => None,
        }
    }

    pub fn is_slashing(&self) -> bool {
        matches!(self.slash, SlashState::Active { .. })
    }

    /// Horizontal facing direction
    pub fn facing(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    pub fn muzzle_position(&self) -> Vec3 {
        self.position + Vec3::Y * MUZZLE_HEIGHT
    }

    /// Advance movement, jump and dive by one tick
    pub fn update(
        &mut self,
        input: &TickInput,
        camera: &CameraView,
        slow_mo: bool,
        dt: f32,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        self.update_slash(dt);

        if self.is_diving() {
            self.update_dive(dt, tuning, events);
            return;
        }

        // In slow motion the jump button dives instead
        if input.jump && slow_mo && self.is_grounded() {
            self.start_dive(camera, tuning, events);
            return;
        }

        self.yaw = camera.yaw;

        let axis = input.movement;
        if axis.length_squared() > 0.0 {
            let dir = horizontal(camera.forward * axis.y + camera.right * axis.x).normalize_or_zero();
            let mut speed = self.stats.move_speed;
            if input.run {
                speed *= tuning.player.run_multiplier;
            }
            self.velocity.x = dir.x * speed;
            self.velocity.z = dir.z * speed;
        } else {
            let keep = tuning.player.ground_damping.powf(dt * DAMPING_REFERENCE_HZ);
            self.velocity.x *= keep;
            self.velocity.z *= keep;
        }

        if input.jump && !slow_mo && self.is_grounded() {
            self.velocity.y = tuning.player.jump_force;
            self.motion = Motion::Airborne;
        }

        if !self.is_grounded() {
            self.velocity.y -= tuning.player.gravity * dt;
        }

        self.position += self.velocity * dt;

        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
            self.motion = Motion::Grounded;
        }
    }

    fn update_slash(&mut self, dt: f32) {
        if let SlashState::Active { remaining } = &mut self.slash {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.slash = SlashState::Inactive;
            }
        }
    }

    fn start_dive(&mut self, camera: &CameraView, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let mut direction = horizontal(camera.forward).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = self.facing();
        }
        self.motion = Motion::Diving(Dive {
            direction,
            timer: tuning.dive.duration,
            duration: tuning.dive.duration,
            start_y: self.position.y,
        });
        events.push(GameEvent::DiveStarted);
    }

    fn update_dive(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let Motion::Diving(dive) = &mut self.motion else {
            return;
        };
        dive.timer -= dt;

        let progress = dive.phase_progress();
        match dive.phase() {
            DivePhase::Flying => {
                self.position.x += dive.direction.x * tuning.dive.speed * dt;
                self.position.z += dive.direction.z * tuning.dive.speed * dt;
                self.position.y = dive.start_y + (progress * PI).sin() * tuning.dive.height;
            }
            DivePhase::Falling => {
                self.position.y = lerp(tuning.dive.height, 0.0, progress).max(0.0);
            }
            DivePhase::GetUp => {
                self.position.y = 0.0;
            }
        }

        if dive.timer <= 0.0 {
            self.end_dive(events);
        }
    }

    fn end_dive(&mut self, events: &mut Vec<GameEvent>) {
        self.motion = Motion::Grounded;
        self.position.y = 0.0;
        self.velocity = Vec3::ZERO;
        events.push(GameEvent::DiveEnded);
    }

    pub fn can_fire(&self, now: f64) -> bool {
        let interval = 1.0 / self.stats.fire_rate as f64;
        self.last_fire.is_none_or(|last| now - last >= interval)
    }

    pub fn did_fire(&mut self, now: f64) {
        self.last_fire = Some(now);
    }

    pub fn can_slash(&self, now: f64, melee: &MeleeTuning) -> bool {
        !self.is_slashing()
            && self
                .last_slash
                .is_none_or(|last| now - last >= melee.cooldown as f64)
    }

    /// Stamp the swing and open the slash window
    pub fn did_slash(&mut self, now: f64, melee: &MeleeTuning) {
        self.last_slash = Some(now);
        self.slash = SlashState::Active {
            remaining: melee.slash_duration,
        };
    }

    /// 0..1 through the current swing, `None` when not slashing
    pub fn slash_progress(&self, melee: &MeleeTuning) -> Option<f32> {
        match self.slash {
            SlashState::Active { remaining } => {
                Some((1.0 - remaining / melee.slash_duration).clamp(0.0, 1.0))
            }
            SlashState::Inactive => None,
        }
    }

    pub fn switch_weapon(&mut self, weapon: Weapon) {
        self.weapon = weapon;
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Add experience. At most one level is gained per call; any extra
    /// carries over as xp toward the next level.
    pub fn add_xp(&mut self, amount: u32, tuning: &XpTuning) -> bool {
        self.xp += amount;
        if self.xp >= self.xp_to_level {
            self.level += 1;
            self.xp -= self.xp_to_level;
            self.xp_to_level = xp_to_level(self.level, tuning);
            true
        } else {
            false
        }
    }

    pub fn apply_upgrade(&mut self, kind: UpgradeKind, tuning: &UpgradeTuning) {
        *self.upgrades.entry(kind).or_insert(0) += 1;

        let delta = kind.delta(tuning);
        match kind {
            UpgradeKind::RangedDamage => self.stats.ranged_damage += delta,
            UpgradeKind::FireRate => self.stats.fire_rate += delta,
            UpgradeKind::MeleeDamage => self.stats.melee_damage += delta,
            UpgradeKind::MeleeRange => self.stats.melee_range += delta,
            UpgradeKind::MoveSpeed => self.stats.move_speed += delta,
            UpgradeKind::MaxHp => {
                self.max_hp += delta;
                self.heal(delta);
            }
            UpgradeKind::PickupRadius => self.stats.pickup_radius += delta,
        }
    }

    pub fn upgrade_count(&self, kind: UpgradeKind) -> u32 {
        self.upgrades.get(&kind).copied().unwrap_or(0)
    }
}
