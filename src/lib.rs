//! Arena Survivors - simulation core of a third-person arena survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, player, enemies, combat, spawning)
//! - `tuning`: Data-driven game balance, loaded once at startup
//!
//! The crate owns the authoritative game state only. Rendering, audio and input
//! devices live outside it: the caller feeds a per-tick input snapshot and a
//! camera view, and receives a list of one-shot events plus read-only snapshots.

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Engine constants that are not part of the tuning surface
pub mod consts {
    /// Nominal tick length used by the headless driver (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Largest frame delta the clock accepts (~30 fps floor)
    pub const MAX_DELTA: f32 = 0.033;

    /// Frame rate the per-frame damping factors were authored against
    pub const DAMPING_REFERENCE_HZ: f32 = 60.0;

    /// Dive timeline split (fractions of the total dive duration)
    pub const DIVE_FLIGHT_FRACTION: f32 = 0.5;
    pub const DIVE_FALL_FRACTION: f32 = 0.3;

    /// Knockback force is converted to an instant displacement with this factor
    pub const KNOCKBACK_DISPLACEMENT: f32 = 0.3;
    /// Force used to push an enemy back after it touches the player
    pub const CONTACT_PUSH_FORCE: f32 = 3.0;
    /// Contact check uses the combined radii scaled by this factor
    pub const CONTACT_RANGE_FACTOR: f32 = 1.5;

    /// Enemies stop and telegraph an attack inside this horizontal distance
    pub const ENEMY_ATTACK_RANGE: f32 = 0.8;
    /// Enemies stop turning toward the player inside this distance
    pub const ENEMY_TURN_MIN_DIST: f32 = 0.1;
    /// Yaw interpolation rate for enemies (per second)
    pub const ENEMY_TURN_RATE: f32 = 8.0;

    /// Death notification fires at this fraction of the death animation
    pub const DEATH_NOTIFY_FRACTION: f32 = 0.9;

    /// Orbs are collected inside this distance
    pub const ORB_CAPTURE_DISTANCE: f32 = 0.5;
    /// Orbs float this far above their size radius
    pub const ORB_FLOAT_OFFSET: f32 = 0.1;

    /// Distance below which a cone target counts as "on top of" the origin
    pub const CONE_MIN_DIST: f32 = 0.01;

    /// Number of upgrades offered on level-up
    pub const UPGRADE_CHOICES: usize = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Drop the vertical component of a vector
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal unit vector for a yaw angle, using the camera convention
/// where yaw 0 looks down -Z
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right-hand vector for a yaw angle
#[inline]
pub fn yaw_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Yaw that makes [`yaw_forward`] point along the horizontal part of `dir`
#[inline]
pub fn yaw_toward(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}
