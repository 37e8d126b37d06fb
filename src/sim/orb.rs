//! XP orbs dropped by dead enemies

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{ORB_CAPTURE_DISTANCE, ORB_FLOAT_OFFSET};
use crate::horizontal;
use crate::tuning::XpTuning;

/// Remaining lifetime below which presentation blinks the orb
pub const ORB_BLINK_TIME: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbState {
    Floating,
    /// Homing on the player. Never reverts to `Floating`.
    Attracted,
    Collected,
    Expired,
}

/// Resolution of an orb, reported exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbOutcome {
    Collected { value: u32 },
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpOrb {
    pub id: u32,
    pub position: Vec3,
    pub value: u32,
    pub lifetime: f32,
    pub state: OrbState,
    /// Current homing speed
    speed: f32,
}

impl XpOrb {
    /// Drop an orb at `position`, hovering just above the ground
    pub fn new(id: u32, position: Vec3, tuning: &XpTuning) -> Self {
        Self {
            id,
            position: Vec3::new(position.x, tuning.orb_size + ORB_FLOAT_OFFSET, position.z),
            value: tuning.orb_value,
            lifetime: tuning.orb_lifetime,
            state: OrbState::Floating,
            speed: 0.0,
        }
    }

    pub fn is_attracted(&self) -> bool {
        self.state == OrbState::Attracted
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, OrbState::Collected | OrbState::Expired)
    }

    pub fn is_blinking(&self) -> bool {
        !self.is_finished() && self.lifetime < ORB_BLINK_TIME
    }

    /// Advance one tick. Returns the outcome on the tick the orb resolves and
    /// `None` otherwise, including every call after resolution.
    pub fn update(
        &mut self,
        player_position: Vec3,
        pickup_radius: f32,
        dt: f32,
        tuning: &XpTuning,
    ) -> Option<OrbOutcome> {
        if self.is_finished() {
            return None;
        }

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.lifetime = 0.0;
            self.state = OrbState::Expired;
            return Some(OrbOutcome::Expired);
        }

        let dist = self.position.distance(player_position);
        if dist < pickup_radius {
            self.state = OrbState::Attracted;
        }
        if !self.is_attracted() {
            return None;
        }

        if dist < ORB_CAPTURE_DISTANCE {
            self.state = OrbState::Collected;
            return Some(OrbOutcome::Collected { value: self.value });
        }

        self.speed = (self.speed + tuning.orb_acceleration * dt).min(tuning.orb_speed);
        let to_player = horizontal(player_position - self.position);
        let flat_dist = to_player.length();
        if flat_dist > 0.0 {
            let step = (self.speed * dt).min(flat_dist);
            self.position += to_player / flat_dist * step;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn orb_at(x: f32) -> XpOrb {
        XpOrb::new(1, Vec3::new(x, 0.0, 0.0), &XpTuning::default())
    }

    #[test]
    fn test_orb_hovers() {
        let orb = orb_at(3.0);
        assert!((orb.position.y - 0.35).abs() < 1e-6);
        assert_eq!(orb.value, 12);
    }

    #[test]
    fn test_expired_orb_grants_nothing() {
        let t = XpTuning::default();
        let mut orb = orb_at(10.0);
        let mut outcomes = Vec::new();
        for _ in 0..(26 * 60) {
            if let Some(outcome) = orb.update(Vec3::ZERO, 2.5, DT, &t) {
                outcomes.push(outcome);
            }
        }
        assert_eq!(outcomes, vec![OrbOutcome::Expired]);
        assert!(orb.is_finished());
    }

    #[test]
    fn test_attraction_is_sticky() {
        let t = XpTuning::default();
        let mut orb = orb_at(2.0);
        assert!(orb.update(Vec3::ZERO, 2.5, DT, &t).is_none());
        assert!(orb.is_attracted());

        // Player runs away, orb keeps homing
        let far = Vec3::new(-50.0, 0.0, 0.0);
        let before = orb.position.x;
        orb.update(far, 2.5, DT, &t);
        assert!(orb.is_attracted());
        assert!(orb.position.x < before);
    }

    #[test]
    fn test_homing_accelerates_to_cap() {
        let t = XpTuning::default();
        let mut orb = orb_at(2.4);
        let far = Vec3::new(-100.0, 0.0, 0.0);
        orb.update(Vec3::new(0.2, 0.0, 0.0), 2.5, DT, &t);
        let mut last = orb.position.x;
        let mut steps = Vec::new();
        for _ in 0..40 {
            orb.update(far, 2.5, DT, &t);
            steps.push(last - orb.position.x);
            last = orb.position.x;
        }
        assert!(steps[1] > steps[0]);
        let top = steps.last().copied().unwrap_or_default();
        assert!((top - 18.0 * DT).abs() < 1e-4);
    }

    #[test]
    fn test_collected_exactly_once() {
        let t = XpTuning::default();
        let mut orb = orb_at(2.0);
        let mut granted = 0;
        for _ in 0..120 {
            if let Some(OrbOutcome::Collected { value }) = orb.update(Vec3::ZERO, 2.5, DT, &t) {
                granted += value;
            }
        }
        assert_eq!(granted, 12);
        assert_eq!(orb.state, OrbState::Collected);
    }

    #[test]
    fn test_blinking_near_end_of_life() {
        let t = XpTuning::default();
        let mut orb = orb_at(10.0);
        assert!(!orb.is_blinking());
        orb.update(Vec3::ZERO, 2.5, 20.5, &t);
        assert!(orb.is_blinking());
    }
}
