//! Geometry helpers shared by every simulation component
//!
//! Pure functions only. Anything random takes the session RNG explicitly.

use glam::Vec3;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::consts::CONE_MIN_DIST;
use crate::normalize_angle;

/// Cone containment with a precomputed cosine of the half-angle.
///
/// Rejects targets beyond `range`, accepts targets on top of the origin, and
/// otherwise accepts iff `dot(direction, to_target) >= half_angle_cos`.
pub fn cone_hit_check(
    origin: Vec3,
    direction: Vec3,
    target: Vec3,
    range: f32,
    half_angle_cos: f32,
) -> bool {
    let delta = target - origin;
    let dist = delta.length();

    if dist > range {
        return false;
    }
    if dist < CONE_MIN_DIST {
        return true;
    }

    let to_target = delta / dist;
    direction.dot(to_target) >= half_angle_cos
}

/// Cone containment for a half-angle in radians
pub fn is_in_cone(origin: Vec3, direction: Vec3, target: Vec3, half_angle: f32, range: f32) -> bool {
    cone_hit_check(origin, direction, target, range, half_angle.cos())
}

/// Uniform angle, uniform radius between `min_radius` and `max_radius`,
/// placed at height `y` around `center`
pub fn random_point_in_ring<R: Rng + ?Sized>(
    rng: &mut R,
    center: Vec3,
    min_radius: f32,
    max_radius: f32,
    y: f32,
) -> Vec3 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let radius = random_range(rng, min_radius, max_radius);
    Vec3::new(
        center.x + angle.cos() * radius,
        y,
        center.z + angle.sin() * radius,
    )
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Interpolate between two angles along the shortest arc
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = normalize_angle(to - from);
    normalize_angle(from + delta * clamp(t, 0.0, 1.0))
}

/// Uniform value in `[min, max)`
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Shuffled copy of a slice (Fisher-Yates)
pub fn shuffled<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Horizontal unit vector pointing from `from` to `to` (zero if they coincide)
pub fn knockback_direction(from: Vec3, to: Vec3) -> Vec3 {
    crate::horizontal(to - from).normalize_or_zero()
}

/// Nearest non-negative ray parameter where a ray hits a sphere
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let h = b * b - c;
    if h < 0.0 {
        return None;
    }
    let h = h.sqrt();
    let t0 = -b - h;
    let t1 = -b + h;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        // Origin inside the sphere
        Some(0.0)
    } else {
        None
    }
}

/// Nearest non-negative ray parameter where a ray (unit `dir`) hits the
/// capsule with segment `a..b` and radius `radius`
pub fn ray_capsule(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, radius: f32) -> Option<f32> {
    let ba = b - a;
    let oa = origin - a;
    let baba = ba.dot(ba);
    let bard = ba.dot(dir);
    let baoa = ba.dot(oa);

    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    // Cylinder body
    let k2 = baba - bard * bard;
    if k2 > f32::EPSILON && baba > f32::EPSILON {
        let k1 = baba * oa.dot(dir) - baoa * bard;
        let k0 = baba * oa.dot(oa) - baoa * baoa - radius * radius * baba;
        let h = k1 * k1 - k2 * k0;
        if h >= 0.0 {
            let t = (-k1 - h.sqrt()) / k2;
            let y = baoa + t * bard;
            if y > 0.0 && y < baba {
                consider(t);
            }
        }
    }

    // End caps
    if let Some(t) = ray_sphere(origin, dir, a, radius) {
        consider(t);
    }
    if let Some(t) = ray_sphere(origin, dir, b, radius) {
        consider(t);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    #[test]
    fn test_cone_boundary_is_inclusive() {
        // (3, 0, 4) has length exactly 5, so the normalized z is exactly 0.8
        let origin = Vec3::ZERO;
        let facing = Vec3::Z;
        assert!(cone_hit_check(origin, facing, Vec3::new(3.0, 0.0, 4.0), 10.0, 0.8));
        assert!(!cone_hit_check(
            origin,
            facing,
            Vec3::new(3.0, 0.0, 4.0),
            10.0,
            0.800_001
        ));
    }

    #[test]
    fn test_cone_rejects_beyond_range() {
        assert!(!is_in_cone(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 3.6), 0.6, 3.5));
        assert!(is_in_cone(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 3.5), 0.6, 3.5));
    }

    #[test]
    fn test_cone_accepts_target_on_origin() {
        // Behind the facing direction, but effectively at the origin
        assert!(is_in_cone(
            Vec3::ZERO,
            Vec3::Z,
            Vec3::new(0.0, 0.0, -0.005),
            0.1,
            1.0
        ));
    }

    proptest! {
        #[test]
        fn prop_cone_angle_decides_regardless_of_distance(
            half_deg in 10.0f32..80.0,
            offset_deg in 0.5f32..60.0,
            inside in any::<bool>(),
            dist in 0.1f32..3.4,
        ) {
            let half = half_deg.to_radians();
            let angle = if inside {
                (half_deg - offset_deg.min(half_deg - 0.1)).to_radians()
            } else {
                (half_deg + offset_deg).to_radians()
            };
            let target = Vec3::new(angle.sin(), 0.0, angle.cos()) * dist;
            let hit = is_in_cone(Vec3::ZERO, Vec3::Z, target, half, 3.5);
            prop_assert_eq!(hit, inside);
        }

        #[test]
        fn prop_ring_samples_stay_in_annulus(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let center = Vec3::new(5.0, 0.0, -3.0);
            for _ in 0..32 {
                let p = random_point_in_ring(&mut rng, center, 16.0, 22.0, 0.0);
                let d = (p - center).length();
                prop_assert!(d >= 16.0 - 1e-3 && d <= 22.0 + 1e-3);
                prop_assert_eq!(p.y, 0.0);
            }
        }
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        let a = lerp_angle(PI - 0.1, -PI + 0.1, 0.5);
        assert!(a.abs() > PI - 0.11);
        assert!((lerp_angle(0.0, 1.0, 2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
        assert_eq!(lerp(2.0, 0.0, 0.5), 1.0);
    }

    #[test]
    fn test_random_range_stays_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..1000 {
            let v = random_range(&mut rng, -0.5, 0.5);
            assert!((-0.5..0.5).contains(&v));
        }
        assert_eq!(random_range(&mut rng, 3.0, 3.0), 3.0);
    }

    #[test]
    fn test_shuffled_is_a_permutation() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut out = shuffled(&mut rng, &[1, 2, 3, 4, 5, 6, 7]);
        out.sort();
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_knockback_direction_is_horizontal() {
        let d = knockback_direction(Vec3::new(0.0, 2.0, 0.0), Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(d.y, 0.0);
        assert!((d - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert_eq!(knockback_direction(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_ray_capsule_body_hit() {
        let a = Vec3::new(0.0, 0.5, 10.0);
        let b = Vec3::new(0.0, 1.3, 10.0);
        let t = ray_capsule(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, a, b, 0.5).unwrap();
        assert!((t - 9.5).abs() < 1e-3);
    }

    #[test]
    fn test_ray_capsule_cap_hit_and_miss() {
        let a = Vec3::new(0.0, 0.5, 10.0);
        let b = Vec3::new(0.0, 1.3, 10.0);
        // Straight down onto the top cap
        let t = ray_capsule(Vec3::new(0.0, 5.0, 10.0), Vec3::NEG_Y, a, b, 0.5).unwrap();
        assert!((t - (5.0 - 1.8)).abs() < 1e-4);
        // Passes well to the side
        assert!(ray_capsule(Vec3::new(2.0, 1.0, 0.0), Vec3::Z, a, b, 0.5).is_none());
        // Pointing away
        assert!(ray_capsule(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, a, b, 0.5).is_none());
    }
}
