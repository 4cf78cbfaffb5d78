//! Shot resolution: wind drift, hand shake and ring scoring
//!
//! Power is coupled to wind exposure through flight time: a harder draw
//! flies faster and drifts less, but shakes more.

use glam::Vec2;
use rand::Rng;

use super::state::{Impact, ScoreTier, WindVector};
use crate::consts::*;

/// Flight time (seconds) for a power in [0, 100]
#[inline]
pub fn flight_time(power: f32) -> f32 {
    let power01 = (power / MAX_POWER).clamp(0.0, 1.0);
    FLIGHT_TIME_MAX - FLIGHT_TIME_POWER_SPAN * power01
}

/// Horizontal displacement caused by wind over a flight
#[inline]
pub fn wind_drift(wind: &WindVector, flight_time: f32) -> f32 {
    wind.direction.sign() * wind.speed * WIND_FACTOR * flight_time
}

/// Jitter multiplier for a power in [0, 100]
#[inline]
pub fn jitter_scale(power: f32) -> f32 {
    let power01 = (power / MAX_POWER).clamp(0.0, 1.0);
    JITTER_BASE_SCALE + power01 * JITTER_POWER_SCALE
}

/// Raw hand-shake sample, each axis uniform in [-AIM_JITTER/2, AIM_JITTER/2]
pub fn sample_jitter(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * AIM_JITTER,
        (rng.random::<f32>() - 0.5) * AIM_JITTER,
    )
}

/// Score for a distance from the target center
///
/// Outside the face scores 0. Inside, the face is cut into RING_COUNT equal
/// bands; the innermost band scores 10 and the outermost 1.
pub fn score_for_distance(distance: f32, radius: f32) -> u32 {
    if distance.is_nan() || distance > radius {
        return 0;
    }
    let ring_width = radius / RING_COUNT as f32;
    let ring = (distance / ring_width).floor() as u32;
    RING_COUNT.saturating_sub(ring).max(1)
}

/// Resolve a release into an impact
///
/// `jitter` is a raw sample from [`sample_jitter`]; it is scaled by power here.
pub fn resolve(aim: Vec2, power: f32, wind: &WindVector, jitter: Vec2) -> Impact {
    let power = power.clamp(0.0, MAX_POWER);
    let t = flight_time(power);
    let drift = Vec2::new(wind_drift(wind, t), 0.0);
    let pos = aim + drift + jitter * jitter_scale(power);

    let score = score_for_distance(pos.length(), TARGET_RADIUS);
    Impact {
        pos,
        score,
        tier: ScoreTier::from_score(score),
        power,
    }
}

/// Sample jitter from `rng` and resolve
pub fn resolve_with_rng(aim: Vec2, power: f32, wind: &WindVector, rng: &mut impl Rng) -> Impact {
    let jitter = sample_jitter(rng);
    resolve(aim, power, wind, jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::WindDirection;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_drift_full_wind_zero_power() {
        let wind = WindVector {
            speed: 10.0,
            direction: WindDirection::Right,
        };
        let drift = wind_drift(&wind, flight_time(0.0));
        assert!((drift - 1.8).abs() < 1e-5);

        let left = WindVector {
            direction: WindDirection::Left,
            ..wind
        };
        assert!((wind_drift(&left, flight_time(0.0)) + 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_center_full_power_no_wind_is_perfect() {
        let impact = resolve(Vec2::ZERO, 100.0, &WindVector::CALM, Vec2::ZERO);
        assert!(impact.pos.length() < 1e-5);
        assert_eq!(impact.score, 10);
        assert_eq!(impact.tier, ScoreTier::Perfect);
    }

    #[test]
    fn test_just_outside_face_is_miss() {
        let aim = Vec2::new(0.0, TARGET_RADIUS + 1.0);
        for power in [0.0, 50.0, 100.0] {
            let impact = resolve(aim, power, &WindVector::CALM, Vec2::ZERO);
            assert_eq!(impact.score, 0);
            assert_eq!(impact.tier, ScoreTier::Miss);
        }
    }

    #[test]
    fn test_ring_boundaries() {
        let r = TARGET_RADIUS;
        let w = r / RING_COUNT as f32;
        assert_eq!(score_for_distance(0.0, r), 10);
        assert_eq!(score_for_distance(w * 0.99, r), 10);
        assert_eq!(score_for_distance(w * 1.01, r), 9);
        assert_eq!(score_for_distance(w * 9.5, r), 1);
        // The rim itself is still on the face
        assert_eq!(score_for_distance(r, r), 1);
        assert_eq!(score_for_distance(r + 0.001, r), 0);
        assert_eq!(score_for_distance(f32::NAN, r), 0);
    }

    #[test]
    fn test_jitter_sample_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..1000 {
            let j = sample_jitter(&mut rng);
            assert!(j.x.abs() <= AIM_JITTER / 2.0);
            assert!(j.y.abs() <= AIM_JITTER / 2.0);
        }
    }

    #[test]
    fn test_jitter_grows_with_power() {
        let sample = Vec2::new(0.5, 0.0);
        let soft = resolve(Vec2::ZERO, 0.0, &WindVector::CALM, sample);
        let hard = resolve(Vec2::ZERO, 100.0, &WindVector::CALM, sample);
        assert!((soft.pos.x - 0.4).abs() < 1e-5);
        assert!((hard.pos.x - 1.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_flight_time_in_range(power in 0.0f32..=100.0) {
            let t = flight_time(power);
            prop_assert!((0.6 - 1e-6..=1.2 + 1e-6).contains(&t));
        }

        #[test]
        fn prop_score_bounds(d in 0.0f32..(TARGET_RADIUS * 3.0)) {
            let s = score_for_distance(d, TARGET_RADIUS);
            if d > TARGET_RADIUS {
                prop_assert_eq!(s, 0);
            } else {
                prop_assert!((1..=10).contains(&s));
            }
        }

        #[test]
        fn prop_score_non_increasing(
            a in 0.0f32..(TARGET_RADIUS * 1.5),
            b in 0.0f32..(TARGET_RADIUS * 1.5),
        ) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let (near_score, far_score) = (
                score_for_distance(near, TARGET_RADIUS),
                score_for_distance(far, TARGET_RADIUS),
            );
            prop_assert!(near_score >= far_score);
        }

        #[test]
        fn prop_resolve_without_jitter_is_aim_plus_drift(
            x in -AIM_BOUND..AIM_BOUND,
            y in -AIM_BOUND..AIM_BOUND,
            power in 0.0f32..=100.0,
            speed in 0.0f32..10.0,
        ) {
            let wind = WindVector { speed, direction: WindDirection::Right };
            let impact = resolve(Vec2::new(x, y), power, &wind, Vec2::ZERO);
            prop_assert!((impact.pos.y - y).abs() < 1e-4);
            prop_assert!((impact.pos.x - (x + wind_drift(&wind, flight_time(power)))).abs() < 1e-4);
        }
    }
}
