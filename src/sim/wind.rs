//! Per-round wind generation

use rand::Rng;

use super::state::{WindDirection, WindVector};
use crate::consts::WIND_MAX_SPEED;

/// Roll a new wind: speed uniform in [0, WIND_MAX_SPEED), direction a coin flip
pub fn generate_wind(rng: &mut impl Rng) -> WindVector {
    let speed = rng.random_range(0.0..WIND_MAX_SPEED);
    let direction = if rng.random_bool(0.5) {
        WindDirection::Right
    } else {
        WindDirection::Left
    };
    WindVector { speed, direction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wind_speed_in_range_and_both_directions_occur() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut lefts = 0;
        let mut rights = 0;
        for _ in 0..500 {
            let wind = generate_wind(&mut rng);
            assert!((0.0..WIND_MAX_SPEED).contains(&wind.speed));
            match wind.direction {
                WindDirection::Left => lefts += 1,
                WindDirection::Right => rights += 1,
            }
        }
        assert!(lefts > 100 && rights > 100);
    }

    #[test]
    fn test_same_seed_same_wind() {
        let a = generate_wind(&mut Pcg32::seed_from_u64(42));
        let b = generate_wind(&mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
