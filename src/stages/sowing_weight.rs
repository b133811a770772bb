//! Sowing weight by seed size
//!
//! Species with fewer, heavier seeds per kilogram get a smaller weight, so a
//! mixed batch spends its seed budget towards the small-seeded species.
//! Bucket bounds are inclusive upper limits.

use crate::utils::Quantity;

/// (inclusive upper bound of seeds/kg, weight)
const WEIGHT_BUCKETS: [(f64, f64); 8] = [
    (0.0, 0.0),
    (500.0, 0.5),
    (2_000.0, 1.0),
    (5_000.0, 2.0),
    (10_000.0, 4.0),
    (20_000.0, 8.0),
    (80_000.0, 10.0),
    (200_000.0, 12.0),
];

const TOP_WEIGHT: f64 = 14.0;

/// Piecewise-constant weight for a seed count per kilogram
pub fn sowing_weight(seeds_per_kg: f64) -> f64 {
    WEIGHT_BUCKETS
        .iter()
        .find(|(upper, _)| seeds_per_kg <= *upper)
        .map_or(TOP_WEIGHT, |(_, weight)| *weight)
}

/// Weight of a possibly-invalid seed count; invalid in, invalid out
pub fn sowing_weight_of(seeds_per_kg: Quantity) -> Quantity {
    seeds_per_kg.map(sowing_weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(sowing_weight(-5.0), 0.0);
        assert_eq!(sowing_weight(0.0), 0.0);
        assert_eq!(sowing_weight(0.5), 0.5);
        assert_eq!(sowing_weight(500.0), 0.5);
        assert_eq!(sowing_weight(501.0), 1.0);
        assert_eq!(sowing_weight(2_000.0), 1.0);
        assert_eq!(sowing_weight(2_001.0), 2.0);
        assert_eq!(sowing_weight(5_000.0), 2.0);
        assert_eq!(sowing_weight(10_000.0), 4.0);
        assert_eq!(sowing_weight(20_000.0), 8.0);
        assert_eq!(sowing_weight(80_000.0), 10.0);
        assert_eq!(sowing_weight(200_000.0), 12.0);
        assert_eq!(sowing_weight(200_001.0), 14.0);
        assert_eq!(sowing_weight(5_000_000.0), 14.0);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let mut previous = sowing_weight(-1.0);
        let mut x = -1.0;
        while x < 300_000.0 {
            let w = sowing_weight(x);
            assert!(w >= previous, "weight decreased at {}", x);
            previous = w;
            x += 37.5;
        }
    }

    #[test]
    fn test_invalid_seed_count_gives_invalid_weight() {
        assert!(!sowing_weight_of(Quantity::INVALID).is_valid());
        assert_eq!(sowing_weight_of(Quantity::new(1_000.0)), Quantity::new(1.0));
    }
}
