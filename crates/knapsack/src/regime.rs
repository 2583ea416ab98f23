//! Difficulty regimes of the randomized stress corpus.
//!
//! Each regime stresses a different axis of solver cost: item count, weight
//! magnitude, value magnitude, or item density under a small capacity.

use std::fmt;
use std::ops::RangeInclusive;

use shared::{AppError, AppResult};

use crate::instance::{Instance, Item};
use crate::rng::InstanceRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyRegime {
    General,
    LargeWeight,
    LargeValue,
    DenseSmallCapacity,
}

/// Inclusive bounds for every random draw of one regime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegimeBounds {
    pub items: RangeInclusive<u64>,
    pub capacity: RangeInclusive<u64>,
    pub weight: RangeInclusive<u64>,
    pub value: RangeInclusive<u64>,
}

impl DifficultyRegime {
    /// Generation order of the stress corpus.
    pub const ALL: [DifficultyRegime; 4] = [
        DifficultyRegime::General,
        DifficultyRegime::LargeWeight,
        DifficultyRegime::LargeValue,
        DifficultyRegime::DenseSmallCapacity,
    ];

    pub fn bounds(self) -> RegimeBounds {
        match self {
            DifficultyRegime::General => RegimeBounds {
                items: 1..=50,
                capacity: 1..=100,
                weight: 1..=50,
                value: 1..=100,
            },
            DifficultyRegime::LargeWeight => RegimeBounds {
                items: 1..=10,
                capacity: 1_000_000..=5_000_000,
                weight: 100_000..=1_000_000,
                value: 1..=1_000,
            },
            DifficultyRegime::LargeValue => RegimeBounds {
                items: 1..=100,
                capacity: 1..=100,
                weight: 1..=100,
                value: 1_000..=100_000,
            },
            // Exponential enumeration blows up while the DP tables stay tiny.
            DifficultyRegime::DenseSmallCapacity => RegimeBounds {
                items: 100..=500,
                capacity: 30..=40,
                weight: 1..=100,
                value: 1..=100,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DifficultyRegime::General => "general",
            DifficultyRegime::LargeWeight => "large-weight",
            DifficultyRegime::LargeValue => "large-value",
            DifficultyRegime::DenseSmallCapacity => "dense-small-capacity",
        }
    }
}

impl fmt::Display for DifficultyRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RegimeBounds {
    pub fn validate(&self) -> AppResult<()> {
        for (label, range) in [
            ("item count", &self.items),
            ("capacity", &self.capacity),
            ("weight", &self.weight),
            ("value", &self.value),
        ] {
            if range.is_empty() {
                return Err(AppError::InvalidParameter(format!(
                    "{label} range {}..={} is empty",
                    range.start(),
                    range.end()
                )));
            }
            if *range.start() == 0 {
                return Err(AppError::InvalidParameter(format!(
                    "{label} range must start at 1 or above"
                )));
            }
        }
        Ok(())
    }

    /// Draw one instance; every item's weight and value are independent draws.
    pub fn sample(&self, rng: &mut InstanceRng) -> AppResult<Instance> {
        self.validate()?;
        let item_count = rng.between(&self.items);
        let capacity = rng.between(&self.capacity);
        let items = (0..item_count)
            .map(|_| {
                let weight = rng.between(&self.weight);
                let value = rng.between(&self.value);
                Item::new(weight, value)
            })
            .collect();
        Instance::new(capacity, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bounds_are_valid() {
        for regime in DifficultyRegime::ALL {
            regime.bounds().validate().unwrap();
        }
    }

    #[test]
    fn empty_or_zero_ranges_are_rejected() {
        let mut bounds = DifficultyRegime::General.bounds();
        bounds.capacity = RangeInclusive::new(10, 5);
        assert!(bounds.validate().is_err());

        let mut bounds = DifficultyRegime::General.bounds();
        bounds.weight = 0..=5;
        assert!(matches!(
            bounds.sample(&mut InstanceRng::new(1)),
            Err(AppError::InvalidParameter(_))
        ));
    }

    #[test]
    fn large_weight_samples_respect_bounds() {
        let bounds = DifficultyRegime::LargeWeight.bounds();
        let mut rng = InstanceRng::new(99);
        for _ in 0..50 {
            let instance = bounds.sample(&mut rng).unwrap();
            assert!((1..=10).contains(&instance.item_count()));
            assert!(bounds.capacity.contains(&instance.capacity()));
            for item in instance.items() {
                assert!(bounds.weight.contains(&item.weight));
                assert!(bounds.value.contains(&item.value));
            }
        }
    }
}
