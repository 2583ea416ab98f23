//! Linear-sweep corpus for scaling curves.
//!
//! Every item of one instance shares the same `(weight, value)` pair. After
//! each instance the item count, weight and value advance by their steps.

use serde::Deserialize;
use shared::{AppError, AppResult};
use tracing::info;

use crate::corpus::{Corpus, CorpusLayout};
use crate::instance::{Instance, Item};

/// Largest item count a sweep instance may hold.
pub const MAX_SWEEP_ITEMS: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SweepAxis {
    pub start: u64,
    #[serde(default)]
    pub step: u64,
}

impl SweepAxis {
    pub const fn new(start: u64, step: u64) -> Self {
        Self { start, step }
    }

    pub const fn constant(value: u64) -> Self {
        Self::new(value, 0)
    }

    /// Value at the 0-based position `k` of the sweep, `None` on overflow.
    pub fn at(&self, k: usize) -> Option<u64> {
        let offset = self.step.checked_mul(u64::try_from(k).ok()?)?;
        self.start.checked_add(offset)
    }

    /// The first `count` values, stopping early if the axis overflows.
    pub fn values(&self, count: usize) -> Vec<u64> {
        (0..count).map_while(|k| self.at(k)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SweepPlan {
    pub count: usize,
    pub items: SweepAxis,
    pub weight: SweepAxis,
    pub value: SweepAxis,
}

impl SweepPlan {
    pub fn validate(&self) -> AppResult<()> {
        if self.count == 0 {
            return Err(AppError::InvalidParameter(
                "a sweep needs at least one instance".into(),
            ));
        }
        for (label, axis) in [
            ("item count", &self.items),
            ("weight", &self.weight),
            ("value", &self.value),
        ] {
            if axis.start == 0 {
                return Err(AppError::InvalidParameter(format!(
                    "sweep {label} must start at 1 or above"
                )));
            }
        }

        // Steps never decrease, so the last instance carries the largest magnitudes.
        self.magnitudes_at(self.count - 1).map(|_| ())
    }

    /// Magnitudes `(item_count, weight, value)` at the 0-based sweep position `k`.
    fn magnitudes_at(&self, k: usize) -> AppResult<(u64, u64, u64)> {
        let axis_at = |label: &str, axis: &SweepAxis| {
            axis.at(k).ok_or_else(|| {
                AppError::InvalidParameter(format!(
                    "sweep {label} overflows at instance {}",
                    k + 1
                ))
            })
        };
        let item_count = axis_at("item count", &self.items)?;
        let weight = axis_at("weight", &self.weight)?;
        let value = axis_at("value", &self.value)?;

        if item_count > MAX_SWEEP_ITEMS {
            return Err(AppError::InvalidParameter(format!(
                "sweep item count {item_count} at instance {} exceeds {MAX_SWEEP_ITEMS}",
                k + 1
            )));
        }
        if weight as f64 * (item_count as f64).log2() >= u64::MAX as f64 {
            return Err(AppError::InvalidParameter(format!(
                "sweep capacity for weight {weight} and {item_count} items overflows at instance {}",
                k + 1
            )));
        }
        Ok((item_count, weight, value))
    }

    /// Instance at the 0-based sweep position `k`.
    pub fn instance_at(&self, k: usize) -> AppResult<Instance> {
        let (item_count, weight, value) = self.magnitudes_at(k)?;
        let count = usize::try_from(item_count).map_err(|_| {
            AppError::InvalidParameter(format!("item count {item_count} does not fit in memory"))
        })?;
        Instance::new(sweep_capacity(weight, item_count), vec![Item::new(weight, value); count])
    }

    pub fn instances(&self) -> impl Iterator<Item = AppResult<Instance>> + '_ {
        (0..self.count).map(move |k| self.instance_at(k))
    }
}

/// `floor(weight × log2(item_count))`, never below 1.
///
/// The float-to-integer cast saturates at `u64::MAX`; `SweepPlan::validate`
/// rejects plans that would reach it.
pub fn sweep_capacity(weight: u64, item_count: u64) -> u64 {
    let capacity = (weight as f64 * (item_count as f64).log2()).floor();
    debug_assert!(capacity < u64::MAX as f64, "sweep capacity overflows u64");
    (capacity as u64).max(1)
}

/// Write `plan.count` sweep instances numbered from 1, overwriting existing files.
pub fn generate_sweep(layout: &CorpusLayout, plan: &SweepPlan) -> AppResult<Corpus> {
    plan.validate()?;
    layout.prepare()?;

    for (k, instance) in plan.instances().enumerate() {
        instance?.write_to(&layout.instance_path(k + 1))?;
    }

    info!(
        count = plan.count,
        dir = ?layout.dir,
        items = ?plan.items,
        weight = ?plan.weight,
        value = ?plan.value,
        "generated sweep corpus"
    );
    Ok(Corpus::new(layout.clone(), plan.count))
}
