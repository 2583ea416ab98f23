//! Linear-sweep benchmark scenarios and the X axis each one plots against.

use knapsack::{SweepAxis, SweepPlan};
use serde::Deserialize;
use shared::{AppError, AppResult};

/// Y-axis label shared by every scaling plot.
pub const TIME_AXIS_LABEL: &str = "Time (ms)";

/// Sweep variable used as the controlled X axis of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepVariable {
    Items,
    Weight,
    Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepScenario {
    pub title: String,
    pub x_label: String,
    pub x_axis: SweepVariable,
    #[serde(flatten)]
    pub plan: SweepPlan,
}

impl SweepScenario {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Config("sweep scenarios need a title".into()));
        }
        self.plan
            .validate()
            .map_err(|err| AppError::Config(format!("scenario '{}': {err}", self.title)))
    }

    pub fn x_values(&self) -> Vec<f64> {
        let axis = match self.x_axis {
            SweepVariable::Items => self.plan.items,
            SweepVariable::Weight => self.plan.weight,
            SweepVariable::Value => self.plan.value,
        };
        axis.values(self.plan.count)
            .into_iter()
            .map(|value| value as f64)
            .collect()
    }

    pub fn file_name(&self) -> String {
        format!("{}.svg", self.title)
    }

    pub fn matches(&self, filter: &[String]) -> bool {
        filter.is_empty()
            || filter
                .iter()
                .any(|title| title.eq_ignore_ascii_case(self.title.trim()))
    }
}

pub fn builtin_scenarios() -> Vec<SweepScenario> {
    vec![
        scenario(
            "Small General Tests",
            "Data size",
            SweepVariable::Items,
            20,
            SweepAxis::new(5, 5),
            SweepAxis::new(5, 5),
            SweepAxis::new(5, 5),
        ),
        scenario(
            "Increasing Weight",
            "Weight",
            SweepVariable::Weight,
            100,
            SweepAxis::constant(50),
            SweepAxis::new(100, 1000),
            SweepAxis::constant(100),
        ),
        scenario(
            "Increasing Value",
            "Value",
            SweepVariable::Value,
            100,
            SweepAxis::constant(50),
            SweepAxis::constant(100),
            SweepAxis::new(100, 1000),
        ),
        scenario(
            "Increasing Value and Weight",
            "Value and Weight",
            SweepVariable::Weight,
            100,
            SweepAxis::constant(50),
            SweepAxis::new(100, 1000),
            SweepAxis::new(100, 1000),
        ),
    ]
}

fn scenario(
    title: &str,
    x_label: &str,
    x_axis: SweepVariable,
    count: usize,
    items: SweepAxis,
    weight: SweepAxis,
    value: SweepAxis,
) -> SweepScenario {
    SweepScenario {
        title: title.to_string(),
        x_label: x_label.to_string(),
        x_axis,
        plan: SweepPlan {
            count,
            items,
            weight,
            value,
        },
    }
}
