//! Running per-column accumulators.
//!
//! A [`ColumnAccumulator`] is fed one numeric value at a time during the scan
//! and consumed by [`ColumnAccumulator::finalize`], so a finalized column can
//! never be observed again.

use serde::{Serialize, Serializer};

use crate::{config::EmptyColumnPolicy, error::AnalysisError};

/// Above this magnitude every `f64` is an integer and scaling by 100 loses precision.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// A finalized statistic, or a marker for a column without numeric cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Undeterminable,
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Value(value) => Some(value),
            Metric::Undeterminable => None,
        }
    }

    /// Applies the request's rendering policy for undeterminable metrics.
    pub fn resolve(self, policy: EmptyColumnPolicy) -> Metric {
        match (self, policy) {
            (Metric::Undeterminable, EmptyColumnPolicy::Zero) => Metric::Value(0.0),
            (metric, _) => metric,
        }
    }
}

impl Serialize for Metric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Metric::Value(value) => serializer.serialize_f64(*value),
            Metric::Undeterminable => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub index: usize,
    pub name: String,
    pub count: u64,
    pub sum: Metric,
    pub average: Metric,
    pub max: Metric,
}

#[derive(Debug)]
pub struct ColumnAccumulator {
    index: usize,
    name: String,
    count: u64,
    sum: f64,
    max: f64,
}

impl ColumnAccumulator {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            count: 0,
            sum: 0.0,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        if value > self.max {
            self.max = value;
        }
    }

    /// Fails with [`AnalysisError::InvalidColumn`] when the running sum overflowed.
    pub fn finalize(self, source: &str) -> Result<ColumnSummary, AnalysisError> {
        if !self.sum.is_finite() {
            return Err(AnalysisError::invalid_column(
                source,
                self.name,
                "sum of numeric values exceeds the representable range",
            ));
        }
        let (sum, average, max) = if self.count == 0 {
            (
                Metric::Undeterminable,
                Metric::Undeterminable,
                Metric::Undeterminable,
            )
        } else {
            // Average divides the unrounded sum.
            let average = self.sum / self.count as f64;
            (
                Metric::Value(round2(self.sum)),
                Metric::Value(round2(average)),
                Metric::Value(round2(self.max)),
            )
        };
        Ok(ColumnSummary {
            index: self.index,
            name: self.name,
            count: self.count,
            sum,
            average,
            max,
        })
    }
}

/// Rounds to two decimals, leaving values that have no representable cents untouched.
pub fn round2(value: f64) -> f64 {
    if value.fract() == 0.0 {
        return value;
    }
    let scaled = value * 100.0;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    scaled.round() / 100.0
}
