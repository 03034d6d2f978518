// Cost Estimates
//
// Values the optimizer attaches to candidate plans: an estimated cost, an
// estimated total row count, and the rows expected from one scan of the
// innermost table. Estimates come in levels; every level shares the same
// field set and comparison rules and differs only in what it reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field set shared by every estimate level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostFields {
    pub cost: f64,
    pub row_count: f64,
    pub single_scan_row_count: f64,
}

/// Behaviour common to all estimate levels.
///
/// Estimates are owned values. The plan search reuses an instance by handing
/// it over to `set_state`/`reset`; two candidates being compared each own
/// their own estimate.
pub trait CostEstimate: Clone + Default + fmt::Debug + fmt::Display {
    fn fields(&self) -> &CostFields;

    fn fields_mut(&mut self) -> &mut CostFields;

    fn cost(&self) -> f64 {
        self.fields().cost
    }

    fn row_count(&self) -> f64 {
        self.fields().row_count
    }

    fn single_scan_row_count(&self) -> f64 {
        self.fields().single_scan_row_count
    }

    /// Row count rounded to the nearest whole row
    fn estimated_row_count(&self) -> i64 {
        self.fields().row_count.round() as i64
    }

    fn set_cost(&mut self, cost: f64, row_count: f64, single_scan_row_count: f64) {
        *self.fields_mut() = CostFields { cost, row_count, single_scan_row_count };
    }

    fn set_single_scan_row_count(&mut self, single_scan_row_count: f64) {
        self.fields_mut().single_scan_row_count = single_scan_row_count;
    }

    fn set_estimated_row_count(&mut self, count: i64) {
        self.fields_mut().row_count = count as f64;
    }

    /// Overwrite cost and row count of this instance and give it back.
    /// The single-scan row count is kept.
    fn reset(mut self, cost: f64, row_count: f64) -> Self {
        let fields = self.fields_mut();
        fields.cost = cost;
        fields.row_count = row_count;
        self
    }

    /// Estimate with the given cost and row count.
    ///
    /// `reuse` is overwritten and returned when supplied; otherwise a fresh
    /// instance of this level is created. The receiver is never modified.
    fn set_state(&self, cost: f64, row_count: f64, reuse: Option<Self>) -> Self {
        reuse.unwrap_or_default().reset(cost, row_count)
    }

    /// Sum of two estimates' costs and row counts
    fn add(&self, other: &Self, reuse: Option<Self>) -> Self {
        self.set_state(self.cost() + other.cost(), self.row_count() + other.row_count(), reuse)
    }

    /// Scale cost and row count
    fn multiply(&self, multiplicand: f64, reuse: Option<Self>) -> Self {
        self.set_state(self.cost() * multiplicand, self.row_count() * multiplicand, reuse)
    }

    fn divide(&self, divisor: f64, reuse: Option<Self>) -> Self {
        self.set_state(self.cost() / divisor, self.row_count() / divisor, reuse)
    }

    /// Negative when `self` is cheaper, positive when dearer.
    ///
    /// Costs decide unless both are infinite, then row counts, then
    /// single-scan row counts.
    fn compare(&self, other: &Self) -> f64 {
        let (a, b) = (self.fields(), other.fields());
        if a.cost != f64::INFINITY || b.cost != f64::INFINITY {
            return a.cost - b.cost;
        }
        if a.row_count != f64::INFINITY || b.row_count != f64::INFINITY {
            return a.row_count - b.row_count;
        }
        if a.single_scan_row_count != f64::INFINITY || b.single_scan_row_count != f64::INFINITY {
            return a.single_scan_row_count - b.single_scan_row_count;
        }
        0.0
    }

    /// Estimate worse than any real plan, used to seed a search
    fn uninitialized() -> Self {
        let mut estimate = Self::default();
        estimate.set_cost(f64::MAX, f64::MAX, f64::MAX);
        estimate
    }

    fn is_uninitialized(&self) -> bool {
        let f = self.fields();
        f.cost == f64::MAX && f.row_count == f64::MAX && f.single_scan_row_count == f64::MAX
    }
}

/// Level-1 estimate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseCostEstimate {
    fields: CostFields,
}

impl BaseCostEstimate {
    pub fn new(cost: f64, row_count: f64, single_scan_row_count: f64) -> Self {
        BaseCostEstimate { fields: CostFields { cost, row_count, single_scan_row_count } }
    }
}

impl CostEstimate for BaseCostEstimate {
    fn fields(&self) -> &CostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut CostFields {
        &mut self.fields
    }
}

impl fmt::Display for BaseCostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CostEstimate: cost == {}, rowCount == {}", self.fields.cost, self.fields.row_count)
    }
}

/// Level-2 estimate, produced by the join-order search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level2CostEstimate {
    fields: CostFields,
}

impl Level2CostEstimate {
    pub fn new(cost: f64, row_count: f64, single_scan_row_count: f64) -> Self {
        Level2CostEstimate { fields: CostFields { cost, row_count, single_scan_row_count } }
    }
}

impl CostEstimate for Level2CostEstimate {
    fn fields(&self) -> &CostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut CostFields {
        &mut self.fields
    }
}

impl fmt::Display for Level2CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Level2CostEstimate: cost == {}, rowCount == {}, singleScanRowCount == {}, estimatedRowCount == {}",
            self.fields.cost,
            self.fields.row_count,
            self.fields.single_scan_row_count,
            self.estimated_row_count()
        )
    }
}

impl From<BaseCostEstimate> for Level2CostEstimate {
    fn from(base: BaseCostEstimate) -> Self {
        Level2CostEstimate { fields: base.fields }
    }
}
