// SUM and AVG
//
// Apply to numeric types only. SMALLINT inputs are widened to INTEGER; the
// result is nullable.

use crate::catalog::{TypeDescriptor, TypeId};
use crate::query::aggregate::{AggregateResolution, AggregateResolver, AggregatorId};

#[derive(Debug, Clone, Copy)]
pub struct SumAvgResolver {
    is_sum: bool,
}

impl SumAvgResolver {
    pub fn sum() -> Self {
        SumAvgResolver { is_sum: true }
    }

    pub fn avg() -> Self {
        SumAvgResolver { is_sum: false }
    }
}

impl AggregateResolver for SumAvgResolver {
    fn resolve(&self, input: Option<&TypeDescriptor>) -> Option<AggregateResolution> {
        let input = input?;
        if !input.type_id().is_numeric() {
            return None;
        }
        let result_type = match input.type_id() {
            TypeId::SmallInt => TypeDescriptor::new(TypeId::Integer, true),
            _ => input.with_nullable(true),
        };
        let aggregator = if self.is_sum { "SumAggregator" } else { "AvgAggregator" };
        Some(AggregateResolution {
            input_type: Some(input.clone()),
            aggregator: AggregatorId::new(aggregator),
            result_type,
        })
    }
}
