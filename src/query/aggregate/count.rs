// COUNT
//
// Applies to every input type, including no operand at all.

use crate::catalog::{TypeDescriptor, TypeId};
use crate::query::aggregate::{AggregateResolution, AggregateResolver, AggregatorId};

#[derive(Debug, Clone, Copy, Default)]
pub struct CountResolver;

impl AggregateResolver for CountResolver {
    fn resolve(&self, input: Option<&TypeDescriptor>) -> Option<AggregateResolution> {
        Some(AggregateResolution {
            input_type: input.cloned(),
            aggregator: AggregatorId::new("CountAggregator"),
            result_type: TypeDescriptor::new(TypeId::Integer, false),
        })
    }
}
