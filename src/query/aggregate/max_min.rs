// MAX and MIN
//
// Apply to any orderable type. The result has the input's type but is always
// nullable, since an empty group yields NULL.

use crate::catalog::TypeDescriptor;
use crate::query::aggregate::{AggregateResolution, AggregateResolver, AggregatorId};

#[derive(Debug, Clone, Copy)]
pub struct MaxMinResolver {
    is_max: bool,
}

impl MaxMinResolver {
    pub fn max() -> Self {
        MaxMinResolver { is_max: true }
    }

    pub fn min() -> Self {
        MaxMinResolver { is_max: false }
    }

    pub fn is_max(&self) -> bool {
        self.is_max
    }
}

impl AggregateResolver for MaxMinResolver {
    fn resolve(&self, input: Option<&TypeDescriptor>) -> Option<AggregateResolution> {
        let input = input?;
        if !input.type_id().is_orderable() {
            return None;
        }
        Some(AggregateResolution {
            input_type: Some(input.clone()),
            aggregator: AggregatorId::new("MaxMinAggregator"),
            result_type: input.with_nullable(true),
        })
    }
}
