//! Aggregate Resolution Module
//!
//! Maps an aggregate name and input type to the identity of the runtime
//! aggregator and the aggregate's result type. Execution of aggregates is not
//! part of the compiler.
//!
//! The registry is open: each aggregate kind is an `AggregateResolver`
//! registered under its name, and new kinds are added with
//! `AggregateRegistry::register` without touching the existing ones.

pub mod count;
pub mod max_min;
pub mod sum_avg;

pub use self::count::CountResolver;
pub use self::max_min::MaxMinResolver;
pub use self::sum_avg::SumAvgResolver;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;

use crate::catalog::TypeDescriptor;
use crate::common::{CompileError, CompileResult, SqlState};

/// Opaque name of the runtime aggregator to instantiate later
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregatorId(String);

impl AggregatorId {
    pub fn new(name: &str) -> Self {
        AggregatorId(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AggregatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving one aggregate invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResolution {
    /// `None` for `COUNT(*)`
    pub input_type: Option<TypeDescriptor>,
    pub aggregator: AggregatorId,
    pub result_type: TypeDescriptor,
}

/// Resolves one aggregate kind.
///
/// Resolution is a pure function of the input type. `None` input stands for
/// an aggregate with no specific operand, i.e. `COUNT(*)`. Returning `None`
/// means the aggregate cannot operate on that type.
pub trait AggregateResolver: Send + Sync {
    fn resolve(&self, input: Option<&TypeDescriptor>) -> Option<AggregateResolution>;
}

static BUILTIN: Lazy<AggregateRegistry> = Lazy::new(|| {
    let mut registry = AggregateRegistry::empty();
    registry.register("COUNT", CountResolver);
    registry.register("MAX", MaxMinResolver::max());
    registry.register("MIN", MaxMinResolver::min());
    registry.register("SUM", SumAvgResolver::sum());
    registry.register("AVG", SumAvgResolver::avg());
    registry
});

/// Name-keyed set of aggregate resolvers
#[derive(Clone, Default)]
pub struct AggregateRegistry {
    resolvers: HashMap<String, Arc<dyn AggregateResolver>>,
}

impl fmt::Debug for AggregateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.resolvers.keys().collect();
        names.sort();
        f.debug_struct("AggregateRegistry").field("aggregates", &names).finish()
    }
}

impl AggregateRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// COUNT, MAX, MIN, SUM and AVG
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Register a resolver, replacing any previous one of the same name
    pub fn register(&mut self, name: &str, resolver: impl AggregateResolver + 'static) {
        let name = name.to_uppercase();
        debug!("Registering aggregate {}", name);
        self.resolvers.insert(name, Arc::new(resolver));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(&name.to_uppercase())
    }

    /// Resolve `name` applied to `input`
    pub fn resolve(
        &self,
        name: &str,
        input: Option<&TypeDescriptor>,
    ) -> CompileResult<AggregateResolution> {
        let key = name.to_uppercase();
        let resolver = self.resolvers.get(&key).ok_or_else(|| {
            CompileError::resolution(
                SqlState::NoSuchFunction,
                format!("No aggregate named '{}' is defined", key),
            )
        })?;

        resolver.resolve(input).ok_or_else(|| {
            let operand = match input {
                Some(ty) => ty.to_string(),
                None => "*".to_string(),
            };
            CompileError::resolution(
                SqlState::AggregateBadType,
                format!("The {} aggregate cannot operate on type {}", key, operand),
            )
        })
    }
}
