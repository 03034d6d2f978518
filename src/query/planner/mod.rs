// Query Planner Module
//
// Cost estimates, the statistics interface, and the rewrites and searches run
// during the optimize phase.

pub mod cost;
pub mod optimizer;
pub mod pushdown;
pub mod statistics;

// Export key types
pub use self::cost::{BaseCostEstimate, CostEstimate, CostFields, Level2CostEstimate};
pub use self::optimizer::{JoinOrderOptimizer, JoinPlan};
pub use self::pushdown::push_down_predicates;
pub use self::statistics::{StatisticsProvider, TableStatistics};
