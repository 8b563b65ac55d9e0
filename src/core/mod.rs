mod compare;
mod engine;
mod error;
mod plan;
mod types;

pub use compare::merge_projections;
pub use engine::{run_projection, summarize};
pub use error::{ProjectionError, Result};
pub use plan::{CompoundingPlan, RateUnit, future_value_closed_form};
pub use types::{ComparisonRow, ProjectionRequest, ProjectionRow, ProjectionSummary, Slot};
