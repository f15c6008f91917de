//! Routing evaluator.
//!
//! Given a compiled composition, the sender of an incoming message and the
//! current service states, decides whether the owner may execute now (AND
//! barriers) and where its output goes afterwards (conditional branches, OR
//! fan-out, terminal statements).

mod barrier;
mod evaluator;
mod state;

pub use barrier::{Arrival, BarrierStore};
pub use evaluator::{Admission, RoutingEvaluator};
pub use state::ServiceStateTable;
