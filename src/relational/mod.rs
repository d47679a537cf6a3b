//! In-memory relational model and the plan-driven router that fills it.
//!
//! [`SchemaPlan`] is compiled once from a mapping. [`Router`] uses it to
//! turn each validated element into a row of a [`RelationalStore`] table.

pub mod coerce;
pub mod plan;
pub mod router;
pub mod store;

pub use coerce::is_truthy;
pub use plan::{ColumnPlan, LabelSet, RoutingKey, SchemaPlan, TableKind, TablePlan};
pub use router::{Routed, Router};
pub use store::{Cell, RelationalStore, RelationalTable, Row};
