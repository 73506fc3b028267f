//! Shared domain types for the M-Pesa payment ingestion and reconciliation
//! core.
//!
//! Entities are grouped one module per aggregate, mirroring §3 of the
//! specification. IDs are opaque newtypes (`ids`) so aggregates reference
//! each other without back-pointers (§9).

pub mod activity;
pub mod callback_log;
pub mod error;
pub mod ids;
pub mod intent;
pub mod landlord;
pub mod payment_history;
pub mod statement;
pub mod tenant;

pub use activity::*;
pub use callback_log::*;
pub use error::*;
pub use ids::*;
pub use intent::*;
pub use landlord::*;
pub use payment_history::*;
pub use statement::*;
pub use tenant::*;
