//! Session Management: stage transitions, run metrics, and wiring errors
//!
//! # Components
//! - `state.rs`: Session state machine, Stage and RunOrder
//! - `metrics.rs`: Run timing, click counting and mistake tallies
//! - `errors.rs`: SessionError for transitions the core refuses

pub mod errors;
pub mod metrics;
pub mod state;

pub use metrics::{ComparisonResults, Metrics};
pub use state::{Session, Stage};
