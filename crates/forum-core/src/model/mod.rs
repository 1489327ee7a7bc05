//! Modelos del core (Context, Outcome, Failure).

pub mod context;
pub mod outcome;

pub use context::{Context, Delta, GUARDIAN_KEY, PARAMS_KEY};
pub use outcome::{Failure, FailureKind, Outcome};
