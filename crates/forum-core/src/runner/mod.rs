//! Runner module: definición de pipelines, builder de autoría y ejecución.

pub mod builder;
pub mod core;

pub use builder::{Pipeline, PipelineBuilder, TransactionBuilder};
pub use core::Runner;
