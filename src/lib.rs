//! Forumflow Rust Library
//!
//! Este crate actúa como la fachada del workspace:
//! - Re-exporta `forum_core` (el engine de pipelines de servicio),
//!   `forum_domain` (registros) y `forum_adapters` (pipelines concretos).
//! - Expone `config` con la configuración leída del entorno.
//!
//! Puede usarse desde `main.rs` o por otros clientes del workspace.

pub mod config;

pub use forum_adapters as adapters;
pub use forum_core as core;
pub use forum_domain as domain;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::core::{Pipeline, Runner};

    #[test]
    fn facade_reaches_the_engine() {
        let pipeline = Pipeline::builder("smoke").build().expect("empty definition");
        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        assert!(outcome.is_success());
    }

    #[test]
    fn facade_reaches_domain_records() {
        let user = crate::domain::User::new(1, "sam").expect("valid username");
        assert!(!user.staff());
    }
}
