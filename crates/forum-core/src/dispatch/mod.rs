//! Combinadores de despacho sobre un `Outcome`.
//!
//! El caller registra handlers por categoría de outcome y `run()` invoca
//! exactamente uno, con precedencia fija: match exacto por nombre (policy /
//! model / step) > match por categoría (contract) > fallback genérico. El
//! despacho es una función pura del Outcome y los handlers registrados; no
//! tiene efectos propios más allá de invocar el handler elegido.
//!
//! ```ignore
//! let response = outcome.dispatch()
//!     .on_success(|ctx| render_ok(ctx))
//!     .on_failed_contract(|errors| render_422(errors))
//!     .on_failed_policy("can_suspend", |reason| render_403(reason))
//!     .on_model_not_found("user", || render_404())
//!     .on_failure(|failure| render_500(failure))
//!     .run();
//! ```

use serde_json::Value;

use crate::model::{Context, Failure, FailureKind, Outcome};

enum Named<'o, R> {
    Policy { name: String, handler: Box<dyn FnOnce(&Value) -> R + 'o> },
    Model { name: String, handler: Box<dyn FnOnce() -> R + 'o> },
    Step { name: String, handler: Box<dyn FnOnce() -> R + 'o> },
}

impl<'o, R> Named<'o, R> {
    fn matches(&self, failure: &Failure) -> bool {
        match self {
            Named::Policy { name, .. } => failure.kind == FailureKind::Policy && failure.step_name == *name,
            Named::Model { name, .. } => failure.kind == FailureKind::ModelNotFound && failure.step_name == *name,
            Named::Step { name, .. } => failure.kind == FailureKind::Step && failure.step_name == *name,
        }
    }

    fn call(self, failure: &Failure) -> R {
        match self {
            Named::Policy { handler, .. } => handler(failure.reason()),
            Named::Model { handler, .. } => handler(),
            Named::Step { handler, .. } => handler(),
        }
    }
}

/// Despachador de un `Outcome` hacia exactamente un handler.
///
/// Genérico sobre `R`, el tipo común de retorno de los handlers (una
/// respuesta HTTP, un exit code, `()`); `run()` devuelve `None` si ningún
/// handler registrado aplica.
pub struct Dispatch<'o, R> {
    outcome: &'o Outcome,
    on_success: Option<Box<dyn FnOnce(&Context) -> R + 'o>>,
    named: Vec<Named<'o, R>>,
    on_contract: Option<Box<dyn FnOnce(&Value) -> R + 'o>>,
    fallback: Option<Box<dyn FnOnce(&Failure) -> R + 'o>>,
}

impl<'o, R> Dispatch<'o, R> {
    pub fn new(outcome: &'o Outcome) -> Self {
        Self { outcome,
               on_success: None,
               named: Vec::new(),
               on_contract: None,
               fallback: None }
    }

    /// Handler de éxito; recibe el snapshot final del contexto.
    pub fn on_success(mut self, handler: impl FnOnce(&Context) -> R + 'o) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Handler por categoría para fallos de contract; recibe field → codes.
    pub fn on_failed_contract(mut self, handler: impl FnOnce(&Value) -> R + 'o) -> Self {
        self.on_contract = Some(Box::new(handler));
        self
    }

    /// Match exacto para un model requerido ausente.
    pub fn on_model_not_found(mut self, model: impl Into<String>, handler: impl FnOnce() -> R + 'o) -> Self {
        self.named.push(Named::Model { name: model.into(),
                                       handler: Box::new(handler) });
        self
    }

    /// Match exacto para una policy fallida; recibe el reason estructurado.
    pub fn on_failed_policy(mut self, policy: impl Into<String>, handler: impl FnOnce(&Value) -> R + 'o) -> Self {
        self.named.push(Named::Policy { name: policy.into(),
                                        handler: Box::new(handler) });
        self
    }

    /// Match exacto para un action que señaló fallo controlado.
    pub fn on_failed_step(mut self, step: impl Into<String>, handler: impl FnOnce() -> R + 'o) -> Self {
        self.named.push(Named::Step { name: step.into(),
                                      handler: Box::new(handler) });
        self
    }

    /// Fallback genérico: corre si ningún handler más específico aplicó.
    /// Es donde los callers tratan `exception` (log/alerta, respuesta 500).
    pub fn on_failure(mut self, handler: impl FnOnce(&Failure) -> R + 'o) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Consume el despachador e invoca a lo sumo un handler.
    pub fn run(mut self) -> Option<R> {
        let failure = match self.outcome.failure() {
            None => return self.on_success.map(|handler| handler(self.outcome.context())),
            Some(failure) => failure,
        };

        // precedencia 1: match exacto por nombre (primero registrado gana)
        if let Some(idx) = self.named.iter().position(|n| n.matches(failure)) {
            return Some(self.named.swap_remove(idx).call(failure));
        }

        // precedencia 2: match por categoría
        if failure.kind == FailureKind::Contract {
            if let Some(handler) = self.on_contract {
                return Some(handler(&failure.payload));
            }
        }

        // precedencia 3: fallback genérico
        self.fallback.map(|handler| handler(failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ActionError;
    use crate::runner::{Pipeline, Runner};
    use crate::step::{Contract, Field};
    use crate::model::Delta;
    use serde_json::json;

    fn run(pipeline: &Pipeline, params: Value, guardian: Value) -> Outcome {
        Runner::new().run(pipeline, params, guardian, json!({}))
    }

    #[test]
    fn success_invokes_only_success_handler() {
        let pipeline = Pipeline::builder("ok").build().expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen = outcome.dispatch()
                            .on_success(|_| "success")
                            .on_failure(|_| "failure")
                            .run();
        assert_eq!(chosen, Some("success"));
    }

    // policy fallida con handler exacto y fallback registrados ⇒ corre
    // solo el exacto
    #[test]
    fn exact_policy_match_beats_generic_fallback() {
        let pipeline = Pipeline::builder("suspend")
            .policy("not_already_suspended", |_| false)
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen = outcome.dispatch()
                            .on_failed_policy("not_already_suspended", |_| "policy handler")
                            .on_failure(|_| "generic handler")
                            .run();
        assert_eq!(chosen, Some("policy handler"));
    }

    #[test]
    fn contract_category_beats_fallback() {
        let pipeline = Pipeline::builder("strict")
            .contract(Contract::new().field(Field::string("name").required()))
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen = outcome.dispatch()
                            .on_failed_contract(|errors| format!("contract: {errors}"))
                            .on_failure(|_| "generic".to_string())
                            .run();
        assert_eq!(chosen, Some("contract: {\"name\":[\"required\"]}".to_string()));
    }

    #[test]
    fn mismatched_name_falls_through_to_generic() {
        let pipeline = Pipeline::builder("lookup")
            .model("user", |_| None)
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen = outcome.dispatch()
                            .on_model_not_found("category", || "wrong model")
                            .on_failure(|f| if f.kind == FailureKind::ModelNotFound { "generic" } else { "?" })
                            .run();
        assert_eq!(chosen, Some("generic"));
    }

    #[test]
    fn no_matching_handler_returns_none() {
        let pipeline = Pipeline::builder("lookup")
            .model("user", |_| None)
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen: Option<&str> = outcome.dispatch().on_success(|_| "success").run();
        assert_eq!(chosen, None);
    }

    #[test]
    fn failed_step_matches_by_name() {
        let pipeline = Pipeline::builder("limited")
            .step("rate_limit", |_| Err(ActionError::fail(json!({"retry_after": 60}))))
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen = outcome.dispatch()
                            .on_failed_step("rate_limit", || "limited")
                            .on_failure(|_| "generic")
                            .run();
        assert_eq!(chosen, Some("limited"));
    }

    #[test]
    fn exception_reaches_generic_fallback_only() {
        let pipeline = Pipeline::builder("explosive")
            .step("boom", |_| panic!("bug"))
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let chosen = outcome.dispatch()
                            .on_failed_step("boom", || "step handler")
                            .on_failure(|f| if f.kind == FailureKind::Exception { "alerted" } else { "?" })
                            .run();
        // un panic no es un fallo controlado de step: no matchea on_failed_step
        assert_eq!(chosen, Some("alerted"));
    }

    #[test]
    fn handlers_can_capture_and_mutate_environment() {
        let pipeline = Pipeline::builder("ok")
            .step("produce", |_| {
                let mut delta = Delta::new();
                delta.insert("count".into(), json!(3));
                Ok(delta)
            })
            .build()
            .expect("valid");
        let outcome = run(&pipeline, json!({}), json!({}));

        let mut observed = 0i64;
        outcome.dispatch::<()>()
               .on_success(|ctx| {
                   observed = ctx.get("count").and_then(Value::as_i64).unwrap_or_default();
               })
               .run();
        assert_eq!(observed, 3);
    }
}
