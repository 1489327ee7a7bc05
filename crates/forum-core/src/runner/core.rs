//! Ejecución de pipelines.
//!
//! El Runner es el único caller de los cuerpos de step. Ejecuta en orden de
//! declaración, estrictamente secuencial (sin paralelismo implícito dentro
//! de una invocación), mergea cada delta de `Continue` y se detiene en el
//! primer `Halt` sin ejecutar nada posterior. Siempre produce exactamente
//! un `Outcome`: cualquier panic de un closure de autor se captura en el
//! boundary del step y se convierte en fallo de categoría `exception`.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error, info_span, warn};

use super::builder::Pipeline;
use crate::errors::ActionError;
use crate::model::{Context, Delta, Failure, Outcome};
use crate::step::{Step, StepBody, StepRun};
use crate::tx::{NoopTransactor, Transactor};

/// Ejecutor de pipelines sobre una capacidad transaccional inyectada.
///
/// Invocaciones distintas no comparten estado mutable: cada `run` crea su
/// propio `Context` y lo posee hasta devolver el `Outcome`.
pub struct Runner<T: Transactor = NoopTransactor> {
    transactor: T,
}

impl Runner<NoopTransactor> {
    /// Runner sin efectos transaccionales reales (default para tests y
    /// pipelines sin grupos transaccionales).
    pub fn new() -> Self {
        Self { transactor: NoopTransactor }
    }
}

impl Default for Runner<NoopTransactor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transactor> Runner<T> {
    /// Runner con la capacidad transaccional del colaborador de storage.
    pub fn with_transactor(transactor: T) -> Self {
        Self { transactor }
    }

    pub fn transactor(&self) -> &T {
        &self.transactor
    }

    /// Ejecuta `pipeline` con el input crudo, el principal y las deps extra
    /// del caller. Un pipeline de cero steps siempre tiene éxito.
    pub fn run(&self, pipeline: &Pipeline, params: Value, guardian: Value, extras: Value) -> Outcome {
        let mut ctx = Context::new(params, guardian, extras);
        let span = info_span!("pipeline_run", pipeline = %pipeline.name(), run_id = %ctx.run_id());
        let _enter = span.enter();

        match self.run_steps(pipeline.steps(), &mut ctx) {
            Ok(()) => {
                debug!(steps = pipeline.len(), "pipeline completed");
                Outcome::ok(ctx)
            }
            Err(failure) => {
                warn!(step = %failure.step_name, kind = %failure.kind, "pipeline halted");
                Outcome::halted(ctx, failure)
            }
        }
    }

    /// Secuencia compartida por el nivel superior y los grupos
    /// transaccionales: mergear en `Continue`, cortar en `Halt`.
    fn run_steps(&self, steps: &[Step], ctx: &mut Context) -> Result<(), Failure> {
        for step in steps {
            debug!(step = step.name(), kind = %step.kind(), "executing step");
            match self.execute(step, ctx) {
                StepRun::Continue(delta) => ctx.merge(delta),
                StepRun::Halt(failure) => return Err(failure),
            }
        }
        Ok(())
    }

    /// Boundary de contención: ningún panic de closure de autor escapa del
    /// engine; se atribuye al step que lo levantó.
    fn execute(&self, step: &Step, ctx: &mut Context) -> StepRun {
        match catch_unwind(AssertUnwindSafe(|| self.execute_body(step, ctx))) {
            Ok(run) => run,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(step = step.name(), %message, "step panicked");
                StepRun::Halt(Failure::exception(step.name(), message))
            }
        }
    }

    /// Despacho cerrado por clase de step: el compilador exige exhaustividad
    /// cuando se agregue una sexta clase.
    fn execute_body(&self, step: &Step, ctx: &mut Context) -> StepRun {
        match step.body() {
            StepBody::Contract(contract) => match contract.validate(ctx.params()) {
                Ok(delta) => StepRun::Continue(delta),
                Err(errors) => StepRun::Halt(Failure::contract(step.name(), errors.into_value())),
            },

            StepBody::Model(model) => match (model.lookup)(ctx) {
                Some(value) => {
                    let mut delta = Delta::new();
                    delta.insert(step.name().to_string(), value);
                    StepRun::Continue(delta)
                }
                None if model.optional => {
                    // centinela explícito: se buscó y no estaba
                    let mut delta = Delta::new();
                    delta.insert(step.name().to_string(), Value::Null);
                    StepRun::Continue(delta)
                }
                None => StepRun::Halt(Failure::model_not_found(step.name(), step.name())),
            },

            StepBody::Policy(policy) => {
                if (policy.predicate)(ctx) {
                    // las policies nunca mutan el contexto
                    StepRun::Continue(Delta::new())
                } else {
                    StepRun::Halt(Failure::policy(step.name(), policy.reason.clone()))
                }
            }

            StepBody::Action(action) => match (action.run)(ctx) {
                Ok(delta) => StepRun::Continue(delta),
                Err(ActionError::Fail(payload)) => StepRun::Halt(Failure::step(step.name(), payload)),
                Err(ActionError::Unexpected(message)) => {
                    error!(step = step.name(), %message, "action raised unexpected error");
                    StepRun::Halt(Failure::exception(step.name(), message))
                }
            },

            StepBody::Transaction(nested) => {
                let unit = self.transactor.begin();
                match self.run_steps(nested, ctx) {
                    Ok(()) => {
                        unit.commit();
                        // los deltas anidados ya fueron mergeados por run_steps
                        StepRun::Continue(Delta::new())
                    }
                    Err(failure) => {
                        unit.rollback();
                        // la atribución apunta al step anidado real, nunca al wrapper
                        StepRun::Halt(failure)
                    }
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FailureKind;
    use crate::runner::Pipeline;
    use crate::step::{Contract, Field};
    use serde_json::json;

    fn delta_of(key: &str, value: Value) -> Delta {
        let mut delta = Delta::new();
        delta.insert(key.to_string(), value);
        delta
    }

    #[test]
    fn contract_halt_reports_field_codes() {
        let pipeline = Pipeline::builder("strict")
            .contract(Contract::new().field(Field::string("name").required()))
            .step("never", |_| Ok(Delta::new()))
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        let failure = outcome.failure().expect("contract should halt");
        assert_eq!(failure.kind, FailureKind::Contract);
        assert_eq!(failure.step_name, "contract");
        assert_eq!(failure.payload, json!({"name": ["required"]}));
    }

    #[test]
    fn missing_model_names_what_was_sought() {
        let pipeline = Pipeline::builder("lookup")
            .model("category", |_| None)
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({"id": 99}), json!({}), json!({}));
        let failure = outcome.failure().expect("lookup fails");
        assert_eq!(failure.kind, FailureKind::ModelNotFound);
        assert_eq!(failure.step_name, "category");
        assert_eq!(failure.payload, json!({"model": "category"}));
    }

    #[test]
    fn optional_model_leaves_null_sentinel() {
        let pipeline = Pipeline::builder("lookup_opt")
            .optional_model("category", |_| None)
            .step("after", |ctx| {
                assert_eq!(ctx.get("category"), Some(&Value::Null));
                Ok(Delta::new())
            })
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        assert!(outcome.is_success());
        assert_eq!(outcome.context().get("category"), Some(&Value::Null));
    }

    #[test]
    fn policy_false_halts_with_reason() {
        let pipeline = Pipeline::builder("gate")
            .policy_with_reason("is_admin", |ctx| ctx.guardian()["admin"] == json!(true),
                                json!({"required_level": "admin"}))
            .step("grant", |_| Ok(Delta::new()))
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({"admin": false}), json!({}));
        let failure = outcome.failure().expect("policy fails");
        assert_eq!(failure.kind, FailureKind::Policy);
        assert_eq!(failure.step_name, "is_admin");
        assert_eq!(failure.reason(), &json!({"required_level": "admin"}));
    }

    #[test]
    fn action_explicit_failure_is_step_category() {
        let pipeline = Pipeline::builder("limited")
            .step("rate_limit", |_| Err(ActionError::fail(json!({"retry_after": 60}))))
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        let failure = outcome.failure().expect("action fails");
        assert_eq!(failure.kind, FailureKind::Step);
        assert_eq!(failure.payload, json!({"retry_after": 60}));
    }

    #[test]
    fn panicking_action_becomes_exception_outcome() {
        let pipeline = Pipeline::builder("explosive")
            .step("boom", |_| panic!("boom: {}", 1 + 1))
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        let failure = outcome.failure().expect("panic is caught");
        assert_eq!(failure.kind, FailureKind::Exception);
        assert_eq!(failure.step_name, "boom");
        assert_eq!(failure.payload["error"], json!("boom: 2"));
    }

    #[test]
    fn panicking_policy_is_also_contained() {
        let pipeline = Pipeline::builder("explosive_gate")
            .policy("broken", |_| panic!("predicate bug"))
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        let failure = outcome.failure().expect("panic is caught");
        assert_eq!(failure.kind, FailureKind::Exception);
        assert_eq!(failure.step_name, "broken");
    }

    #[test]
    fn later_write_to_same_key_wins() {
        let pipeline = Pipeline::builder("overwrite")
            .step("first", |_| Ok(delta_of("categories", json!([1]))))
            .step("second", |_| Ok(delta_of("categories", json!([1, 2]))))
            .build()
            .expect("valid definition");

        let outcome = Runner::new().run(&pipeline, json!({}), json!({}), json!({}));
        assert!(outcome.is_success());
        assert_eq!(outcome.context().get("categories"), Some(&json!([1, 2])));
    }
}
