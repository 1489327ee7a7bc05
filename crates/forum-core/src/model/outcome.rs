//! Registro inmutable del final de una ejecución.
//!
//! Un `Outcome` es exactamente uno de dos casos: éxito (sin `Failure`) o
//! fallo con `Failure { kind, step_name, payload }`. `step_name` identifica
//! siempre al step real que detuvo el pipeline, incluso cuando el halt
//! ocurrió dentro de un grupo transaccional (la atribución nunca se
//! reescribe hacia el wrapper).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::context::Context;
use crate::dispatch::Dispatch;

/// Taxonomía de fallos. Todas las variantes son datos; ninguna es una
/// excepción del lenguaje que cruce el boundary del Runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// El input del caller no pasó validación/coerción.
    Contract,
    /// Un lookup requerido no encontró nada.
    ModelNotFound,
    /// Una policy evaluó a false.
    Policy,
    /// Un action señaló fallo controlado como parte de su lógica normal.
    Step,
    /// La lógica de un step levantó un error inesperado (capturado).
    Exception,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Contract => "contract",
            FailureKind::ModelNotFound => "model_not_found",
            FailureKind::Policy => "policy",
            FailureKind::Step => "step",
            FailureKind::Exception => "exception",
        };
        f.write_str(s)
    }
}

/// Información estructurada del step que detuvo el pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub step_name: String,
    /// Payload por categoría: field→codes para contract, `{"model": ...}`
    /// para model_not_found, `{"policy": ..., "reason": ...}` para policy,
    /// payload del autor para step, `{"error": ...}` para exception.
    pub payload: Value,
}

impl Failure {
    pub fn contract(step_name: &str, field_errors: Value) -> Self {
        Self { kind: FailureKind::Contract,
               step_name: step_name.to_string(),
               payload: field_errors }
    }

    pub fn model_not_found(step_name: &str, model: &str) -> Self {
        Self { kind: FailureKind::ModelNotFound,
               step_name: step_name.to_string(),
               payload: json!({ "model": model }) }
    }

    pub fn policy(step_name: &str, reason: Value) -> Self {
        Self { kind: FailureKind::Policy,
               step_name: step_name.to_string(),
               payload: json!({ "policy": step_name, "reason": reason }) }
    }

    pub fn step(step_name: &str, payload: Value) -> Self {
        Self { kind: FailureKind::Step,
               step_name: step_name.to_string(),
               payload }
    }

    pub fn exception(step_name: &str, message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Exception,
               step_name: step_name.to_string(),
               payload: json!({ "error": message.into() }) }
    }

    /// Reason estructurado de una policy fallida (Null para otras categorías).
    pub fn reason(&self) -> &Value {
        self.payload.get("reason").unwrap_or(&Value::Null)
    }
}

/// Resultado inmutable de `Runner::run`. Se produce exactamente uno por
/// invocación.
#[derive(Debug)]
pub struct Outcome {
    context: Context,
    failure: Option<Failure>,
    finished_at: DateTime<Utc>,
}

impl Outcome {
    pub(crate) fn ok(context: Context) -> Self {
        Self { context,
               failure: None,
               finished_at: Utc::now() }
    }

    pub(crate) fn halted(context: Context, failure: Failure) -> Self {
        Self { context,
               failure: Some(failure),
               finished_at: Utc::now() }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Snapshot final del contexto, para inspección del caller.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Fallo presente si y solo si `!is_success()`.
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn run_id(&self) -> Uuid {
        self.context.run_id()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.context.started_at()
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Punto de entrada a los combinadores de despacho.
    pub fn dispatch<R>(&self) -> Dispatch<'_, R> {
        Dispatch::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_failure_carries_name_and_reason() {
        let failure = Failure::policy("not_already_suspended", json!({"suspended_till": "2026-01-01"}));
        assert_eq!(failure.kind, FailureKind::Policy);
        assert_eq!(failure.step_name, "not_already_suspended");
        assert_eq!(failure.payload["policy"], json!("not_already_suspended"));
        assert_eq!(failure.reason()["suspended_till"], json!("2026-01-01"));
    }

    #[test]
    fn reason_is_null_outside_policy() {
        let failure = Failure::model_not_found("user", "user");
        assert_eq!(failure.reason(), &Value::Null);
        assert_eq!(failure.payload, json!({"model": "user"}));
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let s = serde_json::to_string(&FailureKind::ModelNotFound).expect("serialize kind");
        assert_eq!(s, "\"model_not_found\"");
        assert_eq!(FailureKind::ModelNotFound.to_string(), "model_not_found");
    }
}
