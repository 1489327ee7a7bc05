//! Estructura de un step y sus cinco cuerpos posibles.

use serde_json::Value;

use super::contract::Contract;
use crate::errors::ActionError;
use crate::model::{Context, Delta};

/// Tipo general del step (para introspección y logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind { Contract, Model, Policy, Action, Transaction }

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepKind::Contract => "contract",
            StepKind::Model => "model",
            StepKind::Policy => "policy",
            StepKind::Action => "action",
            StepKind::Transaction => "transaction",
        };
        f.write_str(s)
    }
}

/// Lookup de un step Model: devuelve el objeto encontrado o `None`.
pub type LookupFn = Box<dyn Fn(&Context) -> Option<Value> + Send + Sync>;
/// Predicado de un step Policy. No muta el contexto.
pub type PredicateFn = Box<dyn Fn(&Context) -> bool + Send + Sync>;
/// Lógica de un step Action: produce un delta o un `ActionError`.
pub type ActionFn = Box<dyn Fn(&Context) -> Result<Delta, ActionError> + Send + Sync>;

/// Cuerpo Model: lookup provisto por el autor del pipeline.
pub struct ModelStep {
    pub(crate) lookup: LookupFn,
    /// Un model opcional ausente no detiene el pipeline; deja `Null` como
    /// centinela bajo su nombre.
    pub(crate) optional: bool,
}

/// Cuerpo Policy: predicado + reason estructurado para el fallo.
pub struct PolicyStep {
    pub(crate) predicate: PredicateFn,
    pub(crate) reason: Value,
}

/// Cuerpo Action: lógica de negocio del autor.
pub struct ActionStep {
    pub(crate) run: ActionFn,
}

/// Conjunto cerrado de cuerpos de step. El Runner es el único que los
/// ejecuta, con un `match` exhaustivo por variante.
pub enum StepBody {
    Contract(Contract),
    Model(ModelStep),
    Policy(PolicyStep),
    Action(ActionStep),
    Transaction(Vec<Step>),
}

/// Un step con nombre único dentro de su pipeline (incluyendo los anidados
/// en grupos transaccionales; la unicidad se verifica al construir la
/// definición).
pub struct Step {
    name: String,
    body: StepBody,
}

impl Step {
    pub(crate) fn new(name: impl Into<String>, body: StepBody) -> Self {
        Self { name: name.into(), body }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &StepBody {
        &self.body
    }

    pub fn kind(&self) -> StepKind {
        match self.body {
            StepBody::Contract(_) => StepKind::Contract,
            StepBody::Model(_) => StepKind::Model,
            StepBody::Policy(_) => StepKind::Policy,
            StepBody::Action(_) => StepKind::Action,
            StepBody::Transaction(_) => StepKind::Transaction,
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
         .field("name", &self.name)
         .field("kind", &self.kind())
         .finish()
    }
}
