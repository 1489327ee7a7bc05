//! Builder de autoría de pipelines.
//!
//! Un colaborador declara su operación una sola vez, en orden:
//!
//! ```ignore
//! let pipeline = Pipeline::builder("user.suspend")
//!     .contract(Contract::new().field(Field::string("reason").required()))
//!     .model("user", |ctx| lookup_user(ctx))
//!     .policy("can_suspend", |ctx| ctx.guardian()["admin"] == json!(true))
//!     .transaction("persist", |t| {
//!         t.step("suspend", |ctx| ...)
//!          .step("log_action", |ctx| ...)
//!     })
//!     .build()?;
//! ```
//!
//! Notas de diseño
//! - El orden de declaración es el orden de ejecución; el builder no impone
//!   un orden entre clases de step.
//! - Cero-o-un contract por pipeline; un segundo `contract()` es
//!   `DefinitionError::ContractAlreadyDeclared`.
//! - Los nombres de step deben ser únicos en todo el pipeline, incluyendo
//!   los anidados en transacciones; la colisión se detecta en `build()`,
//!   no en ejecución.
//! - Los steps se registran acá, en tiempo de definición; no existe ningún
//!   mecanismo de inyección tardía.

use std::collections::HashSet;

use serde_json::Value;

use crate::errors::{ActionError, DefinitionError};
use crate::model::{Context, Delta};
use crate::step::{ActionStep, Contract, ModelStep, PolicyStep, Step, StepBody};

/// Nombre fijo del step contract (hay a lo sumo uno por pipeline).
pub(crate) const CONTRACT_STEP_NAME: &str = "contract";

/// Definición inmutable de una operación de negocio.
///
/// Se define una vez y se reutiliza en muchas invocaciones; todo estado de
/// invocación vive en `Context`/`Outcome`.
pub struct Pipeline {
    name: String,
    steps: Vec<Step>,
}

impl Pipeline {
    /// Abre un builder para la operación `name`.
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder { name: name.into(),
                          steps: Vec::new() }
    }

    /// Nombre de la operación (aparece en spans de tracing).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Cantidad de steps de primer nivel.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Nombres de todos los steps, aplanando grupos transaccionales.
    pub fn step_names(&self) -> Vec<&str> {
        fn walk<'a>(steps: &'a [Step], out: &mut Vec<&'a str>) {
            for step in steps {
                out.push(step.name());
                if let StepBody::Transaction(nested) = step.body() {
                    walk(nested, out);
                }
            }
        }
        let mut names = Vec::new();
        walk(&self.steps, &mut names);
        names
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
         .field("name", &self.name)
         .field("steps", &self.step_names())
         .finish()
    }
}

/// Builder principal. Consume `self` en cada paso, como el resto de los
/// builders del workspace.
pub struct PipelineBuilder {
    name: String,
    steps: Vec<Step>,
}

impl PipelineBuilder {
    /// Declara el contract del pipeline (a lo sumo uno; el duplicado se
    /// señala en `build()` para mantener la API fluida).
    pub fn contract(mut self, contract: Contract) -> Self {
        self.steps.push(Step::new(CONTRACT_STEP_NAME, StepBody::Contract(contract)));
        self
    }

    /// Declara un step Model requerido: lookup ausente ⇒ `model_not_found`.
    pub fn model<F>(mut self, name: impl Into<String>, lookup: F) -> Self
        where F: Fn(&Context) -> Option<Value> + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Model(ModelStep { lookup: Box::new(lookup),
                                                                    optional: false })));
        self
    }

    /// Variante opcional: ausencia deja `Null` bajo el nombre y continúa.
    pub fn optional_model<F>(mut self, name: impl Into<String>, lookup: F) -> Self
        where F: Fn(&Context) -> Option<Value> + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Model(ModelStep { lookup: Box::new(lookup),
                                                                    optional: true })));
        self
    }

    /// Declara un gate booleano sin reason adicional.
    pub fn policy<F>(self, name: impl Into<String>, predicate: F) -> Self
        where F: Fn(&Context) -> bool + Send + Sync + 'static
    {
        self.policy_with_reason(name, predicate, Value::Null)
    }

    /// Declara un gate booleano con reason estructurado (datos, no texto
    /// formateado: el formatting es del colaborador).
    pub fn policy_with_reason<F>(mut self, name: impl Into<String>, predicate: F, reason: Value) -> Self
        where F: Fn(&Context) -> bool + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Policy(PolicyStep { predicate: Box::new(predicate),
                                                                      reason })));
        self
    }

    /// Declara un step Action con lógica arbitraria.
    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
        where F: Fn(&Context) -> Result<Delta, ActionError> + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Action(ActionStep { run: Box::new(run) })));
        self
    }

    /// Declara un grupo transaccional con su propia sub-secuencia de steps.
    pub fn transaction(mut self, name: impl Into<String>, build: impl FnOnce(TransactionBuilder) -> TransactionBuilder) -> Self {
        let nested = build(TransactionBuilder { steps: Vec::new() });
        self.steps.push(Step::new(name, StepBody::Transaction(nested.steps)));
        self
    }

    /// Cierra la definición. Verifica las invariantes de definición:
    /// unicidad de nombres (incluyendo anidados) y contract único.
    pub fn build(self) -> Result<Pipeline, DefinitionError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut contracts = 0usize;

        fn walk<'a>(steps: &'a [Step],
                    seen: &mut HashSet<&'a str>,
                    contracts: &mut usize)
                    -> Result<(), DefinitionError> {
            for step in steps {
                if matches!(step.body(), StepBody::Contract(_)) {
                    *contracts += 1;
                    if *contracts > 1 {
                        return Err(DefinitionError::ContractAlreadyDeclared);
                    }
                }
                if !seen.insert(step.name()) {
                    return Err(DefinitionError::DuplicateStepName(step.name().to_string()));
                }
                if let StepBody::Transaction(nested) = step.body() {
                    walk(nested, seen, contracts)?;
                }
            }
            Ok(())
        }

        walk(&self.steps, &mut seen, &mut contracts)?;

        Ok(Pipeline { name: self.name,
                      steps: self.steps })
    }
}

/// Builder de la sub-secuencia de un grupo transaccional. Admite las mismas
/// clases de step que el nivel superior salvo contract.
pub struct TransactionBuilder {
    steps: Vec<Step>,
}

impl TransactionBuilder {
    pub fn model<F>(mut self, name: impl Into<String>, lookup: F) -> Self
        where F: Fn(&Context) -> Option<Value> + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Model(ModelStep { lookup: Box::new(lookup),
                                                                    optional: false })));
        self
    }

    pub fn policy<F>(mut self, name: impl Into<String>, predicate: F) -> Self
        where F: Fn(&Context) -> bool + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Policy(PolicyStep { predicate: Box::new(predicate),
                                                                      reason: Value::Null })));
        self
    }

    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
        where F: Fn(&Context) -> Result<Delta, ActionError> + Send + Sync + 'static
    {
        self.steps.push(Step::new(name, StepBody::Action(ActionStep { run: Box::new(run) })));
        self
    }

    /// Transacción anidada; la semántica de savepoints es del `Transactor`.
    pub fn transaction(mut self, name: impl Into<String>, build: impl FnOnce(TransactionBuilder) -> TransactionBuilder) -> Self {
        let nested = build(TransactionBuilder { steps: Vec::new() });
        self.steps.push(Step::new(name, StepBody::Transaction(nested.steps)));
        self
    }
}
