//! Definiciones relacionadas a Steps.
//!
//! Un step es la unidad de ejecución de un pipeline. Hay cinco clases y el
//! conjunto es cerrado (enum `StepBody`, despachado por un único `match` en
//! el Runner):
//! - `Contract`: valida y coerce el input crudo.
//! - `Model`: busca un objeto requerido o falla con `model_not_found`.
//! - `Policy`: gate booleano con reason estructurado.
//! - `Action`: lógica de negocio arbitraria; sus panics se capturan.
//! - `Transaction`: sub-secuencia de steps ejecutada atómicamente.
//!
//! Los steps nunca se invocan entre sí: las dependencias fluyen solo a
//! través del `Context`.

pub mod contract;
pub mod definition;
mod run;

pub use contract::{Contract, ContractErrors, Field, FieldType};
pub use definition::{ActionFn, ActionStep, LookupFn, ModelStep, PolicyStep, PredicateFn, Step, StepBody, StepKind};
pub use run::StepRun;
