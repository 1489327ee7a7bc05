//! forum-core: motor declarativo de pipelines de servicio.
//!
//! Cada operación de negocio no trivial (suspender un usuario, cambiar un
//! setting, buscar categorías) se declara como un `Pipeline`: una lista
//! ordenada de steps que el `Runner` ejecuta secuencialmente sobre un
//! `Context` mutable. El primer step que devuelve `Halt` detiene la
//! ejecución y el `Outcome` registra qué step falló y por qué, como datos,
//! nunca como excepción que cruce el runner.
//!
//! Módulos:
//! - `model`: `Context` (estado por invocación) y `Outcome`/`Failure`.
//! - `step`: los cinco tipos de step (Contract, Model, Policy, Action,
//!   Transaction) y el protocolo `StepRun`.
//! - `runner`: `Pipeline`, builder de autoría y `Runner`.
//! - `dispatch`: combinadores para ramificar sobre un `Outcome`.
//! - `tx`: capacidad transaccional abstracta (`Transactor`).

pub mod dispatch;
pub mod errors;
pub mod model;
pub mod runner;
pub mod step;
pub mod tx;

pub use dispatch::Dispatch;
pub use errors::{ActionError, DefinitionError};
pub use model::{Context, Delta, Failure, FailureKind, Outcome, GUARDIAN_KEY, PARAMS_KEY};
pub use runner::{Pipeline, PipelineBuilder, Runner, TransactionBuilder};
pub use step::{Contract, ContractErrors, Field, FieldType, Step, StepBody, StepKind, StepRun};
pub use tx::{NoopTransactor, Transactor, UnitOfWork};
