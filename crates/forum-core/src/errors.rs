//! Errores del core.
//!
//! Ojo con la distinción: estos son errores de *definición* o de *autoría*
//! (detectados al construir un pipeline, o devueltos por un action). Los
//! fallos de una ejecución viajan como datos en `model::Failure`, nunca como
//! `Err` de `Runner::run`.

use serde_json::Value;
use thiserror::Error;

/// Error al construir una definición de pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("duplicate step name: {0}")] DuplicateStepName(String),
    #[error("pipeline declares more than one contract")] ContractAlreadyDeclared,
}

/// Error devuelto por la lógica de un step `Action`.
///
/// `Fail` es la rama controlada (categoría `step` en el Outcome): el step
/// señala un fallo de negocio con payload estructurado. `Unexpected` se
/// traduce a categoría `exception`, igual que un panic capturado.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("step signalled failure")] Fail(Value),
    #[error("unexpected error: {0}")] Unexpected(String),
}

impl ActionError {
    /// Atajo para señalar un fallo controlado con payload estructurado.
    pub fn fail(payload: Value) -> Self {
        ActionError::Fail(payload)
    }

    /// Atajo para envolver un error inesperado de la lógica de negocio.
    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        ActionError::Unexpected(err.to_string())
    }
}
