use thiserror::Error;

/// Errores de dominio (validación de registros).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid username: {0}")] InvalidUsername(String),
    #[error("invalid setting value for {0}")] InvalidSettingValue(String),
}
