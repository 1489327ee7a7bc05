//! Pipelines concretos del foro, declarados una vez y reutilizados por
//! cualquier colaborador (controller HTTP, job, CLI).
//!
//! Cada módulo sigue el mismo patrón: contract primero, lookups, gates y
//! recién entonces los efectos, agrupados en una transacción cuando tocan
//! el store.

pub mod search_categories;
pub mod suspend_user;
pub mod update_setting;

pub use search_categories::search_categories_pipeline;
pub use suspend_user::suspend_user_pipeline;
pub use update_setting::update_setting_pipeline;

use serde_json::Value;

/// Un guardian es staff si es admin o moderador. Los pipelines leen el
/// principal como JSON neutro; la forma la fija el caller.
pub(crate) fn staff(guardian: &Value) -> bool {
    guardian.get("admin").and_then(Value::as_bool).unwrap_or(false)
        || guardian.get("moderator").and_then(Value::as_bool).unwrap_or(false)
}
