//! forum-adapters: colaboradores concretos construidos sobre forum-core.
//!
//! Este crate es el lado "caller" del engine: pipelines reales de foro
//! (suspender usuario, actualizar setting, buscar categorías) y un store en
//! memoria que implementa la capacidad transaccional. El core nunca depende
//! de nada de acá (salvo como dev-dependency para sus tests de
//! integración).

pub mod pipelines;
pub mod store;

pub use pipelines::{search_categories_pipeline, suspend_user_pipeline, update_setting_pipeline};
pub use store::MemoryStore;
