//! Búsqueda de categorías filtrada por el guardian.
//!
//! Operación de solo lectura: sin transacción. Las categorías restringidas
//! solo aparecen cuando el principal es staff.

use serde_json::{json, Value};

use forum_core::{ActionError, Contract, DefinitionError, Delta, Field, Pipeline};

use super::staff;
use crate::store::MemoryStore;

pub fn search_categories_pipeline(store: MemoryStore) -> Result<Pipeline, DefinitionError> {
    Pipeline::builder("categories.search")
        .contract(Contract::new()
            .field(Field::string("term").default_value(json!("")))
            .field(Field::integer("limit").default_value(json!(20)).min(1.0).max(100.0)))
        .step("search", move |ctx| {
            let term = ctx.get("term").and_then(Value::as_str).unwrap_or_default().to_string();
            let limit = ctx.get("limit").and_then(Value::as_u64).unwrap_or(20) as usize;

            let mut categories = store.search_categories(&term, staff(ctx.guardian()));
            categories.truncate(limit);

            let mut delta = Delta::new();
            delta.insert("categories".into(), serde_json::to_value(categories).map_err(ActionError::unexpected)?);
            Ok(delta)
        })
        .build()
}
