//! Actualización de un site setting por un admin.

use serde_json::{json, Value};

use forum_core::{ActionError, Contract, DefinitionError, Delta, Field, Pipeline};
use forum_domain::SiteSetting;

use crate::store::MemoryStore;

pub fn update_setting_pipeline(store: MemoryStore) -> Result<Pipeline, DefinitionError> {
    let lookup_store = store.clone();
    let save_store = store.clone();
    let log_store = store;

    Pipeline::builder("site_setting.update")
        .contract(Contract::new()
            .field(Field::string("name").required())
            .field(Field::string("value").required()))
        .model("setting", move |ctx| {
            let name = ctx.get("name").and_then(Value::as_str)?;
            let setting = lookup_store.setting(name)?;
            serde_json::to_value(setting).ok()
        })
        .policy_with_reason("settings_editable",
                            |ctx| ctx.guardian().get("admin").and_then(Value::as_bool).unwrap_or(false),
                            json!({ "required": "admin" }))
        .transaction("persist", move |t| {
            t.step("save", move |ctx| {
                 let raw = ctx.get("setting").cloned().unwrap_or(Value::Null);
                 let mut setting: SiteSetting = serde_json::from_value(raw).map_err(ActionError::unexpected)?;
                 let previous = setting.value.clone();
                 let value = ctx.get("value").cloned().unwrap_or(Value::Null);

                 setting.value = value;
                 save_store.save_setting(setting.clone());

                 let mut delta = Delta::new();
                 delta.insert("setting".into(), serde_json::to_value(&setting).map_err(ActionError::unexpected)?);
                 delta.insert("previous_value".into(), previous);
                 Ok(delta)
             })
             .step("log_update", move |ctx| {
                 log_store.log_staff_action(json!({
                     "action": "change_site_setting",
                     "subject": ctx.get("name"),
                     "previous_value": ctx.get("previous_value"),
                     "new_value": ctx.get("value"),
                     "acting_user": ctx.guardian().get("username"),
                 }));
                 Ok(Delta::new())
             })
        })
        .build()
}
