//! Suspensión de un usuario por parte de staff.
//!
//! Orden declarado: contract → model(user) → policies → transacción con la
//! escritura y el log de acción de staff. Si cualquier step anidado falla,
//! el rollback deja al usuario y al log como estaban.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use forum_core::{ActionError, Contract, DefinitionError, Delta, Field, Pipeline};
use forum_domain::User;

use super::staff;
use crate::store::MemoryStore;

pub fn suspend_user_pipeline(store: MemoryStore) -> Result<Pipeline, DefinitionError> {
    let lookup_store = store.clone();
    let suspend_store = store.clone();
    let log_store = store;

    Pipeline::builder("user.suspend")
        .contract(Contract::new()
            .field(Field::integer("user_id").required().min(1.0))
            .field(Field::string("reason").required())
            .field(Field::integer("days").default_value(json!(1)).min(1.0).max(365.0)))
        .model("user", move |ctx| {
            let id = ctx.get("user_id").and_then(Value::as_u64)?;
            let user = lookup_store.user(id)?;
            serde_json::to_value(user).ok()
        })
        .policy_with_reason("can_suspend",
                            |ctx| staff(ctx.guardian()),
                            json!({ "required": "staff" }))
        .policy_with_reason("not_already_suspended",
                            |ctx| {
                                ctx.get("user")
                                   .cloned()
                                   .and_then(|v| serde_json::from_value::<User>(v).ok())
                                   .map(|u| !u.suspended(Utc::now()))
                                   .unwrap_or(false)
                            },
                            json!({ "code": "already_suspended" }))
        .transaction("persist", move |t| {
            t.step("suspend", move |ctx| {
                 let raw = ctx.get("user").cloned().unwrap_or(Value::Null);
                 let mut user: User = serde_json::from_value(raw).map_err(ActionError::unexpected)?;
                 let days = ctx.get("days").and_then(Value::as_i64).unwrap_or(1);
                 let reason = ctx.get("reason").and_then(Value::as_str).unwrap_or_default().to_string();

                 let till = Utc::now() + Duration::days(days);
                 user.suspended_till = Some(till);
                 user.suspend_reason = Some(reason);
                 suspend_store.save_user(user.clone());

                 let mut delta = Delta::new();
                 delta.insert("user".into(), serde_json::to_value(&user).map_err(ActionError::unexpected)?);
                 delta.insert("suspended_till".into(), json!(till));
                 Ok(delta)
             })
             .step("log_action", move |ctx| {
                 log_store.log_staff_action(json!({
                     "action": "suspend_user",
                     "target_user_id": ctx.get("user_id"),
                     "acting_user": ctx.guardian().get("username"),
                     "details": ctx.get("reason"),
                 }));
                 Ok(Delta::new())
             })
        })
        .build()
}
