//! Demo ejecutable del workspace: corre las operaciones de foro de
//! forum-adapters contra el store en memoria y muestra cómo un caller
//! traduce cada Outcome con el dispatcher.

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use forumflow_rust::adapters::{search_categories_pipeline, suspend_user_pipeline, MemoryStore};
use forumflow_rust::config::CONFIG;
use forumflow_rust::core::{Outcome, Runner};
use forumflow_rust::domain::{Category, User};

fn render(label: &str, outcome: &Outcome) {
    let line = outcome.dispatch()
                      .on_success(|ctx| format!("ok (run {})", ctx.run_id()))
                      .on_failed_contract(|errors| format!("invalid input: {errors}"))
                      .on_failed_policy("can_suspend", |_| "forbidden: staff only".to_string())
                      .on_model_not_found("user", || "user not found".to_string())
                      .on_failure(|f| format!("{} at step {}: {}", f.kind, f.step_name, f.payload))
                      .run()
                      .unwrap_or_else(|| "unhandled outcome".to_string());
    println!("[{label}] {line}");
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(&CONFIG.log.filter))
                             .init();
    tracing::info!("forumflow demo starting");

    let store = MemoryStore::new();
    store.seed_user(User::new(42, "trouble").expect("valid username"));
    store.seed_category(Category::new(1, "Staff Lounge").restricted());
    store.seed_category(Category::new(2, "Support"));

    let runner = Runner::with_transactor(store.clone());
    let admin: Value = json!({"username": "nadia", "admin": true});

    let suspend = suspend_user_pipeline(store.clone()).expect("valid definition");

    // caso feliz: contract + model + policies + transacción
    let ok = runner.run(&suspend,
                        json!({"user_id": 42, "reason": "spam", "days": 3}),
                        admin.clone(),
                        json!({}));
    render("suspend", &ok);

    // input inválido: halt de contract con códigos por campo
    let invalid = runner.run(&suspend, json!({"days": 3}), admin.clone(), json!({}));
    render("suspend", &invalid);

    // guardian sin permisos: halt de policy con reason estructurado
    let forbidden = runner.run(&suspend,
                               json!({"user_id": 42, "reason": "spam"}),
                               json!({"username": "randa"}),
                               json!({}));
    render("suspend", &forbidden);

    // lookup inexistente: model_not_found
    let missing = runner.run(&suspend,
                             json!({"user_id": 999, "reason": "spam"}),
                             admin.clone(),
                             json!({}));
    render("suspend", &missing);

    // operación de solo lectura filtrada por el guardian
    let search = search_categories_pipeline(store.clone()).expect("valid definition");
    let visible = runner.run(&search, json!({}), json!(null), json!({}));
    println!("[search] anonymous sees: {}",
             visible.context().get("categories").cloned().unwrap_or(Value::Null));

    println!("[store] commits={} rollbacks={} staff_actions={}",
             store.commits(),
             store.rollbacks(),
             store.staff_actions().len());
}
