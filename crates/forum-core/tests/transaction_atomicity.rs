//! Atomicidad de grupos transaccionales contra el store en memoria de
//! forum-adapters: el test de integración usa la implementación real de la
//! capacidad transaccional, no un mock.

use serde_json::{json, Value};

use forum_adapters::MemoryStore;
use forum_core::{ActionError, Delta, FailureKind, Pipeline, Runner};

fn log_step(store: MemoryStore, entry: Value) -> impl Fn(&forum_core::Context) -> Result<Delta, ActionError> + Send + Sync + 'static {
    move |_| {
        store.log_staff_action(entry.clone());
        Ok(Delta::new())
    }
}

#[test]
fn partial_failure_rolls_back_every_nested_effect() {
    let store = MemoryStore::new();
    let debit_store = store.clone();

    // transferencia de dos patas: la segunda explota a mitad de camino
    let pipeline = Pipeline::builder("transfer")
        .transaction("atomic", move |t| {
            t.step("debit", log_step(debit_store, json!({"op": "debit"})))
             .step("credit", |_| panic!("credit provider down"))
        })
        .build()
        .expect("valid definition");

    let outcome = Runner::with_transactor(store.clone()).run(&pipeline, json!({}), json!({}), json!({}));

    let failure = outcome.failure().expect("nested panic halts");
    assert_eq!(failure.kind, FailureKind::Exception);
    // la atribución apunta al step anidado, no al wrapper
    assert_eq!(failure.step_name, "credit");

    // el efecto de debit no es observable después del run
    assert!(store.staff_actions().is_empty());
    assert_eq!(store.rollbacks(), 1);
    assert_eq!(store.commits(), 0);
}

#[test]
fn full_success_commits_exactly_once() {
    let store = MemoryStore::new();
    let debit_store = store.clone();
    let credit_store = store.clone();

    let pipeline = Pipeline::builder("transfer")
        .transaction("atomic", move |t| {
            t.step("debit", log_step(debit_store, json!({"op": "debit"})))
             .step("credit", log_step(credit_store, json!({"op": "credit"})))
        })
        .build()
        .expect("valid definition");

    let outcome = Runner::with_transactor(store.clone()).run(&pipeline, json!({}), json!({}), json!({}));

    assert!(outcome.is_success());
    assert_eq!(store.staff_actions().len(), 2);
    assert_eq!(store.commits(), 1);
    assert_eq!(store.rollbacks(), 0);
}

#[test]
fn each_invocation_decides_commit_or_rollback_once() {
    let store = MemoryStore::new();
    let write_store = store.clone();

    let pipeline = Pipeline::builder("repeat")
        .transaction("atomic", move |t| {
            t.step("write", log_step(write_store, json!({"op": "write"})))
        })
        .build()
        .expect("valid definition");

    let runner = Runner::with_transactor(store.clone());
    runner.run(&pipeline, json!({}), json!({}), json!({}));
    runner.run(&pipeline, json!({}), json!({}), json!({}));

    assert_eq!(store.commits(), 2);
    assert_eq!(store.rollbacks(), 0);
}

#[test]
fn policy_inside_transaction_rolls_back_and_keeps_attribution() {
    let store = MemoryStore::new();
    let write_store = store.clone();

    let pipeline = Pipeline::builder("guarded_write")
        .transaction("atomic", move |t| {
            t.step("write", log_step(write_store, json!({"op": "write"})))
             .policy("quota_available", |_| false)
        })
        .build()
        .expect("valid definition");

    let outcome = Runner::with_transactor(store.clone()).run(&pipeline, json!({}), json!({}), json!({}));

    let failure = outcome.failure().expect("quota gate");
    assert_eq!(failure.kind, FailureKind::Policy);
    assert_eq!(failure.step_name, "quota_available");
    assert!(store.staff_actions().is_empty());
    assert_eq!(store.rollbacks(), 1);
}

#[test]
fn nested_deltas_survive_in_outcome_context_even_after_rollback() {
    // el rollback revierte efectos externos; el snapshot del contexto se
    // conserva para inspección del caller
    let store = MemoryStore::new();

    let pipeline = Pipeline::builder("inspect")
        .transaction("atomic", |t| {
            t.step("stage", |_| {
                 let mut delta = Delta::new();
                 delta.insert("staged".into(), json!(true));
                 Ok(delta)
             })
             .step("fail", |_| Err(ActionError::fail(json!({"code": "later_step"}))))
        })
        .build()
        .expect("valid definition");

    let outcome = Runner::with_transactor(store).run(&pipeline, json!({}), json!({}), json!({}));

    assert_eq!(outcome.failure().expect("fail step").kind, FailureKind::Step);
    assert_eq!(outcome.context().get("staged"), Some(&json!(true)));
}
