//! Store en memoria con unidades de trabajo por snapshot.
//!
//! Implementación de referencia de la capacidad transaccional del core:
//! `begin` toma un snapshot del estado, `rollback` lo restaura, `commit`
//! descarta el snapshot. Las transacciones anidadas funcionan porque cada
//! unidad retiene su propio snapshot. Los contadores de commit/rollback
//! existen para que los tests de atomicidad puedan espiar la decisión.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use forum_core::tx::{Transactor, UnitOfWork};
use forum_domain::{Category, SiteSetting, User};

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<u64, User>,
    categories: BTreeMap<u64, Category>,
    settings: HashMap<String, SiteSetting>,
    staff_actions: Vec<Value>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<StoreState>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Store compartible entre steps (clonar clona el handle, no los datos).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.inner.state.lock().expect("store lock poisoned")
    }

    // ------------------------------------------------------------------
    // Seeds y lecturas
    // ------------------------------------------------------------------

    pub fn seed_user(&self, user: User) {
        self.state().users.insert(user.id, user);
    }

    pub fn seed_category(&self, category: Category) {
        self.state().categories.insert(category.id, category);
    }

    pub fn seed_setting(&self, setting: SiteSetting) {
        self.state().settings.insert(setting.name.clone(), setting);
    }

    pub fn user(&self, id: u64) -> Option<User> {
        self.state().users.get(&id).cloned()
    }

    pub fn category(&self, id: u64) -> Option<Category> {
        self.state().categories.get(&id).cloned()
    }

    pub fn setting(&self, name: &str) -> Option<SiteSetting> {
        self.state().settings.get(name).cloned()
    }

    /// Entradas del log de acciones de staff, en orden de inserción.
    pub fn staff_actions(&self) -> Vec<Value> {
        self.state().staff_actions.clone()
    }

    /// Búsqueda por substring sobre nombre/slug; las categorías
    /// restringidas solo aparecen con `include_restricted`.
    pub fn search_categories(&self, term: &str, include_restricted: bool) -> Vec<Category> {
        let needle = term.to_lowercase();
        self.state()
            .categories
            .values()
            .filter(|c| include_restricted || !c.read_restricted)
            .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle) || c.slug.contains(&needle))
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Escrituras (los steps las envuelven en grupos transaccionales)
    // ------------------------------------------------------------------

    pub fn save_user(&self, user: User) {
        self.state().users.insert(user.id, user);
    }

    pub fn save_setting(&self, setting: SiteSetting) {
        self.state().settings.insert(setting.name.clone(), setting);
    }

    pub fn log_staff_action(&self, entry: Value) {
        self.state().staff_actions.push(entry);
    }

    // ------------------------------------------------------------------
    // Espías para tests de atomicidad
    // ------------------------------------------------------------------

    pub fn commits(&self) -> usize {
        self.inner.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.inner.rollbacks.load(Ordering::SeqCst)
    }
}

impl Transactor for MemoryStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        let snapshot = self.state().clone();
        Box::new(MemoryUnit { store: self.clone(),
                              snapshot })
    }
}

struct MemoryUnit {
    store: MemoryStore,
    snapshot: StoreState,
}

impl UnitOfWork for MemoryUnit {
    fn commit(self: Box<Self>) {
        tracing::debug!("memory store unit committed");
        self.store.inner.commits.fetch_add(1, Ordering::SeqCst);
    }

    fn rollback(self: Box<Self>) {
        tracing::debug!("memory store unit rolled back");
        *self.store.state() = self.snapshot;
        self.store.inner.rollbacks.fetch_add(1, Ordering::SeqCst);
    }
}
