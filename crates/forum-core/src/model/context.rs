//! Contexto de ejecución de un pipeline.
//!
//! Un `Context` es un mapa ordenado nombre → valor JSON que se crea por
//! invocación y acumula los outputs declarados de cada step. Se siembra con
//! `params` (input crudo), `guardian` (el principal de autorización) y las
//! dependencias extra del caller mergeadas al nivel superior. Nunca se
//! reutiliza entre invocaciones; el snapshot final sobrevive dentro del
//! `Outcome`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

/// Clave bajo la que el Runner siembra el input crudo.
pub const PARAMS_KEY: &str = "params";
/// Clave bajo la que el Runner siembra el principal de autorización.
pub const GUARDIAN_KEY: &str = "guardian";

/// Delta de contexto que un step devuelve en `StepRun::Continue`.
///
/// El Runner mergea cada delta en orden de declaración; una clave repetida
/// entre steps sobreescribe la anterior (último write gana).
pub type Delta = IndexMap<String, Value>;

/// Estado mutable de una invocación de pipeline.
#[derive(Debug)]
pub struct Context {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    values: IndexMap<String, Value>,
}

impl Context {
    /// Crea un contexto fresco para una invocación.
    ///
    /// `extras` debe ser un objeto JSON; sus claves se mergean al nivel
    /// superior (mismo shallow-merge que usamos para params inyectados).
    /// Un valor no-objeto se ignora.
    pub(crate) fn new(params: Value, guardian: Value, extras: Value) -> Self {
        let mut values = IndexMap::new();
        values.insert(PARAMS_KEY.to_string(), params);
        values.insert(GUARDIAN_KEY.to_string(), guardian);
        if let Value::Object(map) = extras {
            for (k, v) in map {
                values.insert(k, v);
            }
        }
        Self { run_id: Uuid::new_v4(),
               started_at: Utc::now(),
               values }
    }

    /// Identificador único de esta invocación.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Instante de creación del contexto.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Lee un valor por nombre. `None` significa ausencia real: un contexto
    /// jamás contiene valores de otra invocación.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Escribe un valor. Lecturas posteriores de `name` observan `value`.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Input crudo de la invocación (siempre presente).
    pub fn params(&self) -> &Value {
        self.values.get(PARAMS_KEY).expect("context always seeds params")
    }

    /// Principal de autorización (siempre presente).
    pub fn guardian(&self) -> &Value {
        self.values.get(GUARDIAN_KEY).expect("context always seeds guardian")
    }

    /// Vista de todos los valores en orden de inserción.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Mergea el delta de un step (último write gana por clave).
    pub(crate) fn merge(&mut self, delta: Delta) {
        for (k, v) in delta {
            self.values.insert(k, v);
        }
    }
}
