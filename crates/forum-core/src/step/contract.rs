//! Vocabulario declarativo de validación/coerción de input.
//!
//! El engine no fija reglas de negocio, solo el vocabulario: tipo, presencia
//! (required/optional), default, pertenencia a conjunto y cotas numéricas.
//! La coerción es idempotente: re-validar un valor ya coercido produce el
//! mismo valor.
//!
//! Las violaciones se acumulan como field → lista de códigos estables
//! (`required`, `invalid_type`, `inclusion`, `below_min`, `above_max`);
//! formatear mensajes para humanos es responsabilidad del colaborador.

use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::model::Delta;

/// Tipos soportados por el vocabulario de coerción.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType { String, Integer, Float, Boolean }

/// Regla declarativa para un campo del input.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    ty: FieldType,
    required: bool,
    default: Option<Value>,
    one_of: Option<Vec<Value>>,
    min: Option<f64>,
    max: Option<f64>,
}

impl Field {
    fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self { name: name.into(),
               ty,
               required: false,
               default: None,
               one_of: None,
               min: None,
               max: None }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Marca el campo como requerido (ausente o `null` ⇒ código `required`).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default aplicado cuando el campo está ausente. El default pasa por la
    /// misma coerción que un valor provisto.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Restringe el valor coercido a un conjunto cerrado.
    pub fn one_of(mut self, options: impl IntoIterator<Item = Value>) -> Self {
        self.one_of = Some(options.into_iter().collect());
        self
    }

    /// Cota inferior (solo aplica a Integer/Float).
    pub fn min(mut self, bound: f64) -> Self {
        self.min = Some(bound);
        self
    }

    /// Cota superior (solo aplica a Integer/Float).
    pub fn max(mut self, bound: f64) -> Self {
        self.max = Some(bound);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coerción por tipo. Devuelve el código de violación en caso de fallo.
    fn coerce(&self, raw: &Value) -> Result<Value, &'static str> {
        match self.ty {
            FieldType::String => match raw {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err("invalid_type"),
            },
            FieldType::Integer => match raw {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
                Value::Number(n) => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => Ok(Value::Number(Number::from(f as i64))),
                    _ => Err("invalid_type"),
                },
                Value::String(s) => s.trim().parse::<i64>()
                                     .map(|i| Value::Number(Number::from(i)))
                                     .map_err(|_| "invalid_type"),
                _ => Err("invalid_type"),
            },
            FieldType::Float => match raw {
                Value::Number(n) => n.as_f64()
                                     .and_then(Number::from_f64)
                                     .map(Value::Number)
                                     .ok_or("invalid_type"),
                Value::String(s) => s.trim().parse::<f64>()
                                     .ok()
                                     .and_then(Number::from_f64)
                                     .map(Value::Number)
                                     .ok_or("invalid_type"),
                _ => Err("invalid_type"),
            },
            FieldType::Boolean => match raw {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) => match s.trim() {
                    "true" | "t" | "1" => Ok(Value::Bool(true)),
                    "false" | "f" | "0" => Ok(Value::Bool(false)),
                    _ => Err("invalid_type"),
                },
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Ok(Value::Bool(true)),
                    Some(0) => Ok(Value::Bool(false)),
                    _ => Err("invalid_type"),
                },
                _ => Err("invalid_type"),
            },
        }
    }

    /// Chequeos post-coerción (inclusión y cotas). Devuelve códigos.
    fn check(&self, coerced: &Value) -> Vec<&'static str> {
        let mut codes = Vec::new();
        if let Some(options) = &self.one_of {
            if !options.contains(coerced) {
                codes.push("inclusion");
            }
        }
        if let Some(n) = coerced.as_f64() {
            if self.min.is_some_and(|b| n < b) {
                codes.push("below_min");
            }
            if self.max.is_some_and(|b| n > b) {
                codes.push("above_max");
            }
        }
        codes
    }
}

/// Acumulador de violaciones: field → lista de códigos.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractErrors(IndexMap<String, Vec<String>>);

impl ContractErrors {
    fn push(&mut self, field: &str, code: &str) {
        self.0.entry(field.to_string()).or_default().push(code.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &IndexMap<String, Vec<String>> {
        &self.0
    }

    /// Payload JSON para el `Failure` de categoría contract.
    pub fn into_value(self) -> Value {
        let mut map = serde_json::Map::new();
        for (field, codes) in self.0 {
            map.insert(field, Value::Array(codes.into_iter().map(Value::String).collect()));
        }
        Value::Object(map)
    }
}

/// Conjunto ordenado de reglas de campo: el contract de un pipeline.
///
/// Es la fuente canónica de campos requeridos/opcionales y sus tipos. Los
/// campos no declarados en el contract no entran al contexto.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    fields: Vec<Field>,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Valida y coerce `params`. En éxito devuelve el delta con cada campo
    /// coercido bajo su propio nombre; en fallo, las violaciones acumuladas
    /// de todos los campos (no se corta en la primera).
    pub fn validate(&self, params: &Value) -> Result<Delta, ContractErrors> {
        let mut delta = Delta::new();
        let mut errors = ContractErrors::default();

        for field in &self.fields {
            // `null` cuenta como ausente, igual que una clave faltante
            let raw = params.get(field.name()).filter(|v| !v.is_null());
            let candidate = match raw {
                Some(value) => Some(value.clone()),
                None => field.default.clone(),
            };

            match candidate {
                None if field.required => errors.push(field.name(), "required"),
                None => {}
                Some(value) => match field.coerce(&value) {
                    Err(code) => errors.push(field.name(), code),
                    Ok(coerced) => {
                        let codes = field.check(&coerced);
                        if codes.is_empty() {
                            delta.insert(field.name().to_string(), coerced);
                        } else {
                            for code in codes {
                                errors.push(field.name(), code);
                            }
                        }
                    }
                },
            }
        }

        if errors.is_empty() {
            Ok(delta)
        } else {
            Err(errors)
        }
    }
}
