//! Setting de sitio.
//!
//! El valor es JSON neutro; el contract del pipeline que lo modifica es
//! quien valida tipo y rango según el setting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub name: String,
    pub value: Value,
    /// Un setting oculto no aparece en listados públicos.
    pub hidden: bool,
}

impl SiteSetting {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self { name: name.into(),
               value,
               hidden: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrips_through_json() {
        let setting = SiteSetting::new("enable_badges", json!(true));
        let raw = serde_json::to_value(&setting).expect("serialize setting");
        let back: SiteSetting = serde_json::from_value(raw).expect("deserialize setting");
        assert_eq!(back, setting);
    }
}
