//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`). El engine no lee configuración; esto alimenta al binario
//! demo y a cualquier colaborador que lo use como plantilla.

use once_cell::sync::Lazy;
use std::env;

/// Configuración global (extensible para más secciones).
pub struct AppConfig {
    /// Configuración de logging.
    pub log: LogConfig,
}

/// Parámetros de logging del binario.
pub struct LogConfig {
    /// Filtro estilo env_logger (p.ej. "info,forum_core=debug").
    pub filter: String,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    // .env es opcional; las variables del entorno tienen precedencia
    let _ = dotenvy::dotenv();
    let filter = env::var("FORUMFLOW_LOG").unwrap_or_else(|_| "info".to_string());
    AppConfig { log: LogConfig { filter } }
});
