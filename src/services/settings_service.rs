use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::AppSettings;

pub const ENV_CONFIG: &str = "PRODUCTIVIDAD_CONFIG";
pub const ENV_BACKEND_URL: &str = "PRODUCTIVIDAD_BACKEND_URL";
pub const ENV_REPORTS_URL: &str = "PRODUCTIVIDAD_REPORTS_URL";
pub const ENV_REFRESH_SECS: &str = "PRODUCTIVIDAD_REFRESH_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PRODUCTIVIDAD_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_DIR: &str = "PRODUCTIVIDAD_LOG_DIR";

/// Loads settings from an optional YAML file, then applies environment
/// overrides, then validates. The result is cached until `reload`.
pub struct SettingsService {
    path: Option<PathBuf>,
    env: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
    cache: RwLock<Option<AppSettings>>,
}

impl SettingsService {
    /// Reads overrides from the process environment.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self::with_env(path, |key| std::env::var(key).ok())
    }

    pub fn with_env<F>(path: Option<PathBuf>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            path,
            env: Box::new(env),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self) -> AppResult<AppSettings> {
        if let Ok(guard) = self.cache.read() {
            if let Some(settings) = guard.as_ref() {
                return Ok(settings.clone());
            }
        }
        self.reload()
    }

    pub fn reload(&self) -> AppResult<AppSettings> {
        let mut settings = match self.path.as_deref() {
            Some(path) => load_file(path)?,
            None => AppSettings::default(),
        };
        apply_env_overrides(&mut settings, |key| (self.env)(key))?;
        validate(&settings)?;

        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(settings.clone());
        }
        Ok(settings)
    }
}

pub fn load_file(path: &Path) -> AppResult<AppSettings> {
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::config(format!(
            "no se pudo leer la configuración {}: {err}",
            path.display()
        ))
    })?;
    debug!(target: "app::settings", path = %path.display(), "configuración cargada");
    from_yaml_str(&raw)
}

/// An empty document yields the defaults.
pub fn from_yaml_str(raw: &str) -> AppResult<AppSettings> {
    if raw.trim().is_empty() {
        return Ok(AppSettings::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

pub fn apply_env_overrides<F>(settings: &mut AppSettings, env: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).map(|value| value.trim().to_string());

    if let Some(url) = lookup(ENV_BACKEND_URL) {
        settings.backend_url = url;
    }
    if let Some(url) = lookup(ENV_REPORTS_URL) {
        settings.reports_url = Some(url).filter(|url| !url.is_empty());
    }
    if let Some(secs) = lookup(ENV_REFRESH_SECS) {
        settings.refresh_interval_secs = parse_secs(ENV_REFRESH_SECS, &secs)?;
    }
    if let Some(secs) = lookup(ENV_HTTP_TIMEOUT_SECS) {
        settings.http_timeout_secs = if secs.is_empty() {
            None
        } else {
            Some(parse_secs(ENV_HTTP_TIMEOUT_SECS, &secs)?)
        };
    }
    if let Some(dir) = lookup(ENV_LOG_DIR) {
        settings.log_dir = Some(PathBuf::from(dir)).filter(|dir| !dir.as_os_str().is_empty());
    }
    Ok(())
}

fn parse_secs(key: &str, value: &str) -> AppResult<u64> {
    value
        .parse::<u64>()
        .map_err(|_| AppError::config(format!("{key} debe ser un número de segundos: '{value}'")))
}

pub fn validate(settings: &AppSettings) -> AppResult<()> {
    ensure_http_url("backend_url", &settings.backend_url)?;
    if let Some(reports_url) = settings.reports_url.as_deref() {
        ensure_http_url("reports_url", reports_url)?;
    }
    if settings.refresh_interval_secs == 0 {
        return Err(AppError::validation(
            "refresh_interval_secs debe ser mayor que 0",
        ));
    }
    if settings.page_size == 0 {
        return Err(AppError::validation("page_size debe ser mayor que 0"));
    }
    if settings.top_n == 0 {
        warn!(target: "app::settings", "top_n es 0; los rankings saldrán vacíos");
    }
    if settings.http_timeout_secs == Some(0) {
        return Err(AppError::validation(
            "http_timeout_secs debe ser mayor que 0 o no configurarse",
        ));
    }
    Ok(())
}

fn ensure_http_url(field: &str, value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} no puede estar vacío")));
    }
    let lower = trimmed.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(AppError::validation(format!(
            "{field} debe empezar por http:// o https://: '{trimmed}'"
        )));
    }
    Ok(())
}
