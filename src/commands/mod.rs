pub mod args;
pub mod monitor;
pub mod render;
pub mod reports;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::AppSettings;
use crate::services::api_client::{HttpApiClient, ProductividadApi};
use crate::services::report_service::ReportService;

use self::args::Command;

/// Everything a command needs, built once per process.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<AppSettings>,
    api: Arc<dyn ProductividadApi>,
    reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> AppResult<Self> {
        let api: Arc<dyn ProductividadApi> = Arc::new(HttpApiClient::try_new(&settings)?);
        Ok(Self::with_api(settings, api))
    }

    /// Uses a caller-provided client; tests pass fakes through here.
    pub fn with_api(settings: AppSettings, api: Arc<dyn ProductividadApi>) -> Self {
        let reports = Arc::new(ReportService::new(Arc::clone(&api), &settings));
        Self {
            settings: Arc::new(settings),
            api,
            reports,
        }
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        Arc::clone(&self.settings)
    }

    pub fn api(&self) -> Arc<dyn ProductividadApi> {
        Arc::clone(&self.api)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.reports)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.code.as_str() {
            "VALIDATION_ERROR" | "CONFIG_ERROR" | "INVALID_REQUEST" => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message } => CommandError::new("VALIDATION_ERROR", message, None),
            AppError::Config(message) => CommandError::new("CONFIG_ERROR", message, None),
            AppError::Api {
                code,
                message,
                status,
                correlation_id,
                details,
            } => {
                let mut detail_map = serde_json::Map::new();
                if let Some(status) = status {
                    detail_map.insert("status".to_string(), json!(status));
                }
                if let Some(correlation_id) = correlation_id {
                    detail_map.insert("correlationId".to_string(), json!(correlation_id));
                }
                if let Some(JsonValue::Object(extra)) = details {
                    detail_map.extend(extra);
                }
                warn!(target: "app::command", code = %code, %message, "api error in command");
                let detail_value = if detail_map.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(detail_map))
                };
                CommandError::new(code.as_str(), message, detail_value)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", format!("error de serialización: {error}"), None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", format!("error de entrada/salida: {error}"), None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

/// Runs a one-shot command and returns what should be printed.
pub async fn run_command(state: &AppState, command: Command, as_json: bool) -> CommandResult<String> {
    match command {
        Command::Hoy(args) => {
            let overview = reports::hoy(state, args).await?;
            output(&overview, as_json, render::daily)
        }
        Command::Usuario(args) => {
            let detail = reports::usuario(state, args).await?;
            output(&detail, as_json, render::user_detail)
        }
        Command::Historico(args) => {
            let history = reports::historico(state, args).await?;
            output(&history, as_json, render::history)
        }
        Command::Prediccion(args) => {
            let prediction = reports::prediccion(state, args).await?;
            output(&prediction, as_json, render::prediction)
        }
        Command::Actividades(args) => {
            let activities = reports::actividades(state, args).await?;
            output(&activities, as_json, render::activities)
        }
        Command::Monitor(_) => Err(CommandError::new(
            "INVALID_REQUEST",
            "monitor se ejecuta con monitor::run",
            None,
        )),
    }
}

fn output<T, F>(value: &T, as_json: bool, text: F) -> CommandResult<String>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if as_json {
        Ok(serde_json::to_string_pretty(value).map_err(AppError::from)?)
    } else {
        Ok(text(value))
    }
}
