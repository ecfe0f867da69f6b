use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{AppError, AppResult};
use crate::models::settings::AppSettings;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();
static LOGGER_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

const DEFAULT_LOG_DIRECTIVES: &str = "info,app::api=debug,app::poller=debug";
const LOG_FILE_PREFIX: &str = "productividad.log";

/// Installs the global subscriber. Console output goes to stderr so `--json`
/// output on stdout stays machine readable; when `log_dir` is set a daily
/// rolling file is written as well.
pub fn init_logging(settings: &AppSettings) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
                .map_err(|err| AppError::other(format!("no se pudo leer el nivel de log: {err}")))?;

            let console = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(UtcTime::rfc_3339());

            let file = match settings.log_dir.as_ref() {
                Some(log_dir) => {
                    std::fs::create_dir_all(log_dir)?;
                    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
                    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                    LOGGER_GUARD
                        .set(guard)
                        .map_err(|_| AppError::other("el log ya estaba inicializado"))?;

                    Some(
                        fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false)
                            .with_target(true)
                            .with_timer(UtcTime::rfc_3339()),
                    )
                }
                None => None,
            };

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file)
                .with(console)
                .try_init()
                .map_err(|err| AppError::other(format!("no se pudo iniciar el log: {err}")))?;

            Ok(())
        })
        .map(|_| ())
}
