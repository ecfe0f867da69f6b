use tracing::info;

use crate::services::poller::{PollerState, ReportPoller};
use crate::services::report_service::DailyQuery;

use super::args::MonitorArgs;
use super::{render, AppState, CommandError, CommandResult};

/// Polls the daily snapshot and prints every update until Ctrl-C.
pub async fn run(state: &AppState, args: MonitorArgs, as_json: bool) -> CommandResult<()> {
    let settings = state.settings();
    let poller = ReportPoller::new(state.api(), settings.refresh_interval(), args.fecha)?;
    let mut updates = poller.subscribe();
    poller.start();
    info!(
        target: "app::command",
        interval_secs = settings.refresh_interval_secs,
        "monitor iniciado"
    );

    let result = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                break signal.map_err(|err| {
                    CommandError::new("UNKNOWN", format!("no se pudo escuchar Ctrl-C: {err}"), None)
                });
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = updates.borrow_and_update().clone();
                if current.refreshing {
                    continue;
                }
                match describe(state, &current, as_json) {
                    Ok(text) => println!("{text}"),
                    Err(err) => break Err(err),
                }
            }
        }
    };

    poller.stop().await;
    info!(target: "app::command", "monitor detenido");
    result
}

fn describe(state: &AppState, current: &PollerState, as_json: bool) -> CommandResult<String> {
    if as_json {
        return serde_json::to_string(current)
            .map_err(|err| CommandError::from(crate::error::AppError::from(err)));
    }
    let mut text = render::poller_state(current);
    if current.last_error.is_none() {
        if let Some(snapshot) = current.snapshot.clone() {
            let overview = state.reports().overview(snapshot, DailyQuery::default())?;
            text.push('\n');
            text.push_str(&render::daily(&overview));
        }
    }
    Ok(text)
}
