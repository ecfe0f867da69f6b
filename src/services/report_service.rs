use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::activity::{ActivitiesReport, ActivityFilter};
use crate::models::prediction::PredictionReport;
use crate::models::productivity::{DailyReportSnapshot, UserDailyRecord};
use crate::models::report::{DailyOverview, HistoryReport, StateFilter, UserDetailReport};
use crate::models::revisiones::RevisionesReport;
use crate::models::settings::AppSettings;
use crate::services::aggregation_service as aggregation;
use crate::services::api_client::ProductividadApi;
use crate::services::{activity_service, prediction_service, review_service};
use crate::utils::time::{dates_in_range, format_date, week_to_date};

/// Options for the daily user list.
#[derive(Debug, Clone, Default)]
pub struct DailyQuery {
    pub estado: StateFilter,
    pub buscar: Option<String>,
    /// 1-based.
    pub pagina: usize,
    /// Falls back to the configured page size when `None`.
    pub por_pagina: Option<usize>,
}

/// Builds every report view from the API plus the pure aggregation and
/// scoring functions.
#[derive(Clone)]
pub struct ReportService {
    api: Arc<dyn ProductividadApi>,
    top_n: usize,
    page_size: usize,
}

impl ReportService {
    pub fn new(api: Arc<dyn ProductividadApi>, settings: &AppSettings) -> Self {
        Self {
            api,
            top_n: settings.top_n,
            page_size: settings.page_size,
        }
    }

    pub fn api(&self) -> &Arc<dyn ProductividadApi> {
        &self.api
    }

    pub async fn daily(&self, date: Option<NaiveDate>, query: DailyQuery) -> AppResult<DailyOverview> {
        let snapshot = self.api.fetch_daily(date).await?;
        if snapshot.is_empty() {
            info!(target: "app::report", date = %snapshot.date, "sin usuarios para la fecha");
        }
        self.overview(snapshot, query)
    }

    /// Daily view over an already fetched snapshot.
    pub fn overview(&self, snapshot: DailyReportSnapshot, query: DailyQuery) -> AppResult<DailyOverview> {
        let etiquetas = aggregation::count_by_label(&snapshot.users);
        let estados = aggregation::count_by_state(&snapshot.users);
        let tiempo_total = aggregation::total_time(&snapshot.users);
        let top: Vec<UserDailyRecord> =
            aggregation::top_n_by(&snapshot.users, self.top_n, |record| record.tiempo_total as f64)
                .into_iter()
                .cloned()
                .collect();
        let filtered: Vec<UserDailyRecord> =
            aggregation::filter_users(&snapshot.users, query.estado, query.buscar.as_deref())
                .into_iter()
                .cloned()
                .collect();
        let usuarios = aggregation::paginate(
            filtered,
            query.pagina.max(1),
            query.por_pagina.unwrap_or(self.page_size),
        )?;

        Ok(DailyOverview {
            total_usuarios: snapshot.users.len() as u64,
            date: snapshot.date,
            etiquetas,
            estados,
            tiempo_total,
            top,
            usuarios,
        })
    }

    /// One request per day, run concurrently. Failed days are logged and
    /// left out; their dates are returned alongside the snapshots.
    pub async fn fetch_history(
        &self,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> AppResult<(Vec<DailyReportSnapshot>, Vec<String>)> {
        let dates = dates_in_range(desde, hasta)?;
        let requests = dates.iter().map(|date| self.api.fetch_daily(Some(*date)));
        let responses = join_all(requests).await;

        let mut snapshots = Vec::with_capacity(dates.len());
        let mut failed = Vec::new();
        for (date, response) in dates.iter().zip(responses) {
            match response {
                Ok(mut snapshot) => {
                    if snapshot.date.trim().is_empty() {
                        snapshot.date = format_date(*date);
                    }
                    snapshots.push(snapshot);
                }
                Err(err) => {
                    warn!(
                        target: "app::report",
                        date = %format_date(*date),
                        error = %err,
                        "día omitido del histórico"
                    );
                    failed.push(format_date(*date));
                }
            }
        }
        Ok((snapshots, failed))
    }

    pub async fn history(
        &self,
        desde: NaiveDate,
        hasta: NaiveDate,
        usuario: Option<&str>,
    ) -> AppResult<HistoryReport> {
        let (snapshots, dias_fallidos) = self.fetch_history(desde, hasta).await?;
        if snapshots.is_empty() && !dias_fallidos.is_empty() {
            return Err(AppError::other(format!(
                "no se pudo obtener ningún día entre {} y {}",
                format_date(desde),
                format_date(hasta)
            )));
        }

        Ok(HistoryReport {
            desde: format_date(desde),
            hasta: format_date(hasta),
            dias_con_datos: snapshots.iter().filter(|snapshot| !snapshot.is_empty()).count(),
            promedios: aggregation::range_averages(&snapshots, self.top_n),
            tendencia: aggregation::daily_trend(&snapshots),
            usuario: usuario.map(|user_id| aggregation::user_history(&snapshots, user_id)),
            usuarios: aggregation::unique_users(&snapshots),
            dias_fallidos,
        })
    }

    pub async fn user_detail(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> AppResult<UserDetailReport> {
        let detalle = self.api.fetch_user_detail(user_id, date).await?;
        let actividades = review_service::summarize_detail(&detalle);
        let totales = review_service::totals(&actividades);
        Ok(UserDetailReport {
            detalle,
            actividades,
            totales,
        })
    }

    /// Scores every collaborator over `[desde, hasta]` (current week by
    /// default). With `with_trend`, each day is also fetched on its own to
    /// compare the two most recent days.
    pub async fn prediction(
        &self,
        desde: Option<NaiveDate>,
        hasta: Option<NaiveDate>,
        with_trend: bool,
        reference: NaiveDate,
    ) -> AppResult<PredictionReport> {
        let (week_start, week_end) = week_to_date(reference);
        let desde = desde.unwrap_or(week_start);
        let hasta = hasta.unwrap_or(week_end);
        let dates = dates_in_range(desde, hasta)?;

        let report = self.api.fetch_revisiones_range(desde, hasta).await?;

        let (histories, dias_fallidos) = if with_trend {
            let (days, failed) = self.fetch_revisiones_days(&dates).await;
            (prediction_service::history_by_collaborator(&days), failed)
        } else {
            Default::default()
        };

        let colaboradores =
            prediction_service::build_report(&report.data.colaboradores, &histories, reference);
        info!(
            target: "app::report",
            desde = %format_date(desde),
            hasta = %format_date(hasta),
            colaboradores = colaboradores.len(),
            "predicción generada"
        );

        Ok(PredictionReport {
            desde: format_date(desde),
            hasta: format_date(hasta),
            fecha_analisis: format_date(reference),
            total_revisiones: report.data.total_revisiones,
            dias_fallidos,
            colaboradores,
        })
    }

    async fn fetch_revisiones_days(&self, dates: &[NaiveDate]) -> (Vec<RevisionesReport>, Vec<String>) {
        let responses = join_all(dates.iter().map(|date| self.api.fetch_revisiones_day(*date))).await;
        let mut days = Vec::with_capacity(dates.len());
        let mut failed = Vec::new();
        for (date, response) in dates.iter().zip(responses) {
            match response {
                Ok(day) => days.push(day),
                Err(err) => {
                    warn!(
                        target: "app::report",
                        date = %format_date(*date),
                        error = %err,
                        "día omitido de la tendencia"
                    );
                    failed.push(format_date(*date));
                }
            }
        }
        (days, failed)
    }

    pub async fn activities(
        &self,
        filter: ActivityFilter,
        reference: NaiveDate,
    ) -> AppResult<ActivitiesReport> {
        let records = self.api.fetch_actividades().await?;
        Ok(activity_service::build_report(&records, filter, reference))
    }
}
