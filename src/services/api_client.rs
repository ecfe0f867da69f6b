use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiErrorCode, AppError, AppResult};
use crate::models::activity::{ActivitiesPayload, ActivityRecord};
use crate::models::productivity::{DailyReportSnapshot, UserDetail};
use crate::models::revisiones::RevisionesReport;
use crate::models::settings::AppSettings;
use crate::utils::time::format_date;

/// Read-only access to the productividad backend.
#[async_trait]
pub trait ProductividadApi: Send + Sync {
    /// `GET /api/productividad/hoy`; `None` lets the server pick the day.
    async fn fetch_daily(&self, date: Option<NaiveDate>) -> AppResult<DailyReportSnapshot>;

    async fn fetch_user_detail(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> AppResult<UserDetail>;

    async fn fetch_revisiones_day(&self, date: NaiveDate) -> AppResult<RevisionesReport>;

    async fn fetch_revisiones_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<RevisionesReport>;

    async fn fetch_actividades(&self) -> AppResult<Vec<ActivityRecord>>;
}

#[derive(Clone, Copy)]
enum Endpoint {
    Daily,
    UserDetail,
    Revisiones,
    Actividades,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Endpoint::Daily => "productividad.hoy",
            Endpoint::UserDetail => "productividad.usuario",
            Endpoint::Revisiones => "reportes.revisiones",
            Endpoint::Actividades => "actividades",
        }
    }
}

/// reqwest-backed client. Holds its own base URLs so nothing global is
/// consulted at request time.
pub struct HttpApiClient {
    client: reqwest::Client,
    backend_url: Url,
    reports_url: Url,
}

impl HttpApiClient {
    pub fn try_new(settings: &AppSettings) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)));
        if let Some(timeout) = settings.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| AppError::other(format!("no se pudo crear el cliente HTTP: {err}")))?;

        Ok(Self {
            client,
            backend_url: parse_base_url(&settings.backend_url)?,
            reports_url: parse_base_url(settings.reports_base_url())?,
        })
    }

    pub fn backend_url(&self) -> &Url {
        &self.backend_url
    }

    pub fn reports_url(&self) -> &Url {
        &self.reports_url
    }

    fn endpoint_url(base: &Url, segments: &[&str]) -> AppResult<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::config(format!("URL base inválida para rutas: {base}"))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T>(
        &self,
        endpoint: Endpoint,
        url: Url,
        query: &[(&str, String)],
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let correlation_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        debug!(
            target: "app::api",
            correlation_id = %correlation_id,
            endpoint = endpoint.as_str(),
            url = %url,
            query = ?query,
            "GET"
        );

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| Self::error_from_reqwest(err, &correlation_id))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Self::error_from_reqwest(err, &correlation_id))?;
        let latency_ms = started.elapsed().as_millis();

        if !status.is_success() {
            warn!(
                target: "app::api",
                correlation_id = %correlation_id,
                endpoint = endpoint.as_str(),
                status = status.as_u16(),
                latency_ms,
                "respuesta no exitosa"
            );
            return Err(Self::map_http_error(status, &body, &correlation_id));
        }

        debug!(
            target: "app::api",
            correlation_id = %correlation_id,
            endpoint = endpoint.as_str(),
            status = status.as_u16(),
            bytes = body.len(),
            latency_ms,
            "respuesta recibida"
        );

        serde_json::from_str::<T>(&body).map_err(|err| {
            AppError::api_with_details(
                ApiErrorCode::InvalidResponse,
                format!("respuesta JSON inválida de {}: {err}", endpoint.as_str()),
                Some(status.as_u16()),
                Some(&correlation_id),
                Some(json!({ "endpoint": endpoint.as_str() })),
            )
        })
    }

    fn map_http_error(status: StatusCode, body: &str, correlation_id: &str) -> AppError {
        AppError::http_status(status.as_u16(), body, Some(correlation_id))
    }

    fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> AppError {
        if err.is_timeout() {
            AppError::api_with_details(
                ApiErrorCode::HttpTimeout,
                "tiempo de espera agotado",
                None,
                Some(correlation_id),
                None,
            )
        } else if err.is_connect() {
            AppError::api_with_details(
                ApiErrorCode::NetworkFailure,
                format!("no se pudo conectar con el servidor: {err}"),
                None,
                Some(correlation_id),
                None,
            )
        } else if let Some(status) = err.status() {
            Self::map_http_error(status, "", correlation_id)
        } else {
            AppError::api_with_details(
                ApiErrorCode::NetworkFailure,
                format!("error de red: {err}"),
                None,
                Some(correlation_id),
                None,
            )
        }
    }
}

#[async_trait]
impl ProductividadApi for HttpApiClient {
    async fn fetch_daily(&self, date: Option<NaiveDate>) -> AppResult<DailyReportSnapshot> {
        let url = Self::endpoint_url(&self.backend_url, &["api", "productividad", "hoy"])?;
        let query = date_query(date);
        self.get_json(Endpoint::Daily, url, &query).await
    }

    async fn fetch_user_detail(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> AppResult<UserDetail> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::api(
                ApiErrorCode::InvalidRequest,
                "el id de usuario no puede estar vacío",
            ));
        }
        // path_segments_mut percent-encodes the id.
        let url = Self::endpoint_url(
            &self.backend_url,
            &["api", "productividad", "usuario", user_id],
        )?;
        let query = date_query(date);
        self.get_json(Endpoint::UserDetail, url, &query).await
    }

    async fn fetch_revisiones_day(&self, date: NaiveDate) -> AppResult<RevisionesReport> {
        let url = Self::endpoint_url(
            &self.reports_url,
            &["api", "reportes", "revisiones-por-fecha"],
        )?;
        let query = [("date", format_date(date))];
        self.get_json(Endpoint::Revisiones, url, &query).await
    }

    async fn fetch_revisiones_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<RevisionesReport> {
        if end < start {
            return Err(AppError::api(
                ApiErrorCode::InvalidRequest,
                format!(
                    "rango inválido: {} > {}",
                    format_date(start),
                    format_date(end)
                ),
            ));
        }
        let url = Self::endpoint_url(
            &self.reports_url,
            &["api", "reportes", "revisiones-por-fecha"],
        )?;
        let query = [("start", format_date(start)), ("end", format_date(end))];
        self.get_json(Endpoint::Revisiones, url, &query).await
    }

    async fn fetch_actividades(&self) -> AppResult<Vec<ActivityRecord>> {
        let url = Self::endpoint_url(&self.reports_url, &["api", "actividades"])?;
        let payload: ActivitiesPayload = self.get_json(Endpoint::Actividades, url, &[]).await?;
        Ok(payload.into_records())
    }
}

fn date_query(date: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    date.map(|date| vec![("date", format_date(date))])
        .unwrap_or_default()
}

fn parse_base_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| AppError::config(format!("URL inválida '{trimmed}': {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::config(format!(
            "esquema no soportado '{other}' en {trimmed}"
        ))),
    }
}
