use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "https://backend-xycc.onrender.com";
pub const DEFAULT_REPORTS_URL: &str = "https://wlserver-production.up.railway.app";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Process configuration, built once and handed to the client and poller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL for `/api/productividad/*`.
    pub backend_url: String,
    /// Base URL for `/api/reportes/*` and `/api/actividades`. When unset the
    /// reports host follows `backend_url`, except for the stock backend,
    /// whose reports live on [`DEFAULT_REPORTS_URL`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports_url: Option<String>,
    pub refresh_interval_secs: u64,
    /// No timeout unless configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
    pub top_n: usize,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            reports_url: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            http_timeout_secs: None,
            top_n: DEFAULT_TOP_N,
            page_size: DEFAULT_PAGE_SIZE,
            log_dir: None,
        }
    }
}

impl AppSettings {
    /// Settings pointing every endpoint at one base URL; handy for tests and
    /// single-host deployments.
    pub fn for_backend(base_url: impl Into<String>) -> Self {
        Self {
            backend_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn reports_base_url(&self) -> &str {
        if let Some(url) = self.reports_url.as_deref().filter(|url| !url.trim().is_empty()) {
            return url;
        }
        if self.backend_url.trim().trim_end_matches('/') == DEFAULT_BACKEND_URL {
            DEFAULT_REPORTS_URL
        } else {
            &self.backend_url
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}
