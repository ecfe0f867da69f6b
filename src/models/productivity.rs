use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::models::activity::Assignee;
use crate::utils::format::first_name;
use crate::utils::lenient;

/// Server-side classification of a collaborator's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductivityLabel {
    Productivo,
    #[default]
    Regular,
    NoProductivo,
}

impl ProductivityLabel {
    pub const ALL: [ProductivityLabel; 3] = [
        ProductivityLabel::Productivo,
        ProductivityLabel::Regular,
        ProductivityLabel::NoProductivo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductivityLabel::Productivo => "productivo",
            ProductivityLabel::Regular => "regular",
            ProductivityLabel::NoProductivo => "no_productivo",
        }
    }

    pub fn pretty(self) -> &'static str {
        match self {
            ProductivityLabel::Productivo => "Productivo",
            ProductivityLabel::Regular => "Regular",
            ProductivityLabel::NoProductivo => "No productivo",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ProductivityLabel::Productivo => "#10b981",
            ProductivityLabel::Regular => "#f59e0b",
            ProductivityLabel::NoProductivo => "#ef4444",
        }
    }

    /// Unknown or missing labels are treated as `regular`.
    pub fn from_label(value: Option<&str>) -> Self {
        match value.map(|label| label.trim().to_lowercase()) {
            Some(label) => match label.as_str() {
                "productivo" => ProductivityLabel::Productivo,
                "no_productivo" | "no productivo" | "no-productivo" => {
                    ProductivityLabel::NoProductivo
                }
                _ => ProductivityLabel::Regular,
            },
            None => ProductivityLabel::Regular,
        }
    }
}

impl fmt::Display for ProductivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductivityLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<JsonValue>::deserialize(deserializer)?;
        let label = value.as_ref().and_then(lenient::value_to_string);
        Ok(ProductivityLabel::from_label(label.as_deref()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probabilities {
    #[serde(deserialize_with = "lenient::probability")]
    pub no_productivo: f64,
    #[serde(deserialize_with = "lenient::probability")]
    pub regular: f64,
    #[serde(deserialize_with = "lenient::probability")]
    pub productivo: f64,
}

impl Probabilities {
    pub fn get(&self, label: ProductivityLabel) -> f64 {
        match label {
            ProductivityLabel::Productivo => self.productivo,
            ProductivityLabel::Regular => self.regular,
            ProductivityLabel::NoProductivo => self.no_productivo,
        }
    }

    /// Not validated by the backend; useful for diagnostics only.
    pub fn sum(&self) -> f64 {
        self.no_productivo + self.regular + self.productivo
    }
}

/// Prediction attached to a user's day.
///
/// `probabilities` is the canonical key. Older backend builds sent
/// `probabilidades`; that key is read only when the canonical one is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediccion {
    #[serde(default)]
    pub label: ProductivityLabel,
    #[serde(
        default,
        deserialize_with = "lenient::lenient_or_default",
        skip_serializing_if = "Option::is_none"
    )]
    probabilities: Option<Probabilities>,
    #[serde(
        default,
        rename = "probabilidades",
        deserialize_with = "lenient::lenient_or_default",
        skip_serializing
    )]
    legacy_probabilities: Option<Probabilities>,
}

impl Prediccion {
    pub fn new(label: ProductivityLabel, probabilities: Probabilities) -> Self {
        Self {
            label,
            probabilities: Some(probabilities),
            legacy_probabilities: None,
        }
    }

    pub fn probabilities(&self) -> Probabilities {
        if let Some(probabilities) = self.probabilities {
            return probabilities;
        }
        if let Some(legacy) = self.legacy_probabilities {
            debug!(target: "app::api", "using legacy 'probabilidades' key");
            return legacy;
        }
        Probabilities::default()
    }

    pub fn uses_legacy_key(&self) -> bool {
        self.probabilities.is_none() && self.legacy_probabilities.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDailyRecord {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub colaborador: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub actividades: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub revisiones: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub revisiones_con_duracion: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub revisiones_sin_duracion: u64,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient::count")]
    pub tiempo_total: u64,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub prediccion: Prediccion,
}

impl UserDailyRecord {
    pub fn label(&self) -> ProductivityLabel {
        self.prediccion.label
    }

    pub fn has_activity(&self) -> bool {
        self.tiempo_total > 0
    }

    /// Full name, or the user id when the backend sent no name.
    pub fn name(&self) -> &str {
        if self.colaborador.trim().is_empty() {
            &self.user_id
        } else {
            &self.colaborador
        }
    }

    pub fn short_name(&self) -> &str {
        first_name(&self.colaborador, &self.user_id)
    }
}

/// Response of `/api/productividad/hoy`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReportSnapshot {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub users: Vec<UserDailyRecord>,
}

impl DailyReportSnapshot {
    /// A valid response without users; shown as an informational state.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub colaborador: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyResumen {
    #[serde(default, deserialize_with = "lenient::count")]
    pub actividades: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub revisiones: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub revisiones_con_duracion: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub revisiones_sin_duracion: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub tiempo_total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub duracion_min: u64,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_creacion: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub assignees: Vec<Assignee>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewBuckets {
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub terminadas: Vec<ReviewItem>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub confirmadas: Vec<ReviewItem>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub pendientes: Vec<ReviewItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewBucket {
    Terminadas,
    Confirmadas,
    Pendientes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub cantidad: u64,
    /// Minutes.
    pub duracion_total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReviewSummary {
    pub id: String,
    pub titulo: String,
    pub terminadas: BucketSummary,
    pub confirmadas: BucketSummary,
    pub pendientes: BucketSummary,
}

impl ActivityReviewSummary {
    pub fn total(&self) -> u64 {
        self.terminadas
            .cantidad
            .saturating_add(self.confirmadas.cantidad)
            .saturating_add(self.pendientes.cantidad)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTotals {
    pub terminadas: BucketSummary,
    pub confirmadas: BucketSummary,
    pub pendientes: BucketSummary,
}

impl ReviewTotals {
    pub fn get(&self, bucket: ReviewBucket) -> BucketSummary {
        match bucket {
            ReviewBucket::Terminadas => self.terminadas,
            ReviewBucket::Confirmadas => self.confirmadas,
            ReviewBucket::Pendientes => self.pendientes,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub titulo: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_start: Option<String>,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub revisiones: ReviewBuckets,
}

impl ActivityDetail {
    pub fn title(&self) -> &str {
        self.titulo
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// Response of `/api/productividad/usuario/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub user: UserSummary,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub resumen: DailyResumen,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub prediccion: Prediccion,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub actividades: Vec<ActivityDetail>,
}
