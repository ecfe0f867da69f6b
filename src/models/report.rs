use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::productivity::{
    ActivityReviewSummary, ProductivityLabel, ReviewTotals, UserDailyRecord, UserDetail,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub productivo: u64,
    pub regular: u64,
    pub no_productivo: u64,
}

impl LabelCounts {
    pub fn add(&mut self, label: ProductivityLabel) {
        match label {
            ProductivityLabel::Productivo => self.productivo += 1,
            ProductivityLabel::Regular => self.regular += 1,
            ProductivityLabel::NoProductivo => self.no_productivo += 1,
        }
    }

    pub fn get(&self, label: ProductivityLabel) -> u64 {
        match label {
            ProductivityLabel::Productivo => self.productivo,
            ProductivityLabel::Regular => self.regular,
            ProductivityLabel::NoProductivo => self.no_productivo,
        }
    }

    pub fn total(&self) -> u64 {
        self.productivo + self.regular + self.no_productivo
    }
}

/// Filter chip selection for the daily user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateFilter {
    #[default]
    Todos,
    Productivo,
    Regular,
    NoProductivo,
    SinActividad,
}

impl StateFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StateFilter::Todos => "todos",
            StateFilter::Productivo => "productivo",
            StateFilter::Regular => "regular",
            StateFilter::NoProductivo => "no_productivo",
            StateFilter::SinActividad => "sin_actividad",
        }
    }

    /// Users without recorded time only match `todos` and `sin_actividad`.
    pub fn matches(self, record: &UserDailyRecord) -> bool {
        match self {
            StateFilter::Todos => true,
            StateFilter::SinActividad => !record.has_activity(),
            StateFilter::Productivo => {
                record.has_activity() && record.label() == ProductivityLabel::Productivo
            }
            StateFilter::Regular => {
                record.has_activity() && record.label() == ProductivityLabel::Regular
            }
            StateFilter::NoProductivo => {
                record.has_activity() && record.label() == ProductivityLabel::NoProductivo
            }
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "todos" | "" => Ok(StateFilter::Todos),
            "productivo" => Ok(StateFilter::Productivo),
            "regular" => Ok(StateFilter::Regular),
            "no_productivo" | "no-productivo" => Ok(StateFilter::NoProductivo),
            "sin_actividad" | "sin-actividad" => Ok(StateFilter::SinActividad),
            other => Err(AppError::validation(format!("estado desconocido: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub todos: u64,
    pub productivo: u64,
    pub regular: u64,
    pub no_productivo: u64,
    pub sin_actividad: u64,
}

impl StateCounts {
    pub fn get(&self, filter: StateFilter) -> u64 {
        match filter {
            StateFilter::Todos => self.todos,
            StateFilter::Productivo => self.productivo,
            StateFilter::Regular => self.regular,
            StateFilter::NoProductivo => self.no_productivo,
            StateFilter::SinActividad => self.sin_actividad,
        }
    }
}

/// One page of a list; `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRangeAverage {
    pub user_id: String,
    /// First word of the collaborator's name.
    pub nombre: String,
    pub colaborador: String,
    pub tiempo_total: u64,
    pub actividades_total: u64,
    pub revisiones_total: u64,
    pub dias: u64,
    pub tiempo_promedio: u64,
    pub actividades_promedio: u64,
    pub revisiones_promedio: u64,
    pub etiquetas: LabelCounts,
    pub porcentaje_productivo: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub date: String,
    pub productivo: u64,
    pub regular: u64,
    pub no_productivo: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserHistoryPoint {
    pub date: String,
    pub tiempo_total: u64,
    pub actividades: u64,
    pub revisiones: u64,
    pub label: ProductivityLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueUser {
    pub user_id: String,
    pub nombre: String,
}

/// Summary line of the daily view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOverview {
    pub date: String,
    pub total_usuarios: u64,
    pub etiquetas: LabelCounts,
    pub estados: StateCounts,
    pub tiempo_total: u64,
    pub top: Vec<UserDailyRecord>,
    pub usuarios: Page<UserDailyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub desde: String,
    pub hasta: String,
    pub dias_con_datos: usize,
    pub dias_fallidos: Vec<String>,
    pub promedios: Vec<UserRangeAverage>,
    pub tendencia: Vec<DailyTrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<Vec<UserHistoryPoint>>,
    pub usuarios: Vec<UniqueUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetailReport {
    pub detalle: UserDetail,
    pub actividades: Vec<ActivityReviewSummary>,
    pub totales: ReviewTotals,
}
