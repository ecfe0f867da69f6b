use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::utils::lenient;

/// A person attached to an activity or review. The backend sends either an
/// object `{ id, name }` or a bare string that doubles as id and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Assignee {
    pub id: String,
    pub name: String,
}

impl Assignee {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl<'de> Deserialize<'de> for Assignee {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(match &value {
            JsonValue::Object(map) => {
                let id = map
                    .get("id")
                    .and_then(lenient::value_to_string)
                    .unwrap_or_default();
                let name = map
                    .get("name")
                    .and_then(lenient::value_to_string)
                    .unwrap_or_default();
                let id = if id.is_empty() { name.clone() } else { id };
                let name = if name.is_empty() { id.clone() } else { name };
                Assignee { id, name }
            }
            other => {
                let text = lenient::value_to_string(other).unwrap_or_default();
                Assignee {
                    id: text.clone(),
                    name: text,
                }
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub name: Option<String>,
}

/// Raw record from `/api/actividades`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
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
    pub status: Option<String>,
    /// Kept as the raw JSON value; the completion heuristic inspects its
    /// string form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiempo_real: Option<JsonValue>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_end: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::lenient_or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub project: Option<ProjectRef>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub prioridad: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub assignees: Vec<Option<Assignee>>,
}

impl ActivityRecord {
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().and_then(|project| project.id.as_deref())
    }

    pub fn project_name(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|project| project.name.as_deref())
            .unwrap_or("Sin proyecto")
    }

    /// Assignees with null entries dropped.
    pub fn assignees(&self) -> impl Iterator<Item = &Assignee> {
        self.assignees.iter().flatten()
    }
}

/// `/api/actividades` returns either a bare array or `{ data: [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActivitiesPayload {
    List(Vec<ActivityRecord>),
    Wrapped {
        #[serde(default, deserialize_with = "lenient::vec_or_empty")]
        data: Vec<ActivityRecord>,
    },
}

impl ActivitiesPayload {
    pub fn into_records(self) -> Vec<ActivityRecord> {
        match self {
            ActivitiesPayload::List(records) => records,
            ActivitiesPayload::Wrapped { data } => data,
        }
    }
}

/// Result of the two-signal completion heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionAssessment {
    pub completed: bool,
    pub by_status: bool,
    pub by_actual_time: bool,
    /// Status says otherwise but actual time is filled in.
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Completada,
    Pendiente,
}

impl FromStr for CompletionState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "completada" | "completadas" | "terminada" => Ok(CompletionState::Completada),
            "pendiente" | "pendientes" => Ok(CompletionState::Pendiente),
            other => Err(AppError::validation(format!(
                "estado de actividad desconocido: {other}"
            ))),
        }
    }
}

/// Due-date window, relative to a reference day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuePeriod {
    Hoy,
    Semana,
    Mes,
    #[default]
    Todos,
}

impl DuePeriod {
    /// Days back from the reference day, `None` for no limit.
    pub fn window_days(self) -> Option<i64> {
        match self {
            DuePeriod::Hoy => Some(0),
            DuePeriod::Semana => Some(7),
            DuePeriod::Mes => Some(30),
            DuePeriod::Todos => None,
        }
    }
}

impl FromStr for DuePeriod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "hoy" => Ok(DuePeriod::Hoy),
            "semana" => Ok(DuePeriod::Semana),
            "mes" => Ok(DuePeriod::Mes),
            "todos" | "" => Ok(DuePeriod::Todos),
            other => Err(AppError::validation(format!("periodo desconocido: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub proyecto: Option<String>,
    pub estado: Option<CompletionState>,
    pub prioridad: Option<String>,
    pub periodo: DuePeriod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub total: u64,
    pub completadas: u64,
    pub pendientes: u64,
    pub porcentaje: f64,
}

/// Completion totals for one assignee or one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProductivity {
    pub id: String,
    pub nombre: String,
    pub total: u64,
    pub completadas: u64,
    pub pendientes: u64,
    pub porcentaje: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitiesReport {
    pub filtro: ActivityFilter,
    pub estadisticas: ActivityStats,
    pub por_usuario: Vec<GroupProductivity>,
    pub por_proyecto: Vec<GroupProductivity>,
    pub proyectos: Vec<ProjectRef>,
    pub prioridades: Vec<String>,
    pub ambiguas: u64,
}
