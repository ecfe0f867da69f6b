use serde::{Deserialize, Serialize};

use crate::utils::lenient;

/// A pending or completed task as listed by the reviews report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorTask {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub nombre: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_creacion: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_fin_terminada: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityTasks {
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub terminadas: Vec<CollaboratorTask>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub confirmadas: Vec<CollaboratorTask>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub pendientes: Vec<CollaboratorTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorItems {
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub actividades: Vec<ActivityTasks>,
    /// Tasks not attached to any activity.
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub sin_actividad: ActivityTasks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColaboradorRevisiones {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub id_asignee: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub terminadas: Option<u64>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub confirmadas: Option<u64>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub pendientes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub items: CollaboratorItems,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionesData {
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub colaboradores: Vec<ColaboradorRevisiones>,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub range: Option<DateRange>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_revisiones: u64,
}

/// Response of `/api/reportes/revisiones-por-fecha`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionesReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient::lenient_or_default")]
    pub data: RevisionesData,
}
