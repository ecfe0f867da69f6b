use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::models::activity::{
    ActivitiesReport, ActivityFilter, ActivityRecord, ActivityStats, CompletionAssessment,
    CompletionState, DuePeriod, GroupProductivity, ProjectRef,
};
use crate::utils::format::percentage;
use crate::utils::lenient::value_to_string;
use crate::utils::time::{days_ago, parse_calendar_day};

/// Status the backend uses for finished and billed work.
pub const COMPLETED_STATUS: &str = "TERMINADO REVISADO/COBRADO";
pub const SIN_PROYECTO: &str = "Sin proyecto";

const EMPTY_ACTUAL_TIME: [&str; 4] = ["", "0", "null", "undefined"];

fn has_actual_time(value: Option<&JsonValue>) -> bool {
    let Some(value) = value else {
        return false;
    };
    // `false` means no time was recorded.
    if let JsonValue::Bool(flag) = value {
        return *flag;
    }
    match value_to_string(value) {
        Some(text) => !EMPTY_ACTUAL_TIME.contains(&text.trim()),
        None => false,
    }
}

/// Completed when the status is the billed sentinel or actual time was
/// recorded. A record whose status says something else while carrying
/// actual time is flagged as ambiguous; it still counts as completed.
pub fn assess_completion(record: &ActivityRecord) -> CompletionAssessment {
    let status = record.status.as_deref().map(str::trim);
    let by_status = status == Some(COMPLETED_STATUS);
    let by_actual_time = has_actual_time(record.tiempo_real.as_ref());
    let ambiguous = by_actual_time && matches!(status, Some(value) if !value.is_empty() && value != COMPLETED_STATUS);

    CompletionAssessment {
        completed: by_status || by_actual_time,
        by_status,
        by_actual_time,
        ambiguous,
    }
}

pub fn is_completed(record: &ActivityRecord) -> bool {
    assess_completion(record).completed
}

/// Unparseable due dates only pass the `todos` window.
pub fn in_period(record: &ActivityRecord, period: DuePeriod, reference: NaiveDate) -> bool {
    let Some(window) = period.window_days() else {
        return true;
    };
    let Some(due) = record.due_end.as_deref().and_then(parse_calendar_day) else {
        return false;
    };
    due >= days_ago(reference, window) && due <= reference
}

pub fn matches_filter(record: &ActivityRecord, filter: &ActivityFilter, reference: NaiveDate) -> bool {
    if let Some(project) = filter.proyecto.as_deref() {
        if record.project_id() != Some(project) {
            return false;
        }
    }
    if let Some(state) = filter.estado {
        let completed = is_completed(record);
        match state {
            CompletionState::Completada if !completed => return false,
            CompletionState::Pendiente if completed => return false,
            _ => {}
        }
    }
    if let Some(priority) = filter.prioridad.as_deref() {
        if record.prioridad.as_deref() != Some(priority) {
            return false;
        }
    }
    in_period(record, filter.periodo, reference)
}

pub fn filter_activities<'a>(
    records: &'a [ActivityRecord],
    filter: &ActivityFilter,
    reference: NaiveDate,
) -> Vec<&'a ActivityRecord> {
    records
        .iter()
        .filter(|record| matches_filter(record, filter, reference))
        .collect()
}

pub fn stats<'a, I>(records: I) -> ActivityStats
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut stats = ActivityStats::default();
    for record in records {
        stats.total += 1;
        if is_completed(record) {
            stats.completadas += 1;
        }
    }
    stats.pendientes = stats.total - stats.completadas;
    stats.porcentaje = percentage(stats.completadas, stats.total);
    stats
}

#[derive(Default)]
struct GroupAccumulator {
    nombre: String,
    total: u64,
    completadas: u64,
}

impl GroupAccumulator {
    fn record(&mut self, completed: bool) {
        self.total += 1;
        if completed {
            self.completadas += 1;
        }
    }
}

fn finish_groups(order: Vec<String>, mut groups: HashMap<String, GroupAccumulator>) -> Vec<GroupProductivity> {
    let mut result: Vec<GroupProductivity> = order
        .into_iter()
        .filter_map(|id| {
            let acc = groups.remove(&id)?;
            Some(GroupProductivity {
                pendientes: acc.total - acc.completadas,
                porcentaje: percentage(acc.completadas, acc.total),
                nombre: acc.nombre,
                total: acc.total,
                completadas: acc.completadas,
                id,
            })
        })
        .collect();
    result.sort_by(|a, b| b.completadas.cmp(&a.completadas));
    result
}

/// Completion totals per assignee, most completed first. Activities without
/// assignees contribute nothing.
pub fn by_assignee<'a, I>(records: I) -> Vec<GroupProductivity>
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut order = Vec::new();
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();

    for record in records {
        let completed = is_completed(record);
        for assignee in record.assignees() {
            if assignee.id.is_empty() {
                continue;
            }
            groups
                .entry(assignee.id.clone())
                .or_insert_with(|| {
                    order.push(assignee.id.clone());
                    GroupAccumulator {
                        nombre: assignee.label().to_string(),
                        ..GroupAccumulator::default()
                    }
                })
                .record(completed);
        }
    }

    finish_groups(order, groups)
}

/// Completion totals per project, most completed first. Activities without a
/// project are grouped under "Sin proyecto".
pub fn by_project<'a, I>(records: I) -> Vec<GroupProductivity>
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut order = Vec::new();
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();

    for record in records {
        let id = record.project_id().unwrap_or_default().to_string();
        let completed = is_completed(record);
        groups
            .entry(id.clone())
            .or_insert_with(|| {
                order.push(id);
                GroupAccumulator {
                    nombre: record.project_name().to_string(),
                    ..GroupAccumulator::default()
                }
            })
            .record(completed);
    }

    finish_groups(order, groups)
}

pub fn distinct_projects(records: &[ActivityRecord]) -> Vec<ProjectRef> {
    let mut projects: BTreeMap<&str, ProjectRef> = BTreeMap::new();
    for record in records {
        if let Some(id) = record.project_id().filter(|id| !id.is_empty()) {
            projects.entry(id).or_insert_with(|| ProjectRef {
                id: Some(id.to_string()),
                name: Some(record.project_name().to_string()),
            });
        }
    }
    projects.into_values().collect()
}

pub fn distinct_priorities(records: &[ActivityRecord]) -> Vec<String> {
    let mut priorities: Vec<String> = Vec::new();
    for priority in records.iter().filter_map(|record| record.prioridad.as_deref()) {
        if !priority.is_empty() && !priorities.iter().any(|known| known == priority) {
            priorities.push(priority.to_string());
        }
    }
    priorities
}

/// Dashboard view: stats and groupings over the filtered records, choice
/// lists over all of them.
pub fn build_report(
    records: &[ActivityRecord],
    filter: ActivityFilter,
    reference: NaiveDate,
) -> ActivitiesReport {
    let filtered = filter_activities(records, &filter, reference);
    let ambiguas = filtered
        .iter()
        .filter(|record| assess_completion(record).ambiguous)
        .count() as u64;
    if ambiguas > 0 {
        debug!(
            target: "app::activities",
            ambiguas,
            "actividades con tiempo real pero estado distinto de terminado"
        );
    }

    ActivitiesReport {
        estadisticas: stats(filtered.iter().copied()),
        por_usuario: by_assignee(filtered.iter().copied()),
        por_proyecto: by_project(filtered.iter().copied()),
        proyectos: distinct_projects(records),
        prioridades: distinct_priorities(records),
        ambiguas,
        filtro: filter,
    }
}
