//! Next-day productivity score per collaborator, derived from pending load,
//! carry-over and recent completions.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::prediction::{
    CollaboratorMetrics, CollaboratorPrediction, CompletedTask, DayCounts, PendingTask,
    PredictionScore, PredictionTier, ScoreFactors, ScoreInputs, Trend,
};
use crate::models::revisiones::{
    ActivityTasks, ColaboradorRevisiones, CollaboratorTask, RevisionesReport,
};
use crate::utils::format::{clean_display_name, round_one_decimal};
use crate::utils::time::{calendar_days_between, carry_over_days, parse_calendar_day};

const BASE_SCORE: f64 = 100.0;
const PENALTY_PER_PENDING: f64 = 5.0;
const PENALTY_PER_CARRIED_OVER: f64 = 10.0;
const PENALTY_PER_AVERAGE_DAY: f64 = 3.0;
const BONUS_PER_COMPLETED: u64 = 2;
const MAX_COMPLETION_BONUS: u64 = 20;
/// Pending tasks at least this old count as carried over.
pub const CARRY_OVER_THRESHOLD_DAYS: u32 = 2;
pub const SIN_ACTIVIDAD: &str = "Sin actividad";

/// Scores one collaborator. `history` is ordered oldest first; only its last
/// two entries matter.
pub fn score(inputs: &ScoreInputs, history: &[DayCounts]) -> PredictionScore {
    let average = if inputs.average_carry_over_days.is_finite() {
        inputs.average_carry_over_days.max(0.0)
    } else {
        0.0
    };
    let bonus = inputs
        .completed
        .saturating_mul(BONUS_PER_COMPLETED)
        .min(MAX_COMPLETION_BONUS);
    let trend = trend(history);

    let raw = BASE_SCORE - inputs.pending as f64 * PENALTY_PER_PENDING
        - inputs.carried_over as f64 * PENALTY_PER_CARRIED_OVER
        - average * PENALTY_PER_AVERAGE_DAY
        + bonus as f64
        + f64::from(trend.adjustment());
    let score = raw.round().clamp(0.0, 100.0) as u8;
    let nivel = PredictionTier::from_score(score);

    PredictionScore {
        score,
        nivel,
        color: nivel.color().to_string(),
        emoji: nivel.emoji().to_string(),
        recomendacion: nivel.recomendacion().to_string(),
        tendencia: trend,
        factores: ScoreFactors {
            pendientes: inputs.pending,
            con_arrastre: inputs.carried_over,
            dias_promedio_arrastre: average,
            terminadas_semana: inputs.completed,
            bonificacion: bonus,
            ajuste_tendencia: trend.adjustment(),
        },
    }
}

/// Compares the two most recent days.
pub fn trend(history: &[DayCounts]) -> Trend {
    let [.., previous, latest] = history else {
        return Trend::SinDatos;
    };

    if latest.terminadas >= previous.terminadas && latest.pendientes <= previous.pendientes {
        Trend::Mejorando
    } else if latest.terminadas < previous.terminadas && latest.pendientes > previous.pendientes {
        Trend::Empeorando
    } else {
        Trend::Estable
    }
}

/// Mean carry-over across pending tasks, one decimal; `0` without tasks.
pub fn average_carry_over(tasks: &[PendingTask]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let total: u64 = tasks.iter().map(|task| u64::from(task.dias_arrastre)).sum();
    round_one_decimal(total as f64 / tasks.len() as f64)
}

pub fn pending_tasks(colaborador: &ColaboradorRevisiones, reference: NaiveDate) -> Vec<PendingTask> {
    let from_activities = colaborador.items.actividades.iter().flat_map(|actividad| {
        let titulo = actividad.titulo.clone().unwrap_or_default();
        actividad
            .pendientes
            .iter()
            .map(move |task| pending_task(task, titulo.clone(), reference))
    });
    let unattached = colaborador
        .items
        .sin_actividad
        .pendientes
        .iter()
        .map(|task| pending_task(task, SIN_ACTIVIDAD.to_string(), reference));

    from_activities.chain(unattached).collect()
}

fn pending_task(task: &CollaboratorTask, actividad: String, reference: NaiveDate) -> PendingTask {
    PendingTask {
        id: task.id.clone(),
        nombre: task.nombre.clone(),
        fecha_creacion: task.fecha_creacion.clone(),
        dias_arrastre: carry_over_days(task.fecha_creacion.as_deref(), reference),
        actividad,
    }
}

pub fn completed_tasks(colaborador: &ColaboradorRevisiones) -> Vec<CompletedTask> {
    colaborador
        .items
        .actividades
        .iter()
        .flat_map(|actividad| {
            let titulo = actividad.titulo.clone().unwrap_or_default();
            actividad.terminadas.iter().map(move |task| CompletedTask {
                id: task.id.clone(),
                nombre: task.nombre.clone(),
                fecha_creacion: task.fecha_creacion.clone(),
                fecha_fin_terminada: task.fecha_fin_terminada.clone(),
                dias_para_completar: days_to_complete(task),
                actividad: titulo.clone(),
            })
        })
        .collect()
}

fn days_to_complete(task: &CollaboratorTask) -> u32 {
    let created = task.fecha_creacion.as_deref().and_then(parse_calendar_day);
    let finished = task.fecha_fin_terminada.as_deref().and_then(parse_calendar_day);
    match (created, finished) {
        (Some(created), Some(finished)) => {
            u32::try_from(calendar_days_between(created, finished).max(0)).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

/// Reported totals win; list lengths fill in when the backend omits them.
pub fn collaborator_metrics(
    colaborador: &ColaboradorRevisiones,
    reference: NaiveDate,
) -> CollaboratorMetrics {
    let tareas_pendientes = pending_tasks(colaborador, reference);
    let tareas_terminadas = completed_tasks(colaborador);
    let listed_confirmadas: usize = colaborador
        .items
        .actividades
        .iter()
        .map(|actividad| actividad.confirmadas.len())
        .sum::<usize>()
        + colaborador.items.sin_actividad.confirmadas.len();

    let tareas_con_arrastre = tareas_pendientes
        .iter()
        .filter(|task| task.dias_arrastre >= CARRY_OVER_THRESHOLD_DAYS)
        .count() as u64;

    CollaboratorMetrics {
        total_terminadas: colaborador
            .terminadas
            .unwrap_or(tareas_terminadas.len() as u64),
        total_confirmadas: colaborador
            .confirmadas
            .unwrap_or(listed_confirmadas as u64),
        total_pendientes: colaborador
            .pendientes
            .unwrap_or(tareas_pendientes.len() as u64),
        dias_arrastre_promedio: average_carry_over(&tareas_pendientes),
        tareas_con_arrastre,
        tareas_pendientes,
        tareas_terminadas,
    }
}

/// One day's completed and pending totals for a collaborator.
pub fn day_counts(colaborador: &ColaboradorRevisiones) -> DayCounts {
    let listed = |pick: fn(&ActivityTasks) -> usize| -> u64 {
        let from_activities: usize = colaborador.items.actividades.iter().map(pick).sum();
        (from_activities + pick(&colaborador.items.sin_actividad)) as u64
    };
    DayCounts {
        terminadas: colaborador
            .terminadas
            .unwrap_or_else(|| listed(|tasks| tasks.terminadas.len())),
        pendientes: colaborador
            .pendientes
            .unwrap_or_else(|| listed(|tasks| tasks.pendientes.len())),
    }
}

/// Per-collaborator daily counts, keyed by assignee id. `days` must be in
/// chronological order; a collaborator missing from a day gets no entry for
/// it.
pub fn history_by_collaborator(days: &[RevisionesReport]) -> HashMap<String, Vec<DayCounts>> {
    let mut history: HashMap<String, Vec<DayCounts>> = HashMap::new();
    for day in days {
        for colaborador in &day.data.colaboradores {
            if colaborador.id_asignee.is_empty() {
                continue;
            }
            history
                .entry(colaborador.id_asignee.clone())
                .or_default()
                .push(day_counts(colaborador));
        }
    }
    history
}

/// Scores every named collaborator and sorts by score, highest first. Ties
/// keep the backend order.
pub fn build_report(
    colaboradores: &[ColaboradorRevisiones],
    histories: &HashMap<String, Vec<DayCounts>>,
    reference: NaiveDate,
) -> Vec<CollaboratorPrediction> {
    let mut report: Vec<CollaboratorPrediction> = colaboradores
        .iter()
        .filter_map(|colaborador| {
            let Some(name) = colaborador
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
            else {
                debug!(
                    target: "app::prediction",
                    id = %colaborador.id_asignee,
                    "colaborador sin nombre omitido"
                );
                return None;
            };

            let metricas = collaborator_metrics(colaborador, reference);
            let history = histories
                .get(&colaborador.id_asignee)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let prediccion = score(&metricas.score_inputs(), history);

            Some(CollaboratorPrediction {
                id: colaborador.id_asignee.clone(),
                nombre: clean_display_name(name),
                email: Some(name.to_string()).filter(|value| value.contains('@')),
                metricas,
                prediccion,
            })
        })
        .collect();

    report.sort_by(|a, b| b.prediccion.score.cmp(&a.prediccion.score));
    report
}
