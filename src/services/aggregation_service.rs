//! Pure aggregations over daily snapshots: label and state counts, search,
//! pagination, rankings and multi-day summaries.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::productivity::{DailyReportSnapshot, ProductivityLabel, UserDailyRecord};
use crate::models::report::{
    DailyTrendPoint, LabelCounts, Page, StateCounts, StateFilter, UniqueUser, UserHistoryPoint,
    UserRangeAverage,
};
use crate::utils::format::{first_name, percentage};

pub fn count_by_label(records: &[UserDailyRecord]) -> LabelCounts {
    let mut counts = LabelCounts::default();
    for record in records {
        counts.add(record.label());
    }
    counts
}

/// Counts for the filter chips. A user without recorded time is counted as
/// `sin_actividad` instead of under its label.
pub fn count_by_state(records: &[UserDailyRecord]) -> StateCounts {
    let mut counts = StateCounts {
        todos: records.len() as u64,
        ..StateCounts::default()
    };
    for record in records {
        if !record.has_activity() {
            counts.sin_actividad += 1;
            continue;
        }
        match record.label() {
            ProductivityLabel::Productivo => counts.productivo += 1,
            ProductivityLabel::Regular => counts.regular += 1,
            ProductivityLabel::NoProductivo => counts.no_productivo += 1,
        }
    }
    counts
}

/// Sum of `tiempo_total`, saturating at `u64::MAX`.
pub fn total_time(records: &[UserDailyRecord]) -> u64 {
    records
        .iter()
        .fold(0, |total, record| total.saturating_add(record.tiempo_total))
}

/// Case-insensitive substring match on the collaborator name. An empty query
/// matches everyone.
pub fn matches_search(record: &UserDailyRecord, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || record.colaborador.to_lowercase().contains(&needle)
}

pub fn filter_users<'a>(
    records: &'a [UserDailyRecord],
    state: StateFilter,
    search: Option<&str>,
) -> Vec<&'a UserDailyRecord> {
    records
        .iter()
        .filter(|record| state.matches(record))
        .filter(|record| search.map_or(true, |query| matches_search(record, query)))
        .collect()
}

/// Slices `items` into a 1-based page. Pages past the end come back empty.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> AppResult<Page<T>> {
    if per_page == 0 {
        return Err(AppError::validation("el tamaño de página debe ser mayor que 0"));
    }
    if page == 0 {
        return Err(AppError::validation("las páginas empiezan en 1"));
    }

    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();

    Ok(Page {
        items,
        page,
        per_page,
        total,
        total_pages,
    })
}

/// First `n` items by descending `key`. Ties keep their input order.
pub fn top_n_by<T, F>(items: &[T], n: usize, key: F) -> Vec<&T>
where
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}

#[derive(Default)]
struct RangeAccumulator {
    colaborador: String,
    tiempo_total: u64,
    actividades: u64,
    revisiones: u64,
    dias: u64,
    etiquetas: LabelCounts,
}

/// Per-user totals and averages across several days, ranked by total time.
pub fn range_averages(snapshots: &[DailyReportSnapshot], top_n: usize) -> Vec<UserRangeAverage> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, RangeAccumulator> = HashMap::new();

    for record in snapshots.iter().flat_map(|snapshot| snapshot.users.iter()) {
        let entry = totals.entry(record.user_id.clone()).or_insert_with(|| {
            order.push(record.user_id.clone());
            RangeAccumulator::default()
        });
        if entry.colaborador.trim().is_empty() {
            entry.colaborador = record.colaborador.clone();
        }
        entry.tiempo_total = entry.tiempo_total.saturating_add(record.tiempo_total);
        entry.actividades = entry.actividades.saturating_add(record.actividades);
        entry.revisiones = entry.revisiones.saturating_add(record.revisiones);
        entry.dias += 1;
        entry.etiquetas.add(record.label());
    }

    let mut averages: Vec<UserRangeAverage> = order
        .into_iter()
        .filter_map(|user_id| {
            let acc = totals.remove(&user_id)?;
            let dias = acc.dias.max(1);
            Some(UserRangeAverage {
                nombre: first_name(&acc.colaborador, &user_id).to_string(),
                colaborador: acc.colaborador,
                tiempo_total: acc.tiempo_total,
                actividades_total: acc.actividades,
                revisiones_total: acc.revisiones,
                dias: acc.dias,
                tiempo_promedio: rounded_average(acc.tiempo_total, dias),
                actividades_promedio: rounded_average(acc.actividades, dias),
                revisiones_promedio: rounded_average(acc.revisiones, dias),
                porcentaje_productivo: percentage(acc.etiquetas.productivo, acc.dias),
                etiquetas: acc.etiquetas,
                user_id,
            })
        })
        .collect();

    averages.sort_by(|a, b| b.tiempo_total.cmp(&a.tiempo_total));
    averages.truncate(top_n);
    averages
}

fn rounded_average(total: u64, days: u64) -> u64 {
    (total as f64 / days as f64).round() as u64
}

/// Label counts per day. Days without users are skipped.
pub fn daily_trend(snapshots: &[DailyReportSnapshot]) -> Vec<DailyTrendPoint> {
    snapshots
        .iter()
        .filter(|snapshot| !snapshot.is_empty())
        .map(|snapshot| {
            let counts = count_by_label(&snapshot.users);
            DailyTrendPoint {
                date: snapshot.date.clone(),
                productivo: counts.productivo,
                regular: counts.regular,
                no_productivo: counts.no_productivo,
                total: snapshot.users.len() as u64,
            }
        })
        .collect()
}

/// One user's days, in snapshot order. Days where the user is absent are
/// left out.
pub fn user_history(snapshots: &[DailyReportSnapshot], user_id: &str) -> Vec<UserHistoryPoint> {
    snapshots
        .iter()
        .filter_map(|snapshot| {
            snapshot
                .users
                .iter()
                .find(|record| record.user_id == user_id)
                .map(|record| UserHistoryPoint {
                    date: snapshot.date.clone(),
                    tiempo_total: record.tiempo_total,
                    actividades: record.actividades,
                    revisiones: record.revisiones,
                    label: record.label(),
                })
        })
        .collect()
}

pub fn unique_users(snapshots: &[DailyReportSnapshot]) -> Vec<UniqueUser> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut users: Vec<UniqueUser> = Vec::new();

    for record in snapshots.iter().flat_map(|snapshot| snapshot.users.iter()) {
        match seen.get(record.user_id.as_str()) {
            Some(&index) => {
                // Later days may carry a name the first one lacked.
                if users[index].nombre == record.user_id && !record.colaborador.trim().is_empty()
                {
                    users[index].nombre = record.colaborador.clone();
                }
            }
            None => {
                seen.insert(record.user_id.as_str(), users.len());
                users.push(UniqueUser {
                    user_id: record.user_id.clone(),
                    nombre: record.name().to_string(),
                });
            }
        }
    }

    users.sort_by(|a, b| a.nombre.to_lowercase().cmp(&b.nombre.to_lowercase()));
    users
}
