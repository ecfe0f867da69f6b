//! Plain-text views for terminal output.

use std::fmt::Write as _;

use crate::models::activity::{ActivitiesReport, GroupProductivity};
use crate::models::prediction::PredictionReport;
use crate::models::productivity::{BucketSummary, ProductivityLabel, UserDailyRecord};
use crate::models::report::{DailyOverview, HistoryReport, StateFilter, UserDetailReport};
use crate::services::poller::PollerState;
use crate::utils::format::{format_minutes, percentage, probability_pct};

fn user_line(out: &mut String, record: &UserDailyRecord) {
    let probabilities = record.prediccion.probabilities();
    let label = record.label();
    let _ = writeln!(
        out,
        "  {:<28} {:>10}  act {:>3}  rev {:>3}  {:<13} {:>5.1}%",
        record.name(),
        format_minutes(record.tiempo_total),
        record.actividades,
        record.revisiones,
        label.pretty(),
        probability_pct(probabilities.get(label)),
    );
}

pub fn daily(overview: &DailyOverview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Productividad del {}", overview.date);

    if overview.total_usuarios == 0 {
        let _ = writeln!(out, "No hay datos de productividad para esta fecha.");
        return out;
    }

    let _ = writeln!(
        out,
        "Usuarios: {}   Tiempo total: {}",
        overview.total_usuarios,
        format_minutes(overview.tiempo_total)
    );
    for label in ProductivityLabel::ALL {
        let count = overview.etiquetas.get(label);
        let _ = writeln!(
            out,
            "  {:<13} {:>4}  ({:.1}%)",
            label.pretty(),
            count,
            percentage(count, overview.total_usuarios)
        );
    }

    let chips: Vec<String> = [
        StateFilter::Todos,
        StateFilter::Productivo,
        StateFilter::Regular,
        StateFilter::NoProductivo,
        StateFilter::SinActividad,
    ]
    .into_iter()
    .map(|filter| format!("{} {}", filter, overview.estados.get(filter)))
    .collect();
    let _ = writeln!(out, "Estados: {}", chips.join(" | "));

    if !overview.top.is_empty() {
        let _ = writeln!(out, "\nTop por tiempo:");
        for (position, record) in overview.top.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:<24} {}",
                position + 1,
                record.short_name(),
                format_minutes(record.tiempo_total)
            );
        }
    }

    let page = &overview.usuarios;
    let _ = writeln!(
        out,
        "\nUsuarios (página {}/{}, {} resultados):",
        page.page,
        page.total_pages.max(1),
        page.total
    );
    if page.items.is_empty() {
        let _ = writeln!(out, "  Sin resultados.");
    }
    for record in &page.items {
        user_line(&mut out, record);
    }
    out
}

fn bucket(summary: BucketSummary) -> String {
    format!("{} ({})", summary.cantidad, format_minutes(summary.duracion_total))
}

pub fn user_detail(report: &UserDetailReport) -> String {
    let mut out = String::new();
    let detail = &report.detalle;
    let name = if detail.user.colaborador.trim().is_empty() {
        detail.user.user_id.as_str()
    } else {
        detail.user.colaborador.as_str()
    };
    let _ = writeln!(out, "{} ({}) {}", name, detail.user.user_id, detail.date);
    if let Some(email) = detail.user.email.as_deref() {
        let _ = writeln!(out, "Email: {email}");
    }

    let label = detail.prediccion.label;
    let probabilities = detail.prediccion.probabilities();
    let _ = writeln!(
        out,
        "Clasificación: {} ({:.1}% productivo, {:.1}% regular, {:.1}% no productivo)",
        label.pretty(),
        probability_pct(probabilities.productivo),
        probability_pct(probabilities.regular),
        probability_pct(probabilities.no_productivo),
    );
    let resumen = &detail.resumen;
    let _ = writeln!(
        out,
        "Tiempo: {}   Actividades: {}   Revisiones: {} ({} con duración, {} sin duración)",
        format_minutes(resumen.tiempo_total),
        resumen.actividades,
        resumen.revisiones,
        resumen.revisiones_con_duracion,
        resumen.revisiones_sin_duracion
    );

    let _ = writeln!(out, "\nActividades:");
    if report.actividades.is_empty() {
        let _ = writeln!(out, "  Sin actividades.");
    }
    for activity in &report.actividades {
        let _ = writeln!(
            out,
            "  {:<32} terminadas {:<14} confirmadas {:<14} pendientes {}",
            activity.titulo,
            bucket(activity.terminadas),
            bucket(activity.confirmadas),
            bucket(activity.pendientes)
        );
    }
    let totals = &report.totales;
    let _ = writeln!(
        out,
        "  {:<32} terminadas {:<14} confirmadas {:<14} pendientes {}",
        "TOTAL",
        bucket(totals.terminadas),
        bucket(totals.confirmadas),
        bucket(totals.pendientes)
    );
    out
}

pub fn history(report: &HistoryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Histórico {} a {} ({} días con datos)",
        report.desde, report.hasta, report.dias_con_datos
    );
    if !report.dias_fallidos.is_empty() {
        let _ = writeln!(out, "Días sin respuesta: {}", report.dias_fallidos.join(", "));
    }

    let _ = writeln!(out, "\nPromedios por usuario:");
    for average in &report.promedios {
        let _ = writeln!(
            out,
            "  {:<16} total {:>9}  prom {:>9}/día  act {:>3}  rev {:>3}  {} días  {:.1}% productivo",
            average.nombre,
            format_minutes(average.tiempo_total),
            format_minutes(average.tiempo_promedio),
            average.actividades_promedio,
            average.revisiones_promedio,
            average.dias,
            average.porcentaje_productivo
        );
    }

    let _ = writeln!(out, "\nTendencia diaria:");
    for point in &report.tendencia {
        let _ = writeln!(
            out,
            "  {}  productivo {:>3}  regular {:>3}  no productivo {:>3}  total {:>3}",
            point.date, point.productivo, point.regular, point.no_productivo, point.total
        );
    }

    if let Some(points) = report.usuario.as_ref() {
        let _ = writeln!(out, "\nHistorial del usuario:");
        if points.is_empty() {
            let _ = writeln!(out, "  Sin registros en el rango.");
        }
        for point in points {
            let _ = writeln!(
                out,
                "  {}  {:>9}  act {:>3}  rev {:>3}  {}",
                point.date,
                format_minutes(point.tiempo_total),
                point.actividades,
                point.revisiones,
                point.label.pretty()
            );
        }
    }
    out
}

pub fn prediction(report: &PredictionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Predicción de productividad ({} a {}, análisis {})",
        report.desde, report.hasta, report.fecha_analisis
    );
    if report.colaboradores.is_empty() {
        let _ = writeln!(out, "No hay colaboradores en el rango.");
        return out;
    }
    for entry in &report.colaboradores {
        let score = &entry.prediccion;
        let _ = writeln!(
            out,
            "{} {:<20} {:>3}  {:<9} {:<10} pend {:>2}  arrastre {:>2} ({:.1} días)  term {:>2}  {}",
            score.emoji,
            entry.nombre,
            score.score,
            score.nivel.as_str(),
            score.tendencia.as_str(),
            score.factores.pendientes,
            score.factores.con_arrastre,
            score.factores.dias_promedio_arrastre,
            score.factores.terminadas_semana,
            score.recomendacion
        );
    }
    out
}

fn group_line(out: &mut String, group: &GroupProductivity) {
    let _ = writeln!(
        out,
        "  {:<28} {:>3}/{:<3} completadas  {:>5.1}%",
        group.nombre, group.completadas, group.total, group.porcentaje
    );
}

pub fn activities(report: &ActivitiesReport) -> String {
    let mut out = String::new();
    let stats = &report.estadisticas;
    let _ = writeln!(
        out,
        "Actividades: {}   Completadas: {} ({:.1}%)   Pendientes: {}",
        stats.total, stats.completadas, stats.porcentaje, stats.pendientes
    );
    if report.ambiguas > 0 {
        let _ = writeln!(
            out,
            "Aviso: {} actividades tienen tiempo real pero otro estado; se cuentan como completadas.",
            report.ambiguas
        );
    }

    let _ = writeln!(out, "\nPor usuario:");
    if report.por_usuario.is_empty() {
        let _ = writeln!(out, "  Sin usuarios asignados.");
    }
    for group in &report.por_usuario {
        group_line(&mut out, group);
    }

    let _ = writeln!(out, "\nPor proyecto:");
    if report.por_proyecto.is_empty() {
        let _ = writeln!(out, "  No hay proyectos con el filtro seleccionado.");
    }
    for group in &report.por_proyecto {
        group_line(&mut out, group);
    }
    out
}

/// One status line per poller update.
pub fn poller_state(state: &PollerState) -> String {
    let updated = state
        .last_updated
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    if let Some(error) = state.last_error.as_deref() {
        return format!("[{updated}] error: {error}");
    }
    match state.snapshot.as_ref() {
        Some(snapshot) if snapshot.is_empty() => {
            format!("[{updated}] {}: sin datos", snapshot.date)
        }
        Some(snapshot) => {
            let counts = crate::services::aggregation_service::count_by_label(&snapshot.users);
            format!(
                "[{updated}] {}: {} usuarios, {} productivo, {} regular, {} no productivo",
                snapshot.date,
                snapshot.users.len(),
                counts.productivo,
                counts.regular,
                counts.no_productivo
            )
        }
        None if state.refreshing => format!("[{updated}] actualizando..."),
        None => format!("[{updated}] esperando datos"),
    }
}
