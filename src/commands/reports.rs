use crate::models::activity::{ActivitiesReport, ActivityFilter};
use crate::models::prediction::PredictionReport;
use crate::models::report::{DailyOverview, HistoryReport, UserDetailReport};
use crate::services::report_service::DailyQuery;
use crate::utils::time::today;

use super::args::{ActividadesArgs, HistoricoArgs, HoyArgs, PrediccionArgs, UsuarioArgs};
use super::{AppState, CommandResult};

pub async fn hoy(state: &AppState, args: HoyArgs) -> CommandResult<DailyOverview> {
    let query = DailyQuery {
        estado: args.estado,
        buscar: args.buscar.filter(|value| !value.trim().is_empty()),
        pagina: args.pagina,
        por_pagina: args.por_pagina,
    };
    Ok(state.reports().daily(args.fecha, query).await?)
}

pub async fn usuario(state: &AppState, args: UsuarioArgs) -> CommandResult<UserDetailReport> {
    Ok(state.reports().user_detail(&args.id, args.fecha).await?)
}

pub async fn historico(state: &AppState, args: HistoricoArgs) -> CommandResult<HistoryReport> {
    Ok(state
        .reports()
        .history(args.desde, args.hasta, args.usuario.as_deref())
        .await?)
}

pub async fn prediccion(state: &AppState, args: PrediccionArgs) -> CommandResult<PredictionReport> {
    Ok(state
        .reports()
        .prediction(args.desde, args.hasta, args.tendencia, today())
        .await?)
}

pub async fn actividades(
    state: &AppState,
    args: ActividadesArgs,
) -> CommandResult<ActivitiesReport> {
    let filter = ActivityFilter {
        proyecto: args.proyecto,
        estado: args.estado,
        prioridad: args.prioridad,
        periodo: args.periodo,
    };
    Ok(state.reports().activities(filter, today()).await?)
}
