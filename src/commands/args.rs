use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::activity::{CompletionState, DuePeriod};
use crate::models::report::StateFilter;
use crate::services::settings_service::ENV_CONFIG;
use crate::utils::time::parse_date;

#[derive(Parser, Debug, Clone)]
#[command(name = "productividad")]
#[command(author, version, about = "Reportes diarios, rankings y predicción de productividad")]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Daily snapshot: label counts, ranking and the filtered user list
    Hoy(HoyArgs),
    /// One collaborator's day with review buckets per activity
    Usuario(UsuarioArgs),
    /// Range averages, per-day trend and optional single-user history
    Historico(HistoricoArgs),
    /// Next-day productivity score per collaborator
    Prediccion(PrediccionArgs),
    /// Activity completion dashboard
    Actividades(ActividadesArgs),
    /// Poll the daily snapshot until Ctrl-C
    Monitor(MonitorArgs),
}

#[derive(Args, Debug, Clone)]
pub struct HoyArgs {
    #[arg(long, value_parser = parse_date_arg)]
    pub fecha: Option<NaiveDate>,

    /// todos, productivo, regular, no_productivo or sin_actividad
    #[arg(long, default_value = "todos")]
    pub estado: StateFilter,

    #[arg(long)]
    pub buscar: Option<String>,

    #[arg(long, default_value = "1")]
    pub pagina: usize,

    #[arg(long)]
    pub por_pagina: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct UsuarioArgs {
    pub id: String,

    #[arg(long, value_parser = parse_date_arg)]
    pub fecha: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct HistoricoArgs {
    #[arg(long, value_parser = parse_date_arg)]
    pub desde: NaiveDate,

    #[arg(long, value_parser = parse_date_arg)]
    pub hasta: NaiveDate,

    /// Include this user's per-day history
    #[arg(long)]
    pub usuario: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PrediccionArgs {
    /// Defaults to Monday of the current week
    #[arg(long, value_parser = parse_date_arg)]
    pub desde: Option<NaiveDate>,

    /// Defaults to today
    #[arg(long, value_parser = parse_date_arg)]
    pub hasta: Option<NaiveDate>,

    /// Fetch each day separately to compute the trend
    #[arg(long, default_value = "false")]
    pub tendencia: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ActividadesArgs {
    /// Project id
    #[arg(long)]
    pub proyecto: Option<String>,

    /// completada or pendiente
    #[arg(long)]
    pub estado: Option<CompletionState>,

    #[arg(long)]
    pub prioridad: Option<String>,

    /// hoy, semana, mes or todos
    #[arg(long, default_value = "hoy")]
    pub periodo: DuePeriod,
}

#[derive(Args, Debug, Clone)]
pub struct MonitorArgs {
    #[arg(long, value_parser = parse_date_arg)]
    pub fecha: Option<NaiveDate>,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from([
            "productividad",
            "hoy",
            "--fecha",
            "2024-01-12",
            "--estado",
            "sin_actividad",
            "--json",
        ])
        .expect("cli");
        assert!(cli.json);
        match cli.command {
            Command::Hoy(args) => {
                assert_eq!(args.estado, StateFilter::SinActividad);
                assert_eq!(args.pagina, 1);
                assert_eq!(args.fecha.map(|date| date.to_string()).as_deref(), Some("2024-01-12"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_dates_and_states() {
        assert!(Cli::try_parse_from(["productividad", "hoy", "--fecha", "12/01/2024"]).is_err());
        assert!(Cli::try_parse_from(["productividad", "hoy", "--estado", "feliz"]).is_err());
        assert!(Cli::try_parse_from(["productividad", "historico", "--desde", "2024-01-01"]).is_err());
    }

    #[test]
    fn activities_default_to_today_window() {
        let cli = Cli::try_parse_from(["productividad", "actividades", "--estado", "pendiente"])
            .expect("cli");
        match cli.command {
            Command::Actividades(args) => {
                assert_eq!(args.periodo, DuePeriod::Hoy);
                assert_eq!(args.estado, Some(CompletionState::Pendiente));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
