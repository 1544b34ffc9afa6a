//! Command-line entry point for route sequencing.
//!
//! # Responsibility
//! - Open the route database and dispatch one subcommand.
//! - Print results as JSON on stdout; errors go to stderr with exit code 1.

use clap::{Parser, Subcommand};
use routeplan_core::db::open_db;
use routeplan_core::{
    default_log_level, init_logging, optimize_service_from_config, EngineConfig, NewStop,
    SqliteRouteRepository, SqliteStopRepository, StopService, StopStatus,
};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "routeplan", version, about = "Door-to-door route sequencing")]
struct Cli {
    /// SQLite database file.
    #[arg(long, default_value = "routeplan.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long)]
    log_dir: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    /// JSON engine config; environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reorder a route's stops into a walking-efficient sequence.
    Optimize { route_id: Uuid },
    CreateRoute {
        #[arg(long)]
        rep: String,
        /// Calendar date, `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Append a stop to the end of a route.
    AddStop {
        route_id: Uuid,
        address: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    ListStops { route_id: Uuid },
    /// Set a stop to pending, finished or skipped.
    SetStatus { stop_id: Uuid, status: String },
    Progress { route_id: Uuid },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<serde_json::Value, String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = load_config(cli.config.as_ref())?;
    let conn = open_db(&cli.db).map_err(|err| format!("failed to open database: {err}"))?;
    let stops = SqliteStopRepository::new(&conn);
    let routes = SqliteRouteRepository::new(&conn);

    match cli.command {
        Command::Optimize { route_id } => {
            let service = optimize_service_from_config(&stops, &routes, &config)
                .map_err(|err| err.to_string())?;
            match service.optimize_route(route_id) {
                Ok(outcome) => Ok(json!({ "success": true, "result": outcome })),
                Err(err) => {
                    let body = json!({
                        "error": { "kind": err.kind(), "message": err.to_string() }
                    });
                    Err(body.to_string())
                }
            }
        }
        Command::CreateRoute { rep, date, title } => {
            let route = StopService::new(&stops, &routes)
                .create_route(rep, date, title)
                .map_err(|err| err.to_string())?;
            Ok(json!(route))
        }
        Command::AddStop {
            route_id,
            address,
            phone,
            email,
            notes,
        } => {
            let input = NewStop {
                address,
                phone,
                email,
                notes,
            };
            let stop = StopService::new(&stops, &routes)
                .add_stop(route_id, input)
                .map_err(|err| err.to_string())?;
            Ok(json!(stop))
        }
        Command::ListStops { route_id } => {
            let list = StopService::new(&stops, &routes)
                .list_stops(route_id)
                .map_err(|err| err.to_string())?;
            Ok(json!(list))
        }
        Command::SetStatus { stop_id, status } => {
            let status = StopStatus::parse(status.trim()).ok_or_else(|| {
                format!("unknown status `{status}`; expected pending|finished|skipped")
            })?;
            let stop = StopService::new(&stops, &routes)
                .set_status(stop_id, status)
                .map_err(|err| err.to_string())?;
            Ok(json!(stop))
        }
        Command::Progress { route_id } => {
            let progress = StopService::new(&stops, &routes)
                .route_progress(route_id)
                .map_err(|err| err.to_string())?;
            Ok(json!(progress))
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, String> {
    let Some(path) = path else {
        return Ok(EngineConfig::from_env());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read config `{}`: {err}", path.display()))?;
    EngineConfig::from_json_str(&text)
        .map_err(|err| format!("invalid config `{}`: {err}", path.display()))
}
