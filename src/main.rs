//! Doser
//!
//! Vaporizer dosage calculator with a local session log.

mod logging;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::{info, warn};

use doser::calculator;
use doser::catalog::{self, Catalog};
use doser::config::Config;
use doser::db;
use doser::models::{CalculatorInputs, DoseType, MeasurementMethod, OTHER_DEVICE};
use doser::stats;

#[derive(Parser)]
#[command(name = "doser")]
#[command(about = "Dosage calculator for dry-herb vaporizers")]
struct Cli {
    /// Path to the SQLite session log
    #[arg(short, long, default_value = "doser.db", global = true)]
    database: PathBuf,

    /// JSON file replacing the builtin device catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate how much material covers a dose
    Calc {
        /// Device name from the catalog, or "other"
        #[arg(default_value = OTHER_DEVICE)]
        device: String,

        /// Measurement method: chamber or capsule
        #[arg(short, long, default_value = "chamber")]
        method: MeasurementMethod,

        /// Grams of material per chamber fill
        #[arg(short, long, default_value = "0.0")]
        weight: f64,

        /// THC percentage of the material
        #[arg(long, default_value = "0.0")]
        thc: f64,

        /// CBD percentage of the material
        #[arg(long, default_value = "0.0")]
        cbd: f64,

        /// Cannabinoid the dose refers to: thc or cbd
        #[arg(short = 't', long = "type", default_value = "thc")]
        dose_type: DoseType,

        /// Desired dose in mg
        #[arg(long)]
        dose: f64,

        /// Higher accuracy mode (count inhalations)
        #[arg(short, long)]
        accurate: bool,

        /// Inhalations you usually take from one unit
        #[arg(long, default_value = "8")]
        inhalations_per_unit: u32,

        /// Total inhalations in a session
        #[arg(long, default_value = "8")]
        session_inhalations: u32,

        /// Record the result in the session log
        #[arg(short, long)]
        log: bool,

        /// Notes to store with the logged session
        #[arg(long, requires = "log")]
        notes: Option<String>,
    },

    /// List all devices in the catalog
    Devices,

    /// Show details for a specific device
    Device {
        /// Device name
        name: String,
    },

    /// List logged sessions, newest first
    Sessions {
        /// Show at most this many sessions
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Summarize the session log
    Stats,

    /// Delete one logged session
    Forget {
        /// Session id
        id: i64,
    },

    /// Delete every logged session
    Clear,

    /// Initialize empty database with schema
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config {
        database: cli.database,
        catalog: cli.catalog,
        json: cli.json,
        verbosity: cli.verbose,
    };
    logging::init_logging(cfg.log_level(), !cfg.json && std::io::stderr().is_terminal());

    if let Some(path) = &cfg.catalog {
        catalog::install(Catalog::from_json_file(path)?)?;
    }

    match cli.command {
        Commands::Calc {
            device,
            method,
            weight,
            thc,
            cbd,
            dose_type,
            dose,
            accurate,
            inhalations_per_unit,
            session_inhalations,
            log,
            notes,
        } => {
            let inputs = CalculatorInputs {
                device,
                method,
                chamber_weight_g: weight,
                thc_percent: thc,
                cbd_percent: cbd,
                desired_dose_type: Some(dose_type),
                desired_dose_mg: dose,
                higher_accuracy: accurate,
                inhalations_per_unit,
                total_session_inhalations: session_inhalations,
            };

            let outputs = calculator::calculate_dosage(&inputs)?;
            for warning in &outputs.warnings {
                warn!("{}", warning);
            }

            if cfg.json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                print!("{}", calculator::format_result(&inputs, &outputs));
            }

            if log {
                let conn = open_database(&cfg)?;
                let id = db::insert_session(&conn, &inputs, &outputs, notes.as_deref())?;
                info!("logged session {} to {}", id, cfg.database.display());
                if !cfg.json {
                    println!("\nLogged as session #{}", id);
                }
            }
        }

        Commands::Devices => {
            let devices = catalog::global().devices();
            if cfg.json {
                println!("{}", serde_json::to_string_pretty(devices)?);
            } else {
                println!(
                    "{:<32} {:>9} {:>12} {:>12} {:>11}",
                    "Device", "Type", "Chamber (g)", "Capsule (g)", "Efficiency"
                );
                println!("{}", "-".repeat(80));
                for d in devices {
                    let capsule = d
                        .dosing_capsule_capacity_g
                        .map_or_else(|| "-".to_string(), |c| format!("{:.2}", c));
                    println!(
                        "{:<32} {:>9} {:>12.2} {:>12} {:>10.0}%",
                        d.name, d.kind, d.chamber_capacity_g, capsule, d.extraction_efficiency
                    );
                }
            }
        }

        Commands::Device { name } => match catalog::global().find(&name) {
            Some(d) if cfg.json => println!("{}", serde_json::to_string_pretty(d)?),
            Some(d) => {
                println!("Device: {}", d.name);
                println!("  Type: {}", d.kind);
                println!("  Chamber capacity: {:.2}g", d.chamber_capacity_g);
                match d.dosing_capsule_capacity_g {
                    Some(c) => println!("  Dosing capsules: yes ({:.2}g)", c),
                    None => println!("  Dosing capsules: no"),
                }
                println!("  Extraction efficiency: {:.0}%", d.extraction_efficiency);
            }
            None => println!("Device '{}' not found", name),
        },

        Commands::Sessions { limit } => {
            let conn = open_database(&cfg)?;
            let sessions = db::list_sessions(&conn, limit)?;
            if cfg.json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No sessions logged yet. Run 'calc --log' first.");
            } else {
                println!(
                    "{:>5}  {:<19}  {:<28} {:<8} {:>10} {:>6}",
                    "Id", "When", "Device", "Method", "Dose", "Units"
                );
                println!("{}", "-".repeat(83));
                for s in sessions {
                    let units = match s.method {
                        MeasurementMethod::Capsule => s.capsules_needed,
                        MeasurementMethod::Chamber => s.chambers_needed,
                    };
                    println!(
                        "{:>5}  {:<19}  {:<28} {:<8} {:>6.1}mg {} {:>6}",
                        s.id, s.created_at, s.device, s.method, s.desired_dose_mg, s.dose_type, units
                    );
                    if let Some(notes) = &s.notes {
                        println!("       {}", notes);
                    }
                }
            }
        }

        Commands::Stats => {
            let conn = open_database(&cfg)?;
            let sessions = db::list_sessions(&conn, None)?;
            let summary = stats::summarize_sessions(&sessions);
            if cfg.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
        }

        Commands::Forget { id } => {
            let conn = open_database(&cfg)?;
            db::delete_session(&conn, id)?;
            println!("Session #{} deleted", id);
        }

        Commands::Clear => {
            let conn = open_database(&cfg)?;
            let removed = db::clear_sessions(&conn)?;
            println!("Cleared {} sessions", removed);
        }

        Commands::Init => {
            open_database(&cfg)?;
            println!("Database initialized at: {}", cfg.database.display());
        }
    }

    Ok(())
}

fn open_database(cfg: &Config) -> Result<Connection> {
    let conn = Connection::open(&cfg.database)
        .with_context(|| format!("Failed to open {}", cfg.database.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}
