mod api;
mod auth;
mod commands;
mod config;
mod notification;
mod routes;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use api::types::CreateAppointmentRequest;
use config::Config;
use state::{AppState, StorageKind};

#[derive(Parser, Debug)]
#[command(name = "imis-client", version, about = "Command-line client for the IMIS backend")]
struct Args {
    /// Backend base URL (overrides IMIS_API_URL / IMIS_HOST)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the session token is kept between runs
    #[arg(long, value_enum, global = true, default_value = "file")]
    storage: StorageKind,

    /// List every view regardless of the session's roles
    #[arg(long, global = true)]
    show_all_views: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "IMIS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the stored session
    Logout,
    /// Show the current session
    Status,
    /// Views available to the current session
    Routes,
    /// Members of the current institution with their roles
    Users,
    /// Register a new institution from a JSON file
    RegisterInstitution {
        #[arg(long)]
        file: PathBuf,
    },
    #[command(subcommand)]
    Patients(PatientsCommand),
    #[command(subcommand)]
    Labtests(LabtestsCommand),
    /// Create an appointment between doctor, laboratory and patient
    Appointment {
        #[arg(long)]
        doctor_id: String,
        #[arg(long)]
        laboratory_id: String,
        #[arg(long)]
        patient_id: String,
    },
    /// Statistics for a zip code range
    Stats {
        #[arg(long)]
        lower_zip: String,
        #[arg(long)]
        upper_zip: String,
    },
    #[command(subcommand)]
    Incidents(IncidentsCommand),
}

/// Patient records
#[derive(Subcommand, Debug)]
enum PatientsCommand {
    List,
    Get { id: String },
    Create {
        #[arg(long)]
        file: PathBuf,
    },
}

/// Lab tests
#[derive(Subcommand, Debug)]
enum LabtestsCommand {
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        laboratory_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    ByPatient { patient_id: String },
}

/// Quarantine incidents
#[derive(Subcommand, Debug)]
enum IncidentsCommand {
    Selected,
    Save {
        #[arg(long)]
        file: PathBuf,
    },
}

impl Command {
    /// Commands that run without restoring the stored session.
    fn is_public(&self) -> bool {
        matches!(
            self,
            Command::Login { .. } | Command::Logout | Command::RegisterInstitution { .. }
        )
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), String> {
    if !command.is_public() {
        commands::restore_session(state).await?;
    }

    match command {
        Command::Login { username, password } => commands::login(state, &username, &password).await,
        Command::Logout => commands::logout(state).await,
        Command::Status => commands::status(state).await,
        Command::Routes => commands::routes(state).await,
        Command::Users => commands::institution_users(state).await,
        Command::RegisterInstitution { file } => commands::register_institution(state, &file).await,
        Command::Patients(PatientsCommand::List) => commands::list_patients(state).await,
        Command::Patients(PatientsCommand::Get { id }) => commands::get_patient(state, &id).await,
        Command::Patients(PatientsCommand::Create { file }) => {
            commands::create_patient(state, &file).await
        }
        Command::Labtests(LabtestsCommand::Create { file }) => {
            commands::create_lab_test(state, &file).await
        }
        Command::Labtests(LabtestsCommand::Update { laboratory_id, file }) => {
            commands::update_lab_test(state, &laboratory_id, &file).await
        }
        Command::Labtests(LabtestsCommand::ByPatient { patient_id }) => {
            commands::lab_tests_by_patient(state, &patient_id).await
        }
        Command::Appointment {
            doctor_id,
            laboratory_id,
            patient_id,
        } => {
            let request = CreateAppointmentRequest {
                doctor_id,
                laboratory_id,
                patient_id,
            };
            commands::create_appointment(state, &request).await
        }
        Command::Stats {
            lower_zip,
            upper_zip,
        } => commands::show_stats(state, &lower_zip, &upper_zip).await,
        Command::Incidents(IncidentsCommand::Selected) => {
            commands::selected_for_quarantine(state).await
        }
        Command::Incidents(IncidentsCommand::Save { file }) => {
            commands::save_quarantine_incident(state, &file).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    env_logger::init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if args.show_all_views {
        config.show_all_views = true;
    }
    log::info!("Using IMIS backend at {}", config.api_base_url);

    let state = match AppState::open(config, args.storage) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&state, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
