use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_core::constants::APPOINTMENT_DATE_FORMAT;
use clinic_core::config::data_dir_from_env_value;
use clinic_core::repositories::outbox::OutboxNotifier;
use clinic_core::repositories::yaml::YamlStore;
use clinic_core::{
    AddRecordOutcome, Appointment, ApptRequest, ApptRequestWorkflow, BestEffort, CoreConfig,
    HealthHistoryWorkflow, HealthRecord, HealthRecordForm, Mid, OfficeVisitId, RecordId,
    RequestId,
};

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic health history and appointment request CLI")]
struct Cli {
    /// MID of the acting health care professional
    #[arg(long, global = true)]
    actor: Option<Mid>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and record a health history entry
    AddRecord {
        /// Patient MID
        patient: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Remove a health record
    RemoveRecord {
        /// Patient MID
        patient: String,
        record_id: RecordId,
    },
    /// List every health record of a patient
    ListRecords {
        /// Patient MID
        patient: String,
    },
    /// List a patient's health records taken at one office visit
    VisitRecords {
        /// Patient MID
        patient: String,
        office_visit_id: OfficeVisitId,
    },
    /// Show the date of an office visit
    VisitDate {
        /// Patient MID
        patient: String,
        office_visit_id: OfficeVisitId,
    },
    /// Show a patient's name and date of birth
    Patient {
        /// Patient MID
        patient: String,
    },
    /// List appointment requests addressed to the acting provider
    ListRequests,
    /// Accept a pending appointment request
    AcceptRequest { request_id: RequestId },
    /// Reject a pending appointment request
    RejectRequest { request_id: RequestId },
    /// Add or rename a member of personnel in the directory
    RegisterProvider { mid: Mid, name: String },
    /// Add or update a patient in the directory
    RegisterPatient {
        mid: Mid,
        name: String,
        /// Date of birth (YYYY-MM-DD)
        date_of_birth: NaiveDate,
    },
    /// Add or update an office visit
    RegisterVisit {
        office_visit_id: OfficeVisitId,
        patient: Mid,
        /// Visit date (YYYY-MM-DD)
        visit_date: NaiveDate,
    },
    /// Submit an appointment request on behalf of a patient
    SubmitRequest {
        request_id: RequestId,
        patient: Mid,
        hcp: Mid,
        /// Requested date and time (YYYY-MM-DD HH:MM:SS)
        date: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

/// Health history input. Values from `--file` are loaded first; flags override them.
#[derive(Args)]
struct FormArgs {
    /// YAML file holding the form fields
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    office_visit_id: Option<String>,
    #[arg(long)]
    systolic: Option<String>,
    #[arg(long)]
    diastolic: Option<String>,
    #[arg(long)]
    hdl: Option<String>,
    #[arg(long)]
    ldl: Option<String>,
    #[arg(long)]
    triglycerides: Option<String>,
    #[arg(long)]
    height: Option<String>,
    #[arg(long)]
    weight: Option<String>,
    #[arg(long)]
    head_circumference: Option<String>,
    /// Smoking status code (1-5 or 9)
    #[arg(long)]
    smoker: Option<String>,
    /// Household smoking status code (1-3)
    #[arg(long)]
    household: Option<String>,
}

impl FormArgs {
    fn into_form(self) -> anyhow::Result<HealthRecordForm> {
        let mut form = match &self.file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading form {}", path.display()))?;
                serde_yaml::from_str(&text)
                    .with_context(|| format!("parsing form {}", path.display()))?
            }
            None => HealthRecordForm::default(),
        };

        let overrides = [
            (self.office_visit_id, &mut form.office_visit_id),
            (self.systolic, &mut form.blood_pressure_systolic),
            (self.diastolic, &mut form.blood_pressure_diastolic),
            (self.hdl, &mut form.cholesterol_hdl),
            (self.ldl, &mut form.cholesterol_ldl),
            (self.triglycerides, &mut form.cholesterol_triglycerides),
            (self.height, &mut form.height),
            (self.weight, &mut form.weight),
            (self.head_circumference, &mut form.head_circumference),
            (self.smoker, &mut form.smoker),
            (self.household, &mut form.household_smoking_status),
        ];
        for (flag, field) in overrides {
            if flag.is_some() {
                *field = flag;
            }
        }
        Ok(form)
    }
}

/// Entry point for the `clinic` command line tool.
///
/// # Environment Variables
/// - `CLINIC_DATA_DIR`: directory holding the YAML tables and the outbox (default: "clinic_data")
/// - `RUST_LOG`: tracing filter, added to the default `clinic=info` directive
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?)
                .add_directive("clinic_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let data_dir = data_dir_from_env_value(std::env::var("CLINIC_DATA_DIR").ok());
    let cfg = Arc::new(CoreConfig::new(data_dir)?);
    tracing::debug!("using data directory {}", cfg.data_dir().display());
    let store = Arc::new(YamlStore::new(cfg.clone()));

    match command {
        Commands::AddRecord { patient, form } => {
            let wf = health_history(&store, require_actor(cli.actor)?, &patient)?;
            let outcome = wf.add_health_record(wf.patient(), &form.into_form()?)?;
            match &outcome {
                AddRecordOutcome::Recorded(record) => {
                    println!("{} (record {})", outcome.message(), record.record_id)
                }
                AddRecordOutcome::ValidationFailed(_) => anyhow::bail!(outcome.message()),
            }
        }
        Commands::RemoveRecord { patient, record_id } => {
            let wf = health_history(&store, require_actor(cli.actor)?, &patient)?;
            match wf.remove_health_record(record_id) {
                BestEffort::Completed => println!("Removed record {}", record_id),
                BestEffort::Discarded { reason } => {
                    println!("Record {} was not removed: {}", record_id, reason)
                }
            }
        }
        Commands::ListRecords { patient } => {
            let wf = health_history(&store, require_actor(cli.actor)?, &patient)?;
            print_records(&wf.all_health_records(wf.patient())?);
        }
        Commands::VisitRecords {
            patient,
            office_visit_id,
        } => {
            let wf = health_history(&store, require_actor(cli.actor)?, &patient)?;
            print_records(&wf.health_records_by_office_visit(office_visit_id, wf.patient())?);
        }
        Commands::VisitDate {
            patient,
            office_visit_id,
        } => {
            let wf = health_history(&store, require_actor(cli.actor)?, &patient)?;
            println!("{}", wf.office_visit_date_str(office_visit_id)?);
        }
        Commands::Patient { patient } => {
            let wf = health_history(&store, require_actor(cli.actor)?, &patient)?;
            println!(
                "MID: {}, Name: {}, Born: {}",
                wf.patient(),
                wf.patient_name()?,
                wf.patient_date_of_birth()?
            );
        }
        Commands::ListRequests => {
            let wf = appt_requests(&store, &cfg, require_actor(cli.actor)?);
            let requests = wf.appt_requests()?;
            if requests.is_empty() {
                println!("No appointment requests found.");
            }
            for request in &requests {
                print_request(request);
            }
            println!("Pending: {}", ApptRequestWorkflow::num_requests(&requests));
        }
        Commands::AcceptRequest { request_id } => {
            let wf = appt_requests(&store, &cfg, require_actor(cli.actor)?);
            let resolution = wf.accept_appt_request(request_id)?;
            println!("{}", resolution.message());
        }
        Commands::RejectRequest { request_id } => {
            let wf = appt_requests(&store, &cfg, require_actor(cli.actor)?);
            let resolution = wf.reject_appt_request(request_id)?;
            println!("{}", resolution.message());
        }
        Commands::RegisterProvider { mid, name } => {
            store.register_personnel(mid, name)?;
            println!("Registered provider {}", mid);
        }
        Commands::RegisterPatient {
            mid,
            name,
            date_of_birth,
        } => {
            store.register_patient(mid, name, date_of_birth)?;
            println!("Registered patient {}", mid);
        }
        Commands::RegisterVisit {
            office_visit_id,
            patient,
            visit_date,
        } => {
            store.register_office_visit(office_visit_id, patient, visit_date)?;
            println!("Registered office visit {}", office_visit_id);
        }
        Commands::SubmitRequest {
            request_id,
            patient,
            hcp,
            date,
            description,
        } => {
            let date = NaiveDateTime::parse_from_str(&date, APPOINTMENT_DATE_FORMAT)
                .with_context(|| format!("{} is not a valid appointment date", date))?;
            let appointment = Appointment {
                hcp_id: hcp,
                patient_id: patient,
                date,
                description,
            };
            store.submit_appt_request(ApptRequest::new(request_id, appointment))?;
            println!("Submitted appointment request {}", request_id);
        }
    }

    Ok(())
}

fn require_actor(actor: Option<Mid>) -> anyhow::Result<Mid> {
    actor.context("--actor is required for this command")
}

fn health_history(
    store: &Arc<YamlStore>,
    actor: Mid,
    patient: &str,
) -> anyhow::Result<HealthHistoryWorkflow> {
    Ok(HealthHistoryWorkflow::new(
        store.clone(),
        store.clone(),
        store.clone(),
        actor,
        patient,
    )?)
}

fn appt_requests(store: &Arc<YamlStore>, cfg: &Arc<CoreConfig>, hcp: Mid) -> ApptRequestWorkflow {
    ApptRequestWorkflow::new(
        store.clone(),
        store.clone(),
        Arc::new(OutboxNotifier::new(cfg.clone())),
        hcp,
    )
}

fn print_records(records: &[HealthRecord]) {
    if records.is_empty() {
        println!("No health records found.");
        return;
    }
    for record in records {
        let m = &record.measurements;
        println!(
            "Record: {}, Visit: {}, BP: {}/{}, Cholesterol: {} (HDL {}, LDL {}, Tri {}), Height: {}, Weight: {}, Head: {}, Smoker: {}, Household: {}, By: {}",
            record.record_id,
            m.office_visit_id,
            m.blood_pressure_systolic,
            m.blood_pressure_diastolic,
            record.total_cholesterol(),
            m.cholesterol_hdl,
            m.cholesterol_ldl,
            m.cholesterol_triglycerides,
            m.height,
            m.weight,
            m.head_circumference,
            m.smoker,
            m.household_smoking_status,
            record.personnel_id
        );
    }
}

fn print_request(request: &ApptRequest) {
    let appt = &request.requested_appt;
    println!(
        "Request: {}, Patient: {}, Date: {}, State: {:?}, Description: {}",
        request.request_id,
        appt.patient_id,
        appt.date_display(),
        request.state(),
        appt.description
    );
}
