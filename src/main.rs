//! FOSSI: Fast Ossifier Stratification Index calculator
//!
//! Main entry point for the terminal application and one-shot commands.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fossi::adapters::redact::RedactingMakeWriter;
use fossi::adapters::ConfiguredThresholds;
use fossi::application::CalculatorService;
use fossi::config::{LogMode, Settings};
use fossi::domain::validation::{check, require};
use fossi::domain::{equation_text, Assessment, Constraint, LipidUnit, Measurements, PatientRecord, Sex};
use fossi::tui::App;

#[derive(Parser)]
#[command(name = "fossi")]
#[command(about = "Fast Ossifier Stratification Index (FOSSI) calculator for DISH", long_about = None)]
#[command(version)]
struct Cli {
    /// Threshold table (JSON); overrides FOSSI_THRESHOLDS_PATH
    #[arg(long, global = true)]
    thresholds: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive calculator (default)
    Tui,
    /// Score one patient and print the result
    Evaluate(EvaluateArgs),
    /// Print the equations and the cut points in use
    Equations,
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Female,
    Male,
}

impl From<SexArg> for Sex {
    fn from(value: SexArg) -> Self {
        match value {
            SexArg::Female => Sex::Female,
            SexArg::Male => Sex::Male,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum UnitArg {
    #[default]
    MmolL,
    MgDl,
}

impl From<UnitArg> for LipidUnit {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::MmolL => LipidUnit::MmolPerL,
            UnitArg::MgDl => LipidUnit::MgPerDl,
        }
    }
}

#[derive(clap::Args)]
struct EvaluateArgs {
    #[arg(long, value_enum)]
    sex: SexArg,
    /// Age in years
    #[arg(long, allow_negative_numbers = true)]
    age: Option<f64>,
    /// Body mass index (kg/m²)
    #[arg(long, allow_negative_numbers = true)]
    bmi: Option<f64>,
    /// Cardiometabolic Index
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["height", "tg", "hdl"])]
    cmi: Option<f64>,
    /// Visceral Adiposity Index (women)
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["height", "tg", "hdl"])]
    vai: Option<f64>,
    /// Hypertension indicator, 1 or 0 (women)
    #[arg(long, allow_negative_numbers = true)]
    hypertension: Option<f64>,
    /// Waist circumference in cm
    #[arg(long, alias = "wc", allow_negative_numbers = true)]
    waist: Option<f64>,
    /// Height in cm; selects the measurement path with --tg and --hdl
    #[arg(long, allow_negative_numbers = true)]
    height: Option<f64>,
    /// Triglycerides
    #[arg(long, allow_negative_numbers = true)]
    tg: Option<f64>,
    /// HDL cholesterol
    #[arg(long, allow_negative_numbers = true)]
    hdl: Option<f64>,
    /// Unit of --tg and --hdl
    #[arg(long, value_enum, default_value_t = UnitArg::MmolL)]
    unit: UnitArg,
    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,
}

impl EvaluateArgs {
    fn uses_measurements(&self) -> bool {
        self.height.is_some() || self.tg.is_some() || self.hdl.is_some()
    }

    fn to_record(&self) -> PatientRecord {
        PatientRecord {
            sex: Some(self.sex.into()),
            age: self.age,
            bmi: self.bmi,
            cmi: self.cmi,
            hypertension: self.hypertension,
            vai: self.vai,
            wc: self.waist,
        }
    }

    fn to_measurements(&self) -> Result<Measurements, fossi::ValidationError> {
        let sex: Sex = self.sex.into();
        // FOSSI-M has no hypertension term; the flag is ignored for men as on the record path
        let hypertension = match (sex, self.hypertension) {
            (Sex::Female, Some(flag)) => check("hypertension", flag, Constraint::Indicator)? == 1.0,
            (Sex::Female, None) => return Err(fossi::ValidationError::missing("hypertension")),
            (Sex::Male, _) => false,
        };

        Ok(Measurements {
            sex,
            age: require("age", self.age)?,
            bmi: require("bmi", self.bmi)?,
            height_cm: require("height", self.height)?,
            waist_cm: require("waist", self.waist)?,
            triglycerides: require("triglycerides", self.tg)?,
            hdl: require("hdl", self.hdl)?,
            lipid_unit: self.unit.into(),
            hypertension,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(path) = cli.thresholds.clone() {
        settings.thresholds_path = Some(path);
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    let is_tui = matches!(command, Commands::Tui);

    // Writing logs to the terminal corrupts the TUI (alternate screen), and
    // one-shot commands keep stdout for their own output.
    let _guard = init_logging(&settings, is_tui)?;

    match command {
        Commands::Tui => {
            tracing::info!("Starting FOSSI calculator...");
            let mut app = App::new(&settings)?;
            app.run()?;
            tracing::info!("FOSSI shutdown complete.");
        }
        Commands::Evaluate(args) => evaluate(&settings, &args)?,
        Commands::Equations => equations(&settings)?,
    }

    Ok(())
}

fn init_logging(settings: &Settings, is_tui: bool) -> Result<WorkerGuard> {
    let interactive = std::io::stdout().is_terminal();
    let use_file = if is_tui {
        settings.log_mode.uses_file(interactive)
    } else {
        settings.log_mode == LogMode::File
    };

    let (writer, guard): (NonBlocking, WorkerGuard) = if use_file {
        open_log_file(&settings.log_file)?
    } else if is_tui {
        tracing_appender::non_blocking(std::io::stdout())
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    let default_level = if is_tui { "info" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(RedactingMakeWriter::new(writer)))
        .init();

    Ok(guard)
}

fn open_log_file(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent() {
        // Best-effort: a missing directory surfaces as an open error below.
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

fn service(settings: &Settings) -> Result<CalculatorService<ConfiguredThresholds>> {
    let source = ConfiguredThresholds::from_path(settings.thresholds_path.as_deref());
    Ok(CalculatorService::new(source)?)
}

fn evaluate(settings: &Settings, args: &EvaluateArgs) -> Result<()> {
    let mut service = service(settings)?;

    let assessment = if args.uses_measurements() {
        let measurements = args.to_measurements()?;
        service.evaluate_measurements(&measurements)?
    } else {
        service.evaluate_record(args.to_record())?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print_assessment(&assessment);
    }

    Ok(())
}

fn print_assessment(assessment: &Assessment) {
    let result = &assessment.result;
    println!("{} = {}", result.sex.equation(), result.formatted_score());
    println!("Category: {}", result.category);
    println!("{}", result.category.description());

    if let Some(ix) = &assessment.indices {
        println!();
        println!("CMI: {:.3}", ix.cmi);
        if let Some(vai) = ix.vai {
            println!("VAI: {vai:.3}");
        }
        println!("TG:  {:.3} mmol/L", ix.tg_mmol);
        println!("HDL: {:.3} mmol/L", ix.hdl_mmol);
    }
}

fn equations(settings: &Settings) -> Result<()> {
    let service = service(settings)?;
    let thresholds = service.thresholds();

    println!("Cut points: {}", service.source_description());
    for sex in [Sex::Female, Sex::Male] {
        println!();
        println!("{}", equation_text(sex));
        for (category, label) in thresholds.range_labels(sex) {
            println!("  {label:<18}{category}");
        }
    }
    println!();
    println!("CMI = (TG / HDL) x (WC / height)");
    println!("VAI = [WC / (36.58 + 1.89 x BMI)] x (TG / 0.81) x (1.52 / HDL)");

    Ok(())
}
