//! Generate a one-day wellness plan from the terminal.
//!
//! Reads the API key from `GEMINI_API_KEY` (environment or `.env`) or from
//! `.wellplan/secrets.toml`.
//!
//! # Examples
//!
//! ```sh
//! # Checklist output
//! wellplan --symptom Fever --symptom Cough --age 30 --gender Male --weight 70 --height 175
//!
//! # Raw plan text as returned by the model
//! wellplan --symptom Headache --raw
//!
//! # Structured output
//! wellplan --symptom Insomnia --json
//!
//! # Against a local mock server
//! wellplan --symptom Fatigue --api-base http://127.0.0.1:8080 --timeout-secs 5
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wellplan_rs::prelude::*;

/// Generate a one-day wellness plan for a list of symptoms.
///
/// The output is general wellness advice, not medical advice.
#[derive(Parser)]
#[command(name = "wellplan")]
struct Cli {
    // ── Symptoms ───────────────────────────────────────────────
    /// Symptom to include (repeat for several)
    #[arg(long = "symptom", required = true)]
    symptoms: Vec<String>,

    // ── Profile ────────────────────────────────────────────────
    /// Your name (not sent to the model)
    #[arg(long, default_value = "")]
    name: String,

    /// Age in years
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    age: Option<u32>,

    /// Gender (free text, e.g. Male, Female, Other)
    #[arg(long)]
    gender: Option<String>,

    /// Weight in kilograms
    #[arg(long, value_parser = positive_number)]
    weight: Option<f64>,

    /// Height in centimetres
    #[arg(long, value_parser = positive_number)]
    height: Option<f64>,

    // ── Output mode ────────────────────────────────────────────
    /// Print the plan text exactly as generated
    #[arg(long, conflicts_with = "json")]
    raw: bool,

    /// Print the parsed plan as JSON
    #[arg(long)]
    json: bool,

    // ── Service ────────────────────────────────────────────────
    /// Path to a TOML secrets file holding GEMINI_API_KEY
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Per-call timeout in seconds (overrides WELLPLAN_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// API base URL (overrides WELLPLAN_API_BASE)
    #[arg(long)]
    api_base: Option<String>,
}

/// Finite number greater than zero.
fn positive_number(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("'{raw}' must be greater than zero"))
    }
}

impl Cli {
    fn profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            age: self.age,
            gender: self.gender.clone(),
            weight_kg: self.weight,
            height_cm: self.height,
        }
    }

    fn symptoms(&self) -> Vec<String> {
        let set: SymptomSet = self.symptoms.iter().map(|s| s.trim()).collect();
        set.as_slice().to_vec()
    }
}

/// One `[ ] HH:MM activity` line per reminder.
fn format_checklist(result: &PlanResult) -> String {
    result
        .reminders
        .iter()
        .map(|r| {
            let mark = if r.completed { 'x' } else { ' ' };
            format!("[{mark}] {} {}\n", r.time_label(), r.activity)
        })
        .collect()
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn generate(cli: &Cli) -> Result<String, String> {
    let symptoms = cli.symptoms();
    if symptoms.is_empty() {
        return Err("provide at least one non-blank --symptom".to_string());
    }

    let mut config = AppConfig::load(cli.secrets.as_deref()).map_err(|e| e.to_string())?;
    if let Some(base) = &cli.api_base {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::from_secs(secs.max(1));
    }
    tracing::debug!(?config, "Configuration loaded");

    let client = GeminiClient::with_base_url(&config.api_key, &config.api_base)
        .map_err(|e| e.to_string())?;
    let provider = PlanProvider::new(Arc::new(client), config.provider_config());

    let warnings = WarningCollector::new();
    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with(&warnings);
    let result = PlanPipeline::new(&provider)
        .with_event_handler(&handler)
        .run(&symptoms, &cli.profile())
        .await;

    for warning in warnings.take() {
        eprintln!("Warning: {warning}");
    }

    if cli.raw {
        Ok(format!("{}\n", result.raw_text))
    } else if cli.json {
        serde_json::to_string_pretty(&result)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("failed to serialize plan: {e}"))
    } else {
        Ok(format_checklist(&result))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    match generate(&cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
