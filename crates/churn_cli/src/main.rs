//! Customer Churn Predictor command line interface
//!
//! Fills the feature form from flags or an interactive session, submits it to
//! the prediction service and prints the verdict.

mod render;
mod repl;

use anyhow::{Context, Result};
use churn_client::{ConfigManager, HttpPredictionClient};
use churn_core::{FeatureSchema, HistoryLog, PredictionSession, SessionError, USER_NOTICE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "churn-cli")]
#[command(about = "Customer churn predictor", long_about = None)]
#[command(version)]
struct Cli {
    /// Prediction service base URL (overrides CHURN_API_URL and the config file)
    #[arg(long, alias = "api", global = true)]
    api_url: Option<String>,

    /// TOML config file (defaults to $CHURN_CONFIG or config/churn.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the form fields in submission order
    Schema {
        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
    /// Encode a form without submitting it
    Encode {
        #[command(flatten)]
        form: FormArgs,
        /// Print the request body as JSON
        #[arg(long)]
        json: bool,
    },
    /// Submit a form once and print the prediction
    Predict(FormArgs),
    /// Interactive session: edit the form, submit repeatedly, review history
    Session,
}

#[derive(Args)]
struct FormArgs {
    /// Start from the example customer
    #[arg(long)]
    example: bool,

    /// Set a field by name or index, e.g. --set "Gender=Male" --set 4=12
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Schema { json } => handle_schema(json),
        Commands::Encode { form, json } => handle_encode(&form, json),
        Commands::Predict(form) => {
            handle_predict(&form, cli.api_url.as_deref(), cli.config.as_deref()).await
        }
        Commands::Session => handle_session(cli.api_url.as_deref(), cli.config.as_deref()).await,
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    repl::split_assignment(raw)
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

fn load_client(
    api_url: Option<&str>,
    config_path: Option<&std::path::Path>,
) -> Result<(HttpPredictionClient, HistoryLog)> {
    let mut manager = ConfigManager::load(config_path).context("failed to load configuration")?;
    info!(source = ?manager.source(), "configuration loaded");
    if let Some(api_url) = api_url {
        manager.override_api_url(api_url);
    }

    let config = manager.into_config();
    let history = HistoryLog::with_limit(config.history_limit);
    info!(api_url = %config.api_url, "using prediction service");

    let client =
        HttpPredictionClient::new(config).context("failed to create prediction client")?;
    Ok((client, history))
}

fn filled_session(form: &FormArgs, history: HistoryLog) -> Result<PredictionSession> {
    let mut session = PredictionSession::with_history(FeatureSchema::telco(), history);
    if form.example {
        session.prefill_sample()?;
    }
    for (field, value) in &form.assignments {
        repl::assign(&mut session, field, value)?;
    }
    Ok(session)
}

fn handle_schema(json: bool) -> Result<()> {
    let schema = FeatureSchema::telco();
    if json {
        println!("{}", serde_json::to_string_pretty(&*schema)?);
    } else {
        print!("{}", render::schema_listing(&schema));
    }
    Ok(())
}

fn handle_encode(form: &FormArgs, json: bool) -> Result<()> {
    let session = filled_session(form, HistoryLog::unbounded())?;
    let encoded = session.encoded();

    if json {
        let body = serde_json::json!({ "features": encoded });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render::encoding_listing(session.schema(), session.form(), &encoded));
    }
    Ok(())
}

async fn handle_predict(
    form: &FormArgs,
    api_url: Option<&str>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let (client, history) = load_client(api_url, config_path)?;
    let mut session = filled_session(form, history)?;

    match session.submit(&client).await {
        Ok(prediction) => {
            println!("{}", render::prediction_banner(&prediction));
            Ok(())
        }
        Err(SessionError::PredictionFailed(_)) => anyhow::bail!(USER_NOTICE),
        Err(other) => Err(other.into()),
    }
}

async fn handle_session(
    api_url: Option<&str>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let (client, history) = load_client(api_url, config_path)?;
    let mut session = PredictionSession::with_history(FeatureSchema::telco(), history);
    session.set_observer(render::TerminalObserver::new(FeatureSchema::telco()));

    repl::run(&mut session, &client).await
}
