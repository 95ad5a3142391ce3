use clap::{Parser, Subcommand};
use octofhir_hl7v2::*;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hl7v2-model")]
#[command(about = "Inspect HL7 v2 temporal literals and generic message structures")]
#[command(version)]
struct Cli {
    /// JSON model configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a TM literal, e.g. 235959+1100
    Time { literal: String },
    /// Parse a DT literal, e.g. 19901012
    Date { literal: String },
    /// Parse a TS/DTM literal, e.g. 20230704123015.25-0500
    Timestamp { literal: String },
    /// Build a generic message and extend it with unplanned segments
    Generic {
        /// HL7 version (2.1 to 2.5); defaults to the configured version
        #[arg(short, long)]
        version: Option<String>,
        /// Segment names to add after MSH
        #[arg(short, long, value_delimiter = ',')]
        segments: Vec<String>,
    },
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::default(),
    };

    let output = match cli.command {
        Commands::Time { literal } => {
            let time = CommonTm::parse(&literal)?;
            json!({
                "value": time.value(),
                "hour": time.hour(),
                "minute": time.minute(),
                "second": time.second(),
                "fractSecond": time.fract_second(),
                "gmtOffset": time.gmt_offset(),
            })
        }
        Commands::Date { literal } => {
            let date = CommonDt::parse(&literal)?;
            json!({
                "value": date.value(),
                "year": date.year(),
                "month": date.month(),
                "day": date.day(),
            })
        }
        Commands::Timestamp { literal } => {
            let timestamp = CommonTs::parse(&literal)?;
            json!({
                "value": timestamp.value(),
                "year": timestamp.year(),
                "month": timestamp.month(),
                "day": timestamp.day(),
                "hour": timestamp.hour(),
                "minute": timestamp.minute(),
                "second": timestamp.second(),
                "fractSecond": timestamp.fract_second(),
                "gmtOffset": timestamp.gmt_offset(),
                "rfc3339": timestamp.to_datetime().map(|dt| dt.to_rfc3339()),
            })
        }
        Commands::Generic { version, segments } => {
            let version = version.unwrap_or_else(|| config.default_version.to_string());
            let factory: Arc<dyn ModelClassFactory> =
                Arc::new(SchemaRegistry::with_builtin_datatypes());
            let table = GenericMessageTable::new();
            let mut message = GenericMessage::create_with_config(&table, &version, factory, config)?;
            let root = message.root();
            message.get(root, "MSH")?;
            for segment in &segments {
                let name = message.extend_with_unplanned_segment(root, segment)?;
                message.get(root, &name)?;
            }
            serde_json::to_value(message.summarize(root)?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
