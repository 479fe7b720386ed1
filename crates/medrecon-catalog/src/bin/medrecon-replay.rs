//! Replay an editing script against a catalog and print the resulting plan.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use medrecon_catalog::{parse_catalog_bundle, parse_script, parse_treatment, replay};
use medrecon_core::{
    CatalogProvider, EffectiveCounts, EngineConfig, ReconciliationSession, TreatmentSubmission,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medrecon-replay")]
#[command(about = "Replay a medication reconciliation script")]
struct Cli {
    /// Catalog bundle JSON ({"protocols": [...], "medicines": [...]})
    #[arg(long)]
    catalog: PathBuf,
    /// Persisted treatment JSON to edit (optional)
    #[arg(long)]
    treatment: Option<PathBuf>,
    /// Protocol to select for a new treatment
    #[arg(long)]
    protocol_id: Option<u64>,
    /// JSON-lines action script
    #[arg(long)]
    script: Option<PathBuf>,
    /// Engine configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    patient_id: u64,
    #[arg(long, default_value_t = 0)]
    doctor_id: u64,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&read(path)?).context("parsing config")?,
        None => EngineConfig::default(),
    };
    let catalog = parse_catalog_bundle(&read(&cli.catalog)?).context("parsing catalog")?;

    let mut session = match &cli.treatment {
        Some(path) => {
            let record = parse_treatment(&read(path)?).context("parsing treatment")?;
            let protocol = catalog
                .protocol(record.protocol_id)
                .cloned()
                .ok_or_else(|| anyhow!("protocol {} not in catalog", record.protocol_id))?;
            ReconciliationSession::from_persisted(protocol, &record, config)?
        }
        None => {
            let mut session = ReconciliationSession::new(config);
            if let Some(id) = cli.protocol_id {
                let protocol = catalog
                    .protocol(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("protocol {} not in catalog", id))?;
                session.set_protocol(Some(protocol))?;
            }
            session
        }
    };

    if let Some(path) = &cli.script {
        let steps = parse_script(&read(path)?).context("parsing script")?;
        let report = replay(&mut session, steps);
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    let effective = session.resolve();
    let counts = EffectiveCounts::of(&effective);
    println!("{}", serde_json::to_string_pretty(&effective)?);
    println!(
        "Protocol: {}  Custom: {}  (Tổng: {})",
        counts.protocol, counts.custom, counts.total
    );

    match TreatmentSubmission::from_session(&session, cli.patient_id, cli.doctor_id) {
        Ok(submission) => println!("{}", submission.to_json()?),
        Err(e) => tracing::warn!("No submission built: {e}"),
    }

    Ok(())
}
