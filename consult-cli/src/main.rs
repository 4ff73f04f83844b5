//! Consult CLI — terminal client for The Consult ask API.
//!
//! Submits one clinical or research question, streams the answer to the
//! terminal as it is generated, and prints the filtered, renumbered study
//! list beneath it.

mod render;

use anyhow::Context;
use clap::Parser;
use consult_core::types::ALL_ARTICLES;
use consult_core::{
    load_config, AskClient, ConsultSession, EvidenceFilters, Mode,
};
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Width answers and cards are wrapped to.
const WRAP_WIDTH: usize = 88;

/// Ask The Consult a clinical or research question
#[derive(Parser, Debug)]
#[command(name = "consult", version, about, long_about = None)]
struct Cli {
    /// The question to ask
    question: String,

    /// Answer-generation mode
    #[arg(long, value_enum, default_value_t = ModeArg::Clinical)]
    mode: ModeArg,

    /// Optional patient context forwarded with the question
    #[arg(long)]
    patient_context: Option<String>,

    /// Article-impact filter tag, repeatable ("Top Journal", "Highly Cited")
    #[arg(long = "impact")]
    impact: Vec<String>,

    /// Publication-date window ("Within last year", "Within last 5 years")
    #[arg(long, default_value = ALL_ARTICLES)]
    published: String,

    /// COI disclosure filter ("With Disclosures", "Without Disclosures")
    #[arg(long, default_value = ALL_ARTICLES)]
    coi: String,

    /// Override the configured API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Clinical,
    Research,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Clinical => Mode::Clinical,
            ModeArg::Research => Mode::Research,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Lightweight user-facing notice, the terminal stand-in for a toast.
fn notice(message: &str) {
    eprintln!("consult: {message}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config =
        load_config(Some(Path::new("."))).context("failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.api_base_url = base_url.clone();
    }

    let client = AskClient::new(&config).context("invalid API base URL")?;
    tracing::debug!(base_url = client.base_url(), "Resolved configuration");
    let mut session = ConsultSession::new(config.reference_year);
    session.set_mode(cli.mode.into());
    session.set_patient_context(cli.patient_context.clone());
    session.set_filters(EvidenceFilters {
        article_impact: cli.impact.clone(),
        publication_date: cli.published.clone(),
        coi_disclosure: cli.coi.clone(),
    });

    let request = match session.begin_submission(&cli.question) {
        Ok(request) => request,
        Err(e) => {
            notice(&format!("Question required: {e}"));
            std::process::exit(2);
        }
    };

    // Stream the answer live, printing only the unseen tail of each
    // cumulative partial.
    let mut printed = 0usize;
    let mut on_partial = |partial: &str| {
        session.apply_partial(partial);
        if partial.len() > printed {
            print!("{}", &partial[printed..]);
            let _ = std::io::stdout().flush();
            printed = partial.len();
        }
    };

    let outcome = client.ask(&request, Some(&mut on_partial)).await;
    println!();

    match outcome {
        Ok(result) => {
            session.apply_result(result);

            println!();
            println!("{}", render::render_answer(session.answer(), WRAP_WIDTH));
            println!();

            let studies = session.filtered_studies();
            if studies.is_empty() {
                println!("No studies match your current filters.");
            } else {
                println!("References");
                println!("----------");
                for study in &studies {
                    println!("{}", render::render_study(study));
                    println!();
                }
            }
            Ok(())
        }
        Err(e) => {
            session.apply_failure();
            notice(&format!("Unable to reach The Consult: {e}"));
            std::process::exit(1);
        }
    }
}
