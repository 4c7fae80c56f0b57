//! Entry point for the survey binary
//!
//! Wires the state machine to the real clock, the submission pipeline
//! and the process's stdin/stdout.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;

use shared::{component_debug, logging, Component, GameParameters};
use submission::{SubmissionConfig, SubmissionPipeline};
use survey::{SessionView, SurveyMachine, SurveyResult, SystemClock, TerminalDriver};

/// Terminal survey for the five-round trust game
#[derive(Parser)]
#[command(name = "survey")]
#[command(about = "Runs the trust game survey in the terminal and submits the result")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Directory for locally stored records (defaults to ./trust_game_data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Also write the CSV and JSON exports here when remote delivery fails
    #[arg(long)]
    pub downloads_dir: Option<PathBuf>,

    /// Per-transport timeout in seconds
    #[arg(long)]
    pub attempt_timeout_secs: Option<u64>,

    /// Skip all remote transports and store the record locally
    #[arg(long)]
    pub offline: bool,
}

#[tokio::main]
async fn main() -> SurveyResult<()> {
    let args = Args::parse();
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(Component::Survey, "trust game survey");

    let mut config = SubmissionConfig::from_env()?.offline(args.offline);
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(dir) = args.downloads_dir {
        config = config.with_downloads_dir(dir);
    }
    if let Some(secs) = args.attempt_timeout_secs {
        config = config.with_attempt_timeout(Duration::from_secs(secs));
    }

    let pipeline = SubmissionPipeline::from_config(&config);
    component_debug!(Component::Survey, order = ?pipeline.order(), "Submission chain ready");

    let mut machine = SurveyMachine::new(GameParameters::default(), pipeline, SystemClock);
    let mut driver = TerminalDriver::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    if let Err(e) = driver.run(&mut machine).await {
        logging::log_error(Component::Survey, "Survey aborted", &e);
        return Err(e);
    }

    logging::log_shutdown(Component::Survey, &format!("session {} ended", machine.session().participant_id()));
    Ok(())
}
