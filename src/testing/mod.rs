//! API check runner
//!
//! Walks the inventory API through register, login, create, list, update
//! and analytics, carrying the auth token and created product id from one
//! step to the next. Assertions are made on status codes and JSON shapes.

mod runner;
mod session;
pub mod steps;

pub use runner::{Phase, RunSummary, Runner, StepOutcome, BASE_TOTAL, FULL_TOTAL};
pub use session::Session;
pub use steps::{Fixtures, StepKind, StepResult};

use crate::common::config::Config;
use crate::common::Result;
use crate::http::HttpClient;

/// Run every check against the server named in `config`
///
/// Only setup problems are returned as errors; step failures are reported in
/// the summary.
pub async fn run_checks(config: &Config, verbose: bool) -> Result<RunSummary> {
    let session = Session::new(&config.target.base_url)?;
    let client = HttpClient::new(config.target.timeout_secs)?;
    let fixtures = Fixtures::from_config(config);

    Ok(Runner::new(&client, session, fixtures)
        .verbose(verbose)
        .run()
        .await)
}
