//! Sequencer: runs the steps in dependency order and tallies results
//!
//! Login is the only fatal step. Registration failures are recorded and the
//! run continues; update-quantity is skipped when no product was created.

use colored::Colorize;

use crate::http::Transport;

use super::session::Session;
use super::steps::{self, Fixtures, StepKind, StepResult};

/// Denominator before the analytics step is reached
pub const BASE_TOTAL: usize = 5;

/// Denominator once the analytics step is attempted
pub const FULL_TOTAL: usize = 6;

/// Where the sequencer is in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Registering,
    LoggingIn,
    CreatingProduct,
    ListingProducts,
    UpdatingQuantity,
    RunningAnalytics,
    Aborted,
    Finished,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Aborted | Phase::Finished)
    }
}

/// What happened to one step of the sequence
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Completed(StepResult),
    /// Not attempted because a prerequisite was missing
    Skipped { step: StepKind, reason: &'static str },
}

impl StepOutcome {
    pub fn step(&self) -> StepKind {
        match self {
            StepOutcome::Completed(result) => result.step,
            StepOutcome::Skipped { step, .. } => *step,
        }
    }
}

/// Aggregate result of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps_passed: usize,
    pub steps_total: usize,
    /// True when the run stopped at a failed login
    pub aborted: bool,
    pub outcomes: Vec<StepOutcome>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            steps_passed: 0,
            steps_total: BASE_TOTAL,
            aborted: false,
            outcomes: Vec::new(),
        }
    }
}

impl RunSummary {
    /// Whether every expected step passed
    pub fn succeeded(&self) -> bool {
        self.steps_passed == self.steps_total
    }

    /// Process exit code for this summary
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    /// Number of steps that sent a request
    pub fn attempted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::Completed(_)))
            .count()
    }

    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step() == step)
    }

    /// Final report line
    pub fn headline(&self) -> String {
        format!(
            "Tests completed: {}/{} passed",
            self.steps_passed, self.steps_total
        )
    }

    fn record(&mut self, result: StepResult) {
        if result.passed {
            self.steps_passed += 1;
        }
        self.outcomes.push(StepOutcome::Completed(result));
    }
}

/// Drives one run against a transport
pub struct Runner<'a, T: Transport + ?Sized> {
    transport: &'a T,
    session: Session,
    fixtures: Fixtures,
    verbose: bool,
    summary: RunSummary,
}

impl<'a, T: Transport + ?Sized> Runner<'a, T> {
    pub fn new(transport: &'a T, session: Session, fixtures: Fixtures) -> Self {
        Self {
            transport,
            session,
            fixtures,
            verbose: false,
            summary: RunSummary::default(),
        }
    }

    /// Print response bodies after each step
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the full sequence and print the summary
    pub async fn run(mut self) -> RunSummary {
        tracing::info!(base_url = self.session.base_url(), "starting API checks");
        println!("Starting API tests...\n");

        let mut phase = Phase::NotStarted;
        while !phase.is_terminal() {
            phase = self.advance(phase).await;
        }

        let line = "=".repeat(50);
        println!("\n{line}");
        if self.summary.succeeded() {
            println!("{}", self.summary.headline().green().bold());
        } else {
            println!("{}", self.summary.headline().red().bold());
        }
        println!("{line}");

        tracing::info!(
            passed = self.summary.steps_passed,
            total = self.summary.steps_total,
            aborted = self.summary.aborted,
            "API checks finished"
        );
        self.summary
    }

    /// Execute the work for `phase` and return the next phase
    async fn advance(&mut self, phase: Phase) -> Phase {
        match phase {
            Phase::NotStarted => Phase::Registering,

            Phase::Registering => {
                announce(StepKind::Register);
                let result =
                    steps::register(self.transport, &self.session, &self.fixtures.credentials)
                        .await;
                self.finish(result);
                Phase::LoggingIn
            }

            Phase::LoggingIn => {
                announce(StepKind::Login);
                let result =
                    steps::login(self.transport, &mut self.session, &self.fixtures.credentials)
                        .await;
                let passed = result.passed;
                self.finish(result);
                if passed {
                    Phase::CreatingProduct
                } else {
                    println!("{}", "Cannot continue tests without authentication".red());
                    self.summary.aborted = true;
                    Phase::Aborted
                }
            }

            Phase::CreatingProduct => {
                announce(StepKind::CreateProduct);
                let (result, id) =
                    steps::create_product(self.transport, &self.session, &self.fixtures.product)
                        .await;
                if let Some(id) = id {
                    self.session.set_product_id(id);
                }
                self.finish(result);
                Phase::ListingProducts
            }

            Phase::ListingProducts => {
                announce(StepKind::ListProducts);
                let result = steps::list_products(self.transport, &self.session).await;
                self.finish(result);
                Phase::UpdatingQuantity
            }

            Phase::UpdatingQuantity => {
                let step = StepKind::UpdateQuantity;
                match self.session.last_product_id().map(str::to_owned) {
                    Some(id) => {
                        announce(step);
                        let result = steps::update_quantity(
                            self.transport,
                            &self.session,
                            &id,
                            self.fixtures.target_quantity,
                        )
                        .await;
                        self.finish(result);
                    }
                    None => {
                        let reason = "no product was created";
                        println!("{} {} skipped: {}", "-".yellow(), step, reason);
                        tracing::debug!(%step, reason, "step skipped");
                        self.summary.outcomes.push(StepOutcome::Skipped { step, reason });
                    }
                }
                Phase::RunningAnalytics
            }

            Phase::RunningAnalytics => {
                announce(StepKind::Analytics);
                self.summary.steps_total = FULL_TOTAL;
                let result = steps::analytics(self.transport, &self.session).await;
                self.finish(result);
                Phase::Finished
            }

            Phase::Aborted | Phase::Finished => phase,
        }
    }

    /// Print a step's outcome and add it to the tally
    fn finish(&mut self, result: StepResult) {
        if result.passed {
            println!("{} {}", "✓".green(), result.message);
        } else {
            println!("{} {}", "✗".red(), result.message);
        }
        if self.verbose && !result.body.is_null() {
            println!("  {}", result.body.to_string().dimmed());
        }
        tracing::debug!(
            step = %result.step,
            passed = result.passed,
            status = ?result.status,
            "step finished"
        );
        self.summary.record(result);
    }
}

fn announce(step: StepKind) {
    println!("{}", step.progress());
}
