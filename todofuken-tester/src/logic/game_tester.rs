use anyhow::Result;
use std::sync::Arc;
use todofuken_game::GameMode;

use crate::logic::player::AnswerStrategy;
use crate::logic::simulation::{SimulationConfig, SimulationSession, SimulationSummary};

/// Declarative plan for running a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: GameMode,
    pub strategy: AnswerStrategy,
    pub reload_every: Option<usize>,
    pub fail_writes: bool,
    pub repeat_answers: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(mode: GameMode, strategy: AnswerStrategy) -> Self {
        Self {
            mode,
            strategy,
            reload_every: None,
            fail_writes: false,
            repeat_answers: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_reload_every(mut self, turns: usize) -> Self {
        self.reload_every = Some(turns);
        self
    }

    #[must_use]
    pub const fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    #[must_use]
    pub const fn with_repeated_answers(mut self) -> Self {
        self.repeat_answers = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    #[must_use]
    pub fn config_for(&self, seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig::new(self.mode, self.strategy, seed);
        config.reload_every = self.reload_every;
        config.fail_writes = self.fail_writes;
        config.repeat_answers = self.repeat_answers;
        config
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the expectation's failure.
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Runs plans against a fresh in-memory engine per seed.
#[derive(Debug, Clone, Copy)]
pub struct GameTester {
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let summary = SimulationSession::new(plan.config_for(seed)).run();
        if self.verbose {
            log::info!(
                "seed {seed} mode {} strategy {}: {} turns, score {}, complete {}",
                summary.mode,
                summary.strategy,
                summary.turns.len(),
                summary.final_session.score,
                summary.completed
            );
        }
        summary
    }
}

/// Baseline checks every plan gets: the run completed, scoring matched the
/// answers given, and no invariant broke along the way.
///
/// # Errors
///
/// Returns the first failed check.
pub fn baseline_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.completed, "session did not complete");
    anyhow::ensure!(
        summary.invariant_violations.is_empty(),
        "invariant violations: {}",
        summary.invariant_violations.join("; ")
    );
    anyhow::ensure!(
        summary.final_session.score == summary.expected_score(),
        "score {} does not match {} awarded",
        summary.final_session.score,
        summary.expected_score()
    );
    anyhow::ensure!(
        summary.turns.len() == summary.final_session.target_prefectures.len(),
        "played {} questions for {} targets",
        summary.turns.len(),
        summary.final_session.target_prefectures.len()
    );
    anyhow::ensure!(
        summary
            .turns
            .windows(2)
            .all(|pair| pair[0].elapsed_ms <= pair[1].elapsed_ms),
        "elapsed time went backwards"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_builders_flow_into_config() {
        let plan = SimulationPlan::new(GameMode::Regions(3), AnswerStrategy::Sloppy)
            .with_reload_every(4)
            .with_failing_writes()
            .with_repeated_answers();
        let config = plan.config_for(11);
        assert_eq!(config.seed, 11);
        assert_eq!(config.reload_every, Some(4));
        assert!(config.fail_writes);
        assert!(config.repeat_answers);
    }

    #[test]
    fn baseline_passes_for_a_clean_run() {
        let plan = SimulationPlan::new(GameMode::Regions(1), AnswerStrategy::HintHeavy);
        let summary = GameTester::new(false).run_plan(&plan, 3);
        baseline_expectation(&summary).unwrap();
    }
}
