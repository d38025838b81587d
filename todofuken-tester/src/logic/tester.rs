use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::game_tester::{GameTester, SimulationPlan};
use crate::logic::simulation::SimulationSummary;
use crate::scenario::TestScenario;

/// Per-run numbers exported in CSV reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunMetrics {
    pub scenario_name: String,
    pub mode: String,
    pub strategy: String,
    pub seed: u64,
    pub targets: usize,
    pub score: u32,
    pub time_ms: u64,
    pub wpm: u32,
    pub attempts: usize,
    pub reloads: usize,
}

impl RunMetrics {
    #[must_use]
    pub fn from_summary(scenario_name: &str, summary: &SimulationSummary) -> Self {
        let session = &summary.final_session;
        Self {
            scenario_name: scenario_name.to_string(),
            mode: summary.mode.label(),
            strategy: summary.strategy.label().to_string(),
            seed: summary.seed,
            targets: session.target_prefectures.len(),
            score: session.score,
            time_ms: session.total_time,
            wpm: todofuken_game::records::wpm(
                session.target_prefectures.len(),
                session.total_time,
            ),
            attempts: summary.turns.iter().map(|turn| turn.attempts).sum(),
            reloads: summary.reloads,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    pub runs: Vec<RunMetrics>,
}

pub struct LogicTester {
    tester: GameTester,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(tester: GameTester, verbose: bool) -> Self {
        Self { tester, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (mode: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.mode,
                    seed
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut durations = Vec::new();
        let mut runs = Vec::new();

        for i in 0..iterations {
            let start = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = self.tester.run_plan(&scenario.plan, iteration_seed);
            let duration = start.elapsed();

            if let Some(err) = evaluate_expectations(&scenario.plan, &summary) {
                failures.push(format!(
                    "Iteration {} (mode {}, strategy {}, seed {}, turns {}, score {}): {}",
                    i + 1,
                    summary.mode,
                    summary.strategy,
                    summary.seed,
                    summary.turns.len(),
                    summary.final_session.score,
                    err
                ));
                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                }
            } else {
                successes += 1;
                durations.push(duration);
                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) score:{} turns:{}",
                        i + 1,
                        iterations,
                        summary.final_session.score,
                        summary.turns.len()
                    );
                }
            }
            runs.push(RunMetrics::from_summary(&scenario.name, &summary));
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            runs,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    plan.expectations
        .iter()
        .find_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| format!("{err:#}"))
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::get_scenario;

    #[test]
    fn smoke_passes_across_iterations() {
        let scenario = get_scenario("smoke").unwrap();
        let tester = LogicTester::new(GameTester::new(false), false);
        let results = tester.run_scenario(&scenario, &[1, 2], 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert_eq!(results[0].runs.len(), 2);
        assert_eq!(results[0].runs[0].score, 470);
    }

    #[test]
    fn failing_expectation_is_reported() {
        let mut scenario = get_scenario("smoke").unwrap();
        scenario.plan = scenario
            .plan
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                Err(anyhow::anyhow!("forced failure"))
            });
        let tester = LogicTester::new(GameTester::new(false), false);
        let results = tester.run_scenario(&scenario, &[7], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("forced failure"));
    }
}
