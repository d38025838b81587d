use anyhow::{Result, ensure};
use todofuken_game::{
    EventKind, GameMode, PREFECTURE_COUNT, Region, Verdict, matches_mode, perfect_score,
    score_for, selector::regions_of,
};

use crate::logic::simulation::SimulationSummary;
use crate::logic::{AnswerStrategy, SimulationPlan, baseline_expectation};
use crate::scenario::TestScenario;

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::simulation(
            "smoke",
            "Smoke",
            "Full mode without hints scores 470 and records one result",
            plan(GameMode::Full, AnswerStrategy::Flawless)
                .with_expectation(perfect_run_expectation),
        ),
        TestScenario::simulation(
            "hint-scoring",
            "Hint Scoring",
            "Hinted answers score 10/8/6/4 per hint level",
            plan(GameMode::Full, AnswerStrategy::HintHeavy)
                .with_expectation(hint_scoring_expectation),
        ),
        TestScenario::simulation(
            "sloppy-typing",
            "Sloppy Typing",
            "Wrong and oddly spaced inputs never change the score",
            plan(GameMode::Full, AnswerStrategy::Sloppy)
                .with_expectation(sloppy_typing_expectation),
        ),
        TestScenario::simulation(
            "single-region",
            "Single Region",
            "One random region, never Hokkaido alone",
            plan(GameMode::Regions(1), AnswerStrategy::Flawless)
                .with_expectation(region_shape_expectation)
                .with_expectation(single_region_expectation),
        ),
        TestScenario::simulation(
            "three-regions",
            "Three Regions",
            "Three whole regions, progress relative to the target set",
            plan(GameMode::Regions(3), AnswerStrategy::Sloppy)
                .with_expectation(region_shape_expectation),
        ),
        TestScenario::simulation(
            "seven-regions",
            "Seven Regions",
            "Seven of eight regions, always a strict subset",
            plan(GameMode::Regions(7), AnswerStrategy::HintHeavy)
                .with_expectation(region_shape_expectation),
        ),
        TestScenario::simulation(
            "expert",
            "Expert Mode",
            "Expert mode plays the full catalog and records as expert",
            plan(GameMode::Expert, AnswerStrategy::Flawless)
                .with_expectation(expert_expectation),
        ),
        TestScenario::simulation(
            "duplicate-answers",
            "Duplicate Answers",
            "Re-submitting an answered prefecture is ignored",
            plan(GameMode::Regions(2), AnswerStrategy::Flawless)
                .with_repeated_answers()
                .with_expectation(duplicate_answer_expectation),
        ),
        TestScenario::simulation(
            "reload-restore",
            "Reload Restore",
            "Reloading mid-game resumes the saved session",
            plan(GameMode::Regions(2), AnswerStrategy::Sloppy)
                .with_reload_every(3)
                .with_expectation(reload_expectation),
        ),
        TestScenario::simulation(
            "storage-outage",
            "Storage Outage",
            "Rejected writes leave the game playable in memory",
            plan(GameMode::Full, AnswerStrategy::Flawless)
                .with_failing_writes()
                .with_expectation(storage_outage_expectation),
        ),
    ]
}

fn plan(mode: GameMode, strategy: AnswerStrategy) -> SimulationPlan {
    SimulationPlan::new(mode, strategy).with_expectation(baseline_expectation)
}

fn perfect_run_expectation(summary: &SimulationSummary) -> Result<()> {
    let session = &summary.final_session;
    let perfect = perfect_score(session.target_prefectures.len());
    ensure!(
        u64::from(session.score) == perfect,
        "score {} != {perfect}",
        session.score
    );
    ensure!(
        summary.records.len() == 1,
        "expected one record, found {}",
        summary.records.len()
    );
    let record = &summary.records[0];
    ensure!(
        record.total_prefectures == PREFECTURE_COUNT,
        "record covers {} prefectures",
        record.total_prefectures
    );
    ensure!(record.time == session.total_time, "record time differs from session");
    ensure!(record.mode == "full", "record mode {}", record.mode);
    ensure!(
        summary.count_events(EventKind::Completed) == 1,
        "completion published {} times",
        summary.count_events(EventKind::Completed)
    );
    Ok(())
}

fn hint_scoring_expectation(summary: &SimulationSummary) -> Result<()> {
    for turn in &summary.turns {
        ensure!(
            turn.points == score_for(turn.hint_level),
            "prefecture {} hint {} scored {}",
            turn.prefecture,
            turn.hint_level,
            turn.points
        );
    }
    Ok(())
}

fn sloppy_typing_expectation(summary: &SimulationSummary) -> Result<()> {
    let correct = summary
        .verdicts
        .iter()
        .filter(|verdict| matches!(verdict, Verdict::Correct { .. }))
        .count();
    ensure!(
        correct == summary.turns.len(),
        "{correct} correct verdicts for {} questions",
        summary.turns.len()
    );
    ensure!(
        summary.count_events(EventKind::Started) == 1,
        "clock started {} times",
        summary.count_events(EventKind::Started)
    );
    Ok(())
}

fn region_shape_expectation(summary: &SimulationSummary) -> Result<()> {
    let targets = &summary.final_session.target_prefectures;
    let count = summary
        .mode
        .region_count()
        .ok_or_else(|| anyhow::anyhow!("{} is not a region mode", summary.mode))?;
    let regions = regions_of(targets);
    ensure!(
        regions.len() == usize::from(count),
        "expected {count} regions, found {}",
        regions.len()
    );
    let expected: usize = regions.iter().map(|region| region.member_count()).sum();
    ensure!(targets.len() == expected, "targets are not whole regions");
    ensure!(matches_mode(targets, summary.mode), "targets do not match mode");
    ensure!(
        summary.records.first().map(|r| r.total_prefectures) == Some(targets.len()),
        "record does not carry the target count"
    );
    Ok(())
}

fn single_region_expectation(summary: &SimulationSummary) -> Result<()> {
    let regions = regions_of(&summary.final_session.target_prefectures);
    ensure!(
        !regions.contains(&Region::Hokkaido),
        "single-region draw picked Hokkaido"
    );
    Ok(())
}

fn expert_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.final_session.target_prefectures.len() == PREFECTURE_COUNT,
        "expert mode must cover the full catalog"
    );
    ensure!(
        summary.records.first().map(|r| r.mode.as_str()) == Some("expert"),
        "record not labelled expert"
    );
    Ok(())
}

fn duplicate_answer_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.final_session.score == summary.expected_score(),
        "duplicates changed the score"
    );
    ensure!(
        summary.count_events(EventKind::Answered) + summary.count_events(EventKind::Completed)
            == summary.turns.len(),
        "duplicates published answer events"
    );
    Ok(())
}

fn reload_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.reloads > 0, "no reload happened");
    ensure!(
        summary.count_events(EventKind::Restored) == summary.reloads,
        "{} reloads but {} restores",
        summary.reloads,
        summary.count_events(EventKind::Restored)
    );
    ensure!(
        summary.initial_session.target_prefectures == summary.final_session.target_prefectures,
        "target set changed across reloads"
    );
    Ok(())
}

fn storage_outage_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.records.is_empty(),
        "records persisted despite failing storage"
    );
    ensure!(
        u64::from(summary.final_session.score) == perfect_score(PREFECTURE_COUNT),
        "in-memory score {}",
        summary.final_session.score
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GameTester;

    #[test]
    fn every_catalog_scenario_passes_for_a_few_seeds() {
        let tester = GameTester::new(false);
        for scenario in catalog_scenarios() {
            for seed in [1, 1337, 90_210] {
                let summary = tester.run_plan(&scenario.plan, seed);
                for expectation in &scenario.plan.expectations {
                    expectation
                        .evaluate(&summary)
                        .unwrap_or_else(|err| panic!("{} seed {seed}: {err:#}", scenario.key));
                }
            }
        }
    }
}
