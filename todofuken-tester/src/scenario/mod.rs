pub mod catalog;

use crate::logic::SimulationPlan;
use catalog::catalog_scenarios;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: String,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(
        key: &'static str,
        name: impl Into<String>,
        description: &'static str,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            description,
            plan,
        }
    }
}

/// Looks a scenario up by its CLI key (case-insensitive).
#[must_use]
pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let key = key.to_lowercase();
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

/// `(key, description)` for every scenario, in catalog order.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_scenarios()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    catalog_scenarios()
        .iter()
        .map(|scenario| scenario.key.to_string())
        .collect()
}
