pub mod game_tester;
pub mod player;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use game_tester::{GameTester, SimulationPlan, baseline_expectation};
pub use player::AnswerStrategy;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
