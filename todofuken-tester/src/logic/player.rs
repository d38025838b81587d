use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use todofuken_game::{Prefecture, accepted_answers, answer::short_name};

/// One typed attempt at the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub input: String,
    pub hint_level: u8,
}

/// How a simulated player answers a question.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Attempts for `prefecture`, in the order they are typed. The last one
    /// is expected to be correct.
    fn attempts(&mut self, prefecture: &Prefecture) -> Vec<Attempt>;

    /// Milliseconds spent before submitting.
    fn think_time_ms(&mut self) -> i64;
}

/// Built-in answering strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnswerStrategy {
    /// Knows every prefecture and never needs a hint.
    Flawless,
    /// Reveals a random number of hints before answering.
    HintHeavy,
    /// Mistypes first and then answers with a short or kana spelling.
    Sloppy,
}

impl AnswerStrategy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flawless => "Flawless",
            Self::HintHeavy => "Hint Heavy",
            Self::Sloppy => "Sloppy",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        let rng = ChaCha20Rng::seed_from_u64(seed ^ 0x7F4A_7C15);
        match self {
            Self::Flawless => Box::new(FlawlessPolicy { rng }),
            Self::HintHeavy => Box::new(HintHeavyPolicy { rng }),
            Self::Sloppy => Box::new(SloppyPolicy { rng }),
        }
    }
}

impl fmt::Display for AnswerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct FlawlessPolicy {
    rng: ChaCha20Rng,
}

struct HintHeavyPolicy {
    rng: ChaCha20Rng,
}

struct SloppyPolicy {
    rng: ChaCha20Rng,
}

impl PlayerPolicy for FlawlessPolicy {
    fn name(&self) -> &'static str {
        "flawless"
    }

    fn attempts(&mut self, prefecture: &Prefecture) -> Vec<Attempt> {
        vec![Attempt {
            input: prefecture.name.to_string(),
            hint_level: 0,
        }]
    }

    fn think_time_ms(&mut self) -> i64 {
        self.rng.gen_range(800..2_000)
    }
}

impl PlayerPolicy for HintHeavyPolicy {
    fn name(&self) -> &'static str {
        "hint-heavy"
    }

    fn attempts(&mut self, prefecture: &Prefecture) -> Vec<Attempt> {
        vec![Attempt {
            input: prefecture.kana.to_string(),
            hint_level: self.rng.gen_range(0..=3),
        }]
    }

    fn think_time_ms(&mut self) -> i64 {
        self.rng.gen_range(3_000..9_000)
    }
}

impl PlayerPolicy for SloppyPolicy {
    fn name(&self) -> &'static str {
        "sloppy"
    }

    fn attempts(&mut self, prefecture: &Prefecture) -> Vec<Attempt> {
        let mut attempts = Vec::new();
        if self.rng.gen_bool(0.4) {
            attempts.push(Attempt {
                input: format!("{}?", short_name(prefecture.name)),
                hint_level: 0,
            });
        }
        let spellings = accepted_answers(prefecture);
        let pick = self.rng.gen_range(0..spellings.len());
        attempts.push(Attempt {
            input: format!("  {} ", spellings[pick]),
            hint_level: u8::from(!attempts.is_empty()),
        });
        attempts
    }

    fn think_time_ms(&mut self) -> i64 {
        self.rng.gen_range(1_500..6_000)
    }
}
