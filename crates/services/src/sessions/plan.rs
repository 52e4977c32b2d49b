use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

use quiz_core::model::{SessionPlan, TestDefinition};

/// Draws the random layout of each attempt.
///
/// Question order and every question's choice order are independent,
/// uniformly random permutations (Fisher–Yates via `SliceRandom::shuffle`).
/// Successive plans from one planner continue the same random stream, so a
/// retry never repeats the previous layout by construction.
#[derive(Debug, Clone)]
pub struct SessionPlanner {
    rng: StdRng,
}

impl SessionPlanner {
    /// Planner seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible planner, for tests and `--seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build a fresh plan for `definition`.
    pub fn plan(&mut self, definition: &TestDefinition) -> SessionPlan {
        let mut question_order: Vec<_> =
            definition.questions().iter().map(|q| q.id().clone()).collect();
        question_order.shuffle(&mut self.rng);

        let mut choice_orders = HashMap::with_capacity(definition.len());
        for question in definition.questions() {
            let mut order: Vec<usize> = (0..question.choices().len()).collect();
            order.shuffle(&mut self.rng);
            choice_orders.insert(question.id().clone(), order);
        }

        SessionPlan::new(question_order, choice_orders)
    }
}

impl Default for SessionPlanner {
    fn default() -> Self {
        Self::new()
    }
}
