//! engine::session
//!
//! Everything one workflow run needs from the outside world, passed in
//! explicitly: the git runner, the operator, configuration, verbosity and
//! a clock.

use chrono::{DateTime, Utc};

use crate::core::config::Config;
use crate::git::branches::BranchManager;
use crate::git::CommandRunner;
use crate::ui::output::Verbosity;
use crate::ui::prompts::{self, Operator, PromptError};

pub struct Session<'a> {
    pub runner: &'a dyn CommandRunner,
    pub operator: &'a mut dyn Operator,
    pub config: &'a Config,
    pub verbosity: Verbosity,
    clock: fn() -> DateTime<Utc>,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl<'a> Session<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        operator: &'a mut dyn Operator,
        config: &'a Config,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            runner,
            operator,
            config,
            verbosity,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, for deterministic names in tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn branches(&self) -> BranchManager<'a> {
        BranchManager::new(self.runner)
    }

    pub fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        self.operator.ask(question)
    }

    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        prompts::confirm(&mut *self.operator, question)
    }

    pub fn wait_for_enter(&mut self, message: &str) -> Result<(), PromptError> {
        prompts::wait_for_enter(&mut *self.operator, message)
    }

    pub fn select_index(
        &mut self,
        question: &str,
        count: usize,
    ) -> Result<Option<usize>, PromptError> {
        prompts::select_index(&mut *self.operator, question, count)
    }
}
