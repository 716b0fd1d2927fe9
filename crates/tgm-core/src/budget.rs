/// Default ceiling of classified failures per run.
pub const DEFAULT_ERRORS_ALLOWED: u32 = 3;

/// Counts classified failures across one run.
///
/// Never reset by successes: the count is per run, not per member.
#[derive(Clone, Debug)]
pub struct ErrorBudget {
    allowed: u32,
    errors: u32,
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self::new(DEFAULT_ERRORS_ALLOWED)
    }
}

impl ErrorBudget {
    pub fn new(allowed: u32) -> Self {
        Self { allowed, errors: 0 }
    }

    pub fn record_error(&mut self) {
        self.errors = self.errors.saturating_add(1);
    }

    pub fn should_abort(&self) -> bool {
        self.errors >= self.allowed
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn allowed(&self) -> u32 {
        self.allowed
    }

    pub fn remaining(&self) -> u32 {
        self.allowed.saturating_sub(self.errors)
    }
}
