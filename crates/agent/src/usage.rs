//! Token accounting across the gateway calls of one run.

use serde::{Deserialize, Serialize};
use sysreact_core::{Message, Role, Usage};

/// Totals for a run. `estimated` is true when no call reported usage and
/// the numbers were derived from message lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub estimated: bool,
}

/// Rough characters-per-token ratio for the fallback estimate.
const CHARS_PER_TOKEN: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct UsageAccumulator {
    reported: Option<TokenUsage>,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.reported = None;
    }

    pub fn record(&mut self, usage: Option<&Usage>) {
        let Some(usage) = usage else { return };
        let totals = self.reported.get_or_insert_with(TokenUsage::default);
        totals.prompt_tokens += u64::from(usage.prompt_tokens);
        totals.completion_tokens += u64::from(usage.completion_tokens);
        totals.total_tokens += u64::from(usage.total_tokens);
    }

    /// Reported totals, or an estimate over `messages` when none came in.
    pub fn totals(&self, messages: &[Message]) -> TokenUsage {
        if let Some(reported) = self.reported {
            return reported;
        }

        let mut usage = TokenUsage {
            estimated: true,
            ..TokenUsage::default()
        };
        for message in messages {
            let tokens = u64::try_from(message.content.chars().count() / CHARS_PER_TOKEN).unwrap_or(u64::MAX);
            match message.role {
                Role::Assistant => usage.completion_tokens += tokens,
                Role::System | Role::User | Role::Tool => usage.prompt_tokens += tokens,
            }
        }
        usage.total_tokens = usage.prompt_tokens + usage.completion_tokens;
        usage
    }
}
