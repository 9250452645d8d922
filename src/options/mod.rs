//! The option store: working generation parameters and their snapshot
//! lifecycle.
//!
//! `/set` updates land here. The store owns the mutable working values and
//! the current immutable [`PredictOptions`] snapshot; a new snapshot is built
//! after every valid mutation and nowhere else. Updates are all-or-nothing: a
//! value that fails to parse leaves every working value untouched and the
//! snapshot as it was.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::types::PredictOptions;

/// The closed set of keys accepted by `/set`.
///
/// `ALL` fixes the order used by `/values` and the help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    LogitsSize,
    TokensSize,
    PastConversationTokens,
    ContextSize,
    TokensToPredict,
    TopK,
    TopP,
    Temperature,
    BatchSize,
    RepeatPenalty,
    RepeatLastN,
    ContextErase,
}

impl OptionKey {
    /// Every key, in display order.
    pub const ALL: [Self; 12] = [
        Self::LogitsSize,
        Self::TokensSize,
        Self::PastConversationTokens,
        Self::ContextSize,
        Self::TokensToPredict,
        Self::TopK,
        Self::TopP,
        Self::Temperature,
        Self::BatchSize,
        Self::RepeatPenalty,
        Self::RepeatLastN,
        Self::ContextErase,
    ];

    /// Short key used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LogitsSize => "log",
            Self::TokensSize => "toksiz",
            Self::PastConversationTokens => "past",
            Self::ContextSize => "context",
            Self::TokensToPredict => "tokpre",
            Self::TopK => "topk",
            Self::TopP => "topp",
            Self::Temperature => "temp",
            Self::BatchSize => "bat",
            Self::RepeatPenalty => "reppen",
            Self::RepeatLastN => "replast",
            Self::ContextErase => "erase",
        }
    }

    /// Human-readable label used by `/values` and the help text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::LogitsSize => "Logits Size",
            Self::TokensSize => "Tokens Size",
            Self::PastConversationTokens => "Past Conversation Tokens Number",
            Self::ContextSize => "Context Size",
            Self::TokensToPredict => "Tokens To Predict",
            Self::TopK => "Top K",
            Self::TopP => "Top P",
            Self::Temperature => "Temperature",
            Self::BatchSize => "Batches",
            Self::RepeatPenalty => "Repeat Penalty",
            Self::RepeatLastN => "Repeat Last N",
            Self::ContextErase => "Context Erase",
        }
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OptionKey {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| OptionError::UnknownKey(s.to_string()))
    }
}

/// Errors from `/set` key and value handling.
#[derive(Error, Debug)]
pub enum OptionError {
    /// The key is not one of the twelve short keys
    #[error("unknown option key {0:?}")]
    UnknownKey(String),

    /// The value did not parse into the key's type
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Short key the value was meant for
        key: &'static str,
        /// The raw value token
        value: String,
    },
}

/// Working generation parameter values plus the current immutable snapshot.
#[derive(Debug, Clone)]
pub struct OptionStore {
    working: PredictOptions,
    snapshot: Arc<PredictOptions>,
}

impl Default for OptionStore {
    fn default() -> Self {
        Self::new(PredictOptions::default())
    }
}

impl OptionStore {
    /// Create a store whose working values and snapshot both start at
    /// `options`.
    pub fn new(options: PredictOptions) -> Self {
        Self {
            snapshot: Arc::new(options.clone()),
            working: options,
        }
    }

    /// Current snapshot. Cheap to clone and safe to hold across a prediction
    /// round trip; later mutations produce a new snapshot instead of touching
    /// this one.
    pub fn snapshot(&self) -> Arc<PredictOptions> {
        Arc::clone(&self.snapshot)
    }

    /// Current working values.
    pub fn working(&self) -> &PredictOptions {
        &self.working
    }

    /// Parse `raw` as the value for `key` and apply it.
    ///
    /// All-or-nothing: the value is parsed before anything is written, so a
    /// failure changes no working value and builds no snapshot. On success
    /// exactly one field changes and the snapshot is rebuilt from all working
    /// values.
    pub fn apply(&mut self, key: OptionKey, raw: &str) -> Result<(), OptionError> {
        match key {
            OptionKey::LogitsSize => self.working.logits_size = parse_value(key, raw)?,
            OptionKey::TokensSize => self.working.tokens_size = parse_value(key, raw)?,
            OptionKey::PastConversationTokens => {
                self.working.past_conversation_tokens = parse_value(key, raw)?;
            }
            OptionKey::ContextSize => self.working.context_size = parse_value(key, raw)?,
            OptionKey::TokensToPredict => self.working.tokens_to_predict = parse_value(key, raw)?,
            OptionKey::TopK => self.working.top_k = parse_value(key, raw)?,
            OptionKey::TopP => self.working.top_p = parse_value(key, raw)?,
            OptionKey::Temperature => self.working.temperature = parse_value(key, raw)?,
            OptionKey::BatchSize => self.working.batch_size = parse_value(key, raw)?,
            OptionKey::RepeatPenalty => self.working.repeat_penalty = parse_value(key, raw)?,
            OptionKey::RepeatLastN => self.working.repeat_last_n = parse_value(key, raw)?,
            OptionKey::ContextErase => self.working.context_erase = parse_value(key, raw)?,
        }
        self.rebuild();
        Ok(())
    }

    /// The working value for `key`, rendered for display.
    pub fn value_string(&self, key: OptionKey) -> String {
        match key {
            OptionKey::LogitsSize => self.working.logits_size.to_string(),
            OptionKey::TokensSize => self.working.tokens_size.to_string(),
            OptionKey::PastConversationTokens => self.working.past_conversation_tokens.to_string(),
            OptionKey::ContextSize => self.working.context_size.to_string(),
            OptionKey::TokensToPredict => self.working.tokens_to_predict.to_string(),
            OptionKey::TopK => self.working.top_k.to_string(),
            OptionKey::TopP => self.working.top_p.to_string(),
            OptionKey::Temperature => self.working.temperature.to_string(),
            OptionKey::BatchSize => self.working.batch_size.to_string(),
            OptionKey::RepeatPenalty => self.working.repeat_penalty.to_string(),
            OptionKey::RepeatLastN => self.working.repeat_last_n.to_string(),
            OptionKey::ContextErase => self.working.context_erase.to_string(),
        }
    }

    /// Labeled listing of all twelve values, in `OptionKey::ALL` order, as
    /// printed by `/values`.
    pub fn formatted_values(&self) -> String {
        let mut text = String::from("\n");
        for key in OptionKey::ALL {
            text.push_str(key.label());
            text.push_str(": ");
            text.push_str(&self.value_string(key));
            text.push('\n');
        }
        text.push('\n');
        text
    }

    fn rebuild(&mut self) {
        self.snapshot = Arc::new(self.working.clone());
        debug!(options = ?self.snapshot, "options snapshot rebuilt");
    }
}

fn parse_value<T: FromStr>(key: OptionKey, raw: &str) -> Result<T, OptionError> {
    raw.parse().map_err(|_| OptionError::InvalidValue {
        key: key.name(),
        value: raw.to_string(),
    })
}
