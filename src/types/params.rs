//! Generation parameter types.
//!
//! This module defines `PredictOptions`, the immutable bundle of generation
//! parameters handed to the engine with each prediction request, and its
//! builder for hosts that configure parameters programmatically rather than
//! through `/set`.

use serde::{Deserialize, Serialize};

/// Generation parameters for one prediction request.
///
/// A value of this type is a snapshot: the option store rebuilds a fresh one
/// whenever a working value changes and the previous snapshot is discarded.
/// Every field is always populated; `Default` yields the session's starting
/// values.
///
/// # Examples
///
/// ```rust,ignore
/// use promptline::types::PredictOptions;
///
/// let options = PredictOptions::builder()
///     .temperature(0.8)
///     .top_k(20)
///     .build();
/// assert_eq!(options.top_k, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictOptions {
    /// Reserved logits buffer sizing hint
    pub logits_size: u64,
    /// Reserved tokens buffer sizing hint
    pub tokens_size: u64,
    /// How many prior conversation tokens to retain
    pub past_conversation_tokens: i32,
    /// Maximum context window
    pub context_size: i32,
    /// Generation length cap
    pub tokens_to_predict: i32,
    /// Sampling truncation width
    pub top_k: i32,
    /// Nucleus-sampling threshold
    pub top_p: f32,
    /// Sampling randomness
    pub temperature: f32,
    /// Inference batch width
    pub batch_size: i32,
    /// Repetition suppression strength
    pub repeat_penalty: f32,
    /// Window for the repetition penalty
    pub repeat_last_n: i32,
    /// Fraction of context to erase when full
    pub context_erase: f32,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            logits_size: 0,
            tokens_size: 0,
            past_conversation_tokens: 0,
            context_size: 4096,
            tokens_to_predict: 512,
            top_k: 40,
            top_p: 0.9,
            temperature: 0.5,
            batch_size: 128,
            repeat_penalty: 1.2,
            repeat_last_n: 128,
            context_erase: 0.0,
        }
    }
}

impl PredictOptions {
    /// Create a builder starting from the default values
    pub fn builder() -> PredictOptionsBuilder {
        PredictOptionsBuilder::default()
    }
}

/// Builder for [`PredictOptions`].
///
/// Values that parse into a field's type are accepted as-is; range policy is
/// the engine's concern, not the builder's.
#[derive(Debug, Clone, Default)]
pub struct PredictOptionsBuilder {
    options: PredictOptions,
}

impl PredictOptionsBuilder {
    /// Set the logits buffer sizing hint
    pub fn logits_size(mut self, logits_size: u64) -> Self {
        self.options.logits_size = logits_size;
        self
    }

    /// Set the tokens buffer sizing hint
    pub fn tokens_size(mut self, tokens_size: u64) -> Self {
        self.options.tokens_size = tokens_size;
        self
    }

    /// Set how many prior conversation tokens to retain
    pub fn past_conversation_tokens(mut self, past_conversation_tokens: i32) -> Self {
        self.options.past_conversation_tokens = past_conversation_tokens;
        self
    }

    /// Set the maximum context window
    pub fn context_size(mut self, context_size: i32) -> Self {
        self.options.context_size = context_size;
        self
    }

    /// Set the generation length cap
    pub fn tokens_to_predict(mut self, tokens_to_predict: i32) -> Self {
        self.options.tokens_to_predict = tokens_to_predict;
        self
    }

    /// Set the sampling truncation width
    pub fn top_k(mut self, top_k: i32) -> Self {
        self.options.top_k = top_k;
        self
    }

    /// Set the nucleus-sampling threshold
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.options.top_p = top_p;
        self
    }

    /// Set the sampling randomness
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = temperature;
        self
    }

    /// Set the inference batch width
    pub fn batch_size(mut self, batch_size: i32) -> Self {
        self.options.batch_size = batch_size;
        self
    }

    /// Set the repetition suppression strength
    pub fn repeat_penalty(mut self, repeat_penalty: f32) -> Self {
        self.options.repeat_penalty = repeat_penalty;
        self
    }

    /// Set the window for the repetition penalty
    pub fn repeat_last_n(mut self, repeat_last_n: i32) -> Self {
        self.options.repeat_last_n = repeat_last_n;
        self
    }

    /// Set the fraction of context to erase when full
    pub fn context_erase(mut self, context_erase: f32) -> Self {
        self.options.context_erase = context_erase;
        self
    }

    /// Build the options
    pub fn build(self) -> PredictOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_start() {
        let options = PredictOptions::default();
        assert_eq!(options.logits_size, 0);
        assert_eq!(options.tokens_size, 0);
        assert_eq!(options.past_conversation_tokens, 0);
        assert_eq!(options.context_size, 4096);
        assert_eq!(options.tokens_to_predict, 512);
        assert_eq!(options.top_k, 40);
        assert_eq!(options.top_p, 0.9);
        assert_eq!(options.temperature, 0.5);
        assert_eq!(options.batch_size, 128);
        assert_eq!(options.repeat_penalty, 1.2);
        assert_eq!(options.repeat_last_n, 128);
        assert_eq!(options.context_erase, 0.0);
    }

    #[test]
    fn builder_overrides_single_fields() {
        let options = PredictOptions::builder().top_k(20).temperature(0.8).build();
        assert_eq!(options.top_k, 20);
        assert_eq!(options.temperature, 0.8);
        // untouched fields keep their defaults
        assert_eq!(options.context_size, 4096);
    }
}
