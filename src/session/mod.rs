//! The chat session state machine.
//!
//! A session starts in `AwaitingModel`, treating each submitted line as a
//! model path until a load succeeds, then flips to `Ready`, where lines are
//! either slash commands or prompts for the engine. `/newmodel` drops the
//! model handle and goes back to waiting. One request is in flight at a time;
//! a line submitted during a round trip is rejected, never queued.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::engine::{ModelLoader, TextModel};
use crate::error::ChatError;
use crate::options::{OptionKey, OptionStore};
use crate::types::PredictOptions;

/// Where session output goes. Append-only, with a full clear.
pub trait DisplaySink {
    /// Append text to the output area
    fn append(&mut self, text: &str);
    /// Clear the output area
    fn clear(&mut self);
}

/// What the host should do after a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Keep the session going
    Continue,
    /// A request was already in flight; the line was dropped
    Rejected,
    /// Terminate the session
    Exit,
}

/// Session configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use promptline::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_stream_responses(true)
///     .with_show_latency(false);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Echo each prompt into the display before its response
    pub echo_prompt: bool,
    /// Append per-request latency after each response
    pub show_latency: bool,
    /// Deliver responses as a fragment stream instead of all at once
    pub stream_responses: bool,
    /// Failed load attempts tolerated before the session gives up
    pub max_load_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            echo_prompt: true,
            show_latency: true,
            stream_responses: false,
            max_load_attempts: 5,
        }
    }
}

impl SessionConfig {
    /// Echo each prompt into the display before its response
    pub fn with_echo_prompt(mut self, on: bool) -> Self {
        self.echo_prompt = on;
        self
    }

    /// Append per-request latency after each response
    pub fn with_show_latency(mut self, on: bool) -> Self {
        self.show_latency = on;
        self
    }

    /// Deliver responses as a fragment stream instead of all at once
    pub fn with_stream_responses(mut self, on: bool) -> Self {
        self.stream_responses = on;
        self
    }

    /// Failed load attempts tolerated before the session gives up
    pub fn with_max_load_attempts(mut self, attempts: u32) -> Self {
        self.max_load_attempts = attempts;
        self
    }
}

enum ModelState {
    AwaitingModel,
    Ready(Box<dyn TextModel>),
}

/// A chat session over an externally supplied loader.
pub struct ChatSession<L> {
    loader: L,
    config: SessionConfig,
    store: OptionStore,
    state: ModelState,
    load_failures: u32,
    busy: Arc<AtomicBool>,
}

impl<L: ModelLoader> ChatSession<L> {
    /// Create a session with default configuration.
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, SessionConfig::default())
    }

    /// Create a session with the given configuration.
    pub fn with_config(loader: L, config: SessionConfig) -> Self {
        Self {
            loader,
            config,
            store: OptionStore::default(),
            state: ModelState::AwaitingModel,
            load_failures: 0,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current options snapshot.
    pub fn options(&self) -> Arc<PredictOptions> {
        self.store.snapshot()
    }

    /// Whether a model is loaded.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    /// Shared flag hosts may watch to disable input while a request is in
    /// flight.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    /// Feed one line of user input through the session.
    ///
    /// In `AwaitingModel` the line is a model path; in `Ready` it is a slash
    /// command or a prompt. The host should clear its input line after every
    /// call and stop on [`Turn::Exit`].
    pub async fn submit(&mut self, line: &str, out: &mut dyn DisplaySink) -> Turn {
        if self.busy.load(Ordering::Acquire) {
            return Turn::Rejected;
        }
        if matches!(self.state, ModelState::AwaitingModel) {
            return self.load_model(line, out).await;
        }
        if line.starts_with('/') {
            self.dispatch(line, out)
        } else {
            self.generate(line, out).await
        }
    }

    async fn load_model(&mut self, line: &str, out: &mut dyn DisplaySink) -> Turn {
        if line.is_empty() {
            out.append("Enter the path of a model file to load.\n");
            return Turn::Continue;
        }
        let path = Path::new(line);
        match self.loader.load(path).await {
            Ok(model) => {
                info!(path = %path.display(), "model loaded");
                self.load_failures = 0;
                self.state = ModelState::Ready(model);
                out.clear();
                out.append(&self.help_text());
                Turn::Continue
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "model load failed");
                self.load_failures += 1;
                out.append(&format!("Error loading model: {line}!\n"));
                if self.load_failures >= self.config.max_load_attempts {
                    out.append("Cannot load model!  Exiting...\n");
                    Turn::Exit
                } else {
                    Turn::Continue
                }
            }
        }
    }

    fn dispatch(&mut self, line: &str, out: &mut dyn DisplaySink) -> Turn {
        match Command::parse(line) {
            Command::Set { key, value } => {
                self.set_option(line, &key, &value, out);
                Turn::Continue
            }
            Command::Values => {
                out.append(&self.store.formatted_values());
                Turn::Continue
            }
            Command::Clear => {
                out.clear();
                Turn::Continue
            }
            Command::Exit => Turn::Exit,
            Command::Help => {
                out.append(&self.help_text());
                Turn::Continue
            }
            Command::NewModel => {
                // dropping the handle releases the model
                self.state = ModelState::AwaitingModel;
                self.load_failures = 0;
                info!("model released");
                Turn::Continue
            }
            Command::Other => Turn::Continue,
        }
    }

    fn set_option(&mut self, line: &str, key: &str, value: &str, out: &mut dyn DisplaySink) {
        let Ok(parsed) = key.parse::<OptionKey>() else {
            // unknown keys are ignored
            return;
        };
        match self.store.apply(parsed, value) {
            Ok(()) => debug!(key = %parsed, value, "option updated"),
            Err(err) => {
                warn!(key = %parsed, value, error = %err, "option update rejected");
                out.append(&self.help_text());
                out.append(&format!(
                    "\nError!  \"{line}\" (\"/set {key} {value}\") is not valid!\n\n"
                ));
            }
        }
    }

    async fn generate(&mut self, prompt: &str, out: &mut dyn DisplaySink) -> Turn {
        let ModelState::Ready(model) = &self.state else {
            return Turn::Continue;
        };
        if self.config.echo_prompt {
            out.append(&format!("\n> {prompt} >\n\n"));
        }
        let options = self.store.snapshot();
        self.busy.store(true, Ordering::Release);
        let started = Instant::now();
        if self.config.stream_responses {
            match model.predict_stream(prompt, &options).await {
                Ok(mut stream) => {
                    while let Some(part) = stream.next().await {
                        match part {
                            Ok(fragment) => out.append(&fragment),
                            Err(err) => {
                                append_prediction_error(out, prompt, &err);
                                break;
                            }
                        }
                    }
                    out.append("\n");
                }
                Err(err) => append_prediction_error(out, prompt, &err),
            }
        } else {
            match model.predict(prompt, &options).await {
                Ok(text) => out.append(&format!("{text}\n")),
                Err(err) if err.is_internal() => {
                    warn!(error = %err, "prediction failed unexpectedly");
                    out.append("Unexpected Error getting response!\n\n");
                }
                Err(err) => append_prediction_error(out, prompt, &err),
            }
        }
        let elapsed = started.elapsed();
        if self.config.show_latency {
            out.append(&format!("({}ms)\n", elapsed.as_millis()));
        }
        debug!(elapsed_ms = elapsed.as_millis() as u64, "prediction round trip finished");
        self.busy.store(false, Ordering::Release);
        Turn::Continue
    }

    fn help_text(&self) -> String {
        let mut text = String::from("\nLocal Model Chat\n\n");
        if let ModelState::Ready(model) = &self.state {
            let describe = model.describe();
            if !describe.is_empty() {
                text.push_str(&describe);
                text.push_str("\n\n");
            }
        }
        text.push_str("Type /help for help.\n");
        text.push_str("     /newmodel for a new model.\n");
        for key in OptionKey::ALL {
            text.push_str(&format!(
                "     /set {} # to set {} to #.\n",
                key.name(),
                key.label()
            ));
        }
        text.push_str("     /values to get values of various parameters.\n");
        text.push_str("     /clear to clear this area.\n");
        text.push_str("     /exit to exit the program.\n");
        text
    }
}

fn append_prediction_error(out: &mut dyn DisplaySink, prompt: &str, err: &ChatError) {
    warn!(error = %err, "prediction failed");
    out.append(&format!(
        "Sorry, your prompt of \"{prompt}\" resulted in an error!\n{err}\n\n"
    ));
}
