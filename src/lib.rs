//! promptline
//!
//! Session core for chatting with a locally loaded language model.
//!
//! The crate owns the pieces of a line-oriented chat front-end that are worth
//! owning: the slash-command sub-language (`/help`, `/set`, `/values`,
//! `/clear`, `/newmodel`, `/exit`), the typed generation-parameter store with
//! its immutable snapshot lifecycle, and the session state machine that
//! shuttles between "waiting for a model path" and "chatting". Model loading
//! and text generation stay behind the [`engine`] traits; the display and the
//! input line belong to the host.
#![deny(unsafe_code)]

pub mod command;
pub mod engine;
pub mod error;
pub mod observability;
pub mod options;
pub mod session;
pub mod types;

pub use error::ChatError;
pub use session::{ChatSession, DisplaySink, SessionConfig, Turn};
pub use types::PredictOptions;
