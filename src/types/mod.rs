//! Data types shared across the session core.

mod params;

pub use params::{PredictOptions, PredictOptionsBuilder};
