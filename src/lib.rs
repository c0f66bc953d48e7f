//! Atelier - guided interior design requests for the studio backend
//!
//! The library holds the wizard core (field store, step sequencer,
//! single-flight submission, result cache, project prefill) and the
//! reqwest client it talks through. The `atelier` binary wraps it in a CLI.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod logging;
pub mod types;
pub mod wizard;
