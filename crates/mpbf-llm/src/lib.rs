//! # mpbf-llm
//!
//! The natural-language side of the MPBF assistant:
//!
//! - `CompletionClient`: the seam to the LLM completion endpoint, with
//!   an HTTP implementation and a mock for tests
//! - `IntentClassifier`: free text plus a KPI snapshot in, a structured
//!   `IntentResult` out, degrading to `intent="unknown"` on any failure
//! - `FieldExtractor`: per-entity structured field extraction with a
//!   constrained JSON-only prompt
//!
//! Every JSON payload coming back from the model is validated against a
//! compiled JSON schema before use; a payload that does not validate is
//! treated the same as a failed call.

pub mod classifier;
pub mod client;
pub mod error;
pub mod extractor;
pub mod prompts;
pub mod schema;

pub use classifier::IntentClassifier;
pub use client::{CompletionClient, HttpCompletionClient, MockCompletionClient};
pub use error::LlmError;
pub use extractor::{EntityKind, FieldExtractor};
