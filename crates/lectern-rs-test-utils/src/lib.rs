//! Test helpers shared across Lectern crates.

pub mod context;
pub mod embedding;
pub mod engine;

pub use context::base_tool_context;
pub use embedding::{FailingEmbedder, KEYWORDS, KeywordEmbedder, RecordingEmbedder};
pub use engine::{keyword_engine, temp_engine, temp_engine_with};
