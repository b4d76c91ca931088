//! Text generation.

pub mod text;

pub use text::{generate_text, GenerateTextResult, GenerationStep, MAX_TOOL_ITERATIONS};
