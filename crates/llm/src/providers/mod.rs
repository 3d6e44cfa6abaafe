//! Generation backend implementations.

pub mod deepseek;
pub mod gemini;

pub use deepseek::DeepSeekClient;
pub use gemini::GeminiClient;
