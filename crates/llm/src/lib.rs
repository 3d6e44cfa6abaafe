//! Generation backends for inkpipe.
//!
//! One capability trait, [`LlmClient`], with an implementation per provider.
//!
//! # Providers
//! - **Gemini**: Google `generateContent`
//! - **DeepSeek**: OpenAI-compatible chat completions
//!
//! # Example
//! ```no_run
//! use inkpipe_llm::{create_client, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("deepseek", "sk-...", None, None)?;
//! let request = LlmRequest::new("Suggest three titles about habits", "deepseek-chat");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{client_for_config, create_client};
pub use providers::{DeepSeekClient, GeminiClient};
pub use types::ProviderType;
