//! Provider identification.

use inkpipe_core::config::{default_model, provider_models};

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    DeepSeek,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::DeepSeek => "deepseek",
        }
    }

    /// Public API base URL.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::DeepSeek => "https://api.deepseek.com",
        }
    }

    /// Models offered for interactive selection, default first.
    pub fn models(&self) -> &'static [&'static str] {
        provider_models(self.as_str())
    }

    pub fn default_model(&self) -> &'static str {
        default_model(self.as_str())
    }
}
