//! Core types for rapid_textclean
//!
//! This module defines the fundamental data structures used throughout the
//! library: the pipeline value that flows between stages, the shape tags
//! used in diagnostics, and the supported-language enumeration.

use crate::errors::{Result, TextCleanError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Pipeline value
// ============================================================================

/// The datum threaded through pipeline execution.
///
/// A value is either a single text unit or an ordered sequence of token
/// units. Stages may change the shape (e.g. `tokenize_words` turns
/// [`Value::Text`] into [`Value::Tokens`]); the execution engine propagates
/// whatever shape the previous stage returned without normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single text unit.
    Text(String),
    /// An ordered sequence of token units.
    Tokens(Vec<String>),
}

impl Value {
    /// The shape tag for this value, used in fault reports.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Text(_) => Shape::Text,
            Value::Tokens(_) => Shape::Tokens,
        }
    }

    /// The safe fallback a stage returns after a contract violation:
    /// an empty value of the stage's output shape.
    pub fn empty(shape: Shape) -> Value {
        match shape {
            Shape::Text => Value::Text(String::new()),
            Shape::Tokens => Value::Tokens(Vec::new()),
        }
    }

    /// Returns `true` for an empty string or an empty token sequence.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(text) => text.is_empty(),
            Value::Tokens(tokens) => tokens.is_empty(),
        }
    }

    /// Borrow the text unit, if this value is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Tokens(_) => None,
        }
    }

    /// Borrow the token sequence, if this value is one.
    pub fn as_tokens(&self) -> Option<&[String]> {
        match self {
            Value::Tokens(tokens) => Some(tokens),
            Value::Text(_) => None,
        }
    }

    /// Consume the value, yielding the text unit if it is one.
    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(text) => Some(text),
            Value::Tokens(_) => None,
        }
    }

    /// Consume the value, yielding the token sequence if it is one.
    pub fn into_tokens(self) -> Option<Vec<String>> {
        match self {
            Value::Tokens(tokens) => Some(tokens),
            Value::Text(_) => None,
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(tokens: Vec<String>) -> Self {
        Value::Tokens(tokens)
    }
}

impl From<&[&str]> for Value {
    fn from(tokens: &[&str]) -> Self {
        Value::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

// ============================================================================
// Shape
// ============================================================================

/// The two shapes a [`Value`] can take, named for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// A single text unit.
    Text,
    /// An ordered sequence of token units.
    Tokens,
}

impl Shape {
    /// Returns the user-facing name used in reports and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Text => "text",
            Shape::Tokens => "tokens",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Language
// ============================================================================

/// Languages with built-in stopword support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
    Pt,
    De,
    Ru,
    Ar,
}

/// ISO 639-1 codes accepted by [`Language::from_code`].
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "pt", "de", "ru", "ar"];

impl Language {
    /// Parse an ISO 639-1 code. Unsupported codes fail fast at
    /// construction time, never during pipeline execution.
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            "fr" => Ok(Language::Fr),
            "pt" => Ok(Language::Pt),
            "de" => Ok(Language::De),
            "ru" => Ok(Language::Ru),
            "ar" => Ok(Language::Ar),
            other => Err(TextCleanError::unsupported_language(
                other,
                SUPPORTED_LANGUAGES,
            )),
        }
    }

    /// The ISO 639-1 code for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Pt => "pt",
            Language::De => "de",
            Language::Ru => "ru",
            Language::Ar => "ar",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
