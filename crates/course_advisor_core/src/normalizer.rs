//! crates/course_advisor_core/src/normalizer.rs
//!
//! Recovers a JSON value from raw completion text that may be wrapped in prose
//! or markdown code fences. No schema checks happen here.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// The outer JSON shape the caller expects, used by the bracket-slice strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Array => ('[', ']'),
            JsonShape::Object => ('{', '}'),
        }
    }
}

/// Which strategy produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    CodeFence,
    BracketSlice,
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Could not extract valid JSON from response")]
    NoJson,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("fence pattern is valid")
    })
}

/// Parses `text` into a JSON value, trying each strategy in order.
pub fn normalize(text: &str, shape: JsonShape) -> Result<Value, NormalizeError> {
    normalize_with_strategy(text, shape).map(|(value, _)| value)
}

/// Like [`normalize`], but also reports which strategy succeeded.
pub fn normalize_with_strategy(
    text: &str,
    shape: JsonShape,
) -> Result<(Value, Strategy), NormalizeError> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return Ok((value, Strategy::Direct));
    }

    if let Some(interior) = fence_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
    {
        if let Ok(value) = serde_json::from_str::<Value>(interior) {
            return Ok((value, Strategy::CodeFence));
        }
    }

    let (open, close) = shape.delimiters();
    if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok((value, Strategy::BracketSlice));
            }
        }
    }

    Err(NormalizeError::NoJson)
}
