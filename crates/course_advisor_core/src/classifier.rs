//! crates/course_advisor_core/src/classifier.rs
//!
//! Local check for greetings and other prompts too vague to recommend courses for.

const GENERIC_TERMS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "test",
    "sample",
    "example",
    "good morning",
    "good afternoon",
    "good evening",
    "what's up",
    "how are you",
    "help",
    "ping",
];

/// Returns `true` when `input` is too generic to send to the completion service.
pub fn is_generic_prompt(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();

    if GENERIC_TERMS.contains(&lowered.as_str()) {
        return true;
    }

    if GENERIC_TERMS.iter().any(|term| lowered.starts_with(term)) {
        return true;
    }

    let word_count = lowered.split_whitespace().count();
    word_count < 3 && lowered.chars().count() < 15
}
