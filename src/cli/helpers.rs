//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use dialoguer::{theme::ColorfulTheme, Confirm as ConfirmPrompt};

use crate::core::mutation::Confirm;

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts characters rather than bytes so names like "Dalupiri Abaqueña"
/// never split inside a code point.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Format a peso amount with thousands separators
pub fn format_peso(amount: f64) -> String {
    let whole = amount.trunc().abs() as u64;
    let cents = ((amount.abs() - amount.trunc().abs()) * 100.0).round() as u64;
    let (whole, cents) = if cents == 100 { (whole + 1, 0) } else { (whole, cents) };

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₱{}.{:02}", sign, grouped, cents)
}

/// Interactive yes/no prompt for destructive actions
///
/// With `--yes` every prompt is answered up front. Without a terminal the
/// prompt cannot be shown and the answer is "no".
pub struct PromptConfirm {
    assume_yes: bool,
}

impl PromptConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ConfirmPrompt::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Abaqueña Farmers", 8), "Abaqu...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_format_peso() {
        assert_eq!(format_peso(0.0), "₱0.00");
        assert_eq!(format_peso(8550.0), "₱8,550.00");
        assert_eq!(format_peso(1234567.891), "₱1,234,567.89");
        assert_eq!(format_peso(-12.5), "-₱12.50");
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(PromptConfirm::new(true).confirm("Delete?"));
    }
}
