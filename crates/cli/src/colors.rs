// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help and event output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use clap::builder::styling::Styles;

use crate::env;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers and event tags: pastel cyan/steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Timestamps and secondary detail: medium grey
    pub const CONTEXT: u8 = 245;
    /// Failures: soft red
    pub const ALERT: u8 = 167;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Format a 256-color ANSI escape sequence for foreground color.
fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

/// ANSI reset sequence.
const RESET: &str = "\x1b[0m";

/// Wrap `text` in the given color.
pub fn paint(code: u8, text: &str) -> String {
    format!("{}{}{}", fg256(code), text, RESET)
}

/// Apply header color (section titles) to text.
pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

/// Apply literal color (commands, options) to text.
pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

/// Apply context color (timestamps, hints) to text.
pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// clap Styles matching the event output colors.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let color = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));

    Styles::styled()
        .header(color(codes::HEADER))
        .usage(color(codes::HEADER))
        .literal(color(codes::LITERAL))
        .placeholder(color(codes::CONTEXT))
        .valid(color(codes::CONTEXT))
}

/// Colorize an examples help block.
///
/// Lines ending with `:` are headers. In other lines the command is
/// everything before the first run of two spaces; it is shown as a
/// literal and the description is left alone.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    colorize_examples(text)
}

pub(crate) fn colorize_examples(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 128);

    for line in text.lines() {
        if !result.is_empty() {
            result.push('\n');
        }

        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            result.push_str(indent);
            result.push_str(&header(trimmed));
            continue;
        }

        match trimmed.find("  ") {
            Some(cmd_end) => {
                result.push_str(indent);
                result.push_str(&literal(&trimmed[..cmd_end]));
                result.push_str(&trimmed[cmd_end..]);
            }
            None => result.push_str(line),
        }
    }

    result
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
