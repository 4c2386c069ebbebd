// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal terminal color support for status output.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Running / healthy.
    pub const GOOD: u8 = 114;
    /// Failed / stopped-unexpectedly.
    pub const BAD: u8 = 203;
    /// Starting / transitional.
    pub const PENDING: u8 = 221;
    /// Muted / secondary text.
    pub const MUTED: u8 = 245;
}

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, otherwise a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .usage(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::MUTED)))))
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::MUTED)))))
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

/// Colorize `text` with the palette entry named by `state` (§3 `ProcessState`),
/// falling back to plain text when color is disabled.
pub fn state_label(state: eos_core::ProcessState) -> String {
    let code = match state {
        eos_core::ProcessState::Running => codes::GOOD,
        eos_core::ProcessState::Failed => codes::BAD,
        eos_core::ProcessState::Starting | eos_core::ProcessState::Unknown => codes::PENDING,
        eos_core::ProcessState::Stopped => codes::MUTED,
    };
    let label = state.to_string();
    if should_colorize() {
        format!("{}{label}{RESET}", fg256(code))
    } else {
        label
    }
}
