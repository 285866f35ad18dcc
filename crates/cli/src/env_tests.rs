// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::MAILPULSE_CONFIG, "MAILPULSE_CONFIG");
    assert_eq!(vars::MAILPULSE_TOKEN, "MAILPULSE_TOKEN");
    assert_eq!(vars::NO_COLOR, "NO_COLOR");
    assert_eq!(vars::COLOR, "COLOR");
}

#[test]
fn test_token_lifecycle() {
    std::env::remove_var("MAILPULSE_TOKEN");
    assert_eq!(token(), None);

    std::env::set_var("MAILPULSE_TOKEN", "   ");
    assert_eq!(token(), None);

    std::env::set_var("MAILPULSE_TOKEN", "abc.def.ghi");
    assert_eq!(token().as_deref(), Some("abc.def.ghi"));

    std::env::remove_var("MAILPULSE_TOKEN");
}

#[test]
fn test_force_color_requires_one() {
    std::env::set_var("COLOR", "yes");
    assert!(!force_color());
    std::env::set_var("COLOR", "1");
    assert!(force_color());
    std::env::remove_var("COLOR");
}
