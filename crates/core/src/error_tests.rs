// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn invalid_credential_display_includes_hint() {
    let err = Error::InvalidCredential("token is empty".into());
    let msg = err.to_string();
    assert!(msg.contains("token is empty"));
    assert!(msg.contains("hint:"));
}
