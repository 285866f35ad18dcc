// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

/// `{"sub":"user-42","exp":4102444800}` with an unsigned header.
const JWT: &str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ1c2VyLTQyIiwiZXhwIjo0MTAyNDQ0ODAwfQ.sig";

#[test]
fn test_describe_jwt() {
    let credential = Credential::new(JWT).unwrap();

    let text = describe(&credential, "/home/u/.config/mailpulse/token");

    assert_eq!(
        text,
        "token:   eyJh....sig\n\
         subject: user-42\n\
         expires: 2100-01-01 00:00:00 UTC\n\
         source:  /home/u/.config/mailpulse/token"
    );
}

#[test]
fn test_describe_opaque_token() {
    let credential = Credential::new("opaque-token-value").unwrap();

    let text = describe(&credential, "MAILPULSE_TOKEN");

    assert!(text.contains("token:   opaq...alue"));
    assert!(text.contains("subject: -"));
    assert!(text.contains("expires: -"));
    assert!(!text.contains("opaque-token-value"));
}

#[test]
fn test_describe_marks_expired() {
    // {"sub":"u1","exp":1000}
    let credential =
        Credential::new("eyJhbGciOiJub25lIn0.eyJzdWIiOiJ1MSIsImV4cCI6MTAwMH0.sig").unwrap();

    let text = describe(&credential, "file");

    assert!(text.contains("1970-01-01 00:16:40 UTC (expired)"));
}
