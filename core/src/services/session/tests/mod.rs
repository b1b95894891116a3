//! Tests for the session authority
