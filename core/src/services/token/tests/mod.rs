//! Tests for the credential signer and token sweep
