//! Tests for the on-device transports

mod local_fallback;
