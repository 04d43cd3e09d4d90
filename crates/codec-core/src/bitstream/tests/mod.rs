//! Frame serializer test suite
//!
//! Per-format wire layout checks plus cross-format properties.

mod utils;

mod mime_tests;
