//! Common utilities and helpers

pub mod time;
