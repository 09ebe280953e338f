//! Wire types, event-stream decoding and configuration shared by the
//! Euphonium control panel.

pub mod config;
pub mod platform;
pub mod protocol;
pub mod sse;
