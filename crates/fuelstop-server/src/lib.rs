//! Shared library surface for the fuel stop server and its tests.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod geocode;
pub mod providers;
pub mod state;
