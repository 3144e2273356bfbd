//! cheroterm library
//!
//! Exposes the page cache, the site client and the terminal app so the binary
//! and the integration tests share them.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod form;
pub mod logging;
pub mod region;
pub mod section;
pub mod toggle;
pub mod ui;
pub mod worker;
