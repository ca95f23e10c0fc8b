#![warn(missing_docs)]
//! stockwatch watches product pages and sends an email when a product comes
//! back in stock or otherwise changes in a way the user asked to hear about.

pub mod cmd;
pub mod config;
pub mod engine;
pub mod fetcher;
pub mod loader;
pub mod models;
pub mod notification;
pub mod persistence;
pub mod runner;
pub mod test_helpers;
