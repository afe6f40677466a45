//! Airhub Provider Module
//!
//! eSIM plan reseller API: account login and plan information by country.

mod client;
mod models;

pub use client::AirhubClient;
