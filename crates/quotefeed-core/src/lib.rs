//! Core types and feed composition logic for the quote feed.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::FeedStore`]; the HTTP layer drives
//! [`feed::FeedEngine`] once per request.

pub mod actor;
pub mod affinity;
pub mod config;
pub mod error;
pub mod feed;
pub mod interaction;
pub mod quote;
pub mod sample;
pub mod store;
pub mod visibility;

pub use error::{Error, Result};
