//! Request extractors shared by the API handlers.

pub mod client;

pub use client::ClientContext;
