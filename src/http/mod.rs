//! HTTP transport and the stateless Basic-Auth fetcher built on it.

mod basic;
mod client;

pub use basic::BasicAuthFetcher;
pub use client::{ClientConfig, DEFAULT_TIMEOUT_SECS, HttpClient, RawResponse, SuccessBand};
