pub mod commands;
pub mod error;
pub mod http;
pub mod poll;
pub mod runtime;
pub mod session;
pub mod survey;
