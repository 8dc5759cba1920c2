#![forbid(unsafe_code)]

pub mod config;
pub mod enrich;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod throttle;
