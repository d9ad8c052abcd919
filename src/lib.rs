pub mod arbitrage;
pub mod commission;
pub mod compare;
pub mod error;
pub mod event_fetch;
pub mod http_client;
pub mod logging;
pub mod merge;
pub mod odds_fetch;
pub mod report;
pub mod types;
