pub mod config;
pub mod dashboard;
pub mod export;
pub mod http_client;
pub mod locate;
pub mod logging;
pub mod per90;
pub mod percentile;
pub mod performance;
pub mod population;
pub mod profile;
pub mod provider;
pub mod query;
pub mod rating;
pub mod synthetic;
pub mod zones;
