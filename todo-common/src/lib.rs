pub mod cosmos;
pub mod metrics;
pub mod store;
