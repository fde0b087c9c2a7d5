pub mod analytics;
pub mod notify;
pub mod storage;
