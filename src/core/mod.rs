pub mod balance;
pub mod errors;
pub mod locks;
pub mod models;
pub mod reconcile;
pub mod services;
pub mod summary;
