pub mod connection;
pub mod models;
pub mod store;
pub mod tables;

pub use connection::connect;
pub use store::{RecordStore, StoreError, StoreResult};
