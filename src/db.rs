pub mod client;
pub mod memory_store;
pub mod pg_store;

pub use client::{DataClient, Embed, Query, Row};
pub use memory_store::MemoryDataClient;
pub use pg_store::PgDataClient;
