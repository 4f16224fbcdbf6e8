mod memory_store;
mod models;
mod schema;
mod statements;
mod store;
mod trait_def;

pub use memory_store::InMemoryWarehouseStore;
pub use models::*;
pub use schema::WAREHOUSE_VERSIONED_SCHEMAS;
pub use statements::{StatementOverrides, Statements};
pub use store::SqliteWarehouseStore;
pub use trait_def::WarehouseStore;
