pub mod engine;
pub mod manager;
pub mod memory;
pub mod postgres;

pub use engine::{Engine, EngineError};
pub use manager::DatabaseManager;
pub use memory::MemoryEngine;
pub use postgres::PgEngine;
