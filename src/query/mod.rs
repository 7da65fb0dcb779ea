pub mod error;
pub mod sql;
pub mod translate;
pub mod types;

pub use error::QueryError;
pub use translate::translate;
pub use types::*;
