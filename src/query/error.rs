use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
}
