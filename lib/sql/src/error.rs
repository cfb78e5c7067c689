use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("open error: {0}")]
    Open(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Exec(String),
}
