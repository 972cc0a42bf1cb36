use thiserror::Error;

pub type TypesResult<T> = Result<T, TypesError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("connection identity must not be empty")]
    EmptyConnectionIdentity,
}
