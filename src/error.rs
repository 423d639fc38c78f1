use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RiverError {
    #[error("Task {0} is not submittable: must be pending and never started")]
    NotSubmittable(Uuid),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RiverError>;
