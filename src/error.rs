use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Order with id #{0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    ProductLookup(String),

    #[error("storage error")]
    Storage(#[from] sea_orm::DbErr),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// RPC-level status code carried in the command response envelope.
    pub fn status_code(&self) -> u32 {
        match self {
            AppError::InvalidArgument(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::ProductLookup(_) => 502,
            AppError::Storage(_) | AppError::Internal(_) => 500,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_echoes_the_identifier() {
        let id = Uuid::new_v4();
        let err = AppError::NotFound(id);
        assert_eq!(err.to_string(), format!("Order with id #{id} not found"));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn storage_errors_do_not_leak_internals() {
        let err = AppError::Storage(sea_orm::DbErr::Custom("connection reset".into()));
        assert_eq!(err.to_string(), "storage error");
        assert_eq!(err.status_code(), 500);
    }
}
