use crate::{
    Error,
    error::{StorageError, ValidationError},
};

/// Maps driver errors into [`StorageError::Database`].
///
/// ```rust,ignore
/// use emporium_core::error::utilities::DatabaseResultExt;
///
/// query.execute(&pool).await.map_db_err_with_context("Failed to delete product")?;
/// ```
pub trait DatabaseResultExt<T> {
    fn map_db_err(self) -> Result<T, Error>;

    /// Like [`map_db_err`](Self::map_db_err), prefixing the message with `context`.
    fn map_db_err_with_context(self, context: &str) -> Result<T, Error>;
}

impl<T, E: std::fmt::Display> DatabaseResultExt<T> for Result<T, E> {
    fn map_db_err(self) -> Result<T, Error> {
        self.map_err(|e| Error::Storage(StorageError::Database(e.to_string())))
    }

    fn map_db_err_with_context(self, context: &str) -> Result<T, Error> {
        self.map_err(|e| Error::Storage(StorageError::Database(format!("{context}: {e}"))))
    }
}

/// Turns a missing builder field into [`ValidationError::MissingField`].
pub trait RequiredFieldExt<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError>;
}

impl<T> RequiredFieldExt<T> for Option<T> {
    fn require_field(self, field_name: &str) -> Result<T, ValidationError> {
        self.ok_or_else(|| ValidationError::MissingField(format!("{field_name} is required")))
    }
}
