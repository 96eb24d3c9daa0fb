use crate::error::FormError;

/// Result type for form data access
pub type FormResult<T> = Result<T, FormError>;
