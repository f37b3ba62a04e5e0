//! Error type shared by the product and order repository ports.

use crate::domain::{OrderValidationError, ProductValidationError, ReportWindowError};

use super::define_port_error;

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum RepositoryError {
        /// Identifier text was malformed; the store was never contacted.
        InvalidId { id: String } => "invalid identifier '{id}'",
        /// Caller-supplied fields failed validation.
        Validation { message: String } => "validation failed: {message}",
        /// No entity with this identifier exists.
        NotFound { entity: String, id: String } => "{entity} {id} not found",
        /// The document store failed to execute an operation.
        Store { message: String } => "document store failed: {message}",
        /// The report pipeline failed or returned undecodable rows.
        Aggregation { message: String } => "report aggregation failed: {message}",
    }
}

impl From<ProductValidationError> for RepositoryError {
    fn from(value: ProductValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<OrderValidationError> for RepositoryError {
    fn from(value: OrderValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<ReportWindowError> for RepositoryError {
    fn from(value: ReportWindowError) -> Self {
        Self::validation(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_names_entity_and_id() {
        let err = RepositoryError::not_found("order", "65973e000102030405060708");
        assert_eq!(err.to_string(), "order 65973e000102030405060708 not found");
    }

    #[rstest]
    fn validation_errors_keep_their_message() {
        let err = RepositoryError::from(ProductValidationError::EmptyName);
        assert_eq!(
            err,
            RepositoryError::validation("product name must not be empty")
        );
    }
}
