use uuid::Uuid;

/// Error type shared by ports, adapters and services.
///
/// Adapters translate storage failures into these kinds; services
/// propagate them unchanged to the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("cart {0} is empty")]
    EmptyCart(Uuid),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        assert_eq!(
            Error::not_found("product", id).to_string(),
            format!("product {id} not found")
        );
        assert_eq!(
            Error::InsufficientStock {
                product_id: id,
                requested: 3,
                available: 1
            }
            .to_string(),
            format!("insufficient stock for product {id}: requested 3, available 1")
        );
    }
}
