//! Repositories over the shared [`Store`](crate::store::Store).
//!
//! Every function here follows one contract: queries return plain values or
//! `Option` (a missing id is `None`), commands return [`Result`](crate::errors::Result)
//! and fail with a typed not-found or validation error.

/// Admin dashboard, admin-guarded actions and adoption review details
pub mod admin;
/// Adoption requests and the approval/rejection workflow
pub mod adoption;
/// Contact form messages
pub mod contact;
/// Orders and their totals
pub mod order;
/// Pet listings
pub mod pet;
/// Product inventory
pub mod product;
/// Registered accounts
pub mod user;

use crate::errors::{Error, Result};
use uuid::Uuid;

/// A fresh id such as `user-3f9c2a1b7d04`.
pub(crate) fn generate_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &raw[..12])
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub(crate) fn require_email(email: &str) -> Result<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(Error::validation("Please enter a valid email"));
    }
    Ok(())
}

pub(crate) fn require_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id("ORD");
        assert!(id.starts_with("ORD-"));
        assert_eq!(id.len(), "ORD-".len() + 12);
        assert_ne!(id, generate_id("ORD"));
    }

    #[test]
    fn test_validators() {
        assert!(require_text("Name", "Rex").is_ok());
        assert!(matches!(
            require_text("Name", "   "),
            Err(Error::Validation { .. })
        ));
        assert!(require_email("a@b.c").is_ok());
        assert!(require_email("nope").is_err());
        assert!(require_price(0.0).is_ok());
        assert!(matches!(
            require_price(-1.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(require_price(f64::NAN).is_err());
    }
}
