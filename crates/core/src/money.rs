//! Integer money arithmetic.
//!
//! All monetary amounts are carried in the smallest currency unit (cents).
//! Intermediate products widen to `u128` so line math cannot overflow.

use crate::error::{DomainError, DomainResult};

/// Monetary amount in the smallest currency unit (e.g., cents).
pub type Cents = u64;

/// Line subtotal: unit amount times a positive quantity.
pub fn line_subtotal(unit_amount: Cents, quantity: i64) -> DomainResult<Cents> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    let wide = unit_amount as u128 * quantity as u128;
    u64::try_from(wide).map_err(|_| DomainError::validation("line subtotal overflows"))
}

/// `percent`% of `amount`, rounded half-up to the nearest cent.
pub fn percent_half_up(amount: Cents, percent: u64) -> Cents {
    let wide = amount as u128 * percent as u128;
    ((wide + 50) / 100) as u64
}
