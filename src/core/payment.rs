//! Payment capture.
//!
//! Cash payments must cover the outstanding balance and produce change; card and
//! transfer payments are taken at face value.

pub use crate::entities::order::PaymentMethod;

use crate::core::round_cents;
use crate::errors::{Error, Result};

/// Tolerance for comparing cash amounts that went through float arithmetic.
const CENT_EPSILON: f64 = 0.005;

/// Result of a successful capture.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    /// How it was paid
    pub method: PaymentMethod,
    /// Amount applied to the order balance
    pub amount: f64,
    /// Cash handed over, when counted
    pub received: Option<f64>,
    /// Cash returned to the customer
    pub change: f64,
}

/// Captures payment of `outstanding`.
///
/// # Errors
/// - `InvalidAmount` when a received amount is negative or not finite
/// - `InsufficientPayment` when cash received is below the outstanding balance
pub fn capture(
    outstanding: f64,
    method: PaymentMethod,
    received: Option<f64>,
) -> Result<PaymentReceipt> {
    match method {
        PaymentMethod::Cash => {
            let received = received.unwrap_or(outstanding);
            if !received.is_finite() || received < 0.0 {
                return Err(Error::InvalidAmount { amount: received });
            }
            if received + CENT_EPSILON < outstanding {
                return Err(Error::InsufficientPayment {
                    received,
                    outstanding,
                });
            }
            Ok(PaymentReceipt {
                method,
                amount: outstanding,
                received: Some(received),
                change: round_cents((received - outstanding).max(0.0)),
            })
        }
        PaymentMethod::Card | PaymentMethod::Transfer => Ok(PaymentReceipt {
            method,
            amount: outstanding,
            received: None,
            change: 0.0,
        }),
    }
}

/// Validates a partial payment of `amount` against `outstanding`.
pub fn check_partial(amount: f64, outstanding: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    if amount > outstanding + CENT_EPSILON {
        return Err(Error::validation(format!(
            "Partial payment {amount:.2} exceeds outstanding balance {outstanding:.2}"
        )));
    }
    Ok(())
}
