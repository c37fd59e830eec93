//! Deterministic pricing: subtotal, delivery fee, tax and total.
//!
//! The same rules price a checkout quote and a cart's derived totals, so
//! the two can never drift apart.

use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Named pricing configuration.
///
/// Thresholds and rates are deployment configuration, not embedded
/// constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Currency every amount is priced in.
    pub currency: Currency,
    /// Tax rate applied to the subtotal (e.g., 0.18 for 18% GST).
    pub tax_rate: f64,
    /// Flat delivery fee below the free-delivery threshold.
    pub delivery_fee: Money,
    /// Subtotal at or above which delivery is free.
    pub free_delivery_threshold: Money,
}

impl PricingConfig {
    /// Create a pricing configuration with amounts in smallest units.
    pub fn new(currency: Currency, tax_rate: f64, delivery_fee: i64, free_delivery_threshold: i64) -> Self {
        Self {
            currency,
            tax_rate,
            delivery_fee: Money::new(delivery_fee, currency),
            free_delivery_threshold: Money::new(free_delivery_threshold, currency),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        // ₹50 flat fee, free delivery from ₹500, 18% GST.
        Self::new(Currency::INR, 0.18, 50_00, 500_00)
    }
}

/// Complete pricing breakdown for a cart or order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Totals {
    /// Sum of unit price × quantity over all lines.
    pub subtotal: Money,
    /// Delivery fee (zero at or above the free-delivery threshold).
    pub delivery_fee: Money,
    /// Tax on the subtotal, rounded half-up in smallest units.
    pub tax: Money,
    /// Final total (subtotal + delivery fee + tax).
    pub total: Money,
}

impl Totals {
    /// All-zero totals in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            delivery_fee: Money::zero(currency),
            tax: Money::zero(currency),
            total: Money::zero(currency),
        }
    }

    /// Price a checkout selection.
    ///
    /// Fails with `InvalidAmount` when the subtotal is not positive.
    pub fn quote(
        lines: impl IntoIterator<Item = (Money, i64)>,
        config: &PricingConfig,
    ) -> Result<Self, CommerceError> {
        let subtotal = sum_lines(lines, config.currency)?;
        if !subtotal.is_positive() {
            return Err(CommerceError::InvalidAmount(subtotal.amount_minor));
        }
        Self::breakdown(subtotal, config)
    }

    /// Recompute derived totals for a cart.
    ///
    /// An empty cart yields all-zero totals with no delivery fee.
    pub fn for_cart(
        lines: impl IntoIterator<Item = (Money, i64)>,
        config: &PricingConfig,
    ) -> Result<Self, CommerceError> {
        let subtotal = sum_lines(lines, config.currency)?;
        if !subtotal.is_positive() {
            return Ok(Self::zero(config.currency));
        }
        Self::breakdown(subtotal, config)
    }

    fn breakdown(subtotal: Money, config: &PricingConfig) -> Result<Self, CommerceError> {
        let delivery_fee = if subtotal.amount_minor >= config.free_delivery_threshold.amount_minor {
            Money::zero(config.currency)
        } else {
            config.delivery_fee
        };
        let tax = subtotal.multiply_rate(config.tax_rate);
        let total = checked_add(checked_add(subtotal, delivery_fee)?, tax)?;
        Ok(Self {
            subtotal,
            delivery_fee,
            tax,
            total,
        })
    }
}

fn sum_lines(
    lines: impl IntoIterator<Item = (Money, i64)>,
    currency: Currency,
) -> Result<Money, CommerceError> {
    let mut subtotal = Money::zero(currency);
    for (unit_price, quantity) in lines {
        let line_total = unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        subtotal = checked_add(subtotal, line_total)?;
    }
    Ok(subtotal)
}

fn checked_add(a: Money, b: Money) -> Result<Money, CommerceError> {
    a.try_add(&b).ok_or_else(|| {
        if a.currency != b.currency {
            CommerceError::CurrencyMismatch {
                expected: a.currency.code().to_string(),
                got: b.currency.code().to_string(),
            }
        } else {
            CommerceError::Overflow
        }
    })
}
