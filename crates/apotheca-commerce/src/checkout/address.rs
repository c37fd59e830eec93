//! Shipping address with historical field-name normalization.

use serde::{Deserialize, Serialize};

/// A shipping address snapshot.
///
/// Older clients sent `streetAddress` for `street` and `phoneNo` for
/// `phone`; both spellings are accepted on input and normalized to the
/// canonical field names on output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    /// Recipient name.
    pub name: String,
    /// Street address.
    #[serde(alias = "streetAddress")]
    pub street: String,
    /// City.
    pub city: String,
    /// State/province.
    pub state: Option<String>,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
    /// Contact phone number.
    #[serde(alias = "phoneNo")]
    pub phone: String,
}

impl ShippingAddress {
    /// Create a new address.
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            city: city.into(),
            state: None,
            postal_code: postal_code.into(),
            country: country.into(),
            phone: phone.into(),
        }
    }

    /// Check if the address carries everything delivery needs.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.street.is_empty()
            && !self.city.is_empty()
            && !self.postal_code.is_empty()
            && !self.country.is_empty()
            && !self.phone.is_empty()
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.clone(), self.city.clone()];
        if let Some(ref state) = self.state {
            parts.push(state.clone());
        }
        parts.push(self.postal_code.clone());
        parts.push(self.country.clone());
        parts.join(", ")
    }
}
