//! Line items and the input accepted when adding one.

use std::fmt;

use basket_core::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a purchasable variant (size, color, ...). The merge key for
/// cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    /// Parses a variant identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the identifier is blank.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(
                "variant id must not be empty".to_owned(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for VariantId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// What a caller supplies when adding a variant to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Variant being added.
    pub variant_id: String,
    /// Owning product, for display.
    #[serde(default)]
    pub product_id: Option<String>,
    /// Product name, for display.
    #[serde(default)]
    pub product_name: Option<String>,
    /// Price per unit at the time of the add.
    pub unit_price: Decimal,
    /// Product image, for display.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Variant label (e.g. "Large / Blue"), for display.
    #[serde(default)]
    pub variant_name: Option<String>,
}

impl LineItemInput {
    /// Creates an input with only the required fields set.
    #[must_use]
    pub fn new(variant_id: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            variant_id: variant_id.into(),
            product_id: None,
            product_name: None,
            unit_price,
            image_url: None,
            variant_name: None,
        }
    }

    /// Sets the product id and name.
    #[must_use]
    pub fn with_product(mut self, product_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self.product_name = Some(name.into());
        self
    }

    /// Sets the variant label.
    #[must_use]
    pub fn with_variant_name(mut self, variant_name: impl Into<String>) -> Self {
        self.variant_name = Some(variant_name.into());
        self
    }

    /// Sets the image URL.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Validates the input and turns it into a line with the given quantity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the variant id is blank or the
    /// unit price is negative.
    pub fn into_line_item(self, quantity: u32) -> Result<LineItem, DomainError> {
        let variant_id = VariantId::parse(self.variant_id)?;
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(DomainError::Validation(format!(
                "unit price for variant {variant_id} must not be negative, got {}",
                self.unit_price
            )));
        }
        Ok(LineItem {
            variant_id,
            product_id: self.product_id,
            product_name: self.product_name,
            unit_price: self.unit_price,
            quantity: quantity.max(1),
            image_url: self.image_url,
            variant_name: self.variant_name,
        })
    }
}

/// One line of a cart: a variant, its price snapshot and how many units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Variant this line holds. Unique within a cart.
    pub variant_id: VariantId,
    /// Owning product, for display.
    pub product_id: Option<String>,
    /// Product name, for display.
    pub product_name: Option<String>,
    /// Price per unit captured when the line was first added.
    pub unit_price: Decimal,
    /// Units of the variant; always at least 1.
    pub quantity: u32,
    /// Product image, for display.
    pub image_url: Option<String>,
    /// Variant label, for display.
    pub variant_name: Option<String>,
}

impl LineItem {
    /// Returns `unit_price × quantity`, or `None` if it does not fit in a
    /// `Decimal`.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Returns `unit_price × quantity`.
    ///
    /// Saturates at `Decimal::MAX`. A cart never holds a line whose total
    /// overflows.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.checked_line_total().unwrap_or(Decimal::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_line_item_keeps_display_fields() {
        let input = LineItemInput::new("sku-1", Decimal::new(1999, 2))
            .with_product("prod-9", "Canvas Tote")
            .with_variant_name("Natural")
            .with_image_url("https://cdn.example.com/tote.png");

        let line = input.into_line_item(3).unwrap();

        assert_eq!(line.variant_id.as_str(), "sku-1");
        assert_eq!(line.product_id.as_deref(), Some("prod-9"));
        assert_eq!(line.product_name.as_deref(), Some("Canvas Tote"));
        assert_eq!(line.variant_name.as_deref(), Some("Natural"));
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total(), Decimal::new(5997, 2));
    }

    #[test]
    fn test_into_line_item_rejects_blank_variant_id() {
        let result = LineItemInput::new("  ", Decimal::ONE).into_line_item(1);

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("variant id")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_into_line_item_rejects_negative_price() {
        let result = LineItemInput::new("sku-1", Decimal::new(-1, 2)).into_line_item(1);

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("sku-1")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_into_line_item_accepts_free_item() {
        let line = LineItemInput::new("gift-wrap", Decimal::ZERO)
            .into_line_item(1)
            .unwrap();

        assert_eq!(line.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_checked_line_total_reports_overflow() {
        let price: Decimal = "50000000000000000000000000000".parse().unwrap();
        let line = LineItemInput::new("bulk", price).into_line_item(2).unwrap();

        assert_eq!(line.checked_line_total(), None);
        assert_eq!(line.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_input_deserializes_with_optional_fields_missing() {
        let input: LineItemInput =
            serde_json::from_value(serde_json::json!({ "variant_id": "A", "unit_price": "10" }))
                .unwrap();

        assert_eq!(input, LineItemInput::new("A", Decimal::TEN));
    }
}
