//! Shipping and payment details collected by the checkout form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`ShippingForm`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required field is blank.
    #[error("{} is required", .0.form_name())]
    MissingField(ShippingField),
}

/// Required fields of the shipping form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingField {
    Name,
    AddressLine,
    Locality,
    Region,
    Country,
    PostalCode,
    Phone,
}

impl ShippingField {
    /// All required fields, in display order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::AddressLine,
        Self::Locality,
        Self::Region,
        Self::Country,
        Self::PostalCode,
        Self::Phone,
    ];

    /// HTML form field name.
    #[must_use]
    pub const fn form_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::AddressLine => "address_line",
            Self::Locality => "locality",
            Self::Region => "region",
            Self::Country => "country",
            Self::PostalCode => "postal_code",
            Self::Phone => "phone",
        }
    }

    /// Label shown to shoppers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Nombre completo",
            Self::AddressLine => "Dirección",
            Self::Locality => "Ciudad",
            Self::Region => "Región",
            Self::Country => "País",
            Self::PostalCode => "Código postal",
            Self::Phone => "Teléfono",
        }
    }
}

/// How the shopper intends to pay.
///
/// Wire values match what the backend stores on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Credit or debit card.
    #[default]
    #[serde(rename = "tarjeta")]
    Card,
    #[serde(rename = "paypal")]
    Paypal,
    /// Bank transfer.
    #[serde(rename = "transferencia")]
    BankTransfer,
}

impl PaymentMethod {
    /// All payment methods, in display order.
    pub const ALL: [Self; 3] = [Self::Card, Self::Paypal, Self::BankTransfer];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "tarjeta",
            Self::Paypal => "paypal",
            Self::BankTransfer => "transferencia",
        }
    }

    /// Label shown to shoppers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Tarjeta de Crédito / Débito",
            Self::Paypal => "PayPal",
            Self::BankTransfer => "Transferencia Bancaria",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipping and payment details entered at checkout.
///
/// Starts empty when the form is first shown and only changes through user
/// input. Every text field is required before the order can be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingForm {
    /// Recipient's full name.
    pub name: String,
    /// Street address.
    pub address_line: String,
    /// City.
    pub locality: String,
    pub region: String,
    pub country: String,
    pub postal_code: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
}

impl ShippingForm {
    /// Value of a required field.
    #[must_use]
    pub fn value(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::Name => &self.name,
            ShippingField::AddressLine => &self.address_line,
            ShippingField::Locality => &self.locality,
            ShippingField::Region => &self.region,
            ShippingField::Country => &self.country,
            ShippingField::PostalCode => &self.postal_code,
            ShippingField::Phone => &self.phone,
        }
    }

    /// Required fields that are blank (empty or whitespace only).
    #[must_use]
    pub fn missing_fields(&self) -> Vec<ShippingField> {
        ShippingField::ALL
            .into_iter()
            .filter(|&field| self.value(field).trim().is_empty())
            .collect()
    }

    /// Check that every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingField`] for the first blank field, in
    /// display order.
    pub fn validate(&self) -> Result<(), FormError> {
        match self.missing_fields().first() {
            Some(&field) => Err(FormError::MissingField(field)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn filled_form() -> ShippingForm {
        ShippingForm {
            name: "Camila Rojas".to_string(),
            address_line: "Av. Providencia 1234".to_string(),
            locality: "Santiago".to_string(),
            region: "Metropolitana".to_string(),
            country: "Chile".to_string(),
            postal_code: "7500000".to_string(),
            phone: "+56 9 1234 5678".to_string(),
            payment_method: PaymentMethod::Card,
        }
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let form = ShippingForm::default();
        assert_eq!(form.missing_fields(), ShippingField::ALL.to_vec());
        assert_eq!(
            form.validate(),
            Err(FormError::MissingField(ShippingField::Name))
        );
    }

    #[test]
    fn test_filled_form_is_valid() {
        assert!(filled_form().validate().is_ok());
    }

    #[test]
    fn test_whitespace_counts_as_blank() {
        let form = ShippingForm {
            phone: "   ".to_string(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(),
            Err(FormError::MissingField(ShippingField::Phone))
        );
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "phone is required"
        );
    }

    #[test]
    fn test_payment_method_wire_values() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"transferencia\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"paypal\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Paypal);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Card);
    }
}
