//! Shipping and customer details captured by the checkout form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A shipping form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShippingField {
    Name,
    Email,
    Phone,
    Address,
    City,
    PostalCode,
}

impl ShippingField {
    /// All fields, in form order.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::PostalCode,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::PostalCode => "postal code",
        }
    }
}

impl fmt::Display for ShippingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons an order cannot be submitted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required shipping field is empty.
    #[error("{0} is required")]
    MissingField(ShippingField),
    /// The email does not look like `local@domain`.
    #[error("email address is invalid")]
    InvalidEmail,
    /// There is nothing to order.
    #[error("no items to checkout")]
    EmptySnapshot,
}

/// Customer and delivery details for an order.
///
/// Every field is required. Values are stored as entered; [`ShippingInfo::trimmed`]
/// strips surrounding whitespace before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(alias = "pincode", alias = "postal_code")]
    pub postal_code: String,
}

impl ShippingInfo {
    /// Value of a single field.
    #[must_use]
    pub fn field(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::Name => &self.name,
            ShippingField::Email => &self.email,
            ShippingField::Phone => &self.phone,
            ShippingField::Address => &self.address,
            ShippingField::City => &self.city,
            ShippingField::PostalCode => &self.postal_code,
        }
    }

    /// Copy with surrounding whitespace removed from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
        }
    }

    /// Check that every field is filled in and the email is well formed.
    ///
    /// Fields are checked in form order and the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first blank field, or
    /// [`ValidationError::InvalidEmail`] if the email lacks a local part or domain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(field) = ShippingField::ALL
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
        {
            return Err(ValidationError::MissingField(field));
        }

        if !is_plausible_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(())
    }

    /// Single-line address as shown on the confirmation page
    /// (`"12 Main St, Pune - 411001"`).
    #[must_use]
    pub fn full_address(&self) -> String {
        let parts: Vec<&str> = [self.address.as_str(), self.city.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        let mut line = parts.join(", ");
        if !self.postal_code.is_empty() {
            line.push_str(" - ");
            line.push_str(&self.postal_code);
        }
        line
    }
}

/// `local@domain` with both parts non-empty and no whitespace.
#[must_use]
pub fn is_plausible_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> ShippingInfo {
        ShippingInfo {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Main St".to_string(),
            city: "Pune".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    #[test]
    fn test_complete_info_is_valid() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_each_blank_field_is_reported() {
        for field in ShippingField::ALL {
            let mut info = complete();
            match field {
                ShippingField::Name => info.name = "  ".to_string(),
                ShippingField::Email => info.email = String::new(),
                ShippingField::Phone => info.phone = String::new(),
                ShippingField::Address => info.address = String::new(),
                ShippingField::City => info.city = String::new(),
                ShippingField::PostalCode => info.postal_code = String::new(),
            }
            assert_eq!(info.validate(), Err(ValidationError::MissingField(field)));
        }
    }

    #[test]
    fn test_invalid_email() {
        for email in ["no-at-symbol", "@domain.com", "user@", "a@b@c", "a b@c.d"] {
            let info = ShippingInfo {
                email: email.to_string(),
                ..complete()
            };
            assert_eq!(info.validate(), Err(ValidationError::InvalidEmail), "{email}");
        }
    }

    #[test]
    fn test_pincode_alias() {
        let info: ShippingInfo =
            serde_json::from_str(r#"{"name":"A","city":"Pune","pincode":"411001"}"#).unwrap();
        assert_eq!(info.postal_code, "411001");
        assert!(info.email.is_empty());

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["postalCode"], "411001");
    }

    #[test]
    fn test_full_address() {
        assert_eq!(complete().full_address(), "12 Main St, Pune - 411001");
        let partial = ShippingInfo {
            city: "Pune".to_string(),
            ..ShippingInfo::default()
        };
        assert_eq!(partial.full_address(), "Pune");
    }

    #[test]
    fn test_trimmed() {
        let info = ShippingInfo {
            name: "  Asha ".to_string(),
            ..complete()
        };
        assert_eq!(info.trimmed().name, "Asha");
    }
}
