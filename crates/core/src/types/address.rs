//! Shipping address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A shipping address field, used to report which inputs failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    FullName,
    Address,
    City,
    State,
    ZipCode,
    Country,
}

impl AddressField {
    /// Minimum number of characters the field must contain.
    #[must_use]
    pub const fn min_chars(self) -> usize {
        match self {
            Self::Address => 5,
            Self::ZipCode => 4,
            Self::FullName | Self::City | Self::State | Self::Country => 2,
        }
    }

    /// The user-facing message shown when the field is too short.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FullName => "Name is required",
            Self::Address => "Address is required",
            Self::City => "City is required",
            Self::State => "State is required",
            Self::ZipCode => "ZIP code is required",
            Self::Country => "Country is required",
        }
    }

    /// The field's serialized key name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::Country => "country",
        }
    }
}

fn field_messages(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(|field| field.message())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error returned when shipping input fails validation.
///
/// Carries every field that failed, so the caller can surface one message
/// per invalid input rather than stopping at the first.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", field_messages(.0))]
pub struct AddressError(Vec<AddressField>);

impl AddressError {
    /// The fields that failed validation, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[AddressField] {
        &self.0
    }

    /// One user-facing message per failed field.
    pub fn messages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|field| field.message())
    }
}

/// Raw shipping form input, prior to validation.
#[derive(Debug, Clone, Default)]
pub struct ShippingInput {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A validated shipping address.
///
/// Constructible only through [`ShippingAddress::parse`], which checks every
/// field at once; a partially-valid instance cannot exist.
///
/// ## Constraints
///
/// - Full name, city, state, country: at least 2 characters
/// - Address: at least 5 characters
/// - ZIP code: at least 4 characters
///
/// Serializes with camelCase keys (`fullName`, `zipCode`) to match the
/// stored JSON shape.
///
/// ## Examples
///
/// ```
/// use luxe_core::{ShippingAddress, ShippingInput};
///
/// let input = ShippingInput {
///     full_name: "Jane Doe".into(),
///     address: "123 Main Street".into(),
///     city: "Springfield".into(),
///     state: "IL".into(),
///     zip_code: "62704".into(),
///     country: "USA".into(),
/// };
/// let address = ShippingAddress::parse(input).unwrap();
/// assert_eq!(address.zip_code(), "62704");
///
/// let err = ShippingAddress::parse(ShippingInput::default()).unwrap_err();
/// assert_eq!(err.fields().len(), 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    full_name: String,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

impl ShippingAddress {
    /// Parse a `ShippingAddress` from raw form input.
    ///
    /// All fields are checked; the error carries every field that failed,
    /// not just the first.
    ///
    /// # Errors
    ///
    /// Returns an [`AddressError`] listing each field shorter than its
    /// minimum length.
    pub fn parse(input: ShippingInput) -> Result<Self, AddressError> {
        let checks = [
            (AddressField::FullName, input.full_name.as_str()),
            (AddressField::Address, input.address.as_str()),
            (AddressField::City, input.city.as_str()),
            (AddressField::State, input.state.as_str()),
            (AddressField::ZipCode, input.zip_code.as_str()),
            (AddressField::Country, input.country.as_str()),
        ];

        let invalid: Vec<AddressField> = checks
            .iter()
            .filter(|(field, value)| value.chars().count() < field.min_chars())
            .map(|(field, _)| *field)
            .collect();

        if !invalid.is_empty() {
            return Err(AddressError(invalid));
        }

        Ok(Self {
            full_name: input.full_name,
            address: input.address,
            city: input.city,
            state: input.state,
            zip_code: input.zip_code,
            country: input.country,
        })
    }

    /// The recipient's full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The street address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The city.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// The state or province.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// The postal code.
    #[must_use]
    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    /// The country.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

impl fmt::Display for ShippingAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}, {} {}\n{}",
            self.full_name, self.address, self.city, self.state, self.zip_code, self.country
        )
    }
}

impl TryFrom<ShippingInput> for ShippingAddress {
    type Error = AddressError;

    fn try_from(input: ShippingInput) -> Result<Self, Self::Error> {
        Self::parse(input)
    }
}
