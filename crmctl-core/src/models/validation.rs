//! Validation rules and error types

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// Maximum length of customer and product names
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of an email address
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum length of a phone number
pub const MAX_PHONE_LEN: usize = 20;

/// Fractional digits kept for money columns (`NUMERIC(10,2)`)
pub const MONEY_SCALE: u32 = 2;

/// Total digits allowed for money columns
pub const MONEY_PRECISION: u32 = 10;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+\d{10,15}|\d{3}-\d{3}-\d{4})$").expect("valid phone regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Validation error for domain input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Another customer already uses this email
    DuplicateEmail,

    /// Email does not look like an address
    InvalidEmail,

    /// Phone does not match `+<10-15 digits>` or `ddd-ddd-dddd`
    InvalidPhone,

    /// Price is zero or negative
    NonPositivePrice,

    /// Price does not fit `NUMERIC(10,2)`
    PricePrecision,

    /// Order total does not fit `NUMERIC(10,2)`
    TotalPrecision,

    /// Stock is negative
    NegativeStock,

    /// Order without products
    NoProducts,

    /// Order for a customer that does not exist
    UnknownCustomer,

    /// Order references products that do not exist
    UnknownProducts { ids: Vec<String> },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::DuplicateEmail => f.write_str("Email already exists."),
            Self::InvalidEmail => f.write_str("Enter a valid email address."),
            Self::InvalidPhone => f.write_str("Invalid phone number format."),
            Self::NonPositivePrice => f.write_str("Price must be positive."),
            Self::PricePrecision => {
                f.write_str("Price must have at most 2 decimal places and 10 digits.")
            }
            Self::TotalPrecision => {
                f.write_str("Order total exceeds the allowed precision of 10 digits.")
            }
            Self::NegativeStock => f.write_str("Stock cannot be negative."),
            Self::NoProducts => f.write_str("At least one product must be selected."),
            Self::UnknownCustomer => f.write_str("Invalid customer ID."),
            Self::UnknownProducts { ids } => write!(f, "Invalid product IDs: {}", ids.join(", ")),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a required name field, returning it trimmed.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Validate email shape (uniqueness is checked against the store).
pub fn validate_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "email" });
    }
    if trimmed.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email",
            max: MAX_EMAIL_LEN,
        });
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed.to_string())
}

/// Validate an optional phone. Empty strings count as absent.
pub fn validate_phone(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(phone) = value.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if phone.len() > MAX_PHONE_LEN || !PHONE_RE.is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(Some(phone.to_string()))
}

/// Validate a product price: positive and representable as `NUMERIC(10,2)`.
pub fn validate_price(price: Decimal) -> Result<Decimal, ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice);
    }
    let normalized = price.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(ValidationError::PricePrecision);
    }
    let mut money = normalized;
    money.rescale(MONEY_SCALE);
    if !fits_money_column(money) {
        return Err(ValidationError::PricePrecision);
    }
    Ok(money)
}

/// Validate an order total, returning it at money scale.
pub fn validate_total(total: Decimal) -> Result<Decimal, ValidationError> {
    let mut money = total;
    money.rescale(MONEY_SCALE);
    if !fits_money_column(money) {
        return Err(ValidationError::TotalPrecision);
    }
    Ok(money)
}

/// Whether a value already at [`MONEY_SCALE`] has at most [`MONEY_PRECISION`] digits.
fn fits_money_column(money: Decimal) -> bool {
    money.mantissa().unsigned_abs().to_string().len() <= MONEY_PRECISION as usize
}

/// Validate a stock count.
pub fn validate_stock(stock: i32) -> Result<i32, ValidationError> {
    if stock < 0 {
        return Err(ValidationError::NegativeStock);
    }
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "name exceeds maximum length of 255 characters"
        );

        let err = ValidationError::UnknownProducts {
            ids: vec!["7".into(), "9".into()],
        };
        assert_eq!(err.to_string(), "Invalid product IDs: 7, 9");
    }

    #[test]
    fn phone_formats() {
        assert_eq!(
            validate_phone(Some("+12345678901")).unwrap().as_deref(),
            Some("+12345678901")
        );
        assert!(validate_phone(Some("123-456-7890")).is_ok());
        assert!(validate_phone(Some("+1234567890")).is_ok());
        assert_eq!(
            validate_phone(Some("12345")),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(
            validate_phone(Some("+123")),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(
            validate_phone(Some("1234567890")),
            Err(ValidationError::InvalidPhone)
        );
    }

    #[test]
    fn empty_phone_is_absent() {
        assert_eq!(validate_phone(None), Ok(None));
        assert_eq!(validate_phone(Some("")), Ok(None));
        assert_eq!(validate_phone(Some("   ")), Ok(None));
    }

    #[test]
    fn email_shape() {
        assert_eq!(
            validate_email(" alice@example.com ").unwrap(),
            "alice@example.com"
        );
        assert_eq!(validate_email("alice"), Err(ValidationError::InvalidEmail));
        assert_eq!(
            validate_email(""),
            Err(ValidationError::Empty { field: "email" })
        );
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("name", "  Bob ").unwrap(), "Bob");
        assert_eq!(
            validate_name("name", "   "),
            Err(ValidationError::Empty { field: "name" })
        );
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            validate_name("name", &long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn price_rules() {
        let cent = Decimal::from_str("0.01").unwrap();
        assert_eq!(validate_price(cent).unwrap().to_string(), "0.01");
        assert_eq!(
            validate_price(Decimal::from_str("12.5").unwrap())
                .unwrap()
                .to_string(),
            "12.50"
        );
        assert_eq!(
            validate_price(Decimal::ZERO),
            Err(ValidationError::NonPositivePrice)
        );
        assert_eq!(
            validate_price(Decimal::from_str("-1").unwrap()),
            Err(ValidationError::NonPositivePrice)
        );
        assert_eq!(
            validate_price(Decimal::from_str("1.005").unwrap()),
            Err(ValidationError::PricePrecision)
        );
        assert_eq!(
            validate_price(Decimal::from_str("123456789.00").unwrap()),
            Err(ValidationError::PricePrecision)
        );
        assert!(validate_price(Decimal::from_str("99999999.99").unwrap()).is_ok());
    }

    #[test]
    fn total_rules() {
        assert_eq!(
            validate_total(Decimal::from_str("15").unwrap())
                .unwrap()
                .to_string(),
            "15.00"
        );
        assert!(validate_total(Decimal::from_str("99999999.99").unwrap()).is_ok());
        assert_eq!(
            validate_total(Decimal::from_str("199999999.98").unwrap()),
            Err(ValidationError::TotalPrecision)
        );
    }

    #[test]
    fn stock_rules() {
        assert_eq!(validate_stock(0), Ok(0));
        assert_eq!(validate_stock(-1), Err(ValidationError::NegativeStock));
    }
}
