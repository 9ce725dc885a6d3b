//! Human-readable product identifiers.
//!
//! Products are keyed by codes like `PROD-0001` rather than surrogate
//! integers. The numeric part comes from a database counter that is bumped
//! once per product creation; this type only formats and validates codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The code does not start with `PROD-`.
    #[error("product id must start with {prefix}")]
    MissingPrefix {
        /// Expected prefix.
        prefix: &'static str,
    },
    /// The numeric part is missing, too short, or not a number.
    #[error("product id must end with at least {min} digits")]
    InvalidNumber {
        /// Minimum number of digits.
        min: usize,
    },
    /// Sequence numbers start at 1.
    #[error("product sequence must be positive")]
    NonPositive,
}

/// A product code such as `PROD-0042`.
///
/// ```
/// use clothesline_core::ProductId;
///
/// let id = ProductId::from_sequence(42).unwrap();
/// assert_eq!(id.as_str(), "PROD-0042");
/// assert_eq!(id.sequence(), 42);
///
/// assert_eq!(ProductId::parse("PROD-12345").unwrap().sequence(), 12345);
/// assert!(ProductId::parse("SKU-0001").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Prefix shared by every product code.
    pub const PREFIX: &'static str = "PROD-";

    /// Minimum zero-padded width of the numeric part.
    pub const MIN_DIGITS: usize = 4;

    /// Format the code for the given counter value.
    ///
    /// # Errors
    ///
    /// Returns `ProductIdError::NonPositive` if `sequence < 1`.
    pub fn from_sequence(sequence: i64) -> Result<Self, ProductIdError> {
        if sequence < 1 {
            return Err(ProductIdError::NonPositive);
        }
        Ok(Self(format!(
            "{}{sequence:0width$}",
            Self::PREFIX,
            width = Self::MIN_DIGITS
        )))
    }

    /// Parse an existing product code.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is wrong or the numeric part is not a
    /// positive number of at least four digits.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let digits = s
            .trim()
            .strip_prefix(Self::PREFIX)
            .ok_or(ProductIdError::MissingPrefix {
                prefix: Self::PREFIX,
            })?;

        if digits.len() < Self::MIN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProductIdError::InvalidNumber {
                min: Self::MIN_DIGITS,
            });
        }

        let sequence: i64 = digits.parse().map_err(|_| ProductIdError::InvalidNumber {
            min: Self::MIN_DIGITS,
        })?;

        Self::from_sequence(sequence)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The counter value this code was generated from.
    #[must_use]
    pub fn sequence(&self) -> i64 {
        self.0
            .strip_prefix(Self::PREFIX)
            .and_then(|digits| digits.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProductId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sequence_pads_to_four_digits() {
        assert_eq!(ProductId::from_sequence(1).unwrap().as_str(), "PROD-0001");
        assert_eq!(ProductId::from_sequence(999).unwrap().as_str(), "PROD-0999");
        assert_eq!(ProductId::from_sequence(10_000).unwrap().as_str(), "PROD-10000");
    }

    #[test]
    fn test_from_sequence_rejects_zero() {
        assert_eq!(ProductId::from_sequence(0), Err(ProductIdError::NonPositive));
    }

    #[test]
    fn test_parse_roundtrips_sequence() {
        let id = ProductId::parse("PROD-0107").unwrap();
        assert_eq!(id.sequence(), 107);
        assert_eq!(ProductId::from_sequence(id.sequence()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        assert!(matches!(
            ProductId::parse("prod-0001"),
            Err(ProductIdError::MissingPrefix { .. })
        ));
        assert!(matches!(
            ProductId::parse("PROD-12"),
            Err(ProductIdError::InvalidNumber { .. })
        ));
        assert!(matches!(
            ProductId::parse("PROD-00a1"),
            Err(ProductIdError::InvalidNumber { .. })
        ));
        assert_eq!(ProductId::parse("PROD-0000"), Err(ProductIdError::NonPositive));
    }

    #[test]
    fn test_ordering_follows_sequence_for_padded_codes() {
        let a = ProductId::from_sequence(9).unwrap();
        let b = ProductId::from_sequence(10).unwrap();
        assert!(a < b);
    }
}
