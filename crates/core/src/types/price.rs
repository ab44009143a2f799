//! Prices in Korean won.
//!
//! The catalog API reports prices as whole won, sometimes as JSON numbers and
//! sometimes as numeric strings (`"lprice": "220"`). [`Price`] accepts both
//! on input and always serializes as a number.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Deserializer, Serialize};

/// A price in whole Korean won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Zero won.
    pub const ZERO: Self = Self(0);

    /// Create a price from a won amount.
    #[must_use]
    pub const fn new(won: u64) -> Self {
        Self(won)
    }

    /// Get the amount in won.
    #[must_use]
    pub const fn won(self) -> u64 {
        self.0
    }

    /// Line total for `quantity` units. Saturates instead of overflowing.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Format for display with thousands separators, e.g. `12,500원`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}원", group_thousands(self.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0u64, |acc, price| acc.saturating_add(price.0)))
    }
}

impl From<u64> for Price {
    fn from(won: u64) -> Self {
        Self(won)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(won) => Ok(Self(won)),
            Raw::Float(won) if won.is_finite() && won >= 0.0 => {
                // Checked non-negative and finite above; won amounts carry no fraction.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let won = won.round() as u64;
                Ok(Self(won))
            }
            Raw::Float(won) => Err(serde::de::Error::custom(format!("invalid price: {won}"))),
            Raw::Text(text) => {
                let digits: String = text.chars().filter(|c| *c != ',').collect();
                let digits = digits.trim();
                if digits.is_empty() {
                    return Ok(Self::ZERO);
                }
                digits
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| serde::de::Error::custom(format!("invalid price: {text:?}")))
            }
        }
    }
}

/// Insert thousands separators: `1234567` becomes `1,234,567`.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_label_groups_thousands() {
        assert_eq!(Price::new(0).label(), "0원");
        assert_eq!(Price::new(999).label(), "999원");
        assert_eq!(Price::new(1000).label(), "1,000원");
        assert_eq!(Price::new(1_234_567).label(), "1,234,567원");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("220").unwrap();
        let from_string: Price = serde_json::from_str("\"220\"").unwrap();
        let from_grouped: Price = serde_json::from_str("\"1,220\"").unwrap();
        assert_eq!(from_number, Price::new(220));
        assert_eq!(from_string, Price::new(220));
        assert_eq!(from_grouped, Price::new(1220));
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Price>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Price>("-5.0").is_err());
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::new(100).times(3), Price::new(50)].into_iter().sum();
        assert_eq!(total, Price::new(350));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Price::new(1500)).unwrap(), "1500");
    }
}
