use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Currency identifier as used by the rate provider (e.g. "twd", "jpy", "btc").
///
/// Codes are case-insensitive and always stored lowercase, since that is the
/// form the provider uses both in request paths and as response keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, Error> {
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::InvalidInput("currency code is empty".to_string()));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidInput(format!(
                "currency code '{}' must be ASCII alphanumeric",
                code
            )));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// The lowercase lookup key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_ascii_uppercase())
    }
}

/// Represents a base/quote conversion: one unit of `base` is worth `rate` units of `quote`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: CurrencyCode,  // Converting from (e.g., TWD)
    pub quote: CurrencyCode, // Converting to (e.g., JPY)
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Result<Self, Error> {
        Ok(Self {
            base: base.parse()?,
            quote: quote.parse()?,
        })
    }
}

/// The pair shown when no currencies are chosen: Taiwan dollar to Japanese yen.
impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            base: CurrencyCode("twd".to_string()),
            quote: CurrencyCode("jpy".to_string()),
        }
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
