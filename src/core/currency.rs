//! Currency codes and the fuzzy resolver mapping user input onto them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::str::FromStr;

/// A canonical three-letter currency code, always stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// The pivot currency every rate is expressed against.
    pub const RUB: CurrencyCode = CurrencyCode(*b"RUB");

    /// Accepts exactly three ASCII letters in any case.
    pub fn new(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        let mut upper = [0u8; 3];
        for (dst, src) in upper.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Some(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim()).ok_or_else(|| anyhow::anyhow!("Invalid currency code: {}", s))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    pub name: String,
}

/// The configured set of supported currencies.
///
/// Owns display order, display names, the "main" subset and the shortcut
/// aliases, and resolves free-form user tokens to canonical codes.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    currencies: Vec<CurrencyInfo>,
    main: Vec<CurrencyCode>,
    shortcuts: HashMap<String, CurrencyCode>,
}

impl CurrencyRegistry {
    pub fn new<S>(
        currencies: Vec<CurrencyInfo>,
        main: Vec<CurrencyCode>,
        shortcuts: impl IntoIterator<Item = (S, CurrencyCode)>,
    ) -> Self
    where
        S: AsRef<str>,
    {
        let shortcuts = shortcuts
            .into_iter()
            .map(|(alias, code)| (alias.as_ref().trim().to_lowercase(), code))
            .collect();
        Self {
            currencies,
            main,
            shortcuts,
        }
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.currencies.iter().any(|c| c.code == *code)
    }

    pub fn name(&self, code: &CurrencyCode) -> Option<&str> {
        self.currencies
            .iter()
            .find(|c| c.code == *code)
            .map(|c| c.name.as_str())
    }

    /// Display name, falling back to the code itself.
    pub fn display_name<'a>(&'a self, code: &'a CurrencyCode) -> &'a str {
        self.name(code).unwrap_or(code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyInfo> {
        self.currencies.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = CurrencyCode> + '_ {
        self.currencies.iter().map(|c| c.code)
    }

    pub fn main_currencies(&self) -> &[CurrencyCode] {
        &self.main
    }

    /// Maps a user-typed token to a configured currency.
    ///
    /// Tried in order: an exact three-letter code, an exact shortcut alias,
    /// then the first currency (in display order) whose name contains the
    /// input. Ambiguous fragments resolve to whichever currency is listed
    /// first.
    pub fn resolve(&self, input: &str) -> Option<CurrencyCode> {
        let clean = input.trim().to_lowercase();
        if clean.is_empty() {
            return None;
        }

        if let Some(code) = CurrencyCode::new(&clean).filter(|code| self.contains(code)) {
            return Some(code);
        }

        if let Some(code) = self.shortcuts.get(&clean) {
            return Some(*code);
        }

        self.currencies
            .iter()
            .find(|c| c.name.to_lowercase().contains(&clean))
            .map(|c| c.code)
    }
}
