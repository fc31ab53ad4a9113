use std::{fmt, str::FromStr};

use crate::{EngineError, ResultEngine};

/// Positive, finite expense amount.
///
/// Expenses are stored as floating point values, so this type only guards the
/// edges: once an `Amount` exists it is safe to persist and to divide.
///
/// Parsing from user input (accepts `.` or `,` as decimal separator):
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("40".parse::<Amount>().unwrap().value(), 40.0);
/// assert_eq!("10,5".parse::<Amount>().unwrap().value(), 10.5);
/// assert!("abc".parse::<Amount>().is_err());
/// assert!("0".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> ResultEngine<Self> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount(
                "amount must be a finite number".to_string(),
            ));
        }
        if value <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Individual share when the amount is divided among `split` people.
    #[must_use]
    pub fn per_person(self, split: SplitCount) -> f64 {
        self.0 / f64::from(split.get())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(EngineError::InvalidAmount("amount is required".to_string()));
        }

        let value: f64 = raw
            .replace(',', ".")
            .parse()
            .map_err(|_| EngineError::InvalidAmount(format!("\"{raw}\" is not a number")))?;
        Self::new(value)
    }
}

/// Number of people an expense is divided among. Always >= 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitCount(i32);

impl SplitCount {
    pub const ALONE: SplitCount = SplitCount(1);

    pub fn new(value: i32) -> ResultEngine<Self> {
        if value <= 0 {
            return Err(EngineError::InvalidSplit(
                "split must be at least 1".to_string(),
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SplitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SplitCount {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(EngineError::InvalidSplit("split is required".to_string()));
        }

        let value: i32 = raw.parse().map_err(|_| {
            EngineError::InvalidSplit(format!("\"{raw}\" is not a whole number"))
        })?;
        Self::new(value)
    }
}
