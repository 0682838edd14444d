use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::{LedgerError, ResultLedger};

/// Magnitude limit of the `price` column: 9 digits, 2 of them after the point.
const MAX_CENTS: i64 = 999_999_999;

/// Item price represented as **integer cents**.
///
/// This is the 2-digit scale decimal stored in the `price` column. Totals are
/// accumulated on the integer value, so sums are exact to the cent whatever the
/// order of the entries.
///
/// The value is signed: nothing rejects a negative price. Its magnitude is
/// capped at [`Price::MAX`].
///
/// # Examples
///
/// ```rust
/// use ledger::Price;
///
/// let price = Price::new(253_45);
/// assert_eq!(price.cents(), 25345);
/// assert_eq!(price.to_string(), "253.45");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use ledger::Price;
///
/// assert_eq!("10".parse::<Price>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<Price>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Price>().is_err());
/// assert!("10000000.00".parse::<Price>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);
    /// `9999999.99`, the largest price the ledger stores.
    pub const MAX: Price = Price(MAX_CENTS);

    /// Creates a new price from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Price) -> Option<Price> {
        self.0.checked_add(rhs.0).map(Price)
    }

    /// Lossy conversion used for chart proportions only.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `self` if it fits the `price` column.
    pub fn storable(self) -> ResultLedger<Price> {
        if self.0.unsigned_abs() > MAX_CENTS.unsigned_abs() {
            return Err(too_large());
        }
        Ok(self)
    }

    /// Sums prices, returning `None` if the total does not fit.
    pub fn checked_sum<I>(prices: I) -> Option<Price>
    where
        I: IntoIterator<Item = Price>,
    {
        prices
            .into_iter()
            .try_fold(Price::ZERO, |acc, price| acc.checked_add(price))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Price {
    type Err = LedgerError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let blank = || LedgerError::Validation("Price cannot be blank".to_string());
        let malformed = || LedgerError::Validation(format!("invalid price: {s}"));

        let (negative, digits) = match s.trim() {
            "" => return Err(blank()),
            text => match text.strip_prefix('-') {
                Some(rest) => (true, rest.trim_start()),
                None => (false, text.strip_prefix('+').unwrap_or(text).trim_start()),
            },
        };
        if digits.is_empty() {
            return Err(blank());
        }

        let digits = digits.replace(',', ".");
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(malformed());
        }
        if fraction.len() > 2 {
            return Err(LedgerError::Validation(
                "price has more than 2 decimals".to_string(),
            ));
        }

        // Anything past the column width is rejected before it can overflow.
        let whole: i64 = match whole.trim_start_matches('0') {
            "" => 0,
            significant if significant.len() > 7 => return Err(too_large()),
            significant => significant.parse().map_err(|_| malformed())?,
        };
        let fraction: i64 = format!("{fraction:0<2}").parse().map_err(|_| malformed())?;
        let cents = whole * 100 + fraction;

        Price(if negative { -cents } else { cents }).storable()
    }
}

fn too_large() -> LedgerError {
    LedgerError::Validation("Price is too large".to_string())
}
