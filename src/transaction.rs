use crate::error::LedgerError;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Process-unique identifier assigned when a transaction is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(LedgerError::InvalidInput {
                message: format!("Unknown transaction type: {}", other),
            }),
        }
    }
}

/// A ledger entry. Immutable once built; editing is remove + add.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: String,
}

/// Everything a caller supplies when adding a transaction; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: String,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            description: description.into(),
            date: date.into(),
        }
    }

    /// Builds a transaction from user input, rejecting anything the lenient
    /// parser would have silently accepted: the type must be `income` or
    /// `expense` (any case), the amount a positive number, and the date
    /// `YYYY-MM-DD`. A missing or blank date means today.
    pub fn validated(
        kind: &str,
        amount: &str,
        category: &str,
        description: &str,
        date: Option<&str>,
    ) -> Result<Self, LedgerError> {
        let kind = TransactionKind::from_str(&kind.trim().to_lowercase())?;

        let amount = Decimal::from_str(amount.trim()).map_err(|_| LedgerError::InvalidInput {
            message: format!("Invalid amount: {}", amount.trim()),
        })?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput {
                message: "Amount must be greater than 0".to_string(),
            });
        }

        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => {
                NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
                    LedgerError::InvalidInput {
                        message: format!("Invalid date {}, expected YYYY-MM-DD", date),
                    }
                })?;
                date.to_string()
            }
            None => Local::now().date_naive().format(DATE_FORMAT).to_string(),
        };

        Ok(Self::new(kind, amount, category.trim(), description.trim(), date))
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
        }
    }
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Drops the id, e.g. to compare content across a save/load cycle.
    pub fn without_id(&self) -> NewTransaction {
        NewTransaction {
            kind: self.kind,
            amount: self.amount,
            category: self.category.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
        }
    }
}

/// Significant digits kept when reading an amount; `Decimal` holds 28.
const MAX_AMOUNT_DIGITS: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("not a number")]
    NotANumber,

    #[error("out of range")]
    OutOfRange,
}

/// Lenient amount parsing: anything unreadable becomes zero.
pub fn parse_amount(raw: &str) -> Decimal {
    try_parse_amount(raw).unwrap_or(Decimal::ZERO)
}

/// Reads the longest numeric prefix after leading whitespace, so `12.50 USD`
/// is 12.50 and `1_000` is 1. Accepted shape:
/// `[+-]` (`digits[.[digits]]` | `.digits`) (`[eE][+-]digits`), plus `Infinity`
/// which is out of range. Digits past the 28th significant one are truncated;
/// values too small for 28 decimal places read as zero.
pub fn try_parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    if rest.starts_with("Infinity") {
        return Err(AmountError::OutOfRange);
    }

    let int_len = count_digits(rest);
    let int_digits = &rest[..int_len];
    let mut end = int_len;
    let mut frac_digits = "";
    if rest[end..].starts_with('.') {
        let frac_len = count_digits(&rest[end + 1..]);
        frac_digits = &rest[end + 1..end + 1 + frac_len];
        end += 1 + frac_len;
    }
    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(AmountError::NotANumber);
    }

    let mut exponent = -(frac_digits.len() as i64);
    if let Some(after_e) = rest[end..].strip_prefix(|c: char| c == 'e' || c == 'E') {
        let (exp_negative, exp_rest) = match after_e.as_bytes().first() {
            Some(b'-') => (true, &after_e[1..]),
            Some(b'+') => (false, &after_e[1..]),
            _ => (false, after_e),
        };
        let exp_digits = &exp_rest[..count_digits(exp_rest)];
        // `1e` without digits is just 1.
        if !exp_digits.is_empty() {
            let value = exp_digits.bytes().fold(0i64, |acc, b| {
                acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
            });
            exponent = if exp_negative {
                exponent.saturating_sub(value)
            } else {
                exponent.saturating_add(value)
            };
        }
    }

    let digits = format!("{}{}", int_digits, frac_digits);
    let mut significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(Decimal::ZERO);
    }
    if significant.len() > MAX_AMOUNT_DIGITS {
        exponent = exponent.saturating_add((significant.len() - MAX_AMOUNT_DIGITS) as i64);
        significant = &significant[..MAX_AMOUNT_DIGITS];
    }
    let mut mantissa: i128 = significant.parse().map_err(|_| AmountError::NotANumber)?;

    let value = if exponent >= 0 {
        // A nonzero mantissa overflows within a few dozen steps.
        let mut value = Decimal::from_i128_with_scale(mantissa, 0);
        for _ in 0..exponent {
            value = value
                .checked_mul(Decimal::TEN)
                .ok_or(AmountError::OutOfRange)?;
        }
        value
    } else {
        let mut scale = exponent.unsigned_abs();
        if scale > MAX_AMOUNT_DIGITS as u64 {
            let shift = scale - MAX_AMOUNT_DIGITS as u64;
            mantissa = if shift > 38 {
                0
            } else {
                mantissa / 10i128.pow(shift as u32)
            };
            scale = MAX_AMOUNT_DIGITS as u64;
        }
        Decimal::from_i128_with_scale(mantissa, scale as u32)
    };

    Ok(if negative { -value } else { value })
}

fn count_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}
