//! Lenient CSV ingestion for ledger files.
//!
//! Expected columns, in order: `type,amount,category,description,date`. The
//! first non-blank line is a header and is skipped without inspection. Rows
//! that cannot become a transaction are dropped, never reported as errors;
//! [`parse_csv_with_report`] exposes the dropped rows for callers that want
//! diagnostics.

use crate::transaction::{
    try_parse_amount, AmountError, NewTransaction, Transaction, TransactionId, TransactionKind,
};

use rust_decimal::Decimal;
use std::str::FromStr;

const MIN_FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    TooFewFields { found: usize },
    UnknownKind { kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// 1-based physical line number in the input text.
    pub line: usize,
    pub reason: RejectReason,
}

/// An accepted row whose amount could not be read and was recorded as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultedAmount {
    /// 1-based physical line number in the input text.
    pub line: usize,
    pub raw: String,
    pub reason: AmountError,
}

#[derive(Debug, Default)]
pub struct ParseReport {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RowRejection>,
    pub defaulted_amounts: Vec<DefaultedAmount>,
}

pub fn parse_csv(text: &str) -> Vec<Transaction> {
    parse_csv_with_report(text).transactions
}

pub fn parse_csv_with_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    let mut lines = text
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    // Header
    if lines.next().is_none() {
        return report;
    }

    for (index, line) in lines {
        match parse_row(line) {
            Ok((new_tx, amount_error)) => {
                if let Some((raw, reason)) = amount_error {
                    tracing::debug!(line = index + 1, %raw, %reason, "Amount recorded as zero");
                    report.defaulted_amounts.push(DefaultedAmount {
                        line: index + 1,
                        raw,
                        reason,
                    });
                }
                report
                    .transactions
                    .push(new_tx.into_transaction(TransactionId::new()));
            }
            Err(reason) => {
                tracing::debug!(line = index + 1, ?reason, "Skipping CSV row");
                report.rejected.push(RowRejection {
                    line: index + 1,
                    reason,
                });
            }
        }
    }

    report
}

type AmountFailure = Option<(String, AmountError)>;

fn parse_row(line: &str) -> Result<(NewTransaction, AmountFailure), RejectReason> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return Err(RejectReason::TooFewFields {
            found: fields.len(),
        });
    }

    let kind = TransactionKind::from_str(&fields[0]).map_err(|_| RejectReason::UnknownKind {
        kind: fields[0].trim().to_string(),
    })?;

    let (amount, amount_error) = match try_parse_amount(&fields[1]) {
        Ok(amount) => (amount, None),
        Err(e) => (Decimal::ZERO, Some((fields[1].trim().to_string(), e))),
    };

    let new_tx = NewTransaction {
        kind,
        amount,
        category: fields[2].trim().to_string(),
        description: strip_outer_quotes(&fields[3]).trim().to_string(),
        date: fields[4].trim().to_string(),
    };
    Ok((new_tx, amount_error))
}

/// Splits one line on commas that are outside double quotes.
///
/// Every `"` toggles the quoted state and is not kept, so `""` inside a quoted
/// field closes and reopens it rather than producing a literal quote.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

fn strip_outer_quotes(field: &str) -> &str {
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod split_fields_tests {
        use super::*;

        #[test]
        fn test_split_plain_line() {
            assert_eq!(
                split_fields("income,1000,Salary,Pay,2024-01-15"),
                vec!["income", "1000", "Salary", "Pay", "2024-01-15"]
            );
        }

        #[test]
        fn test_split_quoted_comma() {
            assert_eq!(split_fields(r#"a,"b, c",d"#), vec!["a", "b, c", "d"]);
        }

        #[test]
        fn test_split_doubled_quote_toggles_twice() {
            assert_eq!(split_fields(r#"a,"x""y",b"#), vec!["a", "xy", "b"]);
            assert_eq!(split_fields(r#"a,"x"",y",b"#), vec!["a", "x,y", "b"]);
        }

        #[test]
        fn test_split_unterminated_quote_swallows_rest() {
            assert_eq!(split_fields(r#"a,"b,c,d"#), vec!["a", "b,c,d"]);
        }

        #[test]
        fn test_split_empty_fields() {
            assert_eq!(split_fields(",,"), vec!["", "", ""]);
            assert_eq!(split_fields(""), vec![""]);
        }
    }

    mod parse_csv_tests {
        use super::*;

        #[test]
        fn test_parse_quoted_description() {
            let text = "type,amount,category,description,date\n\
                        income,1000,Salary,\"Monthly, paid on 1st\",2024-01-15";
            let txs = parse_csv(text);

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].kind, TransactionKind::Income);
            assert_eq!(txs[0].amount, Decimal::from(1000));
            assert_eq!(txs[0].category, "Salary");
            assert_eq!(txs[0].description, "Monthly, paid on 1st");
            assert_eq!(txs[0].date, "2024-01-15");
        }

        #[test]
        fn test_parse_unknown_kind_rejected() {
            let text = "header\nbogus,10,Food,\"desc\",2024-01-01";
            let report = parse_csv_with_report(text);

            assert!(report.transactions.is_empty());
            assert_eq!(
                report.rejected,
                vec![RowRejection {
                    line: 2,
                    reason: RejectReason::UnknownKind {
                        kind: "bogus".to_string()
                    },
                }]
            );
        }

        #[test]
        fn test_parse_amount_defaults_to_zero() {
            let txs = parse_csv("header\nexpense,notanumber,Food,desc,2024-01-01");

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].amount, Decimal::ZERO);
        }

        #[test]
        fn test_parse_amount_with_trailing_text() {
            let text = "header
                        expense,12abc,Food,a,2024-01-01
                        expense,12.50 USD,Food,b,2024-01-02
                        expense,1_000,Food,c,2024-01-03";
            let report = parse_csv_with_report(text);
            let amounts: Vec<_> = report.transactions.iter().map(|t| t.amount).collect();

            assert_eq!(
                amounts,
                vec![
                    Decimal::from(12),
                    Decimal::from_str("12.50").unwrap(),
                    Decimal::from(1)
                ]
            );
            assert!(report.defaulted_amounts.is_empty());
        }

        #[test]
        fn test_parse_reports_defaulted_amounts() {
            let text = "header
                        expense,notanumber,Food,a,2024-01-01
                        income,10,Gift,b,2024-01-02
                        income,1e30,Lottery,c,2024-01-03";
            let report = parse_csv_with_report(text);

            assert_eq!(report.transactions.len(), 3);
            assert_eq!(report.transactions[2].amount, Decimal::ZERO);
            assert!(report.rejected.is_empty());
            assert_eq!(
                report.defaulted_amounts,
                vec![
                    DefaultedAmount {
                        line: 2,
                        raw: "notanumber".to_string(),
                        reason: AmountError::NotANumber,
                    },
                    DefaultedAmount {
                        line: 4,
                        raw: "1e30".to_string(),
                        reason: AmountError::OutOfRange,
                    },
                ]
            );
        }

        #[test]
        fn test_parse_too_few_fields() {
            let report = parse_csv_with_report("header\nexpense,10,Food,desc");

            assert!(report.transactions.is_empty());
            assert_eq!(
                report.rejected[0].reason,
                RejectReason::TooFewFields { found: 4 }
            );
        }

        #[test]
        fn test_parse_extra_fields_ignored() {
            let txs = parse_csv("header\nexpense,10,Food,desc,2024-01-01,extra,more");

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].date, "2024-01-01");
        }

        #[test]
        fn test_parse_trims_fields() {
            let txs = parse_csv("header\n  income , 5.5 , Gift ,  \" Card \" , 2024-02-02 \r");

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].kind, TransactionKind::Income);
            assert_eq!(txs[0].amount, Decimal::from_str("5.5").unwrap());
            assert_eq!(txs[0].category, "Gift");
            assert_eq!(txs[0].description, "Card");
            assert_eq!(txs[0].date, "2024-02-02");
        }

        #[test]
        fn test_parse_empty_fields_accepted() {
            let txs = parse_csv("header\nexpense,,,,");

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].amount, Decimal::ZERO);
            assert!(txs[0].category.is_empty());
            assert!(txs[0].description.is_empty());
            assert!(txs[0].date.is_empty());
        }

        #[test]
        fn test_parse_header_only_and_empty() {
            assert!(parse_csv("").is_empty());
            assert!(parse_csv("\n  \n").is_empty());
            assert!(parse_csv("type,amount,category,description,date").is_empty());
        }

        #[test]
        fn test_parse_header_not_validated() {
            // The first non-blank line is always discarded, even if it looks like data.
            let txs = parse_csv("\n\nincome,1,A,B,C\nexpense,2,D,E,F");

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].kind, TransactionKind::Expense);
        }

        #[test]
        fn test_parse_blank_lines_skipped_without_rejection() {
            let report = parse_csv_with_report("header\n\nincome,1,A,B,C\n   \nexpense,2,D,E,F\n");

            assert_eq!(report.transactions.len(), 2);
            assert!(report.rejected.is_empty());
        }

        #[test]
        fn test_parse_preserves_order_and_unique_ids() {
            let text = "header\n\
                        income,1,A,a,2024-01-01\n\
                        bogus,2,B,b,2024-01-02\n\
                        expense,3,C,c,2024-01-03\n\
                        income,4,D,d,2024-01-04";
            let report = parse_csv_with_report(text);
            let amounts: Vec<_> = report.transactions.iter().map(|t| t.amount).collect();

            assert_eq!(
                amounts,
                vec![Decimal::from(1), Decimal::from(3), Decimal::from(4)]
            );
            assert_ne!(report.transactions[0].id, report.transactions[1].id);
            assert_ne!(report.transactions[1].id, report.transactions[2].id);
            assert_eq!(report.rejected.len(), 1);
            assert_eq!(report.rejected[0].line, 3);
        }

        #[test]
        fn test_parse_signed_amount_kept_for_expense() {
            let txs = parse_csv("header\nexpense,-20.25,Food,desc,2024-01-01");

            assert_eq!(txs[0].amount, Decimal::from_str("-20.25").unwrap());
        }
    }
}
