use crate::transaction::Transaction;

use rust_decimal::Decimal;
use std::io::{self, Write};

/// Income/expense totals over a set of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    /// Expense totals per category, in order of first appearance.
    pub expenses_by_category: Vec<(String, Decimal)>,
}

impl Summary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let mut expenses_by_category: Vec<(String, Decimal)> = Vec::new();

        for tx in transactions {
            if tx.is_income() {
                total_income += tx.amount;
                continue;
            }

            total_expense += tx.amount;
            match expenses_by_category
                .iter_mut()
                .find(|(category, _)| *category == tx.category)
            {
                Some((_, total)) => *total += tx.amount,
                None => expenses_by_category.push((tx.category.clone(), tx.amount)),
            }
        }

        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            expenses_by_category,
        }
    }

    pub fn write_report<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "--- Financial Summary ---")?;
        writeln!(writer, "Total Income: ${}", money(self.total_income))?;
        writeln!(writer, "Total Expenses: ${}", money(self.total_expense))?;
        writeln!(writer, "Balance: ${}", money(self.balance))?;

        writeln!(writer)?;
        writeln!(writer, "--- Expenses by Category ---")?;
        if self.expenses_by_category.is_empty() {
            writeln!(writer, "No expense data available.")?;
        }
        for (category, total) in &self.expenses_by_category {
            writeln!(writer, "{:<15} ${:>8}", capitalize(category), money(*total))?;
        }

        Ok(())
    }
}

pub fn write_table<W: Write>(mut writer: W, transactions: &[Transaction]) -> io::Result<()> {
    if transactions.is_empty() {
        return writeln!(writer, "No transactions to show.");
    }

    writeln!(writer, "--- All Transactions ---")?;
    writeln!(
        writer,
        "{:<12} {:<8} {:>10}  {:<15} {:<30}",
        "Date", "Type", "Amount", "Category", "Description"
    )?;
    writeln!(writer, "{}", "-".repeat(78))?;

    for tx in transactions {
        writeln!(
            writer,
            "{:<12} {:<8} ${:>9}  {:<15} {:<30}",
            tx.date,
            capitalize(tx.kind.as_str()),
            money(tx.amount),
            tx.category,
            tx.description
        )?;
    }

    Ok(())
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
