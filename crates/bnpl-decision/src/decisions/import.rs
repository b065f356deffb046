use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{Transaction, TransactionKind};

/// Error raised while importing a CSV transaction export.
#[derive(Debug, thiserror::Error)]
pub enum TransactionImportError {
    #[error("failed to read transaction csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: unknown transaction type '{value}'")]
    UnknownKind { row: usize, value: String },
}

/// Parse transactions from a CSV export (bank download or fixture file).
///
/// Expected header: `transaction_id,date,amount_cents,type,description,
/// category,merchant,balance_cents,nsf`. Description, category, merchant,
/// and nsf may be empty.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, TransactionImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut transactions = Vec::new();

    for (index, record) in csv_reader.deserialize::<TransactionRow>().enumerate() {
        let row = record?;
        // Header is line 1, so data rows start at line 2.
        transactions.push(row.into_transaction(index + 2)?);
    }

    Ok(transactions)
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    transaction_id: String,
    date: String,
    amount_cents: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    merchant: Option<String>,
    balance_cents: i64,
    #[serde(default)]
    nsf: Option<String>,
}

impl TransactionRow {
    fn into_transaction(self, row: usize) -> Result<Transaction, TransactionImportError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            TransactionImportError::InvalidDate {
                row,
                value: self.date.clone(),
            }
        })?;

        let kind = match self.kind.trim().to_ascii_lowercase().as_str() {
            "credit" => TransactionKind::Credit,
            "debit" => TransactionKind::Debit,
            other => {
                return Err(TransactionImportError::UnknownKind {
                    row,
                    value: other.to_string(),
                })
            }
        };

        let nsf = self
            .nsf
            .as_deref()
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        Ok(Transaction {
            transaction_id: self.transaction_id,
            date,
            amount_cents: self.amount_cents,
            kind,
            description: self.description,
            category: self.category,
            merchant: self.merchant,
            balance_cents: self.balance_cents,
            nsf,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
