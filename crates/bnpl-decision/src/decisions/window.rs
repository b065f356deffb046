use chrono::{Duration, NaiveDate};

use super::domain::Transaction;

/// Restrict the history to the trailing analysis window ending at `now`.
///
/// Keeps transactions dated on or after `now - window_days`. Relative input
/// order is preserved; sorting happens downstream. An empty result is valid
/// and produces the zeroed-factor fail-safe rather than an error.
pub(crate) fn filter_to_window(
    transactions: Vec<Transaction>,
    now: NaiveDate,
    window_days: i64,
) -> Vec<Transaction> {
    let cutoff = now - Duration::days(window_days);
    transactions
        .into_iter()
        .filter(|txn| txn.date >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisions::domain::TransactionKind;

    fn txn(date: NaiveDate) -> Transaction {
        Transaction {
            transaction_id: format!("txn-{date}"),
            date,
            amount_cents: 1_000,
            kind: TransactionKind::Credit,
            description: String::new(),
            category: String::new(),
            merchant: None,
            balance_cents: 1_000,
            nsf: false,
        }
    }

    #[test]
    fn keeps_transactions_on_or_after_cutoff() {
        let now = NaiveDate::from_ymd_opt(2026, 8, 30).expect("valid date");
        let inside = txn(now - Duration::days(90));
        let outside = txn(now - Duration::days(91));
        let today = txn(now);

        let kept = filter_to_window(vec![outside, inside.clone(), today.clone()], now, 90);

        assert_eq!(kept, vec![inside, today]);
    }

    #[test]
    fn empty_input_stays_empty() {
        let now = NaiveDate::from_ymd_opt(2026, 8, 30).expect("valid date");
        assert!(filter_to_window(Vec::new(), now, 90).is_empty());
    }
}
