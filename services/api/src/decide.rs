use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::info;

use bnpl_decision::decisions::{DecisionService, ScoringEngine, UserId};
use bnpl_decision::error::AppError;

use crate::infra::InMemoryDecisionRepository;

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// Path to a transaction history CSV
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Requested purchase amount in cents
    #[arg(long)]
    pub(crate) amount_cents: i64,
    /// User identifier recorded with the decision
    #[arg(long, default_value = "cli-user")]
    pub(crate) user_id: String,
    /// Decision date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Override the analysis window in days
    #[arg(long)]
    pub(crate) window_days: Option<i64>,
}

/// Score a CSV history and print the decision as JSON, without the server.
pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let file = File::open(&args.csv)?;
    let transactions = bnpl_decision::decisions::read_transactions(BufReader::new(file))
        .map_err(|err| AppError::InvalidRequest(err.to_string()))?;
    info!(count = transactions.len(), path = %args.csv.display(), "transactions loaded");

    let engine = match args.window_days {
        Some(days) => ScoringEngine::with_window(days),
        None => ScoringEngine::default(),
    };
    let service = DecisionService::new(
        Arc::new(NoSource),
        Arc::new(InMemoryDecisionRepository::default()),
        engine,
    );

    let user_id = UserId(args.user_id);
    let now = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let decision =
        service.decide_with_transactions(&user_id, args.amount_cents, transactions, now)?;

    let rendered = serde_json::to_string_pretty(&decision)
        .map_err(|err| AppError::InvalidRequest(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

/// The offline path supplies the history directly, so the source is inert.
struct NoSource;

impl bnpl_decision::decisions::TransactionSource for NoSource {
    fn fetch(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<bnpl_decision::decisions::Transaction>, bnpl_decision::decisions::SourceError>
    {
        Err(bnpl_decision::decisions::SourceError::NotFound)
    }
}
