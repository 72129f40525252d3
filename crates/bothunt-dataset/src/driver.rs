//! Whole-dataset fill runs with bounded retry rounds.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use bothunt_core::{AccountId, AccountProvider, AppConfig};

use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::filler::{RowFill, RowFiller};
use crate::store::Persist;

/// Upper bound on the pause between retry rounds.
const MAX_ROUND_DELAY_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOptions {
    /// Retry rounds after the initial pass.
    pub max_rounds: u32,
    pub round_backoff_base_secs: u64,
    /// Failed attempts after which an account is given up on.
    pub max_account_failures: u32,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_backoff_base_secs: 30,
            max_account_failures: 3,
        }
    }
}

impl FillOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_rounds: config.fill_max_rounds,
            round_backoff_base_secs: config.fill_round_backoff_base_secs,
            max_account_failures: config.fill_max_account_failures.max(1),
        }
    }

    /// Pause before retry round `round` (1-based): `base * 2^(round-1)`,
    /// capped at 15 minutes.
    #[must_use]
    pub fn round_delay(&self, round: u32) -> Duration {
        let exp = round.saturating_sub(1).min(62);
        let secs = self
            .round_backoff_base_secs
            .saturating_mul(1u64 << exp)
            .min(MAX_ROUND_DELAY_SECS);
        Duration::from_secs(secs)
    }
}

/// Summary of a [`RowFiller::fill_dataset`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Retry rounds executed after the initial pass.
    pub rounds: u32,
    /// Row attempts that changed at least one cell (and were persisted).
    pub rows_changed: usize,
    /// Size of the partial-failure subset before the initial pass and
    /// after each pass.
    pub wrong_rows_per_round: Vec<usize>,
    /// Rows still missing timeline features at the end of the run.
    pub unresolved: Vec<AccountId>,
    /// Accounts excluded from retries.
    pub unfillable: Vec<AccountId>,
}

/// Per-account failure bookkeeping.
struct FailureLedger {
    limit: u32,
    failures: HashMap<AccountId, u32>,
    unfillable: HashSet<AccountId>,
}

impl FailureLedger {
    fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            failures: HashMap::new(),
            unfillable: HashSet::new(),
        }
    }

    /// `stalled` marks a row that still needs its timeline although the
    /// attempt hit no fetch error; retrying it cannot change anything.
    fn record(&mut self, id: AccountId, fill: &RowFill, stalled: bool) {
        let Some(err) = fill.outcome.error() else {
            if stalled && self.unfillable.insert(id) {
                tracing::warn!(account_id = id, "timeline features cannot be filled, giving up on account");
            }
            return;
        };
        let count = self.failures.entry(id).or_insert(0);
        *count += 1;
        if (err.is_permanent() || *count >= self.limit) && self.unfillable.insert(id) {
            tracing::warn!(account_id = id, failures = *count, error = %err, "giving up on account");
        }
    }

    fn is_unfillable(&self, id: AccountId) -> bool {
        self.unfillable.contains(&id)
    }

    fn unfillable_sorted(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.unfillable.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl<P: AccountProvider> RowFiller<'_, P> {
    /// Fills every row, then keeps retrying rows whose snapshot landed but
    /// whose timeline features did not.
    ///
    /// `sink` is written after every row attempt that changed a cell. The
    /// run ends when no retryable row is left or `max_rounds` retry rounds
    /// have run, whichever comes first.
    ///
    /// # Errors
    ///
    /// Any [`DatasetError`] from `sink`. Fetch failures never abort the run.
    pub async fn fill_dataset<S: Persist>(
        &self,
        dataset: &mut Dataset,
        sink: &mut S,
        options: &FillOptions,
    ) -> Result<FillReport, DatasetError> {
        let mut ledger = FailureLedger::new(options.max_account_failures);
        let mut report = FillReport::default();

        report.wrong_rows_per_round.push(dataset.partial_rows().len());
        tracing::info!(rows = dataset.len(), "starting initial fill pass");
        for id in dataset.ids() {
            self.attempt(dataset, sink, id, &mut ledger, &mut report)
                .await?;
        }

        loop {
            let pending: Vec<AccountId> = dataset
                .partial_rows()
                .into_iter()
                .filter(|id| !ledger.is_unfillable(*id))
                .collect();
            report.wrong_rows_per_round.push(pending.len());
            tracing::info!(
                round = report.rounds,
                wrong_rows = pending.len(),
                "rows missing timeline features"
            );

            if pending.is_empty() {
                break;
            }
            if report.rounds >= options.max_rounds {
                tracing::warn!(
                    max_rounds = options.max_rounds,
                    remaining = pending.len(),
                    "retry rounds exhausted"
                );
                break;
            }

            report.rounds += 1;
            let delay = options.round_delay(report.rounds);
            if !delay.is_zero() {
                tracing::info!(round = report.rounds, delay_secs = delay.as_secs(), "waiting before retry round");
                tokio::time::sleep(delay).await;
            }

            for id in pending {
                self.attempt(dataset, sink, id, &mut ledger, &mut report)
                    .await?;
            }
        }

        report.unresolved = dataset.partial_rows();
        report.unfillable = ledger.unfillable_sorted();
        tracing::info!(
            rounds = report.rounds,
            rows_changed = report.rows_changed,
            unresolved = report.unresolved.len(),
            unfillable = report.unfillable.len(),
            "fill run finished"
        );
        Ok(report)
    }

    async fn attempt<S: Persist>(
        &self,
        dataset: &mut Dataset,
        sink: &mut S,
        id: AccountId,
        ledger: &mut FailureLedger,
        report: &mut FillReport,
    ) -> Result<(), DatasetError> {
        let fill = self.fill_row(dataset, id).await?;
        if fill.changed {
            sink.persist(dataset)?;
            report.rows_changed += 1;
        }
        let stalled = dataset
            .row(id)
            .is_some_and(|row| row.needs_timeline_retry());
        ledger.record(id, &fill, stalled);
        Ok(())
    }
}
