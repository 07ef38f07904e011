use chrono::Utc;
use futures::StreamExt;
use futures::stream;

use crate::data_models::{Outcome, RunSummary, Table};
use crate::search::SearchProvider;
use crate::validator::Validator;

/// Validates every row of a table. Up to `concurrency` rows are in flight at
/// once; verdicts are written back by row index, so completion order never
/// shows up in the output.
pub struct Runner<P> {
    validator: Validator<P>,
    concurrency: usize,
}

impl<P: SearchProvider> Runner<P> {
    pub fn new(validator: Validator<P>, concurrency: usize) -> Runner<P> {
        Runner {
            validator,
            concurrency: concurrency.max(1),
        }
    }

    pub fn validator(&self) -> &Validator<P> {
        &self.validator
    }

    pub async fn run(&self, table: &mut Table) -> RunSummary {
        let mut summary = RunSummary::new(Utc::now());
        let total = table.len();
        log::info!(
            "Validating {total} queries with concurrency {}",
            self.concurrency
        );

        let jobs = table.rows.iter().enumerate().map(|(idx, row)| async move {
            let outcome = self
                .validator
                .validate(&row.query, &row.expected_groups)
                .await;
            log::info!("row {}/{total}: {}", idx + 1, outcome.verdict());
            (idx, outcome)
        });
        let outcomes: Vec<(usize, Outcome)> = stream::iter(jobs)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (idx, outcome) in outcomes {
            let verdict = outcome.verdict();
            if let Outcome::Matched { group_id, url } = &outcome {
                log::debug!("row {} matched {group_id} via {url}", idx + 1);
            }
            table.rows[idx].verdict = Some(verdict);
            summary.record(verdict);
        }

        summary.finished_at = Utc::now();
        log::info!(
            "--- Processing complete: {} matched, {} not matched, {} errors ---",
            summary.matched,
            summary.not_matched,
            summary.errors
        );
        summary
    }
}
