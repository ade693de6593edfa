use std::ops::Range;
use std::sync::Arc;

use hashbrown::HashMap;
use q5_error::Result;
use q5_rt_native::ThreadedExecutor;
use tracing::debug;

use crate::chunk::process_chunk;
use crate::config::{JoinPredicate, QueryConfig};
use crate::index::JoinIndexes;
use crate::merge::{NationRevenue, merge_partials};
use crate::tables::Tables;

/// A single output row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub nation: String,
    pub revenue: f64,
}

/// Split `len` items into at most `parts` contiguous ranges.
///
/// Every range but the last holds `ceil(len / parts)` items. Ranges that would
/// start past the end are omitted, so fewer than `parts` ranges are returned
/// when there are fewer items than parts.
pub fn chunk_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let chunk_size = len.div_ceil(parts);

    (0..parts)
        .map(|idx| idx * chunk_size)
        .take_while(|&start| start < len)
        .map(|start| start..usize::min(start + chunk_size, len))
        .collect()
}

/// Executes Q5 on a pool of worker threads.
///
/// The pool lives as long as this struct, so one `Q5Query` can execute any
/// number of queries.
#[derive(Debug)]
pub struct Q5Query {
    executor: ThreadedExecutor,
    predicate: JoinPredicate,
}

impl Q5Query {
    pub fn try_new(config: QueryConfig) -> Result<Self> {
        Ok(Q5Query {
            executor: ThreadedExecutor::try_new(config.num_threads)?,
            predicate: config.predicate,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.executor.num_threads()
    }

    /// Execute the query, returning rows ordered by revenue descending.
    ///
    /// Rows with equal revenue are ordered by nation key. If any of the input
    /// tables are empty, the result is empty.
    ///
    /// The query fails as a whole if any chunk fails.
    pub fn execute(&self, tables: Arc<Tables>) -> Result<Vec<QueryResult>> {
        if tables.any_empty() {
            debug!("input table empty, skipping execution");
            return Ok(Vec::new());
        }

        let indexes = Arc::new(JoinIndexes::build(&tables, self.predicate));
        self.execute_with_indexes(tables, indexes)
    }

    /// Probe prebuilt indexes, merge, and sort.
    pub(crate) fn execute_with_indexes(
        &self,
        tables: Arc<Tables>,
        indexes: Arc<JoinIndexes>,
    ) -> Result<Vec<QueryResult>> {
        let ranges = chunk_ranges(tables.lineitems.len(), self.executor.num_threads());
        debug!(
            lineitems = tables.lineitems.len(),
            chunks = ranges.len(),
            "dispatching line item chunks"
        );

        let handles = ranges
            .into_iter()
            .map(|range| {
                let tables = tables.clone();
                let indexes = indexes.clone();
                self.executor
                    .submit(move || process_chunk(&tables.lineitems, range, &indexes))
            })
            .collect::<Result<Vec<_>>>()?;

        // Collect in submission order so the merged float sums are the same
        // from run to run.
        let partials = handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Result<Vec<_>>>()?;

        let merged = merge_partials(partials);

        Ok(sort_results(merged, &indexes.nation_name))
    }

    /// Stop the worker threads, waiting for them to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.executor.shutdown()
    }
}

/// Attach nation names and sort by revenue descending, then nation key.
///
/// Nations without a name are dropped.
fn sort_results(merged: NationRevenue, nation_name: &HashMap<i32, String>) -> Vec<QueryResult> {
    let mut rows: Vec<_> = merged
        .into_iter()
        .filter_map(|(nationkey, revenue)| {
            let name = nation_name.get(&nationkey)?;
            Some((
                nationkey,
                QueryResult {
                    nation: name.clone(),
                    revenue,
                },
            ))
        })
        .collect();

    rows.sort_by(|(a_key, a), (b_key, b)| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a_key.cmp(b_key))
    });

    rows.into_iter().map(|(_, row)| row).collect()
}
