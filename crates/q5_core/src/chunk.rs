use std::ops::Range;

use q5_error::{DbError, OptionExt, Result};

use crate::config::JoinPredicate;
use crate::index::JoinIndexes;
use crate::merge::NationRevenue;
use crate::tables::LineItem;

/// Join and aggregate line items in `range` against the indexes.
///
/// A line item contributes to its supplier's nation if its order survived the
/// date filter, its supplier exists, and the order's customer is eligible per
/// the indexes' predicate. Anything failing a lookup is skipped.
///
/// Only reads its inputs, so disjoint (or overlapping) ranges of the same
/// table can be processed concurrently.
pub fn process_chunk(
    lineitems: &[LineItem],
    range: Range<usize>,
    indexes: &JoinIndexes,
) -> Result<NationRevenue> {
    if range.start > range.end || range.end > lineitems.len() {
        return Err(DbError::new("Line item range out of bounds")
            .with_field("start", range.start)
            .with_field("end", range.end)
            .with_field("len", lineitems.len()));
    }

    let mut revenues = NationRevenue::new();

    for item in &lineitems[range] {
        let Some(&custkey) = indexes.order_to_customer.get(&item.orderkey) else {
            continue;
        };

        let Some(&nationkey) = indexes.supplier_to_nation.get(&item.suppkey) else {
            continue;
        };

        if !indexes
            .customer_eligible
            .get(&custkey)
            .copied()
            .unwrap_or(false)
        {
            continue;
        }

        if indexes.predicate == JoinPredicate::SameNation {
            // Every eligible customer was given a nation when the indexes
            // were built.
            let cust_nation = indexes
                .customer_nation
                .get(&custkey)
                .required("customer nation")?;
            if *cust_nation != nationkey {
                continue;
            }
        }

        *revenues.entry(nationkey).or_insert(0.0) += item.revenue();
    }

    Ok(revenues)
}
