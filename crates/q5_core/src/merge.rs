use hashbrown::HashMap;

/// Revenue accumulated per nation key.
pub type NationRevenue = HashMap<i32, f64>;

/// Sum partial aggregates into a single map.
///
/// Partials are folded in iteration order. Reordering them only changes the
/// result by float rounding.
pub fn merge_partials<I>(partials: I) -> NationRevenue
where
    I: IntoIterator<Item = NationRevenue>,
{
    let mut merged = NationRevenue::new();

    for partial in partials {
        for (nationkey, revenue) in partial {
            *merged.entry(nationkey).or_insert(0.0) += revenue;
        }
    }

    merged
}
