/// Which customer/supplier pairs are allowed to contribute revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPredicate {
    /// Customer and supplier must be in the same nation, and that nation must
    /// belong to the target region.
    #[default]
    SameNation,
    /// Customer only needs to be in some nation that has a supplier. The line
    /// item's own supplier may be elsewhere, and the region is not checked.
    ///
    /// Looser than Q5 proper, kept for comparing against results produced
    /// with that filter.
    SupplierNationReachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Number of workers, and the number of chunks line items are split into.
    pub num_threads: usize,
    pub predicate: JoinPredicate,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            num_threads: num_cpus::get(),
            predicate: JoinPredicate::default(),
        }
    }
}
