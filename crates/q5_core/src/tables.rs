//! Rows of the six TPC-H tables Q5 reads.
//!
//! Only the columns the query touches are kept.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    pub custkey: i32,
    pub nationkey: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub orderkey: i32,
    pub custkey: i32,
    pub orderdate: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineItem {
    pub orderkey: i32,
    pub suppkey: i32,
    pub extendedprice: f64,
    pub discount: f64,
}

impl LineItem {
    /// Discounted price, `l_extendedprice * (1 - l_discount)`.
    pub fn revenue(&self) -> f64 {
        self.extendedprice * (1.0 - self.discount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supplier {
    pub suppkey: i32,
    pub nationkey: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nation {
    pub nationkey: i32,
    pub name: String,
    pub regionkey: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub regionkey: i32,
    pub name: String,
}

/// All inputs to a single query execution.
///
/// Orders are expected to already be restricted to the query's date range,
/// and regions to the query's target region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub lineitems: Vec<LineItem>,
    pub suppliers: Vec<Supplier>,
    pub nations: Vec<Nation>,
    pub regions: Vec<Region>,
}

impl Tables {
    /// If any of the tables has no rows, in which case the query result is
    /// trivially empty.
    pub fn any_empty(&self) -> bool {
        self.customers.is_empty()
            || self.orders.is_empty()
            || self.lineitems.is_empty()
            || self.suppliers.is_empty()
            || self.nations.is_empty()
            || self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineitem_revenue() {
        let item = LineItem {
            orderkey: 1,
            suppkey: 1,
            extendedprice: 200.0,
            discount: 0.25,
        };
        assert_eq!(150.0, item.revenue());
    }

    #[test]
    fn default_tables_empty() {
        assert!(Tables::default().any_empty());
    }
}
