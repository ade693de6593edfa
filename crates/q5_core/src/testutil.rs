//! Row constructors and a brute force reference for tests.

use chrono::NaiveDate;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::JoinPredicate;
use crate::tables::{Customer, LineItem, Nation, Order, Region, Supplier, Tables};

pub fn customer(custkey: i32, nationkey: i32) -> Customer {
    Customer { custkey, nationkey }
}

pub fn order(orderkey: i32, custkey: i32) -> Order {
    Order {
        orderkey,
        custkey,
        orderdate: NaiveDate::from_ymd_opt(1994, 6, 1).unwrap(),
    }
}

pub fn lineitem(orderkey: i32, suppkey: i32, extendedprice: f64, discount: f64) -> LineItem {
    LineItem {
        orderkey,
        suppkey,
        extendedprice,
        discount,
    }
}

pub fn supplier(suppkey: i32, nationkey: i32) -> Supplier {
    Supplier { suppkey, nationkey }
}

pub fn nation(nationkey: i32, name: &str, regionkey: i32) -> Nation {
    Nation {
        nationkey,
        name: name.to_string(),
        regionkey,
    }
}

pub fn region(regionkey: i32, name: &str) -> Region {
    Region {
        regionkey,
        name: name.to_string(),
    }
}

/// Generate tables with dangling keys on every join edge.
///
/// Five nations alternate between region 0 and 1, only region 0 is included.
pub fn generate_tables(seed: u64, num_lineitems: usize) -> Tables {
    let mut rng = StdRng::seed_from_u64(seed);

    let nations = ["ALGERIA", "ARGENTINA", "BRAZIL", "CANADA", "EGYPT"]
        .iter()
        .enumerate()
        .map(|(idx, name)| nation(idx as i32, name, idx as i32 % 2))
        .collect();

    let suppliers = (0..20)
        .map(|key| supplier(key, rng.random_range(0..5)))
        .collect();
    let customers = (0..30)
        .map(|key| customer(key, rng.random_range(0..5)))
        .collect();
    let orders = (0..50)
        .map(|key| order(key, rng.random_range(0..35)))
        .collect();
    let lineitems = (0..num_lineitems)
        .map(|_| {
            lineitem(
                rng.random_range(0..60),
                rng.random_range(0..25),
                rng.random_range(1.0..10_000.0),
                rng.random_range(0.0..0.1),
            )
        })
        .collect();

    Tables {
        customers,
        orders,
        lineitems,
        suppliers,
        nations,
        regions: vec![region(0, "AFRICA")],
    }
}

/// Nested loop evaluation of the query, keyed by nation name.
pub fn brute_force(tables: &Tables, predicate: JoinPredicate) -> HashMap<String, f64> {
    let mut out = HashMap::new();

    for item in &tables.lineitems {
        let Some(order) = tables
            .orders
            .iter()
            .rev()
            .find(|o| o.orderkey == item.orderkey)
        else {
            continue;
        };
        let Some(cust) = tables
            .customers
            .iter()
            .rev()
            .find(|c| c.custkey == order.custkey)
        else {
            continue;
        };
        let Some(supp) = tables
            .suppliers
            .iter()
            .rev()
            .find(|s| s.suppkey == item.suppkey)
        else {
            continue;
        };

        let keep = match predicate {
            JoinPredicate::SameNation => {
                cust.nationkey == supp.nationkey
                    && tables.nations.iter().any(|n| {
                        n.nationkey == supp.nationkey
                            && tables.regions.iter().any(|r| r.regionkey == n.regionkey)
                    })
            }
            JoinPredicate::SupplierNationReachable => tables
                .suppliers
                .iter()
                .any(|s| s.nationkey == cust.nationkey),
        };
        if !keep {
            continue;
        }

        let Some(name) = tables
            .nations
            .iter()
            .rev()
            .find(|n| n.nationkey == supp.nationkey)
        else {
            continue;
        };

        *out.entry(name.name.clone()).or_insert(0.0) += item.revenue();
    }

    out
}

/// Relative float comparison.
pub fn assert_close(expected: f64, got: f64) {
    let tol = 1e-9 * expected.abs().max(1.0);
    assert!(
        (expected - got).abs() <= tol,
        "expected: {expected}, got: {got}"
    );
}
