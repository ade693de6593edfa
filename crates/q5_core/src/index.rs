//! Hash indexes built from the smaller tables before probing line items.
//!
//! Each builder is a single pass over its input. Duplicate keys are not
//! expected, if they do occur the last row wins.

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::config::JoinPredicate;
use crate::tables::{Customer, Nation, Order, Region, Supplier, Tables};

/// o_orderkey -> o_custkey
pub fn build_order_to_customer(orders: &[Order]) -> HashMap<i32, i32> {
    orders.iter().map(|o| (o.orderkey, o.custkey)).collect()
}

/// s_suppkey -> s_nationkey
pub fn build_supplier_to_nation(suppliers: &[Supplier]) -> HashMap<i32, i32> {
    suppliers.iter().map(|s| (s.suppkey, s.nationkey)).collect()
}

/// c_custkey -> c_nationkey
pub fn build_customer_nation(customers: &[Customer]) -> HashMap<i32, i32> {
    customers.iter().map(|c| (c.custkey, c.nationkey)).collect()
}

/// c_custkey -> whether the customer's nation hosts at least one supplier.
pub fn build_customer_eligible(
    customers: &[Customer],
    suppliers: &[Supplier],
) -> HashMap<i32, bool> {
    let supplier_nations: HashSet<i32> = suppliers.iter().map(|s| s.nationkey).collect();

    customers
        .iter()
        .map(|c| (c.custkey, supplier_nations.contains(&c.nationkey)))
        .collect()
}

/// n_nationkey -> n_name
pub fn build_nation_name(nations: &[Nation]) -> HashMap<i32, String> {
    nations
        .iter()
        .map(|n| (n.nationkey, n.name.clone()))
        .collect()
}

/// Nation keys belonging to any of the provided regions.
pub fn build_region_nations(nations: &[Nation], regions: &[Region]) -> HashSet<i32> {
    let region_keys: HashSet<i32> = regions.iter().map(|r| r.regionkey).collect();

    nations
        .iter()
        .filter(|n| region_keys.contains(&n.regionkey))
        .map(|n| n.nationkey)
        .collect()
}

/// Everything a chunk needs to resolve a line item to a nation.
#[derive(Debug, Clone, Default)]
pub struct JoinIndexes {
    pub predicate: JoinPredicate,
    pub order_to_customer: HashMap<i32, i32>,
    pub supplier_to_nation: HashMap<i32, i32>,
    pub customer_eligible: HashMap<i32, bool>,
    /// Only populated for `JoinPredicate::SameNation`.
    pub customer_nation: HashMap<i32, i32>,
    pub nation_name: HashMap<i32, String>,
}

impl JoinIndexes {
    pub fn build(tables: &Tables, predicate: JoinPredicate) -> Self {
        let order_to_customer = build_order_to_customer(&tables.orders);
        let supplier_to_nation = build_supplier_to_nation(&tables.suppliers);
        let mut customer_eligible = build_customer_eligible(&tables.customers, &tables.suppliers);
        let nation_name = build_nation_name(&tables.nations);

        let customer_nation = match predicate {
            JoinPredicate::SameNation => {
                let customer_nation = build_customer_nation(&tables.customers);
                let region_nations = build_region_nations(&tables.nations, &tables.regions);

                for (custkey, eligible) in customer_eligible.iter_mut() {
                    if *eligible {
                        *eligible = customer_nation
                            .get(custkey)
                            .is_some_and(|nation| region_nations.contains(nation));
                    }
                }

                customer_nation
            }
            JoinPredicate::SupplierNationReachable => HashMap::new(),
        };

        debug!(
            ?predicate,
            orders = order_to_customer.len(),
            suppliers = supplier_to_nation.len(),
            customers = customer_eligible.len(),
            nations = nation_name.len(),
            "built join indexes"
        );

        JoinIndexes {
            predicate,
            order_to_customer,
            supplier_to_nation,
            customer_eligible,
            customer_nation,
            nation_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{customer, nation, order, region, supplier};

    #[test]
    fn order_to_customer_last_wins() {
        let orders = [order(1, 10), order(2, 20), order(1, 30)];
        let index = build_order_to_customer(&orders);

        assert_eq!(2, index.len());
        assert_eq!(Some(&30), index.get(&1));
        assert_eq!(Some(&20), index.get(&2));
    }

    #[test]
    fn customer_eligible_requires_supplier_nation() {
        let customers = [customer(1, 0), customer(2, 1), customer(3, 2)];
        let suppliers = [supplier(10, 0), supplier(11, 2), supplier(12, 2)];

        let index = build_customer_eligible(&customers, &suppliers);

        assert_eq!(Some(&true), index.get(&1));
        assert_eq!(Some(&false), index.get(&2));
        assert_eq!(Some(&true), index.get(&3));
        assert_eq!(None, index.get(&4));
    }

    #[test]
    fn region_nations() {
        let nations = [
            nation(0, "ALGERIA", 0),
            nation(8, "INDIA", 2),
            nation(12, "JAPAN", 2),
        ];
        let regions = [region(2, "ASIA")];

        let index = build_region_nations(&nations, &regions);
        assert_eq!(HashSet::from([8, 12]), index);
    }

    #[test]
    fn same_nation_restricts_eligibility_to_region() {
        let tables = Tables {
            customers: vec![customer(1, 8), customer(2, 0)],
            suppliers: vec![supplier(10, 8), supplier(11, 0)],
            nations: vec![nation(0, "ALGERIA", 0), nation(8, "INDIA", 2)],
            regions: vec![region(2, "ASIA")],
            ..Default::default()
        };

        let strict = JoinIndexes::build(&tables, JoinPredicate::SameNation);
        assert_eq!(Some(&true), strict.customer_eligible.get(&1));
        assert_eq!(Some(&false), strict.customer_eligible.get(&2));
        assert_eq!(Some(&8), strict.customer_nation.get(&1));

        let loose = JoinIndexes::build(&tables, JoinPredicate::SupplierNationReachable);
        assert_eq!(Some(&true), loose.customer_eligible.get(&1));
        assert_eq!(Some(&true), loose.customer_eligible.get(&2));
        assert!(loose.customer_nation.is_empty());
    }

    #[test]
    fn nation_names() {
        let index = build_nation_name(&[nation(8, "INDIA", 2), nation(12, "JAPAN", 2)]);
        assert_eq!(Some("JAPAN"), index.get(&12).map(|s| s.as_str()));
    }
}
