//! Loading of TPC-H `.tbl` files into the row types used by the query.
//!
//! Files are `|` delimited, one row per line, in `dbgen` column order. Only
//! the columns the query needs are parsed. Lines with too few fields are
//! skipped, parse failures are errors.

mod reader;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDate;
use q5_core::tables::{Customer, LineItem, Nation, Order, Region, Supplier};
use q5_error::{Result, ResultExt};
pub use reader::parse_date;
use reader::read_rows;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).context_fn(|| format!("Failed to open table file: {}", path.display()))?;
    Ok(BufReader::new(file))
}

pub fn load_customers(path: impl AsRef<Path>) -> Result<Vec<Customer>> {
    let path = path.as_ref();
    customers_from_reader(open(path)?, &path.to_string_lossy())
}

pub fn customers_from_reader(reader: impl BufRead, source: &str) -> Result<Vec<Customer>> {
    read_rows(reader, source, 4, |f| {
        Ok(Some(Customer {
            custkey: f.int(0, "c_custkey")?,
            nationkey: f.int(3, "c_nationkey")?,
        }))
    })
}

/// Load orders placed in `[date_from, date_to)`.
pub fn load_orders(
    path: impl AsRef<Path>,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<Order>> {
    let path = path.as_ref();
    orders_from_reader(open(path)?, &path.to_string_lossy(), date_from, date_to)
}

pub fn orders_from_reader(
    reader: impl BufRead,
    source: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<Order>> {
    read_rows(reader, source, 5, |f| {
        let orderdate = f.date(4, "o_orderdate")?;
        if orderdate < date_from || orderdate >= date_to {
            return Ok(None);
        }

        Ok(Some(Order {
            orderkey: f.int(0, "o_orderkey")?,
            custkey: f.int(1, "o_custkey")?,
            orderdate,
        }))
    })
}

pub fn load_lineitems(path: impl AsRef<Path>) -> Result<Vec<LineItem>> {
    let path = path.as_ref();
    lineitems_from_reader(open(path)?, &path.to_string_lossy())
}

pub fn lineitems_from_reader(reader: impl BufRead, source: &str) -> Result<Vec<LineItem>> {
    // Discount is the seventh column.
    read_rows(reader, source, 7, |f| {
        Ok(Some(LineItem {
            orderkey: f.int(0, "l_orderkey")?,
            suppkey: f.int(2, "l_suppkey")?,
            extendedprice: f.float(5, "l_extendedprice")?,
            discount: f.float(6, "l_discount")?,
        }))
    })
}

pub fn load_suppliers(path: impl AsRef<Path>) -> Result<Vec<Supplier>> {
    let path = path.as_ref();
    suppliers_from_reader(open(path)?, &path.to_string_lossy())
}

pub fn suppliers_from_reader(reader: impl BufRead, source: &str) -> Result<Vec<Supplier>> {
    read_rows(reader, source, 4, |f| {
        Ok(Some(Supplier {
            suppkey: f.int(0, "s_suppkey")?,
            nationkey: f.int(3, "s_nationkey")?,
        }))
    })
}

pub fn load_nations(path: impl AsRef<Path>) -> Result<Vec<Nation>> {
    let path = path.as_ref();
    nations_from_reader(open(path)?, &path.to_string_lossy())
}

pub fn nations_from_reader(reader: impl BufRead, source: &str) -> Result<Vec<Nation>> {
    read_rows(reader, source, 3, |f| {
        Ok(Some(Nation {
            nationkey: f.int(0, "n_nationkey")?,
            name: f.text(1, "n_name")?.to_string(),
            regionkey: f.int(2, "n_regionkey")?,
        }))
    })
}

/// Load regions named `region_name`. An empty name loads every region.
pub fn load_regions(path: impl AsRef<Path>, region_name: &str) -> Result<Vec<Region>> {
    let path = path.as_ref();
    regions_from_reader(open(path)?, &path.to_string_lossy(), region_name)
}

pub fn regions_from_reader(
    reader: impl BufRead,
    source: &str,
    region_name: &str,
) -> Result<Vec<Region>> {
    read_rows(reader, source, 2, |f| {
        let name = f.text(1, "r_name")?;
        if !region_name.is_empty() && name != region_name {
            return Ok(None);
        }

        Ok(Some(Region {
            regionkey: f.int(0, "r_regionkey")?,
            name: name.to_string(),
        }))
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn customers() {
        let input = "1|Customer#000000001|IVhzIApeRb|15|25-989-741-2988|711.56|BUILDING|comment|\n\
                     2|Customer#000000002|XSTf4,NCwDVaW|13|23-768-687-3665|121.65|AUTOMOBILE|x|\n";

        let got = customers_from_reader(Cursor::new(input), "customer.tbl").unwrap();
        let expected = vec![
            Customer {
                custkey: 1,
                nationkey: 15,
            },
            Customer {
                custkey: 2,
                nationkey: 13,
            },
        ];
        assert_eq!(expected, got);
    }

    #[test]
    fn orders_filtered_by_date() {
        let input = "1|36901|O|173665.47|1993-12-31|5-LOW|Clerk#000000951|0|x|\n\
                     2|78002|O|46929.18|1994-01-01|1-URGENT|Clerk#000000880|0|x|\n\
                     3|12332|F|193846.25|'1994-10-27'|5-LOW|Clerk#000000955|0|x|\n\
                     4|13678|O|32151.78|1995-01-01|5-LOW|Clerk#000000124|0|x|\n";

        let got = orders_from_reader(
            Cursor::new(input),
            "orders.tbl",
            date("1994-01-01"),
            date("1995-01-01"),
        )
        .unwrap();

        let keys: Vec<_> = got.iter().map(|o| (o.orderkey, o.custkey)).collect();
        assert_eq!(vec![(2, 78002), (3, 12332)], keys);
        assert_eq!(date("1994-10-27"), got[1].orderdate);
    }

    #[test]
    fn orders_bad_date() {
        let input = "1|36901|O|173665.47|12/31/1993|5-LOW|Clerk#000000951|0|x|\n";
        let err = orders_from_reader(
            Cursor::new(input),
            "orders.tbl",
            date("1994-01-01"),
            date("1995-01-01"),
        )
        .unwrap_err();
        assert_eq!(Some("o_orderdate"), err.get_field("field"));
    }

    #[test]
    fn lineitems_skip_short_lines() {
        let input = "1|155190|7706|1|17|21168.23|0.04|0.02|N|O|1996-03-13|\n\
                     1|67310|7311|2|36|45983.16\n\
                     3|4297|1798|1|45|54058.05|0.06|0.00|R|F|1994-02-02|\n";

        let got = lineitems_from_reader(Cursor::new(input), "lineitem.tbl").unwrap();
        assert_eq!(2, got.len());
        assert_eq!(7706, got[0].suppkey);
        assert_eq!(0.04, got[0].discount);
        assert_eq!(3, got[1].orderkey);
        assert_eq!(54058.05, got[1].extendedprice);
    }

    #[test]
    fn lineitems_bad_price() {
        let input = "1|155190|7706|1|17|abc|0.04|0.02|N|O|1996-03-13|\n";
        let err = lineitems_from_reader(Cursor::new(input), "lineitem.tbl").unwrap_err();
        assert_eq!(Some("l_extendedprice"), err.get_field("field"));
        assert_eq!(Some("1"), err.get_field("line"));
    }

    #[test]
    fn nations_trimmed() {
        let input = "8|INDIA  |2|comment|\n12| JAPAN|2|comment|\n";
        let got = nations_from_reader(Cursor::new(input), "nation.tbl").unwrap();

        let names: Vec<_> = got.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(vec!["INDIA", "JAPAN"], names);
        assert_eq!(2, got[1].regionkey);
    }

    #[test]
    fn regions_filtered_by_name() {
        let input = "0|AFRICA|x|\n1|AMERICA|x|\n2|ASIA |x|\n3|EUROPE|x|\n";

        let asia = regions_from_reader(Cursor::new(input), "region.tbl", "ASIA").unwrap();
        assert_eq!(
            vec![Region {
                regionkey: 2,
                name: "ASIA".to_string(),
            }],
            asia
        );

        let all = regions_from_reader(Cursor::new(input), "region.tbl", "").unwrap();
        assert_eq!(4, all.len());

        let none = regions_from_reader(Cursor::new(input), "region.tbl", "ATLANTIS").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("supplier.tbl");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "1|Supplier#000000001|N kD4on9OM Ipw3,gf0JBoQDd7tgrzrddZ|17|27-918-335-1736|5755.94|x|").unwrap();
        writeln!(file, "2|Supplier#000000002|89eJ5ksX3ImxJQBvxObC,|5|15-679-861-2259|4032.68|x|").unwrap();
        drop(file);

        let got = load_suppliers(&path).unwrap();
        let expected = vec![
            Supplier {
                suppkey: 1,
                nationkey: 17,
            },
            Supplier {
                suppkey: 2,
                nationkey: 5,
            },
        ];
        assert_eq!(expected, got);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_customers(dir.path().join("nope.tbl")).unwrap_err();
        assert!(err.get_msg().contains("nope.tbl"), "{err}");
    }
}
