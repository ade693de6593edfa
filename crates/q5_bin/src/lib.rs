use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use q5_core::config::{JoinPredicate, QueryConfig};
use q5_core::query::{Q5Query, QueryResult};
use q5_core::tables::Tables;
use q5_error::{Result, ResultExt};
use tracing::{info, warn};

#[derive(Debug, Clone, Parser)]
#[clap(name = "q5", about = "Run TPC-H Query 5 over dbgen .tbl files")]
pub struct Arguments {
    /// Path to customer.tbl.
    #[clap(long, env = "Q5_CUSTOMER_PATH")]
    pub customer_path: PathBuf,
    /// Path to orders.tbl.
    #[clap(long, env = "Q5_ORDERS_PATH")]
    pub orders_path: PathBuf,
    /// Path to lineitem.tbl.
    #[clap(long, env = "Q5_LINEITEM_PATH")]
    pub lineitem_path: PathBuf,
    /// Path to supplier.tbl.
    #[clap(long, env = "Q5_SUPPLIER_PATH")]
    pub supplier_path: PathBuf,
    /// Path to nation.tbl.
    #[clap(long, env = "Q5_NATION_PATH")]
    pub nation_path: PathBuf,
    /// Path to region.tbl.
    #[clap(long, env = "Q5_REGION_PATH")]
    pub region_path: PathBuf,
    /// Only report revenue for nations in this region.
    #[clap(long, env = "Q5_REGION_NAME", default_value = "ASIA")]
    pub region_name: String,
    /// Start of the order date range, inclusive (YYYY-MM-DD).
    #[clap(long, env = "Q5_DATE_FROM", default_value = "1994-01-01", value_parser = q5_tbl::parse_date)]
    pub date_from: NaiveDate,
    /// End of the order date range, exclusive (YYYY-MM-DD).
    #[clap(long, env = "Q5_DATE_TO", default_value = "1995-01-01", value_parser = q5_tbl::parse_date)]
    pub date_to: NaiveDate,
    /// Number of worker threads. Defaults to the number of cores.
    #[clap(long, env = "Q5_THREADS")]
    pub threads: Option<usize>,
    /// Write results to this file instead of stdout.
    #[clap(long, env = "Q5_OUTPUT")]
    pub output: Option<PathBuf>,
    /// Which customer/supplier pairs count towards revenue.
    #[clap(long, env = "Q5_PREDICATE", value_enum, default_value_t = PredicateArg::SameNation)]
    pub predicate: PredicateArg,
    /// Log level used when RUST_LOG is not set.
    #[clap(long, env = "Q5_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
    /// Format of log lines written to stderr.
    #[clap(long, env = "Q5_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Human)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PredicateArg {
    /// Customer and supplier in the same nation, within the region.
    SameNation,
    /// Customer in any nation that has a supplier. Region is not checked.
    SupplierNation,
}

impl From<PredicateArg> for JoinPredicate {
    fn from(value: PredicateArg) -> Self {
        match value {
            PredicateArg::SameNation => JoinPredicate::SameNation,
            PredicateArg::SupplierNation => JoinPredicate::SupplierNationReachable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Human,
    Json,
}

impl From<LogFormatArg> for logutil::LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Human => logutil::LogFormat::HumanReadable,
            LogFormatArg::Json => logutil::LogFormat::Json,
        }
    }
}

/// Where to load tables from, and the filters to apply while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub customer_path: PathBuf,
    pub orders_path: PathBuf,
    pub lineitem_path: PathBuf,
    pub supplier_path: PathBuf,
    pub nation_path: PathBuf,
    pub region_path: PathBuf,
    pub region_name: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl Arguments {
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            customer_path: self.customer_path.clone(),
            orders_path: self.orders_path.clone(),
            lineitem_path: self.lineitem_path.clone(),
            supplier_path: self.supplier_path.clone(),
            nation_path: self.nation_path.clone(),
            region_path: self.region_path.clone(),
            region_name: self.region_name.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }

    pub fn query_config(&self) -> QueryConfig {
        let defaults = QueryConfig::default();
        QueryConfig {
            num_threads: self.threads.unwrap_or(defaults.num_threads).max(1),
            predicate: self.predicate.into(),
        }
    }
}

pub fn load_tables(conf: &LoadConfig) -> Result<Tables> {
    if conf.date_from >= conf.date_to {
        warn!(date_from = %conf.date_from, date_to = %conf.date_to, "empty order date range");
    }

    let customers = q5_tbl::load_customers(&conf.customer_path)?;
    info!(rows = customers.len(), "loaded customers");

    let orders = q5_tbl::load_orders(&conf.orders_path, conf.date_from, conf.date_to)?;
    info!(rows = orders.len(), "loaded orders");

    let lineitems = q5_tbl::load_lineitems(&conf.lineitem_path)?;
    info!(rows = lineitems.len(), "loaded line items");

    let suppliers = q5_tbl::load_suppliers(&conf.supplier_path)?;
    info!(rows = suppliers.len(), "loaded suppliers");

    let nations = q5_tbl::load_nations(&conf.nation_path)?;
    info!(rows = nations.len(), "loaded nations");

    let regions = q5_tbl::load_regions(&conf.region_path, &conf.region_name)?;
    info!(rows = regions.len(), region = %conf.region_name, "loaded regions");

    Ok(Tables {
        customers,
        orders,
        lineitems,
        suppliers,
        nations,
        regions,
    })
}

/// Write results as CSV with a `n_name,revenue` header.
pub fn write_results(mut writer: impl Write, results: &[QueryResult]) -> Result<()> {
    writeln!(writer, "n_name,revenue")?;
    for row in results {
        writeln!(writer, "{},{:.4}", row.nation, row.revenue)?;
    }
    Ok(())
}

/// Load, execute, and write out the results.
pub fn run(args: &Arguments) -> Result<()> {
    let start = Instant::now();

    let tables = load_tables(&args.load_config())?;
    let loaded = Instant::now();
    info!(
        elapsed_ms = loaded.duration_since(start).as_millis() as u64,
        "data loading completed"
    );

    let conf = args.query_config();
    info!(num_threads = conf.num_threads, predicate = ?conf.predicate, "processing query");

    let query = Q5Query::try_new(conf)?;
    let results = query.execute(Arc::new(tables))?;
    query.shutdown()?;

    let finished = Instant::now();
    info!(
        elapsed_ms = finished.duration_since(loaded).as_millis() as u64,
        total_ms = finished.duration_since(start).as_millis() as u64,
        "query processing completed"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .context_fn(|| format!("Failed to open output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_results(&mut writer, &results)?;
            writer.flush()?;
            info!(path = %path.display(), "results written");
        }
        None => {
            let mut writer = BufWriter::new(io::stdout().lock());
            write_results(&mut writer, &results)?;
            writer.flush()?;
        }
    }

    Ok(())
}
