use std::io;

use clap::Parser;
use q5_bin::Arguments;

/// Load the TPC-H tables, run Q5, and print revenue per nation as CSV.
fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(args.log_level, args.log_format.into(), io::stderr);

    if let Err(e) = q5_bin::run(&args) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
