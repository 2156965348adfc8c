use std::process;

use clap::{crate_version, App, AppSettings};
use tracing::error;
use tracing_subscriber::EnvFilter;

use lunar_view::{label_printer, tile_info, view};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("Lunar rover view")
        .version(crate_version!())
        .about("Extracts lunar terrain around a point, corrected to an observer's horizon")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(view::subcommand_def())
        .subcommand(tile_info::subcommand_def())
        .subcommand(label_printer::subcommand_def())
        .get_matches();

    let result = match matches.subcommand() {
        (view::SUBCOMMAND, Some(matches)) => view::run(matches),
        (tile_info::SUBCOMMAND, Some(matches)) => tile_info::run(matches),
        (label_printer::SUBCOMMAND, Some(matches)) => label_printer::run(matches),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}
