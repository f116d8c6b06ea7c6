use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command};
use log::LevelFilter;

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .get_matches();

    let is_verbose = matches.get_flag("verbose");

    init_logger(is_verbose);

    sprout::api::init_current_dir()?;

    Ok(())
}

/// `RUST_LOG` wins over the verbose flag.
fn init_logger(is_verbose: bool) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(LevelFilter::Warn);

    if is_verbose {
        builder.filter_module("sprout", LevelFilter::Debug);
    }

    builder.parse_default_env().init();
}
