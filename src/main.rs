use clap::Parser;
use hagap::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{gaps, scan},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Scan(_) => "scan",
        Command::Gaps(_) => "gaps",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Scan(args) => scan::scan(args)?,
        Command::Gaps(args) => gaps::gaps(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
