//! `moar-dots` binary: parse arguments and dispatch to a command.
use anyhow::Result;
use clap::Parser;

use moar_dots::cli::{Cli, Command};
use moar_dots::{commands, engine, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let name = args.command.log_name();
    logging::init_subscriber(args.verbose, name);
    let log = logging::Logger::new(name);

    // The dot in progress always finishes; the rest are skipped.
    if let Err(e) = ctrlc::set_handler(engine::request_stop) {
        log.debug(&format!("cannot install interrupt handler: {e}"));
    }

    match &args.command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Nuke(opts) => commands::nuke::run(&args.global, opts, &log),
        Command::Restore(opts) => commands::restore::run(&args.global, opts, &log),
        Command::Status => commands::status::run(&args.global, &log),
        Command::RefreshCache => commands::refresh::run(&args.global, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
