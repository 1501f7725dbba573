use clap::Parser;
use keel::cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match keel::run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(2);
        }
    }
}
