use std::io;
use std::path::PathBuf;

use clap::Parser as ClapParser;

use rox::lox::{Lox, Outcome};

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Script to execute; starts a REPL when omitted.
    #[arg(value_name = "SCRIPT")]
    scripts: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Keep stderr clean for diagnostics; RUST_LOG-style tweaking is not
    // worth a config surface here.
    simple_logger::init_with_level(log::Level::Warn)?;

    let args: Cli = Cli::parse();

    match args.scripts.as_slice() {
        [] => {
            let mut lox = Lox::new(io::stdout());

            lox.run_prompt()?;
        }

        [script] => {
            let mut lox = Lox::new(io::stdout());

            let outcome: Outcome = lox.run_file(script)?;

            outcome.report();

            match outcome {
                Outcome::Success => {}

                Outcome::StaticError(_) => std::process::exit(65),

                Outcome::RuntimeError(_) => std::process::exit(70),
            }
        }

        _ => {
            eprintln!("Usage: rox [script]");

            std::process::exit(64);
        }
    }

    Ok(())
}
