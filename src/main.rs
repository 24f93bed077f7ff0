use std::env;
use std::io::{self, IsTerminal};
use std::process;

use smash::config::{Invocation, USAGE};
use smash::{Cli, Config};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match Config::from_args(env::args().skip(1)) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            print!("{}", USAGE);
            return;
        }
        Err(e) => {
            eprintln!("smash: {}", e);
            eprint!("{}", USAGE);
            process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    let mut client = match Cli::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("smash error: {}", e);
            process::exit(1);
        }
    };
    client.go();
}
