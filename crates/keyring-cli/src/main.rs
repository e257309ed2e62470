//! Keyring command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Create a keyring with a random 32-byte initial key
//! keyring create app.keyring --random 32
//!
//! # Add a key and make it active
//! keyring add app.keyring --random 32 --activate
//!
//! # Non-interactive use
//! KEYRING_PASSPHRASE=... keyring list app.keyring
//! ```

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Parser;
use keyring_cli::{Cli, Session, passphrase};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let args = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let mut source = passphrase::from_environment();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();

    let result = Session::new(&mut stdout, &mut stderr, source.as_mut())
        .allow_empty_passphrase(args.empty_ok)
        .run(args.command);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            let _ = writeln!(io::stderr(), "keyring: {err}");
            if err.is_usage() { ExitCode::from(2) } else { ExitCode::FAILURE }
        },
    }
}
