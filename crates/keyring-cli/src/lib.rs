//! Command-line front end for keyring files.
//!
//! # Commands
//!
//! - `create <file> (<key> | --random n)`: new keyring, refuses to overwrite
//! - `list <file> [--show-keys]`: ids, lengths or contents, active marker
//! - `add <file> (<key> | --random n) [--activate]`
//! - `activate <file> <id>`
//! - `rekey <file>`: new passphrase under a fresh salt
//! - `debug parse <file> [--decrypt]`: packet-level dump
//!
//! Access keys are derived from a passphrase with HKDF-SHA3-256. Files are
//! replaced atomically (temporary file plus rename) with owner-only
//! permissions on Unix.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod dump;
pub mod error;
pub mod passphrase;
pub mod session;

pub use cli::{Cli, Command, DebugCommand, KeyArgs};
pub use error::{CliError, Result};
pub use passphrase::{
    EnvPassphrase, PASSPHRASE_ENV, PassphraseSource, PromptPassphrase, SourceKind,
    TerminalPassphrase,
};
pub use session::Session;
