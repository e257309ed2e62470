//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use keyring_core::KeyId;

/// Create and manipulate the contents of keyring files
#[derive(Parser, Debug)]
#[command(name = "keyring")]
#[command(about = "Create and manipulate the contents of keyring files")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Allow an empty passphrase when setting a new one
    #[arg(long, global = true)]
    pub empty_ok: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Keyring commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new keyring file
    Create {
        /// Keyring file to create
        path: PathBuf,

        /// Key source
        #[command(flatten)]
        key: KeyArgs,
    },

    /// List the keys in a keyring file
    List {
        /// Keyring file
        path: PathBuf,

        /// Show the contents of the keys
        #[arg(long)]
        show_keys: bool,
    },

    /// Add a new key to the keyring
    Add {
        /// Keyring file
        path: PathBuf,

        /// Key source
        #[command(flatten)]
        key: KeyArgs,

        /// Mark the new key as active immediately
        #[arg(long)]
        activate: bool,
    },

    /// Set the active key version
    Activate {
        /// Keyring file
        path: PathBuf,

        /// Key id to activate
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        id: KeyId,
    },

    /// Change the passphrase protecting the keyring
    Rekey {
        /// Keyring file
        path: PathBuf,
    },

    /// Commands for debugging and inspection
    #[command(subcommand)]
    Debug(DebugCommand),
}

/// Inspection commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    /// Parse and dump the binary format of a keyring
    Parse {
        /// Keyring file
        path: PathBuf,

        /// Decrypt bundles (requires the passphrase)
        #[arg(long)]
        decrypt: bool,
    },
}

/// Where a new key comes from.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyArgs {
    /// Key contents
    #[arg(conflicts_with = "random")]
    pub key: Option<String>,

    /// Generate a random key of this many bytes instead
    #[arg(long, value_name = "N")]
    pub random: Option<usize>,
}
