//! Passphrase input.
//!
//! The binary takes the passphrase from `KEYRING_PASSPHRASE` when set. On a
//! terminal it prompts with echo disabled. Otherwise it prompts on stderr and
//! reads lines from stdin, so passphrases can be piped in.

use std::io::{self, BufRead, IsTerminal, Write};

use zeroize::Zeroizing;

use crate::error::{CliError, Result};

/// Environment variable holding the passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "KEYRING_PASSPHRASE";

/// Supplies passphrases to commands.
pub trait PassphraseSource {
    /// Read one passphrase, showing `prompt` if interactive.
    fn read_passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>>;

    /// Whether a second, confirming entry should be requested for new
    /// passphrases.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// A passphrase fixed up front, typically from [`PASSPHRASE_ENV`].
///
/// Every read returns the same value; no confirmation is asked.
pub struct EnvPassphrase(Zeroizing<String>);

impl EnvPassphrase {
    /// Wrap `passphrase`.
    pub fn new(passphrase: String) -> Self {
        Self(Zeroizing::new(passphrase))
    }
}

impl PassphraseSource for EnvPassphrase {
    fn read_passphrase(&mut self, _prompt: &str) -> Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Line-oriented prompt: writes the prompt to `prompts`, reads one line
/// from `input`.
pub struct PromptPassphrase<R, W> {
    input: R,
    prompts: W,
}

impl<R: BufRead, W: Write> PromptPassphrase<R, W> {
    /// Read from `input`, prompting on `prompts`.
    pub fn new(input: R, prompts: W) -> Self {
        Self { input, prompts }
    }
}

impl<R: BufRead, W: Write> PassphraseSource for PromptPassphrase<R, W> {
    fn read_passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        write!(self.prompts, "{prompt}")?;
        self.prompts.flush()?;

        let mut line = Zeroizing::new(String::new());
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::NoPassphrase);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}

/// Hidden terminal entry: the prompt goes to the controlling terminal and
/// typed characters are not echoed.
#[derive(Debug, Default)]
pub struct TerminalPassphrase;

impl PassphraseSource for TerminalPassphrase {
    fn read_passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        match rpassword::prompt_password(prompt) {
            Ok(passphrase) => Ok(Zeroizing::new(passphrase)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(CliError::NoPassphrase),
            Err(e) => Err(e.into()),
        }
    }
}

/// Which passphrase source a process uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// [`PASSPHRASE_ENV`] is set
    Env,
    /// stdin is a terminal: hidden entry
    Terminal,
    /// stdin is a pipe or file: one line per passphrase
    Lines,
}

impl SourceKind {
    /// Pick a source from the environment variable and whether stdin is a
    /// terminal.
    pub fn select(env_set: bool, stdin_is_terminal: bool) -> Self {
        match (env_set, stdin_is_terminal) {
            (true, _) => Self::Env,
            (false, true) => Self::Terminal,
            (false, false) => Self::Lines,
        }
    }
}

/// Passphrase source for the process.
pub fn from_environment() -> Box<dyn PassphraseSource> {
    let env = std::env::var(PASSPHRASE_ENV).ok();
    match (SourceKind::select(env.is_some(), io::stdin().is_terminal()), env) {
        (SourceKind::Env, Some(passphrase)) => Box::new(EnvPassphrase::new(passphrase)),
        (SourceKind::Terminal, _) => Box::new(TerminalPassphrase),
        _ => Box::new(PromptPassphrase::new(io::stdin().lock(), io::stderr())),
    }
}
