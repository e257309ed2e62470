//! Command execution.
//!
//! A [`Session`] binds the output streams and passphrase source for one
//! invocation. Listings and dumps go to `out`; progress notes go to `err`.

use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use keyring_core::{
    AccessKeySource, Config, KeyId, PassphraseKey, Ring, access_key_from_passphrase,
    open_cipher_packet, random_key,
};
use keyring_proto::{PacketType, parse_active_key, parse_keyring, parse_keyring_entry, parse_packets};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use crate::{
    cli::{Command, DebugCommand, KeyArgs},
    dump::{format_key, hex_dump},
    error::{CliError, Result},
    passphrase::PassphraseSource,
};

/// One CLI invocation's I/O.
pub struct Session<'a> {
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
    passphrase: &'a mut dyn PassphraseSource,
    empty_ok: bool,
}

impl<'a> Session<'a> {
    /// Bind output streams and a passphrase source.
    pub fn new(
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
        passphrase: &'a mut dyn PassphraseSource,
    ) -> Self {
        Self { out, err, passphrase, empty_ok: false }
    }

    /// Accept an empty new passphrase.
    #[must_use]
    pub fn allow_empty_passphrase(mut self, empty_ok: bool) -> Self {
        self.empty_ok = empty_ok;
        self
    }

    /// Run `command`.
    pub fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create { path, key } => self.create(&path, &key),
            Command::List { path, show_keys } => self.list(&path, show_keys),
            Command::Add { path, key, activate } => self.add(&path, &key, activate),
            Command::Activate { path, id } => self.activate(&path, id),
            Command::Rekey { path } => self.rekey(&path),
            Command::Debug(DebugCommand::Parse { path, decrypt }) => self.debug_parse(&path, decrypt),
        }
    }

    /// Create a keyring at `path` holding one key. Refuses to overwrite.
    pub fn create(&mut self, path: &Path, key: &KeyArgs) -> Result<()> {
        if path.exists() {
            return Err(CliError::AlreadyExists(path.to_path_buf()));
        }
        let initial_key = self.key_from_args(key)?;

        let passphrase = self.new_passphrase("New passphrase: ", "Confirm new passphrase: ")?;
        let (access_key, salt) = access_key_from_passphrase(&passphrase);
        let ring = Ring::new(Config {
            initial_key: &initial_key,
            access_key: &access_key,
            access_key_salt: Some(&salt),
        })?;

        self.save(path, &ring, true)
    }

    /// Print every id with its length (or contents) and mark the active one.
    pub fn list(&mut self, path: &Path, show_keys: bool) -> Result<()> {
        let view = self.open(path)?.view();
        let active = view.active();

        writeln!(self.out, "# {} total", view.len())?;
        for id in view.ids() {
            let key = view.get(id);
            if show_keys {
                write!(self.out, "{id}: {}", format_key(&key))?;
            } else {
                write!(self.out, "{id}: {} bytes", key.len())?;
            }
            if id == active {
                write!(self.out, " [active]")?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Add a key, optionally activating it.
    pub fn add(&mut self, path: &Path, key: &KeyArgs, activate: bool) -> Result<()> {
        let new_key = self.key_from_args(key)?;
        let mut ring = self.open(path)?;

        let id = ring.add(&new_key);
        writeln!(self.out, "Added key id {id} ({} bytes)", new_key.len())?;
        if activate {
            ring.activate(id);
            writeln!(self.out, "Activated new key id {id}")?;
        }

        self.save(path, &ring, false)
    }

    /// Make `id` the active key.
    pub fn activate(&mut self, path: &Path, id: KeyId) -> Result<()> {
        let mut ring = self.open(path)?;

        if !ring.has(id) {
            return Err(CliError::NoSuchKey(id));
        }
        if ring.active() == id {
            writeln!(self.err, "Key id {id} is already active")?;
            return Ok(());
        }

        ring.activate(id);
        writeln!(self.out, "Activated key id {id}")?;
        self.save(path, &ring, false)
    }

    /// Protect the keyring with a new passphrase under a fresh salt.
    pub fn rekey(&mut self, path: &Path) -> Result<()> {
        let mut ring = self.open(path)?;

        let passphrase = self.new_passphrase("New passphrase: ", "Confirm new passphrase: ")?;
        let (access_key, salt) = access_key_from_passphrase(&passphrase);
        ring.rekey(&access_key, Some(&salt))?;
        writeln!(self.out, "Rekeyed {}", display_name(path))?;

        self.save(path, &ring, false)
    }

    /// Dump the container structure. With `decrypt`, also open bundles and
    /// show their inner packets.
    pub fn debug_parse(&mut self, path: &Path, decrypt: bool) -> Result<()> {
        let data = fs::read(path).map_err(|source| file_error(path, source))?;
        let keyring = parse_keyring(&data)?;

        let has_bundle = keyring.packets.iter().any(|p| p.packet_type == PacketType::BUNDLE);
        let data_key = if decrypt && has_bundle {
            let dk_packet = keyring
                .packets
                .iter()
                .find(|p| p.packet_type == PacketType::DATA_KEY)
                .ok_or(CliError::NoDataKey)?;
            let salt = keyring
                .packets
                .iter()
                .find(|p| p.packet_type == PacketType::ACCESS_KEY_SALT)
                .map_or(&[][..], |p| p.data);

            writeln!(self.err, "Found encrypted bundles, passphrase required to decrypt")?;
            let passphrase = self.passphrase.read_passphrase("Passphrase: ")?;
            let access_key = PassphraseKey::new(&passphrase).access_key(salt);
            let dk = open_cipher_packet(dk_packet, &access_key).map_err(CliError::Unlock)?;
            writeln!(self.err, "Unlocked data storage key")?;
            Some(dk)
        } else {
            None
        };

        let reserved = keyring.header.reserved();
        writeln!(
            self.out,
            "Keyring version {:02x}, reserved {:02x}{:02x}, {} packets",
            keyring.header.version(),
            reserved[0],
            reserved[1],
            keyring.packets.len()
        )?;

        for (i, packet) in keyring.packets.iter().enumerate() {
            let index = i + 1;
            if i > 0 {
                writeln!(self.out)?;
            }
            writeln!(self.out, "-- Packet {index}: {} ({} bytes)", packet.packet_type, packet.data.len())?;

            let Some(dk) = data_key.as_ref().filter(|_| packet.packet_type == PacketType::BUNDLE)
            else {
                hex_dump(&mut *self.out, packet.data, "")?;
                continue;
            };

            let inner = open_cipher_packet(packet, dk)
                .map_err(|source| CliError::DecryptPacket { index, source })?;
            self.dump_bundle(index, &inner)?;
        }
        Ok(())
    }

    fn dump_bundle(&mut self, index: usize, inner: &[u8]) -> Result<()> {
        for (j, packet) in parse_packets(inner, 0)?.iter().enumerate() {
            if j > 0 {
                writeln!(self.out)?;
            }
            writeln!(
                self.out,
                " + inner packet {index}.{}: {} ({} bytes)",
                j + 1,
                packet.packet_type,
                packet.data.len()
            )?;

            match packet.packet_type {
                PacketType::ACTIVE_KEY => match parse_active_key(packet.data) {
                    Ok(Some(id)) => writeln!(self.out, "   active key id: {id}")?,
                    Ok(None) => writeln!(self.out, "   active key id: none")?,
                    Err(e) => writeln!(self.out, "   <invalid active key> {e}")?,
                },
                PacketType::KEYRING_ENTRY => match parse_keyring_entry(packet.data) {
                    Ok(entry) => {
                        writeln!(self.out, "   ID: {}, Key: {}", entry.id, format_key(entry.key))?;
                    },
                    Err(e) => writeln!(self.out, "   <invalid key info> {e}")?,
                },
                _ => hex_dump(&mut *self.out, packet.data, "     ")?,
            }
        }
        Ok(())
    }

    /// Read the keyring at `path`, asking for its passphrase.
    fn open(&mut self, path: &Path) -> Result<Ring> {
        let file = File::open(path).map_err(|source| file_error(path, source))?;
        let passphrase = self.passphrase.read_passphrase("Passphrase: ")?;
        let ring = Ring::read(BufReader::new(file), PassphraseKey::new(&passphrase))?;

        tracing::debug!(path = %path.display(), keys = ring.len(), "opened keyring");
        Ok(ring)
    }

    /// Write `ring` to `path` through a temporary file and an atomic rename.
    fn save(&mut self, path: &Path, ring: &Ring, create: bool) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| file_error(dir, source))?;
        let written = ring.write_to(&mut tmp)?;
        tmp.as_file().sync_all()?;
        restrict_permissions(tmp.as_file())?;

        let persisted = if create { tmp.persist_noclobber(path) } else { tmp.persist(path) };
        persisted.map_err(|e| file_error(path, e.error))?;

        tracing::debug!(path = %path.display(), bytes = written, "saved keyring");
        writeln!(self.err, "Wrote {written} bytes to {:?}", display_name(path))?;
        Ok(())
    }

    fn key_from_args(&mut self, args: &KeyArgs) -> Result<Zeroizing<Vec<u8>>> {
        match (&args.key, args.random) {
            (Some(key), _) if key.is_empty() => Err(CliError::EmptyKey),
            (Some(key), _) => Ok(Zeroizing::new(key.as_bytes().to_vec())),
            (None, Some(0)) => Err(CliError::ZeroRandomLength),
            (None, Some(n)) => {
                let key = random_key(n);
                writeln!(self.err, "Generated {n}-byte random key")?;
                Ok(key)
            },
            (None, None) => Err(CliError::MissingKey),
        }
    }

    fn new_passphrase(&mut self, prompt: &str, confirm: &str) -> Result<Zeroizing<String>> {
        let passphrase = self.passphrase.read_passphrase(prompt)?;
        if passphrase.is_empty() && !self.empty_ok {
            return Err(CliError::EmptyPassphrase);
        }

        if self.passphrase.is_interactive() {
            let again = self.passphrase.read_passphrase(confirm)?;
            if again != passphrase {
                return Err(CliError::PassphraseMismatch);
            }
        }
        Ok(passphrase)
    }
}

fn file_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::File { path: PathBuf::from(path), source }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}
