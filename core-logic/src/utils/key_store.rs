use crate::error::WalletError;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// secp256k1 group order, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Non-zero and below the curve order.
fn is_valid_scalar(bytes: &[u8; 32]) -> bool {
    bytes.iter().any(|b| *b != 0) && bytes[..] < CURVE_ORDER[..]
}

/// A raw 32-byte secp256k1 secret. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a key as written in the key file: optional `0x` prefix,
    /// spaces anywhere, exactly 64 hex characters.
    pub fn parse(raw: &str) -> Result<Self, WalletError> {
        let trimmed = raw.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut cleaned: String = trimmed.chars().filter(|c| *c != ' ').collect();

        let decoded = hex::decode(&cleaned);
        let length = cleaned.len();
        cleaned.zeroize();

        let mut bytes = decoded.map_err(|_| WalletError::InvalidKeyFormat)?;
        if bytes.len() != 32 {
            bytes.zeroize();
            return Err(WalletError::InvalidKeyLength { length });
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        if !is_valid_scalar(&key) {
            key.zeroize();
            return Err(WalletError::KeyOutOfRange);
        }
        Ok(Self(key))
    }

    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        loop {
            OsRng.fill_bytes(&mut key);
            if is_valid_scalar(&key) {
                return Self(key);
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without prefix, the format written to the key file.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(***REDACTED***)")
    }
}

/// Plain-text key file, one hex private key per line.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub const DEFAULT_FILE: &'static str = "pv.txt";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every valid key in file order. Creates the file (or appends to it)
    /// with a fresh key when no valid key is present.
    pub fn load_all_private_keys(&self) -> Result<Vec<PrivateKey>, WalletError> {
        let keys = self.read_keys()?;
        if keys.is_empty() {
            return Ok(vec![self.create_key()?]);
        }
        Ok(keys)
    }

    /// First valid key, or a newly created one.
    pub fn load_one(&self) -> Result<PrivateKey, WalletError> {
        match self.read_keys()?.into_iter().next() {
            Some(key) => Ok(key),
            None => self.create_key(),
        }
    }

    /// Number of valid keys, creating one first when none exist. The parsed
    /// keys are dropped before returning.
    pub fn key_count(&self) -> Result<usize, WalletError> {
        Ok(self.load_all_private_keys()?.len())
    }

    /// The `index`-th valid key in file order. Every other key read along
    /// the way is dropped immediately.
    pub fn load_at(&self, index: usize) -> Result<Option<PrivateKey>, WalletError> {
        Ok(self.read_keys()?.into_iter().nth(index))
    }

    fn read_keys(&self) -> Result<Vec<PrivateKey>, WalletError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let keys = content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return None;
                }
                match PrivateKey::parse(trimmed) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        debug!("Skipping line {} of {:?}: {}", idx + 1, self.path, e);
                        None
                    }
                }
            })
            .collect();

        Ok(keys)
    }

    fn create_key(&self) -> Result<PrivateKey, WalletError> {
        let key = PrivateKey::generate();

        let needs_newline = fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let mut line = key.to_hex();
        if needs_newline {
            line.insert(0, '\n');
        }
        line.push('\n');
        let written = file.write_all(line.as_bytes());
        line.zeroize();
        written.map_err(|e| self.io_error(e))?;

        warn!("New wallet key written to {:?}", self.path);
        warn!("Please fund this wallet before trading!");
        Ok(key)
    }

    fn io_error(&self, e: std::io::Error) -> WalletError {
        WalletError::Io {
            path: self.path.display().to_string(),
            msg: e.to_string(),
        }
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILE)
    }
}
