//! Password-based encryption for snapshot files.
//!
//! # Responsibility
//! - Derive a 256-bit key from a password with Argon2id.
//! - Encrypt/decrypt snapshot bytes with XChaCha20-Poly1305 in the STREAM
//!   construction over fixed-size chunks.
//!
//! # Invariants
//! - Every sealed file carries its own random salt and stream nonce.
//! - The full header is authenticated as associated data on every chunk.
//! - A wrong password and a damaged body are indistinguishable here; both
//!   surface as [`CipherError::Decrypt`].
//!
//! File layout:
//! `magic[8] | m_cost u32le | t_cost u32le | p_cost u32le | salt[16] | nonce[19] | chunks`
//! where each chunk is at most `CHUNK_SIZE + TAG_SIZE` bytes.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::stream::{DecryptorBE32, EncryptorBE32};
use chacha20poly1305::aead::{KeyInit, Payload};
use chacha20poly1305::XChaCha20Poly1305;
use rand::rngs::OsRng;
use rand::RngCore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use zeroize::Zeroizing;

pub const MAGIC: &[u8; 8] = b"CCNBENC1";
/// Plaintext bytes per stream chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;
pub const TAG_SIZE: usize = 16;
pub const SALT_SIZE: usize = 16;
/// XChaCha20 nonce (24) minus the STREAM BE32 overhead (5).
pub const STREAM_NONCE_SIZE: usize = 19;
pub const KEY_SIZE: usize = 32;
pub const HEADER_SIZE: usize = MAGIC.len() + 12 + SALT_SIZE + STREAM_NONCE_SIZE;

/// Upper bounds accepted for KDF costs, in a file header or for sealing.
const MAX_MEMORY_KIB: u32 = 1024 * 1024;
const MAX_ITERATIONS: u32 = 64;
const MAX_PARALLELISM: u32 = 16;

#[derive(Debug)]
pub enum CipherError {
    /// Header is truncated, has the wrong magic or unusable KDF parameters.
    InvalidHeader(String),
    KeyDerivation(String),
    Encrypt,
    /// Authentication failed: wrong password or damaged ciphertext.
    Decrypt,
}

impl Display for CipherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeader(details) => write!(f, "invalid encrypted file header: {details}"),
            Self::KeyDerivation(details) => write!(f, "key derivation failed: {details}"),
            Self::Encrypt => write!(f, "encryption failed"),
            Self::Decrypt => write!(f, "decryption failed"),
        }
    }
}

impl Error for CipherError {}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// Argon2 crate defaults: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    fn check_bounds(self) -> Result<(), String> {
        if self.memory_kib > MAX_MEMORY_KIB {
            return Err(format!("memory cost {} KiB exceeds limit", self.memory_kib));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(format!("time cost {} exceeds limit", self.iterations));
        }
        if self.parallelism > MAX_PARALLELISM {
            return Err(format!("parallelism {} exceeds limit", self.parallelism));
        }
        Ok(())
    }

    fn to_argon2(self) -> Result<Params, CipherError> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|err| CipherError::KeyDerivation(err.to_string()))
    }
}

/// Parsed fixed-size prefix of an encrypted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedHeader {
    pub kdf: KdfParams,
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; STREAM_NONCE_SIZE],
}

impl SealedHeader {
    fn generate(kdf: KdfParams) -> Self {
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; STREAM_NONCE_SIZE];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);
        Self { kdf, salt, nonce }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.kdf.memory_kib.to_le_bytes());
        out.extend_from_slice(&self.kdf.iterations.to_le_bytes());
        out.extend_from_slice(&self.kdf.parallelism.to_le_bytes());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out
    }

    /// Parses and sanity-checks the header of `sealed`.
    ///
    /// Fails without touching the password, so callers can reject a damaged
    /// file before prompting.
    pub fn parse(sealed: &[u8]) -> Result<Self, CipherError> {
        if sealed.len() < HEADER_SIZE + TAG_SIZE {
            return Err(CipherError::InvalidHeader(format!(
                "file is {} bytes, shorter than the minimum {}",
                sealed.len(),
                HEADER_SIZE + TAG_SIZE
            )));
        }
        let (magic, rest) = sealed.split_at(MAGIC.len());
        if magic != MAGIC {
            return Err(CipherError::InvalidHeader("unknown magic".to_string()));
        }

        let read_u32 = |offset: usize| {
            let mut word = [0u8; 4];
            word.copy_from_slice(&rest[offset..offset + 4]);
            u32::from_le_bytes(word)
        };
        let kdf = KdfParams {
            memory_kib: read_u32(0),
            iterations: read_u32(4),
            parallelism: read_u32(8),
        };
        kdf.check_bounds().map_err(CipherError::InvalidHeader)?;
        kdf.to_argon2()
            .map_err(|err| CipherError::InvalidHeader(err.to_string()))?;

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&rest[12..12 + SALT_SIZE]);
        let mut nonce = [0u8; STREAM_NONCE_SIZE];
        nonce.copy_from_slice(&rest[12 + SALT_SIZE..12 + SALT_SIZE + STREAM_NONCE_SIZE]);
        Ok(Self { kdf, salt, nonce })
    }
}

/// Derives the file key from `password` and `salt`.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    kdf: KdfParams,
) -> Result<Zeroizing<[u8; KEY_SIZE]>, CipherError> {
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, kdf.to_argon2()?);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|err| CipherError::KeyDerivation(err.to_string()))?;
    Ok(key)
}

/// Encrypts `plaintext` under `password` into a self-describing sealed file.
pub fn seal(plaintext: &[u8], password: &str, kdf: KdfParams) -> Result<Vec<u8>, CipherError> {
    kdf.check_bounds().map_err(CipherError::KeyDerivation)?;
    let header = SealedHeader::generate(kdf);
    let header_bytes = header.to_bytes();
    let key = derive_key(password, &header.salt, kdf)?;

    let aead = XChaCha20Poly1305::new(GenericArray::from_slice(&key[..]));
    let mut encryptor = EncryptorBE32::from_aead(aead, GenericArray::from_slice(&header.nonce));

    let chunk_count = plaintext.len().div_ceil(CHUNK_SIZE).max(1);
    let mut out = Vec::with_capacity(HEADER_SIZE + plaintext.len() + chunk_count * TAG_SIZE);
    out.extend_from_slice(&header_bytes);

    let mut chunks = plaintext.chunks(CHUNK_SIZE).peekable();
    while let Some(chunk) = chunks.next() {
        if chunks.peek().is_none() {
            seal_last(&mut out, encryptor, chunk, &header_bytes)?;
            return Ok(out);
        }
        let sealed = encryptor
            .encrypt_next(Payload {
                msg: chunk,
                aad: &header_bytes,
            })
            .map_err(|_| CipherError::Encrypt)?;
        out.extend_from_slice(&sealed);
    }

    // Empty plaintext still gets one authenticated terminal chunk.
    seal_last(&mut out, encryptor, &[], &header_bytes)?;
    Ok(out)
}

fn seal_last(
    out: &mut Vec<u8>,
    encryptor: EncryptorBE32<XChaCha20Poly1305>,
    chunk: &[u8],
    aad: &[u8],
) -> Result<(), CipherError> {
    let sealed = encryptor
        .encrypt_last(Payload { msg: chunk, aad })
        .map_err(|_| CipherError::Encrypt)?;
    out.extend_from_slice(&sealed);
    Ok(())
}

/// Decrypts a sealed file produced by [`seal`].
pub fn open(sealed: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    let header = SealedHeader::parse(sealed)?;
    let (header_bytes, body) = sealed.split_at(HEADER_SIZE);
    let key = derive_key(password, &header.salt, header.kdf)?;

    let aead = XChaCha20Poly1305::new(GenericArray::from_slice(&key[..]));
    let mut decryptor = DecryptorBE32::from_aead(aead, GenericArray::from_slice(&header.nonce));

    let mut plaintext = Zeroizing::new(Vec::with_capacity(body.len()));
    let mut chunks = body.chunks(CHUNK_SIZE + TAG_SIZE).peekable();
    while let Some(chunk) = chunks.next() {
        let payload = Payload {
            msg: chunk,
            aad: header_bytes,
        };
        if chunks.peek().is_none() {
            let last = decryptor
                .decrypt_last(payload)
                .map_err(|_| CipherError::Decrypt)?;
            plaintext.extend_from_slice(&last);
            return Ok(plaintext);
        }
        let part = decryptor
            .decrypt_next(payload)
            .map_err(|_| CipherError::Decrypt)?;
        plaintext.extend_from_slice(&part);
    }

    // Unreachable for inputs that passed `SealedHeader::parse`, which
    // guarantees at least one tag worth of body.
    Err(CipherError::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::{open, seal, CipherError, KdfParams, SealedHeader, CHUNK_SIZE, HEADER_SIZE};

    const FAST: KdfParams = KdfParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn seal_and_open_across_chunk_boundaries() {
        for len in [0, 1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, 2 * CHUNK_SIZE] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let sealed = seal(&plaintext, "pw", FAST).unwrap();
            let opened = open(&sealed, "pw").unwrap();
            assert_eq!(opened.as_slice(), plaintext.as_slice(), "len={len}");
        }
    }

    #[test]
    fn wrong_password_fails_to_open() {
        let sealed = seal(b"secret body", "right", FAST).unwrap();
        assert!(matches!(open(&sealed, "wrong"), Err(CipherError::Decrypt)));
    }

    #[test]
    fn header_tampering_is_detected() {
        let mut sealed = seal(b"secret body", "pw", FAST).unwrap();
        // Flip one salt byte: the derived key changes and the header AAD no
        // longer matches.
        sealed[HEADER_SIZE - 20] ^= 0x01;
        assert!(open(&sealed, "pw").is_err());
    }

    #[test]
    fn truncated_chunks_fail() {
        let plaintext = vec![7u8; CHUNK_SIZE * 2 + 10];
        let sealed = seal(&plaintext, "pw", FAST).unwrap();
        let truncated = &sealed[..sealed.len() - 10 - 16];
        assert!(matches!(open(truncated, "pw"), Err(CipherError::Decrypt)));
    }

    #[test]
    fn parse_rejects_short_and_foreign_files() {
        assert!(matches!(
            SealedHeader::parse(b"CCNBENC1"),
            Err(CipherError::InvalidHeader(_))
        ));
        let mut foreign = seal(b"x", "pw", FAST).unwrap();
        foreign[0] = b'X';
        assert!(matches!(
            SealedHeader::parse(&foreign),
            Err(CipherError::InvalidHeader(_))
        ));
    }

    #[test]
    fn parse_rejects_excessive_kdf_costs() {
        let sealed = seal(b"x", "pw", FAST).unwrap();
        // memory, iterations and parallelism follow the 8-byte magic.
        for offset in [8, 12, 16] {
            let mut hostile = sealed.clone();
            hostile[offset..offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
            assert!(
                matches!(
                    SealedHeader::parse(&hostile),
                    Err(CipherError::InvalidHeader(_))
                ),
                "offset {offset}"
            );
        }
    }

    #[test]
    fn seal_refuses_out_of_bounds_costs() {
        let costly = KdfParams {
            iterations: u32::MAX,
            ..FAST
        };
        assert!(matches!(
            seal(b"x", "pw", costly),
            Err(CipherError::KeyDerivation(_))
        ));
    }

    #[test]
    fn parse_reads_back_kdf_params() {
        let sealed = seal(b"x", "pw", FAST).unwrap();
        assert_eq!(SealedHeader::parse(&sealed).unwrap().kdf, FAST);
    }
}
