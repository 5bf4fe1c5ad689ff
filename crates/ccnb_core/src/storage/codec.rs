//! Snapshot wire codec.
//!
//! # Responsibility
//! - Map a [`Snapshot`] to and from an explicit, versioned JSON document.
//! - Rebuild stores through their invariant-checking entry points on decode.
//!
//! # Invariants
//! - `decode_snapshot(&encode_snapshot(s)?)? == s` for every reachable `s`.
//! - Decoding never panics; every failure is a [`CodecError`].
//!
//! Document shape (format 1):
//! `{"format":1,"contacts":[{"name","phones","birthday","emails","address"}],"notes":[{"title","content","tags"}]}`
//! with `birthday` as ISO `YYYY-MM-DD` or `null`.

use crate::model::contact::ContactRecord;
use crate::model::note::NoteRecord;
use crate::model::snapshot::Snapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Current document format version.
pub const SNAPSHOT_FORMAT: u32 = 1;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    /// Bytes are not a well-formed snapshot document.
    Malformed(serde_json::Error),
    /// Document declares a format this build cannot read.
    UnsupportedFormat(u32),
    /// Document is well-formed but a record breaks a store invariant.
    InvalidRecord(String),
    /// Serialization failed while encoding.
    Encode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed snapshot data: {err}"),
            Self::UnsupportedFormat(found) => write!(
                f,
                "snapshot format {found} is not supported (expected {SNAPSHOT_FORMAT})"
            ),
            Self::InvalidRecord(message) => write!(f, "invalid snapshot record: {message}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Encode(err) => Some(err),
            Self::UnsupportedFormat(_) | Self::InvalidRecord(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotDocument {
    format: u32,
    #[serde(default)]
    contacts: Vec<ContactDocument>,
    #[serde(default)]
    notes: Vec<NoteDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContactDocument {
    name: String,
    #[serde(default)]
    phones: Vec<String>,
    #[serde(default)]
    birthday: Option<NaiveDate>,
    #[serde(default)]
    emails: Vec<String>,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NoteDocument {
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Serializes a snapshot into format-1 JSON bytes.
pub fn encode_snapshot(snapshot: &Snapshot) -> CodecResult<Vec<u8>> {
    let document = SnapshotDocument {
        format: SNAPSHOT_FORMAT,
        contacts: snapshot
            .contacts
            .iter()
            .map(|record| ContactDocument {
                name: record.name().to_string(),
                phones: record.phones().to_vec(),
                birthday: record.birthday(),
                emails: record.emails().to_vec(),
                address: record.address().map(str::to_string),
            })
            .collect(),
        notes: snapshot
            .notes
            .iter()
            .map(|note| NoteDocument {
                title: note.title().to_string(),
                content: note.content().to_string(),
                tags: note.tags().map(str::to_string).collect(),
            })
            .collect(),
    };
    serde_json::to_vec(&document).map_err(CodecError::Encode)
}

/// Parses format-1 JSON bytes back into a snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> CodecResult<Snapshot> {
    let document: SnapshotDocument =
        serde_json::from_slice(bytes).map_err(CodecError::Malformed)?;
    if document.format != SNAPSHOT_FORMAT {
        return Err(CodecError::UnsupportedFormat(document.format));
    }

    let mut snapshot = Snapshot::new();
    for contact in document.contacts {
        let record = decode_contact(contact)?;
        snapshot
            .contacts
            .add(record)
            .map_err(|err| CodecError::InvalidRecord(err.to_string()))?;
    }
    for note in document.notes {
        let record = decode_note(note)?;
        snapshot
            .notes
            .add(record)
            .map_err(|err| CodecError::InvalidRecord(err.to_string()))?;
    }
    Ok(snapshot)
}

fn decode_contact(document: ContactDocument) -> CodecResult<ContactRecord> {
    let name = document.name;
    let mut record =
        ContactRecord::new(name.as_str()).map_err(|err| invalid_contact(&name, err))?;
    for phone in &document.phones {
        record
            .add_phone(phone)
            .map_err(|err| invalid_contact(&name, err))?;
    }
    for email in &document.emails {
        record
            .add_email(email)
            .map_err(|err| invalid_contact(&name, err))?;
    }
    // Stored birthdays passed validation when entered; only the calendar
    // date itself is restored here.
    if let Some(birthday) = document.birthday {
        record.set_birthday_date(birthday);
    }
    if let Some(address) = document.address {
        record.set_address(address);
    }
    Ok(record)
}

fn invalid_contact(name: &str, err: impl Display) -> CodecError {
    CodecError::InvalidRecord(format!("contact `{name}`: {err}"))
}

fn decode_note(document: NoteDocument) -> CodecResult<NoteRecord> {
    let mut note = NoteRecord::new(document.title, document.content)
        .map_err(|err| CodecError::InvalidRecord(format!("note: {err}")))?;
    for tag in &document.tags {
        note.add_tag(tag);
    }
    Ok(note)
}
