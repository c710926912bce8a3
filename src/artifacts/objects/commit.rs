//! Commit object
//!
//! A commit is an immutable snapshot record: creation timestamp, message,
//! at most one parent, and the full set of tracked files.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! timestamp: <unix-seconds> <+hhmm>
//! message: <escaped message>
//! parent: <parent-sha>
//! file: <path> <blob-sha>
//! file: <path> <blob-sha>
//! ```
//!
//! The `parent` line is absent for the first commit. Every line is a tagged
//! [`CommitField`]; the record is only ever written by [`CommitField::render`]
//! and read back by [`CommitField::parse`].

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Timelike};
use derive_new::new;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Tracked files of a commit, keyed by working-tree relative path
pub type FileSet = BTreeMap<PathBuf, ObjectId>;

/// One tracked file of a commit snapshot
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileEntry {
    pub path: PathBuf,
    pub oid: ObjectId,
}

/// A single tagged line of a serialized commit record
#[derive(Debug, Clone, PartialEq, Eq)]
enum CommitField {
    Timestamp(DateTime<FixedOffset>),
    Message(String),
    Parent(ObjectId),
    File(FileEntry),
}

impl CommitField {
    fn tag(&self) -> &'static str {
        match self {
            CommitField::Timestamp(_) => "timestamp",
            CommitField::Message(_) => "message",
            CommitField::Parent(_) => "parent",
            CommitField::File(_) => "file",
        }
    }

    fn render(&self) -> String {
        let value = match self {
            CommitField::Timestamp(timestamp) => {
                format!("{} {}", timestamp.timestamp(), timestamp.format("%z"))
            }
            CommitField::Message(message) => escape(message),
            CommitField::Parent(oid) => oid.to_string(),
            CommitField::File(entry) => format!("{} {}", entry.path.display(), entry.oid),
        };

        format!("{}: {}", self.tag(), value)
    }

    fn parse(line: &str, id: &ObjectId) -> Result<Self> {
        let (tag, value) = line
            .split_once(": ")
            .ok_or_else(|| Error::corrupt(id, format!("malformed line '{line}'")))?;

        match tag {
            "timestamp" => parse_timestamp(value)
                .map(CommitField::Timestamp)
                .ok_or_else(|| Error::corrupt(id, format!("invalid timestamp '{value}'"))),
            "message" => unescape(value)
                .map(CommitField::Message)
                .ok_or_else(|| Error::corrupt(id, "invalid escape in message")),
            "parent" => ObjectId::try_parse(value)
                .map(CommitField::Parent)
                .map_err(|_| Error::corrupt(id, format!("invalid parent '{value}'"))),
            "file" => {
                // the blob id never contains spaces, the path may
                let (path, oid) = value
                    .rsplit_once(' ')
                    .ok_or_else(|| Error::corrupt(id, format!("malformed file entry '{value}'")))?;
                let oid = ObjectId::try_parse(oid)
                    .map_err(|_| Error::corrupt(id, format!("invalid blob id '{oid}'")))?;

                Ok(CommitField::File(FileEntry::new(PathBuf::from(path), oid)))
            }
            _ => Err(Error::corrupt(id, format!("unknown field '{tag}'"))),
        }
    }
}

/// Parse `<unix-seconds> <+hhmm>`
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let (seconds, offset) = value.split_once(' ')?;
    let seconds = seconds.parse::<i64>().ok()?;

    if !offset.is_ascii() || offset.len() != 5 || !offset[1..].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let sign = match &offset[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours = offset[1..3].parse::<i32>().ok()?;
    let minutes = offset[3..5].parse::<i32>().ok()?;
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;

    Some(DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset))
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn unescape(value: &str) -> Option<String> {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next()? {
            '\\' => unescaped.push('\\'),
            'n' => unescaped.push('\n'),
            'r' => unescaped.push('\r'),
            _ => return None,
        }
    }

    Some(unescaped)
}

/// Snapshot record with metadata and parent link
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    timestamp: DateTime<FixedOffset>,
    message: String,
    parent: Option<ObjectId>,
    /// Sorted by path
    files: Vec<FileEntry>,
}

impl Commit {
    /// Build a commit record
    ///
    /// The timestamp is truncated to whole seconds, the precision the record
    /// is stored with.
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        message: String,
        parent: Option<ObjectId>,
        files: FileSet,
    ) -> Self {
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);
        let files = files
            .into_iter()
            .map(|(path, oid)| FileEntry::new(path, oid))
            .collect();

        Commit {
            timestamp,
            message,
            parent,
            files,
        }
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the commit message
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&ObjectId> {
        self.files
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| &entry.oid)
    }

    pub fn file_set(&self) -> FileSet {
        self.files
            .iter()
            .map(|entry| (entry.path.clone(), entry.oid.clone()))
            .collect()
    }

    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    fn fields(&self) -> impl Iterator<Item = CommitField> + '_ {
        [
            Some(CommitField::Timestamp(self.timestamp)),
            Some(CommitField::Message(self.message.clone())),
            self.parent.clone().map(CommitField::Parent),
        ]
        .into_iter()
        .flatten()
        .chain(self.files.iter().cloned().map(CommitField::File))
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Bytes {
        let body = self
            .fields()
            .map(|field| field.render())
            .collect::<Vec<_>>()
            .join("\n");

        frame(self.object_type(), body.as_bytes())
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead, id: &ObjectId) -> Result<Self> {
        let mut timestamp = None;
        let mut message = None;
        let mut parent = None;
        let mut files = Vec::new();

        for line in reader.lines() {
            let line = line.map_err(|e| Error::corrupt(id, format!("unreadable line: {e}")))?;
            let field = CommitField::parse(&line, id)?;
            let tag = field.tag();

            let duplicate = match field {
                CommitField::Timestamp(value) => timestamp.replace(value).is_some(),
                CommitField::Message(value) => message.replace(value).is_some(),
                CommitField::Parent(value) => parent.replace(value).is_some(),
                CommitField::File(entry) => {
                    files.push(entry);
                    false
                }
            };
            if duplicate {
                return Err(Error::corrupt(id, format!("duplicate '{tag}' field")));
            }
        }

        Ok(Commit {
            timestamp: timestamp.ok_or_else(|| Error::corrupt(id, "missing timestamp"))?,
            message: message.ok_or_else(|| Error::corrupt(id, "missing message"))?,
            parent,
            files,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
