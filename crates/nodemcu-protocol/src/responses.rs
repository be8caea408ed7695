//! Response parsing for the interpreter console.
//!
//! The console has no error protocol of its own. Outcomes are signalled by the
//! printed value of an expression:
//! - `true` for success
//! - `nil` for failure (or a missing table entry)
//! - anything else is a plain value such as a size or a count

use crate::error::{NodeMcuError, NodeMcuResult};

/// A single printed value, classified by sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The `nil` sentinel.
    Nil,
    /// The `true` sentinel.
    True,
    /// Any other printed value.
    Value(String),
}

impl Reply {
    /// Classify a response line.
    pub fn parse(line: &str) -> Reply {
        match line {
            "nil" => Reply::Nil,
            "true" => Reply::True,
            other => Reply::Value(other.to_string()),
        }
    }

    /// The response text as printed by the interpreter.
    pub fn as_str(&self) -> &str {
        match self {
            Reply::Nil => "nil",
            Reply::True => "true",
            Reply::Value(v) => v,
        }
    }

    /// Parse the reply as a non-negative integer.
    pub fn as_integer(&self) -> NodeMcuResult<u64> {
        parse_integer(self.as_str())
    }
}

/// Outcome of `file.open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenResult {
    /// The file is open.
    Opened,
    /// The interpreter refused to open the file.
    Refused(Reply),
}

impl OpenResult {
    /// Classify the reply to an open-for-write. Only `nil` is a refusal.
    pub fn for_write(reply: Reply) -> OpenResult {
        match reply {
            Reply::Nil => OpenResult::Refused(reply),
            _ => OpenResult::Opened,
        }
    }

    /// Classify the reply to an open-for-read. Anything but `true` is a refusal.
    pub fn for_read(reply: Reply) -> OpenResult {
        match reply {
            Reply::True => OpenResult::Opened,
            _ => OpenResult::Refused(reply),
        }
    }
}

/// Outcome of `file.write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The block was written.
    Written,
    /// The write failed, with the printed value.
    Failed(String),
}

impl From<Reply> for WriteResult {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::True => WriteResult::Written,
            other => WriteResult::Failed(other.as_str().to_string()),
        }
    }
}

/// Outcome of `file.rename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameResult {
    /// The file was renamed.
    Renamed,
    /// The rename failed, with the printed value.
    Failed(String),
}

impl From<Reply> for RenameResult {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::True => RenameResult::Renamed,
            other => RenameResult::Failed(other.as_str().to_string()),
        }
    }
}

/// Outcome of a `file.list()[name]` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeResult {
    /// No such file.
    Missing,
    /// The file exists with the given size in bytes.
    Size(u64),
}

impl SizeResult {
    /// Classify a size lookup reply.
    pub fn parse(reply: &Reply) -> NodeMcuResult<SizeResult> {
        match reply {
            Reply::Nil => Ok(SizeResult::Missing),
            other => Ok(SizeResult::Size(other.as_integer()?)),
        }
    }
}

/// Supported firmware versions: `min` inclusive, `max` exclusive.
pub const SUPPORTED_VERSIONS: std::ops::Range<Version> =
    Version { major: 1, minor: 4 }..Version { major: 2, minor: 0 };

/// Firmware version reported by `node.info()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl Version {
    /// Parse a `node.info()` line.
    ///
    /// Format: "MAJOR\tMINOR\tDEVREV\tCHIPID\t..." (only the first two fields are used)
    pub fn parse(line: &str) -> NodeMcuResult<Version> {
        let mut fields = line.split('\t');
        let mut next = |what: &str| -> NodeMcuResult<u32> {
            let field = fields
                .next()
                .ok_or_else(|| NodeMcuError::Parse(format!("missing {} version in {:?}", what, line)))?;
            field
                .trim()
                .parse()
                .map_err(|_| NodeMcuError::Parse(format!("invalid {} version: {:?}", what, field)))
        };
        let major = next("major")?;
        let minor = next("minor")?;
        Ok(Version { major, minor })
    }

    /// Whether this version speaks the protocol implemented here.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(self)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A file in the remote file table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Raw file name.
    pub name: Vec<u8>,
    /// Size in bytes.
    pub size: u64,
}

impl FileEntry {
    /// Parse the length prefix of a listing line.
    ///
    /// Returns the declared name length and the bytes after the first tab.
    pub fn split_prefix(line: &[u8]) -> NodeMcuResult<(usize, &[u8])> {
        let tab = line
            .iter()
            .position(|&b| b == b'\t')
            .ok_or_else(|| NodeMcuError::UnexpectedResponse(lossy(line)))?;
        let len = parse_integer(&lossy(&line[..tab]))? as usize;
        Ok((len, &line[tab + 1..]))
    }

    /// Parse a complete listing line.
    ///
    /// Format: "LEN\tNAMESIZE", where NAME is exactly LEN bytes. A tab between
    /// NAME and SIZE is tolerated.
    pub fn parse(line: &[u8]) -> NodeMcuResult<FileEntry> {
        let (len, rest) = Self::split_prefix(line)?;
        if rest.len() <= len {
            return Err(NodeMcuError::UnexpectedResponse(lossy(line)));
        }
        let (name, size) = rest.split_at(len);
        let size = size.strip_prefix(b"\t").unwrap_or(size);
        Ok(FileEntry {
            name: name.to_vec(),
            size: parse_integer(&lossy(size))?,
        })
    }
}

fn parse_integer(text: &str) -> NodeMcuResult<u64> {
    text.trim()
        .parse()
        .map_err(|_| NodeMcuError::Parse(format!("expected an integer, got {:?}", text)))
}

fn lossy(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}
