//! File-system session with a NodeMCU interpreter.
//!
//! Every exchange follows the same two steps:
//! 1. write the statement and absorb the console's echo of it
//! 2. read the response, which is a printed line, raw bytes of a known length,
//!    or free-form output up to the next prompt
//!
//! After an operation returns, successfully or not, the channel is positioned
//! at the start of the next unread response. A channel timeout in the middle of
//! a multi-step operation leaves the stream out of sync; the session should then
//! be discarded.

use std::collections::HashMap;
use std::io::Write;

use log::{debug, trace, warn};

use crate::channel::Channel;
use crate::codec::{LineCodec, LINE_ENDING, PROMPT};
use crate::commands::{Command, OpenMode};
use crate::error::{NodeMcuError, NodeMcuResult};
use crate::responses::{
    FileEntry, OpenResult, RenameResult, Reply, SizeResult, Version, WriteResult,
};

/// Default number of bytes moved per read or write statement.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// A protocol session over a single channel.
pub struct Session<C: Channel> {
    channel: C,
    /// Receives a copy of every byte read, for diagnostics.
    verbose: Option<Box<dyn Write>>,
}

impl<C: Channel> Session<C> {
    /// Create a session over an open channel.
    pub fn new(channel: C) -> Self {
        Session {
            channel,
            verbose: None,
        }
    }

    /// Create a session which copies everything it reads to `sink`.
    pub fn with_verbose(channel: C, sink: Box<dyn Write>) -> Self {
        Session {
            channel,
            verbose: Some(sink),
        }
    }

    /// Get the channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Get the channel mutably.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consume the session, returning the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    // ========================================================================
    // Transport Primitives
    // ========================================================================

    /// Dispose of anything waiting in the input buffer.
    pub fn flush(&mut self) -> NodeMcuResult<()> {
        loop {
            let pending = self.channel.pending_input_count()?;
            if pending == 0 {
                return Ok(());
            }
            let junk = self.channel.read(pending)?;
            trace!("flushed {} bytes", junk.len());
            if junk.is_empty() {
                // Count and read disagree; nothing more can be drained.
                return Ok(());
            }
        }
    }

    /// Read exactly `len` bytes.
    pub fn read(&mut self, len: usize) -> NodeMcuResult<Vec<u8>> {
        let data = self.channel.read(len)?;
        if let Some(sink) = self.verbose.as_mut() {
            // Diagnostics only, never affects the protocol
            let _ = sink.write_all(&data);
            let _ = sink.flush();
        }
        if data.len() != len {
            return Err(NodeMcuError::Timeout {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Write all of `data`.
    pub fn write(&mut self, data: &[u8]) -> NodeMcuResult<usize> {
        let written = self.channel.write(data)?;
        if written != data.len() {
            return Err(NodeMcuError::ShortWrite {
                expected: data.len(),
                actual: written,
            });
        }
        Ok(written)
    }

    /// Read raw bytes up to `terminator`, which is stripped.
    ///
    /// Reads one byte at a time so nothing after the terminator is consumed.
    pub fn read_line_bytes(&mut self, terminator: &[u8]) -> NodeMcuResult<Vec<u8>> {
        let mut codec = LineCodec::new(terminator);
        while !codec.is_complete() {
            let byte = self.read(1)?;
            codec.push(&byte);
        }
        Ok(codec.decode_line().unwrap_or_default())
    }

    /// Read a UTF-8 line up to `terminator`, which is stripped.
    pub fn read_line_with(&mut self, terminator: &[u8]) -> NodeMcuResult<String> {
        let line = self.read_line_bytes(terminator)?;
        String::from_utf8(line).map_err(|_| NodeMcuError::InvalidUtf8)
    }

    /// Read a CRLF-terminated UTF-8 line.
    pub fn read_line(&mut self) -> NodeMcuResult<String> {
        self.read_line_with(LINE_ENDING)
    }

    /// Send a raw statement and absorb its echo.
    pub fn send_statement(&mut self, statement: &[u8]) -> NodeMcuResult<()> {
        self.write(&LineCodec::encode_command(statement))?;
        let echo = self.read_line_bytes(LINE_ENDING)?;
        trace!(
            "sent {:?}, echo {:?}",
            String::from_utf8_lossy(statement),
            String::from_utf8_lossy(&echo)
        );
        Ok(())
    }

    /// Send a command and absorb its echo.
    pub fn send_command(&mut self, cmd: &Command) -> NodeMcuResult<()> {
        self.send_statement(&cmd.to_statement())
    }

    /// Send a command and read back its printed value.
    fn query(&mut self, cmd: &Command) -> NodeMcuResult<Reply> {
        self.send_command(cmd)?;
        let line = self.read_line()?;
        Ok(Reply::parse(&line))
    }

    // ========================================================================
    // Compatibility
    // ========================================================================

    /// Get the firmware version of the remote device.
    ///
    /// Callers should check `Version::is_supported` before anything else.
    pub fn get_version(&mut self) -> NodeMcuResult<Version> {
        let reply = self.query(&Command::NodeInfo)?;
        let version = Version::parse(reply.as_str())?;
        debug!("remote firmware version {}", version);
        Ok(version)
    }

    // ========================================================================
    // File Operations
    // ========================================================================

    /// Look up a file's size, failing if it does not exist.
    fn file_size(&mut self, filename: &[u8]) -> NodeMcuResult<u64> {
        let reply = self.query(&Command::FileSize {
            name: filename.to_vec(),
        })?;
        match SizeResult::parse(&reply)? {
            SizeResult::Size(size) => Ok(size),
            SizeResult::Missing => Err(NodeMcuError::FileNotFound {
                filename: lossy(filename),
            }),
        }
    }

    /// Write a file to flash in blocks of `DEFAULT_BLOCK_SIZE` bytes.
    pub fn write_file(&mut self, filename: impl AsRef<[u8]>, data: &[u8]) -> NodeMcuResult<()> {
        self.write_file_with_block_size(filename, data, DEFAULT_BLOCK_SIZE)
    }

    /// Write a file to flash, `block_size` bytes per statement.
    ///
    /// On failure the file may be left open; the next transfer closes it first.
    pub fn write_file_with_block_size(
        &mut self,
        filename: impl AsRef<[u8]>,
        data: &[u8],
        block_size: usize,
    ) -> NodeMcuResult<()> {
        let filename = filename.as_ref();
        if block_size == 0 {
            return Err(NodeMcuError::InvalidBlockSize);
        }

        self.send_command(&Command::FileClose)?;

        let reply = self.query(&Command::FileOpen {
            name: filename.to_vec(),
            mode: OpenMode::Write,
        })?;
        if let OpenResult::Refused(_) = OpenResult::for_write(reply) {
            return Err(NodeMcuError::FileOpen {
                filename: lossy(filename),
            });
        }

        debug!(
            "writing {} bytes to {:?} in blocks of {}",
            data.len(),
            lossy(filename),
            block_size
        );
        for block in data.chunks(block_size) {
            let reply = self.query(&Command::FileWrite {
                data: block.to_vec(),
            })?;
            if let WriteResult::Failed(response) = WriteResult::from(reply) {
                return Err(NodeMcuError::Write { response });
            }
        }

        self.send_command(&Command::FileClose)
    }

    /// Read a file from flash in blocks of `DEFAULT_BLOCK_SIZE` bytes.
    pub fn read_file(&mut self, filename: impl AsRef<[u8]>) -> NodeMcuResult<Vec<u8>> {
        self.read_file_with_block_size(filename, DEFAULT_BLOCK_SIZE)
    }

    /// Read a file from flash, `block_size` bytes per statement.
    ///
    /// Blocks come back as raw bytes straight after the echo, not as lines.
    pub fn read_file_with_block_size(
        &mut self,
        filename: impl AsRef<[u8]>,
        block_size: usize,
    ) -> NodeMcuResult<Vec<u8>> {
        let filename = filename.as_ref();
        if block_size == 0 {
            return Err(NodeMcuError::InvalidBlockSize);
        }

        self.send_command(&Command::FileClose)?;

        let size = self.file_size(filename)?;
        let reply = self.query(&Command::FileOpen {
            name: filename.to_vec(),
            mode: OpenMode::Read,
        })?;
        if let OpenResult::Refused(_) = OpenResult::for_read(reply) {
            return Err(NodeMcuError::FileOpen {
                filename: lossy(filename),
            });
        }

        debug!("reading {} bytes from {:?}", size, lossy(filename));
        let mut data = Vec::with_capacity(size as usize);
        let mut remaining = size as usize;
        while remaining > 0 {
            let len = remaining.min(block_size);
            self.send_command(&Command::FileRead { len })?;
            data.extend_from_slice(&self.read(len)?);
            remaining -= len;
        }

        self.send_command(&Command::FileClose)?;
        Ok(data)
    }

    /// List the files in flash with their sizes in bytes.
    pub fn list_files(&mut self) -> NodeMcuResult<HashMap<Vec<u8>, u64>> {
        let reply = self.query(&Command::CountFiles)?;
        let num_files = reply.as_integer()?;

        self.send_command(&Command::ListFiles)?;

        let mut files = HashMap::new();
        for _ in 0..num_files {
            let entry = self.read_file_entry()?;
            files.insert(entry.name, entry.size);
        }
        debug!("listed {} files", files.len());
        Ok(files)
    }

    /// Read one listing entry, which may span several lines if the name
    /// contains line endings.
    fn read_file_entry(&mut self) -> NodeMcuResult<FileEntry> {
        let mut line = self.read_line_bytes(LINE_ENDING)?;
        loop {
            let (name_len, rest) = FileEntry::split_prefix(&line)?;
            // Need the whole name plus at least one size digit
            if rest.len() > name_len {
                break;
            }
            line.extend_from_slice(LINE_ENDING);
            let more = self.read_line_bytes(LINE_ENDING)?;
            line.extend_from_slice(&more);
        }
        FileEntry::parse(&line)
    }

    /// Delete a file from flash.
    pub fn remove_file(&mut self, filename: impl AsRef<[u8]>) -> NodeMcuResult<()> {
        let filename = filename.as_ref();
        self.file_size(filename)?;
        self.send_command(&Command::FileRemove {
            name: filename.to_vec(),
        })
    }

    /// Rename a file in flash.
    pub fn rename_file(&mut self, old: impl AsRef<[u8]>, new: impl AsRef<[u8]>) -> NodeMcuResult<()> {
        let (old, new) = (old.as_ref(), new.as_ref());
        let reply = self.query(&Command::FileRename {
            old: old.to_vec(),
            new: new.to_vec(),
        })?;
        match RenameResult::from(reply) {
            RenameResult::Renamed => Ok(()),
            RenameResult::Failed(response) => Err(NodeMcuError::Rename {
                old: lossy(old),
                new: lossy(new),
                response,
            }),
        }
    }

    /// Format the flash file system.
    ///
    /// The interpreter does not acknowledge completion.
    pub fn format(&mut self) -> NodeMcuResult<()> {
        self.send_command(&Command::FileFormat)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute a file from flash, returning everything printed before the
    /// prompt reappears.
    pub fn dofile(&mut self, filename: impl AsRef<[u8]>) -> NodeMcuResult<String> {
        let filename = filename.as_ref();
        self.file_size(filename)?;
        self.send_command(&Command::DoFile {
            name: filename.to_vec(),
        })?;
        self.read_line_with(PROMPT)
    }

    /// Restart the module and wait for the prompt to return.
    pub fn restart(&mut self) -> NodeMcuResult<()> {
        self.send_command(&Command::Restart)?;

        // Prompt printed just before the restart
        self.read_line_with(PROMPT)?;

        // The boot ROM prints at a different baud rate, so expect garbage
        match self.read_line_with(PROMPT) {
            Ok(banner) => {
                trace!("restart banner {:?}", banner);
                Ok(())
            }
            Err(NodeMcuError::InvalidUtf8) => {
                warn!("discarded undecodable output while restarting");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn lossy(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}
