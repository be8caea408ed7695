//! Statements that can be sent to the NodeMCU interpreter.
//!
//! Each command is a single line of Lua. Statements prefixed with `=` are
//! expressions whose value the console prints, which is how results come back:
//! - `=file.open(...)` prints `true` or `nil`
//! - `=file.list()[name]` prints the size or `nil`
//! - `uart.write(0, ...)` dumps raw bytes without any line framing

use crate::codec::LineCodec;
use crate::literal::encode_bytes;

/// Mode used when opening a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open for reading (`'r'`).
    Read,
    /// Truncate and open for writing (`'w'`).
    Write,
}

impl OpenMode {
    /// Get the mode string used in `file.open`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
        }
    }
}

/// Lua snippet which prints the number of files in flash.
pub const COUNT_FILES_SNIPPET: &str =
    "do local n=0 for _ in pairs(file.list()) do n=n+1 end print(n) end";

/// Lua snippet which prints one `LEN\tNAMESIZE` line per file.
///
/// The name is length-prefixed because it may contain tabs or line endings.
pub const LIST_FILES_SNIPPET: &str =
    "for f,s in pairs(file.list()) do print(#f..'\\t'..f..s) end";

/// Commands that can be sent to the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the firmware version and chip information.
    NodeInfo,

    /// Close the currently open file, if any.
    FileClose,

    /// Open a file, printing `true` or `nil`.
    FileOpen {
        /// The file name.
        name: Vec<u8>,
        /// The open mode.
        mode: OpenMode,
    },

    /// Write a block to the open file, printing `true` on success.
    FileWrite {
        /// The block contents.
        data: Vec<u8>,
    },

    /// Print the size of a file, or `nil` if it does not exist.
    FileSize {
        /// The file name.
        name: Vec<u8>,
    },

    /// Dump up to `len` raw bytes of the open file to the UART.
    FileRead {
        /// Number of bytes to read.
        len: usize,
    },

    /// Print the number of files in flash.
    CountFiles,

    /// Print the length-prefixed name and size of every file.
    ListFiles,

    /// Remove a file.
    FileRemove {
        /// The file name.
        name: Vec<u8>,
    },

    /// Rename a file, printing `true` on success.
    FileRename {
        /// The current name.
        old: Vec<u8>,
        /// The new name.
        new: Vec<u8>,
    },

    /// Format the flash file system.
    FileFormat,

    /// Execute a Lua file from flash.
    DoFile {
        /// The file name.
        name: Vec<u8>,
    },

    /// Restart the module.
    Restart,
}

impl Command {
    /// Encode the command as a line to send to the interpreter.
    /// Returns the bytes to send (including the CRLF terminator).
    pub fn encode(&self) -> Vec<u8> {
        LineCodec::encode_command(&self.to_statement())
    }

    /// Get the Lua statement without the terminator.
    ///
    /// The result is always ASCII: literals escape everything else.
    pub fn to_statement(&self) -> Vec<u8> {
        match self {
            Command::NodeInfo => b"=node.info()".to_vec(),
            Command::FileClose => b"file.close()".to_vec(),
            Command::FileOpen { name, mode } => {
                let mut out = b"=file.open(".to_vec();
                out.extend_from_slice(&encode_bytes(name));
                out.extend_from_slice(format!(",'{}')", mode.as_str()).as_bytes());
                out
            }
            Command::FileWrite { data } => call(b"=file.write", &[data]),
            Command::FileSize { name } => {
                let mut out = b"=file.list()[".to_vec();
                out.extend_from_slice(&encode_bytes(name));
                out.push(b']');
                out
            }
            Command::FileRead { len } => format!("uart.write(0,file.read({}))", len).into_bytes(),
            Command::CountFiles => COUNT_FILES_SNIPPET.as_bytes().to_vec(),
            Command::ListFiles => LIST_FILES_SNIPPET.as_bytes().to_vec(),
            Command::FileRemove { name } => call(b"file.remove", &[name]),
            Command::FileRename { old, new } => call(b"=file.rename", &[old, new]),
            Command::FileFormat => b"file.format()".to_vec(),
            Command::DoFile { name } => call(b"dofile", &[name]),
            Command::Restart => b"node.restart()".to_vec(),
        }
    }
}

/// Render `function(arg, ...)` with every argument as a string literal.
fn call(function: &[u8], args: &[&Vec<u8>]) -> Vec<u8> {
    let mut out = function.to_vec();
    out.push(b'(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        out.extend_from_slice(&encode_bytes(arg));
    }
    out.push(b')');
    out
}
