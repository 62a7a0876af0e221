// src/core/protocol/mod.rs

//! The textual command protocol: a closed command set and the tokenizer that
//! turns one raw client line into a typed [`Command`].

mod parser;

pub use parser::parse;

use strum_macros::{Display, EnumString};

/// The closed set of commands a client can issue.
///
/// The string form of each variant (kebab-case) is what clients type; matching
/// is case-insensitive. Anything else parses as [`CommandKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CommandKind {
    Register,
    Login,
    Disconnect,
    Search,
    Top,
    CreatePlaylist,
    AddSongTo,
    ShowPlaylist,
    Play,
    Stop,
    Unknown,
}

/// A parsed client command: a kind plus its positional string arguments.
/// Immutable once parsed; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(kind: CommandKind, args: Vec<String>) -> Self {
        Self { kind, args }
    }
}
