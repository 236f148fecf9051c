//! Line-oriented command shell over an [`OrderedStringMap`] of JSON values.
//!
//! One command per line:
//!
//! ```text
//! set <key> <json>   insert or update, prints "ok"
//! get <key>          prints the value or "(nil)"
//! del <key>          remove, prints "ok"
//! len                number of entries
//! keys               keys from least to most recently set
//! reindex            compact order stamps, prints "ok"
//! dump               the whole map as a JSON object
//! ```

use std::io::{BufRead, Write};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::MapError;
use crate::map::OrderedStringMap;

#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("invalid JSON value: {0}")]
    InvalidValue(#[source] serde_json::Error),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { key: String, value: Value },
    Get { key: String },
    Del { key: String },
    Len,
    Keys,
    Reindex,
    Dump,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, ShellError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = split_word(line);
        let command = match name {
            "set" => {
                let (key, json) = split_word(rest);
                let key = required(key, "key")?;
                let json = required(json, "value")?;
                let value = serde_json::from_str(&json).map_err(ShellError::InvalidValue)?;
                Command::Set { key, value }
            }
            "get" => Command::Get {
                key: single_key(rest)?,
            },
            "del" => Command::Del {
                key: single_key(rest)?,
            },
            "len" => no_args(rest, Command::Len)?,
            "keys" => no_args(rest, Command::Keys)?,
            "reindex" => no_args(rest, Command::Reindex)?,
            "dump" => no_args(rest, Command::Dump)?,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn required(word: &str, what: &'static str) -> Result<String, ShellError> {
    if word.is_empty() {
        Err(ShellError::MissingArgument(what))
    } else {
        Ok(word.to_string())
    }
}

fn single_key(rest: &str) -> Result<String, ShellError> {
    let (key, extra) = split_word(rest);
    let key = required(key, "key")?;
    if !extra.is_empty() {
        return Err(ShellError::UnexpectedArgument(extra.to_string()));
    }
    Ok(key)
}

fn no_args(rest: &str, command: Command) -> Result<Command, ShellError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ShellError::UnexpectedArgument(rest.to_string()))
    }
}

pub struct Shell {
    map: OrderedStringMap<Value>,
}

impl Shell {
    pub fn new(map: OrderedStringMap<Value>) -> Self {
        Self { map }
    }

    /// Run a command and return the line to print.
    pub fn execute(&self, command: Command) -> Result<String, ShellError> {
        debug!(?command, "Executing shell command");
        let output = match command {
            Command::Set { key, value } => {
                self.map.set(key, value);
                "ok".to_string()
            }
            Command::Get { key } => match self.map.get(&key) {
                Some(value) => value.to_string(),
                None => "(nil)".to_string(),
            },
            Command::Del { key } => {
                self.map.delete(&key);
                "ok".to_string()
            }
            Command::Len => self.map.len().to_string(),
            Command::Keys => self.map.key_order().join(" "),
            Command::Reindex => {
                self.map.reindex();
                "ok".to_string()
            }
            Command::Dump => self.map.to_json()?,
        };
        Ok(output)
    }

    /// Read commands until EOF. Command failures are reported inline and do
    /// not stop the loop; only I/O errors do.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<(), ShellError> {
        let mut processed = 0usize;
        for line in input.lines() {
            let line = line?;
            let result = Command::parse(&line).and_then(|parsed| match parsed {
                Some(command) => self.execute(command).map(Some),
                None => Ok(None),
            });

            match result {
                Ok(Some(text)) => writeln!(output, "{}", text)?,
                Ok(None) => continue,
                Err(err) => writeln!(output, "error: {}", err)?,
            }
            processed += 1;
        }
        output.flush()?;

        info!(commands = processed, entries = self.map.len(), "Shell input exhausted");
        Ok(())
    }
}
