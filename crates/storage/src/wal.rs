// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of encoded commands
//!
//! One JSON line per entry, carrying a sequence number, the encoded command
//! and a CRC32 of the encoded command. A damaged final line is treated as a
//! torn write and cut off; damage anywhere else is an error.

use cortex_core::Command;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupted entry at line {line}: {reason}")]
    Corrupted { line: u64, reason: String },
    #[error("undecodable command at seq {seq}: {source}")]
    Decode {
        seq: u64,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct WalEntry {
    seq: u64,
    command: String,
    checksum: u32,
}

impl WalEntry {
    fn verify(&self) -> bool {
        crc32fast::hash(self.command.as_bytes()) == self.checksum
    }
}

/// Valid contents of a WAL file
struct Scan {
    commands: Vec<Command>,
    last_seq: u64,
    valid_len: u64,
    file_len: u64,
}

fn scan(path: &Path) -> Result<Scan, WalError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Scan {
                commands: Vec::new(),
                last_seq: 0,
                valid_len: 0,
                file_len: 0,
            })
        }
        Err(e) => return Err(e.into()),
    };
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut scan = Scan {
        commands: Vec::new(),
        last_seq: 0,
        valid_len: 0,
        file_len,
    };
    let mut line = String::new();
    let mut line_no = 0u64;

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let end = scan.valid_len + read as u64;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            scan.valid_len = end;
            continue;
        }

        let damage = match serde_json::from_str::<WalEntry>(trimmed) {
            Ok(entry) if !line.ends_with('\n') => Some(format!("unterminated seq {}", entry.seq)),
            Ok(entry) if !entry.verify() => Some(format!("checksum mismatch at seq {}", entry.seq)),
            Ok(entry) => {
                let command = Command::decode(&entry.command).map_err(|source| {
                    WalError::Decode {
                        seq: entry.seq,
                        source,
                    }
                })?;
                scan.commands.push(command);
                scan.last_seq = entry.seq;
                scan.valid_len = end;
                None
            }
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = damage {
            if end < file_len {
                return Err(WalError::Corrupted {
                    line: line_no,
                    reason,
                });
            }
            tracing::warn!(line = line_no, %reason, "discarding torn WAL tail");
            break;
        }
    }
    Ok(scan)
}

/// Append-only command log
pub struct Wal {
    path: PathBuf,
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a WAL, cutting off a torn final entry
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let scan = scan(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        if scan.valid_len < scan.file_len {
            file.set_len(scan.valid_len)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            file,
            sequence: scan.last_seq,
        })
    }

    /// Append a command, syncing before returning
    pub fn append(&mut self, command: &Command) -> Result<u64, WalError> {
        let encoded = command.encode()?;
        let entry = WalEntry {
            seq: self.sequence + 1,
            checksum: crc32fast::hash(encoded.as_bytes()),
            command: encoded,
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_data()?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop every entry. Sequence numbers keep counting up.
    pub fn truncate(&mut self) -> Result<(), WalError> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Read back every command in the log
    pub fn replay(path: &Path) -> Result<Vec<Command>, WalError> {
        Ok(scan(path)?.commands)
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
