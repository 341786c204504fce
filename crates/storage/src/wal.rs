// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counter write-ahead log
//!
//! One JSON record per line, synced before the store acknowledges the write.
//! Opening the log recovers every record in one pass. A crash mid-append can
//! leave a torn final line; it is cut off on open. Damage anywhere else, or a
//! gap in the sequence, refuses to open.

use serde::{Deserialize, Serialize};
use sg_core::{Operation, StoreError};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt record at line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("sequence gap at line {line}: expected {expected}, found {found}")]
    Gap { line: usize, expected: u64, found: u64 },
    #[error("cannot encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<WalError> for StoreError {
    fn from(err: WalError) -> Self {
        StoreError::Wal(err.to_string())
    }
}

/// Append handle on a counter log
pub struct Wal {
    file: File,
    last_seq: u64,
}

/// A reopened log and the operations it already held
pub struct Recovered {
    pub wal: Wal,
    pub operations: Vec<Operation>,
}

#[derive(Serialize)]
struct RecordOut<'a> {
    seq: u64,
    op: &'a Operation,
}

#[derive(Deserialize)]
struct RecordIn {
    seq: u64,
    op: Operation,
}

impl Wal {
    /// Open or create the log at `path`, recovering what it holds
    pub fn open(path: &Path) -> Result<Recovered, WalError> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let mut operations = Vec::new();
        let mut last_seq = 0;
        // Bytes up to and including the last intact record
        let mut intact = 0;
        let mut unterminated = false;

        let mut lines = contents.split_inclusive('\n').enumerate().peekable();
        while let Some((index, raw)) = lines.next() {
            let terminated = raw.ends_with('\n');
            let body = raw.trim_end();
            if body.is_empty() {
                intact += raw.len();
                continue;
            }

            let record: RecordIn = match serde_json::from_str(body) {
                Ok(record) => record,
                Err(source) if !terminated && lines.peek().is_none() => {
                    tracing::warn!(
                        path = %path.display(),
                        line = index + 1,
                        error = %source,
                        "dropping torn record at end of wal"
                    );
                    break;
                }
                Err(source) => {
                    return Err(WalError::Corrupt {
                        line: index + 1,
                        source,
                    })
                }
            };
            if record.seq != last_seq + 1 {
                return Err(WalError::Gap {
                    line: index + 1,
                    expected: last_seq + 1,
                    found: record.seq,
                });
            }

            last_seq = record.seq;
            operations.push(record.op);
            intact += raw.len();
            unterminated = !terminated;
        }

        if intact < contents.len() {
            file.set_len(intact as u64)?;
        }
        if unterminated {
            // Complete record missing only its newline
            file.write_all(b"\n")?;
        }

        Ok(Recovered {
            wal: Self { file, last_seq },
            operations,
        })
    }

    /// Append `op` and sync it to disk, returning its sequence number
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let seq = self.last_seq + 1;
        let mut line = serde_json::to_vec(&RecordOut { seq, op })?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_data()?;
        self.last_seq = seq;
        Ok(seq)
    }

    /// Sequence number of the last record written
    pub fn sequence(&self) -> u64 {
        self.last_seq
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
