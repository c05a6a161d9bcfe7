// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary snapshot codec
//!
//! A snapshot is a sequence of frames: a one-byte type tag, a big-endian
//! `u32` payload length, then a MessagePack payload. Rules, scripts and
//! execution records are written in key order. Buckets are not part of a
//! snapshot.

use cortex_core::{ExecutionRecord, Rule, Script};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use thiserror::Error;

/// Largest payload a single frame may carry, in either direction
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        source: rmp_serde::encode::Error,
    },
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Rule = 0,
    Script = 1,
    Record = 2,
}

impl FrameType {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FrameType::Rule),
            1 => Some(FrameType::Script),
            2 => Some(FrameType::Record),
            _ => None,
        }
    }
}

/// Point-in-time copy of the snapshotted tables
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    pub rules: HashMap<String, Rule>,
    pub scripts: HashMap<String, Script>,
    pub records: HashMap<String, ExecutionRecord>,
}

impl SnapshotSource {
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), SnapshotError> {
        write_frames(w, FrameType::Rule, "rule", &self.rules)?;
        write_frames(w, FrameType::Script, "script", &self.scripts)?;
        write_frames(w, FrameType::Record, "record", &self.records)?;
        w.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Decode a snapshot stream. Rules are re-validated.
    pub fn read_from<R: Read + ?Sized>(r: &mut R) -> Result<Self, SnapshotError> {
        let mut source = SnapshotSource::default();
        while let Some(tag) = read_tag(r)? {
            let frame = FrameType::from_tag(tag)
                .ok_or_else(|| SnapshotError::Malformed(format!("unknown type tag {}", tag)))?;
            let payload = read_payload(r)?;
            match frame {
                FrameType::Rule => {
                    let mut rule: Rule = decode(&payload, "rule")?;
                    rule.validate().map_err(|e| {
                        SnapshotError::Malformed(format!("rule {}: {}", rule.id, e))
                    })?;
                    source.rules.insert(rule.id.clone(), rule);
                }
                FrameType::Script => {
                    let script: Script = decode(&payload, "script")?;
                    source.scripts.insert(script.id.clone(), script);
                }
                FrameType::Record => {
                    let record: ExecutionRecord = decode(&payload, "record")?;
                    source.records.insert(record.id.clone(), record);
                }
            }
        }
        Ok(source)
    }
}

fn write_frames<W: Write, T: Serialize>(
    w: &mut W,
    frame: FrameType,
    kind: &'static str,
    values: &HashMap<String, T>,
) -> Result<(), SnapshotError> {
    let mut keys: Vec<&String> = values.keys().collect();
    keys.sort();
    for key in keys {
        let payload = rmp_serde::to_vec_named(&values[key])
            .map_err(|source| SnapshotError::Encode { kind, source })?;
        if payload.len() > MAX_FRAME_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} {} is {} bytes, over the frame limit", kind, key, payload.len()),
            )
            .into());
        }
        w.write_all(&[frame as u8])?;
        w.write_all(&(payload.len() as u32).to_be_bytes())?;
        w.write_all(&payload)?;
    }
    Ok(())
}

/// Next tag byte, or `None` at a clean end of stream
fn read_tag<R: Read + ?Sized>(r: &mut R) -> Result<Option<u8>, SnapshotError> {
    let mut tag = [0u8; 1];
    loop {
        match r.read(&mut tag) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(tag[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn read_payload<R: Read + ?Sized>(r: &mut R) -> Result<Vec<u8>, SnapshotError> {
    let mut len = [0u8; 4];
    read_exact(r, &mut len)?;
    let len = u32::from_be_bytes(len) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(SnapshotError::Malformed(format!(
            "frame of {} bytes exceeds {}",
            len, MAX_FRAME_SIZE
        )));
    }
    // Sized by the bytes present, not the declared length
    let mut payload = Vec::new();
    Read::take(&mut *r, len as u64).read_to_end(&mut payload)?;
    if payload.len() < len {
        return Err(SnapshotError::Malformed("truncated frame".to_string()));
    }
    Ok(payload)
}

fn read_exact<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<(), SnapshotError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => SnapshotError::Malformed("truncated frame".to_string()),
        _ => SnapshotError::Io(e),
    })
}

fn decode<T: DeserializeOwned>(payload: &[u8], kind: &str) -> Result<T, SnapshotError> {
    let mut cursor = Cursor::new(payload);
    let value = rmp_serde::from_read(&mut cursor)
        .map_err(|e| SnapshotError::Malformed(format!("{}: {}", kind, e)))?;
    let consumed = cursor.position();
    if consumed != payload.len() as u64 {
        return Err(SnapshotError::Malformed(format!(
            "{}: {} trailing bytes",
            kind,
            payload.len() as u64 - consumed
        )));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
