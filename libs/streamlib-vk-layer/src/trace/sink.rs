// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Consumers of trace packets.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use super::{StreamDescriptor, TracePacket};
use crate::error::Result;

/// Receiver of declared streams and their packets.
///
/// Implementations must not fail the calling Vulkan entry point: write errors
/// are logged and the packets dropped.
pub trait TraceSink: Send + Sync {
    /// Called once per stream before any of its packets are written.
    fn declare_stream(&self, descriptor: &StreamDescriptor);

    /// Packets of one trace session, in emission order.
    fn write_packets(&self, stream: &str, packets: &[TracePacket]);
}

/// Drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn declare_stream(&self, _descriptor: &StreamDescriptor) {}

    fn write_packets(&self, _stream: &str, _packets: &[TracePacket]) {}
}

/// Emits packets as structured `tracing` events.
#[derive(Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn declare_stream(&self, descriptor: &StreamDescriptor) {
        tracing::info!(stream = descriptor.name, "Trace stream declared");
    }

    fn write_packets(&self, stream: &str, packets: &[TracePacket]) {
        for packet in packets {
            match serde_json::to_string(&packet.payload) {
                Ok(payload) => tracing::debug!(
                    target: "streamlib_vk_layer::trace",
                    stream,
                    timestamp = packet.timestamp,
                    %payload,
                    "Trace packet"
                ),
                Err(e) => tracing::warn!("Failed to encode trace packet for {}: {}", stream, e),
            }
        }
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    stream: &'a str,
    #[serde(flatten)]
    packet: &'a TracePacket,
}

/// Appends one JSON object per packet to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::info!("Writing trace packets to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn append(&self, stream: &str, packets: &[TracePacket]) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        for packet in packets {
            serde_json::to_writer(&mut *writer, &JsonLine { stream, packet })?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

impl TraceSink for JsonLinesSink {
    fn declare_stream(&self, descriptor: &StreamDescriptor) {
        tracing::debug!(
            "Trace stream {} routed to {}",
            descriptor.name,
            self.path.display()
        );
    }

    fn write_packets(&self, stream: &str, packets: &[TracePacket]) {
        if let Err(e) = self.append(stream, packets) {
            tracing::warn!(
                "Dropped {} packet(s) of {}: failed to write {}: {}",
                packets.len(),
                stream,
                self.path.display(),
                e
            );
        }
    }
}

/// A packet captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPacket {
    pub stream: String,
    pub packet: TracePacket,
}

/// Keeps declared streams and packets in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    declared: Mutex<Vec<String>>,
    packets: Mutex<Vec<RecordedPacket>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declared_streams(&self) -> Vec<String> {
        self.declared.lock().clone()
    }

    pub fn packets(&self) -> Vec<RecordedPacket> {
        self.packets.lock().clone()
    }

    pub fn packets_for(&self, stream: &str) -> Vec<TracePacket> {
        self.packets
            .lock()
            .iter()
            .filter(|recorded| recorded.stream == stream)
            .map(|recorded| recorded.packet.clone())
            .collect()
    }
}

impl TraceSink for MemorySink {
    fn declare_stream(&self, descriptor: &StreamDescriptor) {
        self.declared.lock().push(descriptor.name.to_string());
    }

    fn write_packets(&self, stream: &str, packets: &[TracePacket]) {
        self.packets
            .lock()
            .extend(packets.iter().cloned().map(|packet| RecordedPacket {
                stream: stream.to_string(),
                packet,
            }));
    }
}
