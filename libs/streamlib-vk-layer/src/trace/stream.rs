// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};

use super::{TracePacket, TraceSink};

/// What a sink learns about a stream when it is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub name: &'static str,
}

/// A named channel the consumer can start and stop at any time.
///
/// `S` is per-stream state shared by every session on the stream (for
/// example whether a schema record has already been written).
pub struct TraceStream<S> {
    descriptor: StreamDescriptor,
    started: AtomicBool,
    state: Mutex<S>,
}

impl<S> TraceStream<S> {
    pub fn new(name: &'static str, state: S) -> Self {
        Self {
            descriptor: StreamDescriptor { name },
            started: AtomicBool::new(false),
            state: Mutex::new(state),
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    pub fn start(&self) {
        if !self.started.swap(true, Ordering::AcqRel) {
            tracing::info!("Trace stream {} started", self.name());
        }
    }

    pub fn stop(&self) {
        if self.started.swap(false, Ordering::AcqRel) {
            tracing::info!("Trace stream {} stopped", self.name());
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Run `record` inside a session on this stream.
    ///
    /// Returns `None` without calling `record` when the stream is stopped;
    /// nothing is queued for later. Packets emitted inside the session reach
    /// `sink` when the session closes, on every exit path.
    pub fn trace<R>(
        &self,
        sink: &dyn TraceSink,
        record: impl FnOnce(&mut TraceSession<'_, S>) -> R,
    ) -> Option<R> {
        if !self.is_started() {
            return None;
        }
        let mut session = TraceSession {
            stream: self.descriptor.name,
            sink,
            state: self.state.lock(),
            packets: Vec::new(),
        };
        Some(record(&mut session))
    }
}

/// Scoped recording session. Holds the stream's state lock, so sessions on
/// one stream never interleave.
pub struct TraceSession<'a, S> {
    stream: &'static str,
    sink: &'a dyn TraceSink,
    state: MutexGuard<'a, S>,
    packets: Vec<TracePacket>,
}

impl<S> TraceSession<'_, S> {
    pub fn state(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn emit(&mut self, packet: TracePacket) {
        self.packets.push(packet);
    }
}

impl<S> Drop for TraceSession<'_, S> {
    fn drop(&mut self) {
        if !self.packets.is_empty() {
            self.sink.write_packets(self.stream, &self.packets);
        }
    }
}
