// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Trace streams and the sinks they write to.

mod packet;
mod sink;
mod stream;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use packet::{
    DebugMarkerRecord, RenderStageEvent, RenderStageSpecifications, TracePacket, TracePayload,
};
pub use sink::{JsonLinesSink, LogSink, MemorySink, NullSink, RecordedPacket, TraceSink};
pub use stream::{StreamDescriptor, TraceSession, TraceStream};

use crate::config::StreamSelection;

/// Whether the `gpu.renderstages` specification record has been written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    #[default]
    Uninitialized,
    SchemaEmitted,
}

/// The layer's trace streams plus the sink they feed.
pub struct Tracer {
    sink: Arc<dyn TraceSink>,
    selection: StreamSelection,
    declared: AtomicBool,
    render_stages: TraceStream<SchemaState>,
    vk_api: TraceStream<()>,
}

impl Tracer {
    pub const RENDER_STAGES_STREAM: &'static str = "gpu.renderstages";
    pub const VK_API_STREAM: &'static str = "vk_api";

    pub fn new(sink: Arc<dyn TraceSink>, selection: StreamSelection) -> Self {
        Self {
            sink,
            selection,
            declared: AtomicBool::new(false),
            render_stages: TraceStream::new(Self::RENDER_STAGES_STREAM, SchemaState::default()),
            vk_api: TraceStream::new(Self::VK_API_STREAM, ()),
        }
    }

    /// Declare both streams to the sink and start the selected ones.
    /// Only the first call has any effect.
    pub fn declare_streams(&self) {
        if self.declared.swap(true, Ordering::AcqRel) {
            return;
        }

        for descriptor in [self.render_stages.descriptor(), self.vk_api.descriptor()] {
            self.sink.declare_stream(descriptor);
        }
        for name in [Self::RENDER_STAGES_STREAM, Self::VK_API_STREAM] {
            if self.selection.includes(name) {
                self.start_stream(name);
            }
        }
    }

    pub fn is_declared(&self) -> bool {
        self.declared.load(Ordering::Acquire)
    }

    /// Start a declared stream. Returns `false` for unknown or undeclared
    /// streams.
    pub fn start_stream(&self, name: &str) -> bool {
        if !self.is_declared() {
            tracing::warn!("Cannot start trace stream {}: streams not declared yet", name);
            return false;
        }
        match name {
            Self::RENDER_STAGES_STREAM => self.render_stages.start(),
            Self::VK_API_STREAM => self.vk_api.start(),
            _ => return false,
        }
        true
    }

    pub fn stop_stream(&self, name: &str) -> bool {
        match name {
            Self::RENDER_STAGES_STREAM => self.render_stages.stop(),
            Self::VK_API_STREAM => self.vk_api.stop(),
            _ => return false,
        }
        true
    }

    pub fn sink(&self) -> &dyn TraceSink {
        self.sink.as_ref()
    }

    pub fn render_stages(&self) -> &TraceStream<SchemaState> {
        &self.render_stages
    }

    pub fn vk_api(&self) -> &TraceStream<()> {
        &self.vk_api
    }
}
