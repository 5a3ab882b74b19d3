// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use crate::config::{LayerConfig, StreamSelection};
use crate::logging;
use crate::registry::ChainRegistry;
use crate::trace::{TraceSink, Tracer};

static GLOBAL_CONTEXT: LazyLock<LayerContext> = LazyLock::new(|| {
    let config = LayerConfig::from_env();
    logging::init(&config.log);
    tracing::info!(
        "Layer {} v{} loaded (trace: {:?})",
        crate::LAYER_NAME.to_string_lossy(),
        env!("CARGO_PKG_VERSION"),
        config.trace
    );
    LayerContext::from_config(&config)
});

/// Everything the layer keeps between calls: forwarding tables, trace
/// streams and the debug-marker sequence.
///
/// The exported entry points use [`LayerContext::global`]; tests build their
/// own.
pub struct LayerContext {
    registry: ChainRegistry,
    tracer: Tracer,
    marker_sequence: AtomicU64,
}

impl LayerContext {
    pub fn new(sink: Arc<dyn TraceSink>, streams: StreamSelection) -> Self {
        Self {
            registry: ChainRegistry::new(),
            tracer: Tracer::new(sink, streams),
            marker_sequence: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &LayerConfig) -> Self {
        Self::new(config.build_sink(), config.streams.clone())
    }

    /// The process-wide context, built from the environment on first use.
    pub fn global() -> &'static LayerContext {
        &GLOBAL_CONTEXT
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Next debug-marker sequence number, starting at 1.
    pub fn next_marker_sequence(&self) -> u64 {
        self.marker_sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}
