// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::Serialize;

/// One timestamped record on a trace stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracePacket {
    pub timestamp: u64,
    #[serde(flatten)]
    pub payload: TracePayload,
}

impl TracePacket {
    pub fn new(timestamp: u64, payload: TracePayload) -> Self {
        Self { timestamp, payload }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TracePayload {
    /// Object name attached through `VK_EXT_debug_marker`.
    DebugMarker(DebugMarkerRecord),
    /// Names of the hardware queues and stages later events index into.
    RenderStageSpecifications(RenderStageSpecifications),
    RenderStageEvent(RenderStageEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugMarkerRecord {
    pub vk_device: u64,
    pub object_type: i32,
    pub object: u64,
    pub object_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStageSpecifications {
    pub hw_queues: Vec<String>,
    pub stages: Vec<String>,
}

impl RenderStageSpecifications {
    /// Two hardware queues, three pipeline stages.
    pub fn default_layout() -> Self {
        Self {
            hw_queues: vec!["queue 0".into(), "queue 1".into()],
            stages: vec!["stage 0".into(), "stage 1".into(), "stage 2".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStageEvent {
    pub event_id: u64,
    pub duration: u64,
    pub hw_queue_id: u32,
    pub stage_id: u32,
    pub context: u64,
    pub render_target_handle: u64,
}
