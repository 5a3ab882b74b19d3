// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Intercepted debug-marker and debug-utils calls.

use std::ffi::CStr;

use ash::vk;
use ash::vk::Handle;

use crate::context::LayerContext;
use crate::error::{LayerError, Result};
use crate::trace::{
    DebugMarkerRecord, RenderStageEvent, RenderStageSpecifications, SchemaState, TracePacket,
    TracePayload,
};

/// Render-stage events carry this fixed GPU context id.
const RENDER_STAGE_CONTEXT: u64 = 42;
/// Duration reported for every render-stage event.
const RENDER_STAGE_DURATION: u64 = 5;

impl LayerContext {
    /// Record an object name as trace packets. The call is not forwarded.
    ///
    /// Marker `n` produces a `vk_api` debug-marker record at `10n - 1` and a
    /// `gpu.renderstages` event at `10n`, preceded the first time by the
    /// stream's queue and stage specification at timestamp 0. Stopped streams
    /// drop their packets.
    pub fn record_object_name(
        &self,
        device: vk::Device,
        object_type: vk::DebugReportObjectTypeEXT,
        object: u64,
        object_name: &str,
    ) -> Result<()> {
        if !self.registry().contains_device(device) {
            return Err(LayerError::UnknownDevice(device));
        }

        let sequence = self.next_marker_sequence();
        let tracer = self.tracer();
        tracing::debug!(
            "vkDebugMarkerSetObjectNameEXT #{}: {:#x} ({:?}) = {:?}",
            sequence,
            object,
            object_type,
            object_name
        );

        tracer.vk_api().trace(tracer.sink(), |session| {
            session.emit(TracePacket::new(
                sequence * 10 - 1,
                TracePayload::DebugMarker(DebugMarkerRecord {
                    vk_device: device.as_raw(),
                    object_type: object_type.as_raw(),
                    object,
                    object_name: object_name.to_owned(),
                }),
            ));
        });

        tracer.render_stages().trace(tracer.sink(), |session| {
            if *session.state() == SchemaState::Uninitialized {
                session.emit(TracePacket::new(
                    0,
                    TracePayload::RenderStageSpecifications(
                        RenderStageSpecifications::default_layout(),
                    ),
                ));
                *session.state() = SchemaState::SchemaEmitted;
            }
            session.emit(TracePacket::new(
                sequence * 10,
                TracePayload::RenderStageEvent(RenderStageEvent {
                    event_id: sequence,
                    duration: RENDER_STAGE_DURATION,
                    hw_queue_id: (sequence % 2) as u32,
                    stage_id: (sequence % 3) as u32,
                    context: RENDER_STAGE_CONTEXT,
                    render_target_handle: object,
                }),
            ));
        });

        Ok(())
    }

    /// # Safety
    /// Raw `vkDebugMarkerSetObjectNameEXT` contract.
    pub unsafe fn debug_marker_set_object_name(
        &self,
        device: vk::Device,
        name_info: *const vk::DebugMarkerObjectNameInfoEXT<'_>,
    ) -> Result<()> {
        let Some(info) = (unsafe { name_info.as_ref() }) else {
            tracing::warn!("vkDebugMarkerSetObjectNameEXT called without name info");
            return Ok(());
        };
        let object_name = if info.p_object_name.is_null() {
            Default::default()
        } else {
            unsafe { CStr::from_ptr(info.p_object_name) }.to_string_lossy()
        };
        self.record_object_name(device, info.object_type, info.object, &object_name)
    }

    /// Forward `vkDebugMarkerSetObjectTagEXT` through the device's table.
    ///
    /// # Safety
    /// Raw `vkDebugMarkerSetObjectTagEXT` contract.
    pub unsafe fn debug_marker_set_object_tag(
        &self,
        device: vk::Device,
        tag_info: *const vk::DebugMarkerObjectTagInfoEXT<'_>,
    ) -> Result<vk::Result> {
        tracing::debug!("vkDebugMarkerSetObjectTagEXT on {:?}", device);
        let dispatch = self.registry().device(device)?;
        unsafe { dispatch.debug_marker_set_object_tag(device, tag_info) }
    }

    /// Forward `vkSetDebugUtilsObjectNameEXT` through the device's table.
    ///
    /// # Safety
    /// Raw `vkSetDebugUtilsObjectNameEXT` contract.
    pub unsafe fn set_debug_utils_object_name(
        &self,
        device: vk::Device,
        name_info: *const vk::DebugUtilsObjectNameInfoEXT<'_>,
    ) -> Result<vk::Result> {
        tracing::debug!("vkSetDebugUtilsObjectNameEXT on {:?}", device);
        let dispatch = self.registry().device(device)?;
        unsafe { dispatch.set_debug_utils_object_name(device, name_info) }
    }
}
