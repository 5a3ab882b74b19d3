// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `vkGetInstanceProcAddr` / `vkGetDeviceProcAddr`: local handlers first,
//! then the next chain segment.

use std::ffi::CStr;

use ash::vk;

use crate::context::LayerContext;
use crate::dispatch::void_fn;
use crate::entry;

/// Names answered locally by the instance-scoped resolver.
pub const INSTANCE_INTERCEPTS: &[&CStr] = &[
    c"vkGetInstanceProcAddr",
    c"vkGetDeviceProcAddr",
    c"vkCreateInstance",
    c"vkCreateDevice",
    c"vkEnumerateInstanceLayerProperties",
    c"vkEnumerateDeviceLayerProperties",
    c"vkEnumerateDeviceExtensionProperties",
    c"vkDebugMarkerSetObjectNameEXT",
    c"vkDebugMarkerSetObjectTagEXT",
    c"vkSetDebugUtilsObjectNameEXT",
    c"vkCmdDebugMarkerBeginEXT",
    c"vkCmdDebugMarkerEndEXT",
    c"vkCmdDebugMarkerInsertEXT",
];

/// Names answered locally by the device-scoped resolver.
pub const DEVICE_INTERCEPTS: &[&CStr] = &[
    c"vkGetDeviceProcAddr",
    c"vkDebugMarkerSetObjectNameEXT",
    c"vkDebugMarkerSetObjectTagEXT",
    c"vkSetDebugUtilsObjectNameEXT",
    c"vkCmdDebugMarkerBeginEXT",
    c"vkCmdDebugMarkerEndEXT",
    c"vkCmdDebugMarkerInsertEXT",
];

/// This layer's handler for `name` at instance scope, if it has one.
pub fn intercepted_instance_proc(name: &CStr) -> vk::PFN_vkVoidFunction {
    match name.to_bytes() {
        b"vkGetInstanceProcAddr" => void_fn!(
            entry::VkRenderStagesGetInstanceProcAddr,
            vk::PFN_vkGetInstanceProcAddr
        ),
        b"vkCreateInstance" => void_fn!(entry::create_instance, vk::PFN_vkCreateInstance),
        b"vkCreateDevice" => void_fn!(entry::create_device, vk::PFN_vkCreateDevice),
        b"vkEnumerateInstanceLayerProperties" => void_fn!(
            entry::vkEnumerateInstanceLayerProperties,
            vk::PFN_vkEnumerateInstanceLayerProperties
        ),
        b"vkEnumerateDeviceLayerProperties" => void_fn!(
            entry::vkEnumerateDeviceLayerProperties,
            vk::PFN_vkEnumerateDeviceLayerProperties
        ),
        b"vkEnumerateDeviceExtensionProperties" => void_fn!(
            entry::vkEnumerateDeviceExtensionProperties,
            vk::PFN_vkEnumerateDeviceExtensionProperties
        ),
        _ => intercepted_device_proc(name),
    }
}

/// This layer's handler for `name` at device scope, if it has one.
pub fn intercepted_device_proc(name: &CStr) -> vk::PFN_vkVoidFunction {
    match name.to_bytes() {
        b"vkGetDeviceProcAddr" => void_fn!(
            entry::VkRenderStagesGetDeviceProcAddr,
            vk::PFN_vkGetDeviceProcAddr
        ),
        b"vkDebugMarkerSetObjectNameEXT" => void_fn!(
            entry::debug_marker_set_object_name,
            vk::PFN_vkDebugMarkerSetObjectNameEXT
        ),
        b"vkDebugMarkerSetObjectTagEXT" => void_fn!(
            entry::debug_marker_set_object_tag,
            vk::PFN_vkDebugMarkerSetObjectTagEXT
        ),
        b"vkSetDebugUtilsObjectNameEXT" => void_fn!(
            entry::set_debug_utils_object_name,
            vk::PFN_vkSetDebugUtilsObjectNameEXT
        ),
        b"vkCmdDebugMarkerBeginEXT" => void_fn!(
            entry::cmd_debug_marker_begin,
            vk::PFN_vkCmdDebugMarkerBeginEXT
        ),
        b"vkCmdDebugMarkerEndEXT" => {
            void_fn!(entry::cmd_debug_marker_end, vk::PFN_vkCmdDebugMarkerEndEXT)
        }
        b"vkCmdDebugMarkerInsertEXT" => void_fn!(
            entry::cmd_debug_marker_insert,
            vk::PFN_vkCmdDebugMarkerInsertEXT
        ),
        _ => None,
    }
}

impl LayerContext {
    /// Instance-scoped resolution. Names this layer intercepts always resolve
    /// to the local handler; everything else is whatever the next segment
    /// returns, including `None`.
    pub fn get_instance_proc_addr(
        &self,
        instance: vk::Instance,
        name: &CStr,
    ) -> vk::PFN_vkVoidFunction {
        if let Some(local) = intercepted_instance_proc(name) {
            tracing::debug!("vkGetInstanceProcAddr intercepted: {}", name.to_string_lossy());
            return Some(local);
        }

        match self.registry().instance() {
            Ok(dispatch) => unsafe { dispatch.resolve(instance, name) },
            Err(e) => {
                tracing::debug!("Cannot forward {}: {}", name.to_string_lossy(), e);
                None
            }
        }
    }

    /// Device-scoped resolution through the table registered for `device`.
    pub fn get_device_proc_addr(&self, device: vk::Device, name: &CStr) -> vk::PFN_vkVoidFunction {
        if let Some(local) = intercepted_device_proc(name) {
            tracing::debug!("vkGetDeviceProcAddr intercepted: {}", name.to_string_lossy());
            return Some(local);
        }

        match self.registry().device(device) {
            Ok(dispatch) => unsafe { dispatch.resolve(device, name) },
            Err(e) => {
                tracing::error!("Cannot forward {}: {}", name.to_string_lossy(), e);
                None
            }
        }
    }
}
