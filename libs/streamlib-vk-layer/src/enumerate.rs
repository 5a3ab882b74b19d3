// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Layer and extension properties reported to the loader.

use std::ffi::{CStr, c_char};
use std::ptr;

use ash::vk;

use crate::context::LayerContext;
use crate::error::Result;

pub const LAYER_NAME: &CStr = c"VkRenderStages";
pub const LAYER_DESCRIPTION: &CStr = c"Vulkan render stage tracing";
pub const LAYER_SPEC_VERSION: u32 = vk::make_api_version(0, 1, 0, 5);
pub const LAYER_IMPLEMENTATION_VERSION: u32 = 1;

pub const DEBUG_MARKER_EXTENSION_NAME: &CStr = c"VK_EXT_debug_marker";
pub const DEBUG_MARKER_SPEC_VERSION: u32 = 4;

/// Copy `src` into a fixed-size Vulkan string array, truncating if needed.
fn copy_name(dst: &mut [c_char], src: &CStr) {
    let bytes = src.to_bytes();
    let len = bytes.len().min(dst.len().saturating_sub(1));
    for (d, s) in dst.iter_mut().zip(&bytes[..len]) {
        *d = *s as c_char;
    }
    if let Some(terminator) = dst.get_mut(len) {
        *terminator = 0;
    }
}

pub fn layer_properties() -> vk::LayerProperties {
    let mut properties = vk::LayerProperties {
        spec_version: LAYER_SPEC_VERSION,
        implementation_version: LAYER_IMPLEMENTATION_VERSION,
        ..Default::default()
    };
    copy_name(&mut properties.layer_name, LAYER_NAME);
    copy_name(&mut properties.description, LAYER_DESCRIPTION);
    properties
}

pub fn extension_properties(name: &CStr, spec_version: u32) -> vk::ExtensionProperties {
    let mut properties = vk::ExtensionProperties {
        spec_version,
        ..Default::default()
    };
    copy_name(&mut properties.extension_name, name);
    properties
}

pub fn debug_marker_extension() -> vk::ExtensionProperties {
    extension_properties(DEBUG_MARKER_EXTENSION_NAME, DEBUG_MARKER_SPEC_VERSION)
}

/// Vulkan's two-call enumeration: a null `p_items` asks for the count,
/// otherwise up to `*p_count` items are written and `*p_count` is set to the
/// number written. Returns `VK_INCOMPLETE` when the buffer was too small.
///
/// # Safety
/// `p_count` must be valid for reads and writes; `p_items`, when not null,
/// must be valid for `*p_count` writes.
pub unsafe fn fill_counted<T: Copy>(items: &[T], p_count: *mut u32, p_items: *mut T) -> vk::Result {
    let Some(count) = (unsafe { p_count.as_mut() }) else {
        tracing::warn!("Enumeration called without a count pointer");
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };

    if p_items.is_null() {
        *count = items.len() as u32;
        return vk::Result::SUCCESS;
    }

    let written = items.len().min(*count as usize);
    unsafe { ptr::copy_nonoverlapping(items.as_ptr(), p_items, written) };
    *count = written as u32;

    if written < items.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

impl LayerContext {
    /// `vkEnumerateDeviceExtensionProperties` with `VK_EXT_debug_marker`
    /// added at index 0 of the next segment's list.
    ///
    /// Asking for this layer by name reports only `VK_EXT_debug_marker`;
    /// asking for any other layer is forwarded untouched.
    ///
    /// # Safety
    /// Raw `vkEnumerateDeviceExtensionProperties` contract.
    pub unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        layer_name: *const c_char,
        p_count: *mut u32,
        p_properties: *mut vk::ExtensionProperties,
    ) -> Result<vk::Result> {
        if !layer_name.is_null() {
            if unsafe { CStr::from_ptr(layer_name) } == LAYER_NAME {
                let own = [debug_marker_extension()];
                return Ok(unsafe { fill_counted(&own, p_count, p_properties) });
            }
            let dispatch = self.registry().instance()?;
            return Ok(unsafe {
                dispatch.enumerate_device_extension_properties(
                    physical_device,
                    layer_name,
                    p_count,
                    p_properties,
                )
            });
        }

        let dispatch = self.registry().instance()?;
        let mut next_count = 0u32;
        let result = unsafe {
            dispatch.enumerate_device_extension_properties(
                physical_device,
                ptr::null(),
                &mut next_count,
                ptr::null_mut(),
            )
        };
        if result != vk::Result::SUCCESS {
            return Ok(result);
        }

        let mut extensions = vec![vk::ExtensionProperties::default(); next_count as usize + 1];
        extensions[0] = debug_marker_extension();
        if next_count > 0 {
            let result = unsafe {
                dispatch.enumerate_device_extension_properties(
                    physical_device,
                    ptr::null(),
                    &mut next_count,
                    extensions[1..].as_mut_ptr(),
                )
            };
            if result.as_raw() < 0 {
                return Ok(result);
            }
            extensions.truncate(next_count as usize + 1);
        }

        Ok(unsafe { fill_counted(&extensions, p_count, p_properties) })
    }
}
