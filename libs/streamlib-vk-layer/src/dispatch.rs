// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Forwarding tables: the next chain segment's entry points, resolved once
//! at create time and called through typed methods afterwards.

use std::ffi::{CStr, c_char};
use std::mem;

use ash::vk;

use crate::error::{LayerError, Result};

/// Reinterpret a `PFN_vkVoidFunction` as the concrete `PFN_vk*` type `F`.
///
/// # Safety
/// `F` must be the function pointer type matching the name `proc` was
/// resolved for.
pub(crate) unsafe fn cast_proc<F: Copy>(proc: vk::PFN_vkVoidFunction) -> Option<F> {
    debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<unsafe extern "system" fn()>());
    proc.map(|f| unsafe { mem::transmute_copy::<unsafe extern "system" fn(), F>(&f) })
}

/// Erase a function to `PFN_vkVoidFunction`, as returned by the resolvers.
/// `$pfn` is the concrete `PFN_vk*` type the function coerces to.
macro_rules! void_fn {
    ($f:expr, $pfn:ty) => {
        Some(unsafe { ::std::mem::transmute::<$pfn, unsafe extern "system" fn()>($f) })
    };
}
pub(crate) use void_fn;

fn required<F>(proc: Option<F>, name: &'static str) -> Result<F> {
    proc.ok_or(LayerError::MissingEntryPoint(name))
}

/// Next-segment entry points for the active instance.
#[derive(Clone, Copy)]
pub struct InstanceDispatch {
    pub instance: vk::Instance,
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub enumerate_device_extension_properties: vk::PFN_vkEnumerateDeviceExtensionProperties,
    pub set_debug_utils_object_name_ext: Option<vk::PFN_vkSetDebugUtilsObjectNameEXT>,
    pub debug_marker_set_object_name_ext: Option<vk::PFN_vkDebugMarkerSetObjectNameEXT>,
    pub debug_marker_set_object_tag_ext: Option<vk::PFN_vkDebugMarkerSetObjectTagEXT>,
    pub cmd_debug_marker_begin_ext: Option<vk::PFN_vkCmdDebugMarkerBeginEXT>,
    pub cmd_debug_marker_end_ext: Option<vk::PFN_vkCmdDebugMarkerEndEXT>,
    pub cmd_debug_marker_insert_ext: Option<vk::PFN_vkCmdDebugMarkerInsertEXT>,
}

impl InstanceDispatch {
    /// Resolve every forwarded entry point for `instance` through `gipa`.
    ///
    /// `vkGetInstanceProcAddr` and `vkEnumerateDeviceExtensionProperties`
    /// are required; the debug extension entry points are recorded as absent
    /// when the next segment does not expose them.
    ///
    /// # Safety
    /// `gipa` must be the next segment's `vkGetInstanceProcAddr` and
    /// `instance` a handle it created.
    pub unsafe fn load(
        instance: vk::Instance,
        gipa: vk::PFN_vkGetInstanceProcAddr,
    ) -> Result<Self> {
        let resolve = |name: &CStr| unsafe { gipa(instance, name.as_ptr()) };

        unsafe {
            Ok(Self {
                instance,
                get_instance_proc_addr: required(
                    cast_proc(resolve(c"vkGetInstanceProcAddr")),
                    "vkGetInstanceProcAddr",
                )?,
                enumerate_device_extension_properties: required(
                    cast_proc(resolve(c"vkEnumerateDeviceExtensionProperties")),
                    "vkEnumerateDeviceExtensionProperties",
                )?,
                set_debug_utils_object_name_ext: cast_proc(resolve(
                    c"vkSetDebugUtilsObjectNameEXT",
                )),
                debug_marker_set_object_name_ext: cast_proc(resolve(
                    c"vkDebugMarkerSetObjectNameEXT",
                )),
                debug_marker_set_object_tag_ext: cast_proc(resolve(
                    c"vkDebugMarkerSetObjectTagEXT",
                )),
                cmd_debug_marker_begin_ext: cast_proc(resolve(c"vkCmdDebugMarkerBeginEXT")),
                cmd_debug_marker_end_ext: cast_proc(resolve(c"vkCmdDebugMarkerEndEXT")),
                cmd_debug_marker_insert_ext: cast_proc(resolve(c"vkCmdDebugMarkerInsertEXT")),
            })
        }
    }

    /// Forward an entry-point lookup to the next segment.
    ///
    /// # Safety
    /// `name` must be a call name the Vulkan loader interface accepts.
    pub unsafe fn resolve(&self, instance: vk::Instance, name: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe { (self.get_instance_proc_addr)(instance, name.as_ptr()) }
    }

    /// # Safety
    /// Raw `vkEnumerateDeviceExtensionProperties` contract.
    pub unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        layer_name: *const c_char,
        property_count: *mut u32,
        properties: *mut vk::ExtensionProperties,
    ) -> vk::Result {
        unsafe {
            (self.enumerate_device_extension_properties)(
                physical_device,
                layer_name,
                property_count,
                properties,
            )
        }
    }
}

/// Next-segment entry points for one device.
#[derive(Clone, Copy)]
pub struct DeviceDispatch {
    pub physical_device: vk::PhysicalDevice,
    pub get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
    pub debug_marker_set_object_name_ext: Option<vk::PFN_vkDebugMarkerSetObjectNameEXT>,
    pub debug_marker_set_object_tag_ext: Option<vk::PFN_vkDebugMarkerSetObjectTagEXT>,
    pub set_debug_utils_object_name_ext: Option<vk::PFN_vkSetDebugUtilsObjectNameEXT>,
}

impl DeviceDispatch {
    /// Resolve the forwarded device entry points through `gdpa`.
    ///
    /// # Safety
    /// `gdpa` must be the next segment's `vkGetDeviceProcAddr` and `device` a
    /// handle it created.
    pub unsafe fn load(
        device: vk::Device,
        physical_device: vk::PhysicalDevice,
        gdpa: vk::PFN_vkGetDeviceProcAddr,
    ) -> Result<Self> {
        let resolve = |name: &CStr| unsafe { gdpa(device, name.as_ptr()) };

        unsafe {
            Ok(Self {
                physical_device,
                get_device_proc_addr: required(
                    cast_proc(resolve(c"vkGetDeviceProcAddr")),
                    "vkGetDeviceProcAddr",
                )?,
                debug_marker_set_object_name_ext: cast_proc(resolve(
                    c"vkDebugMarkerSetObjectNameEXT",
                )),
                debug_marker_set_object_tag_ext: cast_proc(resolve(
                    c"vkDebugMarkerSetObjectTagEXT",
                )),
                set_debug_utils_object_name_ext: cast_proc(resolve(
                    c"vkSetDebugUtilsObjectNameEXT",
                )),
            })
        }
    }

    /// # Safety
    /// `name` must be a call name the Vulkan loader interface accepts.
    pub unsafe fn resolve(&self, device: vk::Device, name: &CStr) -> vk::PFN_vkVoidFunction {
        unsafe { (self.get_device_proc_addr)(device, name.as_ptr()) }
    }

    /// # Safety
    /// Raw `vkDebugMarkerSetObjectTagEXT` contract.
    pub unsafe fn debug_marker_set_object_tag(
        &self,
        device: vk::Device,
        tag_info: *const vk::DebugMarkerObjectTagInfoEXT<'_>,
    ) -> Result<vk::Result> {
        let forward = self
            .debug_marker_set_object_tag_ext
            .ok_or(LayerError::ExtensionNotPresent("vkDebugMarkerSetObjectTagEXT"))?;
        Ok(unsafe { forward(device, tag_info) })
    }

    /// # Safety
    /// Raw `vkSetDebugUtilsObjectNameEXT` contract.
    pub unsafe fn set_debug_utils_object_name(
        &self,
        device: vk::Device,
        name_info: *const vk::DebugUtilsObjectNameInfoEXT<'_>,
    ) -> Result<vk::Result> {
        let forward = self
            .set_debug_utils_object_name_ext
            .ok_or(LayerError::ExtensionNotPresent("vkSetDebugUtilsObjectNameEXT"))?;
        Ok(unsafe { forward(device, name_info) })
    }
}
