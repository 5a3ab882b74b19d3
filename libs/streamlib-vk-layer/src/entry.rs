// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! C ABI surface. Every function here resolves the process-wide
//! [`LayerContext`] and converts [`LayerError`](crate::LayerError) into a
//! `VkResult` at the boundary.

#![allow(non_snake_case)]

use std::ffi::{CStr, c_char};

use ash::vk;

use crate::context::LayerContext;
use crate::enumerate;
use crate::error::Result;

fn report<T>(call: &str, result: Result<T>, ok: impl FnOnce(T) -> vk::Result) -> vk::Result {
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            tracing::error!("{} failed: {}", call, e);
            e.to_vk_result()
        }
    }
}

/// # Safety
/// Raw `vkGetInstanceProcAddr` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn VkRenderStagesGetInstanceProcAddr(
    instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    if name.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(name) };
    LayerContext::global().get_instance_proc_addr(instance, name)
}

/// # Safety
/// Raw `vkGetDeviceProcAddr` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn VkRenderStagesGetDeviceProcAddr(
    device: vk::Device,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    if name.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(name) };
    LayerContext::global().get_device_proc_addr(device, name)
}

/// # Safety
/// Raw `vkGetInstanceProcAddr` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe { VkRenderStagesGetInstanceProcAddr(instance, name) }
}

/// # Safety
/// Raw `vkGetDeviceProcAddr` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkGetDeviceProcAddr(
    device: vk::Device,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe { VkRenderStagesGetDeviceProcAddr(device, name) }
}

/// # Safety
/// Raw `vkEnumerateInstanceLayerProperties` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkEnumerateInstanceLayerProperties(
    p_property_count: *mut u32,
    p_properties: *mut vk::LayerProperties,
) -> vk::Result {
    tracing::debug!("vkEnumerateInstanceLayerProperties");
    unsafe {
        enumerate::fill_counted(
            &[enumerate::layer_properties()],
            p_property_count,
            p_properties,
        )
    }
}

/// # Safety
/// Raw `vkEnumerateInstanceExtensionProperties` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkEnumerateInstanceExtensionProperties(
    _layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    tracing::debug!("vkEnumerateInstanceExtensionProperties");
    unsafe { enumerate::fill_counted(&[], p_property_count, p_properties) }
}

/// # Safety
/// Raw `vkEnumerateDeviceLayerProperties` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkEnumerateDeviceLayerProperties(
    _physical_device: vk::PhysicalDevice,
    p_property_count: *mut u32,
    p_properties: *mut vk::LayerProperties,
) -> vk::Result {
    tracing::debug!("vkEnumerateDeviceLayerProperties");
    unsafe {
        enumerate::fill_counted(
            &[enumerate::layer_properties()],
            p_property_count,
            p_properties,
        )
    }
}

/// # Safety
/// Raw `vkEnumerateDeviceExtensionProperties` contract.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkEnumerateDeviceExtensionProperties(
    physical_device: vk::PhysicalDevice,
    layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    tracing::debug!("vkEnumerateDeviceExtensionProperties");
    let result = unsafe {
        LayerContext::global().enumerate_device_extension_properties(
            physical_device,
            layer_name,
            p_property_count,
            p_properties,
        )
    };
    report("vkEnumerateDeviceExtensionProperties", result, |r| r)
}

pub(crate) unsafe extern "system" fn create_instance(
    create_info: *const vk::InstanceCreateInfo<'_>,
    allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    let result =
        unsafe { LayerContext::global().create_instance(create_info, allocator, p_instance) };
    report("vkCreateInstance", result, |()| vk::Result::SUCCESS)
}

pub(crate) unsafe extern "system" fn create_device(
    physical_device: vk::PhysicalDevice,
    create_info: *const vk::DeviceCreateInfo<'_>,
    allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    let result = unsafe {
        LayerContext::global().create_device(physical_device, create_info, allocator, p_device)
    };
    report("vkCreateDevice", result, |()| vk::Result::SUCCESS)
}

pub(crate) unsafe extern "system" fn debug_marker_set_object_name(
    device: vk::Device,
    name_info: *const vk::DebugMarkerObjectNameInfoEXT<'_>,
) -> vk::Result {
    let result = unsafe { LayerContext::global().debug_marker_set_object_name(device, name_info) };
    report("vkDebugMarkerSetObjectNameEXT", result, |()| vk::Result::SUCCESS)
}

pub(crate) unsafe extern "system" fn debug_marker_set_object_tag(
    device: vk::Device,
    tag_info: *const vk::DebugMarkerObjectTagInfoEXT<'_>,
) -> vk::Result {
    let result = unsafe { LayerContext::global().debug_marker_set_object_tag(device, tag_info) };
    report("vkDebugMarkerSetObjectTagEXT", result, |r| r)
}

pub(crate) unsafe extern "system" fn set_debug_utils_object_name(
    device: vk::Device,
    name_info: *const vk::DebugUtilsObjectNameInfoEXT<'_>,
) -> vk::Result {
    let result = unsafe { LayerContext::global().set_debug_utils_object_name(device, name_info) };
    report("vkSetDebugUtilsObjectNameEXT", result, |r| r)
}

pub(crate) unsafe extern "system" fn cmd_debug_marker_begin(
    command_buffer: vk::CommandBuffer,
    _marker_info: *const vk::DebugMarkerMarkerInfoEXT<'_>,
) {
    tracing::trace!("vkCmdDebugMarkerBeginEXT on {:?}", command_buffer);
}

pub(crate) unsafe extern "system" fn cmd_debug_marker_end(command_buffer: vk::CommandBuffer) {
    tracing::trace!("vkCmdDebugMarkerEndEXT on {:?}", command_buffer);
}

pub(crate) unsafe extern "system" fn cmd_debug_marker_insert(
    command_buffer: vk::CommandBuffer,
    _marker_info: *const vk::DebugMarkerMarkerInfoEXT<'_>,
) {
    tracing::trace!("vkCmdDebugMarkerInsertEXT on {:?}", command_buffer);
}
