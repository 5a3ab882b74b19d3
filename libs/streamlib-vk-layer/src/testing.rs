// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Fake next chain segment for unit tests.
//!
//! Behavior is switched per test thread through [`FakeDriver`]; the
//! `extern "system"` functions below read and update it.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char};
use std::ptr;

use ash::vk;
use ash::vk::Handle;

use crate::dispatch::void_fn;
use crate::enumerate::extension_properties;
use crate::link::{
    DeviceLinkInfo, InstanceLinkInfo, LayerDeviceCreateInfo, LayerDeviceCreateInfoPayload,
    LayerDeviceLink, LayerFunction, LayerInstanceCreateInfo, LayerInstanceCreateInfoPayload,
    LayerInstanceLink,
};

pub const FAKE_INSTANCE: u64 = 0x1000;
pub const FAKE_DEVICE: u64 = 0xd000;
pub const FAKE_PHYSICAL_DEVICE: u64 = 0xb000;

/// Switches and call records of the fake segment.
pub struct FakeDriver {
    /// Names the resolvers report as unknown.
    pub hidden: Vec<&'static CStr>,
    pub create_result: vk::Result,
    pub next_instance: u64,
    pub next_device: u64,
    pub extensions: Vec<&'static CStr>,

    pub created_instances: Vec<vk::Instance>,
    pub created_devices: Vec<vk::Device>,
    pub destroyed_instances: Vec<vk::Instance>,
    pub destroyed_devices: Vec<vk::Device>,
    /// Resolver the create call found at the head of the link list.
    pub seen_link_head: Option<usize>,
    pub last_layer_name: Option<CString>,
    pub tag_calls: u32,
    pub object_name_calls: u32,
    pub debug_utils_name_calls: u32,
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self {
            hidden: Vec::new(),
            create_result: vk::Result::SUCCESS,
            next_instance: FAKE_INSTANCE,
            next_device: FAKE_DEVICE,
            extensions: vec![c"VK_KHR_swapchain", c"VK_KHR_maintenance1"],
            created_instances: Vec::new(),
            created_devices: Vec::new(),
            destroyed_instances: Vec::new(),
            destroyed_devices: Vec::new(),
            seen_link_head: None,
            last_layer_name: None,
            tag_calls: 0,
            object_name_calls: 0,
            debug_utils_name_calls: 0,
        }
    }
}

thread_local! {
    static DRIVER: RefCell<FakeDriver> = RefCell::new(FakeDriver::default());
}

pub fn reset(driver: FakeDriver) {
    DRIVER.with(|cell| *cell.borrow_mut() = driver);
}

pub fn with<R>(f: impl FnOnce(&mut FakeDriver) -> R) -> R {
    DRIVER.with(|cell| f(&mut cell.borrow_mut()))
}

fn is_hidden(name: &CStr) -> bool {
    with(|driver| driver.hidden.iter().any(|hidden| *hidden == name))
}

/// Stand-in for any entry point the layer does not intercept.
pub unsafe extern "system" fn next_unknown_call() {}

pub unsafe extern "system" fn next_get_instance_proc_addr(
    _instance: vk::Instance,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { CStr::from_ptr(name) };
    if is_hidden(name) {
        return None;
    }
    match name.to_bytes() {
        b"vkGetInstanceProcAddr" => {
            void_fn!(next_get_instance_proc_addr, vk::PFN_vkGetInstanceProcAddr)
        }
        b"vkGetDeviceProcAddr" => void_fn!(next_get_device_proc_addr, vk::PFN_vkGetDeviceProcAddr),
        b"vkCreateInstance" => void_fn!(create_instance, vk::PFN_vkCreateInstance),
        b"vkDestroyInstance" => void_fn!(destroy_instance, vk::PFN_vkDestroyInstance),
        b"vkCreateDevice" => void_fn!(create_device, vk::PFN_vkCreateDevice),
        b"vkEnumerateDeviceExtensionProperties" => void_fn!(
            enumerate_device_extension_properties,
            vk::PFN_vkEnumerateDeviceExtensionProperties
        ),
        b"vkDestroyDevice"
        | b"vkDebugMarkerSetObjectNameEXT"
        | b"vkDebugMarkerSetObjectTagEXT"
        | b"vkSetDebugUtilsObjectNameEXT" => device_proc(name),
        b"vkQueueSubmit" | b"vkCreateSwapchainKHR" => Some(next_unknown_call),
        _ => None,
    }
}

pub unsafe extern "system" fn next_get_device_proc_addr(
    _device: vk::Device,
    name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { CStr::from_ptr(name) };
    if is_hidden(name) {
        return None;
    }
    device_proc(name)
}

fn device_proc(name: &CStr) -> vk::PFN_vkVoidFunction {
    match name.to_bytes() {
        b"vkGetDeviceProcAddr" => void_fn!(next_get_device_proc_addr, vk::PFN_vkGetDeviceProcAddr),
        b"vkDestroyDevice" => void_fn!(destroy_device, vk::PFN_vkDestroyDevice),
        b"vkDebugMarkerSetObjectNameEXT" => void_fn!(
            debug_marker_set_object_name,
            vk::PFN_vkDebugMarkerSetObjectNameEXT
        ),
        b"vkDebugMarkerSetObjectTagEXT" => void_fn!(
            debug_marker_set_object_tag,
            vk::PFN_vkDebugMarkerSetObjectTagEXT
        ),
        b"vkSetDebugUtilsObjectNameEXT" => void_fn!(
            set_debug_utils_object_name,
            vk::PFN_vkSetDebugUtilsObjectNameEXT
        ),
        b"vkQueueSubmit" => Some(next_unknown_call),
        _ => None,
    }
}

/// Resolver sitting below the fake segment in test chains. Never called by
/// a correct layer.
pub unsafe extern "system" fn terminal_get_instance_proc_addr(
    _instance: vk::Instance,
    _name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    None
}

unsafe extern "system" fn create_instance(
    create_info: *const vk::InstanceCreateInfo<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    let head = unsafe { InstanceLinkInfo::find(create_info) }
        .and_then(|link| link.next_get_instance_proc_addr())
        .map(|f| f as usize);

    with(|driver| {
        driver.seen_link_head = head;
        if driver.create_result != vk::Result::SUCCESS {
            return driver.create_result;
        }
        let instance = vk::Instance::from_raw(driver.next_instance);
        driver.created_instances.push(instance);
        unsafe { *p_instance = instance };
        vk::Result::SUCCESS
    })
}

unsafe extern "system" fn destroy_instance(
    instance: vk::Instance,
    _allocator: *const vk::AllocationCallbacks<'_>,
) {
    with(|driver| driver.destroyed_instances.push(instance));
}

unsafe extern "system" fn create_device(
    _physical_device: vk::PhysicalDevice,
    create_info: *const vk::DeviceCreateInfo<'_>,
    _allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    let head = unsafe { DeviceLinkInfo::find(create_info) }
        .and_then(|link| link.next_get_instance_proc_addr())
        .map(|f| f as usize);

    with(|driver| {
        driver.seen_link_head = head;
        if driver.create_result != vk::Result::SUCCESS {
            return driver.create_result;
        }
        let device = vk::Device::from_raw(driver.next_device);
        driver.created_devices.push(device);
        unsafe { *p_device = device };
        vk::Result::SUCCESS
    })
}

unsafe extern "system" fn destroy_device(
    device: vk::Device,
    _allocator: *const vk::AllocationCallbacks<'_>,
) {
    with(|driver| driver.destroyed_devices.push(device));
}

unsafe extern "system" fn enumerate_device_extension_properties(
    _physical_device: vk::PhysicalDevice,
    layer_name: *const c_char,
    p_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    let layer_name = (!layer_name.is_null()).then(|| unsafe { CStr::from_ptr(layer_name) });
    let extensions: Vec<vk::ExtensionProperties> = with(|driver| {
        driver.last_layer_name = layer_name.map(CStr::to_owned);
        if layer_name.is_some() {
            Vec::new()
        } else {
            driver
                .extensions
                .iter()
                .map(|name| extension_properties(name, 1))
                .collect()
        }
    });
    unsafe { crate::enumerate::fill_counted(&extensions, p_count, p_properties) }
}

unsafe extern "system" fn debug_marker_set_object_name(
    _device: vk::Device,
    _name_info: *const vk::DebugMarkerObjectNameInfoEXT<'_>,
) -> vk::Result {
    with(|driver| driver.object_name_calls += 1);
    vk::Result::SUCCESS
}

unsafe extern "system" fn debug_marker_set_object_tag(
    _device: vk::Device,
    _tag_info: *const vk::DebugMarkerObjectTagInfoEXT<'_>,
) -> vk::Result {
    with(|driver| driver.tag_calls += 1);
    vk::Result::SUCCESS
}

unsafe extern "system" fn set_debug_utils_object_name(
    _device: vk::Device,
    _name_info: *const vk::DebugUtilsObjectNameInfoEXT<'_>,
) -> vk::Result {
    with(|driver| driver.debug_utils_name_calls += 1);
    vk::Result::SUCCESS
}

/// A `VkInstanceCreateInfo` whose link list holds this layer's entry (pointing
/// at the fake segment) followed by the fake segment's own entry.
pub struct InstanceChain {
    _ours: Box<LayerInstanceLink>,
    _below: Box<LayerInstanceLink>,
    node: Box<LayerInstanceCreateInfo>,
    create_info: Box<vk::InstanceCreateInfo<'static>>,
}

impl InstanceChain {
    pub fn new() -> Self {
        let mut below = Box::new(LayerInstanceLink {
            p_next: ptr::null_mut(),
            pfn_next_get_instance_proc_addr: Some(terminal_get_instance_proc_addr),
            pfn_next_get_physical_device_proc_addr: None,
        });
        let mut ours = Box::new(LayerInstanceLink {
            p_next: &raw mut *below,
            pfn_next_get_instance_proc_addr: Some(next_get_instance_proc_addr),
            pfn_next_get_physical_device_proc_addr: None,
        });
        let mut node = Box::new(LayerInstanceCreateInfo {
            s_type: vk::StructureType::LOADER_INSTANCE_CREATE_INFO,
            p_next: ptr::null(),
            function: LayerFunction::LINK_INFO,
            u: LayerInstanceCreateInfoPayload {
                layer_info: &raw mut *ours,
            },
        });
        let mut create_info = Box::new(vk::InstanceCreateInfo::default());
        create_info.p_next = (&raw mut *node).cast_const().cast();

        Self {
            _ours: ours,
            _below: below,
            node,
            create_info,
        }
    }

    /// A create info with no loader link node at all.
    pub fn without_link() -> Self {
        let chain = Self::new();
        let mut create_info = chain.create_info;
        create_info.p_next = ptr::null();
        Self {
            create_info,
            ..chain
        }
    }

    pub fn create_info(&self) -> *const vk::InstanceCreateInfo<'static> {
        &raw const *self.create_info
    }

    /// Resolver currently at the head of the link list.
    pub fn link_head(&self) -> Option<usize> {
        let head = unsafe { self.node.u.layer_info };
        unsafe { head.as_ref() }
            .and_then(|link| link.pfn_next_get_instance_proc_addr)
            .map(|f| f as usize)
    }
}

/// Device counterpart of [`InstanceChain`].
pub struct DeviceChain {
    _ours: Box<LayerDeviceLink>,
    _below: Box<LayerDeviceLink>,
    node: Box<LayerDeviceCreateInfo>,
    create_info: Box<vk::DeviceCreateInfo<'static>>,
}

impl DeviceChain {
    pub fn new() -> Self {
        let mut below = Box::new(LayerDeviceLink {
            p_next: ptr::null_mut(),
            pfn_next_get_instance_proc_addr: Some(terminal_get_instance_proc_addr),
            pfn_next_get_device_proc_addr: None,
        });
        let mut ours = Box::new(LayerDeviceLink {
            p_next: &raw mut *below,
            pfn_next_get_instance_proc_addr: Some(next_get_instance_proc_addr),
            pfn_next_get_device_proc_addr: Some(next_get_device_proc_addr),
        });
        let mut node = Box::new(LayerDeviceCreateInfo {
            s_type: vk::StructureType::LOADER_DEVICE_CREATE_INFO,
            p_next: ptr::null(),
            function: LayerFunction::LINK_INFO,
            u: LayerDeviceCreateInfoPayload {
                layer_info: &raw mut *ours,
            },
        });
        let mut create_info = Box::new(vk::DeviceCreateInfo::default());
        create_info.p_next = (&raw mut *node).cast_const().cast();

        Self {
            _ours: ours,
            _below: below,
            node,
            create_info,
        }
    }

    pub fn without_link() -> Self {
        let chain = Self::new();
        let mut create_info = chain.create_info;
        create_info.p_next = ptr::null();
        Self {
            create_info,
            ..chain
        }
    }

    pub fn create_info(&self) -> *const vk::DeviceCreateInfo<'static> {
        &raw const *self.create_info
    }

    pub fn link_head(&self) -> Option<usize> {
        let head = unsafe { self.node.u.layer_info };
        unsafe { head.as_ref() }
            .and_then(|link| link.pfn_next_get_instance_proc_addr)
            .map(|f| f as usize)
    }
}

/// Address of a resolver, for comparing function pointers in assertions.
pub fn gipa_addr(f: vk::PFN_vkGetInstanceProcAddr) -> usize {
    f as usize
}

pub fn physical_device() -> vk::PhysicalDevice {
    vk::PhysicalDevice::from_raw(FAKE_PHYSICAL_DEVICE)
}
