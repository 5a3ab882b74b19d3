// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Loader link nodes from `vk_layer.h`.
//!
//! The loader threads a `VkLayerInstanceCreateInfo` / `VkLayerDeviceCreateInfo`
//! into the `pNext` chain of every create call it routes through a layer. The
//! node whose `function` is `VK_LAYER_LINK_INFO` points at a list of
//! `VkLayer*Link` entries, one per remaining chain segment. Each layer reads
//! the head entry (its own "next"), then pops it so the segment below sees a
//! list starting at *its* next.
//!
//! `ash` only generates `vk.xml`, so the loader-interface structs are mirrored
//! here with `#[repr(C)]`.

use std::ffi::{c_char, c_void};
use std::marker::PhantomData;
use std::ptr::NonNull;

use ash::vk;

/// `VkLayerFunction`: selects which member of the create-info union is live.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerFunction(i32);

impl LayerFunction {
    pub const LINK_INFO: Self = Self(0);
    pub const LOADER_DATA_CALLBACK: Self = Self(1);
    pub const LOADER_LAYER_CREATE_DEVICE_CALLBACK: Self = Self(2);
    pub const LOADER_FEATURES: Self = Self(3);
}

/// `PFN_GetPhysicalDeviceProcAddr` from the loader/ICD interface.
pub type PfnGetPhysicalDeviceProcAddr =
    unsafe extern "system" fn(vk::Instance, *const c_char) -> vk::PFN_vkVoidFunction;

/// `VkLayerInstanceLink`
#[repr(C)]
pub struct LayerInstanceLink {
    pub p_next: *mut LayerInstanceLink,
    pub pfn_next_get_instance_proc_addr: Option<vk::PFN_vkGetInstanceProcAddr>,
    pub pfn_next_get_physical_device_proc_addr: Option<PfnGetPhysicalDeviceProcAddr>,
}

/// `VkLayerDeviceLink`
#[repr(C)]
pub struct LayerDeviceLink {
    pub p_next: *mut LayerDeviceLink,
    pub pfn_next_get_instance_proc_addr: Option<vk::PFN_vkGetInstanceProcAddr>,
    pub pfn_next_get_device_proc_addr: Option<vk::PFN_vkGetDeviceProcAddr>,
}

/// Union member of `VkLayerInstanceCreateInfo`. Only `layer_info` is read by
/// this layer; `callbacks` pads to the size of the largest C member
/// (the `layerDevice` pair of function pointers).
#[repr(C)]
#[derive(Clone, Copy)]
pub union LayerInstanceCreateInfoPayload {
    pub layer_info: *mut LayerInstanceLink,
    pub callbacks: [usize; 2],
}

/// `VkLayerInstanceCreateInfo`
#[repr(C)]
pub struct LayerInstanceCreateInfo {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub function: LayerFunction,
    pub u: LayerInstanceCreateInfoPayload,
}

/// Union member of `VkLayerDeviceCreateInfo`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union LayerDeviceCreateInfoPayload {
    pub layer_info: *mut LayerDeviceLink,
    pub callback: usize,
}

/// `VkLayerDeviceCreateInfo`
#[repr(C)]
pub struct LayerDeviceCreateInfo {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub function: LayerFunction,
    pub u: LayerDeviceCreateInfoPayload,
}

/// Which create call a chain belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainScope {
    Instance,
    Device,
}

impl ChainScope {
    /// The `sType` the loader stamps on its link node for this scope.
    pub const fn loader_structure_type(self) -> vk::StructureType {
        match self {
            Self::Instance => vk::StructureType::LOADER_INSTANCE_CREATE_INFO,
            Self::Device => vk::StructureType::LOADER_DEVICE_CREATE_INFO,
        }
    }
}

/// Common prefix of every structure reachable through `pNext`.
#[repr(C)]
struct ChainNode {
    s_type: vk::StructureType,
    p_next: *const c_void,
}

/// Walk a `pNext` chain and return the loader link node for `scope`.
///
/// Nodes of other types, and loader nodes carrying callbacks instead of link
/// info, are skipped. Nothing is copied; the returned pointer aliases the
/// caller's chain.
///
/// # Safety
/// `chain` must be null or the head of a well-formed `pNext` chain.
pub unsafe fn find_link_node(scope: ChainScope, chain: *const c_void) -> Option<NonNull<c_void>> {
    let wanted = scope.loader_structure_type();
    let mut cursor = chain.cast::<ChainNode>();

    while let Some(node) = unsafe { cursor.as_ref() } {
        if node.s_type == wanted {
            // Both loader create-info structs share the sType/pNext/function prefix.
            let function = unsafe { (*cursor.cast::<LayerInstanceCreateInfo>()).function };
            if function == LayerFunction::LINK_INFO {
                return NonNull::new(cursor.cast_mut().cast());
            }
        }
        cursor = node.p_next.cast();
    }

    None
}

/// Link node of a `vkCreateInstance` call.
pub struct InstanceLinkInfo<'a> {
    node: NonNull<LayerInstanceCreateInfo>,
    _chain: PhantomData<&'a mut LayerInstanceCreateInfo>,
}

impl<'a> InstanceLinkInfo<'a> {
    /// # Safety
    /// `create_info` must point to a valid `VkInstanceCreateInfo` whose chain
    /// outlives `'a` and is writable (the loader allocates it that way).
    pub unsafe fn find(create_info: *const vk::InstanceCreateInfo<'_>) -> Option<Self> {
        let create_info = unsafe { create_info.as_ref() }?;
        let node = unsafe { find_link_node(ChainScope::Instance, create_info.p_next) }?;
        Some(Self {
            node: node.cast(),
            _chain: PhantomData,
        })
    }

    fn head(&self) -> *mut LayerInstanceLink {
        unsafe { self.node.as_ref().u.layer_info }
    }

    /// `vkGetInstanceProcAddr` of the next chain segment.
    pub fn next_get_instance_proc_addr(&self) -> Option<vk::PFN_vkGetInstanceProcAddr> {
        unsafe { self.head().as_ref() }?.pfn_next_get_instance_proc_addr
    }

    /// Pop this layer's entry so the next segment reads its own.
    pub fn advance(&mut self) {
        let head = self.head();
        if let Some(link) = unsafe { head.as_ref() } {
            unsafe { self.node.as_mut().u.layer_info = link.p_next };
        }
    }
}

/// Link node of a `vkCreateDevice` call.
pub struct DeviceLinkInfo<'a> {
    node: NonNull<LayerDeviceCreateInfo>,
    _chain: PhantomData<&'a mut LayerDeviceCreateInfo>,
}

impl<'a> DeviceLinkInfo<'a> {
    /// # Safety
    /// Same contract as [`InstanceLinkInfo::find`], for `VkDeviceCreateInfo`.
    pub unsafe fn find(create_info: *const vk::DeviceCreateInfo<'_>) -> Option<Self> {
        let create_info = unsafe { create_info.as_ref() }?;
        let node = unsafe { find_link_node(ChainScope::Device, create_info.p_next) }?;
        Some(Self {
            node: node.cast(),
            _chain: PhantomData,
        })
    }

    fn head(&self) -> *mut LayerDeviceLink {
        unsafe { self.node.as_ref().u.layer_info }
    }

    /// `vkGetInstanceProcAddr` of the next chain segment (needed to find
    /// `vkCreateDevice`).
    pub fn next_get_instance_proc_addr(&self) -> Option<vk::PFN_vkGetInstanceProcAddr> {
        unsafe { self.head().as_ref() }?.pfn_next_get_instance_proc_addr
    }

    /// `vkGetDeviceProcAddr` of the next chain segment.
    pub fn next_get_device_proc_addr(&self) -> Option<vk::PFN_vkGetDeviceProcAddr> {
        unsafe { self.head().as_ref() }?.pfn_next_get_device_proc_addr
    }

    /// Pop this layer's entry so the next segment reads its own.
    pub fn advance(&mut self) {
        let head = self.head();
        if let Some(link) = unsafe { head.as_ref() } {
            unsafe { self.node.as_mut().u.layer_info = link.p_next };
        }
    }
}
