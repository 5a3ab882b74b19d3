// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Joining the dispatch chain at `vkCreateInstance` / `vkCreateDevice`.

use ash::vk;

use crate::context::LayerContext;
use crate::dispatch::{DeviceDispatch, InstanceDispatch, cast_proc};
use crate::error::{LayerError, Result};
use crate::link::{DeviceLinkInfo, InstanceLinkInfo};

impl LayerContext {
    /// Create an instance through the next chain segment and record its
    /// forwarding table.
    ///
    /// Driver failures come back as [`LayerError::Driver`] with nothing
    /// registered. If the driver succeeds but a required entry point cannot
    /// be resolved, the new instance is destroyed again and `*p_instance` is
    /// reset to null.
    ///
    /// # Safety
    /// Raw `vkCreateInstance` contract; `create_info` must carry the loader's
    /// link node for this layer.
    pub unsafe fn create_instance(
        &self,
        create_info: *const vk::InstanceCreateInfo<'_>,
        allocator: *const vk::AllocationCallbacks<'_>,
        p_instance: *mut vk::Instance,
    ) -> Result<()> {
        let mut link =
            unsafe { InstanceLinkInfo::find(create_info) }.ok_or(LayerError::MissingLinkInfo)?;
        let gipa = link
            .next_get_instance_proc_addr()
            .ok_or(LayerError::MissingEntryPoint("vkGetInstanceProcAddr"))?;

        let create: vk::PFN_vkCreateInstance =
            unsafe { cast_proc(gipa(vk::Instance::null(), c"vkCreateInstance".as_ptr())) }
                .ok_or(LayerError::MissingEntryPoint("vkCreateInstance"))?;

        // The next segment reads its own entry from the head of the list.
        link.advance();

        unsafe { create(create_info, allocator, p_instance) }
            .result()
            .map_err(LayerError::Driver)?;
        let instance = unsafe { *p_instance };

        let dispatch = match unsafe { InstanceDispatch::load(instance, gipa) } {
            Ok(dispatch) => dispatch,
            Err(e) => {
                tracing::error!("Abandoning instance {:?}: {}", instance, e);
                unsafe { abandon_instance(gipa, allocator, p_instance) };
                return Err(e);
            }
        };

        self.registry().set_instance(dispatch);
        self.tracer().declare_streams();

        tracing::info!("Instance {:?} joined the dispatch chain", instance);
        Ok(())
    }

    /// Create a device through the next chain segment and record its
    /// forwarding table.
    ///
    /// A handle that is already registered is rejected with
    /// [`LayerError::DuplicateDevice`]; the existing table is left as it was,
    /// the new device is destroyed and `*p_device` is reset to null.
    ///
    /// # Safety
    /// Raw `vkCreateDevice` contract; `create_info` must carry the loader's
    /// link node for this layer.
    pub unsafe fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: *const vk::DeviceCreateInfo<'_>,
        allocator: *const vk::AllocationCallbacks<'_>,
        p_device: *mut vk::Device,
    ) -> Result<()> {
        let mut link =
            unsafe { DeviceLinkInfo::find(create_info) }.ok_or(LayerError::MissingLinkInfo)?;
        let gipa = link
            .next_get_instance_proc_addr()
            .ok_or(LayerError::MissingEntryPoint("vkGetInstanceProcAddr"))?;
        let gdpa = link
            .next_get_device_proc_addr()
            .ok_or(LayerError::MissingEntryPoint("vkGetDeviceProcAddr"))?;

        let instance = self
            .registry()
            .instance()
            .map(|dispatch| dispatch.instance)
            .unwrap_or_else(|_| vk::Instance::null());
        let create: vk::PFN_vkCreateDevice =
            unsafe { cast_proc(gipa(instance, c"vkCreateDevice".as_ptr())) }
                .ok_or(LayerError::MissingEntryPoint("vkCreateDevice"))?;

        link.advance();

        unsafe { create(physical_device, create_info, allocator, p_device) }
            .result()
            .map_err(LayerError::Driver)?;
        let device = unsafe { *p_device };

        let dispatch = match unsafe { DeviceDispatch::load(device, physical_device, gdpa) } {
            Ok(dispatch) => dispatch,
            Err(e) => {
                tracing::error!("Abandoning device {:?}: {}", device, e);
                unsafe { abandon_device(gdpa, allocator, p_device) };
                return Err(e);
            }
        };

        if let Err(e) = self.registry().insert_device(device, dispatch) {
            tracing::error!("Refusing to track device twice: {}", e);
            unsafe { abandon_device(gdpa, allocator, p_device) };
            return Err(e);
        }

        tracing::info!(
            "Device {:?} on {:?} joined the dispatch chain",
            device,
            physical_device
        );
        Ok(())
    }
}

/// Destroy an instance the next segment created but this layer cannot track.
unsafe fn abandon_instance(
    gipa: vk::PFN_vkGetInstanceProcAddr,
    allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) {
    let instance = unsafe { *p_instance };
    let destroy: Option<vk::PFN_vkDestroyInstance> =
        unsafe { cast_proc(gipa(instance, c"vkDestroyInstance".as_ptr())) };
    match destroy {
        Some(destroy) => unsafe { destroy(instance, allocator) },
        None => tracing::warn!("Cannot destroy instance {:?}: no vkDestroyInstance", instance),
    }
    unsafe { *p_instance = vk::Instance::null() };
}

/// Device counterpart of [`abandon_instance`].
unsafe fn abandon_device(
    gdpa: vk::PFN_vkGetDeviceProcAddr,
    allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) {
    let device = unsafe { *p_device };
    let destroy: Option<vk::PFN_vkDestroyDevice> =
        unsafe { cast_proc(gdpa(device, c"vkDestroyDevice".as_ptr())) };
    match destroy {
        Some(destroy) => unsafe { destroy(device, allocator) },
        None => tracing::warn!("Cannot destroy device {:?}: no vkDestroyDevice", device),
    }
    unsafe { *p_device = vk::Device::null() };
}
