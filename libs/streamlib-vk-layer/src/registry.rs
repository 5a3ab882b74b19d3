// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use ash::vk;
use parking_lot::RwLock;

use crate::dispatch::{DeviceDispatch, InstanceDispatch};
use crate::error::{LayerError, Result};

/// Forwarding tables for every object created through this layer.
///
/// One instance table (the layer tracks a single active `VkInstance`) and one
/// table per live `VkDevice`. Device entries are only ever added.
pub struct ChainRegistry {
    instance: RwLock<Option<InstanceDispatch>>,
    devices: RwLock<HashMap<vk::Device, DeviceDispatch>>,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self {
            instance: RwLock::new(None),
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// Install the active instance's table, returning the one it replaces.
    pub fn set_instance(&self, dispatch: InstanceDispatch) -> Option<InstanceDispatch> {
        let previous = self.instance.write().replace(dispatch);
        if let Some(previous) = &previous {
            tracing::warn!(
                "Replacing forwarding table of instance {:?} with {:?}",
                previous.instance,
                dispatch.instance
            );
        }
        previous
    }

    pub fn instance(&self) -> Result<InstanceDispatch> {
        (*self.instance.read()).ok_or(LayerError::UnknownInstance)
    }

    /// Track a newly created device. An already-tracked handle is rejected and
    /// its existing table stays as it was.
    pub fn insert_device(&self, device: vk::Device, dispatch: DeviceDispatch) -> Result<()> {
        match self.devices.write().entry(device) {
            Entry::Occupied(_) => Err(LayerError::DuplicateDevice(device)),
            Entry::Vacant(slot) => {
                slot.insert(dispatch);
                Ok(())
            }
        }
    }

    pub fn device(&self, device: vk::Device) -> Result<DeviceDispatch> {
        self.devices
            .read()
            .get(&device)
            .copied()
            .ok_or(LayerError::UnknownDevice(device))
    }

    pub fn contains_device(&self, device: vk::Device) -> bool {
        self.devices.read().contains_key(&device)
    }

    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use ash::vk::Handle;

    fn device_dispatch(physical_device: u64) -> DeviceDispatch {
        DeviceDispatch {
            physical_device: vk::PhysicalDevice::from_raw(physical_device),
            get_device_proc_addr: testing::next_get_device_proc_addr,
            debug_marker_set_object_name_ext: None,
            debug_marker_set_object_tag_ext: None,
            set_debug_utils_object_name_ext: None,
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ChainRegistry::new();
        assert!(matches!(registry.instance(), Err(LayerError::UnknownInstance)));
        assert_eq!(registry.device_count(), 0);
        assert!(matches!(
            registry.device(vk::Device::from_raw(1)),
            Err(LayerError::UnknownDevice(_))
        ));
    }

    #[test]
    fn test_duplicate_device_keeps_original_entry() {
        let registry = ChainRegistry::new();
        let device = vk::Device::from_raw(0xd1);

        registry.insert_device(device, device_dispatch(1)).unwrap();
        let err = registry.insert_device(device, device_dispatch(2)).unwrap_err();
        assert!(matches!(err, LayerError::DuplicateDevice(d) if d == device));

        assert_eq!(registry.device_count(), 1);
        let stored = registry.device(device).unwrap();
        assert_eq!(stored.physical_device, vk::PhysicalDevice::from_raw(1));
    }

    #[test]
    fn test_devices_are_keyed_by_handle() {
        let registry = ChainRegistry::new();
        registry.insert_device(vk::Device::from_raw(1), device_dispatch(10)).unwrap();
        registry.insert_device(vk::Device::from_raw(2), device_dispatch(20)).unwrap();

        assert!(registry.contains_device(vk::Device::from_raw(2)));
        assert_eq!(
            registry.device(vk::Device::from_raw(2)).unwrap().physical_device,
            vk::PhysicalDevice::from_raw(20)
        );
    }
}
