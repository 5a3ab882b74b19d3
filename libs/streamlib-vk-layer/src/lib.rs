// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `VkRenderStages`: a Vulkan layer that forwards every call down the
//! dispatch chain and turns debug-marker object names into GPU render stage
//! trace packets.
//!
//! The loader finds the layer through its manifest and calls
//! [`VkRenderStagesGetInstanceProcAddr`]. From there:
//!
//! - `vkCreateInstance` / `vkCreateDevice` pop this layer's entry off the
//!   loader's link list, call the next segment and record its entry points
//!   in the [`ChainRegistry`].
//! - The resolvers answer a fixed set of names locally and forward the rest.
//! - `vkDebugMarkerSetObjectNameEXT` writes packets to the `vk_api` and
//!   `gpu.renderstages` trace streams instead of reaching the driver.
//!
//! # Configuration
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `STREAMLIB_VK_LAYER_CONFIG` | YAML file with `trace`, `streams`, `log` |
//! | `STREAMLIB_VK_LAYER_TRACE` | `log` (default), `off`, or a JSON-lines file path |
//! | `STREAMLIB_VK_LAYER_STREAMS` | Streams started on declaration: `all`, `none`, or a list |
//! | `STREAMLIB_VK_LAYER_LOG` | `tracing` filter directive, default `warn` |

mod bootstrap;
pub mod config;
mod context;
mod dispatch;
mod entry;
pub mod enumerate;
mod error;
mod handlers;
pub mod link;
mod logging;
mod registry;
pub mod resolve;
pub mod trace;

#[cfg(test)]
mod testing;

pub use config::{LayerConfig, StreamSelection, TraceSinkKind};
pub use context::LayerContext;
pub use dispatch::{DeviceDispatch, InstanceDispatch};
pub use entry::{
    VkRenderStagesGetDeviceProcAddr, VkRenderStagesGetInstanceProcAddr,
    vkEnumerateDeviceExtensionProperties, vkEnumerateDeviceLayerProperties,
    vkEnumerateInstanceExtensionProperties, vkEnumerateInstanceLayerProperties,
    vkGetDeviceProcAddr, vkGetInstanceProcAddr,
};
pub use enumerate::LAYER_NAME;
pub use error::{LayerError, Result};
pub use registry::ChainRegistry;
