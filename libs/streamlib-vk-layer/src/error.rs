// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use ash::vk;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerError {
    #[error("create info carries no loader link node for this layer")]
    MissingLinkInfo,

    #[error("next chain segment does not provide {0}")]
    MissingEntryPoint(&'static str),

    #[error("{0} was not resolved for the target object")]
    ExtensionNotPresent(&'static str),

    #[error("device {0:?} is already registered")]
    DuplicateDevice(vk::Device),

    #[error("device {0:?} was never registered")]
    UnknownDevice(vk::Device),

    #[error("no instance has been created through this layer")]
    UnknownInstance,

    #[error("next chain segment failed: {0}")]
    Driver(vk::Result),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerError {
    /// The `VkResult` an entry point reports for this error.
    ///
    /// Driver failures pass through untouched. A forwarded extension call
    /// whose next-segment pointer was never resolved reports
    /// `VK_ERROR_EXTENSION_NOT_PRESENT`; every other layer-side failure is an
    /// initialization failure.
    pub fn to_vk_result(&self) -> vk::Result {
        match self {
            Self::Driver(result) => *result,
            Self::ExtensionNotPresent(_) => vk::Result::ERROR_EXTENSION_NOT_PRESENT,
            _ => vk::Result::ERROR_INITIALIZATION_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, LayerError>;
