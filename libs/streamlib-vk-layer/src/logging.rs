// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::LayerConfig;

static INIT: Once = Once::new();

/// Install a stderr `fmt` subscriber filtered by `directive`.
///
/// The layer lives inside someone else's process: if the host already set a
/// global subscriber, that one is kept. Later calls are no-ops.
pub fn init(directive: &str) {
    INIT.call_once(|| {
        let parsed = EnvFilter::try_new(directive);
        let invalid = parsed.is_err();
        let filter = parsed.unwrap_or_else(|_| EnvFilter::new(LayerConfig::DEFAULT_LOG_FILTER));

        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global subscriber already installed, keeping it");
        }

        if invalid {
            tracing::warn!(
                "Invalid {} directive '{}', using '{}'",
                LayerConfig::LOG_ENV_VAR,
                directive,
                LayerConfig::DEFAULT_LOG_FILTER
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_and_tolerates_bad_directives() {
        init("streamlib_vk_layer=[");
        init("debug");
    }
}
