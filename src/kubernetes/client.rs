// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation with bounded API calls

use crate::config::Config;
use crate::error::{OperatorError, Result};
use kube::{Client, Config as KConfig};
use tracing::{info, instrument};

/// Create a client from the inferred kubeconfig or in-cluster environment
#[instrument(skip(config))]
pub async fn create_client(config: &Config) -> Result<Client> {
    let mut client_config = KConfig::infer()
        .await
        .map_err(|e| OperatorError::ClientConfigError(format!("Failed to infer config: {}", e)))?;

    apply_timeouts(&mut client_config, config);
    info!("Using Kubernetes API at {}", client_config.cluster_url);

    Client::try_from(client_config)
        .map_err(|e| OperatorError::ClientConfigError(format!("Failed to create client: {}", e)))
}

/// A slow API server must not hang a reconciliation forever
fn apply_timeouts(client_config: &mut KConfig, config: &Config) {
    client_config.connect_timeout = Some(config.api_timeout);
    client_config.read_timeout = Some(config.api_timeout);
    client_config.write_timeout = Some(config.api_timeout);
}
