// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::QuarkusOperator;
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the QuarkusOperator CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_app_crd(client: &Client) -> Result<()> {
    let api_version = QuarkusOperator::api_version(&());
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_app_crd_exists(client).await {
            Ok(true) => {
                info!("QuarkusOperator CRD ({}) is available", api_version);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "QuarkusOperator CRD ({}) not yet available, waiting {} seconds...",
                    api_version, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for QuarkusOperator CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;
        interval = next_interval(interval);
    }
}

/// Exponential backoff with max cap
fn next_interval(interval: u64) -> u64 {
    (interval * 2).min(POLL_MAX_INTERVAL_SECS)
}

/// Check if the QuarkusOperator CRD exists by attempting to discover it.
async fn check_app_crd_exists(client: &Client) -> Result<bool> {
    let group = QuarkusOperator::group(&());
    let version = QuarkusOperator::version(&());
    let kind = QuarkusOperator::kind(&());

    let discovery = Discovery::new(client.clone())
        .filter(&[group.as_ref()])
        .run()
        .await?;

    for api_group in discovery.groups() {
        if api_group.name() == group {
            for (ar, _) in api_group.recommended_resources() {
                if ar.kind == kind && ar.version == version {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}
