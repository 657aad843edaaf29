// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quarkus_operator::config::Config;
use quarkus_operator::kubernetes::{create_client, wait_for_app_crd};
use quarkus_operator::reconcilers::QuarkusReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting Quarkus operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, image_base={}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.image_base
    );
    info!(
        "Child naming {:?}, existing child policy {:?}",
        config.child_naming, config.existing_child_policy
    );

    // Create Kubernetes client
    let client = create_client(&config).await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for QuarkusOperator CRD to become available...");
    wait_for_app_crd(&client).await?;

    let reconciler = QuarkusReconciler::new(client, config);

    info!("Starting reconciler...");
    reconciler.run().await?;

    warn!("Reconciler stopped");
    Ok(())
}
