// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Finalizer token guarding cleanup of a QuarkusOperator's children
pub const FINALIZER: &str = "wilda.fr/finalizer";

/// Child object naming and labelling
pub mod children {
    /// Workload name under the fixed naming scheme
    pub const DEPLOYMENT_NAME: &str = "quarkus-deployment";
    /// Exposure name under the fixed naming scheme
    pub const SERVICE_NAME: &str = "quarkus-service";
    /// Suffixes used when names are derived from the custom resource
    pub const DEPLOYMENT_SUFFIX: &str = "deployment";
    pub const SERVICE_SUFFIX: &str = "service";

    pub const APP_LABEL_KEY: &str = "app";
    pub const APP_LABEL_VALUE: &str = "quarkus";
    /// Only set on selectors when names are derived from the custom resource
    pub const INSTANCE_LABEL_KEY: &str = "app.kubernetes.io/instance";

    pub const CONTAINER_NAME: &str = "quarkus";
    pub const PORT_NAME: &str = "http";
    pub const CONTAINER_PORT: i32 = 8080;
    pub const SERVICE_PORT: i32 = 80;
}

/// Environment defaults
pub mod defaults {
    pub const IMAGE_BASE: &str = "wilda/hello-world-from-quarkus";
    pub const API_TIMEOUT_SECS: u64 = 10;
    pub const REQUEUE_SECS: u64 = 60;
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
