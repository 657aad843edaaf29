// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build Kubernetes client: {0}")]
    ClientConfigError(String),

    #[error("Kubernetes API call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Object is missing required metadata: {0}")]
    MissingMetadata(String),

    #[error("Failed to render child objects: {0}")]
    RenderError(String),
}

impl OperatorError {
    /// Whether re-invoking the reconciliation later may succeed without anyone
    /// changing the custom resource. Every API server rejection counts, a 422
    /// for an allocated node port clears once the port is freed.
    pub fn is_transient(&self) -> bool {
        match self {
            OperatorError::KubeError(_) | OperatorError::Timeout(_) => true,
            OperatorError::ClientConfigError(_)
            | OperatorError::MissingMetadata(_)
            | OperatorError::RenderError(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OperatorError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }

    /// True for a 409 whose reason is AlreadyExists (as opposed to a write conflict)
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            OperatorError::KubeError(kube::Error::Api(err))
                if err.code == 409 && err.reason == "AlreadyExists"
        )
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
