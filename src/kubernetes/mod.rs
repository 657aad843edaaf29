// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and CRD discovery.

pub mod client;
pub mod crd;

pub use client::create_client;
pub use crd::wait_for_app_crd;
