// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod lifecycle;
pub mod quarkus;

pub use lifecycle::{Lifecycle, Outcome, Transition};
pub use quarkus::QuarkusReconciler;
