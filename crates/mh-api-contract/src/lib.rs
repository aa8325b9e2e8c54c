// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! MiniHub REST API contract types and validation
//!
//! This crate defines the request/response schemas exchanged with the
//! repository API, together with the validation rules applied before any
//! request reaches the repository bridge. The types are shared between the
//! server, its mock variant and any client that talks to it.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;

