// otactl/otactl-types/src/lib.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared types for the otactl diagnostics console.
//!
//! This crate holds everything that does not touch the network or the terminal:
//! - the backend endpoint catalogue ([`endpoint`]),
//! - typed request/response payloads ([`payload`]),
//! - input validation rules for the static commands ([`validate`]),
//! - typed request builders for the static commands ([`command`]),
//! - the routine / OTA action form templates ([`template`]),
//! - the dynamic form dispatcher ([`dispatch`]),
//! - the log table model ([`logs`]).

pub mod command;
pub mod dispatch;
pub mod endpoint;
pub mod logs;
pub mod payload;
pub mod template;
pub mod validate;

pub use command::StaticCommand;
pub use dispatch::{DispatchError, DispatchTarget, FieldError, Submission};
pub use endpoint::{Endpoint, Entity, Method};
pub use template::{FieldDescriptor, Template, TemplateCategory};
pub use validate::ValidationError;
