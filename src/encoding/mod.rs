// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Conversion engine: codec and plan traits, adapter-based plan
//! resolution, the type registry and the default type set.

pub mod codec;
pub mod defaults;
pub mod encode;
pub mod registry;
pub mod scan;

pub use codec::{Codec, EncodePlan, IsNull, ScanPlan};
pub use registry::{PgType, TypeRegistry};
