// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry: the engine's central lookup structure.
//!
//! The registry owns every known PostgreSQL type and is consulted for all
//! plan resolution. Registration takes `&mut self`, so the setup phase is
//! exclusive by construction; lookups and conversions take `&self` and
//! are safe to share across threads. Only the lazily derived shape index
//! and the scan-plan cache are guarded by locks.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::core::error::{ConversionError, Result};
use crate::core::oid::Format;
use crate::core::value::{Shape, Value};
use crate::encoding::codec::{Codec, EncodePlan, IsNull, ScanPlan};
use crate::encoding::defaults::register_defaults;
use crate::encoding::encode::resolve_encode_plan;
use crate::encoding::scan::{resolve_scan_plan, FailScanPlan};

/// A registered PostgreSQL type: its name, OID and conversion codec.
pub struct PgType {
    pub name: String,
    pub oid: u32,
    pub codec: Arc<dyn Codec>,
}

impl PgType {
    pub fn new(name: impl Into<String>, oid: u32, codec: Arc<dyn Codec>) -> Self {
        PgType {
            name: name.into(),
            oid,
            codec,
        }
    }
}

/// Registry of PostgreSQL types and the conversion entry points.
pub struct TypeRegistry {
    oid_to_type: HashMap<u32, Arc<PgType>>,
    name_to_type: HashMap<String, Arc<PgType>>,
    shape_to_name: HashMap<Shape, String>,

    /// Derived shape-to-type index, rebuilt lazily after registrations.
    shape_to_type: RwLock<Option<HashMap<Shape, Arc<PgType>>>>,

    /// Memoized scan plans keyed per OID by destination shape and format.
    scan_plan_cache: RwLock<HashMap<u32, HashMap<(Shape, Format), Arc<dyn ScanPlan>>>>,
}

impl TypeRegistry {
    /// A registry pre-populated with the standard PostgreSQL types and
    /// default shape mappings.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        register_defaults(&mut registry);
        registry
    }

    /// A bare registry with no types registered.
    pub fn empty() -> Self {
        TypeRegistry {
            oid_to_type: HashMap::new(),
            name_to_type: HashMap::new(),
            shape_to_name: HashMap::new(),
            shape_to_type: RwLock::new(None),
            scan_plan_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Register a type, replacing any previous registration under the
    /// same OID or name. Invalidates all derived indexes and caches.
    /// Returns the shared handle so container types can reference their
    /// element type.
    pub fn register_type(&mut self, pg_type: PgType) -> Arc<PgType> {
        debug!(name = %pg_type.name, oid = pg_type.oid, "registering type");
        let pg_type = Arc::new(pg_type);
        self.oid_to_type.insert(pg_type.oid, Arc::clone(&pg_type));
        self.name_to_type
            .insert(pg_type.name.clone(), Arc::clone(&pg_type));
        self.invalidate_caches();
        pg_type
    }

    /// Bind a native shape to a type name as its default wire type.
    pub fn register_default_shape(&mut self, shape: Shape, type_name: impl Into<String>) {
        self.shape_to_name.insert(shape, type_name.into());
        self.invalidate_caches();
    }

    fn invalidate_caches(&mut self) {
        *self.shape_to_type.write().unwrap() = None;
        self.scan_plan_cache.write().unwrap().clear();
    }

    /// Look up a type by OID.
    pub fn type_for_oid(&self, oid: u32) -> Option<Arc<PgType>> {
        self.oid_to_type.get(&oid).cloned()
    }

    /// Look up a type by name.
    pub fn type_for_name(&self, name: &str) -> Option<Arc<PgType>> {
        self.name_to_type.get(name).cloned()
    }

    /// Look up the default wire type for a native shape.
    ///
    /// The shape index is derived from the name bindings on first use and
    /// cached until the next registration.
    pub fn type_for_shape(&self, shape: &Shape) -> Option<Arc<PgType>> {
        {
            let index = self.shape_to_type.read().unwrap();
            if let Some(index) = index.as_ref() {
                return index.get(shape).cloned();
            }
        }

        let mut index = self.shape_to_type.write().unwrap();
        let index = index.get_or_insert_with(|| {
            self.shape_to_name
                .iter()
                .filter_map(|(shape, name)| {
                    self.name_to_type
                        .get(name)
                        .map(|t| (shape.clone(), Arc::clone(t)))
                })
                .collect()
        });
        index.get(shape).cloned()
    }

    /// The wire format to request for a result column of the given OID.
    ///
    /// Unregistered OIDs fall back to text, which every type can render.
    pub fn format_for_oid(&self, oid: u32) -> Format {
        match self.oid_to_type.get(&oid) {
            Some(t) => t.codec.preferred_format(),
            None => Format::Text,
        }
    }

    /// Resolve an encode plan for serializing `value` as the type `oid`
    /// in `format`. Encode plans are not memoized; resolution is cheap
    /// once the adapter rules have matched.
    pub fn plan_encode(
        &self,
        oid: u32,
        format: Format,
        value: &Value,
    ) -> Option<Box<dyn EncodePlan>> {
        resolve_encode_plan(self, oid, format, value)
    }

    /// Serialize `value` as the type `oid` in `format`, appending to `buf`.
    ///
    /// [`Value::Null`] reports NULL without consulting any codec, so NULL
    /// can be sent even for unregistered OIDs. When no plan matches the
    /// value as given, a generic primitive carrier is unwrapped once and
    /// resolution retried.
    pub fn encode(
        &self,
        oid: u32,
        format: Format,
        value: &Value,
        buf: &mut Vec<u8>,
    ) -> Result<IsNull> {
        if value.is_null() {
            return Ok(IsNull::Yes);
        }

        if let Some(plan) = self.plan_encode(oid, format, value) {
            return plan.encode(self, value, buf);
        }

        if let Some(primitive) = value.unwrap_primitive() {
            let unwrapped = primitive.into_value();
            if unwrapped.is_null() {
                return Ok(IsNull::Yes);
            }
            if let Some(plan) = self.plan_encode(oid, format, &unwrapped) {
                return plan.encode(self, &unwrapped, buf);
            }
        }

        Err(ConversionError::plan_not_found(oid, format, value.shape()))
    }

    /// Resolve (and memoize) a scan plan for populating `target` from the
    /// type `oid` in `format`. Always returns a plan; when resolution
    /// fails the memoized plan reports the failure on every execution,
    /// sparing repeated resolution for a column that can never scan.
    pub fn plan_scan(&self, oid: u32, format: Format, target: &Value) -> Arc<dyn ScanPlan> {
        let shape = target.shape();
        let key = (shape.clone(), format);

        {
            let cache = self.scan_plan_cache.read().unwrap();
            if let Some(plan) = cache.get(&oid).and_then(|per_oid| per_oid.get(&key)) {
                return Arc::clone(plan);
            }
        }

        let plan: Arc<dyn ScanPlan> = match resolve_scan_plan(self, oid, format, target) {
            Some(plan) => Arc::from(plan),
            None => Arc::new(FailScanPlan::new(oid, format, shape)),
        };

        let mut cache = self.scan_plan_cache.write().unwrap();
        cache
            .entry(oid)
            .or_default()
            .insert(key, Arc::clone(&plan));
        plan
    }

    /// Populate `dst` from the wire bytes of a value of type `oid` in
    /// `format`. `src` of `None` is SQL NULL.
    pub fn scan(&self, oid: u32, format: Format, src: Option<&[u8]>, dst: &mut Value) -> Result<()> {
        let plan = self.plan_scan(oid, format, dst);
        plan.scan(self, src, dst)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oid;

    #[test]
    fn test_empty_registry_has_no_types() {
        let registry = TypeRegistry::empty();
        assert!(registry.type_for_oid(oid::INT4_OID).is_none());
        assert!(registry.type_for_name("int4").is_none());
    }

    #[test]
    fn test_default_registry_knows_builtins() {
        let registry = TypeRegistry::new();
        let int4 = registry.type_for_oid(oid::INT4_OID).unwrap();
        assert_eq!(int4.name, "int4");
        assert!(registry.type_for_name("text").is_some());
    }

    #[test]
    fn test_format_for_unknown_oid_is_text() {
        let registry = TypeRegistry::empty();
        assert_eq!(registry.format_for_oid(999_999), Format::Text);
    }

    #[test]
    fn test_shape_index_finds_default_type() {
        let registry = TypeRegistry::new();
        let t = registry.type_for_shape(&Shape::Int32).unwrap();
        assert_eq!(t.oid, oid::INT4_OID);
    }

    #[test]
    fn test_encode_null_without_registration() {
        let registry = TypeRegistry::empty();
        let mut buf = Vec::new();
        let is_null = registry
            .encode(999_999, Format::Binary, &Value::Null, &mut buf)
            .unwrap();
        assert_eq!(is_null, IsNull::Yes);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_unknown_oid_fails_for_non_null() {
        let registry = TypeRegistry::empty();
        let mut buf = Vec::new();
        let err = registry
            .encode(999_999, Format::Binary, &Value::Int64(1), &mut buf)
            .unwrap_err();
        assert!(matches!(err, ConversionError::PlanNotFound { .. }));
    }
}
