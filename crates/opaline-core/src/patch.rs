//! The parameter registry and its serialized form.
//!
//! A [`Patch`] is the full set of a plugin's parameters: an
//! insertion-ordered sequence (hosts enumerate by index) with an id→slot map
//! for O(1) event dispatch. It is built explicitly at processor
//! construction and owned exclusively by the processor thereafter; the UI
//! renders from a [`crate::messages::PatchMirror`], never from the patch
//! itself.
//!
//! # State Format
//!
//! [`to_state`](Patch::to_state) emits a versioned, self-describing JSON
//! blob: the patch format version, the plugin id, the patch display name,
//! and one `{id, value}` entry per parameter. Loading is tolerant in both
//! directions: registry parameters missing from the blob fall back to
//! their defaults, and blob ids unknown to the registry are ignored. This
//! is the forward/backward-compatibility contract that lets old sessions
//! open in new plugin versions and vice versa.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};
use crate::params::Param;
use crate::types::{ParamId, ParamValue};

/// Hook remapping a stored value from an older patch format version.
///
/// Receives the blob's declared version and the (id, value) pair about to be
/// applied; runs before values land in the registry and therefore before
/// smoothers are snapped.
pub type MigrateValueFn = fn(from_version: u32, id: ParamId, value: ParamValue) -> ParamValue;

#[derive(Serialize, Deserialize)]
struct ParamState {
    id: ParamId,
    value: ParamValue,
}

#[derive(Serialize, Deserialize)]
struct PatchState {
    version: u32,
    plugin: String,
    name: String,
    params: Vec<ParamState>,
}

/// Insertion-ordered parameter registry with O(1) id lookup.
pub struct Patch {
    plugin_id: &'static str,
    version: u32,
    /// User-facing patch display name; round-trips through the state blob.
    pub name: String,
    params: Vec<Param>,
    index_by_id: HashMap<ParamId, usize>,
    migrate_value: Option<MigrateValueFn>,
}

impl Patch {
    /// Create an empty registry for the given plugin id and patch version.
    pub fn new(plugin_id: &'static str, version: u32) -> Self {
        Self {
            plugin_id,
            version,
            name: String::new(),
            params: Vec::new(),
            index_by_id: HashMap::new(),
            migrate_value: None,
        }
    }

    /// Install a value-migration hook for loading older blobs.
    pub fn with_migration(mut self, migrate: MigrateValueFn) -> Self {
        self.migrate_value = Some(migrate);
        self
    }

    /// Append a parameter. Ids must be unique within the registry.
    pub fn push(&mut self, param: Param) {
        let id = param.id();
        debug_assert!(
            !self.index_by_id.contains_key(&id),
            "duplicate parameter id {}",
            id
        );
        self.index_by_id.insert(id, self.params.len());
        self.params.push(param);
    }

    /// The plugin identifier recorded in state blobs.
    #[inline]
    pub fn plugin_id(&self) -> &'static str {
        self.plugin_id
    }

    /// Current patch format version.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the registry holds no parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter by host enumeration index.
    #[inline]
    pub fn by_index(&self, index: usize) -> Option<&Param> {
        self.params.get(index)
    }

    /// Mutable parameter by host enumeration index.
    #[inline]
    pub fn by_index_mut(&mut self, index: usize) -> Option<&mut Param> {
        self.params.get_mut(index)
    }

    /// Parameter by stable id.
    #[inline]
    pub fn param(&self, id: ParamId) -> Option<&Param> {
        self.index_by_id.get(&id).map(|&i| &self.params[i])
    }

    /// Mutable parameter by stable id.
    #[inline]
    pub fn param_mut(&mut self, id: ParamId) -> Option<&mut Param> {
        match self.index_by_id.get(&id) {
            Some(&i) => self.params.get_mut(i),
            None => None,
        }
    }

    /// Iterate parameters in insertion (host enumeration) order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    /// Iterate parameters mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Param> {
        self.params.iter_mut()
    }

    /// Restore every parameter to its default and snap its smoother.
    ///
    /// Loading defaults is an intentional step, so no ramp.
    pub fn reset_to_init(&mut self) {
        for param in &mut self.params {
            param.reset_to_default();
        }
    }

    // =========================================================================
    // State Serialization
    // =========================================================================

    /// Serialize the patch to its versioned blob.
    pub fn to_state(&self) -> PluginResult<Vec<u8>> {
        let state = PatchState {
            version: self.version,
            plugin: self.plugin_id.to_string(),
            name: self.name.clone(),
            params: self
                .params
                .iter()
                .map(|p| ParamState {
                    id: p.id(),
                    value: p.value(),
                })
                .collect(),
        };

        serde_json::to_vec(&state).map_err(|e| PluginError::StateError(e.to_string()))
    }

    /// Restore the patch from a blob produced by [`to_state`](Self::to_state).
    ///
    /// The blob is parsed completely before anything is applied, so a
    /// malformed stream fails the load and leaves every parameter exactly as
    /// it was. On success, parameters absent from the blob are at their
    /// defaults, unknown blob ids are skipped, the migration hook has run on
    /// every applied value, and every smoother is snapped, so the next audio
    /// callback observes the loaded values with no ramp.
    pub fn from_state(&mut self, data: &[u8]) -> PluginResult<()> {
        let state: PatchState =
            serde_json::from_slice(data).map_err(|e| PluginError::StateError(e.to_string()))?;

        if state.plugin != self.plugin_id {
            return Err(PluginError::StateError(format!(
                "state blob belongs to plugin '{}', expected '{}'",
                state.plugin, self.plugin_id
            )));
        }

        // Parse succeeded: from here on the load cannot fail, so mutating
        // the registry no longer risks partial corruption.
        self.name = state.name;
        for param in &mut self.params {
            param.reset_to_default();
        }

        for entry in &state.params {
            let value = match self.migrate_value {
                Some(migrate) if state.version < self.version => {
                    migrate(state.version, entry.id, entry.value)
                }
                _ => entry.value,
            };

            match self.param_mut(entry.id) {
                Some(param) => param.set_value(value),
                None => {
                    log::debug!("state blob contains unknown parameter id {}; ignored", entry.id);
                }
            }
        }

        for param in &mut self.params {
            param.snap();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamInfo;

    fn test_patch() -> Patch {
        let mut patch = Patch::new("org.opaline.test", 1);
        patch.push(Param::new(
            ParamInfo::new(100, "Frequency")
                .with_range(20.0, 20_000.0)
                .with_default(1_000.0)
                .with_unit("Hz"),
        ));
        patch.push(Param::new(
            ParamInfo::new(110, "Mix").as_percent().with_default(1.0),
        ));
        patch.push(Param::new(
            ParamInfo::new(120, "Gain").as_percent().with_default(0.5),
        ));
        patch
    }

    #[test]
    fn test_lookup_by_id_and_index() {
        let patch = test_patch();
        assert_eq!(patch.len(), 3);
        assert_eq!(patch.param(110).unwrap().info().name, "Mix");
        assert_eq!(patch.by_index(0).unwrap().id(), 100);
        assert!(patch.param(999).is_none());
    }

    #[test]
    fn test_reset_to_init_snaps() {
        let mut patch = test_patch();
        {
            let p = patch.param_mut(100).unwrap();
            p.lag.set_rate(5.0, 48_000.0, 8);
            p.set_value(5_000.0);
            p.lag.step();
        }
        patch.reset_to_init();
        let p = patch.param(100).unwrap();
        assert_eq!(p.value(), 1_000.0);
        // Snapped, not ramping: the smoothed value is the default exactly.
        assert_eq!(p.lag.current(), 1_000.0);
        assert!(!p.lag.is_smoothing());
    }

    #[test]
    fn test_state_round_trip() {
        let mut patch = test_patch();
        patch.name = "Warm Pad".to_string();
        patch.param_mut(100).unwrap().set_value(432.0);
        patch.param_mut(110).unwrap().set_value(0.25);

        let blob = patch.to_state().unwrap();

        let mut restored = test_patch();
        restored.from_state(&blob).unwrap();

        assert_eq!(restored.name, "Warm Pad");
        assert_eq!(restored.param(100).unwrap().value(), 432.0);
        assert_eq!(restored.param(110).unwrap().value(), 0.25);
        assert_eq!(restored.param(120).unwrap().value(), 0.5);
        // Loaded values are snapped; no ramp on the next callback.
        assert_eq!(restored.param(100).unwrap().lag.current(), 432.0);
    }

    #[test]
    fn test_unknown_blob_id_ignored() {
        let mut patch = test_patch();
        let blob = br#"{
            "version": 1,
            "plugin": "org.opaline.test",
            "name": "",
            "params": [{"id": 999, "value": 5.0}]
        }"#;
        patch.from_state(blob).unwrap();
        // Known parameters sit at their defaults; the unknown id was skipped.
        assert_eq!(patch.param(100).unwrap().value(), 1_000.0);
        assert_eq!(patch.param(110).unwrap().value(), 1.0);
    }

    #[test]
    fn test_missing_param_gets_default() {
        let mut patch = test_patch();
        patch.param_mut(120).unwrap().set_value(0.9);
        let blob = br#"{
            "version": 1,
            "plugin": "org.opaline.test",
            "name": "",
            "params": [{"id": 100, "value": 250.0}]
        }"#;
        patch.from_state(blob).unwrap();
        assert_eq!(patch.param(100).unwrap().value(), 250.0);
        // Not in the blob: back to default, not left at 0.9.
        assert_eq!(patch.param(120).unwrap().value(), 0.5);
    }

    #[test]
    fn test_malformed_blob_leaves_state_intact() {
        let mut patch = test_patch();
        patch.param_mut(100).unwrap().set_value(777.0);

        let err = patch.from_state(b"{\"version\": 1, \"plugin\":").unwrap_err();
        assert!(matches!(err, PluginError::StateError(_)));
        assert_eq!(patch.param(100).unwrap().value(), 777.0);
    }

    #[test]
    fn test_wrong_plugin_id_rejected() {
        let mut patch = test_patch();
        let blob = br#"{"version": 1, "plugin": "org.other.plugin", "name": "", "params": []}"#;
        assert!(patch.from_state(blob).is_err());
    }

    #[test]
    fn test_migration_hook_runs_before_apply() {
        fn migrate(from: u32, id: ParamId, value: ParamValue) -> ParamValue {
            // Version 1 stored Mix as 0-100 instead of 0-1.
            if from == 1 && id == 110 {
                value / 100.0
            } else {
                value
            }
        }

        let mut patch = Patch::new("org.opaline.test", 2).with_migration(migrate);
        patch.push(Param::new(
            ParamInfo::new(110, "Mix").as_percent().with_default(1.0),
        ));

        let blob = br#"{
            "version": 1,
            "plugin": "org.opaline.test",
            "name": "",
            "params": [{"id": 110, "value": 40.0}]
        }"#;
        patch.from_state(blob).unwrap();
        let p = patch.param(110).unwrap();
        assert!((p.value() - 0.4).abs() < 1e-12);
        // Migrated value was snapped, not ramped to.
        assert!((p.lag.current() - 0.4).abs() < 1e-12);
    }
}
