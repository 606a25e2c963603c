//! FILENAME: core/tablix-engine/src/column_width.rs
//! Column Width Manager - Fixed vs. auto widths across data refreshes.
//!
//! Records are keyed by the column's stable identity, never by position.
//! Three inputs are reconciled: widths persisted by the host, the global
//! "auto-size all columns" toggle, and the auto widths measured by the
//! layout. Only user intent produces persistence deltas, and a delta only
//! ever names the columns that changed.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One persisted width as the host stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnWidthObject {
    pub query_name: String,
    pub width: f64,
}

/// A persistence delta for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnWidthChange {
    pub column_identity: String,
    pub is_fixed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnWidthRecord {
    pub is_fixed: bool,
    /// Set when fixed.
    pub width: Option<f64>,
    /// Last width measured by the layout.
    pub auto_width: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ColumnWidthManager {
    records: FxHashMap<String, ColumnWidthRecord>,
    order: Vec<String>,
    auto_size_all: bool,
}

impl ColumnWidthManager {
    pub fn new(auto_size_all: bool) -> Self {
        ColumnWidthManager {
            records: FxHashMap::default(),
            order: Vec::new(),
            auto_size_all,
        }
    }

    /// Parses the host's persisted blob (a JSON array of
    /// `{ "queryName", "width" }`).
    pub fn parse_persisted(blob: &str) -> Result<Vec<ColumnWidthObject>> {
        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(blob)?)
    }

    pub fn serialize_persisted(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.persisted_widths())?)
    }

    pub fn is_auto_size_all(&self) -> bool {
        self.auto_size_all
    }

    /// Reconciles records with a new column set. Records of vanished
    /// columns are dropped, new columns start as auto, existing fixed
    /// widths survive. Persisted widths for columns no longer present are
    /// dropped silently. Nothing here is emitted back to the host.
    pub fn on_data_view_changed(&mut self, identities: &[String], persisted: &[ColumnWidthObject]) {
        let mut records = FxHashMap::default();
        let mut order = Vec::with_capacity(identities.len());
        for identity in identities {
            if records.contains_key(identity) {
                continue;
            }
            let record = self.records.get(identity).copied().unwrap_or_default();
            records.insert(identity.clone(), record);
            order.push(identity.clone());
        }
        let vanished = self.order.iter().filter(|id| !records.contains_key(*id)).count();

        let mut stale = 0;
        for object in persisted {
            match records.get_mut(&object.query_name) {
                Some(record) if object.width.is_finite() && object.width > 0.0 => {
                    record.is_fixed = true;
                    record.width = Some(object.width);
                }
                _ => stale += 1,
            }
        }

        if vanished > 0 || stale > 0 {
            log_debug!(
                "WIDTH",
                "dropped {} vanished columns and {} stale persisted widths",
                vanished,
                stale
            );
        }
        self.records = records;
        self.order = order;
    }

    /// Flips the global toggle. Off -> on clears every fixed width and
    /// returns the deltas; on -> off changes nothing.
    pub fn set_auto_size_all(&mut self, enabled: bool) -> Vec<ColumnWidthChange> {
        let was = self.auto_size_all;
        self.auto_size_all = enabled;
        if was || !enabled {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for identity in &self.order {
            if let Some(record) = self.records.get_mut(identity) {
                if record.is_fixed {
                    record.is_fixed = false;
                    record.width = None;
                    changes.push(ColumnWidthChange {
                        column_identity: identity.clone(),
                        is_fixed: false,
                        width: None,
                    });
                }
            }
        }
        log_debug!("WIDTH", "auto-size all on, cleared {} fixed widths", changes.len());
        changes
    }

    /// A user resize fixes that one column. Returns the delta, or `None`
    /// when the column is unknown or already fixed at that width.
    pub fn on_column_resized(&mut self, identity: &str, width: f64) -> Option<ColumnWidthChange> {
        if !width.is_finite() || width <= 0.0 {
            return None;
        }
        let width = width.round();
        let record = self.records.get_mut(identity)?;
        if record.is_fixed && record.width == Some(width) {
            return None;
        }
        record.is_fixed = true;
        record.width = Some(width);
        Some(ColumnWidthChange {
            column_identity: identity.to_string(),
            is_fixed: true,
            width: Some(width),
        })
    }

    /// Stores the layout's measurement. Never emitted.
    pub fn on_auto_width_measured(&mut self, identity: &str, width: f64) {
        if let Some(record) = self.records.get_mut(identity) {
            record.auto_width = Some(width);
        }
    }

    pub fn fixed_width(&self, identity: &str) -> Option<f64> {
        self.records
            .get(identity)
            .filter(|r| r.is_fixed)
            .and_then(|r| r.width)
    }

    /// The authoritative width: fixed if fixed, else the measured auto width.
    pub fn width(&self, identity: &str) -> Option<f64> {
        let record = self.records.get(identity)?;
        if record.is_fixed {
            record.width
        } else {
            record.auto_width
        }
    }

    pub fn record(&self, identity: &str) -> Option<&ColumnWidthRecord> {
        self.records.get(identity)
    }

    pub fn column_count(&self) -> usize {
        self.order.len()
    }

    pub fn fixed_count(&self) -> usize {
        self.records.values().filter(|r| r.is_fixed).count()
    }

    /// Every fixed width, in column order.
    pub fn persisted_widths(&self) -> Vec<ColumnWidthObject> {
        self.order
            .iter()
            .filter_map(|identity| {
                self.fixed_width(identity).map(|width| ColumnWidthObject {
                    query_name: identity.clone(),
                    width,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn create_test_manager() -> ColumnWidthManager {
        let mut manager = ColumnWidthManager::new(false);
        manager.on_data_view_changed(
            &ids(&["a", "b", "c"]),
            &[ColumnWidthObject {
                query_name: "b".to_string(),
                width: 120.0,
            }],
        );
        manager
    }

    #[test]
    fn test_persisted_width_applies() {
        let manager = create_test_manager();
        assert_eq!(manager.fixed_width("b"), Some(120.0));
        assert_eq!(manager.fixed_width("a"), None);
        assert_eq!(manager.column_count(), 3);
    }

    #[test]
    fn test_stale_persisted_width_dropped() {
        let mut manager = ColumnWidthManager::new(false);
        manager.on_data_view_changed(
            &ids(&["a"]),
            &[ColumnWidthObject {
                query_name: "gone".to_string(),
                width: 50.0,
            }],
        );
        assert_eq!(manager.fixed_count(), 0);
        assert!(manager.record("gone").is_none());
    }

    #[test]
    fn test_refresh_keeps_fixed_and_drops_vanished() {
        let mut manager = create_test_manager();
        manager.on_column_resized("c", 90.0);
        manager.on_data_view_changed(&ids(&["d", "c", "b"]), &[]);
        assert_eq!(manager.fixed_width("c"), Some(90.0));
        assert_eq!(manager.fixed_width("b"), Some(120.0));
        assert!(manager.record("a").is_none());
        assert!(!manager.record("d").unwrap().is_fixed);
        let names: Vec<String> = manager.persisted_widths().into_iter().map(|o| o.query_name).collect();
        assert_eq!(names, ids(&["c", "b"]));
    }

    #[test]
    fn test_resize_emits_only_that_column() {
        let mut manager = create_test_manager();
        let change = manager.on_column_resized("a", 64.4).unwrap();
        assert_eq!(
            change,
            ColumnWidthChange {
                column_identity: "a".to_string(),
                is_fixed: true,
                width: Some(64.0),
            }
        );
        assert_eq!(manager.on_column_resized("a", 64.0), None);
        assert_eq!(manager.on_column_resized("missing", 64.0), None);
        assert_eq!(manager.on_column_resized("a", -1.0), None);
    }

    #[test]
    fn test_toggle_on_clears_all_fixed() {
        let mut manager = create_test_manager();
        manager.on_column_resized("a", 50.0);
        let changes = manager.set_auto_size_all(true);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| !c.is_fixed && c.width.is_none()));
        assert_eq!(manager.fixed_count(), 0);

        // Already on: nothing more to clear.
        assert!(manager.set_auto_size_all(true).is_empty());
    }

    #[test]
    fn test_toggle_off_fixes_nothing() {
        let mut manager = ColumnWidthManager::new(true);
        manager.on_data_view_changed(&ids(&["a", "b"]), &[]);
        manager.on_auto_width_measured("a", 77.0);
        assert!(manager.set_auto_size_all(false).is_empty());
        assert_eq!(manager.fixed_count(), 0);
        assert_eq!(manager.width("a"), Some(77.0));
    }

    #[test]
    fn test_auto_width_does_not_override_fixed() {
        let mut manager = create_test_manager();
        manager.on_auto_width_measured("b", 30.0);
        assert_eq!(manager.width("b"), Some(120.0));
        assert_eq!(manager.record("b").unwrap().auto_width, Some(30.0));
    }

    #[test]
    fn test_blob_round_trip() {
        let manager = create_test_manager();
        let blob = manager.serialize_persisted().unwrap();
        assert_eq!(blob, r#"[{"queryName":"b","width":120.0}]"#);
        let parsed = ColumnWidthManager::parse_persisted(&blob).unwrap();
        assert_eq!(parsed, manager.persisted_widths());
        assert!(ColumnWidthManager::parse_persisted("").unwrap().is_empty());
        assert!(ColumnWidthManager::parse_persisted("{oops").is_err());
    }

    #[test]
    fn test_change_serializes_camel_case() {
        let change = ColumnWidthChange {
            column_identity: "Sales/Q1".to_string(),
            is_fixed: false,
            width: None,
        };
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(json, r#"{"columnIdentity":"Sales/Q1","isFixed":false}"#);
    }
}
