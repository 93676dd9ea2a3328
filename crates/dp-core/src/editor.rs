//! Applies a resolved edit specification to a keyed string dictionary
//!
//! The algorithm is written once and instantiated for each dictionary key
//! type. Problems in the patch content are logged and skipped; they never
//! abort the rest of the apply call.

use crate::asset::{DataKey, KeyedData};
use crate::edit::{EditSpecification, FieldGroup, RecordEdits};
use crate::error::{Error, Result};
use crate::monitor::{LogLevel, Monitor};
use crate::options::{EditOptions, KeyErrorPolicy};
use crate::token::Resolvable;
use tracing::debug;

/// Counts of what one apply call changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    /// Records inserted or overwritten
    pub records_set: usize,
    /// Records removed (removing a missing key doesn't count)
    pub records_removed: usize,
    /// Individual fields overwritten
    pub fields_edited: usize,
    /// Content problems logged and skipped
    pub warnings: usize,
}

impl EditSummary {
    /// Whether anything in the dictionary was touched
    pub fn has_changes(&self) -> bool {
        self.records_set + self.records_removed + self.fields_edited > 0
    }
}

/// Edits one dictionary on behalf of one patch
pub struct DatasetEditor<'a> {
    pub patch_name: &'a str,
    pub asset_name: &'a str,
    pub options: &'a EditOptions,
    pub monitor: &'a dyn Monitor,
}

impl<'a> DatasetEditor<'a> {
    pub fn new(
        patch_name: &'a str,
        asset_name: &'a str,
        options: &'a EditOptions,
        monitor: &'a dyn Monitor,
    ) -> Self {
        Self {
            patch_name,
            asset_name,
            options,
            monitor,
        }
    }

    /// Apply record edits, then field edits, to a dictionary keyed by `K`
    pub fn apply<K, S, D>(&self, spec: &EditSpecification<S>, data: &mut D) -> Result<EditSummary>
    where
        K: DataKey,
        S: Resolvable,
        D: KeyedData<K> + ?Sized,
    {
        let mut summary = EditSummary::default();

        // records first, so field edits can target records added here
        if let Some(records) = &spec.records {
            self.apply_records(records, data, &mut summary)?;
        }

        if let Some(fields) = &spec.fields {
            for group in fields.groups() {
                self.apply_field_group(group, data, &mut summary)?;
            }
        }

        debug!(
            patch = self.patch_name,
            asset = self.asset_name,
            key_type = K::TYPE_NAME,
            records_set = summary.records_set,
            records_removed = summary.records_removed,
            fields_edited = summary.fields_edited,
            warnings = summary.warnings,
            "applied data edits"
        );

        Ok(summary)
    }

    fn apply_records<K, S, D>(
        &self,
        records: &RecordEdits<S>,
        data: &mut D,
        summary: &mut EditSummary,
    ) -> Result<()>
    where
        K: DataKey,
        S: Resolvable,
        D: KeyedData<K> + ?Sized,
    {
        for (literal, value) in records.iter() {
            let Some(key) = self.coerce_key::<K>(literal, summary)? else {
                continue;
            };

            match value {
                Some(value) => {
                    data.set(key, value.value().to_string());
                    summary.records_set += 1;
                }
                None => {
                    if data.remove(&key) {
                        summary.records_removed += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_field_group<K, S, D>(
        &self,
        group: &FieldGroup<S>,
        data: &mut D,
        summary: &mut EditSummary,
    ) -> Result<()>
    where
        K: DataKey,
        S: Resolvable,
        D: KeyedData<K> + ?Sized,
    {
        let Some(key) = self.coerce_key::<K>(&group.key, summary)? else {
            return Ok(());
        };

        let Some(record) = data.get(&key) else {
            self.warn(
                format!(
                    "can't edit fields of '{}' in {}: there's no record with that key; skipped.",
                    group.key, self.asset_name
                ),
                summary,
            );
            return Ok(());
        };

        let delimiter = self.options.field_delimiter;
        let mut fields: Vec<String> = record.split(delimiter).map(str::to_string).collect();
        let mut edited = 0;

        for (index, value) in &group.fields {
            let slot = usize::try_from(*index)
                .ok()
                .and_then(|i| fields.get_mut(i));

            match slot {
                Some(field) => {
                    *field = value.value().to_string();
                    edited += 1;
                }
                None => {
                    self.warn(
                        format!(
                            "can't edit field {} of '{}' in {}: index must be in the range 0-{}; skipped.",
                            index,
                            group.key,
                            self.asset_name,
                            fields.len() - 1
                        ),
                        summary,
                    );
                }
            }
        }

        let separator = delimiter.to_string();
        data.set(key, fields.join(separator.as_str()));
        summary.fields_edited += edited;
        Ok(())
    }

    /// Convert a literal key, applying the key error policy on failure
    fn coerce_key<K: DataKey>(&self, literal: &str, summary: &mut EditSummary) -> Result<Option<K>> {
        match K::from_literal(literal) {
            Ok(key) => Ok(Some(key)),
            Err(source) => match self.options.key_errors {
                KeyErrorPolicy::Warn => {
                    self.warn(
                        format!(
                            "can't edit '{}' in {}: the key isn't a valid {} ({}); skipped.",
                            literal,
                            self.asset_name,
                            K::TYPE_NAME,
                            source
                        ),
                        summary,
                    );
                    Ok(None)
                }
                KeyErrorPolicy::Fail => Err(Error::KeyCoercion {
                    patch: self.patch_name.to_string(),
                    asset: self.asset_name.to_string(),
                    key: literal.to_string(),
                    key_type: K::TYPE_NAME,
                    source,
                }),
            },
        }
    }

    fn warn(&self, message: String, summary: &mut EditSummary) {
        summary.warnings += 1;
        self.monitor
            .log(&format!("{} {}", self.patch_name, message), LogLevel::Warn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MemoryMonitor;
    use crate::token::TokenString;
    use std::collections::{BTreeMap, HashMap};

    fn table<K: Ord + Clone>(rows: &[(K, &str)]) -> BTreeMap<K, String> {
        rows.iter().map(|(k, v)| (k.clone(), v.to_string())).collect()
    }

    fn apply<K: DataKey>(
        spec: &EditSpecification<TokenString>,
        data: &mut BTreeMap<K, String>,
        options: &EditOptions,
        monitor: &MemoryMonitor,
    ) -> Result<EditSummary> {
        let editor = DatasetEditor::new("Test Patch", "Data/Objects", options, monitor);
        editor.apply::<K, _, _>(spec, data)
    }

    #[test]
    fn test_end_to_end_field_edit() {
        let mut data = table(&[("101".to_string(), "Parsnip/Vegetable/10")]);
        let spec = EditSpecification::new().with_field("101", 2, "20");
        let monitor = MemoryMonitor::new();

        let summary = apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data, table(&[("101".to_string(), "Parsnip/Vegetable/20")]));
        assert_eq!(summary.fields_edited, 1);
        assert!(monitor.entries().is_empty());
    }

    #[test]
    fn test_record_replacement_is_idempotent() {
        let mut data = table(&[(1, "a/b"), (2, "c/d")]);
        let spec = EditSpecification::new()
            .with_record("1", "x/y")
            .with_record("3", "new/row");
        let monitor = MemoryMonitor::new();
        let options = EditOptions::default();

        apply(&spec, &mut data, &options, &monitor).unwrap();
        let once = data.clone();
        apply(&spec, &mut data, &options, &monitor).unwrap();

        assert_eq!(data, once);
        assert_eq!(data, table(&[(1, "x/y"), (2, "c/d"), (3, "new/row")]));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut data = table(&[(1, "a")]);
        let spec = EditSpecification::new().with_removal("1").with_removal("99");
        let monitor = MemoryMonitor::new();

        let summary = apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert!(data.is_empty());
        assert_eq!(summary.records_removed, 1);
        assert_eq!(summary.warnings, 0);
        assert!(monitor.entries().is_empty());
    }

    #[test]
    fn test_field_round_trip() {
        let mut data = table(&[(1, "a/b/c"), (2, "d/e/f")]);
        let spec = EditSpecification::new().with_field("1", 1, "X");
        let monitor = MemoryMonitor::new();

        apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data[&1], "a/X/c");
        assert_eq!(data[&2], "d/e/f");
    }

    #[test]
    fn test_untouched_fields_rejoin_unchanged() {
        let mut data = table(&[(1, "a//c/")]);
        let spec = EditSpecification::new().with_field("1", 9, "X");
        let monitor = MemoryMonitor::new();

        apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data[&1], "a//c/");
        assert_eq!(monitor.warnings().len(), 1);
    }

    #[test]
    fn test_missing_record_skips_only_its_group() {
        let mut data = table(&[(1, "a/b/c")]);
        let spec = EditSpecification::new()
            .with_field("1", 0, "A")
            .with_field("1", 2, "C")
            .with_field("2", 0, "Z");
        let monitor = MemoryMonitor::new();

        let summary = apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data, table(&[(1, "A/b/C")]));
        assert_eq!(summary.fields_edited, 2);
        let warnings = monitor.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Test Patch"));
        assert!(warnings[0].contains("Data/Objects"));
        assert!(warnings[0].contains("'2'"));
    }

    #[test]
    fn test_out_of_range_skips_only_that_field() {
        let mut data = table(&[(1, "a/b/c")]);
        let spec = EditSpecification::new()
            .with_field("1", 0, "A")
            .with_field("1", 5, "Z");
        let monitor = MemoryMonitor::new();

        let summary = apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data[&1], "A/b/c");
        assert_eq!(summary.fields_edited, 1);
        assert_eq!(summary.warnings, 1);
        let warnings = monitor.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("field 5"));
        assert!(warnings[0].contains("0-2"));
    }

    #[test]
    fn test_negative_field_index_is_out_of_range() {
        let mut data = table(&[(1, "a/b")]);
        let spec = EditSpecification::new().with_field("1", -1, "Z");
        let monitor = MemoryMonitor::new();

        apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data[&1], "a/b");
        assert!(monitor.warnings()[0].contains("field -1"));
    }

    #[test]
    fn test_field_edit_targets_record_added_in_same_call() {
        let mut data: BTreeMap<String, String> = BTreeMap::new();
        let spec = EditSpecification::new()
            .with_record("Abigail", "spring 13/fall 22/winter 5")
            .with_field("Abigail", 1, "fall 23");
        let monitor = MemoryMonitor::new();

        apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data["Abigail"], "spring 13/fall 23/winter 5");
    }

    #[test]
    fn test_fields_in_group_compose() {
        let mut data = table(&[(1, "a/b/c")]);
        let spec = EditSpecification::new()
            .with_field("1", 2, "C")
            .with_field("1", 0, "A");
        let monitor = MemoryMonitor::new();

        apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data[&1], "A/b/C");
    }

    #[test]
    fn test_bad_key_warns_by_default() {
        let mut data = table(&[(1, "a/b")]);
        let spec = EditSpecification::new()
            .with_record("Parsnip", "x")
            .with_field("Turnip", 0, "y")
            .with_field("1", 0, "z");
        let monitor = MemoryMonitor::new();

        let summary = apply(&spec, &mut data, &EditOptions::default(), &monitor).unwrap();

        assert_eq!(data, table(&[(1, "z/b")]));
        assert_eq!(summary.warnings, 2);
        assert!(monitor.warnings()[0].contains("valid int"));
    }

    #[test]
    fn test_bad_key_fails_when_configured() {
        let mut data = table(&[(1, "a/b")]);
        let spec = EditSpecification::new().with_record("Parsnip", "x");
        let monitor = MemoryMonitor::new();
        let options = EditOptions {
            key_errors: KeyErrorPolicy::Fail,
            ..EditOptions::default()
        };

        let err = apply(&spec, &mut data, &options, &monitor).unwrap_err();

        assert!(matches!(err, Error::KeyCoercion { ref key, .. } if key == "Parsnip"));
        assert!(monitor.entries().is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let mut data = table(&[("a".to_string(), "1^2^3")]);
        let spec = EditSpecification::new().with_field("a", 1, "two");
        let monitor = MemoryMonitor::new();
        let options = EditOptions {
            field_delimiter: '^',
            ..EditOptions::default()
        };

        apply(&spec, &mut data, &options, &monitor).unwrap();

        assert_eq!(data["a"], "1^two^3");
    }

    #[test]
    fn test_works_on_hash_map() {
        let mut data: HashMap<u32, String> = HashMap::new();
        data.insert(7, "x/y".to_string());
        let spec: EditSpecification = EditSpecification::new().with_field("7", 1, "Y");
        let monitor = MemoryMonitor::new();
        let options = EditOptions::default();
        let editor = DatasetEditor::new("Test Patch", "Data/Objects", &options, &monitor);

        editor.apply::<u32, _, _>(&spec, &mut data).unwrap();

        assert_eq!(data[&7], "x/Y");
    }
}
