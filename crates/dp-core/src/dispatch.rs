//! Picks the dataset editor matching an asset's dictionary key type

use crate::asset::{Asset, AssetShape, DataDictionary};
use crate::edit::EditSpecification;
use crate::editor::{DatasetEditor, EditSummary};
use crate::error::{Error, Result};
use crate::monitor::{LogLevel, Monitor};
use crate::options::EditOptions;
use crate::token::Resolvable;
use tracing::debug;

/// Inspects an asset and runs the editor specialized to its key type
pub struct KeyTypeDispatcher<'a> {
    pub patch_name: &'a str,
    pub options: &'a EditOptions,
    pub monitor: &'a dyn Monitor,
}

impl<'a> KeyTypeDispatcher<'a> {
    pub fn new(patch_name: &'a str, options: &'a EditOptions, monitor: &'a dyn Monitor) -> Self {
        Self {
            patch_name,
            options,
            monitor,
        }
    }

    /// Apply the specification to an asset.
    ///
    /// Returns `Ok(None)` if the asset isn't a string dictionary; that's
    /// logged as a warning and the asset is left untouched. A dictionary
    /// with a key type no editor exists for is an error.
    pub fn edit<S: Resolvable>(
        &self,
        spec: &EditSpecification<S>,
        asset: &mut dyn Asset,
    ) -> Result<Option<EditSummary>> {
        let asset_name = asset.name().to_string();

        let dictionary = match asset.shape() {
            AssetShape::Dictionary(dictionary) => dictionary,
            AssetShape::Unsupported { type_name } => {
                self.monitor.log(
                    &format!(
                        "{} can't edit {}: it's a {}, not a data dictionary; skipped.",
                        self.patch_name, asset_name, type_name
                    ),
                    LogLevel::Warn,
                );
                return Ok(None);
            }
        };

        debug!(
            patch = self.patch_name,
            asset = %asset_name,
            key_type = dictionary.key_type(),
            "dispatching data edit"
        );

        let editor = DatasetEditor::new(self.patch_name, &asset_name, self.options, self.monitor);
        let summary = match dictionary {
            DataDictionary::String(data) => editor.apply::<String, _, _>(spec, data)?,
            DataDictionary::Int(data) => editor.apply::<i32, _, _>(spec, data)?,
            DataDictionary::Long(data) => editor.apply::<i64, _, _>(spec, data)?,
            DataDictionary::UInt(data) => editor.apply::<u32, _, _>(spec, data)?,
            DataDictionary::Unknown { key_type } => {
                return Err(Error::UnsupportedKeyType {
                    patch: self.patch_name.to_string(),
                    asset: asset_name,
                    key_type,
                })
            }
        };

        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetData, DataAsset, Texture};
    use crate::monitor::MemoryMonitor;
    use std::collections::BTreeMap;

    /// An asset claiming a key type the engine has no editor for
    struct FloatKeyedAsset;

    impl Asset for FloatKeyedAsset {
        fn name(&self) -> &str {
            "Data/Weights"
        }

        fn shape(&mut self) -> AssetShape<'_> {
            AssetShape::Dictionary(DataDictionary::Unknown {
                key_type: "float".to_string(),
            })
        }
    }

    fn spec() -> EditSpecification {
        EditSpecification::new().with_field("101", 2, "20")
    }

    #[test]
    fn test_dispatch_by_key_type() {
        let monitor = MemoryMonitor::new();
        let options = EditOptions::default();
        let dispatcher = KeyTypeDispatcher::new("Test Patch", &options, &monitor);

        let mut rows = BTreeMap::new();
        rows.insert(101, "Parsnip/Vegetable/10".to_string());
        let mut asset = DataAsset::new("Data/Objects", AssetData::IntKeyed(rows));

        let summary = dispatcher.edit(&spec(), &mut asset).unwrap().unwrap();
        assert_eq!(summary.fields_edited, 1);
        match &asset.data {
            AssetData::IntKeyed(rows) => assert_eq!(rows.get(&101).map(String::as_str), Some("Parsnip/Vegetable/20")),
            other => panic!("unexpected data {:?}", other),
        }

        let mut rows = BTreeMap::new();
        rows.insert(101u32, "Parsnip/Vegetable/10".to_string());
        let mut asset = DataAsset::new("Data/Objects", AssetData::UintKeyed(rows));
        dispatcher.edit(&spec(), &mut asset).unwrap();
        assert!(matches!(&asset.data, AssetData::UintKeyed(rows) if rows[&101] == "Parsnip/Vegetable/20"));

        assert!(monitor.entries().is_empty());
    }

    #[test]
    fn test_non_dictionary_asset_is_rejected() {
        let monitor = MemoryMonitor::new();
        let options = EditOptions::default();
        let dispatcher = KeyTypeDispatcher::new("Test Patch", &options, &monitor);

        let mut asset = DataAsset::new(
            "Portraits/Abigail",
            AssetData::Texture(Texture {
                width: 128,
                height: 384,
            }),
        );
        let before = asset.clone();

        let result = dispatcher.edit(&spec(), &mut asset).unwrap();

        assert!(result.is_none());
        assert_eq!(asset, before);
        let warnings = monitor.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Test Patch"));
        assert!(warnings[0].contains("Portraits/Abigail"));
    }

    #[test]
    fn test_unknown_key_type_is_fatal() {
        let monitor = MemoryMonitor::new();
        let options = EditOptions::default();
        let dispatcher = KeyTypeDispatcher::new("Test Patch", &options, &monitor);

        let err = dispatcher.edit(&spec(), &mut FloatKeyedAsset).unwrap_err();

        match err {
            Error::UnsupportedKeyType { asset, key_type, .. } => {
                assert_eq!(asset, "Data/Weights");
                assert_eq!(key_type, "float");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(monitor.entries().is_empty());
    }
}
