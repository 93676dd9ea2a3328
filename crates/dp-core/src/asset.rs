//! Keyed asset views handed to a patch by the host
//!
//! The host decides the concrete type of each loaded asset. A data patch can
//! only edit assets which present themselves as a string dictionary, and the
//! key type of that dictionary is only known once the asset is inspected.

use crate::error::KeyParseError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

/// A key type a data dictionary can use
pub trait DataKey: Ord + Hash + Clone + Display + Sized {
    /// Name shown in messages
    const TYPE_NAME: &'static str;

    /// Convert a key written by the author into this type
    fn from_literal(literal: &str) -> Result<Self, KeyParseError>;
}

impl DataKey for String {
    const TYPE_NAME: &'static str = "string";

    fn from_literal(literal: &str) -> Result<Self, KeyParseError> {
        Ok(literal.to_string())
    }
}

macro_rules! numeric_key {
    ($ty:ty, $name:literal) => {
        impl DataKey for $ty {
            const TYPE_NAME: &'static str = $name;

            fn from_literal(literal: &str) -> Result<Self, KeyParseError> {
                <$ty>::from_str(literal.trim()).map_err(|e| KeyParseError::new(e.to_string()))
            }
        }
    };
}

numeric_key!(i32, "int");
numeric_key!(i64, "long");
numeric_key!(u32, "uint");

/// Map operations over a string dictionary with key type `K`
pub trait KeyedData<K> {
    fn get(&self, key: &K) -> Option<&str>;
    fn set(&mut self, key: K, value: String);
    fn contains(&self, key: &K) -> bool;
    /// Remove a key, returning whether it was present
    fn remove(&mut self, key: &K) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord> KeyedData<K> for BTreeMap<K, String> {
    fn get(&self, key: &K) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }

    fn set(&mut self, key: K, value: String) {
        self.insert(key, value);
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn remove(&mut self, key: &K) -> bool {
        BTreeMap::remove(self, key).is_some()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<K: Eq + Hash> KeyedData<K> for HashMap<K, String> {
    fn get(&self, key: &K) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }

    fn set(&mut self, key: K, value: String) {
        self.insert(key, value);
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn remove(&mut self, key: &K) -> bool {
        HashMap::remove(self, key).is_some()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// A live string dictionary, tagged with its key type
pub enum DataDictionary<'a> {
    String(&'a mut dyn KeyedData<String>),
    Int(&'a mut dyn KeyedData<i32>),
    Long(&'a mut dyn KeyedData<i64>),
    UInt(&'a mut dyn KeyedData<u32>),
    /// A string dictionary whose key type has no editor
    Unknown { key_type: String },
}

impl DataDictionary<'_> {
    /// Name of the key type
    pub fn key_type(&self) -> &str {
        match self {
            DataDictionary::String(_) => String::TYPE_NAME,
            DataDictionary::Int(_) => i32::TYPE_NAME,
            DataDictionary::Long(_) => i64::TYPE_NAME,
            DataDictionary::UInt(_) => u32::TYPE_NAME,
            DataDictionary::Unknown { key_type } => key_type.as_str(),
        }
    }
}

/// What an asset looks like to a data patch
pub enum AssetShape<'a> {
    Dictionary(DataDictionary<'a>),
    /// Anything that isn't a string dictionary (images, maps, ...)
    Unsupported { type_name: String },
}

/// A loaded asset the host lets a patch edit
pub trait Asset {
    /// Asset name, used in messages
    fn name(&self) -> &str;

    /// Inspect the asset and borrow its data
    fn shape(&mut self) -> AssetShape<'_>;
}

/// Image data, as far as a data patch cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
}

/// Owned data for a loaded asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum AssetData {
    StringKeyed(BTreeMap<String, String>),
    IntKeyed(BTreeMap<i32, String>),
    LongKeyed(BTreeMap<i64, String>),
    UintKeyed(BTreeMap<u32, String>),
    Texture(Texture),
}

/// A named asset owning its data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAsset {
    pub name: String,
    pub data: AssetData,
}

impl DataAsset {
    pub fn new(name: impl Into<String>, data: AssetData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Number of records, or `None` for non-dictionary data
    pub fn record_count(&self) -> Option<usize> {
        match &self.data {
            AssetData::StringKeyed(m) => Some(m.len()),
            AssetData::IntKeyed(m) => Some(m.len()),
            AssetData::LongKeyed(m) => Some(m.len()),
            AssetData::UintKeyed(m) => Some(m.len()),
            AssetData::Texture(_) => None,
        }
    }
}

impl Asset for DataAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&mut self) -> AssetShape<'_> {
        match &mut self.data {
            AssetData::StringKeyed(m) => AssetShape::Dictionary(DataDictionary::String(m)),
            AssetData::IntKeyed(m) => AssetShape::Dictionary(DataDictionary::Int(m)),
            AssetData::LongKeyed(m) => AssetShape::Dictionary(DataDictionary::Long(m)),
            AssetData::UintKeyed(m) => AssetShape::Dictionary(DataDictionary::UInt(m)),
            AssetData::Texture(_) => AssetShape::Unsupported {
                type_name: "Texture".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_coercion() {
        assert_eq!(i32::from_literal("7"), Ok(7));
        assert_eq!(i32::from_literal(" -12 "), Ok(-12));
        assert_eq!(u32::from_literal("42"), Ok(42));
        assert_eq!(String::from_literal(" 7 "), Ok(" 7 ".to_string()));
        assert!(i32::from_literal("Parsnip").is_err());
        assert!(u32::from_literal("-1").is_err());
        assert!(i64::from_literal("").is_err());
    }

    #[test]
    fn test_keyed_data_map_operations() {
        let mut data: BTreeMap<i32, String> = BTreeMap::new();
        let view: &mut dyn KeyedData<i32> = &mut data;

        view.set(1, "one".to_string());
        assert!(view.contains(&1));
        assert_eq!(view.get(&1), Some("one"));
        assert!(view.remove(&1));
        assert!(!view.remove(&1));
        assert!(view.is_empty());
    }

    #[test]
    fn test_data_asset_shape() {
        let mut asset = DataAsset::new("Data/Objects", AssetData::IntKeyed(BTreeMap::new()));
        match asset.shape() {
            AssetShape::Dictionary(dict) => assert_eq!(dict.key_type(), "int"),
            AssetShape::Unsupported { .. } => panic!("expected a dictionary"),
        }

        let mut asset = DataAsset::new(
            "Portraits/Abigail",
            AssetData::Texture(Texture {
                width: 128,
                height: 384,
            }),
        );
        assert!(matches!(asset.shape(), AssetShape::Unsupported { .. }));
        assert_eq!(asset.record_count(), None);
    }

    #[test]
    fn test_data_asset_json() {
        let json = r#"{"name":"Data/Objects","data":{"kind":"int_keyed","entries":{"101":"Parsnip/Vegetable/10"}}}"#;
        let asset: DataAsset = serde_json::from_str(json).unwrap();
        match &asset.data {
            AssetData::IntKeyed(m) => assert_eq!(m.get(&101).map(String::as_str), Some("Parsnip/Vegetable/10")),
            other => panic!("unexpected data {:?}", other),
        }
    }
}
