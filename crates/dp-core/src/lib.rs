//! dp-core: Core library for patching keyed game data tables
//!
//! This library provides functionality to:
//! - Describe record and field edits whose values may contain `{{tokens}}`
//! - Track which edit values depend on the token context and refresh them
//! - Inspect a loaded asset and pick the editor for its dictionary key type
//! - Apply record upserts/removals and slash-delimited field edits, logging
//!   content problems instead of aborting

pub mod asset;
pub mod dispatch;
pub mod edit;
pub mod editor;
pub mod error;
pub mod monitor;
pub mod options;
pub mod patch;
pub mod token;
pub mod tracker;

pub use asset::{Asset, AssetData, AssetShape, DataAsset, DataDictionary, DataKey, KeyedData, Texture};
pub use dispatch::KeyTypeDispatcher;
pub use edit::{EditSpecification, FieldEdits, FieldGroup, RecordEdits};
pub use editor::{DatasetEditor, EditSummary};
pub use error::{Error, KeyParseError, Result};
pub use monitor::{LogLevel, MemoryMonitor, Monitor, TracingMonitor};
pub use options::{EditOptions, KeyErrorPolicy};
pub use patch::{EditDataPatch, PatchBase};
pub use token::{Context, Resolvable, TokenString};
pub use tracker::{MutableTemplateTracker, TemplateSlot};
