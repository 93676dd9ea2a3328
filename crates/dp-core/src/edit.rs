//! Edit specification: the record and field edits a data patch makes
//!
//! Keys are kept as the literal strings the author wrote; they're converted
//! to the dictionary's key type only when the patch is applied.

use crate::token::TokenString;

/// Record-level edits, in author order
///
/// A `None` value removes the record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEdits<S = TokenString> {
    entries: Vec<(String, Option<S>)>,
}

impl<S> RecordEdits<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set the edit for a key. A repeated key replaces the earlier value but
    /// keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<S>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&S>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Get the value at a position
    pub(crate) fn value(&self, index: usize) -> Option<&S> {
        self.entries.get(index).and_then(|(_, v)| v.as_ref())
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> Option<&mut S> {
        self.entries.get_mut(index).and_then(|(_, v)| v.as_mut())
    }
}

impl<S> Default for RecordEdits<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, K: Into<String>> FromIterator<(K, Option<S>)> for RecordEdits<S> {
    fn from_iter<I: IntoIterator<Item = (K, Option<S>)>>(iter: I) -> Self {
        let mut edits = Self::new();
        for (key, value) in iter {
            edits.insert(key, value);
        }
        edits
    }
}

/// Field-level edits for one record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup<S = TokenString> {
    /// Record key as written by the author
    pub key: String,
    /// Field index and new value, in author order
    pub fields: Vec<(i32, S)>,
}

/// Field-level edits, grouped by record key
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdits<S = TokenString> {
    groups: Vec<FieldGroup<S>>,
}

impl<S> FieldEdits<S> {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Add a field edit, appending to the record's group if it already exists
    pub fn insert(&mut self, key: impl Into<String>, index: i32, value: S) {
        let key = key.into();
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => match group.fields.iter_mut().find(|(i, _)| *i == index) {
                Some(field) => field.1 = value,
                None => group.fields.push((index, value)),
            },
            None => self.groups.push(FieldGroup {
                key,
                fields: vec![(index, value)],
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[FieldGroup<S>] {
        &self.groups
    }

    pub(crate) fn value(&self, group: usize, entry: usize) -> Option<&S> {
        self.groups
            .get(group)
            .and_then(|g| g.fields.get(entry))
            .map(|(_, v)| v)
    }

    pub(crate) fn value_mut(&mut self, group: usize, entry: usize) -> Option<&mut S> {
        self.groups
            .get_mut(group)
            .and_then(|g| g.fields.get_mut(entry))
            .map(|(_, v)| v)
    }
}

impl<S> Default for FieldEdits<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// The full set of changes a data patch makes
#[derive(Debug, Clone, PartialEq)]
pub struct EditSpecification<S = TokenString> {
    pub records: Option<RecordEdits<S>>,
    pub fields: Option<FieldEdits<S>>,
}

impl<S> EditSpecification<S> {
    /// Create an empty specification
    pub fn new() -> Self {
        Self {
            records: None,
            fields: None,
        }
    }

    pub fn from_parts(records: Option<RecordEdits<S>>, fields: Option<FieldEdits<S>>) -> Self {
        Self { records, fields }
    }

    /// Add or replace a whole record
    pub fn with_record(mut self, key: impl Into<String>, value: impl Into<S>) -> Self {
        self.records
            .get_or_insert_with(RecordEdits::new)
            .insert(key, Some(value.into()));
        self
    }

    /// Remove a record
    pub fn with_removal(mut self, key: impl Into<String>) -> Self {
        self.records
            .get_or_insert_with(RecordEdits::new)
            .insert(key, None);
        self
    }

    /// Replace one field of a record
    pub fn with_field(mut self, key: impl Into<String>, index: i32, value: impl Into<S>) -> Self {
        self.fields
            .get_or_insert_with(FieldEdits::new)
            .insert(key, index, value.into());
        self
    }

    /// Whether the specification makes no changes
    pub fn is_empty(&self) -> bool {
        self.records.as_ref().map_or(true, RecordEdits::is_empty)
            && self.fields.as_ref().map_or(true, FieldEdits::is_empty)
    }

    /// Every value in the specification, records first
    pub fn values(&self) -> impl Iterator<Item = &S> {
        let records = self
            .records
            .iter()
            .flat_map(|r| r.entries.iter().filter_map(|(_, v)| v.as_ref()));
        let fields = self
            .fields
            .iter()
            .flat_map(|f| f.groups.iter().flat_map(|g| g.fields.iter().map(|(_, v)| v)));
        records.chain(fields)
    }
}

impl<S> Default for EditSpecification<S> {
    fn default() -> Self {
        Self::new()
    }
}
