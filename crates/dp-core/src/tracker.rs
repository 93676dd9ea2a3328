//! Tracking of the token strings in an edit specification that depend on context
//!
//! The set of tracked templates is fixed when the tracker is built. Only the
//! values inside them change afterwards.

use crate::edit::EditSpecification;
use crate::token::{Context, Resolvable};

/// Location of one template inside an [`EditSpecification`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateSlot {
    /// Value of the record edit at this position
    Record(usize),
    /// Value of a field edit: group position, then entry position
    Field(usize, usize),
}

/// Remembers which templates are mutable and refreshes only those
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableTemplateTracker {
    slots: Vec<TemplateSlot>,
}

impl MutableTemplateTracker {
    /// Scan record values, then field values, keeping the mutable ones
    pub fn new<S: Resolvable>(spec: &EditSpecification<S>) -> Self {
        let mut slots = Vec::new();

        if let Some(records) = &spec.records {
            for (i, (_, value)) in records.iter().enumerate() {
                if value.is_some_and(Resolvable::is_mutable) {
                    slots.push(TemplateSlot::Record(i));
                }
            }
        }

        if let Some(fields) = &spec.fields {
            for (g, group) in fields.groups().iter().enumerate() {
                for (e, (_, value)) in group.fields.iter().enumerate() {
                    if value.is_mutable() {
                        slots.push(TemplateSlot::Field(g, e));
                    }
                }
            }
        }

        Self { slots }
    }

    pub fn slots(&self) -> &[TemplateSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Re-evaluate every tracked template, returning whether any value changed
    pub fn update_context<S: Resolvable>(
        &self,
        spec: &mut EditSpecification<S>,
        context: &dyn Context,
    ) -> bool {
        let mut changed = false;
        for slot in &self.slots {
            if let Some(value) = slot_mut(spec, *slot) {
                // no short-circuit: every value must stay current
                changed |= value.update_context(context);
            }
        }
        changed
    }

    /// Whether every tracked template could be fully resolved
    pub fn is_ready<S: Resolvable>(&self, spec: &EditSpecification<S>) -> bool {
        self.templates(spec).all(Resolvable::is_ready)
    }

    /// Names of all tokens referenced by tracked templates
    pub fn tokens_used<'a, S: Resolvable>(
        &'a self,
        spec: &'a EditSpecification<S>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.templates(spec).flat_map(|t| t.tokens())
    }

    fn templates<'a, S: Resolvable>(
        &'a self,
        spec: &'a EditSpecification<S>,
    ) -> impl Iterator<Item = &'a S> + 'a {
        self.slots.iter().filter_map(move |slot| slot_ref(spec, *slot))
    }
}

fn slot_ref<S>(spec: &EditSpecification<S>, slot: TemplateSlot) -> Option<&S> {
    match slot {
        TemplateSlot::Record(i) => spec.records.as_ref()?.value(i),
        TemplateSlot::Field(g, e) => spec.fields.as_ref()?.value(g, e),
    }
}

fn slot_mut<S>(spec: &mut EditSpecification<S>, slot: TemplateSlot) -> Option<&mut S> {
    match slot {
        TemplateSlot::Record(i) => spec.records.as_mut()?.value_mut(i),
        TemplateSlot::Field(g, e) => spec.fields.as_mut()?.value_mut(g, e),
    }
}
