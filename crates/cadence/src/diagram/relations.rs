//! Relations derived from the hierarchy, the ranges and the graphical ordering.
//!
//! Hierarchy-only relations (coverage, hierarchical parent, compound messages)
//! are memoized in the structural tier; everything that looks at vertical
//! positions goes through the range tier.

use std::sync::Arc;

use log::{trace, warn};

use cadence_core::{event::EventKind, identifier::Id, ordering::EndKind};

use super::SequenceDiagram;
use crate::{
    cache::IdList,
    error::{CadenceError, Result},
    model::ModelAccessor,
};

impl<M: ModelAccessor> SequenceDiagram<M> {
    /// Lifelines covered by a frame, in timeline order.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `frame`.
    pub fn covered_lifelines(&self, frame: Id) -> Result<IdList> {
        let caches = self.caches();
        caches
            .coverage()
            .get_or_try_compute(caches.structural_tier(), frame, || {
                self.ensure_attached(frame)?;
                let bounds = self
                    .model()
                    .geometry(frame)
                    .ok_or(CadenceError::UnknownElement(frame))?;
                let covered = self.graphically_covered_lifelines(bounds);
                trace!(frame:%, count = covered.len(); "Computed frame coverage");
                Ok(Arc::from(covered))
            })
    }

    /// Nearest ancestor that is a lifeline or a node event.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `id`.
    pub fn hierarchical_parent(&self, id: Id) -> Result<Option<Id>> {
        let caches = self.caches();
        caches
            .hierarchical_parent()
            .get_or_try_compute(caches.structural_tier(), id, || {
                let ancestors = self.attached_ancestors(id)?;
                Ok(ancestors.into_iter().find(|ancestor| {
                    self.model().kind(*ancestor).is_some_and(|kind| {
                        kind == EventKind::Lifeline || kind.is_node_event()
                    })
                }))
            })
    }

    /// Lifeline an element lives on. Messages use their source endpoint, then
    /// their target.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `id`.
    pub fn lifeline(&self, id: Id) -> Result<Option<Id>> {
        self.ensure_attached(id)?;
        Ok(self.lifelines_of(id).into_iter().next())
    }

    /// Message whose end shares a compound event end with the start of a node
    /// event, typically the call that triggers an execution.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `node`.
    pub fn start_compound_message(&self, node: Id) -> Result<Option<Id>> {
        let caches = self.caches();
        caches
            .start_compound_message()
            .get_or_try_compute(caches.structural_tier(), node, || {
                self.compound_message(node, EndKind::Start)
            })
    }

    /// Message whose end shares a compound event end with the finish of a node
    /// event, typically the reply leaving an execution.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `node`.
    pub fn end_compound_message(&self, node: Id) -> Result<Option<Id>> {
        let caches = self.caches();
        caches
            .end_compound_message()
            .get_or_try_compute(caches.structural_tier(), node, || {
                self.compound_message(node, EndKind::Finish)
            })
    }

    /// Events directly nested in `id`, in timeline order.
    ///
    /// For lifelines and node events these are the delimited children plus the
    /// messages leaving from them. For combined fragments they are the operands.
    /// For operands they are the outermost events whose parent operand is `id`.
    ///
    /// A child whose range escapes the range of `id` is reported and left out.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `id`.
    pub fn sub_events(&self, id: Id) -> Result<IdList> {
        let caches = self.caches();
        caches
            .sub_events()
            .get_or_try_compute(caches.range_tier(), id, || {
                let mut subs = self.collect_sub_events(id)?;
                self.range_index().sort(&mut subs);
                Ok(Arc::from(subs))
            })
    }

    /// Innermost container event whose range holds `id`.
    ///
    /// Messages are attached where they leave from: the deepest container on
    /// their source side holding the message start.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `id`.
    pub fn parent_event(&self, id: Id) -> Result<Option<Id>> {
        let caches = self.caches();
        caches
            .parent_event()
            .get_or_try_compute(caches.range_tier(), id, || {
                let range = self.vertical_range(id)?;
                let index = self.range_index();
                let is_container = |candidate: &Id| {
                    self.model()
                        .kind(*candidate)
                        .is_some_and(EventKind::is_container_event)
                };

                if self.model().kind(id) == Some(EventKind::Message) {
                    let Some((source, _)) = self.model().edge_ends(id) else {
                        return Ok(None);
                    };
                    let mut chain = vec![source];
                    chain.extend(index.ancestors(source).unwrap_or_default());
                    return Ok(chain.into_iter().filter(is_container).find(|candidate| {
                        index
                            .raw_range(*candidate)
                            .is_ok_and(|outer| outer.includes(range.lower()))
                    }));
                }

                let ancestors = self.attached_ancestors(id)?;
                Ok(ancestors.into_iter().filter(is_container).find(|candidate| {
                    index
                        .raw_range(*candidate)
                        .is_ok_and(|outer| outer.includes_range(range))
                }))
            })
    }

    /// Innermost operand holding `id`.
    ///
    /// An operand holds an event when its range contains the event range and
    /// its frame covers one of the lifelines of the event. Events that are on
    /// no lifeline only need the range condition.
    ///
    /// # Errors
    ///
    /// `UnknownElement` or `NotAttached` for an unresolvable `id`.
    pub fn parent_operand(&self, id: Id) -> Result<Option<Id>> {
        let caches = self.caches();
        caches
            .parent_operand()
            .get_or_try_compute(caches.range_tier(), id, || {
                let range = self.vertical_range(id)?;
                let own_frame = self.frame_of(id);
                let own_lifelines = match own_frame {
                    Some(frame) => self.covered_lifelines(frame)?.to_vec(),
                    None => self.lifelines_of(id),
                };

                let index = self.range_index();
                let mut best: Option<(Id, f32)> = None;
                for operand in self.all_operands().iter().copied() {
                    let frame = self.model().parent(operand);
                    if operand == id || (own_frame.is_some() && frame == own_frame) {
                        continue;
                    }
                    let Ok(operand_range) = index.raw_range(operand) else {
                        continue;
                    };
                    if !operand_range.includes_range(range) {
                        continue;
                    }
                    if !own_lifelines.is_empty() {
                        let covered = match frame {
                            Some(frame) => self.covered_lifelines(frame)?,
                            None => continue,
                        };
                        if !own_lifelines.iter().any(|lifeline| covered.contains(lifeline)) {
                            continue;
                        }
                    }
                    if best.is_none_or(|(_, width)| operand_range.width() < width) {
                        best = Some((operand, operand_range.width()));
                    }
                }
                Ok(best.map(|(operand, _)| operand))
            })
    }

    fn ensure_attached(&self, id: Id) -> Result<()> {
        if self.model().kind(id).is_none() {
            return Err(CadenceError::UnknownElement(id));
        }
        if !self.is_attached(id) {
            return Err(CadenceError::NotAttached(id));
        }
        Ok(())
    }

    fn attached_ancestors(&self, id: Id) -> Result<Vec<Id>> {
        self.ensure_attached(id)?;
        self.range_index()
            .ancestors(id)
            .ok_or(CadenceError::NotAttached(id))
    }

    /// The frame an element belongs to: itself for frames, the enclosing
    /// combined fragment for operands.
    fn frame_of(&self, id: Id) -> Option<Id> {
        match self.model().kind(id)? {
            kind if kind.is_frame() => Some(id),
            EventKind::Operand => self
                .model()
                .parent(id)
                .filter(|parent| self.model().kind(*parent).is_some_and(EventKind::is_frame)),
            _ => None,
        }
    }

    /// Lifelines of an element: its own lifeline, or the lifelines of both
    /// endpoints for a message.
    fn lifelines_of(&self, id: Id) -> Vec<Id> {
        let model = self.model();
        let index = self.range_index();
        // Endpoints whose chain never reaches the root have no lifeline.
        let enclosing_lifeline = |start: Id| {
            let ancestors = index.ancestors(start)?;
            std::iter::once(start)
                .chain(ancestors)
                .find(|candidate| model.kind(*candidate) == Some(EventKind::Lifeline))
        };

        if model.kind(id) == Some(EventKind::Message) {
            let Some((source, target)) = model.edge_ends(id) else {
                return Vec::new();
            };
            let mut lifelines: Vec<Id> = [source, target]
                .into_iter()
                .filter_map(enclosing_lifeline)
                .collect();
            lifelines.dedup();
            return lifelines;
        }
        enclosing_lifeline(id).into_iter().collect()
    }

    fn compound_message(&self, node: Id, end_kind: EndKind) -> Result<Option<Id>> {
        self.ensure_attached(node)?;
        if !self
            .model()
            .kind(node)
            .is_some_and(EventKind::is_node_event)
        {
            return Ok(None);
        }
        let Some(semantic) = self.model().semantic_target(node) else {
            return Ok(None);
        };

        let messages = self.all_messages();
        for end in self.find_ends(node) {
            if !end.is_compound() || end.kind_for(semantic) != Some(end_kind) {
                continue;
            }
            for partner in end.semantic_events().filter(|event| *event != semantic) {
                let message = messages.iter().copied().find(|message| {
                    self.model().semantic_target(*message) == Some(partner)
                        && self
                            .model()
                            .edge_ends(*message)
                            .is_some_and(|(source, target)| source == node || target == node)
                });
                if message.is_some() {
                    trace!(node:%, end_kind:%; "Found compound message");
                    return Ok(message);
                }
            }
        }
        Ok(None)
    }

    fn collect_sub_events(&self, id: Id) -> Result<Vec<Id>> {
        let range = self.vertical_range(id)?;
        let model = self.model();
        let Some(kind) = model.kind(id) else {
            return Err(CadenceError::UnknownElement(id));
        };

        if kind == EventKind::Operand {
            let mut subs = Vec::new();
            for event in self.all_ordered_delimited_sequence_events().iter().copied() {
                if event == id || self.parent_operand(event)? != Some(id) {
                    continue;
                }
                // Keep the outermost events only; nested ones belong to their
                // own parent event.
                let nested = match self.parent_event(event)? {
                    Some(parent) => {
                        model.kind(parent) != Some(EventKind::Lifeline)
                            && self
                                .range_index()
                                .raw_range(parent)
                                .is_ok_and(|outer| range.includes_range(outer))
                    }
                    None => false,
                };
                if !nested {
                    subs.push(event);
                }
            }
            return Ok(subs);
        }

        let mut subs = Vec::new();
        for child in model.children(id) {
            let Some(child_kind) = model.kind(child) else {
                continue;
            };
            if !child_kind.is_delimited() {
                continue;
            }
            let Ok(child_range) = self.range_index().raw_range(child) else {
                continue;
            };
            let contained = if child_kind == EventKind::EndOfLife {
                range.includes(child_range.lower())
            } else {
                range.includes_range(child_range)
            };
            if !contained {
                warn!(
                    parent:% = id,
                    child:% = child,
                    parent_range:% = range,
                    child_range:% = child_range;
                    "Sub-event escapes its parent range, ignoring it"
                );
                continue;
            }
            subs.push(child);
        }

        if kind == EventKind::Lifeline || kind.is_node_event() {
            for message in self.all_messages().iter().copied() {
                if self.parent_event(message)? == Some(id) {
                    subs.push(message);
                }
            }
        }
        Ok(subs)
    }
}
