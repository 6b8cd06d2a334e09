use std::collections::BTreeSet;
use std::rc::Rc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{Matrix, Vec2};
use crate::error::{SceneError, SceneResult};
use crate::shape::{ClipPath, Element, ElementId, Group, Shape, ShapePatch, Transformable};

/// A clip together with the world matrix of the space it is defined in.
#[derive(Debug, Clone)]
pub struct ClipRef {
    pub clip: Rc<ClipPath>,
    pub world: Matrix,
}

impl ClipRef {
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.clip.contains(&self.world, x, y)
    }
}

/// One flattened, paint-ordered primitive.
#[derive(Debug, Clone)]
pub struct PaintEntry {
    pub id: ElementId,
    pub z_tier: i32,
    pub z_order: f64,
    /// Depth-first visit index; breaks `(z_tier, z_order)` ties.
    pub sequence: usize,
    pub world: Matrix,
    /// Clips inherited from ancestor groups followed by the shape's own.
    pub clips: SmallVec<[ClipRef; 2]>,
}

impl PaintEntry {
    /// Whether every clip on the chain accepts the point.
    #[must_use]
    pub fn clips_accept(&self, x: f64, y: f64) -> bool {
        self.clips.iter().all(|clip| clip.contains(x, y))
    }
}

/// Owning container of the scene graph.
///
/// The id map is the single source of truth; the painter and handler only
/// read it through the derived paint list.
#[derive(Debug, Default)]
pub struct Storage {
    elements: IndexMap<ElementId, Element>,
    roots: Vec<ElementId>,
    paint_list: Vec<PaintEntry>,
    paint_list_stale: bool,
    hover: Vec<ElementId>,
    dirty_tiers: BTreeSet<i32>,
    drag_ghost: Option<ElementId>,
    disposed: bool,
}

impl Storage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            paint_list_stale: true,
            ..Self::default()
        }
    }

    fn ensure_live(&self) -> SceneResult<()> {
        if self.disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Inserts a root element. Adding an id that is already registered is a
    /// no-op.
    pub fn add_root(&mut self, element: impl Into<Element>) -> SceneResult<ElementId> {
        self.ensure_live()?;
        let element = element.into();
        let id = element.id();
        if self.elements.contains_key(&id) {
            debug!(%id, "element already registered, ignoring add");
            return Ok(id);
        }
        validate_tree(&element)?;
        self.register(element, None);
        self.roots.push(id);
        self.paint_list_stale = true;
        debug!(%id, elements = self.elements.len(), "root added");
        Ok(id)
    }

    /// Appends an element to a registered group.
    pub fn add_child(
        &mut self,
        parent: ElementId,
        element: impl Into<Element>,
    ) -> SceneResult<ElementId> {
        self.ensure_live()?;
        let element = element.into();
        let id = element.id();
        match self.elements.get(&parent) {
            Some(Element::Group(_)) => {}
            Some(Element::Shape(_)) => {
                return Err(SceneError::InvalidData(format!(
                    "element `{parent}` is not a group"
                )));
            }
            None => return Err(SceneError::MissingTarget(parent)),
        }
        if self.elements.contains_key(&id) {
            debug!(%id, "element already registered, ignoring add");
            return Ok(id);
        }
        validate_tree(&element)?;
        self.register(element, Some(parent));
        if let Some(Element::Group(group)) = self.elements.get_mut(&parent) {
            group.push_child_id(id);
        }
        self.paint_list_stale = true;
        Ok(id)
    }

    fn register(&mut self, mut element: Element, parent: Option<ElementId>) {
        let id = element.id();
        element.set_parent(parent);
        let pending = match &mut element {
            Element::Group(group) => group.take_pending(),
            Element::Shape(shape) => {
                self.dirty_tiers.insert(shape.z_tier);
                Vec::new()
            }
        };
        self.elements.insert(id, element);
        for child in pending {
            let child_id = child.id();
            if self.elements.contains_key(&child_id) {
                continue;
            }
            self.register(child, Some(id));
            if let Some(Element::Group(group)) = self.elements.get_mut(&id) {
                group.push_child_id(child_id);
            }
        }
    }

    /// Removes an element (root or nested) and every descendant.
    pub fn remove(&mut self, id: ElementId) -> SceneResult<()> {
        self.ensure_live()?;
        let Some(element) = self.elements.get(&id) else {
            return Err(SceneError::MissingTarget(id));
        };
        if let Some(parent) = element.parent() {
            if let Some(Element::Group(group)) = self.elements.get_mut(&parent) {
                group.remove_child_id(id);
            }
        }
        self.roots.retain(|root| *root != id);
        self.unregister(id);
        self.paint_list_stale = true;
        debug!(%id, elements = self.elements.len(), "element removed");
        Ok(())
    }

    /// Removes several elements; unknown ids are skipped.
    pub fn remove_many(&mut self, ids: &[ElementId]) -> SceneResult<()> {
        self.ensure_live()?;
        for id in ids {
            if self.elements.contains_key(id) {
                self.remove(*id)?;
            }
        }
        Ok(())
    }

    /// Removes everything.
    pub fn clear(&mut self) -> SceneResult<()> {
        self.ensure_live()?;
        for element in self.elements.values() {
            if let Element::Shape(shape) = element {
                self.dirty_tiers.insert(shape.z_tier);
            }
        }
        self.elements.clear();
        self.roots.clear();
        self.hover.clear();
        self.drag_ghost = None;
        self.paint_list_stale = true;
        Ok(())
    }

    fn unregister(&mut self, id: ElementId) {
        let Some(element) = self.elements.shift_remove(&id) else {
            return;
        };
        match element {
            Element::Shape(shape) => {
                self.dirty_tiers.insert(shape.z_tier);
            }
            Element::Group(group) => {
                for child in group.children() {
                    self.unregister(*child);
                }
            }
        }
        self.hover.retain(|hovered| *hovered != id);
        if self.drag_ghost == Some(id) {
            self.drag_ghost = None;
        }
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    #[must_use]
    pub fn shape(&self, id: ElementId) -> Option<&Shape> {
        self.elements.get(&id).and_then(Element::as_shape)
    }

    #[must_use]
    pub fn group(&self, id: ElementId) -> Option<&Group> {
        self.elements.get(&id).and_then(Element::as_group)
    }

    /// Applies a partial update and marks affected tiers dirty. Groups accept
    /// the transform fields only; their descendants are marked dirty.
    pub fn mutate(&mut self, id: ElementId, patch: &ShapePatch) -> SceneResult<()> {
        self.ensure_live()?;
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(SceneError::MissingTarget(id))?;
        match element {
            Element::Shape(shape) => {
                let mut updated = shape.clone();
                updated.apply_patch(patch)?;
                validate_shape(&updated)?;
                self.dirty_tiers.insert(shape.z_tier);
                self.dirty_tiers.insert(updated.z_tier);
                *shape = updated;
            }
            Element::Group(group) => {
                if let Some(position) = patch.position {
                    group.transform.position = position;
                }
                if let Some(rotation) = patch.rotation {
                    group.transform.rotation = rotation;
                }
                if let Some(scale) = patch.scale {
                    group.transform.scale = scale;
                }
                if let Some(ignore) = patch.ignore {
                    group.ignore = ignore;
                }
                self.mark_dirty(id);
            }
        }
        self.paint_list_stale = true;
        trace!(%id, "element mutated");
        Ok(())
    }

    /// Runs `update` on a shape, marking its tier (before and after) dirty.
    pub fn update_shape<R>(
        &mut self,
        id: ElementId,
        update: impl FnOnce(&mut Shape) -> R,
    ) -> SceneResult<R> {
        self.ensure_live()?;
        let Some(Element::Shape(shape)) = self.elements.get_mut(&id) else {
            return Err(SceneError::MissingTarget(id));
        };
        let before = shape.z_tier;
        let result = update(shape);
        shape.invalidate_bounds();
        let after = shape.z_tier;
        self.dirty_tiers.insert(before);
        self.dirty_tiers.insert(after);
        self.paint_list_stale = true;
        Ok(result)
    }

    /// Runs `update` on any element, marking every affected tier dirty.
    pub fn update_element<R>(
        &mut self,
        id: ElementId,
        update: impl FnOnce(&mut Element) -> R,
    ) -> SceneResult<R> {
        self.ensure_live()?;
        self.mark_dirty(id);
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(SceneError::MissingTarget(id))?;
        let result = update(element);
        if let Element::Shape(shape) = element {
            shape.invalidate_bounds();
        }
        self.mark_dirty(id);
        self.paint_list_stale = true;
        Ok(result)
    }

    /// Marks the tiers of a shape (or of every shape under a group) dirty.
    pub fn mark_dirty(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.elements.get(&current) {
                Some(Element::Shape(shape)) => {
                    self.dirty_tiers.insert(shape.z_tier);
                }
                Some(Element::Group(group)) => stack.extend(group.children().iter().copied()),
                None => {}
            }
        }
    }

    pub fn mark_tier_dirty(&mut self, z_tier: i32) {
        self.dirty_tiers.insert(z_tier);
    }

    #[must_use]
    pub fn is_tier_dirty(&self, z_tier: i32) -> bool {
        self.dirty_tiers.contains(&z_tier)
    }

    /// Drains the tiers marked dirty since the last call.
    pub fn take_dirty_tiers(&mut self) -> BTreeSet<i32> {
        std::mem::take(&mut self.dirty_tiers)
    }

    /// World matrix of an element: its ancestors' transforms composed with
    /// its own.
    #[must_use]
    pub fn world_matrix(&self, id: ElementId) -> Option<Matrix> {
        let element = self.elements.get(&id)?;
        let local = element.local_matrix();
        match element.parent() {
            Some(parent) => Some(self.world_matrix(parent)?.multiply(&local)),
            None => Some(local),
        }
    }

    /// Moves an element by a world-space delta.
    pub fn drift(&mut self, id: ElementId, dx: f64, dy: f64) -> SceneResult<()> {
        let parent_world = match self.get(id).and_then(Element::parent) {
            Some(parent) => self.world_matrix(parent).unwrap_or(Matrix::IDENTITY),
            None => Matrix::IDENTITY,
        };
        let delta = parent_world
            .invert()
            .map_or(Vec2::new(dx, dy), |inverse| {
                inverse.apply_vector(Vec2::new(dx, dy))
            });
        self.update_element(id, |element| element.drift(delta.x, delta.y))
    }

    /// Flattened, paint-ordered list, rebuilt when the scene changed.
    pub fn paint_list(&mut self) -> &[PaintEntry] {
        if self.paint_list_stale {
            self.rebuild_paint_list();
        }
        &self.paint_list
    }

    /// Paint list as of the last rebuild.
    #[must_use]
    pub fn cached_paint_list(&self) -> &[PaintEntry] {
        &self.paint_list
    }

    /// Walks the roots depth-first, skipping ignored subtrees, and stably
    /// sorts the collected shapes by `(z_tier, z_order)`.
    pub fn rebuild_paint_list(&mut self) {
        let mut list = Vec::with_capacity(self.elements.len());
        for root in &self.roots {
            self.collect(*root, Matrix::IDENTITY, &SmallVec::new(), &mut list);
        }
        list.sort_by_key(|entry| (entry.z_tier, OrderedFloat(entry.z_order)));
        self.paint_list = list;
        self.paint_list_stale = false;
        trace!(entries = self.paint_list.len(), "paint list rebuilt");
    }

    /// Paint entries of one subtree, in paint order and relative to the
    /// subtree root's parent space.
    #[must_use]
    pub fn subtree_paint_list(&self, id: ElementId) -> Vec<PaintEntry> {
        let mut list = Vec::new();
        self.collect(id, Matrix::IDENTITY, &SmallVec::new(), &mut list);
        list.sort_by_key(|entry| (entry.z_tier, OrderedFloat(entry.z_order)));
        list
    }

    fn collect(
        &self,
        id: ElementId,
        parent_world: Matrix,
        clips: &SmallVec<[ClipRef; 2]>,
        out: &mut Vec<PaintEntry>,
    ) {
        let Some(element) = self.elements.get(&id) else {
            return;
        };
        let world = parent_world.multiply(&element.local_matrix());
        match element {
            Element::Shape(shape) => {
                if shape.ignore {
                    return;
                }
                let mut clips = clips.clone();
                if let Some(clip) = &shape.clip {
                    clips.push(ClipRef {
                        clip: Rc::clone(clip),
                        world,
                    });
                }
                out.push(PaintEntry {
                    id,
                    z_tier: shape.z_tier,
                    z_order: shape.z_order,
                    sequence: out.len(),
                    world,
                    clips,
                });
            }
            Element::Group(group) => {
                if group.ignore {
                    return;
                }
                let mut clips = clips.clone();
                if let Some(clip) = &group.clip {
                    clips.push(ClipRef {
                        clip: Rc::clone(clip),
                        world,
                    });
                }
                for child in group.children() {
                    self.collect(*child, world, &clips, out);
                }
            }
        }
    }

    /// Adds a shape to the hover set.
    pub fn add_hover(&mut self, id: ElementId) {
        if self.elements.contains_key(&id) && !self.hover.contains(&id) {
            self.hover.push(id);
        }
    }

    pub fn clear_hover(&mut self) {
        self.hover.clear();
    }

    #[must_use]
    pub fn has_hover(&self) -> bool {
        !self.hover.is_empty()
    }

    #[must_use]
    pub fn hover_count(&self) -> usize {
        self.hover.len()
    }

    /// Whether a shape is hovered directly or through a hover link.
    #[must_use]
    pub fn is_hovered(&self, id: ElementId) -> bool {
        self.hover.iter().any(|hovered| {
            *hovered == id
                || self
                    .shape(*hovered)
                    .is_some_and(|shape| shape.hover_links.contains(&id))
        })
    }

    /// Hover set expanded with hover links, sorted by `(z_tier, z_order)`.
    pub fn hover_list(&mut self) -> Vec<PaintEntry> {
        let mut ids: Vec<ElementId> = Vec::with_capacity(self.hover.len());
        for hovered in &self.hover {
            if !ids.contains(hovered) {
                ids.push(*hovered);
            }
            if let Some(shape) = self.shape(*hovered) {
                for linked in &shape.hover_links {
                    if !ids.contains(linked) {
                        ids.push(*linked);
                    }
                }
            }
        }
        let mut list: Vec<PaintEntry> = self
            .paint_list()
            .iter()
            .filter(|entry| ids.contains(&entry.id))
            .cloned()
            .collect();
        list.sort_by_key(|entry| (entry.z_tier, OrderedFloat(entry.z_order)));
        list
    }

    /// Hides a shape from normal compositing while it is dragged.
    pub fn set_drag_ghost(&mut self, id: Option<ElementId>) {
        let tiers: SmallVec<[i32; 2]> = [self.drag_ghost, id]
            .into_iter()
            .flatten()
            .filter_map(|ghost| self.shape(ghost).map(|shape| shape.z_tier))
            .collect();
        self.dirty_tiers.extend(tiers);
        self.drag_ghost = id;
    }

    #[must_use]
    pub fn drag_ghost(&self) -> Option<ElementId> {
        self.drag_ghost
    }

    /// Drops every element and rejects later mutation. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.elements.clear();
        self.roots.clear();
        self.paint_list.clear();
        self.hover.clear();
        self.dirty_tiers.clear();
        self.drag_ghost = None;
        self.disposed = true;
        debug!("storage disposed");
    }
}

fn validate_shape(shape: &Shape) -> SceneResult<()> {
    shape
        .kind
        .validate()
        .and_then(|()| shape.style.validate())
        .map_err(|err| SceneError::Configuration {
            id: shape.id(),
            reason: err.to_string(),
        })
}

fn validate_tree(element: &Element) -> SceneResult<()> {
    match element {
        Element::Shape(shape) => validate_shape(shape),
        Element::Group(group) => group.pending().iter().try_for_each(validate_tree),
    }
}
