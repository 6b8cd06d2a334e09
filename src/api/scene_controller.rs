use tracing::debug;

use crate::error::SceneResult;
use crate::render::SurfaceBackend;
use crate::shape::{Element, ElementId, Group, PropValue, Shape, ShapePatch};

use super::SceneEngine;

impl<B: SurfaceBackend> SceneEngine<B> {
    /// Adds a root shape. Re-adding a registered shape is a no-op.
    pub fn add_shape(&mut self, shape: Shape) -> SceneResult<ElementId> {
        self.add_element(shape)
    }

    /// Adds a root group together with every child it was built with.
    pub fn add_group(&mut self, group: Group) -> SceneResult<ElementId> {
        self.add_element(group)
    }

    /// Appends a shape or group under an already registered group.
    pub fn add_child(
        &mut self,
        parent: ElementId,
        element: impl Into<Element>,
    ) -> SceneResult<ElementId> {
        self.ensure_live()?;
        let id = self.storage.add_child(parent, element)?;
        self.needs_refresh = true;
        Ok(id)
    }

    fn add_element(&mut self, element: impl Into<Element>) -> SceneResult<ElementId> {
        self.ensure_live()?;
        let id = self.storage.add_root(element)?;
        self.needs_refresh = true;
        Ok(id)
    }

    /// Removes a shape, stopping any clip that animates it.
    pub fn remove_shape(&mut self, id: ElementId) -> SceneResult<&mut Self> {
        self.remove_element(id)
    }

    /// Removes a group with all of its descendants.
    pub fn remove_group(&mut self, id: ElementId) -> SceneResult<&mut Self> {
        self.remove_element(id)
    }

    fn remove_element(&mut self, id: ElementId) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.storage.remove(id)?;
        let stopped = self.scheduler.stop_target(id);
        if stopped > 0 {
            debug!(%id, stopped, "stopped clips of removed element");
        }
        self.needs_refresh = true;
        self.needs_hover_refresh = true;
        Ok(self)
    }

    /// Removes several elements; ids that are not registered are skipped.
    pub fn remove_many(&mut self, ids: &[ElementId]) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.storage.remove_many(ids)?;
        for id in ids {
            self.scheduler.stop_target(*id);
        }
        self.needs_refresh = true;
        self.needs_hover_refresh = true;
        Ok(self)
    }

    /// Removes every element. Running clips are left to cancel themselves
    /// on the next tick.
    pub fn clear(&mut self) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.storage.clear()?;
        self.needs_refresh = true;
        self.needs_hover_refresh = true;
        Ok(self)
    }

    /// Applies a partial update to a shape or group.
    pub fn modify_shape(&mut self, id: ElementId, patch: &ShapePatch) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.storage.mutate(id, patch)?;
        self.needs_refresh = true;
        if self.storage.is_hovered(id) {
            self.needs_hover_refresh = true;
        }
        Ok(self)
    }

    /// Sets one property by path, e.g. `style.x` or `position`.
    pub fn set_property(
        &mut self,
        id: ElementId,
        path: &str,
        value: impl Into<PropValue>,
    ) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        let value = value.into();
        self.storage
            .update_element(id, |element| element.set_property(path, &value))??;
        self.needs_refresh = true;
        Ok(self)
    }

    /// Runs `update` against a registered shape and marks its layer dirty.
    pub fn update_shape<R>(
        &mut self,
        id: ElementId,
        update: impl FnOnce(&mut Shape) -> R,
    ) -> SceneResult<R> {
        self.ensure_live()?;
        let result = self.storage.update_shape(id, update)?;
        self.needs_refresh = true;
        Ok(result)
    }

    #[must_use]
    pub fn get_property(&self, id: ElementId, path: &str) -> Option<PropValue> {
        self.storage.get(id)?.get_property(path)
    }

    #[must_use]
    pub fn shape(&self, id: ElementId) -> Option<&Shape> {
        self.storage.shape(id)
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.storage.contains(id)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.storage.len()
    }

    /// Topmost hittable shape under a viewport point, honouring layer
    /// pan/zoom.
    pub fn hit_test(&mut self, x: f64, y: f64) -> SceneResult<Option<ElementId>> {
        self.ensure_live()?;
        self.storage.paint_list();
        Ok(self.handler.find_hover(&self.storage, self.painter.views(), x, y))
    }

    /// Adds a shape to the hover overlay without moving the pointer.
    pub fn add_hover(&mut self, id: ElementId) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.storage.add_hover(id);
        self.needs_hover_refresh = true;
        Ok(self)
    }

    pub fn clear_hover(&mut self) -> SceneResult<&mut Self> {
        self.ensure_live()?;
        self.storage.clear_hover();
        self.needs_hover_refresh = true;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{EngineConfig, SceneEngine};
    use crate::core::Viewport;
    use crate::error::SceneError;
    use crate::render::NullBackend;
    use crate::shape::{Group, Shape, ShapePatch};

    fn engine() -> SceneEngine<NullBackend> {
        SceneEngine::new(NullBackend::new(), EngineConfig::new(Viewport::new(100, 100)))
            .expect("engine")
    }

    #[test]
    fn mutators_chain_and_request_a_frame() {
        let mut engine = engine();
        let a = engine.add_shape(Shape::circle(10.0, 10.0, 5.0)).expect("add");
        let b = engine.add_shape(Shape::rect(0.0, 0.0, 5.0, 5.0)).expect("add");
        engine.render().expect("render");
        assert!(!engine.needs_refresh());
        engine
            .modify_shape(a, &ShapePatch::new().position(3.0, 4.0))
            .expect("modify")
            .remove_shape(b)
            .expect("remove");
        assert!(engine.needs_refresh());
        assert_eq!(engine.element_count(), 1);
    }

    #[test]
    fn groups_register_their_children() {
        let mut engine = engine();
        let child = Shape::circle(0.0, 0.0, 1.0);
        let child_id = child.id();
        let group = engine
            .add_group(Group::new().with_child(child))
            .expect("group");
        assert!(engine.contains(child_id));
        engine.remove_group(group).expect("remove");
        assert!(!engine.contains(child_id));
        assert!(matches!(
            engine.remove_shape(child_id),
            Err(SceneError::MissingTarget(_))
        ));
    }
}
