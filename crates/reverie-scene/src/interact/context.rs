use crate::scene::{SceneError, SceneLists};

/// One execution context: the Scene Lists it shows and its interaction
/// bookkeeping.
#[derive(Clone)]
pub struct Context {
    pub scene_lists: SceneLists,
    pub(crate) interacting: bool,
    runtime: f64,
}

impl Context {
    pub fn new(scene_lists: SceneLists) -> Self {
        Self {
            scene_lists,
            interacting: false,
            runtime: 0.0,
        }
    }

    /// A nested context sharing this one's scene, minus overlays, transient
    /// content and focus.
    pub fn fork(&self) -> Result<Self, SceneError> {
        Ok(Self::new(self.scene_lists.fork()?))
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Seconds spent inside interactions, summed.
    pub fn runtime(&self) -> f64 {
        self.runtime
    }

    pub(crate) fn add_runtime(&mut self, seconds: f64) {
        self.runtime += seconds.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ShowArgs;
    use crate::testing::scene_lists;
    use crate::widgets::Null;
    use std::rc::Rc;

    #[test]
    fn fork_starts_idle_with_its_own_lists() {
        let (sl, _) = scene_lists();
        let mut ctx = Context::new(sl);
        ctx.scene_lists
            .add("master", Rc::new(Null), ShowArgs::tagged("bg"))
            .unwrap();
        ctx.interacting = true;
        ctx.add_runtime(2.0);

        let mut nested = ctx.fork().unwrap();
        assert!(!nested.is_interacting());
        assert_eq!(nested.runtime(), 0.0);

        nested.scene_lists.remove("master", "bg").unwrap();
        assert_eq!(ctx.scene_lists.entries("master").unwrap().len(), 1);
    }
}
