use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::displayable::DisplayableRef;

use super::scene::Scene;

/// Where a transition applies: the whole layer stack or a single layer.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TransitionScope {
    Root,
    Layer(String),
}

impl fmt::Display for TransitionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionScope::Root => f.write_str("the root"),
            TransitionScope::Layer(l) => write!(f, "layer `{l}`"),
        }
    }
}

/// Displayable produced by a transition, with how long it runs.
pub struct TransitionNode {
    pub displayable: DisplayableRef,
    pub delay: f64,
}

/// A factory blending the old composite into the new one.
pub trait Transition {
    /// `None` when the transition cannot be built for these inputs.
    fn apply(&self, old: DisplayableRef, new: DisplayableRef) -> Option<TransitionNode>;

    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// An ongoing transition and the time it started. `None` until the first
/// frame of the interaction latches it.
#[derive(Clone)]
pub struct Ongoing {
    pub transition: Rc<dyn Transition>,
    pub from: DisplayableRef,
    pub start_time: Option<f64>,
}

/// Pending and ongoing transitions per scope.
///
/// `set` queues a transition for the next interaction. At the start of each
/// interaction `begin` promotes pending entries to ongoing, remembering the
/// scene they start from. An ongoing transition survives restarts of the
/// same interaction so it does not jump back to its first frame.
#[derive(Default)]
pub struct TransitionCoordinator {
    pending: BTreeMap<TransitionScope, Rc<dyn Transition>>,
    ongoing: BTreeMap<TransitionScope, Ongoing>,
}

impl TransitionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `transition` for `scope`; `None` cancels it.
    pub fn set(&mut self, scope: TransitionScope, transition: Option<Rc<dyn Transition>>) {
        match transition {
            Some(t) => {
                self.pending.insert(scope, t);
            }
            None => {
                self.pending.remove(&scope);
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, scope: &TransitionScope) -> bool {
        self.pending.contains_key(scope)
    }

    /// Promotes pending transitions. Scopes absent from `old_scene` have
    /// nothing to transition from and are dropped. When `suppress` is set
    /// every transition is discarded instead.
    pub fn begin(&mut self, old_scene: Option<&Scene>, suppress: bool) {
        let pending = std::mem::take(&mut self.pending);

        if suppress {
            self.ongoing.clear();
            return;
        }

        let Some(old_scene) = old_scene else {
            return;
        };

        for (scope, transition) in pending {
            let from = match &scope {
                TransitionScope::Root => Some(old_scene.root()),
                TransitionScope::Layer(l) => old_scene.layer(l),
            };
            if let Some(from) = from {
                self.ongoing.insert(
                    scope,
                    Ongoing {
                        transition,
                        from,
                        start_time: None,
                    },
                );
            }
        }
    }

    pub fn ongoing(&self, scope: &TransitionScope) -> Option<&Ongoing> {
        self.ongoing.get(scope)
    }

    pub fn has_ongoing(&self) -> bool {
        !self.ongoing.is_empty()
    }

    /// Gives every unstarted ongoing transition the start time `t`.
    pub fn latch(&mut self, t: f64) {
        for ongoing in self.ongoing.values_mut() {
            ongoing.start_time.get_or_insert(t);
        }
    }

    /// Drops ongoing transitions; called when an interaction ends.
    pub fn clear_ongoing(&mut self) {
        self.ongoing.clear();
    }
}
