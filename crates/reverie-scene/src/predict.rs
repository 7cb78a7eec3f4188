//! Cooperative image prediction.
//!
//! [`Prediction`] walks a displayable tree one node at a time and feeds the
//! image names it finds to an [`ImageCache`]. The interaction loop steps it
//! only while idle, so the amount of work between two input checks stays
//! bounded.

use std::collections::{HashSet, VecDeque};

use crate::displayable::{DisplayableId, DisplayableRef};
use crate::hooks::ImageCache;

pub struct Prediction {
    /// Keeps every visited node alive so pointer identities stay unique.
    _visited: Vec<DisplayableRef>,
    stack: Vec<DisplayableRef>,
    seen: HashSet<DisplayableId>,
    names: VecDeque<String>,
}

impl Prediction {
    pub fn new(roots: impl IntoIterator<Item = DisplayableRef>) -> Self {
        let roots: Vec<_> = roots.into_iter().collect();
        let stack = roots.iter().rev().cloned().collect();
        Self {
            _visited: roots,
            stack,
            seen: HashSet::new(),
            names: VecDeque::new(),
        }
    }

    /// Images to load before anything found in the tree.
    pub fn with_preloads(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.names.extend(names);
        self
    }

    /// Performs one unit of work: preloads one image or visits one node.
    /// Returns false once there is nothing left to do.
    pub fn step(&mut self, cache: &mut dyn ImageCache) -> bool {
        if let Some(name) = self.names.pop_front() {
            cache.preload(&name);
            return true;
        }

        while let Some(d) = self.stack.pop() {
            if !self.seen.insert(DisplayableId::of(&d)) {
                continue;
            }

            let mut names = Vec::new();
            d.predict(&mut names);
            self.names.extend(names);
            self.stack.extend(d.visit().into_iter().rev().flatten());
            self._visited.push(d);
            return true;
        }

        false
    }

    pub fn is_done(&self) -> bool {
        self.stack.is_empty() && self.names.is_empty()
    }
}
