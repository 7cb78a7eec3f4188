use std::collections::HashMap;
use std::rc::Rc;

use reverie_engine::time::SharedClock;

use crate::displayable::{Displayable, DisplayableId, DisplayableRef, HideReason, TransformEvent};
use crate::widgets::{Animation, AttrList, Fixed, LayerTransform, Transform};

use super::{
    EntrySnapshot, ImageName, SceneConfig, SceneError, SceneListEntry, SceneSnapshot, ShownImages,
    is_lifecycle_tag,
};

// ── Continuity policy ─────────────────────────────────────────────────────

/// Decides whether re-showing a tag keeps the old transform running around
/// the new displayable.
pub trait TransformContinuity {
    fn continues(&self, old: &dyn Displayable, new: &dyn Displayable) -> bool;
}

/// Continues when the old displayable is a transform and the new one is not.
#[derive(Debug, Default, Clone, Copy)]
pub struct WrapsTransform;

impl TransformContinuity for WrapsTransform {
    fn continues(&self, old: &dyn Displayable, new: &dyn Displayable) -> bool {
        old.as_transform().is_some() && new.as_transform().is_none()
    }
}

// ── ShowArgs ──────────────────────────────────────────────────────────────

/// Options for [`SceneLists::add`].
#[derive(Clone, Default)]
pub struct ShowArgs {
    pub tag: Option<String>,
    pub zorder: i32,
    /// Tags at the same zorder the new entry is placed behind.
    pub behind: Vec<String>,
    /// Transforms wrapped around the displayable, innermost first.
    pub at_list: AttrList,
    pub name: Option<ImageName>,
    /// Animation applied through an extra transform.
    pub atl: Option<Rc<dyn Animation>>,
    /// Wraps a newly shown tag that has no at-list.
    pub default_transform: Option<Rc<dyn LayerTransform>>,
    /// Remove this tag when the current interaction ends.
    pub transient: bool,
}

impl ShowArgs {
    pub fn tagged(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn zorder(mut self, zorder: i32) -> Self {
        self.zorder = zorder;
        self
    }

    pub fn behind(mut self, tags: &[&str]) -> Self {
        self.behind = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn at(mut self, transform: Rc<dyn LayerTransform>) -> Self {
        self.at_list.push(transform);
        self
    }

    /// Sets the image name from its space-separated form.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.split_whitespace().map(String::from).collect());
        self
    }

    pub fn atl(mut self, animation: Rc<dyn Animation>) -> Self {
        self.atl = Some(animation);
        self
    }

    pub fn default_transform(mut self, transform: Rc<dyn LayerTransform>) -> Self {
        self.default_transform = Some(transform);
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

// ── SceneLists ────────────────────────────────────────────────────────────

/// Per-layer ordered entries plus the bookkeeping that goes with them.
///
/// Cloning is cheap: layers are shared until one side mutates them.
#[derive(Clone)]
pub struct SceneLists {
    config: Rc<SceneConfig>,
    clock: SharedClock,
    continuity: Rc<dyn TransformContinuity>,

    layers: HashMap<String, Rc<Vec<SceneListEntry>>>,
    at_list: HashMap<String, HashMap<String, AttrList>>,
    layer_at_list: HashMap<String, (Option<f64>, AttrList)>,
    shown: ShownImages,
    additional_transient: Vec<(String, String)>,

    shown_window: bool,
    focused: Option<DisplayableId>,
}

impl SceneLists {
    pub fn new(config: Rc<SceneConfig>, clock: SharedClock) -> Self {
        let mut layers = HashMap::new();
        let mut at_list = HashMap::new();
        let mut layer_at_list = HashMap::new();

        for layer in config.all_layers() {
            layers.insert(layer.clone(), Rc::new(Vec::new()));
            at_list.insert(layer.clone(), HashMap::new());
            layer_at_list.insert(layer.clone(), (None, Vec::new()));
        }

        Self {
            config,
            clock,
            continuity: Rc::new(WrapsTransform),
            layers,
            at_list,
            layer_at_list,
            shown: ShownImages::default(),
            additional_transient: Vec::new(),
            shown_window: false,
            focused: None,
        }
    }

    pub fn set_continuity(&mut self, policy: Rc<dyn TransformContinuity>) {
        self.continuity = policy;
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The copy a new execution context starts from: overlay and transient
    /// content is dropped and focus is forgotten.
    pub fn fork(&self) -> Result<Self, SceneError> {
        let mut rv = self.clone();
        for layer in &self.config.overlay_layers {
            rv.clear(layer, false)?;
        }
        rv.replace_transient()?;
        rv.focused = None;
        Ok(rv)
    }

    fn list(&self, layer: &str) -> Result<&Rc<Vec<SceneListEntry>>, SceneError> {
        self.layers
            .get(layer)
            .ok_or_else(|| SceneError::InvalidLayer(layer.to_string()))
    }

    fn list_mut(&mut self, layer: &str) -> Result<&mut Vec<SceneListEntry>, SceneError> {
        self.layers
            .get_mut(layer)
            .map(Rc::make_mut)
            .ok_or_else(|| SceneError::InvalidLayer(layer.to_string()))
    }

    pub fn entries(&self, layer: &str) -> Result<&[SceneListEntry], SceneError> {
        Ok(self.list(layer)?.as_slice())
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Shows `thing` on `layer`, replacing whatever is showing under the same
    /// tag (or the same displayable, when untagged).
    pub fn add(&mut self, layer: &str, thing: DisplayableRef, args: ShowArgs) -> Result<(), SceneError> {
        let ShowArgs {
            tag,
            zorder,
            behind,
            at_list,
            name,
            atl,
            default_transform,
            transient,
        } = args;

        let list = self.list(layer)?;
        if let Some(tag) = tag.as_deref().filter(|t| is_lifecycle_tag(t)) {
            return Err(SceneError::ReservedTag(tag.to_string()));
        }

        // Exiting entries carry lifecycle tags, so purging them below does not
        // change which entry is superseded.
        let (_, remove_index) = find_index(list, tag.as_deref(), zorder, &behind, &thing);
        let old = remove_index.map(|i| list[i].clone());

        let mut wrapped = thing.clone();
        for t in &at_list {
            wrapped = wrap(t.as_ref(), wrapped)?;
        }
        if let Some(anim) = &atl {
            wrapped = Rc::new(Transform::new(wrapped).animated_rc(anim.clone()));
        }
        let plain = at_list.is_empty() && atl.is_none();

        let mut attr_time = None;
        let mut continued = false;

        match &old {
            Some(old) => {
                attr_time = old.attr_time;
                if let Some(old_t) = old.displayable.as_transform() {
                    if plain
                        && self.config.keep_running_transform
                        && self.continuity.continues(old.displayable.as_ref(), wrapped.as_ref())
                    {
                        wrapped = Rc::new(old_t.with_child(wrapped));
                        continued = true;
                    } else if let Some(new_t) = wrapped.as_transform() {
                        new_t.take_state(old_t);
                    }
                }
            }
            None => {
                if let (true, Some(dt)) = (plain, &default_transform) {
                    wrapped = wrap(dt.as_ref(), wrapped)?;
                }
            }
        }

        // Nothing past this point fails.
        if let Some(tag) = &tag {
            self.remove_hide_replaced(layer, tag)?;
            self.at_list
                .entry(layer.to_string())
                .or_default()
                .insert(tag.clone(), at_list);
            if transient {
                self.additional_transient.push((layer.to_string(), tag.clone()));
            }
        }

        if let Some(name) = &name {
            if let Some(key) = tag.as_deref().or(name.first().map(String::as_str)) {
                self.shown.predict_show(layer, key, name.clone());
            }
        }

        let (add_index, remove_index) =
            find_index(self.list(layer)?, tag.as_deref(), zorder, &behind, &thing);

        wrapped.set_transform_event(Some(if old.is_some() {
            TransformEvent::Replace
        } else {
            TransformEvent::Show
        }));
        wrapped.show();

        log::trace!(
            "add {layer}/{} zorder {zorder} at {add_index} (replacing {remove_index:?})",
            tag.as_deref().unwrap_or("-")
        );

        let entry = SceneListEntry {
            tag,
            zorder,
            show_time: None,
            attr_time,
            displayable: wrapped,
            name,
        };

        let list = self.list_mut(layer)?;
        list.insert(add_index, entry);

        if let Some(r) = remove_index {
            let r = if add_index <= r { r + 1 } else { r };
            if continued {
                // The old transform lives on inside the new entry.
                list.remove(r);
            } else {
                self.hide_or_replace(layer, r, HideReason::Replaced)?;
            }
        }

        Ok(())
    }

    /// Hides whatever is showing under `tag`. Missing tags are not an error.
    pub fn remove(&mut self, layer: &str, tag: &str) -> Result<(), SceneError> {
        let Some(index) = self
            .list(layer)?
            .iter()
            .position(|e| e.tag.as_deref() == Some(tag))
        else {
            return Ok(());
        };

        if let Some(tags) = self.at_list.get_mut(layer) {
            tags.remove(tag);
        }
        self.shown.predict_hide(layer, tag);
        self.hide_or_replace(layer, index, HideReason::Hide)
    }

    /// Hides the entry holding `d`, if any.
    pub fn remove_displayable(&mut self, layer: &str, d: &DisplayableRef) -> Result<(), SceneError> {
        let id = DisplayableId::of(d);
        let Some(index) = self.list(layer)?.iter().position(|e| e.id() == id) else {
            return Ok(());
        };

        if let Some(tag) = self.list(layer)?[index].tag.clone() {
            if let Some(tags) = self.at_list.get_mut(layer) {
                tags.remove(&tag);
            }
            self.shown.predict_hide(layer, &tag);
        }
        self.hide_or_replace(layer, index, HideReason::Hide)
    }

    /// Asks the entry at `index` to leave.
    ///
    /// A tagged entry whose displayable hands back a successor is rewritten
    /// in place under the lifecycle tag `reason$tag`; everything else is
    /// dropped from the layer.
    pub fn hide_or_replace(&mut self, layer: &str, index: usize, reason: HideReason) -> Result<(), SceneError> {
        let now = self.clock.now();
        let list = self.list_mut(layer)?;

        let Some(old) = list.get(index).cloned() else {
            return Ok(());
        };

        let Some(tag) = &old.tag else {
            list.remove(index);
            return Ok(());
        };

        let (st, at) = old.elapsed(now);
        match old.displayable.clone().hide(st, at, reason) {
            Some(successor) => {
                log::trace!("{layer}/{tag} exiting as {reason}${tag}");
                list[index] = SceneListEntry {
                    tag: Some(format!("{reason}${tag}")),
                    zorder: old.zorder,
                    show_time: old.show_time,
                    attr_time: old.attr_time,
                    displayable: successor,
                    name: None,
                };
            }
            None => {
                list.remove(index);
            }
        }

        Ok(())
    }

    /// Drops lingering exit entries for `tag`; a new show preempts them.
    fn remove_hide_replaced(&mut self, layer: &str, tag: &str) -> Result<(), SceneError> {
        let hide = format!("{}${tag}", HideReason::Hide);
        let replaced = format!("{}${tag}", HideReason::Replaced);

        let lingering = |e: &SceneListEntry| {
            e.tag
                .as_deref()
                .is_some_and(|t| t == hide || t == replaced)
        };

        if self.list(layer)?.iter().any(lingering) {
            self.list_mut(layer)?.retain(|e| !lingering(e));
        }
        Ok(())
    }

    /// Re-asks every exiting entry to hide and drops those that are done.
    pub fn remove_hidden(&mut self) {
        let now = self.clock.now();

        for list in self.layers.values_mut() {
            let exiting = list
                .iter()
                .any(|e| e.tag.as_deref().is_some_and(is_lifecycle_tag));
            if !exiting {
                continue;
            }

            let kept: Vec<SceneListEntry> = list
                .iter()
                .filter(|e| {
                    match e.tag.as_deref().and_then(HideReason::from_lifecycle_tag) {
                        Some(reason) => {
                            let (st, at) = e.elapsed(now);
                            e.displayable.clone().hide(st, at, reason).is_some()
                        }
                        None => true,
                    }
                })
                .cloned()
                .collect();

            *list = Rc::new(kept);
        }
    }

    /// Empties `layer`. With `hide`, entries go through their exit instead,
    /// last to first.
    pub fn clear(&mut self, layer: &str, hide: bool) -> Result<(), SceneError> {
        let len = self.list(layer)?.len();

        if hide {
            for i in (0..len).rev() {
                self.hide_or_replace(layer, i, HideReason::Hide)?;
            }
        } else {
            self.layers.insert(layer.to_string(), Rc::new(Vec::new()));
        }

        if let Some(tags) = self.at_list.get_mut(layer) {
            tags.clear();
        }
        self.shown.predict_scene(layer);
        self.layer_at_list
            .insert(layer.to_string(), (None, Vec::new()));
        Ok(())
    }

    /// Discards interaction-local content: transient layers and tags shown
    /// with [`ShowArgs::transient`].
    pub fn replace_transient(&mut self) -> Result<(), SceneError> {
        let config = Rc::clone(&self.config);
        for layer in &config.transient_layers {
            self.clear(layer, true)?;
        }

        for (layer, tag) in std::mem::take(&mut self.additional_transient) {
            self.remove(&layer, &tag)?;
        }
        Ok(())
    }

    /// Hides every non-exiting entry above the one tagged `tag` (or every
    /// entry, when `tag` is `None`).
    pub fn remove_above(&mut self, layer: &str, tag: Option<&str>) -> Result<(), SceneError> {
        let len = self.list(layer)?.len();

        for i in (0..len).rev() {
            let entry_tag = self.list(layer)?[i].tag.clone();
            if tag.is_some() && entry_tag.as_deref() == tag {
                break;
            }
            if entry_tag.as_deref().is_some_and(is_lifecycle_tag) {
                continue;
            }
            self.hide_or_replace(layer, i, HideReason::Hide)?;
        }
        Ok(())
    }

    /// Starts every unlatched timer at `time`. Called on the first frame of
    /// an interaction.
    pub fn set_times(&mut self, time: f64) {
        for (t, _) in self.layer_at_list.values_mut() {
            t.get_or_insert(time);
        }

        for list in self.layers.values_mut() {
            let unlatched = list
                .iter()
                .any(|e| e.show_time.is_none() || e.attr_time.is_none());
            if unlatched {
                *list = Rc::new(list.iter().map(|e| e.with_times(time)).collect());
            }
        }
    }

    /// Replaces the transforms applied to `layer` as a whole. Their timebase
    /// starts with the next interaction.
    pub fn set_layer_at_list(&mut self, layer: &str, at_list: AttrList) -> Result<(), SceneError> {
        self.list(layer)?;
        self.layer_at_list
            .insert(layer.to_string(), (None, at_list));
        Ok(())
    }

    // ── Composition ───────────────────────────────────────────────────────

    /// Builds the displayable for `layer`: its entries in a [`Fixed`], clipped
    /// if configured, then wrapped by each layer transform in turn.
    pub fn make_layer(&self, layer: &str) -> Result<DisplayableRef, SceneError> {
        let list = self.list(layer)?;

        let mut fixed = Fixed::layer(layer);
        for e in list.iter() {
            fixed.add_timed(e.displayable.clone(), e.show_time, e.attr_time);
        }
        let mut rv: DisplayableRef = Rc::new(fixed);

        if let Some(rect) = self.config.layer_clipping.get(layer) {
            let mut clipped = Fixed::clipped(*rect);
            clipped.add(rv);
            rv = Rc::new(clipped);
        }

        if let Some((time, at_list)) = self.layer_at_list.get(layer) {
            for t in at_list {
                let wrapped = wrap(t.as_ref(), rv)?;
                let mut anchor = Fixed::layer(layer);
                anchor.add_timed(wrapped, *time, *time);
                rv = Rc::new(anchor);
            }
        }

        Ok(rv)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn get_displayable_by_tag(&self, layer: &str, tag: &str) -> Option<DisplayableRef> {
        self.list(layer)
            .ok()?
            .iter()
            .find(|e| e.tag.as_deref() == Some(tag))
            .map(|e| e.displayable.clone())
    }

    pub fn get_displayable_by_name(&self, layer: &str, name: &[String]) -> Option<DisplayableRef> {
        self.list(layer)
            .ok()?
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
            .map(|e| e.displayable.clone())
    }

    /// Every displayable on every layer, bottom layer first.
    pub fn get_all_displayables(&self) -> Vec<DisplayableRef> {
        self.config
            .all_layers()
            .filter_map(|l| self.layers.get(l))
            .flat_map(|list| list.iter().map(|e| e.displayable.clone()))
            .collect()
    }

    pub fn transient_is_empty(&self) -> bool {
        self.config
            .transient_layers
            .iter()
            .all(|l| self.layers.get(l).is_none_or(|list| list.is_empty()))
    }

    pub fn showing(&self, layer: &str, name: &[String]) -> bool {
        self.shown.showing(layer, name)
    }

    pub fn shown(&self) -> &ShownImages {
        &self.shown
    }

    pub fn at_list(&self, layer: &str, tag: &str) -> Option<&AttrList> {
        self.at_list.get(layer)?.get(tag)
    }

    pub fn layer_at_time(&self, layer: &str) -> Option<f64> {
        self.layer_at_list.get(layer)?.0
    }

    pub fn shown_window(&self) -> bool {
        self.shown_window
    }

    pub fn set_shown_window(&mut self, shown: bool) {
        self.shown_window = shown;
    }

    pub fn focused(&self) -> Option<DisplayableId> {
        self.focused
    }

    pub fn set_focused(&mut self, focused: Option<DisplayableId>) {
        self.focused = focused;
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let layers = self
            .config
            .all_layers()
            .filter_map(|l| Some((l.clone(), self.layers.get(l)?)))
            .map(|(l, list)| {
                let entries = list
                    .iter()
                    .map(|e| EntrySnapshot {
                        tag: e.tag.clone(),
                        zorder: e.zorder,
                        show_time: e.show_time,
                        attr_time: e.attr_time,
                        name: e.name.clone(),
                        kind: e.displayable.kind().to_string(),
                    })
                    .collect();
                (l, entries)
            })
            .collect();

        SceneSnapshot {
            layers,
            shown: self.shown.clone(),
        }
    }

    /// Rebuilds an instance from a [`snapshot`](Self::snapshot), asking
    /// `resolve` for each entry's displayable.
    ///
    /// Exiting entries are dropped. An entry `resolve` cannot rebuild is an
    /// [`SceneError::InvalidDisplayable`].
    pub fn restore(
        snapshot: &SceneSnapshot,
        config: Rc<SceneConfig>,
        clock: SharedClock,
        mut resolve: impl FnMut(&EntrySnapshot) -> Option<DisplayableRef>,
    ) -> Result<Self, SceneError> {
        let mut rv = Self::new(config, clock);

        for (layer, saved) in &snapshot.layers {
            rv.list(layer)?;

            let mut entries = Vec::with_capacity(saved.len());
            for e in saved {
                if e.tag.as_deref().is_some_and(is_lifecycle_tag) {
                    continue;
                }
                let displayable = resolve(e).ok_or_else(|| {
                    SceneError::InvalidDisplayable(format!(
                        "no displayable for {layer}/{} ({})",
                        e.tag.as_deref().unwrap_or("-"),
                        e.kind
                    ))
                })?;
                entries.push(SceneListEntry {
                    tag: e.tag.clone(),
                    zorder: e.zorder,
                    show_time: e.show_time,
                    attr_time: e.attr_time,
                    displayable,
                    name: e.name.clone(),
                });
            }

            log::debug!("restored {} entries on {layer}", entries.len());
            rv.layers.insert(layer.clone(), Rc::new(entries));
        }

        rv.shown = snapshot.shown.clone();
        Ok(rv)
    }
}

fn wrap(t: &dyn LayerTransform, child: DisplayableRef) -> Result<DisplayableRef, SceneError> {
    t.wrap(child).ok_or_else(|| {
        SceneError::InvalidDisplayable(format!("`{}` did not wrap its child", t.describe()))
    })
}

/// Returns `(add_index, remove_index)` for showing `thing` on `list`.
///
/// The new entry goes before the first entry with a greater zorder, or
/// before a same-zorder entry whose tag is `tag` or listed in `behind`. The
/// superseded entry is the first one with the same tag, or, when untagged,
/// the one holding the same displayable.
fn find_index(
    list: &[SceneListEntry],
    tag: Option<&str>,
    zorder: i32,
    behind: &[String],
    thing: &DisplayableRef,
) -> (usize, Option<usize>) {
    let id = DisplayableId::of(thing);
    let mut add_index = None;
    let mut remove_index = None;

    for (i, e) in list.iter().enumerate() {
        if remove_index.is_none() {
            let matches = match tag {
                Some(tag) => e.tag.as_deref() == Some(tag),
                None => e.id() == id,
            };
            if matches {
                remove_index = Some(i);
            }
        }

        if add_index.is_none() {
            if e.zorder > zorder {
                add_index = Some(i);
            } else if e.zorder == zorder {
                let before = e
                    .tag
                    .as_deref()
                    .is_some_and(|t| Some(t) == tag || behind.iter().any(|b| b == t));
                if before {
                    add_index = Some(i);
                }
            }
        }
    }

    (add_index.unwrap_or(list.len()), remove_index)
}
