use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::options::TriggerOptions;
use crate::geometry::Rect;
use crate::ids::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Enter,
    Leave,
}

/// A threshold crossing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub element: ElementId,
    pub kind: TriggerKind,
    /// Intersection ratio that caused the crossing
    pub ratio: f64,
    /// Element rectangle at the time of the crossing
    pub rect: Rect,
    /// Root rectangle after applying the root margin
    pub root: Rect,
}

type TriggerCallback = Box<dyn FnMut(&TriggerEvent)>;

struct Region {
    id: u64,
    element: ElementId,
    rect: Rect,
    options: TriggerOptions,
    is_intersecting: bool,
    on_enter: Option<TriggerCallback>,
    on_leave: Option<TriggerCallback>,
}

impl Region {
    /// New intersection state if it differs from the current one
    fn evaluate(&mut self, root: &Rect) -> Option<TriggerEvent> {
        let root = root.expand(&self.options.root_margin);
        let ratio = self.rect.intersection_ratio(&root);
        let intersecting = ratio > 0.0 && ratio >= self.options.threshold;
        if intersecting == self.is_intersecting {
            return None;
        }
        self.is_intersecting = intersecting;
        Some(TriggerEvent {
            element: self.element,
            kind: if intersecting {
                TriggerKind::Enter
            } else {
                TriggerKind::Leave
            },
            ratio,
            rect: self.rect,
            root,
        })
    }
}

#[derive(Default)]
struct RegistryInner {
    regions: Vec<Region>,
    next_id: u64,
    root: Option<Rect>,
    /// Some rect changed since the last observation
    dirty: bool,
}

/// Element-bound viewport watchers of one root
///
/// Cloning shares the registry. Callbacks run outside the registry borrow,
/// so they may register or unregister triggers themselves.
#[derive(Clone, Default)]
pub struct TriggerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `element`; fires `on_enter` right away if it already intersects
    /// the last observed root
    pub fn register<E, L>(
        &self,
        element: ElementId,
        rect: Rect,
        options: TriggerOptions,
        on_enter: E,
        on_leave: L,
    ) -> TriggerHandle
    where
        E: FnMut(&TriggerEvent) + 'static,
        L: FnMut(&TriggerEvent) + 'static,
    {
        let (id, initial) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            let mut region = Region {
                id,
                element,
                rect,
                options,
                is_intersecting: false,
                on_enter: Some(Box::new(on_enter)),
                on_leave: Some(Box::new(on_leave)),
            };
            let initial = inner.root.and_then(|root| region.evaluate(&root));
            inner.regions.push(region);
            debug!(%element, trigger = id, total = inner.regions.len(), "Trigger registered");
            (id, initial)
        };

        if let Some(event) = initial {
            self.dispatch(vec![(id, event)]);
        }

        TriggerHandle {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Report a new rectangle for every trigger on `element`
    pub fn update_rect(&self, element: ElementId, rect: Rect) {
        let mut inner = self.inner.borrow_mut();
        for region in inner.regions.iter_mut().filter(|r| r.element == element) {
            if region.rect != rect {
                region.rect = rect;
            }
        }
        inner.dirty = true;
    }

    /// Evaluate every trigger against `root` in one pass
    ///
    /// Skips the pass entirely when neither the root nor any rectangle
    /// changed since the last call. Returns the crossings, which are also
    /// delivered to the registered callbacks.
    pub fn observe(&self, root: Rect) -> Vec<TriggerEvent> {
        let fired: Vec<(u64, TriggerEvent)> = {
            let mut inner = self.inner.borrow_mut();
            if inner.root == Some(root) && !inner.dirty {
                return Vec::new();
            }
            inner.root = Some(root);
            inner.dirty = false;
            inner
                .regions
                .iter_mut()
                .filter_map(|region| region.evaluate(&root).map(|event| (region.id, event)))
                .collect()
        };

        let events = fired.iter().map(|(_, event)| *event).collect();
        self.dispatch(fired);
        events
    }

    fn dispatch(&self, fired: Vec<(u64, TriggerEvent)>) {
        for (id, event) in fired {
            trace!(element = %event.element, kind = ?event.kind, ratio = event.ratio, "Trigger fired");
            let callback = {
                let mut inner = self.inner.borrow_mut();
                inner.regions.iter_mut().find(|r| r.id == id).and_then(|r| match event.kind {
                    TriggerKind::Enter => r.on_enter.take(),
                    TriggerKind::Leave => r.on_leave.take(),
                })
            };
            // Unregistered by an earlier callback in this batch
            let Some(mut callback) = callback else {
                continue;
            };

            callback(&event);

            let leftover = {
                let mut inner = self.inner.borrow_mut();
                match inner.regions.iter_mut().find(|r| r.id == id) {
                    Some(region) => {
                        match event.kind {
                            TriggerKind::Enter => region.on_enter = Some(callback),
                            TriggerKind::Leave => region.on_leave = Some(callback),
                        }
                        None
                    }
                    None => Some(callback),
                }
            };
            drop(leftover);
        }
    }

    /// Remove every trigger watching `element` (element unmounted)
    pub fn unregister_element(&self, element: ElementId) {
        let removed: Vec<Region> = {
            let mut inner = self.inner.borrow_mut();
            let (removed, kept) = std::mem::take(&mut inner.regions)
                .into_iter()
                .partition(|r| r.element == element);
            inner.regions = kept;
            removed
        };
        if !removed.is_empty() {
            debug!(%element, count = removed.len(), "Triggers unregistered");
        }
    }

    /// Remove every trigger
    pub fn clear(&self) {
        let removed = std::mem::take(&mut self.inner.borrow_mut().regions);
        drop(removed);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().regions.is_empty()
    }

    /// Current state of the first trigger on `element`
    pub fn is_intersecting(&self, element: ElementId) -> Option<bool> {
        self.inner
            .borrow()
            .regions
            .iter()
            .find(|r| r.element == element)
            .map(|r| r.is_intersecting)
    }
}

/// Handle to one trigger; dropping it unregisters the trigger
pub struct TriggerHandle {
    id: u64,
    registry: Weak<RefCell<RegistryInner>>,
}

impl TriggerHandle {
    pub fn unregister(self) {}

    /// False once the trigger was removed by any path
    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .map(|inner| inner.borrow().regions.iter().any(|r| r.id == self.id))
            .unwrap_or(false)
    }
}

impl Drop for TriggerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            let removed = {
                let mut inner = inner.borrow_mut();
                inner
                    .regions
                    .iter()
                    .position(|r| r.id == self.id)
                    .map(|pos| inner.regions.remove(pos))
            };
            drop(removed);
        }
    }
}

impl std::fmt::Debug for TriggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerHandle").field("id", &self.id).finish()
    }
}
