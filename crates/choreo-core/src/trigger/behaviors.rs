//! Behaviours built on the trigger registry: section anchoring and
//! "in view" flags for fade-in transitions.

use std::cell::Cell;
use std::rc::Rc;

use super::options::TriggerOptions;
use super::registry::{TriggerEvent, TriggerHandle, TriggerRegistry};
use crate::geometry::Rect;
use crate::ids::ElementId;

/// Scroll position that puts `element`'s top `offset` below the viewport top
#[inline]
pub fn anchor_position(element: &Rect, offset: f64) -> f64 {
    element.top - offset
}

/// Shared boolean that follows a trigger's enter/leave state
#[derive(Debug, Clone, Default)]
pub struct InViewFlag(Rc<Cell<bool>>);

impl InViewFlag {
    #[inline]
    pub fn get(&self) -> bool {
        self.0.get()
    }
}

impl TriggerRegistry {
    /// Keep an [`InViewFlag`] in sync with `element`'s intersection state
    pub fn track_in_view(
        &self,
        element: ElementId,
        rect: Rect,
        options: TriggerOptions,
    ) -> (TriggerHandle, InViewFlag) {
        let flag = InViewFlag::default();
        let on_enter = {
            let flag = flag.0.clone();
            move |_: &TriggerEvent| flag.set(true)
        };
        let on_leave = {
            let flag = flag.0.clone();
            move |_: &TriggerEvent| flag.set(false)
        };
        let handle = self.register(element, rect, options, on_enter, on_leave);
        (handle, flag)
    }

    /// Call `on_anchor` with the anchored scroll position each time
    /// `element` enters the band described by `options`
    pub fn anchor<F>(
        &self,
        element: ElementId,
        rect: Rect,
        options: TriggerOptions,
        offset: f64,
        mut on_anchor: F,
    ) -> TriggerHandle
    where
        F: FnMut(f64) + 'static,
    {
        self.register(
            element,
            rect,
            options,
            move |event: &TriggerEvent| on_anchor(anchor_position(&event.rect, offset)),
            |_: &TriggerEvent| {},
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_in_view_flag_follows_state() {
        let registry = TriggerRegistry::new();
        let (_handle, flag) = registry.track_in_view(
            ElementId(3),
            Rect::new(0.0, 150.0, 100.0, 50.0),
            TriggerOptions::new(0.5, "0px").unwrap(),
        );
        assert!(!flag.get());

        registry.observe(Rect::new(0.0, 100.0, 100.0, 100.0));
        assert!(flag.get());

        registry.observe(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(!flag.get());
    }

    #[test]
    fn test_anchor_reports_target_position() {
        let registry = TriggerRegistry::new();
        let anchored = Rc::new(RefCell::new(Vec::new()));
        let _handle = {
            let anchored = anchored.clone();
            registry.anchor(
                ElementId(9),
                Rect::new(0.0, 400.0, 100.0, 300.0),
                TriggerOptions::new(0.3, "0px").unwrap(),
                48.0,
                move |position| anchored.borrow_mut().push(position),
            )
        };

        registry.observe(Rect::new(0.0, 350.0, 100.0, 200.0));
        assert_eq!(*anchored.borrow(), vec![352.0]);
    }
}
