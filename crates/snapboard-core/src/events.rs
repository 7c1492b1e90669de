//! Lifecycle notifications for the host.

use crate::element::ElementId;
use crate::group::GroupId;
use crate::handles::Anchor;
use crate::session::InteractionKind;
use kurbo::{Rect, Vec2};
use std::fmt;

/// A state transition the host may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    DragStarted { element: ElementId },
    DragMoved { element: ElementId, bounds: Rect },
    DragEnded { element: ElementId, bounds: Rect },
    ResizeStarted { element: ElementId, anchor: Anchor },
    ResizeMoved { element: ElementId, bounds: Rect },
    ResizeEnded { element: ElementId, bounds: Rect },
    MultiDragStarted { elements: Vec<ElementId> },
    MultiDragMoved { delta: Vec2 },
    MultiDragEnded { elements: Vec<ElementId> },
    GroupDragStarted { group: GroupId },
    GroupDragMoved { group: GroupId, delta: Vec2 },
    GroupDragEnded { group: GroupId },
    GroupResizeStarted { group: GroupId, anchor: Anchor },
    GroupResized { group: GroupId, bounds: Rect },
    GroupResizeEnded { group: GroupId },
    GroupCreated { group: GroupId },
    GroupRemoved { group: GroupId },
    SelectionChanged { selected: Vec<ElementId> },
    InteractionCancelled { kind: InteractionKind },
}

/// Callback invoked synchronously for every event.
pub type Listener = Box<dyn FnMut(&EngineEvent)>;

/// Registered listeners, called in registration order.
#[derive(Default)]
pub struct Hooks {
    listeners: Vec<Listener>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&mut self, event: EngineEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").field("listeners", &self.listeners.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    #[test]
    fn test_listeners_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = Hooks::new();
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            hooks.subscribe(Box::new(move |_| log.borrow_mut().push(tag)));
        }
        hooks.emit(EngineEvent::GroupCreated { group: Uuid::new_v4() });
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(format!("{hooks:?}"), "Hooks { listeners: 2 }");
    }
}
