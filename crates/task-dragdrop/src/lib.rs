//! Task DragDrop State Machine
//!
//! Framework-free drag-and-drop for ordered task lists.
//! Uses movement threshold to distinguish click from drag; the UI layer feeds
//! pointer/keyboard input in and binds to the emitted [`DragEvent`]s.

use std::fmt::Debug;

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// Drop target types
#[derive(Clone, Debug, PartialEq)]
pub enum DropTarget<Id> {
    /// Drop on a task (take its position in the list)
    Task(Id),
    /// Drop on the completion zone
    CompleteZone,
}

/// Event emitted when a drag session ends
#[derive(Clone, Debug, PartialEq)]
pub enum DragEvent<Id> {
    /// Move `active` to the position currently held by `over`
    Reorder { active: Id, over: Id },
    /// Mark `active` as completed
    Complete { active: Id },
    /// Drag aborted: no target, explicit cancel or Escape
    Cancel { active: Id },
}

impl<Id> DragEvent<Id> {
    /// The task that was being dragged
    pub fn active(&self) -> &Id {
        match self {
            DragEvent::Reorder { active, .. } => active,
            DragEvent::Complete { active } => active,
            DragEvent::Cancel { active } => active,
        }
    }
}

/// Drag session state
#[derive(Clone, Debug, PartialEq)]
pub enum DragState<Id> {
    Idle,
    Dragging { active: Id },
}

/// Pointer pressed on a task but not yet moved past the threshold
#[derive(Clone, Debug)]
struct PendingPress<Id> {
    id: Id,
    start_x: i32,
    start_y: i32,
}

/// Drag interaction state machine for one list view
#[derive(Debug)]
pub struct DragMachine<Id> {
    state: DragState<Id>,
    pending: Option<PendingPress<Id>>,
    drop_target: Option<DropTarget<Id>>,
    drag_just_ended: bool,
    threshold_px: i32,
}

impl<Id: Clone + PartialEq + Debug> Default for DragMachine<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Clone + PartialEq + Debug> DragMachine<Id> {
    pub fn new() -> Self {
        Self::with_threshold(DRAG_THRESHOLD_PX)
    }

    pub fn with_threshold(threshold_px: i32) -> Self {
        Self {
            state: DragState::Idle,
            pending: None,
            drop_target: None,
            drag_just_ended: false,
            threshold_px: threshold_px.max(0),
        }
    }

    pub fn state(&self) -> &DragState<Id> {
        &self.state
    }

    /// Task being dragged, if any
    pub fn active_id(&self) -> Option<&Id> {
        match &self.state {
            DragState::Dragging { active } => Some(active),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Target currently hovered by the dragged task
    pub fn drop_target(&self) -> Option<&DropTarget<Id>> {
        self.drop_target.as_ref()
    }

    /// Record a pending drag with its start position
    pub fn pointer_down(&mut self, id: Id, x: i32, y: i32) {
        if self.is_dragging() {
            return;
        }
        self.pending = Some(PendingPress { id, start_x: x, start_y: y });
    }

    /// Start dragging once the pointer moved past the threshold.
    ///
    /// Returns `true` only for the move that started the drag.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(pending) = &self.pending else {
            return false;
        };
        let dx = (x - pending.start_x).abs();
        let dy = (y - pending.start_y).abs();
        if dx > self.threshold_px || dy > self.threshold_px {
            let active = pending.id.clone();
            self.pending = None;
            self.begin(active);
            return true;
        }
        false
    }

    /// Keyboard pick-up: starts dragging immediately
    pub fn pick_up(&mut self, id: Id) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.pending = None;
        self.begin(id);
        true
    }

    /// Pointer (or keyboard focus) entered a droppable
    pub fn enter_target(&mut self, target: DropTarget<Id>) {
        if self.is_dragging() {
            self.drop_target = Some(target);
        }
    }

    /// Pointer left the hovered droppable
    pub fn leave_target(&mut self) {
        if self.is_dragging() {
            self.drop_target = None;
        }
    }

    /// Pointer released: drop on the hovered target.
    ///
    /// A press that never passed the threshold is a click and yields nothing.
    pub fn pointer_up(&mut self) -> Option<DragEvent<Id>> {
        self.pending = None;
        if !self.is_dragging() {
            return None;
        }
        let target = self.drop_target.take();
        self.drop_on(target)
    }

    /// Drop on an explicit target (`None` means outside every droppable)
    pub fn drop_on(&mut self, target: Option<DropTarget<Id>>) -> Option<DragEvent<Id>> {
        let active = self.end_drag()?;
        let event = match target {
            None => Some(DragEvent::Cancel { active }),
            Some(DropTarget::CompleteZone) => Some(DragEvent::Complete { active }),
            Some(DropTarget::Task(over)) if over == active => None,
            Some(DropTarget::Task(over)) => Some(DragEvent::Reorder { active, over }),
        };
        tracing::debug!(?event, "drag session ended");
        event
    }

    /// Abort the drag (Escape, pointer lost)
    pub fn cancel(&mut self) -> Option<DragEvent<Id>> {
        self.pending = None;
        let active = self.end_drag()?;
        tracing::debug!(?active, "drag cancelled");
        Some(DragEvent::Cancel { active })
    }

    /// Whether a drag just ended; consumed on read so the trailing click can be swallowed
    pub fn take_just_ended(&mut self) -> bool {
        std::mem::take(&mut self.drag_just_ended)
    }

    fn begin(&mut self, active: Id) {
        tracing::debug!(?active, "drag started");
        self.drop_target = None;
        self.drag_just_ended = false;
        self.state = DragState::Dragging { active };
    }

    /// End drag operation, returning the task that was dragged
    fn end_drag(&mut self) -> Option<Id> {
        let previous = std::mem::replace(&mut self.state, DragState::Idle);
        self.drop_target = None;
        self.pending = None;
        match previous {
            DragState::Dragging { active } => {
                self.drag_just_ended = true;
                Some(active)
            }
            DragState::Idle => None,
        }
    }
}
