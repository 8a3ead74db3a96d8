//! Timeline interaction: active-point cursor and selection range.
//!
//! The state is a plain value. Each pointer event produces the next state
//! through [`SelectionState::apply`], independent of whatever host delivers
//! the events.

/// Marker that can be grabbed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    ActivePoint,
    RangeStart,
    RangeEnd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragHandle),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(DragHandle),
    /// Horizontal pointer position in the same coordinate space as the bounds
    Move { x: f64 },
    /// Release anywhere, including outside the timeline
    Release,
}

/// Horizontal extent of the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineBounds {
    pub left: f64,
    pub width: f64,
}

impl TimelineBounds {
    pub fn new(left: f64, width: f64) -> Self {
        TimelineBounds { left, width }
    }

    /// Maps a pointer position onto `[0, len - 1]`, rounding to nearest.
    pub fn index_at(&self, x: f64, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let fraction = if self.width > 0.0 { (x - self.left) / self.width } else { 0.0 };
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let index = (fraction * (len - 1) as f64).round() as usize;
        Some(index.min(len - 1))
    }

    /// Pointer position that maps onto `index`.
    pub fn x_of(&self, index: usize, len: usize) -> f64 {
        self.left + self.width * position_percent(Some(index), len) / 100.0
    }
}

/// Closed index interval, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    start: usize,
    end: usize,
}

impl SelectionRange {
    /// `None` unless `start <= end < len`.
    pub fn new(start: usize, end: usize, len: usize) -> Option<Self> {
        if start <= end && end < len {
            Some(SelectionRange { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of points covered, both ends included.
    pub fn point_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Percentage along the timeline for an index; 0 for no index or `len <= 1`.
pub fn position_percent(index: Option<usize>, len: usize) -> f64 {
    match index {
        Some(i) if len > 1 => i.min(len - 1) as f64 / (len - 1) as f64 * 100.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    drag: DragState,
    active: Option<usize>,
    range: Option<SelectionRange>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn range(&self) -> Option<SelectionRange> {
        self.range
    }

    /// Where the start and end handles sit, in percent. Without a range the
    /// handles rest at both ends of the timeline.
    pub fn handle_percents(&self, len: usize) -> (f64, f64) {
        match self.range {
            Some(r) => (position_percent(Some(r.start), len), position_percent(Some(r.end), len)),
            None => (0.0, position_percent(len.checked_sub(1), len)),
        }
    }

    /// Sets the active point from another view (e.g. a chart click).
    /// Out-of-range indices are ignored.
    pub fn select_point(self, index: usize, len: usize) -> Self {
        if index < len {
            SelectionState { active: Some(index), ..self }
        } else {
            self
        }
    }

    /// Next state for a pointer event on a sequence of `len` points.
    pub fn apply(self, event: PointerEvent, len: usize, bounds: &TimelineBounds) -> Self {
        match (self.drag, event) {
            (_, PointerEvent::Press(handle)) => SelectionState {
                drag: DragState::Dragging(handle),
                ..self
            },
            (DragState::Dragging(_), PointerEvent::Release) => SelectionState {
                drag: DragState::Idle,
                ..self
            },
            (DragState::Dragging(handle), PointerEvent::Move { x }) => {
                match bounds.index_at(x, len) {
                    Some(candidate) => self.drag_to(handle, candidate),
                    None => self,
                }
            }
            (DragState::Idle, PointerEvent::Move { .. })
            | (DragState::Idle, PointerEvent::Release) => self,
        }
    }

    fn drag_to(self, handle: DragHandle, candidate: usize) -> Self {
        match handle {
            DragHandle::ActivePoint => SelectionState { active: Some(candidate), ..self },
            DragHandle::RangeStart => {
                let end = self.range.map_or(candidate, |r| r.end);
                SelectionState {
                    range: Some(SelectionRange { start: candidate.min(end), end }),
                    ..self
                }
            }
            DragHandle::RangeEnd => {
                let start = self.range.map_or(candidate, |r| r.start);
                SelectionState {
                    range: Some(SelectionRange { start, end: candidate.max(start) }),
                    ..self
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BOUNDS: TimelineBounds = TimelineBounds { left: 100.0, width: 400.0 };

    fn run(events: &[PointerEvent], len: usize) -> SelectionState {
        events
            .iter()
            .fold(SelectionState::new(), |state, &event| state.apply(event, len, &BOUNDS))
    }

    #[test]
    fn test_index_mapping_rounds_and_clamps() {
        assert_eq!(BOUNDS.index_at(100.0, 5), Some(0));
        assert_eq!(BOUNDS.index_at(500.0, 5), Some(4));
        assert_eq!(BOUNDS.index_at(249.0, 5), Some(1));
        assert_eq!(BOUNDS.index_at(251.0, 5), Some(2));
        assert_eq!(BOUNDS.index_at(-1000.0, 5), Some(0));
        assert_eq!(BOUNDS.index_at(9999.0, 5), Some(4));
        assert_eq!(BOUNDS.index_at(f64::NAN, 5), Some(0));
        assert_eq!(BOUNDS.index_at(300.0, 0), None);
        assert_eq!(TimelineBounds::new(0.0, 0.0).index_at(10.0, 5), Some(0));
    }

    #[test]
    fn test_drag_end_creates_range_from_candidate() {
        let state = run(
            &[
                PointerEvent::Press(DragHandle::RangeEnd),
                PointerEvent::Move { x: BOUNDS.x_of(3, 5) },
            ],
            5,
        );
        assert_eq!(state.range(), SelectionRange::new(3, 3, 5));
        assert!(state.is_dragging());
    }

    #[test]
    fn test_start_cannot_pass_end() {
        let state = run(
            &[
                PointerEvent::Press(DragHandle::RangeEnd),
                PointerEvent::Move { x: BOUNDS.x_of(2, 5) },
                PointerEvent::Release,
                PointerEvent::Press(DragHandle::RangeStart),
                PointerEvent::Move { x: BOUNDS.x_of(4, 5) },
            ],
            5,
        );
        assert_eq!(state.range(), SelectionRange::new(2, 2, 5));
    }

    #[test]
    fn test_end_cannot_pass_start() {
        let state = run(
            &[
                PointerEvent::Press(DragHandle::RangeStart),
                PointerEvent::Move { x: BOUNDS.x_of(3, 5) },
                PointerEvent::Release,
                PointerEvent::Press(DragHandle::RangeEnd),
                PointerEvent::Move { x: BOUNDS.x_of(1, 5) },
                PointerEvent::Release,
            ],
            5,
        );
        assert_eq!(state.range(), SelectionRange::new(3, 3, 5));
        assert_eq!(state.drag(), DragState::Idle);
    }

    #[test]
    fn test_widening_range() {
        let state = run(
            &[
                PointerEvent::Press(DragHandle::RangeStart),
                PointerEvent::Move { x: BOUNDS.x_of(1, 5) },
                PointerEvent::Release,
                PointerEvent::Press(DragHandle::RangeEnd),
                PointerEvent::Move { x: BOUNDS.x_of(3, 5) },
                PointerEvent::Release,
            ],
            5,
        );
        assert_eq!(state.range(), SelectionRange::new(1, 3, 5));
    }

    #[test]
    fn test_active_point_drag_and_release_outside() {
        let state = run(
            &[
                PointerEvent::Press(DragHandle::ActivePoint),
                PointerEvent::Move { x: 5000.0 },
                PointerEvent::Release,
                PointerEvent::Move { x: 100.0 },
            ],
            10,
        );
        assert_eq!(state.active_index(), Some(9));
        assert_eq!(state.drag(), DragState::Idle);
        assert_eq!(state.range(), None);
    }

    #[test]
    fn test_moves_while_idle_are_ignored() {
        let state = run(&[PointerEvent::Move { x: 300.0 }, PointerEvent::Release], 5);
        assert_eq!(state, SelectionState::new());
    }

    #[test]
    fn test_select_point_checks_range() {
        let state = SelectionState::new().select_point(2, 5);
        assert_eq!(state.active_index(), Some(2));
        assert_eq!(state.select_point(5, 5).active_index(), Some(2));
    }

    #[test]
    fn test_handle_percents() {
        assert_eq!(SelectionState::new().handle_percents(5), (0.0, 100.0));
        assert_eq!(SelectionState::new().handle_percents(1), (0.0, 0.0));
        let state = run(
            &[
                PointerEvent::Press(DragHandle::RangeStart),
                PointerEvent::Move { x: BOUNDS.x_of(1, 5) },
            ],
            5,
        );
        assert_eq!(state.handle_percents(5), (25.0, 25.0));
    }

    #[test]
    fn test_selection_range_constructor() {
        assert!(SelectionRange::new(3, 1, 5).is_none());
        assert!(SelectionRange::new(1, 5, 5).is_none());
        let range = SelectionRange::new(1, 3, 5).unwrap();
        assert_eq!(range.point_count(), 3);
        assert!(range.contains(3) && !range.contains(4));
    }

    fn event() -> impl Strategy<Value = PointerEvent> {
        prop_oneof![
            Just(PointerEvent::Press(DragHandle::ActivePoint)),
            Just(PointerEvent::Press(DragHandle::RangeStart)),
            Just(PointerEvent::Press(DragHandle::RangeEnd)),
            Just(PointerEvent::Release),
            (-200.0f64..800.0).prop_map(|x| PointerEvent::Move { x }),
        ]
    }

    proptest! {
        #[test]
        fn reachable_states_keep_indices_in_bounds(
            len in 1usize..50,
            events in prop::collection::vec(event(), 0..60),
        ) {
            let mut state = SelectionState::new();
            for event in events {
                state = state.apply(event, len, &BOUNDS);
                if let Some(range) = state.range() {
                    prop_assert!(range.start() <= range.end());
                    prop_assert!(range.end() < len);
                }
                if let Some(active) = state.active_index() {
                    prop_assert!(active < len);
                }
            }
        }
    }
}
