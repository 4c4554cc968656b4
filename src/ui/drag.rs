// Lesson Drag System
//
// Press-and-hold on a lesson block picks it up; moving the pointer moves a
// ghost copy over the grid; releasing emits a reschedule intent.
//
//   Idle -> IntentPending   press on a lesson block
//   IntentPending -> Idle   released before the hold delay ("just a click")
//   IntentPending -> Dragging   hold delay elapsed
//   Dragging -> Idle        release (commit or no-op) or Escape

use std::time::{Duration, Instant};

use egui::{Key, Pos2, Vec2};

use super::gesture::{GestureHost, GestureKind, GridGeometry, NoopHost, PointerKind, RescheduleIntent};
use super::time_geometry::snap_step_px;
use crate::models::lesson::Lesson;

/// Hold time that separates a click from a drag
pub const HOLD_DELAY: Duration = Duration::from_millis(150);

/// A press waiting for the hold delay
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPress {
    pub lesson: Lesson,
    pub day_index: usize,
    /// Grid-relative pointer position at press time
    pub pointer: Pos2,
    pub pointer_kind: PointerKind,
    pub pressed_at: Instant,
}

/// An active drag. `current_*` positions the ghost preview; the original
/// block stays dimmed at `original_*`.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub lesson: Lesson,
    pub original_top: f32,
    pub original_day_index: usize,
    pub current_top: f32,
    pub current_day_index: usize,
    /// Pointer distance below the block's top edge when it was picked up
    pub grab_offset: f32,
    pub pointer_kind: PointerKind,
}

impl DragSession {
    pub fn has_moved(&self) -> bool {
        self.current_top != self.original_top || self.current_day_index != self.original_day_index
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragPhase {
    Idle,
    IntentPending(PendingPress),
    Dragging(DragSession),
}

/// What a pointer release meant
#[derive(Clone, Debug, PartialEq)]
pub enum DragRelease {
    /// No gesture in progress
    Ignored,
    /// Released before the hold delay; the caller treats it as a click
    Click(Lesson),
    /// Dragged but dropped where it started
    Aborted,
    Reschedule(RescheduleIntent),
}

/// Drag-to-reschedule controller for one grid.
///
/// All state lives here and only changes through these methods; callers read
/// it through [`DragController::phase`] and [`DragController::session`].
pub struct DragController<H: GestureHost = NoopHost> {
    phase: DragPhase,
    grid: GridGeometry,
    hold_delay: Duration,
    host: H,
}

impl DragController<NoopHost> {
    pub fn without_host(grid: GridGeometry) -> Self {
        Self::new(grid, NoopHost)
    }
}

impl<H: GestureHost> DragController<H> {
    pub fn new(grid: GridGeometry, host: H) -> Self {
        Self {
            phase: DragPhase::Idle,
            grid,
            hold_delay: HOLD_DELAY,
            host,
        }
    }

    pub fn with_hold_delay(mut self, hold_delay: Duration) -> Self {
        self.hold_delay = hold_delay;
        self
    }

    /// Replace the grid snapshot (resize, scroll container change, new week)
    pub fn set_grid(&mut self, grid: GridGeometry) {
        self.grid = grid;
    }

    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            DragPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging(_))
    }

    /// Press on a lesson block. Ignored unless idle.
    pub fn press(
        &mut self,
        lesson: &Lesson,
        pointer: Pos2,
        scroll: Vec2,
        pointer_kind: PointerKind,
        now: Instant,
    ) -> bool {
        if !self.is_idle() {
            log::debug!("Ignoring press on lesson {} during active gesture", lesson.id);
            return false;
        }

        let pointer = self.grid.to_grid(pointer, scroll);
        let day_index = self
            .grid
            .day_index_of(lesson.start_at)
            .unwrap_or_else(|| self.grid.day_index_at(pointer.x));

        self.phase = DragPhase::IntentPending(PendingPress {
            lesson: lesson.clone(),
            day_index,
            pointer,
            pointer_kind,
            pressed_at: now,
        });
        true
    }

    /// The hold timer fired: pick the lesson up
    pub fn hold_elapsed(&mut self) -> bool {
        let DragPhase::IntentPending(pending) = &self.phase else {
            return false;
        };

        let original_top = self.grid.top_of(pending.lesson.start_at);
        let session = DragSession {
            lesson: pending.lesson.clone(),
            original_top,
            original_day_index: pending.day_index,
            current_top: original_top,
            current_day_index: pending.day_index,
            grab_offset: pending.pointer.y - original_top,
            pointer_kind: pending.pointer_kind,
        };

        self.host.attach_listeners(GestureKind::Drag);
        if session.pointer_kind == PointerKind::Touch {
            self.host.haptic_feedback();
        }
        log::debug!("Drag started for lesson {}", session.lesson.id);

        self.phase = DragPhase::Dragging(session);
        true
    }

    /// Fire the hold timer if it is due. For callers polling from a frame loop.
    pub fn poll(&mut self, now: Instant) -> bool {
        match &self.phase {
            DragPhase::IntentPending(pending)
                if now.saturating_duration_since(pending.pressed_at) >= self.hold_delay =>
            {
                self.hold_elapsed()
            }
            _ => false,
        }
    }

    /// Track the pointer while dragging; snaps to the 15-minute grid and the
    /// nearest day column.
    pub fn pointer_move(&mut self, pointer: Pos2, scroll: Vec2) -> Option<&DragSession> {
        let grid = &self.grid;
        let DragPhase::Dragging(session) = &mut self.phase else {
            return None;
        };

        let pointer = grid.to_grid(pointer, scroll);
        // last start row is one snap step above the grid bottom
        let step = snap_step_px(grid.scale.hour_height);
        let max_top = (grid.scale.grid_height() - step).max(0.0);

        let raw_top = pointer.y - session.grab_offset;
        session.current_top = grid.scale.snap_y(raw_top).clamp(0.0, max_top);
        session.current_day_index = grid.day_index_at(pointer.x);

        Some(session)
    }

    /// Pointer released
    pub fn release(&mut self) -> DragRelease {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => DragRelease::Ignored,
            DragPhase::IntentPending(pending) => DragRelease::Click(pending.lesson),
            DragPhase::Dragging(session) => {
                self.host.detach_listeners(GestureKind::Drag);
                self.commit(session)
            }
        }
    }

    fn commit(&self, session: DragSession) -> DragRelease {
        if !session.has_moved() {
            log::debug!("Drag of lesson {} ended where it began", session.lesson.id);
            return DragRelease::Aborted;
        }

        let Some(new_start) = self
            .grid
            .instant_at(session.current_day_index, session.current_top)
        else {
            log::warn!(
                "Could not resolve drop position for lesson {}, ignoring",
                session.lesson.id
            );
            return DragRelease::Aborted;
        };

        if new_start == session.lesson.start_at {
            return DragRelease::Aborted;
        }

        let new_end = new_start + session.lesson.duration();
        log::info!(
            "Reschedule lesson {}: {} -> {}",
            session.lesson.id,
            session.lesson.start_at,
            new_start
        );
        DragRelease::Reschedule(RescheduleIntent {
            lesson: session.lesson,
            new_start,
            new_end,
        })
    }

    /// Abort any gesture without emitting an intent
    pub fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => false,
            DragPhase::IntentPending(_) => true,
            DragPhase::Dragging(session) => {
                self.host.detach_listeners(GestureKind::Drag);
                log::debug!("Drag of lesson {} cancelled", session.lesson.id);
                true
            }
        }
    }

    /// Escape cancels; other keys are ignored
    pub fn key_pressed(&mut self, key: Key) -> bool {
        key == Key::Escape && self.cancel()
    }
}

impl<H: GestureHost> Drop for DragController<H> {
    fn drop(&mut self) {
        if self.is_dragging() {
            self.host.detach_listeners(GestureKind::Drag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::gesture::MockGestureHost;
    use crate::ui::time_geometry::TimeScale;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use chrono_tz::UTC;
    use egui::{pos2, Rect};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const NO_SCROLL: Vec2 = Vec2::ZERO;

    fn grid() -> GridGeometry {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        GridGeometry::new(
            Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(700.0, 840.0)),
            (0..7).map(|i| monday + chrono::Duration::days(i)).collect(),
            TimeScale::new(60.0, 7, 21),
            UTC,
        )
    }

    fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
    }

    fn lesson() -> Lesson {
        // Tuesday 09:00-09:45, column 1, top 120px
        Lesson::new("l-1", "teacher", utc(2, 9, 0), utc(2, 9, 45)).unwrap()
    }

    fn picked_up(controller: &mut DragController<impl GestureHost>) {
        assert!(controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Mouse, Instant::now()));
        assert!(controller.hold_elapsed());
    }

    #[test]
    fn test_quick_release_is_a_click() {
        let mut controller = DragController::without_host(grid());
        controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Mouse, Instant::now());
        assert!(matches!(controller.phase(), DragPhase::IntentPending(_)));

        assert_eq!(controller.release(), DragRelease::Click(lesson()));
        assert!(controller.is_idle());
    }

    #[test]
    fn test_poll_respects_hold_delay() {
        let mut controller = DragController::without_host(grid());
        let pressed = Instant::now();
        controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Mouse, pressed);

        assert!(!controller.poll(pressed + Duration::from_millis(100)));
        assert!(!controller.is_dragging());
        assert!(controller.poll(pressed + Duration::from_millis(150)));
        assert!(controller.is_dragging());
    }

    #[test]
    fn test_drag_captures_original_geometry() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);

        let session = controller.session().unwrap();
        assert_eq!(session.original_top, 120.0);
        assert_eq!(session.original_day_index, 1);
        assert_eq!(session.grab_offset, 10.0);
    }

    #[test]
    fn test_drag_commit_preserves_duration() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);

        // one column right, pointer 1h07m lower -> snaps to 10:00 Wednesday
        let session = controller.pointer_move(pos2(250.0, 197.0), NO_SCROLL).unwrap();
        assert_eq!(session.current_top, 180.0);
        assert_eq!(session.current_day_index, 2);

        match controller.release() {
            DragRelease::Reschedule(intent) => {
                assert_eq!(intent.new_start, utc(3, 10, 0));
                assert_eq!(intent.new_end, utc(3, 10, 45));
                assert_eq!(intent.lesson.id, "l-1");
            }
            other => panic!("expected reschedule, got {other:?}"),
        }
        assert!(controller.is_idle());
    }

    #[test]
    fn test_drop_in_place_is_a_no_op() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);
        controller.pointer_move(pos2(152.0, 133.0), NO_SCROLL);

        assert_eq!(controller.release(), DragRelease::Aborted);
    }

    #[test]
    fn test_escape_cancels_without_intent() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);
        controller.pointer_move(pos2(450.0, 400.0), NO_SCROLL);

        assert!(!controller.key_pressed(Key::Enter));
        assert!(controller.key_pressed(Key::Escape));
        assert!(controller.is_idle());
        assert_eq!(controller.release(), DragRelease::Ignored);
    }

    #[test]
    fn test_press_ignored_while_dragging() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);

        let other = Lesson::new("l-2", "teacher", utc(4, 9, 0), utc(4, 10, 0)).unwrap();
        assert!(!controller.press(&other, pos2(350.0, 130.0), NO_SCROLL, PointerKind::Mouse, Instant::now()));
        assert_eq!(controller.session().unwrap().lesson.id, "l-1");
    }

    #[test]
    fn test_drag_clamps_to_grid() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);

        let session = controller.pointer_move(pos2(-300.0, -500.0), NO_SCROLL).unwrap();
        assert_eq!((session.current_top, session.current_day_index), (0.0, 0));

        let session = controller.pointer_move(pos2(9_000.0, 9_000.0), NO_SCROLL).unwrap();
        assert_eq!(session.current_top, 825.0);
        assert_eq!(session.current_day_index, 6);
    }

    #[test]
    fn test_scroll_offset_shifts_drop_time() {
        let mut controller = DragController::without_host(grid());
        picked_up(&mut controller);

        controller.pointer_move(pos2(150.0, 130.0), Vec2::new(0.0, 60.0));
        match controller.release() {
            DragRelease::Reschedule(intent) => assert_eq!(intent.new_start, utc(2, 10, 0)),
            other => panic!("expected reschedule, got {other:?}"),
        }
    }

    #[test]
    fn test_listeners_attached_only_while_dragging() {
        let mut host = MockGestureHost::new();
        host.expect_attach_listeners()
            .with(eq(GestureKind::Drag))
            .times(1)
            .return_const(());
        host.expect_detach_listeners()
            .with(eq(GestureKind::Drag))
            .times(1)
            .return_const(());
        host.expect_haptic_feedback().times(0);

        let mut controller = DragController::new(grid(), host);
        controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Mouse, Instant::now());
        controller.hold_elapsed();
        controller.pointer_move(pos2(250.0, 197.0), NO_SCROLL);
        controller.release();
    }

    #[test]
    fn test_click_never_attaches_listeners() {
        let mut host = MockGestureHost::new();
        host.expect_attach_listeners().times(0);
        host.expect_detach_listeners().times(0);

        let mut controller = DragController::new(grid(), host);
        controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Mouse, Instant::now());
        controller.release();
    }

    #[test]
    fn test_touch_drag_triggers_haptics() {
        let mut host = MockGestureHost::new();
        host.expect_attach_listeners().times(1).return_const(());
        host.expect_detach_listeners().times(1).return_const(());
        host.expect_haptic_feedback().times(1).return_const(());

        let mut controller = DragController::new(grid(), host);
        controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Touch, Instant::now());
        controller.hold_elapsed();
        controller.cancel();
    }

    #[test]
    fn test_teardown_mid_drag_detaches_listeners() {
        let mut host = MockGestureHost::new();
        host.expect_attach_listeners().times(1).return_const(());
        host.expect_detach_listeners().times(1).return_const(());

        let mut controller = DragController::new(grid(), host);
        controller.press(&lesson(), pos2(150.0, 130.0), NO_SCROLL, PointerKind::Mouse, Instant::now());
        controller.hold_elapsed();
        drop(controller);
    }

    proptest! {
        #[test]
        fn prop_committed_drag_preserves_duration(
            x in -200.0f32..900.0,
            y in -200.0f32..1000.0,
            minutes in 15i64..180,
        ) {
            let original = Lesson::new(
                "p",
                "teacher",
                utc(2, 9, 0),
                utc(2, 9, 0) + chrono::Duration::minutes(minutes),
            )
            .unwrap();
            let mut controller = DragController::without_host(grid());
            controller.press(&original, pos2(150.0, 125.0), NO_SCROLL, PointerKind::Mouse, Instant::now());
            controller.hold_elapsed();
            controller.pointer_move(pos2(x, y), NO_SCROLL);

            if let DragRelease::Reschedule(intent) = controller.release() {
                prop_assert_eq!(intent.new_end - intent.new_start, original.duration());
            }
        }
    }
}
