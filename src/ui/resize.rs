// Lesson Resize System
//
// Dragging the handle on a lesson block's bottom edge changes its end time.
// The start never moves. Only the handle starts a resize, so a press on the
// block body always belongs to the drag controller.
//
//   Idle -> Resizing   press on the bottom handle
//   Resizing -> Idle   release (commit or no-op) or Escape

use chrono::Duration;
use egui::{Key, Pos2, Rect, Vec2};

use super::gesture::{GestureHost, GestureKind, GridGeometry, NoopHost, ResizeIntent};
use super::time_geometry::{snap_step_px, SNAP_MINUTES};
use crate::models::lesson::Lesson;
use crate::utils::date::{local_date, resolve_local};

/// Height of the handle hit area along the bottom edge
pub const HANDLE_SIZE: f32 = 8.0;

/// Shortest lesson a resize can produce
pub const MIN_DURATION_MINUTES: i64 = SNAP_MINUTES as i64;

/// Hit area of the resize handle for a rendered lesson block
pub fn handle_rect(block: Rect) -> Rect {
    let height = HANDLE_SIZE.min(block.height() / 2.0);
    Rect::from_min_max(Pos2::new(block.left(), block.bottom() - height), block.max)
}

pub fn hit_test(block: Rect, pointer: Pos2) -> bool {
    handle_rect(block).contains(pointer)
}

/// An active resize; `current_bottom` positions the preview edge
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeSession {
    pub lesson: Lesson,
    pub original_top: f32,
    pub original_bottom: f32,
    pub current_bottom: f32,
}

impl ResizeSession {
    pub fn has_changed(&self) -> bool {
        self.current_bottom != self.original_bottom
    }

    pub fn preview_height(&self) -> f32 {
        self.current_bottom - self.original_top
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResizeRelease {
    /// No resize in progress
    Ignored,
    /// Released without a net change
    Aborted,
    Resize(ResizeIntent),
}

/// Resize-to-extend controller for one grid
pub struct ResizeController<H: GestureHost = NoopHost> {
    session: Option<ResizeSession>,
    grid: GridGeometry,
    min_duration: Duration,
    host: H,
}

impl ResizeController<NoopHost> {
    pub fn without_host(grid: GridGeometry) -> Self {
        Self::new(grid, NoopHost)
    }
}

impl<H: GestureHost> ResizeController<H> {
    pub fn new(grid: GridGeometry, host: H) -> Self {
        Self {
            session: None,
            grid,
            min_duration: Duration::minutes(MIN_DURATION_MINUTES),
            host,
        }
    }

    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration.max(Duration::minutes(1));
        self
    }

    pub fn set_grid(&mut self, grid: GridGeometry) {
        self.grid = grid;
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_resizing_lesson(&self, lesson_id: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.lesson.id == lesson_id)
    }

    /// Press on a lesson's resize handle. Ignored while another resize runs.
    pub fn press_handle(&mut self, lesson: &Lesson) -> bool {
        if self.session.is_some() {
            log::debug!("Ignoring resize press on lesson {} during active resize", lesson.id);
            return false;
        }

        let original_top = self.grid.top_of(lesson.start_at);
        let original_bottom = original_top + self.grid.scale.duration_px(lesson.duration());

        self.host.attach_listeners(GestureKind::Resize);
        log::debug!("Resize started for lesson {}", lesson.id);
        self.session = Some(ResizeSession {
            lesson: lesson.clone(),
            original_top,
            original_bottom,
            current_bottom: original_bottom,
        });
        true
    }

    /// Track the pointer: clamp between the minimum duration and the grid
    /// bottom, then snap to the 15-minute grid.
    pub fn pointer_move(&mut self, pointer: Pos2, scroll: Vec2) -> Option<&ResizeSession> {
        let grid = &self.grid;
        let min_px = grid.scale.duration_px(self.min_duration);
        let session = self.session.as_mut()?;

        let y = grid.to_grid(pointer, scroll).y;
        let min_bottom = session.original_top + min_px;
        let max_bottom = grid.scale.grid_height().max(min_bottom);
        let candidate = y.clamp(min_bottom, max_bottom);

        let mut snapped = grid.scale.snap_y(candidate);
        if snapped < min_bottom {
            snapped += snap_step_px(grid.scale.hour_height);
        }
        session.current_bottom = snapped;

        Some(session)
    }

    pub fn release(&mut self) -> ResizeRelease {
        let Some(session) = self.session.take() else {
            return ResizeRelease::Ignored;
        };
        self.host.detach_listeners(GestureKind::Resize);

        if !session.has_changed() {
            return ResizeRelease::Aborted;
        }

        match self.new_end(&session) {
            Some(new_end) if new_end != session.lesson.end_at => {
                log::info!(
                    "Resize lesson {}: end {} -> {}",
                    session.lesson.id,
                    session.lesson.end_at,
                    new_end
                );
                ResizeRelease::Resize(ResizeIntent {
                    lesson: session.lesson,
                    new_end,
                })
            }
            Some(_) => ResizeRelease::Aborted,
            None => {
                log::warn!(
                    "Could not resolve new end for lesson {}, ignoring",
                    session.lesson.id
                );
                ResizeRelease::Aborted
            }
        }
    }

    /// End on the start's local calendar day, never shorter than the minimum
    fn new_end(&self, session: &ResizeSession) -> Option<chrono::DateTime<chrono::Utc>> {
        let start = session.lesson.start_at;
        let date = local_date(&self.grid.timezone, start);
        let local = self
            .grid
            .scale
            .y_to_time(session.current_bottom)
            .on_date(date)?;
        let end = resolve_local(&self.grid.timezone, local)?;
        Some(end.max(start + self.min_duration))
    }

    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                self.host.detach_listeners(GestureKind::Resize);
                log::debug!("Resize of lesson {} cancelled", session.lesson.id);
                true
            }
            None => false,
        }
    }

    pub fn key_pressed(&mut self, key: Key) -> bool {
        key == Key::Escape && self.cancel()
    }
}

impl<H: GestureHost> Drop for ResizeController<H> {
    fn drop(&mut self) {
        if self.session.is_some() {
            self.host.detach_listeners(GestureKind::Resize);
        }
    }
}
