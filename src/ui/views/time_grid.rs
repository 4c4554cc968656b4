//! Multi-day time grid shared by the day and week views.
//!
//! Lessons are bucketed by local start date, each day is laid out with
//! [`compute_layout`], and any active drag or resize session is folded in as
//! dimmed, ghost or resizing blocks.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use egui::{pos2, Pos2, Rect, Vec2};
use serde::Serialize;

use super::types::{BlockState, OverflowBlock, RenderedBlock};
use crate::models::lesson::Lesson;
use crate::models::settings::CalendarSettings;
use crate::ui::drag::{DragController, DragSession};
use crate::ui::gesture::GridGeometry;
use crate::ui::overlap_layout::{compute_layout, LayoutConfig};
use crate::ui::resize::{self, ResizeController, ResizeSession};
use crate::ui::time_geometry::{block_height, TimeScale, MIN_BLOCK_HEIGHT};
use crate::utils::date::{end_of_local_day, local_date, start_of_local_day};

#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    pub days: Vec<NaiveDate>,
    pub scale: TimeScale,
    pub max_columns: usize,
    pub timezone: Tz,
}

/// Everything needed to paint one frame of the grid
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedGrid {
    pub days: Vec<NaiveDate>,
    pub scale: TimeScale,
    pub blocks: Vec<RenderedBlock>,
    pub overflow: Vec<OverflowBlock>,
}

/// What lies under the pointer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridHit<'a> {
    ResizeHandle(&'a RenderedBlock),
    Block(&'a RenderedBlock),
    Overflow(&'a OverflowBlock),
    Empty { day_index: usize },
}

impl TimeGrid {
    pub fn new(days: Vec<NaiveDate>, scale: TimeScale, max_columns: usize, timezone: Tz) -> Self {
        Self {
            days,
            scale,
            max_columns: max_columns.max(1),
            timezone,
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            hour_height: self.scale.hour_height,
            start_hour: self.scale.start_hour,
            max_columns: self.max_columns,
        }
    }

    /// Geometry snapshot for the controllers, given the painted bounds
    pub fn geometry(&self, bounds: Rect) -> GridGeometry {
        GridGeometry::new(bounds, self.days.clone(), self.scale, self.timezone)
    }

    /// Drag controller over this grid, hold delay taken from settings
    pub fn drag_controller(&self, bounds: Rect, settings: &CalendarSettings) -> DragController {
        DragController::without_host(self.geometry(bounds)).with_hold_delay(settings.hold_delay())
    }

    /// Resize controller over this grid, minimum duration taken from settings
    pub fn resize_controller(&self, bounds: Rect, settings: &CalendarSettings) -> ResizeController {
        ResizeController::without_host(self.geometry(bounds))
            .with_min_duration(settings.min_lesson_duration())
    }

    /// `[first local midnight, last local midnight)` covered by the grid
    pub fn instant_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.days.first()?;
        let last = self.days.last()?;
        Some((
            start_of_local_day(&self.timezone, *first)?,
            end_of_local_day(&self.timezone, *last)?,
        ))
    }

    fn lessons_by_day<'l>(&self, lessons: &'l [Lesson]) -> Vec<Vec<&'l Lesson>> {
        let mut by_day: Vec<Vec<&Lesson>> = vec![Vec::new(); self.days.len()];
        for lesson in lessons {
            let date = local_date(&self.timezone, lesson.start_at);
            if let Some(index) = self.days.iter().position(|day| *day == date) {
                by_day[index].push(lesson);
            }
        }
        for day in &mut by_day {
            day.sort_by(|a, b| a.start_at.cmp(&b.start_at).then_with(|| a.id.cmp(&b.id)));
        }
        by_day
    }

    pub fn render(
        &self,
        lessons: &[Lesson],
        drag: Option<&DragSession>,
        resize: Option<&ResizeSession>,
    ) -> RenderedGrid {
        let config = self.layout_config();
        let slot_width = 100.0 / self.max_columns as f32;
        let mut blocks = Vec::new();
        let mut overflow = Vec::new();

        for (day_index, day_lessons) in self.lessons_by_day(lessons).into_iter().enumerate() {
            let owned: Vec<Lesson> = day_lessons.iter().map(|l| (*l).clone()).collect();
            let layout = compute_layout(&owned, &self.timezone, &config);

            for lesson in owned.iter() {
                let Some(position) = layout.position(&lesson.id) else {
                    continue;
                };
                let mut block = RenderedBlock {
                    lesson: lesson.clone(),
                    day_index,
                    top: position.top,
                    height: position.height,
                    left_percent: position.left_percent(),
                    width_percent: position.width_percent(),
                    state: BlockState::Normal,
                };
                if drag.is_some_and(|session| session.lesson.id == lesson.id) {
                    block.state = BlockState::Dimmed;
                }
                if let Some(session) = resize.filter(|session| session.lesson.id == lesson.id) {
                    block.state = BlockState::Resizing;
                    block.height = session.preview_height().max(MIN_BLOCK_HEIGHT);
                }
                blocks.push(block);
            }

            for (anchor_id, bucket) in layout.overflow {
                overflow.push(OverflowBlock {
                    label: bucket.label(),
                    anchor_id,
                    day_index,
                    top: bucket.top,
                    height: bucket.height,
                    left_percent: bucket.column_index as f32 * slot_width,
                    width_percent: slot_width,
                    lessons: bucket.lessons,
                });
            }
        }

        overflow.sort_by(|a, b| {
            a.day_index
                .cmp(&b.day_index)
                .then_with(|| a.top.total_cmp(&b.top))
                .then_with(|| a.anchor_id.cmp(&b.anchor_id))
        });

        if let Some(session) = drag.filter(|s| s.current_day_index < self.days.len()) {
            let minutes = session.lesson.duration().num_seconds() as f64 / 60.0;
            blocks.push(RenderedBlock {
                lesson: session.lesson.clone(),
                day_index: session.current_day_index,
                top: session.current_top,
                height: block_height(minutes, self.scale.hour_height),
                left_percent: 0.0,
                width_percent: 100.0,
                state: BlockState::Ghost,
            });
        }

        RenderedGrid {
            days: self.days.clone(),
            scale: self.scale,
            blocks,
            overflow,
        }
    }
}

impl RenderedGrid {
    /// Rectangle of a day column in grid coordinates
    fn column_rect(&self, geometry: &GridGeometry, day_index: usize) -> Rect {
        let width = geometry.column_width();
        Rect::from_min_size(
            pos2(day_index as f32 * width, 0.0),
            Vec2::new(width, self.scale.grid_height()),
        )
    }

    /// Route a viewport pointer position to a block, a resize handle, an
    /// overflow affordance or empty grid. Ghost blocks are never hit.
    pub fn hit(&self, geometry: &GridGeometry, pointer: Pos2, scroll: Vec2) -> GridHit<'_> {
        let p = geometry.to_grid(pointer, scroll);
        let day_index = geometry.day_index_at(p.x);
        let column = self.column_rect(geometry, day_index);

        let hit_block = self.blocks.iter().rev().find(|block| {
            block.day_index == day_index
                && block.state != BlockState::Ghost
                && block.rect_in(column).contains(p)
        });
        if let Some(block) = hit_block {
            if resize::hit_test(block.rect_in(column), p) {
                return GridHit::ResizeHandle(block);
            }
            return GridHit::Block(block);
        }

        self.overflow
            .iter()
            .find(|bucket| bucket.day_index == day_index && bucket.rect_in(column).contains(p))
            .map(GridHit::Overflow)
            .unwrap_or(GridHit::Empty { day_index })
    }

    pub fn block(&self, lesson_id: &str) -> Option<&RenderedBlock> {
        self.blocks
            .iter()
            .find(|block| block.lesson.id == lesson_id && block.state != BlockState::Ghost)
    }

    pub fn ghost(&self) -> Option<&RenderedBlock> {
        self.blocks.iter().find(|block| block.state == BlockState::Ghost)
    }
}
