//! Overlap layout for lessons sharing one calendar day.
//!
//! Lessons are grouped into clusters of transitively overlapping intervals,
//! each cluster is greedily coloured into columns, and clusters that need
//! more than `max_columns` columns spill their trailing columns into a single
//! overflow bucket. Every input lesson ends up either in `positions` or in
//! exactly one bucket.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::time_geometry::{block_height, TimeScale};
use crate::models::lesson::Lesson;
use crate::utils::date::to_local;

pub const DEFAULT_MAX_COLUMNS: usize = 3;

/// Rendered position of one visible lesson
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutPosition {
    pub top: f32,
    pub height: f32,
    pub column_index: usize,
    pub total_columns: usize,
}

impl LayoutPosition {
    pub fn width_percent(&self) -> f32 {
        100.0 / self.total_columns.max(1) as f32
    }

    pub fn left_percent(&self) -> f32 {
        self.column_index as f32 * self.width_percent()
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Lessons hidden behind a "+N more" affordance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowBucket {
    pub lessons: Vec<Lesson>,
    pub top: f32,
    pub height: f32,
    /// Column slot the affordance occupies (the last visible slot)
    pub column_index: usize,
}

impl OverflowBucket {
    pub fn label(&self) -> String {
        format!("+{} more", self.lessons.len())
    }
}

/// Layout of one day: visible positions keyed by lesson id, and overflow
/// buckets keyed by the id of their cluster's first lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayLayout {
    pub positions: HashMap<String, LayoutPosition>,
    pub overflow: HashMap<String, OverflowBucket>,
}

impl DayLayout {
    pub fn position(&self, lesson_id: &str) -> Option<&LayoutPosition> {
        self.positions.get(lesson_id)
    }

    /// Number of lessons placed, visible or hidden
    pub fn len(&self) -> usize {
        self.positions.len()
            + self
                .overflow
                .values()
                .map(|bucket| bucket.lessons.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.overflow.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub hour_height: f32,
    pub start_hour: u32,
    pub max_columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            hour_height: 60.0,
            start_hour: 7,
            max_columns: DEFAULT_MAX_COLUMNS,
        }
    }
}

/// Start ascending, longer lessons first on ties, id as the final tiebreak
fn layout_order(a: &Lesson, b: &Lesson) -> Ordering {
    a.start_at
        .cmp(&b.start_at)
        .then_with(|| b.end_at.cmp(&a.end_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Split sorted lessons into clusters of transitively overlapping intervals.
///
/// Input is sorted by start, so a lesson overlaps some member of the current
/// cluster exactly when it starts before the cluster's latest end.
fn clusters<'a>(sorted: &[&'a Lesson]) -> Vec<Vec<&'a Lesson>> {
    let mut clusters: Vec<Vec<&Lesson>> = Vec::new();
    let mut cluster_end: Option<DateTime<Utc>> = None;

    for &lesson in sorted {
        match (cluster_end, clusters.last_mut()) {
            (Some(end), Some(cluster)) if lesson.start_at < end => {
                cluster.push(lesson);
                cluster_end = Some(end.max(lesson.end_at));
            }
            _ => {
                cluster_end = Some(lesson.end_at);
                clusters.push(vec![lesson]);
            }
        }
    }

    clusters
}

/// First-fit column assignment; returns each member's column and the count
fn assign_columns(cluster: &[&Lesson]) -> (Vec<usize>, usize) {
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut assignments = Vec::with_capacity(cluster.len());

    for lesson in cluster {
        match column_ends.iter().position(|&end| end <= lesson.start_at) {
            Some(column) => {
                column_ends[column] = lesson.end_at;
                assignments.push(column);
            }
            None => {
                column_ends.push(lesson.end_at);
                assignments.push(column_ends.len() - 1);
            }
        }
    }

    (assignments, column_ends.len())
}

fn vertical_geometry(lesson: &Lesson, tz: &Tz, scale: &TimeScale) -> (f32, f32) {
    let top = scale.naive_time_to_y(to_local(tz, lesson.start_at).time());
    let minutes = lesson.duration().num_seconds() as f64 / 60.0;
    (top, block_height(minutes, scale.hour_height))
}

/// Lay out one day's lessons into columns.
pub fn compute_layout(lessons: &[Lesson], tz: &Tz, config: &LayoutConfig) -> DayLayout {
    let mut layout = DayLayout::default();
    if lessons.is_empty() {
        return layout;
    }

    let max_columns = config.max_columns.max(1);
    let scale = TimeScale::new(config.hour_height, config.start_hour, 24);

    let mut sorted: Vec<&Lesson> = lessons.iter().collect();
    sorted.sort_by(|a, b| layout_order(a, b));

    for cluster in clusters(&sorted) {
        let (columns, column_count) = assign_columns(&cluster);

        if column_count <= max_columns {
            for (lesson, column_index) in cluster.iter().zip(columns) {
                let (top, height) = vertical_geometry(lesson, tz, &scale);
                layout.positions.insert(
                    lesson.id.clone(),
                    LayoutPosition {
                        top,
                        height,
                        column_index,
                        total_columns: column_count,
                    },
                );
            }
            continue;
        }

        let visible_columns = max_columns - 1;
        let mut hidden: Vec<Lesson> = Vec::new();
        let mut span: Option<(f32, f32)> = None;

        for (lesson, column_index) in cluster.iter().zip(columns) {
            let (top, height) = vertical_geometry(lesson, tz, &scale);
            if column_index < visible_columns {
                layout.positions.insert(
                    lesson.id.clone(),
                    LayoutPosition {
                        top,
                        height,
                        column_index,
                        total_columns: max_columns,
                    },
                );
            } else {
                let bottom = top + height;
                span = Some(match span {
                    Some((min_top, max_bottom)) => (min_top.min(top), max_bottom.max(bottom)),
                    None => (top, bottom),
                });
                hidden.push((*lesson).clone());
            }
        }

        if let Some((top, bottom)) = span {
            log::debug!(
                "Cluster starting with {} needs {} columns, {} lessons overflow",
                cluster[0].id,
                column_count,
                hidden.len()
            );
            layout.overflow.insert(
                cluster[0].id.clone(),
                OverflowBucket {
                    lessons: hidden,
                    top,
                    height: bottom - top,
                    column_index: max_columns - 1,
                },
            );
        }
    }

    layout
}
