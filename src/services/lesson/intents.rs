use super::LessonService;
use crate::models::lesson::Lesson;
use crate::services::recurrence::SeriesExpansion;
use crate::ui::gesture::{RescheduleIntent, ResizeIntent};
use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

impl<'a> LessonService<'a> {
    /// Persist a confirmed drag. Returns the stored lesson.
    pub fn apply_reschedule(&self, intent: &RescheduleIntent) -> Result<Lesson> {
        let mut lesson = self
            .get(&intent.lesson.id)?
            .ok_or_else(|| anyhow!("Lesson with id {} not found", intent.lesson.id))?;
        lesson.start_at = intent.new_start;
        lesson.end_at = intent.new_end;
        self.update(&lesson)?;

        log::info!("Rescheduled lesson {} to {}", lesson.id, lesson.start_at);
        Ok(lesson)
    }

    /// Persist a confirmed resize. The start is left as stored.
    pub fn apply_resize(&self, intent: &ResizeIntent) -> Result<Lesson> {
        let mut lesson = self
            .get(&intent.lesson.id)?
            .ok_or_else(|| anyhow!("Lesson with id {} not found", intent.lesson.id))?;
        lesson.end_at = intent.new_end;
        self.update(&lesson)?;

        log::info!("Resized lesson {} to end at {}", lesson.id, lesson.end_at);
        Ok(lesson)
    }

    /// Materialise an expanded series from `template`.
    ///
    /// Every lesson gets a fresh id, the template's duration and resources,
    /// and one shared recurrence id. `students` are attached to each lesson.
    /// Runs in a single transaction.
    pub fn create_series(
        &self,
        template: &Lesson,
        expansion: &SeriesExpansion,
        students: &[String],
    ) -> Result<Vec<Lesson>> {
        if expansion.is_empty() {
            return Ok(Vec::new());
        }

        let recurrence_id = Uuid::new_v4().to_string();
        let duration = template.duration();

        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to start series transaction")?;
        let service = LessonService::new(&tx);

        let mut created = Vec::with_capacity(expansion.len());
        for &start_at in &expansion.instants {
            let lesson = Lesson {
                id: Uuid::new_v4().to_string(),
                start_at,
                end_at: start_at + duration,
                recurrence_id: Some(recurrence_id.clone()),
                ..template.clone()
            };
            let lesson = service.create(lesson)?;
            for student in students {
                service.add_participant(&lesson.id, student)?;
            }
            created.push(lesson);
        }

        tx.commit().context("Failed to commit series")?;
        log::info!(
            "Created series {} with {} lessons",
            recurrence_id,
            created.len()
        );
        Ok(created)
    }
}
