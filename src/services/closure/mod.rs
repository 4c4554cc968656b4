//! Organisation closure dates.
//!
//! Recurrence expansion takes a snapshot of these before it runs; the
//! snapshot comes from [`ClosureService::find_in_range`].

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::models::closure::ClosureDate;

pub struct ClosureService<'a> {
    conn: &'a Connection,
}

impl<'a> ClosureService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Store a closure. Returns its row id.
    pub fn create(&self, closure: &ClosureDate) -> Result<i64> {
        if !closure.applies_to_all_locations && closure.location_id.is_none() {
            return Err(anyhow!(
                "Closure on {} needs a location or must apply to all locations",
                closure.date
            ));
        }

        self.conn
            .execute(
                "INSERT INTO closure_dates (date, location_id, applies_to_all_locations, reason)
                 VALUES (?, ?, ?, ?)",
                params![
                    closure.date,
                    closure.location_id,
                    closure.applies_to_all_locations as i32,
                    closure.reason,
                ],
            )
            .context("Failed to insert closure date")?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM closure_dates WHERE id = ?", [id])
            .context("Failed to delete closure date")?;

        if rows_affected == 0 {
            return Err(anyhow!("Closure date with id {} not found", id));
        }
        Ok(())
    }

    /// Closures on dates in `[from, to]` inclusive, ordered by date.
    pub fn find_in_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ClosureDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, location_id, applies_to_all_locations, reason
             FROM closure_dates
             WHERE date >= ? AND date <= ?
             ORDER BY date ASC, id ASC",
        )?;

        let closures = stmt
            .query_map(params![from, to], map_closure_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(closures)
    }
}

fn map_closure_row(row: &Row<'_>) -> rusqlite::Result<ClosureDate> {
    Ok(ClosureDate {
        date: row.get(0)?,
        location_id: row.get(1)?,
        applies_to_all_locations: row.get::<_, i32>(2)? != 0,
        reason: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::Database;

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_find_in_range_is_inclusive() {
        let db = setup_test_db();
        let service = ClosureService::new(db.connection());

        service
            .create(&ClosureDate::all_locations(date(1)).with_reason("New Year"))
            .unwrap();
        service.create(&ClosureDate::for_location(date(8), "north")).unwrap();
        service.create(&ClosureDate::all_locations(date(20))).unwrap();

        let found = service.find_in_range(date(1), date(8)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].reason.as_deref(), Some("New Year"));
        assert!(found[0].applies_to_all_locations);
        assert_eq!(found[1].location_id.as_deref(), Some("north"));
        assert!(!found[1].applies_to_all_locations);
    }

    #[test]
    fn test_create_rejects_unscoped_closure() {
        let db = setup_test_db();
        let service = ClosureService::new(db.connection());
        let closure = ClosureDate {
            date: date(3),
            location_id: None,
            applies_to_all_locations: false,
            reason: None,
        };
        assert!(service.create(&closure).is_err());
    }

    #[test]
    fn test_delete_closure() {
        let db = setup_test_db();
        let service = ClosureService::new(db.connection());
        let id = service.create(&ClosureDate::all_locations(date(2))).unwrap();
        service.delete(id).unwrap();
        assert!(service.find_in_range(date(1), date(31)).unwrap().is_empty());
        assert!(service.delete(id).is_err());
    }
}
