pub mod queries;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;

use crate::habit::{Habit, Period, format_timestamp, parse_timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitStreak {
    pub name: String,
    pub longest_streak: u32,
}

pub struct HabitStore {
    conn: Connection,
}

impl HabitStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    pub fn save(&self, habit: &Habit) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO habits (name, period, created_at, completed_at, streak, longest_streak, missed_periods)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name, period)
                 DO UPDATE SET created_at=excluded.created_at, completed_at=excluded.completed_at,
                               streak=excluded.streak, longest_streak=excluded.longest_streak,
                               missed_periods=excluded.missed_periods",
                params![
                    habit.name,
                    habit.period.as_str(),
                    format_timestamp(habit.created_at),
                    encode_history(&habit.completed_at),
                    habit.streak,
                    habit.longest_streak,
                    habit.missed_periods,
                ],
            )
            .with_context(|| format!("Failed to save habit '{}'", habit.name))?;

        Ok(())
    }

    pub fn load(&self, name: &str, period: Period) -> Result<Option<Habit>> {
        let row = self
            .conn
            .query_row(
                "SELECT created_at, completed_at, streak, longest_streak, missed_periods
                 FROM habits
                 WHERE name = ?1 AND period = ?2
                 ORDER BY id DESC
                 LIMIT 1",
                params![name, period.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, u32>(4)?,
                    ))
                },
            )
            .optional()
            .with_context(|| format!("Failed to load habit '{name}'"))?;

        row.map(|(created_at, completed_at, streak, longest_streak, missed_periods)| {
            Ok(Habit {
                name: name.to_string(),
                period,
                created_at: parse_timestamp(&created_at)?,
                completed_at: decode_history(&completed_at)?,
                streak,
                longest_streak,
                missed_periods,
            })
        })
        .transpose()
    }

    pub fn delete(&self, name: &str, period: Period) -> Result<usize> {
        self.conn
            .execute(
                "DELETE FROM habits WHERE name = ?1 AND period = ?2",
                params![name, period.as_str()],
            )
            .with_context(|| format!("Failed to delete habit '{name}'"))
    }

    pub fn exists(&self, name: &str, period: Period) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM habits WHERE name = ?1 AND period = ?2)",
                params![name, period.as_str()],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to check for habit '{name}'"))
    }

    pub fn habit_names(&self) -> Result<Vec<String>> {
        let mut statement = self
            .conn
            .prepare("SELECT DISTINCT name FROM habits ORDER BY name ASC")?;

        let names = statement
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list habit names")?;

        Ok(names)
    }

    pub fn habit_names_by_period(&self, period: Period) -> Result<Vec<String>> {
        let mut statement = self
            .conn
            .prepare("SELECT DISTINCT name FROM habits WHERE period = ?1 ORDER BY name ASC")?;

        let names = statement
            .query_map(params![period.as_str()], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to list {} habit names", period.as_str()))?;

        Ok(names)
    }

    pub fn longest_streaks(&self) -> Result<Vec<HabitStreak>> {
        let mut statement = self.conn.prepare(
            "SELECT name, MAX(longest_streak)
             FROM habits
             GROUP BY name
             ORDER BY name ASC",
        )?;

        let streaks = statement
            .query_map([], |row| {
                Ok(HabitStreak {
                    name: row.get(0)?,
                    longest_streak: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query longest streaks")?;

        Ok(streaks)
    }

    pub fn longest_streak_for(&self, name: &str, period: Period) -> Result<u32> {
        let longest = self
            .conn
            .query_row(
                "SELECT MAX(longest_streak) FROM habits WHERE name = ?1 AND period = ?2",
                params![name, period.as_str()],
                |row| row.get::<_, Option<u32>>(0),
            )
            .with_context(|| format!("Failed to query longest streak for '{name}'"))?;

        Ok(longest.unwrap_or(0))
    }
}

fn encode_history(history: &[NaiveDateTime]) -> String {
    history
        .iter()
        .copied()
        .map(format_timestamp)
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_history(raw: &str) -> Result<Vec<NaiveDateTime>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',').map(parse_timestamp).collect()
}

#[cfg(test)]
mod tests {
    use super::{HabitStore, HabitStreak, decode_history, encode_history};
    use crate::habit::{Habit, Period};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn day(offset: i64) -> NaiveDateTime {
        let base = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid base date");
        (base + Duration::days(offset))
            .and_hms_opt(21, 30, 0)
            .expect("valid base time")
    }

    fn open_store() -> (TempDir, HabitStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = HabitStore::open(&dir.path().join("habits.db")).expect("open store");
        (dir, store)
    }

    fn habit_created_on(name: &str, period: Period, created: NaiveDateTime) -> Habit {
        Habit {
            created_at: created,
            ..Habit::new(name, period)
        }
    }

    #[test]
    fn save_then_load_round_trips_every_field() {
        let (_dir, store) = open_store();
        let mut habit = habit_created_on("Exercise", Period::Daily, day(0));
        habit.check_off_at(&store, day(0)).expect("first check-off");
        habit.check_off_at(&store, day(1)).expect("second check-off");

        let loaded = store
            .load("Exercise", Period::Daily)
            .expect("load habit")
            .expect("habit present");

        assert_eq!(loaded, habit);
        assert_eq!(loaded.streak, 2);
        assert_eq!(loaded.longest_streak, 2);
        assert_eq!(loaded.missed_periods, 0);
        assert_eq!(loaded.completed_at, vec![day(0), day(1)]);
    }

    #[test]
    fn saving_the_same_identity_twice_keeps_a_single_row() {
        let (_dir, store) = open_store();
        let mut habit = habit_created_on("Meditate", Period::Daily, day(0));
        store.save(&habit).expect("initial save");
        habit.check_off_at(&store, day(0)).expect("check off");
        habit.check_off_at(&store, day(1)).expect("check off again");

        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(rows, 1);

        let loaded = store
            .load("Meditate", Period::Daily)
            .expect("load habit")
            .expect("habit present");
        assert_eq!(loaded.streak, 2);
    }

    #[test]
    fn the_same_name_under_each_period_is_a_separate_habit() {
        let (_dir, store) = open_store();
        let daily = habit_created_on("Clean House", Period::Daily, day(0));
        let mut weekly = habit_created_on("Clean House", Period::Weekly, day(0));
        store.save(&daily).expect("save daily");
        weekly.check_off_at(&store, day(6)).expect("check off weekly");

        let loaded_daily = store
            .load("Clean House", Period::Daily)
            .expect("load daily")
            .expect("daily present");
        let loaded_weekly = store
            .load("Clean House", Period::Weekly)
            .expect("load weekly")
            .expect("weekly present");

        assert_eq!(loaded_daily.streak, 0);
        assert_eq!(loaded_weekly.streak, 1);
    }

    #[test]
    fn schema_init_is_idempotent() {
        let (_dir, store) = open_store();
        let habit = habit_created_on("Read", Period::Daily, day(0));
        store.save(&habit).expect("save habit");

        store.init_schema().expect("re-init once");
        store.init_schema().expect("re-init twice");

        let loaded = store
            .load("Read", Period::Daily)
            .expect("load habit")
            .expect("habit present");
        assert_eq!(loaded, habit);
    }

    #[test]
    fn delete_reports_the_removed_count_and_later_loads_find_nothing() {
        let (_dir, store) = open_store();
        let habit = habit_created_on("Journal", Period::Daily, day(0));
        store.save(&habit).expect("save habit");

        assert_eq!(store.delete("Journal", Period::Daily).expect("delete"), 1);
        assert!(
            store
                .load("Journal", Period::Daily)
                .expect("load after delete")
                .is_none()
        );
        assert_eq!(
            store.delete("Journal", Period::Daily).expect("re-delete"),
            0
        );
    }

    #[test]
    fn exists_tracks_saves_and_deletes() {
        let (_dir, store) = open_store();
        assert!(!store.exists("Stretch", Period::Daily).expect("fresh check"));

        store
            .save(&habit_created_on("Stretch", Period::Daily, day(0)))
            .expect("save habit");
        assert!(store.exists("Stretch", Period::Daily).expect("after save"));
        assert!(
            !store
                .exists("Stretch", Period::Weekly)
                .expect("other period")
        );

        store.delete("Stretch", Period::Daily).expect("delete");
        assert!(
            !store
                .exists("Stretch", Period::Daily)
                .expect("after delete")
        );
    }

    #[test]
    fn name_listings_are_sorted_and_filterable_by_period() {
        let (_dir, store) = open_store();
        store
            .save(&habit_created_on("Walk", Period::Daily, day(0)))
            .expect("save Walk");
        store
            .save(&habit_created_on("Clean House", Period::Weekly, day(0)))
            .expect("save Clean House");
        store
            .save(&habit_created_on("Plan Week", Period::Weekly, day(0)))
            .expect("save Plan Week");

        assert_eq!(
            store.habit_names().expect("all names"),
            vec!["Clean House", "Plan Week", "Walk"]
        );
        assert_eq!(
            store
                .habit_names_by_period(Period::Weekly)
                .expect("weekly names"),
            vec!["Clean House", "Plan Week"]
        );
        assert_eq!(
            store
                .habit_names_by_period(Period::Daily)
                .expect("daily names"),
            vec!["Walk"]
        );
    }

    #[test]
    fn longest_streaks_take_the_max_across_periods_of_a_name() {
        let (_dir, store) = open_store();
        let mut weekly = habit_created_on("Clean House", Period::Weekly, day(0));
        weekly.longest_streak = 4;
        weekly.streak = 1;
        let mut daily = habit_created_on("Clean House", Period::Daily, day(0));
        daily.longest_streak = 2;
        let mut exercise = habit_created_on("Exercise", Period::Daily, day(0));
        exercise.longest_streak = 1;

        store.save(&weekly).expect("save weekly");
        store.save(&daily).expect("save daily");
        store.save(&exercise).expect("save exercise");

        assert_eq!(
            store.longest_streaks().expect("aggregate"),
            vec![
                HabitStreak {
                    name: "Clean House".to_string(),
                    longest_streak: 4,
                },
                HabitStreak {
                    name: "Exercise".to_string(),
                    longest_streak: 1,
                },
            ]
        );
        assert_eq!(
            store
                .longest_streak_for("Clean House", Period::Weekly)
                .expect("weekly streak"),
            4
        );
        assert_eq!(
            store
                .longest_streak_for("Clean House", Period::Daily)
                .expect("daily streak"),
            2
        );
    }

    #[test]
    fn longest_streak_for_an_unknown_identity_is_zero() {
        let (_dir, store) = open_store();
        assert_eq!(
            store
                .longest_streak_for("Sleep", Period::Daily)
                .expect("missing habit"),
            0
        );
        assert!(store.longest_streaks().expect("empty aggregate").is_empty());
    }

    #[test]
    fn empty_history_round_trips_as_an_empty_vec() {
        let (_dir, store) = open_store();
        let habit = habit_created_on("Floss", Period::Daily, day(0));
        store.save(&habit).expect("save habit");

        let loaded = store
            .load("Floss", Period::Daily)
            .expect("load habit")
            .expect("habit present");
        assert!(loaded.completed_at.is_empty());

        assert_eq!(encode_history(&[]), "");
        assert!(decode_history("").expect("decode empty").is_empty());
        assert_eq!(
            decode_history("2026-03-01 21:30:00,2026-03-02 21:30:00").expect("decode pair"),
            vec![day(0), day(1)]
        );
    }

    #[test]
    fn a_malformed_stored_timestamp_fails_the_load() {
        let (_dir, store) = open_store();
        let mut habit = habit_created_on("Run", Period::Daily, day(0));
        habit.check_off_at(&store, day(0)).expect("check off");

        store
            .conn
            .execute(
                "UPDATE habits SET completed_at = 'not-a-timestamp' WHERE name = ?1",
                ["Run"],
            )
            .expect("corrupt history column");

        assert!(store.load("Run", Period::Daily).is_err());
    }
}
