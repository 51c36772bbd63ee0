pub const CREATE_HABITS: &str = r#"
CREATE TABLE IF NOT EXISTS habits (
  id             INTEGER PRIMARY KEY AUTOINCREMENT,
  name           TEXT NOT NULL,
  period         TEXT NOT NULL,
  created_at     TEXT NOT NULL,
  completed_at   TEXT NOT NULL DEFAULT '',
  streak         INTEGER NOT NULL DEFAULT 0,
  longest_streak INTEGER NOT NULL DEFAULT 0,
  missed_periods INTEGER NOT NULL DEFAULT 0,
  UNIQUE (name, period)
);
"#;

pub const INDEX_HABITS_PERIOD: &str =
    "CREATE INDEX IF NOT EXISTS idx_habits_period ON habits(period);";

pub fn schema_statements() -> Vec<&'static str> {
    vec![CREATE_HABITS, INDEX_HABITS_PERIOD]
}
