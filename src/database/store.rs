//! SQLite-backed question store.
//!
//! Owns the database connection and every persisted `Question`/`ReviewState`
//! pair. All mutating operations commit before returning; `create`, `delete`
//! and `reset_all` wrap their multi-row work in a transaction so they apply
//! all-or-nothing.

use crate::error::{Error, Result};
use crate::models::{Question, QuestionKind, ReviewState};
use rusqlite::{Connection, params};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Narrows `list`/`due` results by domain and/or question kind.
#[derive(Clone, Debug, Default)]
pub struct QuestionFilter {
    pub domain: Option<String>,
    pub kind: Option<QuestionKind>,
}

impl QuestionFilter {
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            kind: None,
        }
    }
}

pub struct QuestionStore {
    conn: Connection,
}

fn to_unix(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn from_unix(secs: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
}

impl QuestionStore {
    /// Opens (creating if necessary) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens the store at its default location under the user's home
    /// directory (`~/.security_plus_study_app/study.db`).
    pub fn open_default() -> Result<Self> {
        let base = directories::BaseDirs::new().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;
        let app_dir = base.home_dir().join(".security_plus_study_app");
        std::fs::create_dir_all(&app_dir)?;
        Self::open(&app_dir.join("study.db"))
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain TEXT NOT NULL,
                prompt TEXT NOT NULL,
                answer TEXT NOT NULL,
                kind TEXT NOT NULL
            )",
            (),
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS review_states (
                question_id INTEGER PRIMARY KEY,
                interval INTEGER NOT NULL DEFAULT 0,
                next_due INTEGER NOT NULL,
                streak INTEGER NOT NULL DEFAULT 0,
                total_attempts INTEGER NOT NULL DEFAULT 0,
                total_correct INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            )",
            (),
        )?;

        // Simulated study clock, so the schedule can be exercised without
        // waiting real days.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
            params![to_unix(SystemTime::now()).to_string()],
        )?;

        Ok(Self { conn })
    }

    /// Retrieves the simulated study date.
    pub fn current_time(&self) -> Result<SystemTime> {
        let value: String = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'current_date'",
            [],
            |row| row.get(0),
        )?;
        Ok(from_unix(value.parse().unwrap_or(0)))
    }

    /// Advances the simulated study date by 24 hours.
    pub fn advance_day(&self) -> Result<()> {
        let next = self.current_time()? + Duration::from_secs(24 * 60 * 60);
        self.conn.execute(
            "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
            params![to_unix(next).to_string()],
        )?;
        Ok(())
    }

    /// Creates a question together with its initial review state.
    ///
    /// Both rows are inserted in a single transaction. The new question is
    /// immediately due.
    pub fn create(
        &mut self,
        domain: &str,
        prompt: &str,
        answer: &str,
        kind: QuestionKind,
    ) -> Result<Question> {
        let domain = domain.trim();
        let prompt = prompt.trim();
        let answer = answer.trim();
        if domain.is_empty() {
            return Err(Error::Validation("domain must not be empty".into()));
        }
        if prompt.is_empty() {
            return Err(Error::Validation("question text must not be empty".into()));
        }
        if answer.is_empty() {
            return Err(Error::Validation("answer must not be empty".into()));
        }

        let now = self.current_time()?;
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO questions (domain, prompt, answer, kind) VALUES (?1, ?2, ?3, ?4)",
            params![domain, prompt, answer, kind.as_str()],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO review_states (question_id, interval, next_due, streak, total_attempts, total_correct)
             VALUES (?1, 0, ?2, 0, 0, 0)",
            params![id, to_unix(now)],
        )?;

        tx.commit()?;

        Ok(Question {
            id,
            domain: domain.to_string(),
            prompt: prompt.to_string(),
            answer: answer.to_string(),
            kind,
        })
    }

    /// Fetches a question and its review state by id.
    pub fn get(&self, id: i64) -> Result<(Question, ReviewState)> {
        let mut stmt = self.conn.prepare(
            "SELECT q.id, q.domain, q.prompt, q.answer, q.kind,
                    r.interval, r.next_due, r.streak, r.total_attempts, r.total_correct
             FROM questions q
             JOIN review_states r ON r.question_id = q.id
             WHERE q.id = ?1",
        )?;

        match stmt.query_row(params![id], row_to_pair) {
            Ok(pair) => Ok(pair),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes back scheduler output. The only path by which review state
    /// changes reach durable storage.
    pub fn update_review_state(&self, state: &ReviewState) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE review_states
             SET interval = ?1, next_due = ?2, streak = ?3, total_attempts = ?4, total_correct = ?5
             WHERE question_id = ?6",
            params![
                state.interval,
                to_unix(state.next_due),
                state.streak,
                state.total_attempts,
                state.total_correct,
                state.question_id
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(state.question_id));
        }
        Ok(())
    }

    /// Deletes a question and its review state together.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM review_states WHERE question_id = ?1",
            params![id],
        )?;
        let removed = tx.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(Error::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Lists questions with their review state in insertion order.
    /// Each call is a fresh, independent traversal.
    pub fn list(&self, filter: &QuestionFilter) -> Result<Vec<(Question, ReviewState)>> {
        self.query(filter, "q.id ASC", None, None)
    }

    /// Lists questions ordered by when they come due.
    pub fn list_by_due(&self, filter: &QuestionFilter) -> Result<Vec<(Question, ReviewState)>> {
        self.query(filter, "r.next_due ASC, q.id ASC", None, None)
    }

    /// Questions due at `now`, ordered ascending by `(next_due, id)` and
    /// truncated to `max_count`. An empty result means nothing to review.
    pub fn due(
        &self,
        filter: &QuestionFilter,
        max_count: usize,
        now: SystemTime,
    ) -> Result<Vec<(Question, ReviewState)>> {
        self.query(
            filter,
            "r.next_due ASC, q.id ASC",
            Some(now),
            Some(max_count),
        )
    }

    fn query(
        &self,
        filter: &QuestionFilter,
        order: &str,
        due_at: Option<SystemTime>,
        limit: Option<usize>,
    ) -> Result<Vec<(Question, ReviewState)>> {
        let mut sql = String::from(
            "SELECT q.id, q.domain, q.prompt, q.answer, q.kind,
                    r.interval, r.next_due, r.streak, r.total_attempts, r.total_correct
             FROM questions q
             JOIN review_states r ON r.question_id = q.id",
        );

        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(domain) = &filter.domain {
            clauses.push("q.domain = ?");
            args.push(domain.clone().into());
        }
        if let Some(kind) = filter.kind {
            clauses.push("q.kind = ?");
            args.push(kind.as_str().to_string().into());
        }
        if let Some(now) = due_at {
            clauses.push("r.next_due <= ?");
            args.push(to_unix(now).into());
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), row_to_pair)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Distinct domain labels, sorted.
    pub fn domains(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT domain FROM questions ORDER BY domain")?;
        let domains = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(domains)
    }

    /// Deletes every question and review state. Irreversible; runs in a
    /// single transaction so a failure leaves the store untouched.
    pub fn reset_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM review_states", ())?;
        tx.execute("DELETE FROM questions", ())?;
        tx.commit()?;
        Ok(())
    }
}

fn row_to_pair(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Question, ReviewState)> {
    let id: i64 = row.get(0)?;
    let kind: String = row.get(4)?;
    let kind = kind.parse::<QuestionKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
    })?;

    Ok((
        Question {
            id,
            domain: row.get(1)?,
            prompt: row.get(2)?,
            answer: row.get(3)?,
            kind,
        },
        ReviewState {
            question_id: id,
            interval: row.get(5)?,
            next_due: from_unix(row.get(6)?),
            streak: row.get(7)?,
            total_attempts: row.get(8)?,
            total_correct: row.get(9)?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scheduler;

    fn store_with(questions: &[(&str, &str, &str, QuestionKind)]) -> QuestionStore {
        let mut store = QuestionStore::open_in_memory().unwrap();
        for (domain, prompt, answer, kind) in questions {
            store.create(domain, prompt, answer, *kind).unwrap();
        }
        store
    }

    #[test]
    fn test_create_then_get_roundtrip() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let created = store
            .create(
                "Network Security",
                "What port does HTTPS use?",
                "443",
                QuestionKind::Flashcard,
            )
            .unwrap();

        let (question, state) = store.get(created.id).unwrap();
        assert_eq!(question, created);
        assert_eq!(state.interval, 0);
        assert_eq!(state.streak, 0);
        assert_eq!(state.total_attempts, 0);
        assert!(state.next_due <= SystemTime::now());
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let mut store = QuestionStore::open_in_memory().unwrap();

        for (domain, prompt, answer) in [
            ("", "q", "a"),
            ("d", "", "a"),
            ("d", "q", ""),
            ("  ", "q", "a"),
        ] {
            let err = store
                .create(domain, prompt, answer, QuestionKind::Flashcard)
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{err}");
        }

        // Nothing was persisted by the failed attempts.
        assert!(store.list(&QuestionFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = QuestionStore::open_in_memory().unwrap();
        assert!(matches!(store.get(42), Err(Error::NotFound(42))));
    }

    #[test]
    fn test_update_review_state_persists() {
        let mut store = QuestionStore::open_in_memory().unwrap();
        let q = store
            .create("General", "q", "a", QuestionKind::MultipleChoice)
            .unwrap();

        let (_, state) = store.get(q.id).unwrap();
        let now = store.current_time().unwrap();
        let next = scheduler::next_state(&state, true, now);
        store.update_review_state(&next).unwrap();

        let (_, reloaded) = store.get(q.id).unwrap();
        assert_eq!(reloaded, next);
    }

    #[test]
    fn test_update_review_state_missing_is_not_found() {
        let store = QuestionStore::open_in_memory().unwrap();
        let orphan = ReviewState::new(7, SystemTime::now());
        assert!(matches!(
            store.update_review_state(&orphan),
            Err(Error::NotFound(7))
        ));
    }

    #[test]
    fn test_delete_removes_both_records() {
        let mut store = store_with(&[("d", "q", "a", QuestionKind::Flashcard)]);
        let id = store.list(&QuestionFilter::default()).unwrap()[0].0.id;

        store.delete(id).unwrap();
        assert!(matches!(store.get(id), Err(Error::NotFound(_))));
        assert!(matches!(store.delete(id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_filters_by_domain_and_kind() {
        let store = store_with(&[
            ("Network Security", "q1", "a1", QuestionKind::Flashcard),
            ("Network Security", "q2", "a2", QuestionKind::MultipleChoice),
            ("Cryptography", "q3", "a3", QuestionKind::Flashcard),
        ]);

        let all = store.list(&QuestionFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        // Insertion order.
        assert!(all.windows(2).all(|w| w[0].0.id < w[1].0.id));

        let net = store.list(&QuestionFilter::domain("Network Security")).unwrap();
        assert_eq!(net.len(), 2);

        let filter = QuestionFilter {
            domain: Some("Network Security".into()),
            kind: Some(QuestionKind::Flashcard),
        };
        let both = store.list(&filter).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].0.prompt, "q1");
    }

    #[test]
    fn test_due_orders_and_truncates() {
        let mut store = store_with(&[
            ("d", "q1", "a", QuestionKind::Flashcard),
            ("d", "q2", "a", QuestionKind::Flashcard),
            ("d", "q3", "a", QuestionKind::Flashcard),
        ]);
        let now = store.current_time().unwrap();

        // Push q2 a level up so it is no longer due.
        let (_, s2) = store.get(2).unwrap();
        store
            .update_review_state(&scheduler::next_state(&s2, true, now))
            .unwrap();

        let due = store.due(&QuestionFilter::default(), 10, now).unwrap();
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|(_, s)| s.next_due <= now));
        assert_eq!(due[0].0.id, 1);
        assert_eq!(due[1].0.id, 3);

        let truncated = store.due(&QuestionFilter::default(), 1, now).unwrap();
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated[0].0.id, 1);
    }

    #[test]
    fn test_list_by_due_sorts_on_review_time() {
        let mut store = store_with(&[
            ("d", "q1", "a", QuestionKind::Flashcard),
            ("d", "q2", "a", QuestionKind::Flashcard),
        ]);
        let now = store.current_time().unwrap();

        // q1 moves a day out; q2 stays immediately due.
        let (_, s1) = store.get(1).unwrap();
        store
            .update_review_state(&scheduler::next_state(&s1, true, now))
            .unwrap();

        let by_due = store.list_by_due(&QuestionFilter::default()).unwrap();
        assert_eq!(by_due[0].0.id, 2);
        assert_eq!(by_due[1].0.id, 1);

        // Insertion order is unaffected.
        let by_id = store.list(&QuestionFilter::default()).unwrap();
        assert_eq!(by_id[0].0.id, 1);
    }

    #[test]
    fn test_due_question_reappears_after_advancing_days() {
        let mut store = store_with(&[("d", "q", "a", QuestionKind::Flashcard)]);
        let now = store.current_time().unwrap();

        let (_, state) = store.get(1).unwrap();
        store
            .update_review_state(&scheduler::next_state(&state, true, now))
            .unwrap();
        assert!(store.due(&QuestionFilter::default(), 10, now).unwrap().is_empty());

        // Level 1 delay is one day.
        store.advance_day().unwrap();
        let later = store.current_time().unwrap();
        assert_eq!(store.due(&QuestionFilter::default(), 10, later).unwrap().len(), 1);
    }

    #[test]
    fn test_domains_are_distinct_and_sorted() {
        let store = store_with(&[
            ("Threats", "q1", "a", QuestionKind::Flashcard),
            ("Architecture", "q2", "a", QuestionKind::Flashcard),
            ("Threats", "q3", "a", QuestionKind::Flashcard),
        ]);
        assert_eq!(store.domains().unwrap(), vec!["Architecture", "Threats"]);
    }

    #[test]
    fn test_reset_all_empties_the_store() {
        let mut store = store_with(&[
            ("d", "q1", "a", QuestionKind::Flashcard),
            ("d", "q2", "a", QuestionKind::PerformanceBased),
        ]);

        store.reset_all().unwrap();
        assert!(store.list(&QuestionFilter::default()).unwrap().is_empty());
        assert!(matches!(store.get(1), Err(Error::NotFound(1))));
        assert!(store.domains().unwrap().is_empty());
    }

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.db");

        {
            let mut store = QuestionStore::open(&path).unwrap();
            store
                .create("d", "q", "a", QuestionKind::Flashcard)
                .unwrap();
        }

        let store = QuestionStore::open(&path).unwrap();
        let all = store.list(&QuestionFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0.prompt, "q");
    }
}
