use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::Path;
use studyset_core::{
    repo::Repository, CoreError, SavePlan, StudySet, StudySetId, Term, TermId, TermUpsert, UserId,
};

pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let url = format!("sqlite://{}?mode=rwc", path.as_ref().to_string_lossy());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub async fn open_memory() -> Result<Self, CoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect("sqlite::memory:")
            .await
            .map_err(|_| CoreError::Storage("sqlite connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        // Create tables/indexes if they do not exist (mirrors migrations).
        const STMT: &str = r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS study_sets (
          id           TEXT PRIMARY KEY,
          user_id      TEXT NOT NULL,
          title        TEXT NOT NULL,
          description  TEXT,
          created_at   TEXT NOT NULL,
          saved_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS terms (
          id            TEXT PRIMARY KEY,
          study_set_id  TEXT NOT NULL,
          word          TEXT NOT NULL,
          definition    TEXT NOT NULL,
          rank          INTEGER NOT NULL,
          ephemeral     INTEGER NOT NULL DEFAULT 0,
          FOREIGN KEY(study_set_id) REFERENCES study_sets(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_sets_user ON study_sets (user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_terms_set_rank ON terms (study_set_id, rank);
        "#;

        // Execute statements one by one for compatibility.
        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|_| CoreError::Storage("sqlite schema"))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for SqliteRepo {
    // ===== Study sets =====
    async fn insert_study_set(&self, set: &StudySet) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO study_sets (id,user_id,title,description,created_at,saved_at) VALUES (?,?,?,?,?,?)",
        )
        .bind(set.id.to_string())
        .bind(set.user_id.to_string())
        .bind(&set.title)
        .bind(set.description.clone())
        .bind(dt_to_str(set.created_at))
        .bind(dt_to_str(set.saved_at))
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("insert study set"))?;
        Ok(())
    }

    async fn get_study_set(&self, id: StudySetId) -> Result<StudySet, CoreError> {
        let row = sqlx::query(
            "SELECT id,user_id,title,description,created_at,saved_at FROM study_sets WHERE id=?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("read study set"))?;
        let row = row.ok_or(CoreError::NotFound("study set"))?;
        row_into_set(row)
    }

    async fn list_study_sets(&self, user_id: Option<UserId>) -> Result<Vec<StudySet>, CoreError> {
        let rows = if let Some(uid) = user_id {
            sqlx::query(
                "SELECT id,user_id,title,description,created_at,saved_at
                 FROM study_sets WHERE user_id=? ORDER BY created_at ASC",
            )
            .bind(uid.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list study sets"))?
        } else {
            sqlx::query(
                "SELECT id,user_id,title,description,created_at,saved_at
                 FROM study_sets ORDER BY created_at ASC",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list study sets"))?
        };
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(row_into_set(row)?);
        }
        Ok(v)
    }

    async fn update_study_set(&self, set: &StudySet) -> Result<StudySet, CoreError> {
        let res = sqlx::query(
            "UPDATE study_sets SET title=?, description=?, saved_at=? WHERE id=?",
        )
        .bind(&set.title)
        .bind(set.description.clone())
        .bind(dt_to_str(set.saved_at))
        .bind(set.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("update study set"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound("study set"));
        }
        Ok(set.clone())
    }

    async fn delete_study_set(&self, id: StudySetId) -> Result<(), CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|_| CoreError::Storage("tx"))?;

        // Manual cascade (robust even if PRAGMA foreign_keys is off)
        sqlx::query("DELETE FROM terms WHERE study_set_id=?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|_| CoreError::Storage("del terms"))?;

        let res = sqlx::query("DELETE FROM study_sets WHERE id=?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|_| CoreError::Storage("del study set"))?;
        if res.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Err(CoreError::NotFound("study set"));
        }

        tx.commit()
            .await
            .map_err(|_| CoreError::Storage("tx commit"))
    }

    // ===== Terms =====
    async fn list_terms(&self, study_set_id: Option<StudySetId>) -> Result<Vec<Term>, CoreError> {
        let rows = if let Some(sid) = study_set_id {
            sqlx::query(
                "SELECT id,study_set_id,word,definition,rank,ephemeral
                 FROM terms WHERE study_set_id=? ORDER BY rank ASC",
            )
            .bind(sid.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list terms"))?
        } else {
            sqlx::query(
                "SELECT id,study_set_id,word,definition,rank,ephemeral
                 FROM terms ORDER BY study_set_id ASC, rank ASC",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("list terms"))?
        };
        let mut v = Vec::with_capacity(rows.len());
        for row in rows {
            v.push(row_into_term(row)?);
        }
        Ok(v)
    }

    async fn insert_term(&self, term: &Term) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO terms (id,study_set_id,word,definition,rank,ephemeral) VALUES (?,?,?,?,?,?)",
        )
        .bind(term.id.to_string())
        .bind(term.study_set_id.to_string())
        .bind(&term.word)
        .bind(&term.definition)
        .bind(term.rank as i64)
        .bind(bool_to_i(term.ephemeral))
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("insert term"))?;
        Ok(())
    }

    async fn update_term(
        &self,
        id: TermId,
        word: &str,
        definition: &str,
        rank: i32,
    ) -> Result<(), CoreError> {
        let res = sqlx::query("UPDATE terms SET word=?, definition=?, rank=? WHERE id=?")
            .bind(word)
            .bind(definition)
            .bind(rank as i64)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("update term"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound("term"));
        }
        Ok(())
    }

    async fn delete_terms(&self, ids: &[TermId]) -> Result<(), CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|_| CoreError::Storage("tx"))?;
        for id in ids {
            sqlx::query("DELETE FROM terms WHERE id=?")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|_| CoreError::Storage("del term"))?;
        }
        tx.commit()
            .await
            .map_err(|_| CoreError::Storage("tx commit"))
    }

    // The whole plan commits or rolls back as one transaction.
    async fn apply_save(&self, plan: &SavePlan) -> Result<(), CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|_| CoreError::Storage("tx"))?;

        for id in &plan.deletes {
            sqlx::query("DELETE FROM terms WHERE id=?")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|_| CoreError::Storage("del term"))?;
        }

        for upsert in &plan.upserts {
            match upsert {
                TermUpsert::Insert(term) => {
                    sqlx::query(
                        "INSERT INTO terms (id,study_set_id,word,definition,rank,ephemeral) VALUES (?,?,?,?,?,?)",
                    )
                    .bind(term.id.to_string())
                    .bind(term.study_set_id.to_string())
                    .bind(&term.word)
                    .bind(&term.definition)
                    .bind(term.rank as i64)
                    .bind(bool_to_i(term.ephemeral))
                    .execute(&mut *tx)
                    .await
                    .map_err(|_| CoreError::Storage("insert term"))?;
                }
                TermUpsert::Update {
                    id,
                    word,
                    definition,
                    rank,
                } => {
                    let res = sqlx::query("UPDATE terms SET word=?, definition=?, rank=? WHERE id=?")
                        .bind(word)
                        .bind(definition)
                        .bind(*rank as i64)
                        .bind(id.to_string())
                        .execute(&mut *tx)
                        .await
                        .map_err(|_| CoreError::Storage("update term"))?;
                    if res.rows_affected() == 0 {
                        tx.rollback().await.ok();
                        return Err(CoreError::NotFound("term"));
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(|_| CoreError::Storage("tx commit"))
    }
}

// ===== Helpers =====
fn uuid_from_str(s: String) -> Result<uuid::Uuid, CoreError> {
    uuid::Uuid::parse_str(&s).map_err(|_| CoreError::Invalid("uuid"))
}

fn dt_to_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn dt_from_str(s: String) -> Result<DateTime<Utc>, CoreError> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map_err(|_| CoreError::Invalid("datetime"))
        .map(|dt| dt.with_timezone(&Utc))
}

fn bool_to_i(b: bool) -> i64 {
    if b {
        1
    } else {
        0
    }
}

fn row_into_set(row: sqlx::sqlite::SqliteRow) -> Result<StudySet, CoreError> {
    Ok(StudySet {
        id: uuid_from_str(row.get::<String, _>("id"))?,
        user_id: uuid_from_str(row.get::<String, _>("user_id"))?,
        title: row.get::<String, _>("title"),
        description: row.get::<Option<String>, _>("description"),
        created_at: dt_from_str(row.get::<String, _>("created_at"))?,
        saved_at: dt_from_str(row.get::<String, _>("saved_at"))?,
    })
}

fn row_into_term(row: sqlx::sqlite::SqliteRow) -> Result<Term, CoreError> {
    Ok(Term {
        id: uuid_from_str(row.get::<String, _>("id"))?,
        study_set_id: uuid_from_str(row.get::<String, _>("study_set_id"))?,
        word: row.get::<String, _>("word"),
        definition: row.get::<String, _>("definition"),
        rank: row.get::<i64, _>("rank") as i32,
        ephemeral: row.get::<i64, _>("ephemeral") != 0,
    })
}
