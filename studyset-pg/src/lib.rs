use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use studyset_core::{
    repo::Repository, CoreError, SavePlan, StudySet, StudySetId, Term, TermId, TermUpsert, UserId,
};

pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|_| CoreError::Storage("pg connect"))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        // Mirrors migrations (id generation done in app; DB defaults still helpful)
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS study_sets (
          id           uuid PRIMARY KEY,
          user_id      uuid NOT NULL,
          title        text NOT NULL,
          description  text,
          created_at   timestamptz NOT NULL,
          saved_at     timestamptz NOT NULL
        );

        CREATE TABLE IF NOT EXISTS terms (
          id            uuid PRIMARY KEY,
          study_set_id  uuid NOT NULL REFERENCES study_sets(id) ON DELETE CASCADE,
          word          text NOT NULL,
          definition    text NOT NULL,
          rank          integer NOT NULL,
          ephemeral     boolean NOT NULL DEFAULT false
        );

        CREATE INDEX IF NOT EXISTS idx_sets_user ON study_sets (user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_terms_set_rank ON terms (study_set_id, rank);
        "#;

        for chunk in STMT.split(';') {
            let sql = chunk.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|_| CoreError::Storage("pg schema"))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepo {
    // ===== Study sets =====
    async fn insert_study_set(&self, set: &StudySet) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO study_sets (id,user_id,title,description,created_at,saved_at) VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(set.id)
        .bind(set.user_id)
        .bind(&set.title)
        .bind(set.description.clone())
        .bind(set.created_at)
        .bind(set.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("pg insert study set"))?;
        Ok(())
    }

    async fn get_study_set(&self, id: StudySetId) -> Result<StudySet, CoreError> {
        let row = sqlx::query(
            "SELECT id,user_id,title,description,created_at,saved_at FROM study_sets WHERE id=$1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("pg read study set"))?;
        let row = row.ok_or(CoreError::NotFound("study set"))?;
        Ok(row_into_set(row))
    }

    async fn list_study_sets(&self, user_id: Option<UserId>) -> Result<Vec<StudySet>, CoreError> {
        let rows = if let Some(uid) = user_id {
            sqlx::query(
                "SELECT id,user_id,title,description,created_at,saved_at
                 FROM study_sets WHERE user_id=$1 ORDER BY created_at ASC",
            )
            .bind(uid)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg list study sets"))?
        } else {
            sqlx::query(
                "SELECT id,user_id,title,description,created_at,saved_at
                 FROM study_sets ORDER BY created_at ASC",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg list study sets"))?
        };
        Ok(rows.into_iter().map(row_into_set).collect())
    }

    async fn update_study_set(&self, set: &StudySet) -> Result<StudySet, CoreError> {
        let res = sqlx::query(
            "UPDATE study_sets SET title=$1, description=$2, saved_at=$3 WHERE id=$4",
        )
        .bind(&set.title)
        .bind(set.description.clone())
        .bind(set.saved_at)
        .bind(set.id)
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("pg update study set"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound("study set"));
        }
        Ok(set.clone())
    }

    async fn delete_study_set(&self, id: StudySetId) -> Result<(), CoreError> {
        let res = sqlx::query("DELETE FROM study_sets WHERE id=$1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg del study set"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound("study set"));
        }
        Ok(())
    }

    // ===== Terms =====
    async fn list_terms(&self, study_set_id: Option<StudySetId>) -> Result<Vec<Term>, CoreError> {
        let rows = if let Some(sid) = study_set_id {
            sqlx::query(
                "SELECT id,study_set_id,word,definition,rank,ephemeral
                 FROM terms WHERE study_set_id=$1 ORDER BY rank ASC",
            )
            .bind(sid)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg list terms"))?
        } else {
            sqlx::query(
                "SELECT id,study_set_id,word,definition,rank,ephemeral
                 FROM terms ORDER BY study_set_id ASC, rank ASC",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg list terms"))?
        };
        Ok(rows.into_iter().map(row_into_term).collect())
    }

    async fn insert_term(&self, term: &Term) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO terms (id,study_set_id,word,definition,rank,ephemeral) VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(term.id)
        .bind(term.study_set_id)
        .bind(&term.word)
        .bind(&term.definition)
        .bind(term.rank)
        .bind(term.ephemeral)
        .execute(&self.pool)
        .await
        .map_err(|_| CoreError::Storage("pg insert term"))?;
        Ok(())
    }

    async fn update_term(
        &self,
        id: TermId,
        word: &str,
        definition: &str,
        rank: i32,
    ) -> Result<(), CoreError> {
        let res = sqlx::query("UPDATE terms SET word=$1, definition=$2, rank=$3 WHERE id=$4")
            .bind(word)
            .bind(definition)
            .bind(rank)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg update term"))?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound("term"));
        }
        Ok(())
    }

    async fn delete_terms(&self, ids: &[TermId]) -> Result<(), CoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM terms WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|_| CoreError::Storage("pg del terms"))?;
        Ok(())
    }

    // The whole plan commits or rolls back as one transaction.
    async fn apply_save(&self, plan: &SavePlan) -> Result<(), CoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|_| CoreError::Storage("tx"))?;

        if !plan.deletes.is_empty() {
            sqlx::query("DELETE FROM terms WHERE id = ANY($1)")
                .bind(&plan.deletes)
                .execute(&mut *tx)
                .await
                .map_err(|_| CoreError::Storage("pg del terms"))?;
        }

        for upsert in &plan.upserts {
            match upsert {
                TermUpsert::Insert(term) => {
                    sqlx::query(
                        "INSERT INTO terms (id,study_set_id,word,definition,rank,ephemeral) VALUES ($1,$2,$3,$4,$5,$6)",
                    )
                    .bind(term.id)
                    .bind(term.study_set_id)
                    .bind(&term.word)
                    .bind(&term.definition)
                    .bind(term.rank)
                    .bind(term.ephemeral)
                    .execute(&mut *tx)
                    .await
                    .map_err(|_| CoreError::Storage("pg insert term"))?;
                }
                TermUpsert::Update {
                    id,
                    word,
                    definition,
                    rank,
                } => {
                    let res =
                        sqlx::query("UPDATE terms SET word=$1, definition=$2, rank=$3 WHERE id=$4")
                            .bind(word)
                            .bind(definition)
                            .bind(rank)
                            .bind(id)
                            .execute(&mut *tx)
                            .await
                            .map_err(|_| CoreError::Storage("pg update term"))?;
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

// ===== helpers =====
fn row_into_set(row: sqlx::postgres::PgRow) -> StudySet {
    StudySet {
        id: row.get::<uuid::Uuid, _>("id"),
        user_id: row.get::<uuid::Uuid, _>("user_id"),
        title: row.get::<String, _>("title"),
        description: row.get::<Option<String>, _>("description"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        saved_at: row.get::<DateTime<Utc>, _>("saved_at"),
    }
}

fn row_into_term(row: sqlx::postgres::PgRow) -> Term {
    Term {
        id: row.get::<uuid::Uuid, _>("id"),
        study_set_id: row.get::<uuid::Uuid, _>("study_set_id"),
        word: row.get::<String, _>("word"),
        definition: row.get::<String, _>("definition"),
        rank: row.get::<i32, _>("rank"),
        ephemeral: row.get::<bool, _>("ephemeral"),
    }
}
