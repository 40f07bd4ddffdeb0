use crate::{CoreError, SavePlan, StudySet, StudySetId, Term, TermId, TermUpsert, UserId};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryRepo;

#[async_trait]
pub trait Repository: Send + Sync {
    // Study sets
    async fn insert_study_set(&self, set: &StudySet) -> Result<(), CoreError>;
    async fn get_study_set(&self, id: StudySetId) -> Result<StudySet, CoreError>;
    async fn list_study_sets(&self, user_id: Option<UserId>) -> Result<Vec<StudySet>, CoreError>;
    async fn update_study_set(&self, set: &StudySet) -> Result<StudySet, CoreError>;
    async fn delete_study_set(&self, id: StudySetId) -> Result<(), CoreError>;

    // Terms; `None` lists every term, ordered by set then rank
    async fn list_terms(&self, study_set_id: Option<StudySetId>) -> Result<Vec<Term>, CoreError>;
    async fn insert_term(&self, term: &Term) -> Result<(), CoreError>;
    async fn update_term(
        &self,
        id: TermId,
        word: &str,
        definition: &str,
        rank: i32,
    ) -> Result<(), CoreError>;
    /// Idempotent: ids that are already gone are not an error.
    async fn delete_terms(&self, ids: &[TermId]) -> Result<(), CoreError>;

    /// Apply a reconciled save: deletions are resolved first, then every
    /// upsert is issued concurrently and joined. The default path gives no
    /// rollback guarantee when one mutation fails mid-plan; backends that
    /// can wrap the plan in a transaction override this.
    async fn apply_save(&self, plan: &SavePlan) -> Result<(), CoreError> {
        self.delete_terms(&plan.deletes).await?;
        let upserts = plan.upserts.iter().map(|upsert| async move {
            match upsert {
                TermUpsert::Insert(term) => self.insert_term(term).await,
                TermUpsert::Update {
                    id,
                    word,
                    definition,
                    rank,
                } => self.update_term(*id, word, definition, *rank).await,
            }
        });
        futures::future::try_join_all(upserts).await?;
        Ok(())
    }
}
