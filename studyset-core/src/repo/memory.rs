use crate::{CoreError, StudySet, StudySetId, Term, TermId, UserId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryRepo {
    sets: RwLock<HashMap<StudySetId, StudySet>>,
    terms: RwLock<HashMap<TermId, Term>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn insert_study_set(&self, set: &StudySet) -> Result<(), CoreError> {
        let mut m = self.sets.write();
        if m.contains_key(&set.id) {
            return Err(CoreError::Conflict("study set id already exists"));
        }
        m.insert(set.id, set.clone());
        Ok(())
    }

    async fn get_study_set(&self, id: StudySetId) -> Result<StudySet, CoreError> {
        self.sets
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("study set"))
    }

    async fn list_study_sets(&self, user_id: Option<UserId>) -> Result<Vec<StudySet>, CoreError> {
        let mut v: Vec<StudySet> = self.sets.read().values().cloned().collect();
        if let Some(uid) = user_id {
            v.retain(|s| s.user_id == uid);
        }
        v.sort_by_key(|s| s.created_at);
        Ok(v)
    }

    async fn update_study_set(&self, set: &StudySet) -> Result<StudySet, CoreError> {
        let mut m = self.sets.write();
        if !m.contains_key(&set.id) {
            return Err(CoreError::NotFound("study set"));
        }
        m.insert(set.id, set.clone());
        Ok(set.clone())
    }

    async fn delete_study_set(&self, id: StudySetId) -> Result<(), CoreError> {
        self.sets
            .write()
            .remove(&id)
            .ok_or(CoreError::NotFound("study set"))?;
        self.terms.write().retain(|_, t| t.study_set_id != id);
        Ok(())
    }

    async fn list_terms(&self, study_set_id: Option<StudySetId>) -> Result<Vec<Term>, CoreError> {
        let mut v: Vec<Term> = self.terms.read().values().cloned().collect();
        if let Some(sid) = study_set_id {
            v.retain(|t| t.study_set_id == sid);
        }
        v.sort_by_key(|t| (t.study_set_id, t.rank));
        Ok(v)
    }

    async fn insert_term(&self, term: &Term) -> Result<(), CoreError> {
        if !self.sets.read().contains_key(&term.study_set_id) {
            return Err(CoreError::NotFound("study set"));
        }
        self.terms.write().insert(term.id, term.clone());
        Ok(())
    }

    async fn update_term(
        &self,
        id: TermId,
        word: &str,
        definition: &str,
        rank: i32,
    ) -> Result<(), CoreError> {
        let mut m = self.terms.write();
        let Some(term) = m.get_mut(&id) else {
            return Err(CoreError::NotFound("term"));
        };
        term.word = word.to_string();
        term.definition = definition.to_string();
        term.rank = rank;
        Ok(())
    }

    async fn delete_terms(&self, ids: &[TermId]) -> Result<(), CoreError> {
        let mut m = self.terms.write();
        for id in ids {
            m.remove(id);
        }
        Ok(())
    }
}
