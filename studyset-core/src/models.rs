use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec;

pub type StudySetId = Uuid;
pub type TermId = Uuid;
pub type UserId = Uuid;
pub type CardId = Uuid;

/// A saved set must keep at least this many cards; draft collections are
/// padded with blanks up to it.
pub const MIN_CARDS: usize = 2;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySet {
    pub id: StudySetId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

impl StudySet {
    pub fn new(user_id: UserId, title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description,
            created_at: now,
            saved_at: now,
        }
    }
}

/// A persisted card. `definition` carries the codec-packed string; the
/// plain text and image URL are only split apart in memory.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub id: TermId,
    pub study_set_id: StudySetId,
    pub word: String,
    pub definition: String,
    /// 1-based position within the set, dense after every save.
    pub rank: i32,
    pub ephemeral: bool,
}

impl Term {
    pub fn new(
        study_set_id: StudySetId,
        word: impl Into<String>,
        definition: impl Into<String>,
        rank: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            study_set_id,
            word: word.into(),
            definition: definition.into(),
            rank,
            ephemeral: false,
        }
    }
}

/// One card in an editing session. Owned by the session, never persisted;
/// `persisted_id` links back to the Term record it was loaded from, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardDraft {
    pub local_id: CardId,
    pub term: String,
    pub definition_text: String,
    pub image_url: String,
    pub persisted_id: Option<TermId>,
}

impl CardDraft {
    pub fn blank() -> Self {
        Self {
            local_id: Uuid::new_v4(),
            term: String::new(),
            definition_text: String::new(),
            image_url: String::new(),
            persisted_id: None,
        }
    }

    pub fn new(
        term: impl Into<String>,
        definition_text: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            term: term.into(),
            definition_text: definition_text.into(),
            image_url: image_url.into(),
            persisted_id: None,
        }
    }

    /// Unpacks a persisted record into its editable parts.
    pub fn from_term(term: &Term) -> Self {
        let decoded = codec::decode(&term.definition);
        Self {
            local_id: Uuid::new_v4(),
            term: term.word.clone(),
            definition_text: decoded.text,
            image_url: decoded.image_url,
            persisted_id: Some(term.id),
        }
    }

    /// Complete cards are the only ones that get persisted.
    pub fn is_complete(&self) -> bool {
        !self.term.trim().is_empty() && !self.definition_text.trim().is_empty()
    }

    /// Cards worth keeping when an import is merged in: anything with
    /// content in either field, or already saved.
    pub fn has_content(&self) -> bool {
        !self.term.trim().is_empty()
            || !self.definition_text.trim().is_empty()
            || self.persisted_id.is_some()
    }
}
