use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyset_core::{codec, CardDraft, StudySet, Term};
use uuid::Uuid;

#[derive(Serialize)]
pub struct SetOut {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub term_count: usize,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CardOut {
    pub id: Uuid,
    pub word: String,
    pub definition: String,
    pub image_url: String,
    pub rank: i32,
}

#[derive(Serialize)]
pub struct SetDetailOut {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
    pub cards: Vec<CardOut>,
}

impl SetDetailOut {
    pub fn from_parts(set: StudySet, terms: Vec<Term>) -> Self {
        let cards = terms
            .into_iter()
            .map(|t| {
                let d = codec::decode(&t.definition);
                CardOut {
                    id: t.id,
                    word: t.word,
                    definition: d.text,
                    image_url: d.image_url,
                    rank: t.rank,
                }
            })
            .collect();
        Self {
            id: set.id,
            user_id: set.user_id,
            title: set.title,
            description: set.description,
            created_at: set.created_at,
            saved_at: set.saved_at,
            cards,
        }
    }
}

#[derive(Deserialize)]
pub struct CardIn {
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub image_url: String,
    /// Present when the card was loaded from an existing record.
    #[serde(default)]
    pub persisted_id: Option<Uuid>,
}

impl CardIn {
    pub fn into_draft(self) -> CardDraft {
        let mut draft = CardDraft::new(self.term, self.definition, self.image_url);
        draft.persisted_id = self.persisted_id;
        draft
    }
}

#[derive(Deserialize)]
pub struct CreateSetIn {
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cards: Vec<CardIn>,
}

#[derive(Deserialize)]
pub struct SaveSetIn {
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cards: Vec<CardIn>,
}

#[derive(Deserialize)]
pub struct ImportIn {
    pub user_id: Uuid,
    pub text: String,
}

#[derive(Serialize)]
pub struct CreatedOut {
    pub id: Uuid,
}
