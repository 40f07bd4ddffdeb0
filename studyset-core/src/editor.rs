//! The editing session around a study set: merging bulk imports into the
//! draft collection, validating a save, and diffing drafts against the
//! persisted terms into an explicit mutation plan.

use chrono::Utc;

use crate::{
    codec, import, CardDraft, CoreError, Repository, StudySet, StudySetId, Term, TermId, UserId,
    MIN_CARDS,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TermUpsert {
    Insert(Term),
    Update {
        id: TermId,
        word: String,
        definition: String,
        rank: i32,
    },
}

/// Everything a save mutates, computed up front. Deletions and upserts
/// target disjoint id sets by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavePlan {
    pub study_set_id: StudySetId,
    pub deletes: Vec<TermId>,
    pub upserts: Vec<TermUpsert>,
}

/// Top up a draft collection with blanks until the set minimum holds.
pub fn pad_to_minimum(cards: &mut Vec<CardDraft>) {
    while cards.len() < MIN_CARDS {
        cards.push(CardDraft::blank());
    }
}

/// Merge freshly imported records into the current collection: drafts with
/// content (or a saved record behind them) are kept, the imports are
/// appended in order, and the result is padded up to the minimum. Partially
/// filled and already-saved cards survive an import.
pub fn merge_imported(current: Vec<CardDraft>, imported: Vec<import::ImportedCard>) -> Vec<CardDraft> {
    let mut merged: Vec<CardDraft> = current.into_iter().filter(CardDraft::has_content).collect();
    merged.extend(
        imported
            .into_iter()
            .map(|c| CardDraft::new(c.term, c.definition, c.image_url)),
    );
    pad_to_minimum(&mut merged);
    merged
}

/// Parse a pasted block and merge it in. When no line parses, the import
/// fails as a whole and no merge happens.
pub fn import_cards(current: Vec<CardDraft>, text: &str) -> Result<Vec<CardDraft>, CoreError> {
    let imported: Vec<_> = import::parse_lines(text).collect();
    if imported.is_empty() {
        return Err(CoreError::Invalid("nothing to import"));
    }
    Ok(merge_imported(current, imported))
}

/// Save preconditions, checked in order; the first failing rule reports.
pub fn validate_for_save(title: &str, cards: &[CardDraft]) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Invalid("title is required"));
    }
    if cards.len() < MIN_CARDS {
        return Err(CoreError::Invalid("at least 2 flashcards are required"));
    }
    if cards.iter().filter(|c| c.is_complete()).count() < MIN_CARDS {
        return Err(CoreError::Invalid(
            "at least 2 complete flashcards are required",
        ));
    }
    Ok(())
}

/// Authorization, not validation: a mismatch aborts before any mutation.
pub fn ensure_owner(set: &StudySet, user: UserId) -> Result<(), CoreError> {
    if set.user_id != user {
        return Err(CoreError::Forbidden("not the owner of this study set"));
    }
    Ok(())
}

/// Diff the complete drafts against the persisted terms. Persisted ids not
/// referenced by any complete draft are deleted; when no draft references a
/// persisted id at all (a full replace), every existing term goes. Ranks
/// are reassigned densely from 1 in draft order.
pub fn plan_save(study_set_id: StudySetId, cards: &[CardDraft], existing: &[Term]) -> SavePlan {
    let complete: Vec<&CardDraft> = cards.iter().filter(|c| c.is_complete()).collect();

    let referenced: Vec<TermId> = complete.iter().filter_map(|c| c.persisted_id).collect();
    let deletes: Vec<TermId> = if referenced.is_empty() {
        existing.iter().map(|t| t.id).collect()
    } else {
        existing
            .iter()
            .map(|t| t.id)
            .filter(|id| !referenced.contains(id))
            .collect()
    };

    let upserts = complete
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let rank = i as i32 + 1;
            let definition =
                codec::encode(card.definition_text.trim(), card.image_url.trim());
            match card.persisted_id {
                Some(id) => TermUpsert::Update {
                    id,
                    word: card.term.trim().to_string(),
                    definition,
                    rank,
                },
                None => TermUpsert::Insert(Term::new(
                    study_set_id,
                    card.term.trim(),
                    definition,
                    rank,
                )),
            }
        })
        .collect();

    SavePlan {
        study_set_id,
        deletes,
        upserts,
    }
}

/// Seed an editing session from the store: decode every term and pad the
/// collection up to the minimum.
pub async fn load_drafts(
    repo: &dyn Repository,
    study_set_id: StudySetId,
) -> Result<Vec<CardDraft>, CoreError> {
    let terms = repo.list_terms(Some(study_set_id)).await?;
    let mut drafts: Vec<CardDraft> = terms.iter().map(CardDraft::from_term).collect();
    pad_to_minimum(&mut drafts);
    Ok(drafts)
}

/// Create a new set from a draft collection.
pub async fn create_study_set(
    repo: &dyn Repository,
    user: UserId,
    title: &str,
    description: &str,
    cards: &[CardDraft],
) -> Result<StudySet, CoreError> {
    validate_for_save(title, cards)?;

    let description = match description.trim() {
        "" => None,
        d => Some(d.to_string()),
    };
    let set = StudySet::new(user, title.trim(), description);
    repo.insert_study_set(&set).await?;

    let plan = plan_save(set.id, cards, &[]);
    repo.apply_save(&plan).await?;
    Ok(set)
}

/// Save an edited set: ownership, validation, the StudySet row (including
/// the `saved_at` touch), then the term plan.
pub async fn save_existing(
    repo: &dyn Repository,
    user: UserId,
    study_set_id: StudySetId,
    title: &str,
    description: &str,
    cards: &[CardDraft],
) -> Result<StudySet, CoreError> {
    let mut set = repo.get_study_set(study_set_id).await?;
    ensure_owner(&set, user)?;
    validate_for_save(title, cards)?;

    set.title = title.trim().to_string();
    set.description = match description.trim() {
        "" => None,
        d => Some(d.to_string()),
    };
    set.saved_at = Utc::now();
    repo.update_study_set(&set).await?;

    let existing = repo.list_terms(Some(study_set_id)).await?;
    let plan = plan_save(study_set_id, cards, &existing);
    repo.apply_save(&plan).await?;
    Ok(set)
}
