use crate::{StudySet, StudySetId, Term};
use std::collections::HashMap;

/// Dashboard row: a set plus how many cards it holds.
#[derive(Clone, Debug)]
pub struct SetOverview {
    pub set: StudySet,
    pub term_count: usize,
}

pub fn term_counts(terms: &[Term]) -> HashMap<StudySetId, usize> {
    let mut counts: HashMap<StudySetId, usize> = HashMap::new();
    for t in terms {
        *counts.entry(t.study_set_id).or_default() += 1;
    }
    counts
}

pub fn summarize_sets(sets: &[StudySet], terms: &[Term]) -> Vec<SetOverview> {
    let counts = term_counts(terms);
    let mut v: Vec<SetOverview> = sets
        .iter()
        .map(|s| SetOverview {
            set: s.clone(),
            term_count: counts.get(&s.id).copied().unwrap_or(0),
        })
        .collect();
    v.sort_by_key(|o| o.set.created_at);
    v
}
