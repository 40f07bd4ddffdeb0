use crate::StudySet;

pub fn filter_sets_by_text(sets: &[StudySet], query: &str) -> Vec<StudySet> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return sets.to_vec();
    }
    sets.iter()
        .filter(|s| {
            s.title.to_lowercase().contains(&q)
                || s.description
                    .as_ref()
                    .map(|d| d.to_lowercase().contains(&q))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}
