use studyset_core::{
    create_study_set, import_cards, load_drafts, save_existing, CardDraft, CoreError, MemoryRepo,
    Repository, StudySet, Term,
};
use uuid::Uuid;

fn complete(term: &str, definition: &str) -> CardDraft {
    CardDraft::new(term, definition, "")
}

#[tokio::test]
async fn end_to_end_new_set() {
    let repo = MemoryRepo::new();
    let user = Uuid::new_v4();

    let cards = vec![complete("Hola", "Hello"), complete("Adiós", "Goodbye")];
    let set = create_study_set(&repo, user, "Spanish", "", &cards)
        .await
        .unwrap();

    assert_eq!(set.user_id, user);
    assert_eq!(set.description, None);

    let sets = repo.list_study_sets(Some(user)).await.unwrap();
    assert_eq!(sets.len(), 1);

    let terms = repo.list_terms(Some(set.id)).await.unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].rank, 1);
    assert_eq!(terms[0].word, "Hola");
    assert_eq!(terms[0].definition, "Hello");
    assert_eq!(terms[1].rank, 2);
    assert_eq!(terms[1].word, "Adiós");
    assert_eq!(terms[1].definition, "Goodbye");
}

#[tokio::test]
async fn end_to_end_import_into_existing_set() {
    let repo = MemoryRepo::new();
    let user = Uuid::new_v4();

    // one already-saved card
    let set = StudySet::new(user, "Animals", None);
    repo.insert_study_set(&set).await.unwrap();
    let existing = Term::new(set.id, "Pájaro", "Bird", 1);
    repo.insert_term(&existing).await.unwrap();

    // edit session: the single card plus the blank pad
    let drafts = load_drafts(&repo, set.id).await.unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].persisted_id, Some(existing.id));

    let merged = import_cards(drafts, "Gato | Cat\nPerro | Dog").unwrap();
    assert_eq!(merged.len(), 3);

    save_existing(&repo, user, set.id, "Animals", "", &merged)
        .await
        .unwrap();

    let terms = repo.list_terms(Some(set.id)).await.unwrap();
    assert_eq!(terms.len(), 3);
    assert_eq!(
        terms.iter().map(|t| t.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    // the saved card was updated in place, not reinserted
    assert_eq!(terms[0].id, existing.id);
    assert_eq!(terms[1].word, "Gato");
    assert_eq!(terms[2].word, "Perro");
}

#[tokio::test]
async fn save_reassigns_ranks_and_deletes_dropped_cards() {
    let repo = MemoryRepo::new();
    let user = Uuid::new_v4();

    let cards = vec![
        complete("uno", "one"),
        complete("dos", "two"),
        complete("tres", "three"),
    ];
    let set = create_study_set(&repo, user, "Numbers", "counting", &cards)
        .await
        .unwrap();
    assert_eq!(set.description.as_deref(), Some("counting"));

    // drop the middle card, keep the rest
    let mut drafts = load_drafts(&repo, set.id).await.unwrap();
    drafts.remove(1);

    save_existing(&repo, user, set.id, "Numbers", "counting", &drafts)
        .await
        .unwrap();

    let terms = repo.list_terms(Some(set.id)).await.unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(
        terms.iter().map(|t| t.rank).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(terms[0].word, "uno");
    assert_eq!(terms[1].word, "tres");
}

#[tokio::test]
async fn full_replace_deletes_every_old_term() {
    let repo = MemoryRepo::new();
    let user = Uuid::new_v4();

    let set = create_study_set(
        &repo,
        user,
        "Colors",
        "",
        &[complete("rojo", "red"), complete("azul", "blue")],
    )
    .await
    .unwrap();
    let old_ids: Vec<_> = repo
        .list_terms(Some(set.id))
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();

    // brand-new drafts, none referencing a persisted id
    let replacement = vec![complete("verde", "green"), complete("negro", "black")];
    save_existing(&repo, user, set.id, "Colors", "", &replacement)
        .await
        .unwrap();

    let terms = repo.list_terms(Some(set.id)).await.unwrap();
    assert_eq!(terms.len(), 2);
    assert!(terms.iter().all(|t| !old_ids.contains(&t.id)));
}

#[tokio::test]
async fn save_touches_saved_at() {
    let repo = MemoryRepo::new();
    let user = Uuid::new_v4();

    let set = create_study_set(
        &repo,
        user,
        "Spanish",
        "",
        &[complete("a", "b"), complete("c", "d")],
    )
    .await
    .unwrap();

    let drafts = load_drafts(&repo, set.id).await.unwrap();
    let saved = save_existing(&repo, user, set.id, "Spanish", "", &drafts)
        .await
        .unwrap();
    assert!(saved.saved_at >= set.saved_at);

    let stored = repo.get_study_set(set.id).await.unwrap();
    assert_eq!(stored.saved_at, saved.saved_at);
}

#[tokio::test]
async fn non_owner_save_is_rejected_before_mutation() {
    let repo = MemoryRepo::new();
    let owner = Uuid::new_v4();

    let set = create_study_set(
        &repo,
        owner,
        "Spanish",
        "",
        &[complete("a", "b"), complete("c", "d")],
    )
    .await
    .unwrap();

    let drafts = load_drafts(&repo, set.id).await.unwrap();
    let err = save_existing(&repo, Uuid::new_v4(), set.id, "Hijacked", "", &drafts)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let stored = repo.get_study_set(set.id).await.unwrap();
    assert_eq!(stored.title, "Spanish");
    assert_eq!(repo.list_terms(Some(set.id)).await.unwrap().len(), 2);
}
