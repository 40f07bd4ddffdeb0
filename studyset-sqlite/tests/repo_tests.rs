use studyset_core::{
    create_study_set, import_cards, load_drafts, save_existing, CardDraft, CoreError, Repository,
    SavePlan, Term, TermUpsert,
};
use studyset_sqlite::SqliteRepo;
use uuid::Uuid;

fn complete(term: &str, definition: &str) -> CardDraft {
    CardDraft::new(term, definition, "")
}

#[tokio::test]
async fn create_import_and_save_round_trip() {
    let repo = SqliteRepo::open_memory().await.unwrap();
    let user = Uuid::new_v4();

    let set = create_study_set(
        &repo,
        user,
        "Spanish",
        "basics",
        &[complete("Hola", "Hello"), complete("Adiós", "Goodbye")],
    )
    .await
    .unwrap();

    let drafts = load_drafts(&repo, set.id).await.unwrap();
    let merged = import_cards(drafts, "Gato | Cat\nPerro | Dog | https://x/p.png").unwrap();
    save_existing(&repo, user, set.id, "Spanish", "basics", &merged)
        .await
        .unwrap();

    let terms = repo.list_terms(Some(set.id)).await.unwrap();
    assert_eq!(terms.len(), 4);
    assert_eq!(
        terms.iter().map(|t| t.rank).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(terms[3].word, "Perro");
    assert_eq!(terms[3].definition, "__IMG__:https://x/p.png__DEF__:Dog");

    let stored = repo.get_study_set(set.id).await.unwrap();
    assert!(stored.saved_at >= set.saved_at);
}

#[tokio::test]
async fn apply_save_rolls_back_when_an_update_misses() {
    let repo = SqliteRepo::open_memory().await.unwrap();
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

    // an insert followed by an update keyed to an id that does not exist
    let plan = SavePlan {
        study_set_id: set.id,
        deletes: vec![],
        upserts: vec![
            TermUpsert::Insert(Term::new(set.id, "verde", "green", 3)),
            TermUpsert::Update {
                id: Uuid::new_v4(),
                word: "negro".into(),
                definition: "black".into(),
                rank: 4,
            },
        ],
    };

    let err = repo.apply_save(&plan).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound("term")));

    // the sibling insert was rolled back with the failed update
    let terms = repo.list_terms(Some(set.id)).await.unwrap();
    assert_eq!(terms.len(), 2);
    assert!(terms.iter().all(|t| t.word != "verde"));
}

#[tokio::test]
async fn delete_study_set_cascades_to_terms() {
    let repo = SqliteRepo::open_memory().await.unwrap();
    let user = Uuid::new_v4();

    let set = create_study_set(
        &repo,
        user,
        "Numbers",
        "",
        &[complete("uno", "one"), complete("dos", "two")],
    )
    .await
    .unwrap();

    repo.delete_study_set(set.id).await.unwrap();
    assert!(matches!(
        repo.get_study_set(set.id).await,
        Err(CoreError::NotFound(_))
    ));
    assert!(repo.list_terms(Some(set.id)).await.unwrap().is_empty());
}
