use studyset_core::{
    ensure_owner, import_cards, merge_imported, plan_save, validate_for_save, CardDraft,
    CoreError, ImportedCard, StudySet, Term, TermUpsert,
};
use uuid::Uuid;

fn complete(term: &str, definition: &str) -> CardDraft {
    CardDraft::new(term, definition, "")
}

fn persisted(term: &str, definition: &str, id: Uuid) -> CardDraft {
    let mut c = CardDraft::new(term, definition, "");
    c.persisted_id = Some(id);
    c
}

#[test]
fn merge_pads_to_minimum() {
    let kept = complete("Hola", "Hello");
    let merged = merge_imported(vec![kept.clone()], vec![]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].term, "Hola");
    assert!(merged[1].term.is_empty() && merged[1].definition_text.is_empty());
}

#[test]
fn merge_keeps_partial_and_persisted_cards() {
    let partial = CardDraft::new("only term", "", "");
    let saved = persisted("Hola", "Hello", Uuid::new_v4());
    let blank = CardDraft::blank();

    let imported = vec![ImportedCard {
        term: "Gato".into(),
        definition: "Cat".into(),
        image_url: String::new(),
    }];

    let merged = merge_imported(vec![partial.clone(), saved.clone(), blank], imported);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].term, "only term");
    assert_eq!(merged[1].persisted_id, saved.persisted_id);
    assert_eq!(merged[2].term, "Gato");
    assert!(merged[2].persisted_id.is_none());
}

#[test]
fn import_cards_reports_nothing_to_import() {
    let current = vec![complete("Hola", "Hello"), CardDraft::blank()];
    let err = import_cards(current, "no delimiters here\n\n").unwrap_err();
    assert!(matches!(err, CoreError::Invalid("nothing to import")));
}

#[test]
fn validation_short_circuits_in_order() {
    let cards = vec![complete("a", "b"), complete("c", "d")];

    let err = validate_for_save("   ", &cards).unwrap_err();
    assert!(matches!(err, CoreError::Invalid("title is required")));

    let err = validate_for_save("Spanish", &cards[..1]).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Invalid("at least 2 flashcards are required")
    ));

    let incomplete = vec![complete("a", "b"), CardDraft::new("c", "  ", "")];
    let err = validate_for_save("Spanish", &incomplete).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Invalid("at least 2 complete flashcards are required")
    ));

    assert!(validate_for_save("Spanish", &cards).is_ok());
}

#[test]
fn owner_mismatch_is_forbidden() {
    let owner = Uuid::new_v4();
    let set = StudySet::new(owner, "Spanish", None);
    assert!(ensure_owner(&set, owner).is_ok());
    assert!(matches!(
        ensure_owner(&set, Uuid::new_v4()),
        Err(CoreError::Forbidden(_))
    ));
}

#[test]
fn plan_ranks_are_dense_across_mixed_upserts() {
    let set_id = Uuid::new_v4();
    let existing: Vec<Term> = (1..=3)
        .map(|i| Term::new(set_id, format!("w{i}"), format!("d{i}"), i))
        .collect();

    let cards = vec![
        persisted("w1", "d1", existing[0].id),
        complete("new a", "def a"),
        persisted("w3", "d3", existing[2].id),
        complete("new b", "def b"),
        complete("new c", "def c"),
    ];

    let plan = plan_save(set_id, &cards, &existing);

    let mut ranks: Vec<i32> = plan
        .upserts
        .iter()
        .map(|u| match u {
            TermUpsert::Insert(t) => t.rank,
            TermUpsert::Update { rank, .. } => *rank,
        })
        .collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);

    // w2 was dropped from the drafts, so it is the one deletion
    assert_eq!(plan.deletes, vec![existing[1].id]);
}

#[test]
fn plan_updates_referenced_and_deletes_the_rest() {
    let set_id = Uuid::new_v4();
    let existing: Vec<Term> = (1..=3)
        .map(|i| Term::new(set_id, format!("w{i}"), format!("d{i}"), i))
        .collect();
    let a = existing[0].id;

    let cards = vec![persisted("w1 edited", "d1 edited", a), complete("x", "y")];
    let plan = plan_save(set_id, &cards, &existing);

    assert_eq!(plan.deletes.len(), 2);
    assert!(plan.deletes.contains(&existing[1].id));
    assert!(plan.deletes.contains(&existing[2].id));

    let updates: Vec<_> = plan
        .upserts
        .iter()
        .filter(|u| matches!(u, TermUpsert::Update { .. }))
        .collect();
    assert_eq!(updates.len(), 1);
    assert!(matches!(
        updates[0],
        TermUpsert::Update { id, rank: 1, .. } if *id == a
    ));
}

#[test]
fn plan_with_no_referenced_ids_deletes_everything() {
    let set_id = Uuid::new_v4();
    let existing: Vec<Term> = (1..=2)
        .map(|i| Term::new(set_id, format!("w{i}"), format!("d{i}"), i))
        .collect();

    let cards = vec![complete("a", "b"), complete("c", "d")];
    let plan = plan_save(set_id, &cards, &existing);

    assert_eq!(plan.deletes.len(), 2);
    assert!(plan
        .upserts
        .iter()
        .all(|u| matches!(u, TermUpsert::Insert(_))));
}

#[test]
fn plan_encodes_image_and_trims_fields() {
    let set_id = Uuid::new_v4();
    let cards = vec![
        CardDraft::new(" Hola ", " Hello ", " https://x.png "),
        complete("Adios", "Goodbye"),
    ];
    let plan = plan_save(set_id, &cards, &[]);

    let TermUpsert::Insert(first) = &plan.upserts[0] else {
        panic!("expected insert");
    };
    assert_eq!(first.word, "Hola");
    assert_eq!(first.definition, "__IMG__:https://x.png__DEF__:Hello");
    assert_eq!(first.rank, 1);
    assert!(!first.ephemeral);

    let TermUpsert::Insert(second) = &plan.upserts[1] else {
        panic!("expected insert");
    };
    assert_eq!(second.definition, "Goodbye");
    assert_eq!(second.rank, 2);
}

#[test]
fn incomplete_drafts_are_not_persisted() {
    let set_id = Uuid::new_v4();
    let cards = vec![
        complete("a", "b"),
        CardDraft::blank(),
        complete("c", "d"),
        CardDraft::new("term only", "", ""),
    ];
    let plan = plan_save(set_id, &cards, &[]);
    assert_eq!(plan.upserts.len(), 2);
}
