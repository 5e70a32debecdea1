//! Registration behaviour observable through a document session.
//!
//! Each test drives a `DocumentSession` the way a recognizer would and checks
//! the resulting identities, spans and index state.

use refmerge::{
    attrs, BaseRegistry, DocumentSession, EntityRegistry, OntologyCollection, Referent,
    ReferentArena, ReferentId, ReferentKind, RegistryConfig, Script, SlotValue,
};

fn geo(names: &[&str]) -> Referent {
    let mut r = Referent::new(ReferentKind::Geo);
    for name in names {
        r.add_slot(attrs::NAME, *name, false, 0);
    }
    r
}

fn occurrences(session: &DocumentSession, id: ReferentId) -> Vec<(usize, usize)> {
    session
        .referent(id)
        .map(|r| r.occurrence().iter().map(|o| (o.begin_char, o.end_char)).collect())
        .unwrap_or_default()
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_reregistering_same_referent_is_idempotent() {
    let mut session = DocumentSession::new("Moscow is big.");
    let id = session.alloc(geo(&["Moscow"]).with_occurrence(0, 6));

    let first = session.register(id);
    let second = session.register(id);

    assert_eq!(first, Some(id));
    assert_eq!(second, Some(id));
    assert_eq!(occurrences(&session, id), vec![(0, 6)]);
    assert_eq!(session.registry().ontology().len(), 1);
    assert_eq!(session.entities().len(), 1);
}

// =============================================================================
// Merge union
// =============================================================================

#[test]
fn test_merge_unions_occurrences() {
    let mut session = DocumentSession::new("Moscow ... Moscow ... Moscow");
    let a = session.alloc(geo(&["Moscow"]).with_occurrence(0, 6).with_occurrence(11, 17));
    let a = session.register(a).unwrap();

    let b = session.alloc(geo(&["Moscow"]).with_occurrence(22, 28));
    let canonical = session.register(b).unwrap();

    assert_eq!(canonical, a);
    assert_eq!(occurrences(&session, a), vec![(0, 6), (11, 17), (22, 28)]);
    assert!(session.referent(b).is_none());
}

#[test]
fn test_merge_does_not_duplicate_shared_occurrence() {
    let mut session = DocumentSession::new("Moscow");
    let a = session.register_at(geo(&["Moscow"]), 0, 6).unwrap();
    let b = session.register_at(geo(&["Moscow"]), 0, 6).unwrap();
    assert_eq!(a, b);
    assert_eq!(occurrences(&session, a), vec![(0, 6)]);
    assert_eq!(session.kit().spans_of(a).len(), 1);
}

// =============================================================================
// Generalization
// =============================================================================

#[test]
fn test_generalization_is_not_merged() {
    let mut session = DocumentSession::new("Moscow. Moscow, Russia.");
    let broad = session.register_at(geo(&["Moscow"]), 0, 6).unwrap();
    let narrow = session
        .register_at(geo(&["Moscow"]).with_slot(attrs::HIGHER, "Russia"), 8, 22)
        .unwrap();

    assert_ne!(broad, narrow);
    assert!(session
        .referent(broad)
        .zip(session.referent(narrow))
        .is_some_and(|(a, b)| a.can_be_general_for(b)));
    assert_eq!(session.entities().len(), 2);
    assert!(session.registry().ontology().is_consistent());
}

#[test]
fn test_narrow_then_broad_is_not_merged() {
    let mut session = DocumentSession::new("");
    let narrow = session
        .register_at(geo(&["Moscow"]).with_slot(attrs::HIGHER, "Russia"), 0, 6)
        .unwrap();
    let broad = session.register_at(geo(&["Moscow"]), 10, 16).unwrap();
    assert_ne!(broad, narrow);
}

// =============================================================================
// Repoint propagation
// =============================================================================

#[test]
fn test_three_items_fold_into_one_survivor() {
    let text = "Moscow, MSK and Moskva are one city: Moscow (MSK, Moskva).";
    let mut session = DocumentSession::new(text);

    let a = session.register_at(geo(&["Moscow"]), 0, 6).unwrap();
    let b = session.register_at(geo(&["MSK"]), 8, 11).unwrap();
    let c = session.register_at(geo(&["Moskva"]), 16, 22).unwrap();
    assert_eq!(session.registry().ontology().len(), 3);

    let d = session
        .register_at(geo(&["Moscow", "MSK", "Moskva"]), 37, 57)
        .unwrap();

    assert_eq!(d, a, "earliest-created item survives");
    for span in [(0, 6), (8, 11), (16, 22), (37, 57)] {
        assert_eq!(session.kit().referent_of(span.0, span.1), Some(a));
    }
    assert!(session.referent(b).is_none());
    assert!(session.referent(c).is_none());
    assert_eq!(session.registry().ontology().len(), 1);
    assert_eq!(session.entities().len(), 1);
    assert_eq!(
        session.referent(a).map(|r| r.string_values(attrs::NAME)),
        Some(vec!["Moscow".to_string(), "MSK".to_string(), "Moskva".to_string()])
    );
    assert!(session.registry().ontology().is_consistent());
}

#[test]
fn test_fold_repoints_slot_references() {
    let mut session = DocumentSession::new("");
    let msk = session.register_at(geo(&["MSK"]), 0, 3).unwrap();
    let moscow = session.register_at(geo(&["Moscow"]), 5, 11).unwrap();
    let street = session
        .register_at(
            Referent::new(ReferentKind::Street)
                .with_slot(attrs::NAME, "Arbat")
                .with_slot(attrs::GEO, moscow),
            13,
            18,
        )
        .unwrap();

    let both = session.register_at(geo(&["MSK", "Moscow"]), 20, 30).unwrap();
    assert_eq!(both, msk);
    assert_eq!(
        session.referent(street).and_then(|r| r.slot_value(attrs::GEO)).cloned(),
        Some(SlotValue::Referent(msk))
    );
}

#[test]
fn test_fold_merges_referents_that_became_duplicates() {
    let text = "Moscow, MSK. Arbat, Moscow. Arbat, MSK. Moscow aka MSK.";
    let mut session = DocumentSession::new(text);
    let moscow = session.register_at(geo(&["Moscow"]), 0, 6).unwrap();
    let msk = session.register_at(geo(&["MSK"]), 8, 11).unwrap();
    let arbat = |city: ReferentId| {
        Referent::new(ReferentKind::Street)
            .with_slot(attrs::NAME, "Arbat")
            .with_slot(attrs::GEO, city)
    };
    let s1 = session.register_at(arbat(moscow), 13, 18).unwrap();
    let s2 = session.register_at(arbat(msk), 28, 33).unwrap();
    assert_ne!(s1, s2);

    let city = session.register_at(geo(&["Moscow", "MSK"]), 41, 55).unwrap();
    assert_eq!(city, moscow);

    let streets: Vec<_> = session
        .entities()
        .into_iter()
        .filter(|e| e.kind == ReferentKind::Street)
        .collect();
    assert_eq!(streets.len(), 1);
    assert_eq!(streets[0].id, s1);
    assert_eq!(session.kit().referent_of(28, 33), Some(s1));
    assert_eq!(occurrences(&session, s1), vec![(13, 18), (28, 33)]);
    assert!(session.referent(s2).is_none());
    assert!(!session.registry().base().contains(s2));
    assert!(session.registry().ontology().is_consistent());
}

#[test]
fn test_conflicting_hits_are_not_merged() {
    let mut session = DocumentSession::new("");
    let city = session
        .register_at(geo(&["Paris"]).with_slot(attrs::TYPE, "city"), 0, 5)
        .unwrap();
    let town = session
        .register_at(geo(&["Paris"]).with_slot(attrs::TYPE, "town"), 10, 15)
        .unwrap();
    assert_ne!(city, town);

    // Matches both, which conflict with each other: ambiguous, so it stays apart.
    let bare = session.register_at(geo(&["Paris"]), 20, 25);
    assert!(bare.is_some());
    assert_ne!(bare, Some(city));
    assert_ne!(bare, Some(town));
}

#[test]
fn test_ambiguous_hits_merge_when_single_not_required() {
    let config = RegistryConfig::default().with_must_be_single(false);
    let mut session = DocumentSession::with_base("", EntityRegistry::new(), config);
    let city = session
        .register_at(geo(&["Paris"]).with_slot(attrs::TYPE, "city"), 0, 5)
        .unwrap();
    session.register_at(geo(&["Paris"]).with_slot(attrs::TYPE, "town"), 10, 15);
    let bare = session.register_at(geo(&["Paris"]), 20, 25);
    assert_eq!(bare, Some(city));
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_removal_clears_lookup_and_base() {
    let mut session = DocumentSession::new("Moscow");
    let id = session.register_at(geo(&["Moscow"]), 0, 6).unwrap();
    session.remove_referent(id);
    session.remove_referent(id);

    let query = session.alloc(geo(&["Moscow"]));
    let ontology = session.registry().ontology();
    assert_eq!(
        ontology.try_attach_by_referent(session.kit().arena(), query, None, true),
        None
    );
    assert!(ontology.find_items_by_string("Moscow").is_empty());
    assert!(!session.registry().base().contains(id));
    assert!(session.registry().ontology().is_consistent());
}

// =============================================================================
// Canonical text
// =============================================================================

#[test]
fn test_canonical_text_is_order_independent() {
    let orders = [
        ["Moscow City", "MSK", "Moscow"],
        ["MSK", "Moscow", "Moscow City"],
        ["Moscow", "Moscow City", "MSK"],
    ];
    for names in orders {
        let mut arena = ReferentArena::new();
        let id = arena.alloc(geo(&names));
        let mut ontology = OntologyCollection::new(Script::Latin);
        ontology.add_referent(&arena, id);
        for _ in 0..3 {
            assert_eq!(ontology.canonic_text_of(id), Some("MSK"), "order {:?}", names);
        }
    }
}

#[test]
fn test_canonical_text_skips_foreign_script() {
    let mut session = DocumentSession::new("Город Москва, он же Moscow.");
    let id = session
        .register_at(geo(&["Moscow", "Москва"]), 6, 12)
        .unwrap();
    assert_eq!(session.canonic_text(id), Some("МОСКВА"));
}

#[test]
fn test_canonical_text_follows_merges() {
    let mut session = DocumentSession::new("Moscow City, Moscow, MSK");
    let a = session.register_at(geo(&["Moscow City", "Moscow"]), 0, 11).unwrap();
    assert_eq!(session.canonic_text(a), Some("MOSCOW"));
    session.register_at(geo(&["Moscow", "MSK"]), 13, 24);
    assert_eq!(session.canonic_text(a), Some("MSK"));
}

// =============================================================================
// Rejection
// =============================================================================

#[test]
fn test_rejected_registration_leaves_no_trace() {
    let mut session = DocumentSession::new("some city");
    let nameless = session.alloc(Referent::new(ReferentKind::Geo).with_slot(attrs::TYPE, "city"));
    assert_eq!(session.register(nameless), None);
    assert!(session.registry().ontology().is_empty());
    assert!(!session.registry().base().contains(nameless));
    assert!(session.kit().attachments().is_empty());
}

#[test]
fn test_required_attribute_rejects() {
    let config = refmerge::Config::from_toml_str("[required]\nstreet = [\"GEO\"]").unwrap();
    let mut session = DocumentSession::from_config("Arbat", &config).unwrap();
    let street = Referent::new(ReferentKind::Street).with_slot(attrs::NAME, "Arbat");
    assert_eq!(session.register_at(street, 0, 5), None);
    assert!(session.registry().ontology().is_empty());
}

// =============================================================================
// Index consistency
// =============================================================================

#[test]
fn test_index_consistent_after_every_registration() {
    let mut session = DocumentSession::new("");
    let names = [
        vec!["Moscow"],
        vec!["Kyiv", "Kiev"],
        vec!["MSK"],
        vec!["Kiev"],
        vec!["Moscow", "MSK"],
        vec!["Minsk"],
    ];
    for (i, n) in names.iter().enumerate() {
        session.register_at(geo(n), i * 10, i * 10 + 5);
        let issues = session.registry().ontology().validate();
        assert!(issues.is_empty(), "after {}: {:?}", i, issues);
    }
    assert_eq!(session.entities().len(), 3);
    for attachment in session.kit().attachments() {
        assert!(session.referent(attachment.referent).is_some());
    }
}
