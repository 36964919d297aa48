use std::io::Write;

use layered_proptree::PropTreeLinks;
use layered_resolution::{
    Argument, Classifier, DocBuilder, DocTheory, EntityType, EventMention, ForestOptions, Language,
    MentionType, MentionUid, PredType, RelMention, RelMentionSet, RelationOptions, ResolutionError, ScoreSource, Symbol,
    TemporalAttachmentMode, TimeArgument, ValueMentionUid, ValueOptions, WeightedScorer,
};
use layered_values::TemporalAttacher;

use crate::*;

const ATTACK_PATTERNS: &str = "((Conflict.Attack Attacker Target AttackOn))";

fn uid(sentence: usize, index: usize) -> MentionUid {
    MentionUid::new(sentence, index).expect("uid")
}

fn relation_listing(doc: &DocTheory) -> String {
    let text = |uid| doc.mention_text(uid).unwrap_or_default();
    RelationView::new(doc)
        .iter()
        .map(|r| format!("{} {} {} {} {:?}", r.uid, text(r.left), r.rel_type, text(r.right), r.source))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pattern_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write patterns");
    file
}

/// A finder that never clears the threshold: every tag scores evenly.
fn silent_finder(types: &[&str]) -> SentenceRelationFinder<WeightedScorer> {
    SentenceRelationFinder::new(WeightedScorer::new("relations"), types)
}

/// "Rebels attacked the convoy ." with the attack reported twice.
fn attack_document() -> DocTheory {
    let mut builder = DocBuilder::new("attack", Language::English);
    {
        let mut s = builder
            .sentence("(S (NP (NNS Rebels)) (VP (VBD attacked) (NP (DT the) (NN convoy))) (. .))")
            .expect("sentence");
        let rebels = s.mention(0, 0, MentionType::Desc, "PER").expect("Rebels");
        let convoy = s.mention(2, 3, MentionType::Desc, "VEH").expect("the convoy");
        let (rebels, convoy) = (s.mention_uid(rebels).expect("uid"), s.mention_uid(convoy).expect("uid"));
        for _ in 0..2 {
            s.event(
                EventMention::new("Conflict.Attack", 0)
                    .with_arg("Attacker", rebels)
                    .with_arg("Target", convoy),
            );
        }
    }
    builder.build().expect("document")
}

/// An introducing sentence followed by a dash list of organizations.
fn dash_list_document() -> DocTheory {
    let mut builder = DocBuilder::new("alliance", Language::English);
    {
        let mut s = builder
            .sentence(
                "(S (NP (NNP Acme)) (VP (VBZ consists) (PP (IN of) (NP (DT the) (JJ following)))) (: :))",
            )
            .expect("introduction");
        let acme = s.mention(0, 0, MentionType::Name, "ORG").expect("Acme");
        s.prop(PredType::Verb, Some(1), vec![Argument::mention("<sub>", acme)])
            .expect("verb prop");
    }
    for name in ["Globex", "Initech"] {
        let mut s = builder
            .sentence(&format!("(S (: -) (NP (NNP {})))", name))
            .expect("item");
        s.mention(1, 1, MentionType::Name, "ORG").expect("item name");
    }
    builder.build().expect("document")
}

/// "Smith works for Acme and Globex ." with a LIST mention over the two
/// organizations.
fn coordination_document() -> DocTheory {
    let mut builder = DocBuilder::new("coordination", Language::English);
    {
        let mut s = builder
            .sentence(
                "(S (NP (NNP Smith)) (VP (VBZ works) (PP (IN for) \
                 (NP (NP (NNP Acme)) (CC and) (NP (NNP Globex))))) (. .))",
            )
            .expect("sentence");
        s.mention(0, 0, MentionType::Name, "PER").expect("Smith");
        let acme = s.mention(3, 3, MentionType::Name, "ORG").expect("Acme");
        let globex = s.mention(5, 5, MentionType::Name, "ORG").expect("Globex");
        s.list(3, 5, "ORG", &[acme, globex]).expect("list");
    }
    builder.build().expect("document")
}

/// "John Smith visited Paris . He lives there ." with He already linked to
/// John Smith.
fn resident_document() -> DocTheory {
    let mut builder = DocBuilder::new("resident", Language::English);
    {
        let mut s = builder
            .sentence("(S (NP (NNP John) (NNP Smith)) (VP (VBD visited) (NP (NNP Paris))) (. .))")
            .expect("first sentence");
        let john = s.mention(0, 1, MentionType::Name, "PER").expect("John Smith");
        let paris = s.mention(3, 3, MentionType::Name, "GPE").expect("Paris");
        s.prop(PredType::Name, None, vec![Argument::mention("<ref>", john)])
            .expect("name prop");
        s.prop(
            PredType::Verb,
            Some(2),
            vec![Argument::mention("<sub>", john), Argument::mention("<obj>", paris)],
        )
        .expect("verb prop");
    }
    {
        let mut s = builder
            .sentence("(S (NP (PRP He)) (VP (VBZ lives) (ADVP (RB there))) (. .))")
            .expect("second sentence");
        let he = s.mention(0, 0, MentionType::Pron, "PER").expect("He");
        let there = s.mention(2, 2, MentionType::Pron, "GPE").expect("there");
        s.prop(PredType::Pronoun, None, vec![Argument::mention("<ref>", he)])
            .expect("pronoun prop");
        s.prop(
            PredType::Verb,
            Some(1),
            vec![Argument::mention("<sub>", he), Argument::mention("<loc>", there)],
        )
        .expect("verb prop");
    }
    let mut doc = builder.build().expect("document");
    let per = EntityType::parse("PER");
    let entity = doc.entities.add_new(uid(0, 0), per.clone()).expect("John Smith entity");
    doc.entities.add_mention(entity, uid(1, 0), &per).expect("He joins John Smith");
    doc
}

fn employment_scorer() -> WeightedScorer {
    WeightedScorer::new("relations").with_weight("ORG-AFF.Employment", "rh[acme]", 3.0)
}

#[test]
fn repeated_event_yields_one_pattern_relation() {
    let file = pattern_file(ATTACK_PATTERNS);
    let patterns = EventRelationPatterns::from_path(file.path()).expect("patterns");
    let mut finder = DocumentRelationFinder::new(silent_finder(&["AttackOn"]))
        .with_patterns(patterns, VALIDATION_NONE)
        .expect("validation table");
    let mut doc = attack_document();

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.sentence_relations, 0);
    assert_eq!(report.pattern_relations, 1);
    assert_eq!(report.document_relations, 1);
    assert_eq!(finder.phase(), RelationPhase::Done);

    let relation = doc.relations.get(0).expect("pattern relation");
    assert!(relation.is_pattern_derived());
    assert_eq!(relation.sentence, doc.n_sentences());
    insta::assert_snapshot!(relation_listing(&doc), @r###"r1.0 Rebels AttackOn the convoy Pattern { pattern: "Conflict.Attack/Attacker/Target" }"###);
}

#[test]
fn pattern_skips_pairs_related_in_the_sentence() {
    let scorer = WeightedScorer::new("relations").with_weight("AttackOn", "types[PER,VEH]", 3.0);
    let mut finder = DocumentRelationFinder::new(SentenceRelationFinder::new(scorer, &["AttackOn"]))
        .with_patterns(
            EventRelationPatterns::from_sexp_str(ATTACK_PATTERNS).expect("patterns"),
            VALIDATION_NONE,
        )
        .expect("validation table");
    let mut doc = attack_document();

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.sentence_relations, 1);
    assert_eq!(report.pattern_relations, 0);
    assert!(doc.relations.is_empty());
}

#[test]
fn active_structural_finder_excludes_patterns() {
    let mut finder = DocumentRelationFinder::new(silent_finder(&["AttackOn"]))
        .with_patterns(
            EventRelationPatterns::from_sexp_str(ATTACK_PATTERNS).expect("patterns"),
            VALIDATION_NONE,
        )
        .expect("validation table")
        .with_structural_finder(Box::new(EnglishStructuralRelationFinder::new(true)));
    let mut doc = attack_document();

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.pattern_relations, 0);
    assert!(doc.relations.iter().all(|r| !r.is_pattern_derived()));
}

#[test]
fn dash_list_items_relate_to_the_introduced_organization() {
    let options = RelationOptions {
        find_structural_relations: true,
        ..RelationOptions::default()
    };
    let mut finder = DocumentRelationFinder::from_options(silent_finder(&["PART-WHOLE.Subsidiary"]), &options)
        .expect("finder");
    let mut doc = dash_list_document();

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.structural_relations, 2);
    insta::assert_snapshot!(relation_listing(&doc), @r###"
    r3.0 Globex PART-WHOLE.Subsidiary Acme Structural { rule: "dash-list" }
    r3.1 Initech PART-WHOLE.Subsidiary Acme Structural { rule: "dash-list" }
    "###);
    assert_eq!(doc.relations.get(1).map(|r| r.sentence), Some(2));
}

#[test]
fn inactive_structural_finder_finds_nothing() {
    let doc = dash_list_document();
    let set = EnglishStructuralRelationFinder::new(false)
        .find_relations(&doc)
        .expect("relations");
    assert!(set.is_empty());
}

#[test]
fn list_expansion_reaches_other_members_once() {
    let mut finder = DocumentRelationFinder::new(SentenceRelationFinder::new(
        employment_scorer(),
        &["ORG-AFF.Employment"],
    ))
    .with_list_expansion();
    let mut doc = coordination_document();

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.sentence_relations, 1);
    assert_eq!(report.expanded, 1);
    insta::assert_snapshot!(relation_listing(&doc), @r###"
    r0.0 Smith ORG-AFF.Employment Acme Classifier { model: "relations" }
    r0.1 Smith ORG-AFF.Employment Globex ListExpansion
    "###);

    let mut set = doc.sentence(0).expect("sentence").relations.clone();
    assert_eq!(expand_relations_in_list_mentions(&doc, &mut set).expect("expansion"), 0);
    assert_eq!(set.len(), 2);
}

#[test]
fn expansion_copies_temporal_annotations() {
    let doc = coordination_document();
    let mut relation = RelMention::new(
        uid(0, 0),
        uid(0, 1),
        Symbol::new("ORG-AFF.Employment"),
        0,
        0.8,
        ScoreSource::Derived,
    );
    relation.time_arg = Some(TimeArgument {
        role: Symbol::new("Time-Holds"),
        value: ValueMentionUid::Sentence { sentence: 0, index: 0 },
        score: 0.7,
    });
    let mut set = RelMentionSet::for_sentence(0);
    set.add(relation).expect("room");

    assert_eq!(expand_relations_in_list_mentions(&doc, &mut set).expect("expansion"), 1);
    let expanded = set.get(1).expect("expanded relation");
    assert_eq!(expanded.left, uid(0, 0));
    assert_eq!(expanded.right, uid(0, 2));
    assert_eq!(expanded.score, 0.8);
    assert_eq!(expanded.source, ScoreSource::ListExpansion);
    assert_eq!(expanded.time_arg.as_ref().map(|t| t.role.as_str()), Some("Time-Holds"));
}

#[test]
fn same_type_arguments_are_not_expanded() {
    let doc = coordination_document();
    let mut set = RelMentionSet::for_sentence(0);
    set.add(RelMention::new(
        uid(0, 1),
        uid(0, 2),
        Symbol::new("PART-WHOLE.Subsidiary"),
        0,
        0.9,
        ScoreSource::Derived,
    ))
    .expect("room");
    assert_eq!(expand_relations_in_list_mentions(&doc, &mut set).expect("expansion"), 0);
}

#[test]
fn resolved_pronoun_pairs_keep_their_proposition_path() {
    let doc = resident_document();
    let links = PropTreeLinks::new(1, &doc, &ForestOptions::default()).expect("links");
    let he = doc.mention(uid(1, 0)).expect("He");
    let there = doc.mention(uid(1, 1)).expect("there");

    let fv = features::relation_pair_features(&doc, Some(&links), he, there, features::DEFAULT_MAX_FEATURES);
    assert!(fv.atomic().any(|p| p.as_str().starts_with("prop-path[")));
    assert!(!fv.contains("no-prop-link"));

    let scorer = WeightedScorer::new("relations")
        .with_weight("PHYS.Located", "types[PER,GPE]", 3.0)
        .with_weight("PHYS.Located", "no-prop-link", -6.0);
    let mut finder = DocumentRelationFinder::new(SentenceRelationFinder::new(scorer, &["PHYS.Located"]));
    let mut doc = doc;
    finder.process(&mut doc).expect("relations");
    let relations = &doc.sentence(1).expect("second sentence").relations;
    assert_eq!(relations.len(), 1);
    let relation = relations.get(0).expect("relation");
    assert_eq!((relation.left, relation.right), (uid(1, 0), uid(1, 1)));
}

#[test]
fn ordered_validation_finds_relations_with_a_later_first_argument() {
    let mut builder = DocBuilder::new("hiring", Language::English);
    {
        let mut s = builder
            .sentence("(S (NP (NNP Acme)) (VP (VBD hired) (NP (NNP Smith))) (. .))")
            .expect("sentence");
        s.mention(0, 0, MentionType::Name, "ORG").expect("Acme");
        s.mention(2, 2, MentionType::Name, "PER").expect("Smith");
    }
    let doc = builder.build().expect("document");
    let scorer = WeightedScorer::new("relations").with_weight("ORG-AFF.Employment", "types[PER,ORG]", 3.0);
    let finder = SentenceRelationFinder::new(scorer, &["ORG-AFF.Employment"])
        .with_observation(RelationObservation::new(VALIDATION_2005_ORDERED).expect("table"));

    let set = finder.find(&doc, 0, None).expect("relations");
    assert_eq!(set.len(), 1);
    let relation = set.get(0).expect("relation");
    assert_eq!((relation.left, relation.right), (uid(0, 1), uid(0, 0)));
    assert_eq!(relation.rel_type, "ORG-AFF.Employment");
}

#[test]
fn family_relations_get_a_specific_type() {
    let mut builder = DocBuilder::new("family", Language::English);
    {
        let mut s = builder
            .sentence(
                "(S (NP (NNP Mary)) (VP (VBZ is) (NP (NP (DT the) (NN wife)) \
                 (PP (IN of) (NP (NNP Jones))))) (. .))",
            )
            .expect("sentence");
        s.mention(0, 0, MentionType::Name, "PER").expect("Mary");
        s.mention(5, 5, MentionType::Name, "PER").expect("Jones");
    }
    let mut doc = builder.build().expect("document");
    let scorer = WeightedScorer::new("relations").with_weight(FAMILY_RELATION, "types[PER,PER]", 3.0);
    let mut finder =
        DocumentRelationFinder::new(SentenceRelationFinder::new(scorer, &[FAMILY_RELATION])).with_family_relations();

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.family_fixed, 1);
    let relation = doc.sentence(0).and_then(|st| st.relations.get(0)).expect("relation");
    assert_eq!(relation.rel_type, "PER-SOC.Family.Spouse");
}

#[test]
fn time_arguments_attach_during_the_sentence_pass() {
    let mut builder = DocBuilder::new("employment", Language::English);
    {
        let mut s = builder
            .sentence("(S (NP (NNP Jones)) (VP (VBD joined) (NP (NNP Acme)) (PP (IN in) (NP (CD 2003)))) (. .))")
            .expect("sentence");
        s.mention(0, 0, MentionType::Name, "PER").expect("Jones");
        s.mention(2, 2, MentionType::Name, "ORG").expect("Acme");
        s.value(4, 4, "TIMEX2").expect("2003");
    }
    let mut doc = builder.build().expect("document");
    let time_scorer: Box<dyn Classifier> =
        Box::new(WeightedScorer::new("time").with_weight("Time-Within", "right-prep[in]", 4.0));
    let mut finder = DocumentRelationFinder::new(SentenceRelationFinder::new(
        employment_scorer(),
        &["ORG-AFF.Employment"],
    ))
    .with_time_attacher(TemporalAttacher::new(time_scorer).with_options(&ValueOptions {
        temporal_attachment_mode: TemporalAttachmentMode::Automatic,
        ..ValueOptions::default()
    }));

    let report = finder.process(&mut doc).expect("relations");
    assert_eq!(report.time_attached, 1);
    let relation = doc.sentence(0).and_then(|st| st.relations.get(0)).expect("relation");
    let time_arg = relation.time_arg.as_ref().expect("time argument");
    assert_eq!(time_arg.role, "Time-Within");
}

#[test]
fn time_attachment_without_a_classifier_fails() {
    let options = RelationOptions {
        do_relation_time_attachment: true,
        ..RelationOptions::default()
    };
    let mut finder = DocumentRelationFinder::from_options(silent_finder(&["AttackOn"]), &options).expect("finder");
    let err = finder.process(&mut attack_document()).unwrap_err();
    assert!(matches!(err, ResolutionError::MissingParameter { .. }));
}

#[test]
fn patterns_require_a_validation_table() {
    let file = pattern_file(ATTACK_PATTERNS);
    let options = RelationOptions {
        event_relation_patterns: Some(file.path().to_path_buf()),
        ..RelationOptions::default()
    };
    let err = DocumentRelationFinder::from_options(silent_finder(&["AttackOn"]), &options)
        .err()
        .expect("missing validation");
    assert!(matches!(err, ResolutionError::MissingParameter { ref name } if name == RELATION_VALIDATION_PARAM));
}

#[test]
fn malformed_pattern_file_is_rejected() {
    let file = pattern_file("((Conflict.Attack Attacker Target))");
    let options = RelationOptions {
        event_relation_patterns: Some(file.path().to_path_buf()),
        relation_validation_str: Some(VALIDATION_NONE.to_string()),
        ..RelationOptions::default()
    };
    let err = DocumentRelationFinder::from_options(silent_finder(&["AttackOn"]), &options)
        .err()
        .expect("ill-formed patterns");
    assert!(matches!(err, ResolutionError::UnexpectedInput { .. }));

    let missing = RelationOptions {
        event_relation_patterns: Some(file.path().with_extension("missing")),
        relation_validation_str: Some(VALIDATION_NONE.to_string()),
        ..RelationOptions::default()
    };
    let err = DocumentRelationFinder::from_options(silent_finder(&["AttackOn"]), &missing)
        .err()
        .expect("missing file");
    assert!(matches!(err, ResolutionError::Load { .. }));
}

#[test]
fn phases_run_in_order() {
    let mut finder = DocumentRelationFinder::new(silent_finder(&["AttackOn"]));
    let mut doc = attack_document();
    let err = finder.find_doc_level_relations(&mut doc).unwrap_err();
    assert!(err.is_inconsistency());

    finder.find_sentence_level_relations(&mut doc).expect("sentence pass");
    assert!(finder.promote(&mut doc).unwrap_err().is_inconsistency());
    finder.find_doc_level_relations(&mut doc).expect("document pass");
    finder.promote(&mut doc).expect("promotion");
    assert_eq!(finder.phase(), RelationPhase::Done);
}

#[test]
fn view_drops_document_repeats() {
    let mut doc = attack_document();
    let attack = Symbol::new("AttackOn");
    doc.sentence_mut(0)
        .expect("sentence")
        .relations
        .add(RelMention::new(uid(0, 0), uid(0, 1), attack.clone(), 0, 0.9, ScoreSource::Derived))
        .expect("room");
    for _ in 0..2 {
        doc.relations
            .add(RelMention::new(uid(0, 1), uid(0, 0), attack.clone(), 1, 1.0, ScoreSource::Derived))
            .expect("room");
    }
    doc.relations
        .add(RelMention::new(uid(0, 0), uid(0, 1), Symbol::new("Other"), 1, 1.0, ScoreSource::Derived))
        .expect("room");

    let view = RelationView::new(&doc);
    assert_eq!(view.len(), 2);
    assert_eq!(view.dropped(), 2);
    assert_eq!(view.of_type("AttackOn").count(), 1);

    assert_eq!(deduplicate_document_relations(&mut doc).expect("dedupe"), 2);
    assert_eq!(doc.relations.len(), 1);
}
