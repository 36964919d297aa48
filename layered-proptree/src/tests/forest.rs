use layered_resolution::{
    Argument, DocBuilder, DocTheory, EntityType, ForestOptions, Language, MentionType, MentionUid,
    PredType, PropositionId,
};

use crate::*;

pub(super) fn john_smith_document() -> DocTheory {
    let mut builder = DocBuilder::new("john-smith", Language::English);
    {
        let mut s = builder
            .sentence(
                "(S (NP (NP (NNP John) (NNP Smith)) (, ,) (ADJP (CD 45)) (, ,)) \
                 (VP (VBD visited) (NP (NNP Paris))) (. .))",
            )
            .expect("first sentence");
        let john = s.mention(0, 1, MentionType::Name, "PER").expect("John Smith");
        let paris = s.mention(6, 6, MentionType::Name, "GPE").expect("Paris");
        s.prop(PredType::Name, None, vec![Argument::mention("<ref>", john)])
            .expect("name prop");
        s.prop(PredType::Name, None, vec![Argument::mention("<ref>", paris)])
            .expect("name prop");
        s.prop(
            PredType::Verb,
            Some(5),
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
    builder.build().expect("consistent document")
}

fn render_forest(arena: &TreeArena, doc: &DocTheory, forest: &PropForest) -> String {
    forest.trees().map(|t| t.render(arena, doc)).collect()
}

#[test]
fn all_mode_keeps_only_uncontained_trees() {
    let doc = john_smith_document();
    let mut arena = TreeArena::new();
    let mut forest = PropForest::new();
    let built = populate_prop_forest(
        &mut arena,
        &doc,
        0,
        ForestTarget::All,
        &mut forest,
        &ForestOptions::default(),
    )
    .expect("sentence exists");

    assert_eq!(built, 1);
    let tree = forest.trees().next().expect("one tree");
    assert_eq!(tree.head_prop, PropositionId(2));
    assert_eq!(tree.size(&arena), 5);
    insta::assert_snapshot!(render_forest(&arena, &doc, &forest), @r###"
    p2 visited (verb)
      <obj> p1 Paris (name) {m0.1}
        <ref> m0.1 "Paris"
      <sub> p0 Smith (name) {m0.0}
        <ref> m0.0 "John Smith"
    "###);
}

#[test]
fn pronoun_nodes_take_their_antecedent() {
    let mut doc = john_smith_document();
    let john = MentionUid::new(0, 0).expect("uid");
    let he = MentionUid::new(1, 0).expect("uid");
    let per = EntityType::parse("PER");
    let entity = doc.entities.add_new(john, per.clone()).expect("new entity");
    doc.entities.add_mention(entity, he, &per).expect("compatible");

    let mut arena = TreeArena::new();
    let mut forest = PropForest::new();
    populate_prop_forest(
        &mut arena,
        &doc,
        1,
        ForestTarget::All,
        &mut forest,
        &ForestOptions::default(),
    )
    .expect("sentence exists");

    let tree = forest.trees().next().expect("one tree");
    assert_eq!(tree.size(&arena), 3);
    assert!(tree.mentions(&arena).contains(&john));
    insta::assert_snapshot!(render_forest(&arena, &doc, &forest), @r###"
    p1 lives (verb)
      <loc> m1.1 "there"
      <sub> syn "John Smith" {m0.0, m1.0} <- m1.0
    "###);
}

#[test]
fn unresolved_pronoun_stays_a_proposition() {
    let doc = john_smith_document();
    let mut arena = TreeArena::new();
    let mut forest = PropForest::new();
    populate_prop_forest(
        &mut arena,
        &doc,
        1,
        ForestTarget::Proposition(PropositionId(1)),
        &mut forest,
        &ForestOptions::default(),
    )
    .expect("sentence exists");

    insta::assert_snapshot!(render_forest(&arena, &doc, &forest), @r###"
    p1 lives (verb)
      <loc> m1.1 "there"
      <sub> p0 He (pronoun) {m1.0}
        <ref> m1.0 "He"
    "###);
}

#[test]
fn modifiers_attach_under_the_noun_they_modify() {
    let mut builder = DocBuilder::new("man-in-paris", Language::English);
    {
        let mut s = builder
            .sentence("(S (NP (NP (DT the) (NN man)) (PP (IN in) (NP (NNP Paris)))) (VP (VBD left)))")
            .expect("sentence");
        let man = s.mention(0, 1, MentionType::Desc, "PER").expect("the man");
        let paris = s.mention(3, 3, MentionType::Name, "GPE").expect("Paris");
        s.prop(PredType::Noun, Some(1), vec![Argument::mention("<ref>", man)])
            .expect("noun prop");
        s.prop(PredType::Name, None, vec![Argument::mention("<ref>", paris)])
            .expect("name prop");
        s.prop(
            PredType::Modifier,
            Some(2),
            vec![Argument::mention("<ref>", man), Argument::mention("<obj>", paris)],
        )
        .expect("modifier prop");
        s.prop(PredType::Verb, Some(4), vec![Argument::mention("<sub>", man)])
            .expect("verb prop");
    }
    let doc = builder.build().expect("consistent document");

    let mut arena = TreeArena::new();
    let mut forest = PropForest::new();
    populate_prop_forest(
        &mut arena,
        &doc,
        0,
        ForestTarget::Proposition(PropositionId(3)),
        &mut forest,
        &ForestOptions::default(),
    )
    .expect("sentence exists");

    let tree = forest.trees().next().expect("one tree");
    assert_eq!(tree.size(&arena), 5);
    insta::assert_snapshot!(render_forest(&arena, &doc, &forest), @r###"
    p3 left (verb)
      <sub> p0 man (noun) {m0.0}
        <obj> p1 Paris (name) {m0.1}
          <ref> m0.1 "Paris"
        <ref> m0.0 "the man"
    "###);

    let mut bare = PropForest::new();
    let options = ForestOptions {
        resolve_pronouns: false,
        include_modifiers: false,
    };
    populate_prop_forest(&mut arena, &doc, 0, ForestTarget::All, &mut bare, &options).expect("sentence exists");
    let heads: Vec<_> = bare.trees().map(|t| t.head_prop).collect();
    assert_eq!(heads, vec![PropositionId(1), PropositionId(3)]);
}

#[test]
fn cyclic_arguments_terminate() {
    let mut builder = DocBuilder::new("cycle", Language::English);
    {
        let mut s = builder
            .sentence("(S (NP (NNP Ann)) (VP (VBD said) (SBAR (S (VP (VBD said))))))")
            .expect("sentence");
        s.prop(PredType::Verb, Some(1), vec![Argument::proposition("<obj>", PropositionId(1))])
            .expect("first");
        s.prop(PredType::Verb, Some(2), vec![Argument::proposition("<obj>", PropositionId(0))])
            .expect("second");
    }
    let doc = builder.build().expect("consistent document");

    let mut arena = TreeArena::new();
    let tree = PropTree::build(&mut arena, &doc, 0, PropositionId(0)).expect("verb tree");
    assert_eq!(tree.size(&arena), 2);
    assert_eq!(
        tree.traverse(&arena, TraversalOrder::LeftRightHead).last(),
        Some(&tree.root)
    );
}

#[test]
fn mention_target_builds_trees_for_the_whole_entity() {
    let mut doc = john_smith_document();
    let john = MentionUid::new(0, 0).expect("uid");
    let he = MentionUid::new(1, 0).expect("uid");
    let per = EntityType::parse("PER");
    let entity = doc.entities.add_new(john, per.clone()).expect("new entity");
    doc.entities.add_mention(entity, he, &per).expect("compatible");

    let mut arena = TreeArena::new();
    let mut forest = PropForest::new();
    let options = ForestOptions {
        resolve_pronouns: false,
        include_modifiers: false,
    };
    let built = populate_prop_forest(&mut arena, &doc, 1, ForestTarget::Mention(he), &mut forest, &options)
        .expect("sentence exists");
    assert_eq!(built, 2);
    let keys: Vec<_> = forest.iter().map(|(k, _)| (k.sentence, k.head_prop)).collect();
    assert_eq!(keys, vec![(0, PropositionId(0)), (1, PropositionId(0))]);
}

#[test]
fn missing_sentence_is_unexpected_input() {
    let doc = john_smith_document();
    let mut arena = TreeArena::new();
    let mut forest = PropForest::new();
    let err = populate_prop_forest(
        &mut arena,
        &doc,
        7,
        ForestTarget::All,
        &mut forest,
        &ForestOptions::default(),
    )
    .unwrap_err();
    assert!(!err.is_inconsistency());
    assert!(forest.is_empty());
}

#[test]
fn cleared_arena_invalidates_trees() {
    let doc = john_smith_document();
    let mut arena = TreeArena::new();
    let tree = PropTree::build(&mut arena, &doc, 0, PropositionId(2)).expect("verb tree");
    assert_eq!(tree.size(&arena), 5);
    arena.clear();
    assert_eq!(tree.size(&arena), 0);
    assert!(tree.traverse(&arena, TraversalOrder::HeadLeftRight).is_empty());
}
