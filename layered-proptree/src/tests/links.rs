use layered_resolution::{
    Argument, DocBuilder, EntityType, ForestOptions, Language, MentionType, MentionUid, PredType,
};

use super::forest::john_smith_document;
use crate::*;

#[test]
fn subject_and_object_meet_at_the_verb() {
    let doc = john_smith_document();
    let links = PropTreeLinks::new(0, &doc, &ForestOptions::default()).expect("sentence exists");

    assert_eq!(links.n_positions(), 4);
    let chain = links.mention_link(0, 1).expect("connected");
    assert_eq!(chain.distance, 2);
    assert_eq!(chain.top, 1);
    assert_eq!(links.role_path(chain), "<sub>^[visited]v<obj>");

    let back = links.mention_link(1, 0).expect("connected");
    assert_eq!(back.distance, 2);
    assert_eq!(links.role_path(back), "<obj>^[visited]v<sub>");

    let top = chain.nodes[chain.top];
    let element = links.dictionary().get(top).expect("indexed");
    assert_eq!(element.kind, TneKind::Proposition(PredType::Verb));
    assert_eq!(element.arity, 2);
    assert_eq!(element.depth, 0);
}

#[test]
fn resolved_pronoun_keeps_its_position() {
    let mut doc = john_smith_document();
    let john = MentionUid::new(0, 0).expect("uid");
    let he = MentionUid::new(1, 0).expect("uid");
    let per = EntityType::parse("PER");
    let entity = doc.entities.add_new(john, per.clone()).expect("new entity");
    doc.entities.add_mention(entity, he, &per).expect("compatible");

    let unresolved = ForestOptions {
        resolve_pronouns: false,
        include_modifiers: true,
    };
    let plain = PropTreeLinks::new(1, &doc, &unresolved).expect("sentence exists");
    let resolved = PropTreeLinks::new(1, &doc, &ForestOptions::default()).expect("sentence exists");

    assert!(!resolved.positions_of_mention(0).is_empty());
    let expected = plain.mention_link(0, 1).expect("connected without resolution").distance;
    let chain = resolved.mention_link(0, 1).expect("connected after resolution");
    assert_eq!(chain.distance, expected);
    let start = chain.start().and_then(|id| resolved.dictionary().get(id)).expect("indexed");
    assert_eq!(start.kind, TneKind::Syn);
}

#[test]
fn links_are_cached_both_ways() {
    let doc = john_smith_document();
    let links = PropTreeLinks::new(0, &doc, &ForestOptions::default()).expect("sentence exists");
    for i in 0..links.n_positions() {
        assert!(links.get_link(i, i).is_none());
        for j in 0..links.n_positions() {
            if i == j {
                continue;
            }
            let forward = links.get_link(i, j).expect("one tree connects everything");
            let backward = links.get_link(j, i).expect("cached");
            assert_eq!(forward.distance, backward.distance);
            assert_eq!(forward.start(), backward.end());
        }
    }
}

#[test]
fn separate_trees_connect_through_a_shared_mention() {
    // "Ann met Bob . Bob won" in one sentence: two verb trees sharing Bob
    let mut builder = DocBuilder::new("bridge", Language::English);
    {
        let mut s = builder
            .sentence("(S (S (NP (NNP Ann)) (VP (VBD met) (NP (NNP Bob)))) (CC and) (S (NP (PRP he)) (VP (VBD won))))")
            .expect("sentence");
        let ann = s.mention(0, 0, MentionType::Name, "PER").expect("Ann");
        let bob = s.mention(2, 2, MentionType::Name, "PER").expect("Bob");
        s.prop(PredType::Verb, Some(1), vec![Argument::mention("<sub>", ann), Argument::mention("<obj>", bob)])
            .expect("met");
        s.prop(PredType::Verb, Some(5), vec![Argument::mention("<sub>", bob)])
            .expect("won");
    }
    let doc = builder.build().expect("consistent document");
    let links = PropTreeLinks::new(0, &doc, &ForestOptions::default()).expect("sentence exists");

    assert_eq!(links.forest().len(), 2);
    let ann_positions = links.positions_of_mention(0);
    let won_tree_bob = links
        .positions_of_mention(1)
        .into_iter()
        .find(|p| {
            links
                .position(*p)
                .and_then(|id| links.dictionary().get(id))
                .map_or(false, |e| e.tree == 1)
        })
        .expect("Bob under `won`");
    let chain = links.get_link(ann_positions[0], won_tree_bob).expect("bridged");
    assert_eq!(chain.distance, 3);
    assert_eq!(links.role_path(chain), "<sub>^[met]v<obj>=");
}

#[test]
fn sentence_without_propositions_has_no_links() {
    let mut builder = DocBuilder::new("empty", Language::English);
    {
        let mut s = builder.sentence("(S (NP (NNP Paris)))").expect("sentence");
        s.mention(0, 0, MentionType::Name, "GPE").expect("Paris");
    }
    let doc = builder.build().expect("consistent document");
    let links = PropTreeLinks::new(0, &doc, &ForestOptions::default()).expect("sentence exists");
    assert_eq!(links.n_positions(), 0);
    assert!(links.mention_link(0, 0).is_none());
    assert!(links.dictionary().is_empty());
}
