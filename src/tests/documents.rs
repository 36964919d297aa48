use crate::*;

fn john_smith_document() -> DocTheory {
    let mut builder = DocBuilder::new("scenario-1", Language::English);
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
        s.value(3, 3, "Numeric").expect("age value");
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

#[test]
fn builder_wires_mentions_and_definitions() {
    let doc = john_smith_document();
    assert_eq!(doc.n_sentences(), 2);

    let first = doc.sentence(0).expect("sentence 0");
    assert_eq!(first.mentions.len(), 2);
    let john = first.mentions.get(0).expect("John Smith");
    assert_eq!(john.text(&first.parse), "John Smith");
    assert_eq!(john.head_word(&first.parse), "Smith");
    assert_eq!(first.propositions.definition(0).map(|p| p.pred_type), Some(PredType::Name));
    assert_eq!(
        first.propositions.get(PropositionId(2)).and_then(|p| p.pred_symbol(&first.parse)),
        Some(Symbol::new("visited"))
    );

    let he = MentionUid::new(1, 0).expect("uid");
    assert_eq!(doc.mention_text(he).as_deref(), Some("He"));
    assert_eq!(doc.mention(he).map(|m| m.mention_type), Some(MentionType::Pron));
}

#[test]
fn value_lookup_through_document() {
    let doc = john_smith_document();
    let uid = ValueMentionUid::sentence_level(0, 0).expect("uid");
    assert_eq!(doc.value_text(uid).as_deref(), Some("45"));
    assert!(doc.value_mention(ValueMentionUid::Document { index: 0 }).is_none());
}

#[test]
fn display_draws_relation_arrows() {
    let mut doc = john_smith_document();
    let he = MentionUid::new(1, 0).expect("uid");
    let there = MentionUid::new(1, 1).expect("uid");
    let sentence = doc.sentence_mut(1).expect("sentence 1");
    sentence
        .relations
        .add(RelMention::new(
            he,
            there,
            Symbol::new("PHYS.Located"),
            1,
            0.9,
            ScoreSource::Derived,
        ))
        .expect("room for relation");

    let display = SentenceDisplay::new(doc.sentence(1).expect("sentence 1"))
        .include_mentions()
        .include_relations();
    insta::assert_snapshot!(display.to_string(), @r###"
    He  lives  there  .
    ╰╯ PRON:PER
      └─PHYS.Located─>[A]
               ╰───╯[A] PRON:GPE
    "###);
}

#[test]
fn display_marks_values() {
    let doc = john_smith_document();
    let display = SentenceDisplay::new(doc.sentence(0).expect("sentence 0")).include_values();
    insta::assert_snapshot!(display.to_string(), @r###"
    John  Smith  ,  45  ,  visited  Paris  .
                    ╰╯ VALUE:Numeric
    "###);
}
