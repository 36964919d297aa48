//! Pure helpers over one mention's parse node.
//!
//! ```text
//! (NP (DT the) (JJ tall) (NN man))
//!      ╰──premods───╯     head
//! ```

use std::collections::HashSet;

use layered_resolution::{Parse, Symbol, SynNodeId};

/// Most premodifiers read from one mention.
pub const MAX_PREMODS: usize = 5;
/// Most distinct premodifiers collected over an entity.
pub const MAX_ENTITY_PREMODS: usize = 50;
/// Sentence distances saturate here.
pub const MAX_DISTANCE: usize = 5;

/// Terminals before the first occurrence of the head word.
pub fn premods(parse: &Parse, node: SynNodeId) -> Vec<Symbol> {
    let head = parse.head_word(node);
    parse
        .terminal_symbols(node)
        .into_iter()
        .take(MAX_PREMODS)
        .take_while(|w| *w != head)
        .collect()
}

/// Head word of the nearest ancestor headed by a verb other than the
/// mention's own head word.
pub fn parent_head(parse: &Parse, node: SynNodeId) -> Option<Symbol> {
    let own = parse.head_word(node);
    parse.ancestors(node).find_map(|ancestor| {
        let preterminal = parse.head_preterminal(ancestor);
        let word = parse.head_word(ancestor);
        (word != own && Parse::is_verb_tag(parse.tag(preterminal))).then_some(word)
    })
}

/// Terminals of the node reached by descending heads until the head child is
/// a preterminal: `(NP (NP (NNP John) (NNP Smith)) , 45 ,)` gives `John Smith`.
pub fn head_np_words(parse: &Parse, node: SynNodeId) -> Vec<Symbol> {
    let mut current = node;
    while let Some(head) = parse.head(current) {
        if parse.is_terminal(head) || parse.is_preterminal(head) {
            break;
        }
        current = head;
    }
    parse.terminal_symbols(current)
}

/// Leading cardinal number: a `CD` child, or a `QP` headed by `CD`, before
/// the head child.
pub fn numeric_premod(parse: &Parse, node: SynNodeId) -> Option<Symbol> {
    if parse.is_preterminal(node) || parse.is_terminal(node) {
        return None;
    }
    let head_index = parse.head_index(node);
    parse.node(node).children.iter().take(head_index).find_map(|child| {
        match parse.tag(*child).as_str() {
            "QP" => parse
                .head(*child)
                .filter(|h| parse.tag(*h) == "CD")
                .map(|h| parse.head_word(h)),
            "CD" => Some(parse.head_word(*child)),
            _ => None,
        }
    })
}

/// `u[..]` bucket for the share of the mention's non-head words that no
/// mention of the entity carries as a non-head word.
pub fn unique_modifier_ratio(parse: &Parse, node: SynNodeId, entity_words: &HashSet<Symbol>) -> Symbol {
    let words = parse.terminal_symbols(node);
    if words.len() == 1 {
        return Symbol::new("u[0.0]");
    }
    if entity_words.is_empty() {
        return Symbol::new("u[1.0]");
    }
    let head = parse.head_word(node);
    let modifiers: Vec<&Symbol> = words.iter().filter(|w| **w != head).collect();
    if modifiers.is_empty() {
        return Symbol::new("u[0.0]");
    }
    let unique = modifiers.iter().filter(|w| !entity_words.contains(**w)).count();
    let ratio = unique as f64 / modifiers.len() as f64;
    let bucket = if ratio == 0.0 {
        "u[0.0]"
    } else if ratio < 0.25 {
        "u[<.25]"
    } else if ratio < 0.5 {
        "u[<.5]"
    } else if ratio < 0.75 {
        "u[<.75]"
    } else if ratio < 1.0 {
        "u[<1.0]"
    } else {
        "u[1.0]"
    };
    Symbol::new(bucket)
}

/// Non-head terminals of a node.
pub fn modifier_words(parse: &Parse, node: SynNodeId) -> impl Iterator<Item = Symbol> {
    let head = parse.head_word(node);
    parse
        .terminal_symbols(node)
        .into_iter()
        .filter(move |w| *w != head)
}

pub fn distance_symbol(distance: usize) -> Symbol {
    Symbol::new(&format!("D{}", distance.min(MAX_DISTANCE)))
}

pub fn num_ents_symbol(count: usize) -> Symbol {
    if count <= 10 {
        Symbol::new(&format!("numEnts[{}]", count))
    } else {
        Symbol::new("numEnts[>10]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tree: &str) -> Parse {
        Parse::from_bracketed(tree).expect("well-formed tree")
    }

    fn np(parse: &Parse) -> SynNodeId {
        parse.node_for_span(0, parse.tokens().len() - 1).expect("covering node")
    }

    #[test]
    fn premods_stop_at_the_head() {
        let p = parse("(NP (DT the) (JJ tall) (NN man))");
        let words: Vec<String> = premods(&p, np(&p)).iter().map(|s| s.to_string()).collect();
        assert_eq!(words, vec!["the", "tall"]);
    }

    #[test]
    fn premods_are_capped() {
        let p = parse("(NP (JJ a) (JJ b) (JJ c) (JJ d) (JJ e) (JJ f) (NN man))");
        assert_eq!(premods(&p, np(&p)).len(), MAX_PREMODS);
    }

    #[test]
    fn parent_head_skips_own_head() {
        let p = parse("(S (NP (NNP Paris)) (VP (VBZ sleeps)))");
        let paris = p.node_for_span(0, 0).expect("NP");
        assert_eq!(parent_head(&p, paris), Some(Symbol::new("sleeps")));
        let verb_phrase = p.node_for_span(1, 1).expect("VP");
        assert_eq!(parent_head(&p, verb_phrase), None);
    }

    #[test]
    fn head_np_words_descend_to_the_base_np() {
        let p = parse("(NP (NP (NNP John) (NNP Smith)) (, ,) (ADJP (CD 45)) (, ,))");
        let words: Vec<String> = head_np_words(&p, np(&p)).iter().map(|s| s.to_string()).collect();
        assert_eq!(words, vec!["John", "Smith"]);
    }

    #[test]
    fn numeric_premods() {
        let p = parse("(NP (CD three) (NNS soldiers))");
        assert_eq!(numeric_premod(&p, np(&p)), Some(Symbol::new("three")));

        let p = parse("(NP (QP (RB about) (CD 40)) (NNS soldiers))");
        assert_eq!(numeric_premod(&p, np(&p)), Some(Symbol::new("40")));

        let p = parse("(NP (DT the) (NNS soldiers))");
        assert_eq!(numeric_premod(&p, np(&p)), None);
    }

    #[test]
    fn ratio_boundaries() {
        let bare = parse("(NP (NN man))");
        let mut entity_words = HashSet::new();
        entity_words.insert(Symbol::new("tall"));
        assert_eq!(unique_modifier_ratio(&bare, np(&bare), &entity_words), "u[0.0]");

        let modified = parse("(NP (DT the) (JJ short) (NN man))");
        assert_eq!(unique_modifier_ratio(&modified, np(&modified), &HashSet::new()), "u[1.0]");
        assert_eq!(unique_modifier_ratio(&modified, np(&modified), &entity_words), "u[1.0]");

        entity_words.insert(Symbol::new("the"));
        assert_eq!(unique_modifier_ratio(&modified, np(&modified), &entity_words), "u[<.75]");
    }

    #[test]
    fn distance_saturates() {
        assert_eq!(distance_symbol(0), "D0");
        assert_eq!(distance_symbol(100), "D5");
        assert_eq!(num_ents_symbol(3), "numEnts[3]");
        assert_eq!(num_ents_symbol(11), "numEnts[>10]");
    }
}
