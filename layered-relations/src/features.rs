//! Context predicates of a candidate `(left, right)` mention pair.

use layered_proptree::PropTreeLinks;
use layered_resolution::{DocTheory, FeatureVector, Mention, Symbol};

pub const DEFAULT_MAX_FEATURES: usize = 200;

/// Token gap between two spans, bucketed.
pub fn distance_bucket(gap: usize) -> &'static str {
    match gap {
        0 => "0",
        1 => "1",
        2 => "2",
        3..=5 => "3-5",
        6..=10 => "6-10",
        _ => ">10",
    }
}

/// Predicates, in order: entity types, mention types, head words, token gap,
/// then the proposition chain between the two (`prop-path`, `prop-dist`) or
/// `no-prop-link`. Pairs over the predicates after the first are appended.
pub fn relation_pair_features(
    doc: &DocTheory,
    links: Option<&PropTreeLinks>,
    left: &Mention,
    right: &Mention,
    max_size: usize,
) -> FeatureVector {
    let mut fv = FeatureVector::with_max_size(max_size);
    fv.push_atomic(format!("types[{},{}]", left.entity_type, right.entity_type));
    fv.push_atomic(format!("lt[{}]", left.entity_type));
    fv.push_atomic(format!("rt[{}]", right.entity_type));
    fv.push_atomic(format!(
        "mtypes[{},{}]",
        left.mention_type.as_str(),
        right.mention_type.as_str()
    ));

    if let Some(st) = doc.sentence(left.sentence).filter(|_| left.sentence == right.sentence) {
        let parse = &st.parse;
        fv.push_atomic(format!("lh[{}]", left.head_word(parse).to_lowercase()));
        fv.push_atomic(format!("rh[{}]", right.head_word(parse).to_lowercase()));
        let (l, r) = (parse.node(left.node), parse.node(right.node));
        let gap = if l.end_token < r.start_token {
            r.start_token - l.end_token - 1
        } else if r.end_token < l.start_token {
            l.start_token - r.end_token - 1
        } else {
            0
        };
        fv.push_atomic(format!("tok-dist[{}]", distance_bucket(gap)));
    }

    let chain = links
        .filter(|l| l.sentence() == left.sentence && left.sentence == right.sentence)
        .and_then(|l| l.mention_link(left.index, right.index).map(|chain| (l, chain)));
    match chain {
        Some((links, chain)) => {
            fv.push_atomic(Symbol::from(format!("prop-path[{}]", links.role_path(chain))));
            fv.push_atomic(format!("prop-dist[{}]", chain.distance));
        }
        None => {
            fv.push_atomic("no-prop-link");
        }
    }
    fv.add_bigrams();
    fv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        let buckets: Vec<_> = [0, 1, 2, 4, 7, 30].iter().map(|g| distance_bucket(*g)).collect();
        assert_eq!(buckets, vec!["0", "1", "2", "3-5", "6-10", ">10"]);
    }
}
