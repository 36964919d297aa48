use std::collections::HashMap;
use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::SentenceTheory;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ...
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

type TokenRange = (usize, usize);

struct IncludedSpan {
    range: TokenRange,
    label: String,
    arrows: Vec<(String, TokenRange)>,
}

/// Renders a sentence with its mention and value spans underlined and
/// relations drawn as arrows to labelled target spans.
///
/// ```text
/// He  lives  there
/// ╰╯ PRON:PER
///   └─PHYS.Located─>[A]
///            ╰───╯[A] PRON:GPE
/// ```
pub struct SentenceDisplay<'a> {
    sentence: &'a SentenceTheory,
    spans: Vec<IncludedSpan>,
}

impl<'a> SentenceDisplay<'a> {
    pub fn new(sentence: &'a SentenceTheory) -> Self {
        SentenceDisplay {
            sentence,
            spans: Vec::new(),
        }
    }

    pub fn include_mentions(mut self) -> Self {
        let parse = &self.sentence.parse;
        for mention in self.sentence.mentions.iter() {
            let node = parse.node(mention.node);
            self.spans.push(IncludedSpan {
                range: (node.start_token, node.end_token),
                label: format!("{}:{}", mention.mention_type.as_str(), mention.entity_type),
                arrows: Vec::new(),
            });
        }
        self
    }

    pub fn include_values(mut self) -> Self {
        for value in self.sentence.values.iter() {
            self.spans.push(IncludedSpan {
                range: (value.start_token, value.end_token),
                label: format!("VALUE:{}", value.value_type),
                arrows: Vec::new(),
            });
        }
        self
    }

    /// Attach the sentence's relations to already included mention spans.
    pub fn include_relations(mut self) -> Self {
        let parse = &self.sentence.parse;
        let mentions = &self.sentence.mentions;
        for relation in self.sentence.relations.iter() {
            let (Some(left), Some(right)) = (mentions.by_uid(relation.left), mentions.by_uid(relation.right)) else {
                continue;
            };
            let left_node = parse.node(left.node);
            let right_node = parse.node(right.node);
            let left_range = (left_node.start_token, left_node.end_token);
            let right_range = (right_node.start_token, right_node.end_token);
            if let Some(span) = self.spans.iter_mut().find(|s| s.range == left_range) {
                span.arrows.push((relation.rel_type.to_string(), right_range));
            }
        }
        self
    }

    fn build_span_labels(&self) -> HashMap<TokenRange, String> {
        let included: Vec<TokenRange> = self.spans.iter().map(|s| s.range).collect();
        let mut targets: Vec<TokenRange> = self
            .spans
            .iter()
            .flat_map(|s| s.arrows.iter().map(|(_, target)| *target))
            .filter(|target| included.contains(target))
            .collect();
        targets.sort();
        targets.dedup();
        targets
            .into_iter()
            .enumerate()
            .map(|(i, range)| (range, format!("[{}]", index_to_base26_label(i))))
            .collect()
    }
}

impl<'a> fmt::Display for SentenceDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut opening_line = String::new();
        for (i, token) in self.sentence.tokens().iter().enumerate() {
            if i > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            starts.push(UnicodeWidthStr::width(&*opening_line));
            opening_line.push_str(token.text.as_str());
            ends.push(UnicodeWidthStr::width(&*opening_line));
        }
        f.write_str(&opening_line)?;

        let labels = self.build_span_labels();
        for span in &self.spans {
            let (Some(&start), Some(&end)) = (starts.get(span.range.0), ends.get(span.range.1)) else {
                continue;
            };
            f.write_char('\n')?;
            for _ in 0..start {
                f.write_char(' ')?;
            }
            f.write_char('╰')?;
            for _ in (start + 1)..end.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end - start > 1 {
                f.write_char('╯')?;
            }
            if let Some(label) = labels.get(&span.range) {
                f.write_str(label)?;
            }
            write!(f, " {}", span.label)?;

            for (label, target) in &span.arrows {
                f.write_char('\n')?;
                for _ in 0..(start + 2) {
                    f.write_char(' ')?;
                }
                let target_str = labels
                    .get(target)
                    .cloned()
                    .unwrap_or_else(|| format!("[{}..{}]", target.0, target.1));
                write!(f, "└─{}─>{}", label, target_str)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base26_labels() {
        assert_eq!(index_to_base26_label(0), "A");
        assert_eq!(index_to_base26_label(25), "Z");
        assert_eq!(index_to_base26_label(26), "AA");
        assert_eq!(index_to_base26_label(27), "AB");
    }
}
