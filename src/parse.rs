//! Syntactic parse trees.
//!
//! A [`Parse`] is an arena of [`SynNode`]s. Terminals are leaves whose tag is
//! the word itself; a preterminal has exactly one terminal child and carries
//! the part-of-speech tag.
//!
//! ```text
//! (S (NP (NNP John) (NNP Smith)) (VP (VBD visited) (NP (NNP Paris))))
//!
//!            S
//!     ╭──────┴──────╮
//!     NP            VP*          * = head child
//!   ╭─┴──╮       ╭──┴───╮
//!  NNP  NNP*    VBD*    NP
//!  John Smith  visited  NNP*
//!                       Paris
//! ```

use crate::{ResolutionError, ResolutionResult, Symbol, TokenSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SynNodeId(pub usize);

#[derive(Debug, Clone)]
pub struct SynNode {
    pub id: SynNodeId,
    pub tag: Symbol,
    pub parent: Option<SynNodeId>,
    pub children: Vec<SynNodeId>,
    /// Position of the head child in `children`. Meaningless for terminals.
    pub head_index: usize,
    pub start_token: usize,
    pub end_token: usize,
    /// Index into the sentence's mention set, when a mention sits on this node.
    pub mention: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Parse {
    nodes: Vec<SynNode>,
    root: SynNodeId,
    tokens: TokenSequence,
}

const VERB_TAGS: [&str; 6] = ["VB", "VBD", "VBG", "VBN", "VBP", "VBZ"];

impl Parse {
    /// Read a bracketed tree such as `(S (NP (NNP John)) (VP (VBD left)))`.
    ///
    /// A tag suffixed with `^` marks that child as the head of its parent,
    /// overriding the head table.
    pub fn from_bracketed(text: &str) -> ResolutionResult<Parse> {
        let lexemes = lex(text);
        if lexemes.is_empty() {
            return Err(ResolutionError::unexpected_input("empty parse tree"));
        }
        let mut reader = TreeReader {
            lexemes: &lexemes,
            pos: 0,
            nodes: Vec::new(),
            words: Vec::new(),
            explicit_heads: Vec::new(),
        };
        let root = reader.read_node(None)?;
        if reader.pos != lexemes.len() {
            return Err(ResolutionError::unexpected_input(format!(
                "trailing input after parse tree at lexeme {}",
                reader.pos
            )));
        }
        let TreeReader { nodes, words, .. } = reader;
        Ok(Parse {
            nodes,
            root,
            tokens: TokenSequence::from_words(words.iter().map(|w| w.as_str())),
        })
    }

    pub fn root(&self) -> SynNodeId {
        self.root
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: SynNodeId) -> &SynNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: SynNodeId) -> Option<&SynNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SynNode> {
        self.nodes.iter()
    }

    pub fn tag(&self, id: SynNodeId) -> &Symbol {
        &self.node(id).tag
    }

    pub fn parent(&self, id: SynNodeId) -> Option<SynNodeId> {
        self.node(id).parent
    }

    pub fn is_terminal(&self, id: SynNodeId) -> bool {
        self.node(id).children.is_empty()
    }

    pub fn is_preterminal(&self, id: SynNodeId) -> bool {
        let node = self.node(id);
        node.children.len() == 1 && self.is_terminal(node.children[0])
    }

    /// Head child, `None` for terminals.
    pub fn head(&self, id: SynNodeId) -> Option<SynNodeId> {
        let node = self.node(id);
        node.children.get(node.head_index).copied()
    }

    pub fn head_index(&self, id: SynNodeId) -> usize {
        self.node(id).head_index
    }

    /// Follow head children down to the preterminal.
    pub fn head_preterminal(&self, id: SynNodeId) -> SynNodeId {
        let mut current = id;
        while !self.is_preterminal(current) {
            match self.head(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    pub fn head_word(&self, id: SynNodeId) -> Symbol {
        let preterm = self.head_preterminal(id);
        match self.head(preterm) {
            Some(terminal) => self.node(terminal).tag.clone(),
            None => self.node(preterm).tag.clone(),
        }
    }

    /// Token index of the head word.
    pub fn head_token(&self, id: SynNodeId) -> usize {
        self.node(self.head_preterminal(id)).start_token
    }

    pub fn terminal_symbols(&self, id: SynNodeId) -> Vec<Symbol> {
        let node = self.node(id);
        (node.start_token..=node.end_token)
            .filter_map(|i| self.tokens.word(i).cloned())
            .collect()
    }

    pub fn n_terminals(&self, id: SynNodeId) -> usize {
        let node = self.node(id);
        node.end_token + 1 - node.start_token
    }

    pub fn text(&self, id: SynNodeId) -> String {
        let node = self.node(id);
        self.tokens.text(node.start_token, node.end_token)
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: SynNodeId) -> Ancestors<'_> {
        Ancestors {
            parse: self,
            next: self.parent(id),
        }
    }

    pub fn is_verb_tag(tag: &Symbol) -> bool {
        VERB_TAGS.contains(&tag.as_str())
    }

    /// Highest non-terminal covering exactly the inclusive token span, so that
    /// a mention over `(NP (NNP Paris))` lands on the NP.
    pub fn node_for_span(&self, start: usize, end: usize) -> Option<SynNodeId> {
        self.nodes
            .iter()
            .filter(|n| !n.children.is_empty() && n.start_token == start && n.end_token == end)
            .min_by_key(|n| self.depth_from(n.id))
            .map(|n| n.id)
    }

    pub fn set_mention(&mut self, id: SynNodeId, mention: usize) {
        self.nodes[id.0].mention = Some(mention);
    }

    /// Mention sitting on the head path below `id` (exclusive of `id`), nearest
    /// to `id` first.
    pub fn mention_on_head_path(&self, id: SynNodeId) -> Option<usize> {
        let mut found = None;
        let mut current = self.head_preterminal(id);
        while current != id {
            if let Some(m) = self.node(current).mention {
                found = Some(m);
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => break,
            }
        }
        found
    }

    fn depth_from(&self, id: SynNodeId) -> usize {
        self.ancestors(id).count()
    }
}

pub struct Ancestors<'a> {
    parse: &'a Parse,
    next: Option<SynNodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = SynNodeId;

    fn next(&mut self) -> Option<SynNodeId> {
        let current = self.next?;
        self.next = self.parse.parent(current);
        Some(current)
    }
}

#[derive(Debug, PartialEq)]
enum Lexeme<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn lex(text: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    let mut atom_start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(start) = atom_start.take() {
                out.push(Lexeme::Atom(&text[start..i]));
            }
            match c {
                '(' => out.push(Lexeme::Open),
                ')' => out.push(Lexeme::Close),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(i);
        }
    }
    if let Some(start) = atom_start {
        out.push(Lexeme::Atom(&text[start..]));
    }
    out
}

struct TreeReader<'a, 'b> {
    lexemes: &'b [Lexeme<'a>],
    pos: usize,
    nodes: Vec<SynNode>,
    words: Vec<String>,
    explicit_heads: Vec<SynNodeId>,
}

impl<'a, 'b> TreeReader<'a, 'b> {
    fn read_node(&mut self, parent: Option<SynNodeId>) -> ResolutionResult<SynNodeId> {
        if self.lexemes.get(self.pos) != Some(&Lexeme::Open) {
            return Err(ResolutionError::unexpected_input(format!(
                "expected `(` at lexeme {}",
                self.pos
            )));
        }
        self.pos += 1;
        let raw_tag = match self.lexemes.get(self.pos) {
            Some(Lexeme::Atom(tag)) => *tag,
            _ => {
                return Err(ResolutionError::unexpected_input(format!(
                    "expected a tag at lexeme {}",
                    self.pos
                )))
            }
        };
        self.pos += 1;
        let (tag, explicit_head) = match raw_tag.strip_suffix('^') {
            Some(stripped) => (stripped, true),
            None => (raw_tag, false),
        };

        let id = SynNodeId(self.nodes.len());
        let start_token = self.words.len();
        self.nodes.push(SynNode {
            id,
            tag: Symbol::new(tag),
            parent,
            children: Vec::new(),
            head_index: 0,
            start_token,
            end_token: start_token,
            mention: None,
        });
        if explicit_head {
            self.explicit_heads.push(id);
        }

        let mut children = Vec::new();
        loop {
            match self.lexemes.get(self.pos) {
                Some(Lexeme::Close) => {
                    self.pos += 1;
                    break;
                }
                Some(Lexeme::Open) => children.push(self.read_node(Some(id))?),
                Some(Lexeme::Atom(word)) => {
                    let word = *word;
                    self.pos += 1;
                    let token = self.words.len();
                    self.words.push(word.to_string());
                    let terminal = SynNodeId(self.nodes.len());
                    self.nodes.push(SynNode {
                        id: terminal,
                        tag: Symbol::new(word),
                        parent: Some(id),
                        children: Vec::new(),
                        head_index: 0,
                        start_token: token,
                        end_token: token,
                        mention: None,
                    });
                    children.push(terminal);
                }
                None => {
                    return Err(ResolutionError::unexpected_input(format!(
                        "unbalanced parentheses in parse tree under `{}`",
                        tag
                    )))
                }
            }
        }
        if children.is_empty() {
            return Err(ResolutionError::unexpected_input(format!(
                "node `{}` has no children",
                tag
            )));
        }

        let head_index = children
            .iter()
            .position(|c| self.explicit_heads.contains(c))
            .unwrap_or_else(|| {
                let tags: Vec<&str> = children.iter().map(|c| self.nodes[c.0].tag.as_str()).collect();
                choose_head(tag, &tags)
            });
        let end_token = self.words.len().saturating_sub(1).max(start_token);
        let node = &mut self.nodes[id.0];
        node.children = children;
        node.head_index = head_index;
        node.end_token = end_token;
        Ok(id)
    }
}

fn base_tag(tag: &str) -> &str {
    match tag.find(|c| c == '-' || c == '=') {
        Some(0) | None => tag,
        Some(i) => &tag[..i],
    }
}

fn is_nominal(tag: &str) -> bool {
    tag.starts_with("NN") || matches!(tag, "NP" | "NPP" | "NX" | "PRP" | "CD" | "WP" | "EX")
}

fn choose_head(tag: &str, children: &[&str]) -> usize {
    let rightmost = |pred: &dyn Fn(&str) -> bool| children.iter().rposition(|t| pred(base_tag(t)));
    let leftmost = |pred: &dyn Fn(&str) -> bool| children.iter().position(|t| pred(base_tag(t)));
    let last = children.len() - 1;
    match base_tag(tag) {
        "NP" | "NPP" | "NX" | "WHNP" => rightmost(&is_nominal).unwrap_or(last),
        "VP" => leftmost(&|t| t.starts_with("VB") || t == "MD" || t == "VP").unwrap_or(0),
        "S" | "SINV" | "SQ" => leftmost(&|t| t == "VP").unwrap_or(0),
        "SBAR" => leftmost(&|t| t == "S" || t == "SQ" || t == "SINV").unwrap_or(0),
        "PP" => leftmost(&|t| t == "IN" || t == "TO").unwrap_or(0),
        "QP" => rightmost(&|t| t == "CD").unwrap_or(last),
        "ADJP" => rightmost(&|t| t.starts_with("JJ")).unwrap_or(last),
        "ADVP" => rightmost(&|t| t.starts_with("RB")).unwrap_or(last),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Parse {
        Parse::from_bracketed(text).expect("valid tree")
    }

    #[test]
    fn head_word_follows_head_table() {
        let p = parse("(S (NP (NNP John) (NNP Smith)) (VP (VBD visited) (NP (NNP Paris))))");
        assert_eq!(p.head_word(p.root()), "visited");
        let subject = p.node(p.root()).children[0];
        assert_eq!(p.head_word(subject), "Smith");
        assert_eq!(p.text(subject), "John Smith");
        assert_eq!(p.tokens().len(), 4);
    }

    #[test]
    fn explicit_head_marker_wins() {
        let p = parse("(NP (NN^ president) (PP (IN of) (NP (NNP France))))");
        assert_eq!(p.head_word(p.root()), "president");
        assert_eq!(p.tag(p.root()), "NP");
    }

    #[test]
    fn node_for_span_prefers_highest_exact_cover() {
        let p = parse("(S (NP (NNP Paris)) (VP (VBZ sleeps)))");
        let np = p.node_for_span(0, 0).expect("span covered");
        assert_eq!(p.tag(np), "NP");
    }

    #[test]
    fn unbalanced_tree_is_rejected() {
        let err = Parse::from_bracketed("(S (NP (NN dog)").unwrap_err();
        assert!(matches!(err, ResolutionError::UnexpectedInput { .. }));
    }

    #[test]
    fn ancestors_walk_to_root() {
        let p = parse("(S (NP (DT the) (NN man)) (VP (VBD left)))");
        let the = p.nodes().find(|n| n.tag == "the").map(|n| n.id).expect("terminal");
        let tags: Vec<String> = p.ancestors(the).map(|a| p.tag(a).to_string()).collect();
        assert_eq!(tags, vec!["DT", "NP", "S"]);
    }
}
