//! Minimal s-expression reader for pattern files.
//!
//! Atoms are runs of non-space characters other than parentheses, or
//! double-quoted strings. `;` starts a comment that runs to the end of the
//! line.

use std::fmt;

use layered_resolution::{ResolutionError, ResolutionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    pub fn is_list(&self) -> bool {
        matches!(self, Sexp::List(_))
    }

    pub fn atom(&self) -> Option<&str> {
        match self {
            Sexp::Atom(text) => Some(text),
            Sexp::List(_) => None,
        }
    }

    pub fn children(&self) -> &[Sexp] {
        match self {
            Sexp::List(children) => children,
            Sexp::Atom(_) => &[],
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Atom(text) => write!(f, "{}", text),
            Sexp::List(children) => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Atom(String),
}

fn tokenize(text: &str) -> ResolutionResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            ';' => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            '"' => {
                chars.next();
                let mut atom = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => {
                            if let Some(escaped) = chars.next() {
                                atom.push(escaped);
                            }
                        }
                        Some(c) => atom.push(c),
                        None => return Err(ResolutionError::unexpected_input("unterminated string in s-expression")),
                    }
                }
                tokens.push(Token::Atom(atom));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut atom = String::new();
                while let Some(c) = chars.next_if(|&c| !c.is_whitespace() && c != '(' && c != ')' && c != ';') {
                    atom.push(c);
                }
                tokens.push(Token::Atom(atom));
            }
        }
    }
    Ok(tokens)
}

/// Read exactly one s-expression from `text`.
pub fn parse_sexp(text: &str) -> ResolutionResult<Sexp> {
    let tokens = tokenize(text)?;
    let mut stack: Vec<Vec<Sexp>> = Vec::new();
    let mut done: Option<Sexp> = None;
    for token in tokens {
        if done.is_some() {
            return Err(ResolutionError::unexpected_input(
                "trailing content after s-expression",
            ));
        }
        let finished = match token {
            Token::Open => {
                stack.push(Vec::new());
                None
            }
            Token::Close => {
                let children = stack
                    .pop()
                    .ok_or_else(|| ResolutionError::unexpected_input("unbalanced `)` in s-expression"))?;
                Some(Sexp::List(children))
            }
            Token::Atom(text) => Some(Sexp::Atom(text)),
        };
        if let Some(sexp) = finished {
            match stack.last_mut() {
                Some(parent) => parent.push(sexp),
                None => done = Some(sexp),
            }
        }
    }
    if !stack.is_empty() {
        return Err(ResolutionError::unexpected_input("unbalanced `(` in s-expression"));
    }
    done.ok_or_else(|| ResolutionError::unexpected_input("empty s-expression"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lists_and_comments() {
        let sexp = parse_sexp(
            "; event relation patterns\n((Conflict.Attack Attacker Target AttackOn)\n (\"Life.Die\" Agent Victim KilledBy))",
        )
        .expect("valid");
        assert_eq!(sexp.children().len(), 2);
        insta::assert_snapshot!(sexp.to_string(), @"((Conflict.Attack Attacker Target AttackOn) (Life.Die Agent Victim KilledBy))");
    }

    #[test]
    fn unbalanced_input_is_rejected() {
        assert!(parse_sexp("((a b)").is_err());
        assert!(parse_sexp("(a b))").is_err());
        assert!(parse_sexp("(a) (b)").is_err());
        assert!(parse_sexp("   ").is_err());
    }

    #[test]
    fn bare_atom() {
        assert_eq!(parse_sexp("NONE").expect("atom"), Sexp::Atom("NONE".to_string()));
    }
}
