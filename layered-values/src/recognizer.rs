//! Event value recognizers.
//!
//! Justice and Personnel events carry value slots that the mention finder does
//! not fill: the crime, the sentence handed down, the position taken or left.
//! A recognizer proposes token spans for those slots; [`create_event_values`]
//! turns the proposals into document-level value mentions and event value
//! arguments.
//!
//! ```text
//! Justice.*          + no Crime    -> Crime      (arg Crime)
//! Justice.Sentence   + no Sentence -> Sentence   (arg Sentence)
//! Personnel.*        + no Position -> Job-Title  (arg Position)
//! ```
//!
//! After the recognizer ran for an event, a Personnel event still without a
//! position takes a job-title DESC mention of its `Person` (score 0.5), and a
//! crime is copied to other Justice events tied to the same proposition.

use layered_resolution::{
    ArgValue, DocTheory, EventMention, EventValueEngine, MentionType, Parse, Proposition,
    ResolutionError, ResolutionResult, SentenceTheory, Symbol, ValueMentionUid, ValueOptions,
    ValueType,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::matching::{projected_span, JoinedTokens};

pub const CRIME: &str = "Crime";
pub const SENTENCE: &str = "Sentence";
pub const JOB_TITLE: &str = "Job-Title";
pub const POSITION_ROLE: &str = "Position";
pub const PERSON_ROLE: &str = "Person";
pub const TRIGGER_ROLE: &str = "trigger";

static CRIME_WORDS: &[&str] = &[
    "arson",
    "assault",
    "bribery",
    "burglary",
    "corruption",
    "embezzlement",
    "espionage",
    "extortion",
    "fraud",
    "homicide",
    "kidnapping",
    "larceny",
    "manslaughter",
    "murder",
    "perjury",
    "racketeering",
    "rape",
    "robbery",
    "smuggling",
    "terrorism",
    "theft",
    "trafficking",
    "treason",
];

static JOB_TITLES: &[&str] = &[
    "ambassador",
    "analyst",
    "attorney",
    "ceo",
    "chairman",
    "chairwoman",
    "chancellor",
    "chief",
    "coach",
    "commander",
    "director",
    "editor",
    "employee",
    "engineer",
    "executive",
    "general",
    "governor",
    "head",
    "judge",
    "lawyer",
    "leader",
    "manager",
    "mayor",
    "minister",
    "officer",
    "president",
    "professor",
    "reporter",
    "secretary",
    "senator",
    "spokesman",
    "spokeswoman",
    "teacher",
    "treasurer",
    "worker",
];

static SENTENCE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:\d+|a|an|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|fifteen|twenty|thirty|forty|fifty)(?: -)? (?:years?|months?|weeks?|days?) (?:in|of) (?:prison|jail|imprisonment|detention)|life (?:in prison|imprisonment)|death (?:penalty|sentence))\b",
    )
    .expect("Invalid sentence phrase regex")
});

static AS_JOB_TITLE: Lazy<Regex> = Lazy::new(|| {
    let titles = JOB_TITLES.join("|");
    Regex::new(&format!(r"\bas (?:the |a |an |its |their )?((?:vice )?(?:{}))\b", titles))
        .expect("Invalid job title regex")
});

pub fn is_crime_word(word: &str) -> bool {
    CRIME_WORDS.contains(&word.to_lowercase().as_str())
}

pub fn is_job_title(word: &str) -> bool {
    JOB_TITLES.contains(&word.to_lowercase().as_str())
}

/// A value a recognizer wants to attach to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueProposal {
    pub value_type: ValueType,
    /// Event argument role the value fills.
    pub role: Symbol,
    pub start_token: usize,
    pub end_token: usize,
    pub score: f64,
}

impl ValueProposal {
    pub fn new(value_type: &str, role: &str, start_token: usize, end_token: usize, score: f64) -> Self {
        ValueProposal {
            value_type: ValueType::parse(value_type),
            role: Symbol::new(role),
            start_token,
            end_token,
            score,
        }
    }
}

/// Finds event value spans for one event mention.
pub trait EventValueRecognizer {
    fn name(&self) -> &str;

    fn propose(&self, doc: &DocTheory, event: &EventMention) -> Vec<ValueProposal>;
}

/// The recognizer selected by `event_value_engine`, if any.
pub fn recognizer_for(options: &ValueOptions) -> ResolutionResult<Option<Box<dyn EventValueRecognizer>>> {
    Ok(match options.event_value_engine {
        EventValueEngine::None => None,
        EventValueEngine::Deprecated => Some(Box::new(DeprecatedEventValueRecognizer::new())),
        EventValueEngine::Pattern => {
            if options.value_patterns.is_empty() {
                return Err(ResolutionError::missing_parameter("value_patterns"));
            }
            Some(Box::new(PatternEventValueRecognizer::new(&options.value_patterns)?))
        }
    })
}

/// Lexicon recognizer: crime nouns, prison-term phrases and "as <title>".
#[derive(Debug, Clone, Default)]
pub struct DeprecatedEventValueRecognizer;

impl DeprecatedEventValueRecognizer {
    pub fn new() -> Self {
        DeprecatedEventValueRecognizer
    }

    fn crimes(parse: &Parse) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = parse
            .nodes()
            .filter(|n| parse.is_preterminal(n.id))
            .filter(|n| is_crime_word(parse.head_word(n.id).as_str()))
            .map(|n| projected_span(parse, n.start_token, n.end_token))
            .collect();
        spans.sort_unstable();
        spans.dedup();
        spans
    }
}

impl EventValueRecognizer for DeprecatedEventValueRecognizer {
    fn name(&self) -> &str {
        "deprecated"
    }

    fn propose(&self, doc: &DocTheory, event: &EventMention) -> Vec<ValueProposal> {
        let st = match doc.sentence(event.sentence) {
            Some(st) => st,
            None => return Vec::new(),
        };
        let mut proposals = Vec::new();
        if wants_crime(event) {
            for (start, end) in Self::crimes(&st.parse) {
                proposals.push(ValueProposal::new(CRIME, CRIME, start, end, 1.0));
            }
        }
        let lowered = JoinedTokens::new(st.tokens(), true);
        if wants_sentence(event) {
            if let Some((start, end)) = lowered.find_spans(&SENTENCE_PHRASE).into_iter().next() {
                proposals.push(ValueProposal::new(SENTENCE, SENTENCE, start, end, 1.0));
            }
        }
        if wants_position(event) {
            for caps in AS_JOB_TITLE.captures_iter(lowered.text()) {
                let title = match caps.get(1) {
                    Some(title) => title,
                    None => continue,
                };
                if let Some((start, end)) = lowered.token_span(title.start(), title.end()) {
                    proposals.push(ValueProposal::new(JOB_TITLE, POSITION_ROLE, start, end, 1.0));
                }
            }
        }
        proposals
    }
}

/// What a configured pattern returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternReturn {
    Crime,
    Sentence,
    Position,
}

impl PatternReturn {
    fn parse(text: &str) -> ResolutionResult<Self> {
        match text {
            "Crime" => Ok(PatternReturn::Crime),
            "Sentence" => Ok(PatternReturn::Sentence),
            "Position" => Ok(PatternReturn::Position),
            other => Err(ResolutionError::unexpected_input(format!(
                "value pattern returns an unrecognized value type: '{}'",
                other
            ))),
        }
    }

    fn value_type_and_role(self) -> (&'static str, &'static str) {
        match self {
            PatternReturn::Crime => (CRIME, CRIME),
            PatternReturn::Sentence => (SENTENCE, SENTENCE),
            PatternReturn::Position => (JOB_TITLE, POSITION_ROLE),
        }
    }
}

#[derive(Debug, Clone)]
struct ValuePattern {
    returns: PatternReturn,
    regex: Regex,
}

/// Regex rules over the space-joined sentence, each returning `Crime`,
/// `Sentence` or `Position`.
#[derive(Debug, Clone)]
pub struct PatternEventValueRecognizer {
    patterns: Vec<ValuePattern>,
}

impl PatternEventValueRecognizer {
    /// Compile `(returns, regex)` rules. Unknown return types and bad regexes
    /// are rejected.
    pub fn new(rules: &[(String, String)]) -> ResolutionResult<Self> {
        let patterns = rules
            .iter()
            .map(|(returns, pattern)| {
                let regex = Regex::new(pattern).map_err(|e| {
                    ResolutionError::unexpected_input(format!("value pattern `{}`: {}", pattern, e))
                })?;
                Ok(ValuePattern {
                    returns: PatternReturn::parse(returns)?,
                    regex,
                })
            })
            .collect::<ResolutionResult<Vec<_>>>()?;
        Ok(PatternEventValueRecognizer { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl EventValueRecognizer for PatternEventValueRecognizer {
    fn name(&self) -> &str {
        "pattern"
    }

    fn propose(&self, doc: &DocTheory, event: &EventMention) -> Vec<ValueProposal> {
        let st = match doc.sentence(event.sentence) {
            Some(st) => st,
            None => return Vec::new(),
        };
        let joined = JoinedTokens::new(st.tokens(), false);
        let mut proposals = Vec::new();
        for pattern in &self.patterns {
            let wanted = match pattern.returns {
                PatternReturn::Crime => wants_crime(event),
                PatternReturn::Sentence => wants_sentence(event),
                PatternReturn::Position => wants_position(event),
            };
            if !wanted {
                continue;
            }
            let (value_type, role) = pattern.returns.value_type_and_role();
            for (start, end) in joined.find_spans(&pattern.regex) {
                let (start, end) = projected_span(&st.parse, start, end);
                proposals.push(ValueProposal::new(value_type, role, start, end, 1.0));
            }
        }
        proposals
    }
}

fn wants_crime(event: &EventMention) -> bool {
    event.is_family("Justice") && event.first_value_for_role(CRIME).is_none()
}

fn wants_sentence(event: &EventMention) -> bool {
    event.event_type == "Justice.Sentence" && event.first_value_for_role(SENTENCE).is_none()
}

fn wants_position(event: &EventMention) -> bool {
    event.is_family("Personnel") && event.first_value_for_role(POSITION_ROLE).is_none()
}

/// Run `recognizer` over every event mention and record its values.
///
/// Returns the number of new document-level value mentions.
pub fn create_event_values(doc: &mut DocTheory, recognizer: &dyn EventValueRecognizer) -> ResolutionResult<usize> {
    let before = doc.values.len();
    for sentence in 0..doc.n_sentences() {
        let n_events = doc.sentence(sentence).map_or(0, |st| st.events.len());
        for index in 0..n_events {
            let event = match doc.sentence(sentence).and_then(|st| st.events.get(index)) {
                Some(event) => event.clone(),
                None => continue,
            };
            for proposal in recognizer.propose(doc, &event) {
                add_event_value(doc, sentence, index, &proposal)?;
            }
            let fallback = event_at(doc, sentence, index).and_then(|e| position_from_person(doc, e));
            if let Some(proposal) = fallback {
                add_event_value(doc, sentence, index, &proposal)?;
            }
            transfer_crime(doc, sentence, index);
        }
    }
    let created = doc.values.len() - before;
    log::info!(
        "{} recognizer created {} document value mentions in {}",
        recognizer.name(),
        created,
        doc.name
    );
    Ok(created)
}

fn event_at(doc: &DocTheory, sentence: usize, index: usize) -> Option<&EventMention> {
    doc.sentence(sentence)?.events.get(index)
}

/// Find or add the document value mention and attach it to the event.
fn add_event_value(
    doc: &mut DocTheory,
    sentence: usize,
    index: usize,
    proposal: &ValueProposal,
) -> ResolutionResult<()> {
    let existing = doc
        .values
        .find_same(&proposal.value_type, sentence, proposal.start_token, proposal.end_token)
        .map(|vm| vm.uid);
    let uid = match existing {
        Some(uid) => uid,
        None => doc.values.add(
            proposal.value_type.clone(),
            sentence,
            proposal.start_token,
            proposal.end_token,
        )?,
    };
    if let Some(event) = doc.sentence_mut(sentence).and_then(|st| st.events.get_mut(index)) {
        let known = event
            .value_args
            .iter()
            .any(|(role, value)| role == &proposal.role && *value == uid);
        if !known {
            log::debug!("{} gets {} {} (score {:.2})", event.event_type, proposal.role, uid, proposal.score);
            event.value_args.push((proposal.role.clone(), uid));
        }
    }
    Ok(())
}

/// A Personnel event without a position takes a job-title DESC mention of its
/// `Person` argument, or of that person's entity within the same sentence.
fn position_from_person(doc: &DocTheory, event: &EventMention) -> Option<ValueProposal> {
    if !wants_position(event) {
        return None;
    }
    let st = doc.sentence(event.sentence)?;
    let is_title_desc = |index: usize| {
        st.mentions.get(index).and_then(|m| {
            if m.mention_type != MentionType::Desc || !is_job_title(m.head_word(&st.parse).as_str()) {
                return None;
            }
            let node = st.parse.node(m.node);
            Some(ValueProposal::new(JOB_TITLE, POSITION_ROLE, node.start_token, node.end_token, 0.5))
        })
    };
    for (role, uid) in &event.args {
        if role != PERSON_ROLE || uid.sentence() != event.sentence {
            continue;
        }
        if let Some(proposal) = is_title_desc(uid.index()) {
            return Some(proposal);
        }
        let entity = match doc.entities.entity_by_mention(*uid) {
            Some(entity) => entity,
            None => continue,
        };
        let found = entity
            .mentions
            .iter()
            .filter(|m| m.sentence() == event.sentence)
            .find_map(|m| is_title_desc(m.index()));
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Copy the event's crime to other Justice events of the sentence that share
/// a proposition with it, as trigger or argument.
fn transfer_crime(doc: &mut DocTheory, sentence: usize, index: usize) {
    let targets = match doc.sentence(sentence) {
        Some(st) => crime_targets(st, index),
        None => return,
    };
    if let Some(st) = doc.sentence_mut(sentence) {
        for (target, crime) in targets {
            if let Some(event) = st.events.get_mut(target) {
                if event.first_value_for_role(CRIME).is_none() {
                    log::debug!("crime {} transferred to {}", crime, event.event_type);
                    event.add_value_arg(CRIME, crime);
                }
            }
        }
    }
}

fn crime_targets(st: &SentenceTheory, index: usize) -> Vec<(usize, ValueMentionUid)> {
    let event = match st.events.get(index) {
        Some(event) => event,
        None => return Vec::new(),
    };
    let crime = match event.first_value_for_role(CRIME) {
        Some(crime) => crime,
        None => return Vec::new(),
    };
    let mut targets = Vec::new();
    for prop in st.propositions.iter() {
        if role_in_proposition(st, prop, event).is_none() {
            continue;
        }
        for (other_index, other) in st.events.iter().enumerate() {
            if other_index == index || !other.is_family("Justice") || other.first_value_for_role(CRIME).is_some() {
                continue;
            }
            if role_in_proposition(st, prop, other).is_some() && !targets.iter().any(|(t, _)| *t == other_index) {
                targets.push((other_index, crime));
            }
        }
    }
    targets
}

/// Role the event's anchor plays in `prop`: `trigger` when `prop` is the
/// anchor's own proposition, else the first argument pointing at the anchor.
fn role_in_proposition(st: &SentenceTheory, prop: &Proposition, event: &EventMention) -> Option<Symbol> {
    let parse = &st.parse;
    let anchor = parse.head_preterminal(event.anchor?);
    let anchor_prop = st
        .propositions
        .iter()
        .find(|p| p.pred_head.map(|h| parse.head_preterminal(h)) == Some(anchor))
        .map(|p| p.id);
    if anchor_prop == Some(prop.id) {
        return Some(Symbol::new(TRIGGER_ROLE));
    }
    prop.args.iter().find_map(|arg| match arg.value {
        ArgValue::Proposition(p) if Some(p) == anchor_prop => Some(arg.role.clone()),
        ArgValue::Mention(m) => st
            .mentions
            .get(m)
            .filter(|m| parse.head_preterminal(m.node) == anchor)
            .map(|_| arg.role.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicons_ignore_case() {
        assert!(is_crime_word("Murder"));
        assert!(is_job_title("CEO"));
        assert!(!is_job_title("banana"));
    }

    #[test]
    fn unknown_pattern_return_is_rejected() {
        let rules = vec![("Weapon".to_string(), r"\bgun\b".to_string())];
        let err = PatternEventValueRecognizer::new(&rules).unwrap_err();
        assert!(matches!(err, ResolutionError::UnexpectedInput { .. }));
    }

    #[test]
    fn bad_regex_is_rejected() {
        let rules = vec![("Crime".to_string(), r"(unclosed".to_string())];
        assert!(PatternEventValueRecognizer::new(&rules).is_err());
    }

    #[test]
    fn pattern_engine_requires_patterns() {
        let options = ValueOptions {
            event_value_engine: EventValueEngine::Pattern,
            ..ValueOptions::default()
        };
        let err = recognizer_for(&options).err().expect("missing patterns");
        assert!(matches!(err, ResolutionError::MissingParameter { .. }));
        assert!(recognizer_for(&ValueOptions::default()).expect("none engine").is_none());
    }
}
