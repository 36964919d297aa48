use crate::{MentionUid, Symbol, SynNodeId, ValueMentionUid};

/// An event instance within one sentence with its role slots.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMention {
    pub event_type: Symbol,
    pub sentence: usize,
    pub anchor: Option<SynNodeId>,
    pub args: Vec<(Symbol, MentionUid)>,
    pub value_args: Vec<(Symbol, ValueMentionUid)>,
}

impl EventMention {
    pub fn new(event_type: &str, sentence: usize) -> Self {
        EventMention {
            event_type: Symbol::new(event_type),
            sentence,
            anchor: None,
            args: Vec::new(),
            value_args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, role: &str, mention: MentionUid) -> Self {
        self.args.push((Symbol::new(role), mention));
        self
    }

    /// Anchor node, normally the trigger word's preterminal.
    pub fn with_anchor(mut self, anchor: SynNodeId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn add_value_arg(&mut self, role: &str, value: ValueMentionUid) {
        self.value_args.push((Symbol::new(role), value));
    }

    pub fn first_value_for_role(&self, role: &str) -> Option<ValueMentionUid> {
        self.value_args
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, v)| *v)
    }

    /// First mention filling `role`.
    pub fn first_mention_for_role(&self, role: &Symbol) -> Option<MentionUid> {
        self.args
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, m)| *m)
    }

    /// Event types are `Family.Subtype`, e.g. `Personnel.Start-Position`.
    pub fn is_family(&self, family: &str) -> bool {
        self.event_type
            .as_str()
            .split('.')
            .next()
            .map_or(false, |f| f == family)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMentionSet {
    events: Vec<EventMention>,
}

impl EventMentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EventMention) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EventMention> {
        self.events.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut EventMention> {
        self.events.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventMention> {
        self.events.iter()
    }
}
