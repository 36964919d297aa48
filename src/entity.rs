use std::collections::HashMap;

use crate::{EntityType, MentionUid, ResolutionError, ResolutionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// A cross-sentence cluster of co-referring mentions.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: EntityType,
    /// Member mentions in the order they were attached.
    pub mentions: Vec<MentionUid>,
    pub generic: bool,
}

impl Entity {
    pub fn contains(&self, uid: MentionUid) -> bool {
        self.mentions.contains(&uid)
    }
}

/// All entities of a document. Entities only ever grow.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entities: Vec<Entity>,
    by_mention: HashMap<MentionUid, EntityId>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new entity seeded with one mention.
    pub fn add_new(&mut self, uid: MentionUid, entity_type: EntityType) -> ResolutionResult<EntityId> {
        if let Some(existing) = self.by_mention.get(&uid) {
            return Err(ResolutionError::inconsistency(format!(
                "mention {} already belongs to entity {}",
                uid, existing.0
            )));
        }
        let id = EntityId(self.entities.len());
        self.entities.push(Entity {
            id,
            entity_type,
            mentions: vec![uid],
            generic: false,
        });
        self.by_mention.insert(uid, id);
        Ok(id)
    }

    /// Append a mention to an existing entity. The mention's type must be
    /// compatible with the entity's.
    pub fn add_mention(
        &mut self,
        entity: EntityId,
        uid: MentionUid,
        mention_type: &EntityType,
    ) -> ResolutionResult<()> {
        if let Some(existing) = self.by_mention.get(&uid) {
            return Err(ResolutionError::inconsistency(format!(
                "mention {} already belongs to entity {}",
                uid, existing.0
            )));
        }
        let target = self.entities.get_mut(entity.0).ok_or_else(|| {
            ResolutionError::inconsistency(format!("no entity with id {}", entity.0))
        })?;
        if !target.entity_type.is_compatible(mention_type) {
            return Err(ResolutionError::inconsistency(format!(
                "mention {} of type {} cannot join entity {} of type {}",
                uid, mention_type, entity.0, target.entity_type
            )));
        }
        // an undetermined entity takes the type of its first determined member
        if !target.entity_type.is_determined() && mention_type.is_determined() {
            target.entity_type = mention_type.clone();
        }
        target.mentions.push(uid);
        self.by_mention.insert(uid, entity);
        Ok(())
    }

    pub fn set_generic(&mut self, entity: EntityId, generic: bool) {
        if let Some(e) = self.entities.get_mut(entity.0) {
            e.generic = generic;
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn entity_by_mention(&self, uid: MentionUid) -> Option<&Entity> {
        self.by_mention.get(&uid).and_then(|id| self.get(*id))
    }

    pub fn entities_of_type<'a>(&'a self, entity_type: &'a EntityType) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .iter()
            .filter(move |e| e.entity_type.name() == entity_type.name())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_incompatible_members() {
        let mut set = EntitySet::new();
        let per = EntityType::new("PER");
        let e = set.add_new(MentionUid(0), per.clone()).expect("new entity");
        set.add_mention(e, MentionUid(1), &per).expect("compatible");
        let err = set
            .add_mention(e, MentionUid(2), &EntityType::new("GPE"))
            .unwrap_err();
        assert!(err.is_inconsistency());
        assert_eq!(set.get(e).map(|e| e.mentions.len()), Some(2));
        assert_eq!(set.entity_by_mention(MentionUid(1)).map(|e| e.id), Some(e));
    }

    #[test]
    fn mention_joins_at_most_one_entity() {
        let mut set = EntitySet::new();
        let org = EntityType::new("ORG");
        set.add_new(MentionUid(4), org.clone()).expect("new entity");
        assert!(set.add_new(MentionUid(4), org).is_err());
    }
}
