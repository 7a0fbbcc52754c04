//! Symmetric matching of private messages onto two-person conversations.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::DbId;

/// An unordered pair of two distinct users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantPair {
    low: DbId,
    high: DbId,
}

impl ParticipantPair {
    /// Build a pair; `None` for a self-conversation.
    pub fn new(a: DbId, b: DbId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn members(&self) -> [DbId; 2] {
        [self.low, self.high]
    }
}

/// Lookup from participant pair to an existing conversation id.
///
/// Only conversations whose participant set has exactly two members are
/// indexed; group conversations never match a private message.
#[derive(Debug, Default, Clone)]
pub struct ConversationIndex {
    by_pair: HashMap<ParticipantPair, DbId>,
}

impl ConversationIndex {
    /// Build the index from `(conversation_id, user_id)` membership rows.
    ///
    /// When several two-person conversations share a pair, the lowest id wins.
    pub fn from_memberships(rows: impl IntoIterator<Item = (DbId, DbId)>) -> Self {
        let mut members: BTreeMap<DbId, BTreeSet<DbId>> = BTreeMap::new();
        for (conversation_id, user_id) in rows {
            members.entry(conversation_id).or_default().insert(user_id);
        }

        let mut index = Self::default();
        for (conversation_id, users) in members {
            if users.len() != 2 {
                continue;
            }
            let mut it = users.into_iter();
            if let (Some(a), Some(b)) = (it.next(), it.next()) {
                if let Some(pair) = ParticipantPair::new(a, b) {
                    index.by_pair.entry(pair).or_insert(conversation_id);
                }
            }
        }
        index
    }

    pub fn find(&self, pair: &ParticipantPair) -> Option<DbId> {
        self.by_pair.get(pair).copied()
    }

    pub fn insert(&mut self, pair: ParticipantPair, conversation_id: DbId) {
        self.by_pair.insert(pair, conversation_id);
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}
