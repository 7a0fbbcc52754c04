//! Private messages onto two-person conversations.
//!
//! Import runs in three steps: a pure pass that validates participants and
//! cleans content, a store pass that reuses or creates one conversation per
//! participant pair, and a pure pass that drops messages whose fingerprint is
//! already stored.

use std::collections::HashSet;
use std::path::Path;

use coolforum_core::config::MigrationConfig;
use coolforum_core::conversation::{ConversationIndex, ParticipantPair};
use coolforum_core::legacy::LegacyPrivateMessage;
use coolforum_core::text::clean_content;
use coolforum_core::types::{DbId, Timestamp};
use coolforum_db::models::conversation::{MessageFingerprint, NewMessage};
use coolforum_db::repositories::{ConversationRepo, ForumUserRepo, MessageRepo};
use sqlx::PgPool;

use crate::error::MigrateResult;
use crate::report::ImportCounts;
use crate::source::load_repaired;

/// A validated message waiting for its conversation id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    pub pair: ParticipantPair,
    pub author_id: DbId,
    pub created: Timestamp,
    pub content_plain: String,
}

#[derive(Debug, Default)]
pub struct MessagePlan {
    pub pending: Vec<PendingMessage>,
    /// Self-addressed or participant-less records.
    pub dropped: u64,
}

/// Validate participants and clean content, in file order.
pub fn plan_messages(
    records: Vec<LegacyPrivateMessage>,
    users: &HashSet<DbId>,
    config: &MigrationConfig,
) -> MigrateResult<MessagePlan> {
    let mut plan = MessagePlan::default();
    for record in records {
        let missing = [record.recipient_id, record.sender_id]
            .into_iter()
            .find(|id| !users.contains(id));
        if let Some(id) = missing {
            config.policies.message_participant.on_missing("user", id)?;
            plan.dropped += 1;
            continue;
        }
        let Some(pair) = ParticipantPair::new(record.sender_id, record.recipient_id) else {
            plan.dropped += 1;
            continue;
        };
        plan.pending.push(PendingMessage {
            pair,
            author_id: record.sender_id,
            created: record.sent,
            content_plain: clean_content(&record.body, config.size_shift),
        });
    }
    Ok(plan)
}

/// Participant pairs with no indexed conversation, in first-seen order.
pub fn missing_pairs(pending: &[PendingMessage], index: &ConversationIndex) -> Vec<ParticipantPair> {
    let mut seen = HashSet::new();
    pending
        .iter()
        .map(|m| m.pair)
        .filter(|pair| index.find(pair).is_none() && seen.insert(*pair))
        .collect()
}

/// Attach conversation ids and drop messages already stored.
///
/// Returns the rows to insert and the number skipped as duplicates.
pub fn assign_messages(
    pending: Vec<PendingMessage>,
    index: &ConversationIndex,
    stored: &HashSet<MessageFingerprint>,
) -> (Vec<NewMessage>, u64) {
    let mut seen = stored.clone();
    let mut rows = Vec::with_capacity(pending.len());
    let mut skipped = 0;
    for message in pending {
        let Some(conversation_id) = index.find(&message.pair) else {
            continue;
        };
        let row = NewMessage {
            conversation_id,
            author_id: message.author_id,
            created: message.created,
            content_plain: message.content_plain,
        };
        if seen.insert(MessageFingerprint::from(&row)) {
            rows.push(row);
        } else {
            skipped += 1;
        }
    }
    (rows, skipped)
}

/// Import the private message export at `path`.
///
/// Returns the counts and the number of conversations created.
pub async fn import_private_messages(
    pool: &PgPool,
    path: &Path,
    config: &MigrationConfig,
) -> MigrateResult<(ImportCounts, u64)> {
    let records: Vec<LegacyPrivateMessage> = load_repaired(path).await?;
    let users: HashSet<DbId> = ForumUserRepo::list_ids(pool).await?.into_iter().collect();

    let total = records.len();
    let plan = plan_messages(records, &users, config)?;

    let memberships = ConversationRepo::list_memberships(pool).await?;
    let mut index = ConversationIndex::from_memberships(memberships);
    let to_create = missing_pairs(&plan.pending, &index);
    for pair in &to_create {
        let id = ConversationRepo::create_with_participants(pool, &pair.members()).await?;
        index.insert(*pair, id);
    }
    tracing::debug!(
        created = to_create.len(),
        indexed = index.len(),
        "Conversations resolved"
    );

    let stored: HashSet<MessageFingerprint> =
        MessageRepo::list_fingerprints(pool).await?.into_iter().collect();
    let (rows, skipped) = assign_messages(plan.pending, &index, &stored);
    let created = MessageRepo::bulk_create(pool, &rows).await?;

    let counts = ImportCounts {
        created,
        skipped,
        dropped: plan.dropped,
    };
    tracing::info!(
        total,
        created,
        skipped,
        dropped = plan.dropped,
        conversations_created = to_create.len(),
        "Private messages imported"
    );
    Ok((counts, to_create.len() as u64))
}
