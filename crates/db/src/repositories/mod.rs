//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Bulk inserts bind one array per
//! column and expand them with `UNNEST`, so a batch is a single statement.

pub mod category_repo;
pub mod conversation_repo;
pub mod message_repo;
pub mod post_repo;
pub mod sequence_repo;
pub mod thread_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use conversation_repo::ConversationRepo;
pub use message_repo::MessageRepo;
pub use post_repo::PostRepo;
pub use sequence_repo::{SequenceRepo, SerialTable};
pub use thread_repo::ThreadRepo;
pub use user_repo::ForumUserRepo;
