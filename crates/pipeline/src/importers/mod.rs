//! One importer per legacy entity.
//!
//! Every importer follows the same shape: load the keys already present in
//! the store once, walk the decoded records in file order through a pure
//! `prepare_*` function, then write the surviving rows in a single bulk
//! insert. Records whose key is already present are skipped, which makes a
//! second run over the same files a no-op.

pub mod category;
pub mod message;
pub mod post;
pub mod thread;
pub mod user;

pub use category::import_categories;
pub use message::import_private_messages;
pub use post::import_posts;
pub use thread::import_threads;
pub use user::import_users;
