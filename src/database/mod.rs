pub mod bulletins;
pub mod manager;
pub mod nodes;
pub mod roles;

pub use bulletins::BulletinRepository;
pub use manager::{DatabaseError, DatabaseManager};
pub use nodes::{NewNode, NodeQuery, NodeRecord, NodeStore, PgNodeStore};
