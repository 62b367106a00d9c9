pub mod code;
pub mod codegen;
pub mod hierarchy;

pub use code::{Level, LocationCode};
pub use codegen::{generate_child_code, next_serial_code, CodeGenerator};
pub use hierarchy::{HierarchyTree, NodeId, TreeView};
