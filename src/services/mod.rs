pub mod allocation;

pub use allocation::{AllocationError, NodeAllocator, SuffixKind};
