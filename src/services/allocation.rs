use thiserror::Error;
use tracing::{info, warn};

use crate::access::ScopeError;
use crate::database::{DatabaseError, NewNode, NodeRecord, NodeStore};
use crate::location::{CodeGenerator, Level, LocationCode};

/// How many times an insert that lost a uniqueness race is re-attempted.
const CONFLICT_RETRIES: usize = 1;

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Which suffix scheme a new child uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    /// Three letters drawn from the node's name.
    Lettered,
    /// Next zero-padded number under the parent.
    Numbered,
}

impl SuffixKind {
    /// Serial children are always numbered; everything else is lettered
    /// unless the caller asks otherwise.
    pub fn for_child_of(parent: &LocationCode, requested_numbered: bool) -> Self {
        if requested_numbered || parent.level().child() == Some(Level::Serial) {
            SuffixKind::Numbered
        } else {
            SuffixKind::Lettered
        }
    }
}

/// Allocates and persists child nodes, relying on the store's uniqueness
/// constraint rather than in-process locking.
pub struct NodeAllocator<'a, S: NodeStore + ?Sized> {
    store: &'a S,
    generator: CodeGenerator,
}

impl<'a, S: NodeStore + ?Sized> NodeAllocator<'a, S> {
    pub fn new(store: &'a S, generator: CodeGenerator) -> Self {
        Self { store, generator }
    }

    pub async fn allocate(
        &self,
        parent: &LocationCode,
        name: &str,
        kind: SuffixKind,
    ) -> Result<NodeRecord, AllocationError> {
        if parent.level() == Level::Serial {
            return Err(ScopeError::invalid_code(parent.as_str(), "serial codes have no children").into());
        }
        if self.store.find(parent).await?.is_none() {
            return Err(DatabaseError::NotFound(format!("node {}", parent)).into());
        }

        let mut attempt = 0;
        loop {
            let siblings = self.store.child_codes(parent).await?;
            let code = self.next_code(parent, name, kind, &siblings)?;
            let node = NewNode {
                code: code.clone(),
                name: name.trim().to_string(),
            };

            match self.store.insert(&node).await {
                Ok(record) => {
                    info!("Allocated {} under {}", record.code, parent);
                    return Ok(record);
                }
                Err(DatabaseError::UniqueViolation(taken)) if attempt < CONFLICT_RETRIES => {
                    warn!("Allocation of {} lost a race, retrying", taken);
                    attempt += 1;
                }
                Err(DatabaseError::UniqueViolation(taken)) => {
                    warn!("Allocation of {} lost a race twice, giving up", taken);
                    return Err(ScopeError::ConcurrentAllocationConflict(taken).into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_code(
        &self,
        parent: &LocationCode,
        name: &str,
        kind: SuffixKind,
        siblings: &[String],
    ) -> Result<LocationCode, ScopeError> {
        match kind {
            SuffixKind::Numbered => self.generator.next_serial(parent, siblings.iter().map(String::as_str)),
            SuffixKind::Lettered => {
                let mut rng = rand::thread_rng();
                self.generator.child_code(
                    parent,
                    name,
                    |candidate| siblings.iter().any(|s| s.eq_ignore_ascii_case(candidate)),
                    &mut rng,
                )
            }
        }
    }
}
