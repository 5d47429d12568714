use dashmap::DashSet;
use uuid::Uuid;

/// Source of fresh upload tokens
pub trait TokenGenerator: Send + Sync {
    /// Produce a new high-entropy token
    fn generate(&self) -> String;
}

/// Default token strategy: a v4 UUID rendered as 32 lowercase hex characters
#[derive(Debug, Clone, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Tracks tokens already handed out so none is issued twice
pub trait IdentifierRegistry: Send + Sync {
    /// Reserve `token`. Returns false when it was already taken.
    fn try_reserve(&self, token: &str) -> bool;
}

/// Process-local registry backed by a concurrent set. Entries are never pruned.
#[derive(Debug, Default)]
pub struct MemoryIdentifierRegistry {
    used: DashSet<String>,
}

impl MemoryIdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens reserved so far
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

impl IdentifierRegistry for MemoryIdentifierRegistry {
    fn try_reserve(&self, token: &str) -> bool {
        self.used.insert(token.to_string())
    }
}
