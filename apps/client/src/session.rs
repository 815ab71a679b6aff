use std::sync::RwLock;

/// Session context injected into whichever layer issues remote calls.
/// Replaces ambient token lookups with an explicit, swappable store so the
/// client can be exercised without a live auth flow.
///
/// Carried as `Arc<dyn SessionStore>`.
pub trait SessionStore: Send + Sync {
    /// Current bearer token, if a user is signed in.
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: String);
    /// Drops the stored session. Called on sign-out and on a 401 from the
    /// backend.
    fn clear(&self);
}

/// In-process session store. The embedding shell persists the token however
/// it likes and seeds this at startup.
#[derive(Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    fn set_token(&self, token: String) {
        *self.token.write().expect("session lock poisoned") = Some(token);
    }

    fn clear(&self) {
        *self.token.write().expect("session lock poisoned") = None;
    }
}
