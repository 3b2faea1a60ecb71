use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

/// Revocations shared by the auth middleware and the refresh endpoint
static REVOKED: Lazy<TokenBlacklist> = Lazy::new(TokenBlacklist::new);

const DEFAULT_CAPACITY: usize = 10_000;

/// Session revocations share the map with token ids under this prefix
const SESSION_PREFIX: &str = "session:";

#[derive(Debug, Clone, Copy)]
struct Revocation {
    /// `exp` claim of the revoked token, in unix seconds
    expires_at: i64,
    /// Insertion order, used to pick the oldest entries when full
    sequence: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Revocation>,
    next_sequence: u64,
}

impl Inner {
    fn purge_expired(&mut self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, r| r.expires_at > now);
        before - self.entries.len()
    }

    fn drop_oldest(&mut self, count: usize) {
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(jti, r)| (r.sequence, jti.clone()))
            .collect();
        by_age.sort_unstable();

        for (_, jti) in by_age.into_iter().take(count) {
            self.entries.remove(&jti);
        }
    }
}

/// Revoked token ids (`jti`) and login sessions (`sid`), each kept until the
/// tokens they cover would have expired.
///
/// When the list is full, expired entries are purged and, if that is not
/// enough, the older half of the revocations is dropped.
pub struct TokenBlacklist {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Revoke `jti` until `expires_at` (unix seconds)
    pub fn revoke_token(&self, jti: &str, expires_at: i64) {
        let mut inner = self.lock();

        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(jti) {
            let purged = inner.purge_expired(Utc::now().timestamp());
            if inner.entries.len() >= self.capacity {
                warn!(
                    "Token blacklist full after purging {} expired entries; dropping oldest revocations",
                    purged
                );
                inner.drop_oldest((self.capacity / 2).max(1));
            }
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.entries.insert(jti.to_string(), Revocation { expires_at, sequence });
        info!("Token {} revoked", jti);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.lock().entries.contains_key(jti)
    }

    /// Revoke every token issued for the login session `sid`
    pub fn revoke_session(&self, sid: &str, expires_at: i64) {
        self.revoke_token(&format!("{}{}", SESSION_PREFIX, sid), expires_at);
    }

    pub fn is_session_revoked(&self, sid: &str) -> bool {
        self.is_revoked(&format!("{}{}", SESSION_PREFIX, sid))
    }

    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }

    /// Remove revocations for tokens that have expired anyway
    pub fn cleanup_expired_tokens(&self) -> usize {
        let removed = self.lock().purge_expired(Utc::now().timestamp());
        if removed > 0 {
            debug!("Removed {} expired revocations", removed);
        }
        removed
    }
}

pub fn blacklist() -> &'static TokenBlacklist {
    &REVOKED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_secs(offset: i64) -> i64 {
        Utc::now().timestamp() + offset
    }

    #[test]
    fn test_revoke_and_check() {
        let list = TokenBlacklist::new();
        list.revoke_token("jti-1", in_secs(60));

        assert!(list.is_revoked("jti-1"));
        assert!(!list.is_revoked("jti-2"));
    }

    #[test]
    fn test_cleanup_keeps_live_revocations() {
        let list = TokenBlacklist::new();
        list.revoke_token("expired", in_secs(-1));
        list.revoke_token("live", in_secs(60));

        assert_eq!(list.cleanup_expired_tokens(), 1);
        assert!(!list.is_revoked("expired"));
        assert!(list.is_revoked("live"));
    }

    #[test]
    fn test_full_list_prefers_expired_entries() {
        let list = TokenBlacklist::with_capacity(2);
        list.revoke_token("old-expired", in_secs(-5));
        list.revoke_token("live", in_secs(300));
        list.revoke_token("new", in_secs(300));

        assert_eq!(list.size(), 2);
        assert!(list.is_revoked("live"));
        assert!(list.is_revoked("new"));
    }

    #[test]
    fn test_full_list_drops_oldest_half() {
        let list = TokenBlacklist::with_capacity(4);
        for i in 0..4 {
            list.revoke_token(&format!("jti-{}", i), in_secs(300));
        }

        list.revoke_token("jti-new", in_secs(300));

        assert_eq!(list.size(), 3);
        assert!(!list.is_revoked("jti-0"));
        assert!(!list.is_revoked("jti-1"));
        assert!(list.is_revoked("jti-2"));
        assert!(list.is_revoked("jti-new"));
    }

    #[test]
    fn test_session_and_token_ids_are_separate() {
        let list = TokenBlacklist::new();
        list.revoke_session("abc", in_secs(60));

        assert!(list.is_session_revoked("abc"));
        assert!(!list.is_revoked("abc"));
        assert!(!list.is_session_revoked("other"));
    }

    #[test]
    fn test_revoking_twice_does_not_evict() {
        let list = TokenBlacklist::with_capacity(1);
        list.revoke_token("same", in_secs(60));
        list.revoke_token("same", in_secs(60));
        assert_eq!(list.size(), 1);
    }
}
