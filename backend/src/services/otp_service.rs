//! One-time passcode lifecycle for password recovery.
//!
//! Codes are six-digit numbers held in a keyed ephemeral store under
//! `otp:{user_id}`, at most one live code per user. A new request replaces
//! whatever code was pending; a successful verification consumes the record
//! so the same code can never be accepted twice. Expiry is checked here at
//! verify time against the record's own creation timestamp, so behavior is
//! the same whether or not the backing store enforces its TTL.

use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::ephemeral_store::EphemeralStore;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Codes outlive their creation by five minutes, then only lazy deletion
/// applies. The backing store gets the same window as its TTL hint.
const OTP_TTL_SECS: i64 = 300;

/// Six-digit range. Leading-zero codes are excluded, so no zero-padding
/// normalization is ever needed on comparison.
const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtpRecord {
    user_id: String,
    code: u32,
    created_at: DateTime<Utc>,
}

/// Issues and verifies one-time passcodes.
///
/// `request` and `verify` for the same user serialize through a per-user
/// lock, so a verification can never interleave with a replacement for the
/// same user. Different users never contend beyond the momentary lock-map
/// lookup.
#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn EphemeralStore>,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl OtpService {
    /// Creates a new OtpService over the given backing store.
    pub fn new(store: Arc<dyn EphemeralStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Generates a fresh passcode for `user_id`, replacing any pending one.
    ///
    /// # Returns
    /// The generated code, for delivery by the caller's notifier. It is
    /// never logged or stored anywhere else.
    pub async fn request(&self, user_id: &str) -> ServiceResult<u32> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let code = OsRng.gen_range(OTP_MIN..=OTP_MAX);
        let record = OtpRecord {
            user_id: user_id.to_string(),
            code,
            created_at: Utc::now(),
        };
        let payload = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Database { source: e.into() })?;

        self.store
            .put(
                &Self::storage_key(user_id),
                payload,
                std::time::Duration::from_secs(OTP_TTL_SECS as u64),
            )
            .await?;

        tracing::info!("Generated password reset code for user {}", user_id);
        Ok(code)
    }

    /// Verifies `supplied_code` against the pending record for `user_id`.
    ///
    /// # Errors
    /// - `NotFound` when no record exists (never generated, already
    ///   consumed, or evicted by the backend)
    /// - `Expired` when the record is older than five minutes; the record
    ///   is deleted as a side effect
    /// - `Mismatch` when the code differs; the record is kept so a correct
    ///   retry within the window still succeeds
    ///
    /// On success the record is deleted before returning, which is what
    /// guarantees a code can only ever be accepted once.
    pub async fn verify(&self, user_id: &str, supplied_code: u32) -> ServiceResult<()> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let key = Self::storage_key(user_id);
        let payload = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| ServiceError::not_found("OTP", user_id))?;

        let record: OtpRecord = serde_json::from_str(&payload)
            .map_err(|e| ServiceError::Database { source: e.into() })?;

        if Utc::now() - record.created_at > Duration::seconds(OTP_TTL_SECS) {
            self.store.delete(&key).await?;
            return Err(ServiceError::expired("OTP"));
        }

        if supplied_code != record.code {
            return Err(ServiceError::mismatch("OTP"));
        }

        self.store.delete(&key).await?;
        tracing::info!("Password reset code verified for user {}", user_id);
        Ok(())
    }

    pub(crate) fn storage_key(user_id: &str) -> String {
        format!("otp:{}", user_id)
    }

    /// Returns the lock guarding this user's record, creating it on first use.
    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::ephemeral_store::InMemoryEphemeralStore;

    fn service() -> (Arc<InMemoryEphemeralStore>, OtpService) {
        let store = Arc::new(InMemoryEphemeralStore::new());
        (store.clone(), OtpService::new(store))
    }

    #[tokio::test]
    async fn test_request_then_verify_succeeds() {
        let (_, otp) = service();

        let code = otp.request("user-1").await.unwrap();
        assert!((OTP_MIN..=OTP_MAX).contains(&code));

        otp.verify("user-1", code).await.unwrap();
    }

    #[tokio::test]
    async fn test_verified_code_cannot_be_reused() {
        let (_, otp) = service();

        let code = otp.request("user-1").await.unwrap();
        otp.verify("user-1", code).await.unwrap();

        let second = otp.verify("user-1", code).await;
        assert!(matches!(second, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_record() {
        let (_, otp) = service();

        let code = otp.request("user-1").await.unwrap();
        let wrong = if code == OTP_MAX { OTP_MIN } else { code + 1 };

        let result = otp.verify("user-1", wrong).await;
        assert!(matches!(result, Err(ServiceError::Mismatch { .. })));

        // The pending record survives a mismatch.
        otp.verify("user-1", code).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_record_expires_and_is_deleted() {
        let (store, otp) = service();

        let record = OtpRecord {
            user_id: "user-1".to_string(),
            code: 123_456,
            created_at: Utc::now() - Duration::minutes(6),
        };
        store
            .put(
                &OtpService::storage_key("user-1"),
                serde_json::to_string(&record).unwrap(),
                std::time::Duration::from_secs(60),
            )
            .await
            .unwrap();

        let result = otp.verify("user-1", 123_456).await;
        assert!(matches!(result, Err(ServiceError::Expired { .. })));

        // Lazy eviction already removed the record.
        let again = otp.verify("user-1", 123_456).await;
        assert!(matches!(again, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_new_request_invalidates_previous_code() {
        let (_, otp) = service();

        let first = otp.request("user-1").await.unwrap();
        let mut second = otp.request("user-1").await.unwrap();
        let mut rerolls = 0;
        while second == first {
            second = otp.request("user-1").await.unwrap();
            rerolls += 1;
            assert!(rerolls < 100, "random codes kept colliding");
        }

        let stale = otp.verify("user-1", first).await;
        assert!(matches!(stale, Err(ServiceError::Mismatch { .. })));

        otp.verify("user-1", second).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_without_request_is_not_found() {
        let (_, otp) = service();

        let result = otp.verify("user-1", 123_456).await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_users_do_not_share_records() {
        let (_, otp) = service();

        let code_a = otp.request("user-a").await.unwrap();

        let result = otp.verify("user-b", code_a).await;
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));

        otp.verify("user-a", code_a).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_verifies_accept_exactly_one() {
        let (_, otp) = service();

        let code = otp.request("user-1").await.unwrap();
        let (a, b) = tokio::join!(otp.verify("user-1", code), otp.verify("user-1", code));

        let results = vec![a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(ServiceError::NotFound { .. })))
        );
    }
}
