//! In-memory collaborators that record every call the notifier makes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use prana_core::device::DeviceTokenMap;
use prana_core::dispatch::{MulticastMessage, MulticastResponse, SendOutcome};
use prana_events::delivery::DispatchError;
use prana_events::{PushDispatcher, StoreError, UserStore};

// ---------------------------------------------------------------------------
// FakeStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeStore {
    pub users: Mutex<HashMap<String, DeviceTokenMap>>,
    pub reads: AtomicUsize,
    pub removals: Mutex<Vec<(String, Vec<String>)>>,
    pub fail_reads: bool,
    pub fail_removals: bool,
}

impl FakeStore {
    pub fn with_user(uid: &str, tokens: &[(&str, bool)]) -> Self {
        let store = Self::default();
        store
            .users
            .lock()
            .unwrap()
            .insert(uid.to_string(), tokens.iter().copied().collect());
        store
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn removals(&self) -> Vec<(String, Vec<String>)> {
        self.removals.lock().unwrap().clone()
    }

    pub fn tokens_of(&self, uid: &str) -> Option<DeviceTokenMap> {
        self.users.lock().unwrap().get(uid).cloned()
    }
}

#[async_trait]
impl UserStore for FakeStore {
    async fn device_tokens(&self, uid: &str) -> Result<Option<DeviceTokenMap>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.users.lock().unwrap().get(uid).cloned())
    }

    async fn remove_device_tokens(&self, uid: &str, tokens: &[String]) -> Result<(), StoreError> {
        self.removals
            .lock()
            .unwrap()
            .push((uid.to_string(), tokens.to_vec()));
        if self.fail_removals {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        if let Some(map) = self.users.lock().unwrap().get_mut(uid) {
            map.remove_tokens(tokens);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeDispatcher
// ---------------------------------------------------------------------------

/// Delivers to every token unless a scripted outcome says otherwise.
#[derive(Default)]
pub struct FakeDispatcher {
    pub scripted: Mutex<HashMap<String, SendOutcome>>,
    pub sent: Mutex<Vec<MulticastMessage>>,
    pub fail: bool,
    /// Drop this many outcomes from the end of every response.
    pub truncate_by: usize,
}

impl FakeDispatcher {
    pub fn script(self, token: &str, outcome: SendOutcome) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(token.to_string(), outcome);
        self
    }

    pub fn sent(&self) -> Vec<MulticastMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDispatcher for FakeDispatcher {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<MulticastResponse, DispatchError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(DispatchError::Unauthorized(401));
        }

        let scripted = self.scripted.lock().unwrap();
        let mut responses: Vec<SendOutcome> = message
            .tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                scripted
                    .get(token)
                    .cloned()
                    .unwrap_or_else(|| SendOutcome::Delivered {
                        message_id: format!("projects/test/messages/{i}"),
                    })
            })
            .collect();
        let keep = responses.len().saturating_sub(self.truncate_by);
        responses.truncate(keep);
        Ok(MulticastResponse { responses })
    }
}
