//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use stasis_session::{BackendError, KvStore};

/// State shared between a [`RecordingStore`] and the test inspecting it.
#[derive(Default)]
pub struct StoreState {
    /// Stored values with their last TTL in seconds.
    pub records: HashMap<String, (Vec<u8>, u64)>,
    /// Every command issued, formatted like the wire command.
    pub commands: Vec<String>,
    /// Keys whose commands fail.
    pub failing: HashSet<String>,
    /// When set, every command fails.
    pub down: bool,
}

/// In-memory store that records the commands it receives.
///
/// Clones share state, so a test can keep one clone after handing the
/// other to the storage under test.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command on `key` fail.
    pub fn fail_key(&self, key: &str) {
        self.state.lock().failing.insert(key.to_string());
    }

    /// Make every command fail.
    pub fn set_down(&self, down: bool) {
        self.state.lock().down = down;
    }

    /// Put a raw payload into the store, bypassing the storage.
    pub fn insert_raw(&self, key: &str, value: &[u8], ttl_secs: u64) {
        self.state
            .lock()
            .records
            .insert(key.to_string(), (value.to_vec(), ttl_secs));
    }

    /// TTL last set for `key`.
    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.state.lock().records.get(key).map(|(_, ttl)| *ttl)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().records.contains_key(key)
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().commands.clone()
    }

    /// Commands starting with `verb`.
    pub fn commands_of(&self, verb: &str) -> Vec<String> {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| c.starts_with(verb))
            .cloned()
            .collect()
    }

    fn check(state: &StoreState, key: &str) -> Result<(), BackendError> {
        if state.down || state.failing.contains(key) {
            return Err(BackendError::Unavailable(format!("injected failure on {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut state = self.state.lock();
        state.commands.push(format!("GET {key}"));
        Self::check(&state, key)?;
        Ok(state.records.get(key).map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, secs: u64) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.commands.push(format!("SETEX {key} {secs}"));
        Self::check(&state, key)?;
        state.records.insert(key.to_string(), (value, secs));
        Ok(())
    }

    async fn expire(&self, key: &str, secs: u64) -> Result<bool, BackendError> {
        let mut state = self.state.lock();
        state.commands.push(format!("EXPIRE {key} {secs}"));
        Self::check(&state, key)?;
        match state.records.get_mut(key) {
            Some(record) => {
                record.1 = secs;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn del(&self, key: &str) -> Result<u64, BackendError> {
        let mut state = self.state.lock();
        state.commands.push(format!("DEL {key}"));
        Self::check(&state, key)?;
        Ok(u64::from(state.records.remove(key).is_some()))
    }
}
