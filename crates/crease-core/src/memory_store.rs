use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::setup::{MatchSetup, SetupId};
use crate::store::{MatchId, MatchKey, MatchRecord, MatchStore, StoreError};

/// A call observed by [`MemoryMatchStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchSetup(String),
    Create,
    Update(MatchKey),
    DeleteMatch(SetupId),
    DeleteSetup(SetupId),
}

#[derive(Debug, Default)]
struct Inner {
    setups: Vec<MatchSetup>,
    matches: HashMap<MatchId, MatchRecord>,
    calls: Vec<StoreCall>,
    failures_left: u32,
}

/// In-process store used when no remote store is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryMatchStore {
    inner: Mutex<Inner>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a setup, as the team-selection flow would have.
    pub fn with_setup(self, setup: MatchSetup) -> Self {
        self.lock().setups.push(setup);
        self
    }

    /// Make the next `n` calls fail with a transport error.
    pub fn fail_next(&self, n: u32) {
        self.lock().failures_left = n;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn create_count(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::Create))
    }

    pub fn update_count(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::Update(_)))
    }

    pub fn delete_count(&self) -> usize {
        self.count(|c| matches!(c, StoreCall::DeleteSetup(_)))
    }

    /// Stored record for the given key, if any.
    pub fn get(&self, key: &MatchKey) -> Option<MatchRecord> {
        let inner = self.lock();
        match key {
            MatchKey::Match(id) => inner.matches.get(id).cloned(),
            MatchKey::Setup(setup_id) => inner
                .matches
                .values()
                .find(|r| &r.game_id == setup_id)
                .cloned(),
        }
    }

    fn count(&self, pred: impl Fn(&StoreCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log the call and consume one injected failure, if any are queued.
    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if inner.failures_left > 0 {
            inner.failures_left -= 1;
            return Err(StoreError::Transport("injected failure".to_string()));
        }
        Ok(inner)
    }
}

impl MatchStore for MemoryMatchStore {
    async fn fetch_setup(&self, user_id: &str) -> Result<Option<MatchSetup>, StoreError> {
        let inner = self.begin(StoreCall::FetchSetup(user_id.to_string()))?;
        Ok(inner
            .setups
            .iter()
            .rev()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn create_match(&self, record: &MatchRecord) -> Result<MatchId, StoreError> {
        let mut inner = self.begin(StoreCall::Create)?;
        let id = MatchId(Uuid::new_v4().to_string());
        inner.matches.insert(id.clone(), record.clone());
        Ok(id)
    }

    async fn update_match(&self, key: &MatchKey, record: &MatchRecord) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::Update(key.clone()))?;
        // Updates that match no row succeed without effect, like the remote table.
        let target = match key {
            MatchKey::Match(id) => inner.matches.get_mut(id),
            MatchKey::Setup(setup_id) => inner
                .matches
                .values_mut()
                .find(|r| &r.game_id == setup_id),
        };
        if let Some(existing) = target {
            *existing = record.clone();
        }
        Ok(())
    }

    async fn delete_match(&self, user_id: &str, setup_id: &SetupId) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::DeleteMatch(setup_id.clone()))?;
        inner
            .matches
            .retain(|_, r| !(r.user_id == user_id && &r.game_id == setup_id));
        Ok(())
    }

    async fn delete_match_setup(&self, setup_id: &SetupId) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::DeleteSetup(setup_id.clone()))?;
        inner.setups.retain(|s| &s.id != setup_id);
        Ok(())
    }
}
