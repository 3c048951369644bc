//! Create-once, update-after mirroring of match progress to the store.

use crate::progress::{MatchProgress, Tally};
use crate::setup::{MatchSetup, SetupId};
use crate::store::{MatchId, MatchKey, MatchRecord, MatchStore, StoreError};

/// Where this session's match record stands in the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionRecord {
    /// Nothing written yet.
    #[default]
    Unpersisted,
    /// A create was sent but its id never came back. Never retried.
    CreateUnconfirmed,
    Persisted(MatchId),
    /// The match record and setup were deleted after the result. Nothing
    /// more is sent.
    Archived,
}

/// The single remote call a progress snapshot calls for.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Create(MatchRecord),
    Update(MatchKey, MatchRecord),
    /// Delete the setup and, if one was ever created, the match record.
    Archive {
        user_id: String,
        setup_id: SetupId,
        drop_record: bool,
    },
}

/// What `sync` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Idle,
    Created(MatchId),
    Updated,
    Archived,
}

/// Decides which remote call, if any, each progress snapshot needs.
///
/// Planning advances local state before the call is made, so a failed write
/// is never retried and never rolls anything back.
#[derive(Debug)]
pub struct PersistenceSynchronizer {
    setup: MatchSetup,
    record: SessionRecord,
    started: bool,
    last_seen: Tally,
}

impl PersistenceSynchronizer {
    /// `initial` is the progress the session starts from; it is not a change.
    pub fn new(setup: MatchSetup, initial: &MatchProgress) -> Self {
        Self {
            setup,
            record: SessionRecord::Unpersisted,
            started: false,
            last_seen: initial.tally(),
        }
    }

    /// The first swing was accepted; writes are allowed from now on.
    pub fn mark_started(&mut self) {
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Work out the call for `progress` and advance local state as if it were made.
    pub fn plan(&mut self, progress: &MatchProgress) -> Option<SyncAction> {
        if self.record == SessionRecord::Archived {
            return None;
        }
        if progress.status.is_terminal() {
            let previous = std::mem::replace(&mut self.record, SessionRecord::Archived);
            return Some(SyncAction::Archive {
                user_id: self.setup.user_id.clone(),
                setup_id: self.setup.id.clone(),
                drop_record: previous != SessionRecord::Unpersisted,
            });
        }
        if !self.started {
            return None;
        }
        let tally = progress.tally();
        if tally == self.last_seen {
            return None;
        }
        self.last_seen = tally;

        let record = MatchRecord::new(&self.setup, progress);
        match &self.record {
            SessionRecord::Unpersisted => {
                self.record = SessionRecord::CreateUnconfirmed;
                Some(SyncAction::Create(record))
            },
            SessionRecord::CreateUnconfirmed => Some(SyncAction::Update(
                MatchKey::Setup(self.setup.id.clone()),
                record,
            )),
            SessionRecord::Persisted(id) => {
                Some(SyncAction::Update(MatchKey::Match(id.clone()), record))
            },
            SessionRecord::Archived => None,
        }
    }

    /// Record the result of the create issued by `plan`.
    pub fn confirm_create(&mut self, result: &Result<MatchId, StoreError>) {
        if let Ok(id) = result
            && self.record == SessionRecord::CreateUnconfirmed
        {
            self.record = SessionRecord::Persisted(id.clone());
        }
    }

    /// Plan and perform the call for `progress`.
    pub async fn sync<S: MatchStore>(
        &mut self,
        store: &S,
        progress: &MatchProgress,
    ) -> Result<SyncOutcome, StoreError> {
        let Some(action) = self.plan(progress) else {
            return Ok(SyncOutcome::Idle);
        };

        let result = match action {
            SyncAction::Create(record) => {
                let created = store.create_match(&record).await;
                self.confirm_create(&created);
                created.map(SyncOutcome::Created)
            },
            SyncAction::Update(key, record) => store
                .update_match(&key, &record)
                .await
                .map(|()| SyncOutcome::Updated),
            SyncAction::Archive {
                user_id,
                setup_id,
                drop_record,
            } => {
                // The setup is deleted even if the record delete failed.
                let dropped = if drop_record {
                    store.delete_match(&user_id, &setup_id).await
                } else {
                    Ok(())
                };
                let deleted = store.delete_match_setup(&setup_id).await;
                dropped.and(deleted).map(|()| SyncOutcome::Archived)
            },
        };

        match &result {
            Ok(outcome) => tracing::debug!(?outcome, record = ?self.record, "Match record synced"),
            Err(e) => tracing::warn!(error = %e, record = ?self.record, "Match record sync failed"),
        }
        result
    }
}
