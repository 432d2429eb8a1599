//! Punch-in / punch-out state machine of the current user.

use crate::core::guard::InFlight;
use crate::errors::{AppError, AppResult};
use crate::ledger::Ledger;
use crate::models::{Session, SessionId};
use crate::state::{KEY_ACTIVE_SESSION, KEY_DISPLAY_NAME, LocalState, StateStore};
use chrono::Local;
use std::cell::Cell;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Active(Session),
}

/// What startup reconciliation did with the remembered session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The ledger still has the remembered session open.
    Confirmed(SessionId),
    /// The remembered id is closed or unknown on the ledger and was dropped.
    Cleared(SessionId),
    /// The ledger had an open session for the user that was not remembered.
    Adopted(SessionId),
    /// Nothing remembered, nothing open.
    Idle,
}

pub struct SessionTracker<S: StateStore> {
    store: S,
    identity: LocalState,
    state: TrackerState,
    busy: Cell<bool>,
}

impl<S: StateStore> SessionTracker<S> {
    /// Tracker built from local state only, without asking the ledger.
    pub fn from_store(store: S) -> Self {
        let identity = LocalState::load(&store);
        let state = match &identity.active_session {
            Some(id) => TrackerState::Active(Session {
                id: id.clone(),
                started_at: None,
            }),
            None => TrackerState::Idle,
        };

        Self {
            store,
            identity,
            state,
            busy: Cell::new(false),
        }
    }

    /// Startup path: load local state, then reconcile it with the ledger.
    ///
    /// When the ledger cannot be reached the local state is kept as-is and
    /// re-checked on the next restore.
    pub fn restore<L: Ledger>(ledger: &L, store: S) -> Self {
        let mut tracker = Self::from_store(store);
        if let Err(e) = tracker.reconcile(ledger) {
            warn!(error = %e, "session reconciliation failed, keeping local state");
        }
        tracker
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TrackerState::Active(_))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            TrackerState::Active(s) => Some(s),
            TrackerState::Idle => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.identity.display_name.as_deref()
    }

    /// Align local state with the ledger.
    pub fn reconcile<L: Ledger>(&mut self, ledger: &L) -> AppResult<Reconciliation> {
        let mut cleared = None;

        if let Some(id) = self.identity.active_session.clone() {
            let info = ledger.session(&id)?;
            let same_user = |owner: &str| match self.identity.display_name.as_deref() {
                Some(name) => name == owner,
                None => true,
            };

            match info {
                Some(info) if info.is_open() && same_user(&info.name) => {
                    self.state = TrackerState::Active(info.into_session());
                    return Ok(Reconciliation::Confirmed(id));
                }
                _ => {
                    warn!(session = %id, "remembered session is not open on the ledger, clearing it");
                    self.store.remove(KEY_ACTIVE_SESSION)?;
                    self.identity.active_session = None;
                    self.state = TrackerState::Idle;
                    cleared = Some(id);
                }
            }
        }

        if let Some(name) = self.identity.display_name.clone()
            && let Some(info) = ledger.open_session_for(&name)?
        {
            info!(session = %info.id, name = %name, "adopting open session found on the ledger");
            self.store.set(KEY_ACTIVE_SESSION, info.id.as_str())?;
            self.identity.active_session = Some(info.id.clone());
            let id = info.id.clone();
            self.state = TrackerState::Active(info.into_session());
            return Ok(Reconciliation::Adopted(id));
        }

        self.state = TrackerState::Idle;
        Ok(match cleared {
            Some(id) => Reconciliation::Cleared(id),
            None => Reconciliation::Idle,
        })
    }

    /// Idle → Active.
    ///
    /// Rejected without a ledger call when already active, when a punch is
    /// in flight or when `name` is blank. On a transport failure the tracker
    /// stays Idle. If the ledger refuses because a session is already open,
    /// the tracker reconciles (adopting that session) and the conflict is
    /// returned.
    pub fn punch_in<L: Ledger>(&mut self, ledger: &L, name: &str) -> AppResult<SessionId> {
        if let TrackerState::Active(s) = &self.state {
            return Err(AppError::StateConflict(format!(
                "Already punched in (session {}). Punch out first.",
                s.id
            )));
        }

        let name = validate_name(name)?.to_string();

        let outcome = {
            let _guard = InFlight::acquire(&self.busy, "punch")?;

            if self.identity.display_name.as_deref() != Some(name.as_str()) {
                self.store.set(KEY_DISPLAY_NAME, &name)?;
                self.identity.display_name = Some(name.clone());
            }

            ledger.create_session(&name)
        };

        let id = match outcome {
            Ok(id) => id,
            Err(e) if e.is_state_conflict() => {
                warn!(name = %name, error = %e, "ledger rejected punch-in, reconciling");
                if let Err(re) = self.reconcile(ledger) {
                    warn!(error = %re, "reconciliation after rejected punch-in failed");
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.state = TrackerState::Active(Session {
            id: id.clone(),
            started_at: Some(Local::now().naive_local()),
        });
        self.identity.active_session = Some(id.clone());

        // The ledger already holds the session; reconciliation recovers it
        // by name if this write is lost.
        if let Err(e) = self.store.set(KEY_ACTIVE_SESSION, id.as_str()) {
            warn!(session = %id, error = %e, "failed to persist active session");
        }

        info!(session = %id, name = %name, "punched in");
        Ok(id)
    }

    /// Active → Idle.
    ///
    /// On a transport failure the tracker stays Active so the user can
    /// retry. If the ledger no longer knows the session, the tracker
    /// reconciles and the conflict is returned.
    pub fn punch_out<L: Ledger>(&mut self, ledger: &L) -> AppResult<SessionId> {
        let id = match &self.state {
            TrackerState::Active(s) => s.id.clone(),
            TrackerState::Idle => {
                return Err(AppError::StateConflict(
                    "Not punched in: there is no active session to close.".into(),
                ));
            }
        };

        let outcome = {
            let _guard = InFlight::acquire(&self.busy, "punch")?;
            ledger.close_session(&id)
        };

        match outcome {
            Ok(()) => {
                self.state = TrackerState::Idle;
                self.identity.active_session = None;
                if let Err(e) = self.store.remove(KEY_ACTIVE_SESSION) {
                    warn!(session = %id, error = %e, "failed to clear persisted session");
                }
                info!(session = %id, "punched out");
                Ok(id)
            }
            Err(e) if e.is_state_conflict() => {
                warn!(session = %id, error = %e, "ledger rejected punch-out, reconciling");
                if let Err(re) = self.reconcile(ledger) {
                    warn!(error = %re, "reconciliation after rejected punch-out failed");
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Forget the display name and session id.
    pub fn sign_out(&mut self, force: bool) -> AppResult<()> {
        if let TrackerState::Active(s) = &self.state
            && !force
        {
            return Err(AppError::StateConflict(format!(
                "Session {} is still open. Punch out first or use --force.",
                s.id
            )));
        }

        self.store.remove(KEY_ACTIVE_SESSION)?;
        self.store.remove(KEY_DISPLAY_NAME)?;
        self.identity = LocalState::default();
        self.state = TrackerState::Idle;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn validate_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "A display name is required to punch in.".into(),
        ));
    }
    Ok(name)
}
