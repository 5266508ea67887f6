use std::sync::mpsc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::types::PermissionState;

/// What the platform reports before we ask for anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    /// Undetermined; the user has to be asked.
    Prompt,
}

/// Platform camera authorization.
pub trait CameraAuthorization {
    fn query(&self) -> AuthorizationStatus;

    /// Asks the user for access. Blocks until they answer.
    fn request(&mut self) -> bool;
}

/// Proof that camera access was granted this session.
///
/// Only [`PermissionManager::granted`] hands these out, so anything that
/// takes one (opening a stream, starting a sampling session) cannot run
/// while the permission is unknown or denied.
#[derive(Debug, Clone, Copy)]
pub struct Granted {
    _private: (),
}

pub struct PermissionManager<A> {
    auth: A,
    state: PermissionState,
}

impl<A: CameraAuthorization> PermissionManager<A> {
    pub fn new(auth: A) -> Self {
        Self {
            auth,
            state: PermissionState::Unknown,
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Resolves the permission once. Later calls return the settled state
    /// without touching the platform again.
    pub fn resolve(&mut self) -> PermissionState {
        if self.state.is_resolved() {
            return self.state;
        }

        let resolved = match self.auth.query() {
            AuthorizationStatus::Granted => PermissionState::Granted,
            AuthorizationStatus::Denied => PermissionState::Denied,
            AuthorizationStatus::Prompt => {
                debug!("camera permission undetermined, requesting access");
                if self.auth.request() {
                    PermissionState::Granted
                } else {
                    PermissionState::Denied
                }
            }
        };

        // Unknown -> resolved always passes.
        self.state = resolved;
        match resolved {
            PermissionState::Granted => info!("camera permission granted"),
            _ => warn!("camera permission denied"),
        }
        resolved
    }

    pub fn granted(&self) -> Option<Granted> {
        (self.state == PermissionState::Granted).then_some(Granted { _private: () })
    }
}

/// Authorization through nokhwa's platform hooks. On platforms without a
/// permission model both calls report success.
pub struct NokhwaAuthorization {
    timeout: Duration,
}

impl NokhwaAuthorization {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CameraAuthorization for NokhwaAuthorization {
    fn query(&self) -> AuthorizationStatus {
        // nokhwa cannot tell "denied" from "not asked yet"; a denied user
        // gets an immediate `false` from the request below.
        if nokhwa::nokhwa_check() {
            AuthorizationStatus::Granted
        } else {
            AuthorizationStatus::Prompt
        }
    }

    fn request(&mut self) -> bool {
        let (tx, rx) = mpsc::channel();
        nokhwa::nokhwa_initialize(move |granted| {
            let _ = tx.send(granted);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(granted) => granted,
            Err(e) => {
                warn!("no answer to camera permission request: {}", e);
                false
            }
        }
    }
}
