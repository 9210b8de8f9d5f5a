//! API State Management

use ballot_core::Ledger;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::registry::VoterRegistry;

/// Admin identity checked by `/admin-login`.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub admin_id: String,
    /// SHA-256 hex of the admin password.
    pub password_hash: String,
}

#[derive(Clone)]
pub struct ApiState {
    /// The ledger, guarded as a whole: the vote flow holds one write lock
    /// across submit and seal so concurrent votes cannot interleave with
    /// the pending-buffer reset.
    pub ledger: Arc<RwLock<Ledger>>,
    pub voters: Arc<RwLock<VoterRegistry>>,
    pub admin: Arc<AdminCredentials>,
    pub jwt_secret: Arc<String>,
    /// Candidate id -> display name, for result formatting.
    pub candidates: Arc<HashMap<String, String>>,
    pub start_time: std::time::Instant,
}

impl ApiState {
    pub fn new(
        ledger: Ledger,
        admin: AdminCredentials,
        jwt_secret: String,
        candidates: HashMap<String, String>,
    ) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            voters: Arc::new(RwLock::new(VoterRegistry::new())),
            admin: Arc::new(admin),
            jwt_secret: Arc::new(jwt_secret),
            candidates: Arc::new(candidates),
            start_time: std::time::Instant::now(),
        }
    }
}
