use super::password::{hash_password, verify_password};
use crate::backend::AuthProvider;
use crate::models::Session;
use async_trait::async_trait;
use error_types::validation::rules;
use error_types::AuthError;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

struct Account {
    uid: String,
    email: String,
    password_hash: String,
}

#[derive(Default)]
struct AuthState {
    // lower-cased email -> account
    accounts: HashMap<String, Account>,
    current: Option<Session>,
    fail_next_sign_out: Option<AuthError>,
}

/// In-process auth provider with Argon2id password hashes
#[derive(Default)]
pub struct MemoryAuth {
    state: Mutex<AuthState>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `sign_out` fail with `error`
    pub fn fail_next_sign_out(&self, error: AuthError) {
        self.state.lock().fail_next_sign_out = Some(error);
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        rules::validate_email(email).map_err(|e| AuthError::InvalidEmail(e.message))?;

        let key = normalize_email(email);
        if self.state.lock().accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        // Hash outside the lock
        let password_hash = hash_password(password)?;

        let mut state = self.state.lock();
        if state.accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let session = Session {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
        };
        state.accounts.insert(
            key,
            Account {
                uid: session.uid.clone(),
                email: session.email.clone(),
                password_hash,
            },
        );
        state.current = Some(session.clone());

        tracing::info!(uid = %session.uid, "Account created");
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let key = normalize_email(email);
        let (uid, stored_email, password_hash) = {
            let state = self.state.lock();
            let account = state.accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
            (
                account.uid.clone(),
                account.email.clone(),
                account.password_hash.clone(),
            )
        };

        if !verify_password(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session {
            uid,
            email: stored_email,
        };
        self.state.lock().current = Some(session.clone());

        tracing::info!(uid = %session.uid, "Signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        if let Some(error) = state.fail_next_sign_out.take() {
            return Err(error);
        }

        if let Some(session) = state.current.take() {
            tracing::info!(uid = %session.uid, "Signed out");
        }
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.state.lock().current.clone()
    }
}
