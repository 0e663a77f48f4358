//! Login and signup forms
//!
//! The submit button stays enabled while idle even with empty fields; the
//! auth provider does the validation. It is disabled only while a request
//! is in flight.

use super::Route;
use crate::backend::AuthProvider;
use error_types::{AuthError, UserFacing};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Signup,
}

impl FormKind {
    fn idle_label(&self) -> &'static str {
        match self {
            FormKind::Login => "Sign in",
            FormKind::Signup => "Sign up",
        }
    }

    fn busy_label(&self) -> &'static str {
        match self {
            FormKind::Login => "Signing in...",
            FormKind::Signup => "Creating account...",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub email: String,
    pub password: String,
    pub is_submitting: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Navigate(Route),
    /// A submission is already in flight
    Busy,
    Failed(AuthError),
}

pub struct AuthForm {
    kind: FormKind,
    auth: Arc<dyn AuthProvider>,
    state: watch::Sender<FormState>,
}

impl AuthForm {
    pub fn login(auth: Arc<dyn AuthProvider>) -> Self {
        Self::new(FormKind::Login, auth)
    }

    pub fn signup(auth: Arc<dyn AuthProvider>) -> Self {
        Self::new(FormKind::Signup, auth)
    }

    fn new(kind: FormKind, auth: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(FormState::default());
        Self { kind, auth, state }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.send_modify(|state| state.email = email);
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.state.send_modify(|state| state.password = password);
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn button_label(&self) -> &'static str {
        if self.state.borrow().is_submitting {
            self.kind.busy_label()
        } else {
            self.kind.idle_label()
        }
    }

    pub fn submit_enabled(&self) -> bool {
        !self.state.borrow().is_submitting
    }

    /// Sign in or create the account. Success navigates to the feed.
    pub async fn submit(&self) -> FormOutcome {
        let started = self.state.send_if_modified(|state| {
            if state.is_submitting {
                false
            } else {
                state.is_submitting = true;
                state.error = None;
                true
            }
        });
        if !started {
            return FormOutcome::Busy;
        }

        let (email, password) = {
            let state = self.state.borrow();
            (state.email.clone(), state.password.clone())
        };

        let result = match self.kind {
            FormKind::Login => self.auth.sign_in(&email, &password).await,
            FormKind::Signup => self.auth.create_account(&email, &password).await,
        };

        match result {
            Ok(session) => {
                tracing::debug!(uid = %session.uid, form = ?self.kind, "Auth form succeeded");
                self.state.send_modify(|state| {
                    state.is_submitting = false;
                    state.password.clear();
                });
                FormOutcome::Navigate(Route::Feed)
            }
            Err(err) => {
                err.log();
                let message = err.user_message();
                self.state.send_modify(|state| {
                    state.is_submitting = false;
                    state.error = Some(message);
                });
                FormOutcome::Failed(err)
            }
        }
    }
}
