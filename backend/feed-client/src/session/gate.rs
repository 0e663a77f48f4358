use super::Route;
use crate::backend::AuthProvider;
use crate::models::Session;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Show the surface. Carries the session when there is one.
    Render(Option<Session>),
    /// Show nothing and go elsewhere
    Redirect(Route),
}

/// Decides, from the current session, which surface a viewer may see
#[derive(Clone)]
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    legacy_guest_surfaces: bool,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            legacy_guest_surfaces: false,
        }
    }

    /// Leave login/signup reachable for signed-in viewers
    pub fn with_legacy_guest_surfaces(mut self, enabled: bool) -> Self {
        self.legacy_guest_surfaces = enabled;
        self
    }

    /// Protected surfaces need a session; otherwise go to login
    pub fn guard_protected(&self) -> GateDecision {
        match self.auth.current_session() {
            Some(session) => GateDecision::Render(Some(session)),
            None => {
                tracing::debug!("No session on protected surface, redirecting to login");
                GateDecision::Redirect(Route::Login)
            }
        }
    }

    /// Login and signup send signed-in viewers on to the feed
    pub fn guard_guest(&self) -> GateDecision {
        match self.auth.current_session() {
            Some(session) if !self.legacy_guest_surfaces => {
                tracing::debug!(uid = %session.uid, "Signed-in viewer on guest surface, redirecting to feed");
                GateDecision::Redirect(Route::Feed)
            }
            session => GateDecision::Render(session),
        }
    }

    pub fn resolve(&self, route: Route) -> GateDecision {
        if route.is_protected() {
            self.guard_protected()
        } else {
            self.guard_guest()
        }
    }

    /// Decision for a raw path. Unknown paths fall back to the root route.
    pub fn resolve_path(&self, path: &str) -> GateDecision {
        let route = Route::from_path(path).unwrap_or_else(|| {
            tracing::debug!(%path, "Unknown path, falling back to feed");
            Route::Feed
        });
        self.resolve(route)
    }
}
