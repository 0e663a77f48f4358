use std::fmt;

/// Surfaces the client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Feed,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Feed => "/feed",
        }
    }

    /// `/` and `/feed` both lead to the feed
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" | "/feed" => Some(Route::Feed),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            _ => None,
        }
    }

    /// Needs a session to render
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Feed)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Feed));
        assert_eq!(Route::from_path("/feed"), Some(Route::Feed));
        assert_eq!(Route::from_path("/feed/"), Some(Route::Feed));
        assert_eq!(Route::from_path("/login"), Some(Route::Login));
        assert_eq!(Route::from_path("/signup"), Some(Route::Signup));
        assert_eq!(Route::from_path("/admin"), None);
    }

    #[test]
    fn test_only_feed_is_protected() {
        assert!(Route::Feed.is_protected());
        assert!(!Route::Login.is_protected());
        assert!(!Route::Signup.is_protected());
    }
}
