use serde::{Deserialize, Serialize};

/// Signed-in session as reported by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
}
