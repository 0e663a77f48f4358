/// Session handling
///
/// - `route`: the three surfaces and their paths
/// - `gate`: which surface a viewer may see
/// - `forms`: login and signup form state
pub mod forms;
pub mod gate;
mod route;

pub use forms::{AuthForm, FormKind, FormOutcome, FormState};
pub use gate::{GateDecision, SessionGate};
pub use route::Route;
