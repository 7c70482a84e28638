//! Interactive editing on top of the scene core.
//!
//! [`EditSession`] turns polled key state into a per-frame list of
//! [`Intent`]s and applies them to the active instance. [`Stage`] owns the
//! scene, the session and the animation sequencer and steps all of them
//! once per frame.

pub mod bindings;
pub mod intent;
mod session;
mod stage;

pub use bindings::KeyBindings;
pub use intent::{Control, Intent};
pub use session::{EditRates, EditSession, Outcome, SessionStatus};
pub use stage::Stage;
