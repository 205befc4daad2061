mod event;
mod project;
mod prompt;
mod session;

#[cfg(test)]
mod tests;

pub use event::{EventKind, HookInput};
pub use project::Project;
pub use prompt::Prompt;
pub use session::Session;
