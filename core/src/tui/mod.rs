pub mod app;
pub mod form;
pub mod input;
pub mod tabs;
pub mod vim;

pub use app::{App, Dialog};
pub use form::{FieldId, FormState};
pub use vim::{InputMode, VimCommandMode};
