mod note;
mod tag;
mod user;

pub use note::{Note, NoteResponse};
pub use tag::Tag;
pub use user::{User, UserResponse};
