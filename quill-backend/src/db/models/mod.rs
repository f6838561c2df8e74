//! Database model modules - one `impl Database` block per table group.

mod notes;
mod users;
