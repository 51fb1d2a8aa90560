//! Client for the remote notes endpoint: a script URL answering
//! `GET ?path=data` with every note and `POST ?path=update` with a
//! `{success}` flag.

mod client;
mod loader;

pub use client::{HttpTransport, NoteUpdate, NotesClient, NotesError, NotesTransport};
pub use loader::{NotesLoader, NotesOutcome, NOTES_WAIT};
