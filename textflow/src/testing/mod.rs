//! Test doubles for the backend and storage collaborators.

mod mocks;

pub use mocks::{MockRunStore, ScriptedBackend, ScriptedCall};
