//! flux-axum: HTTP transport for flux-blob chunked uploads.
//!
//! `POST /uploads` starts an upload, `PUT /uploads/{id}/chunks/{index}`
//! stores one raw chunk, `POST /uploads/{id}/complete` assembles it and
//! `DELETE /uploads/{id}` cancels it. Errors are Feathers-style JSON.

pub mod app;
pub mod rest;
pub mod state;
mod error;
pub use error::{ErrorKind, FluxAxumError};
pub use state::FluxAxumState;

pub use app::{axum, FluxAxumApp};
