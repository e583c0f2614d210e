//! Formgate core library — request validation, submission dispatch, email
//! delivery, and the HTTP serving surface used by the CLI.

pub mod config;
pub mod event;
pub mod form;
pub mod init;
pub mod mailer;
pub mod mime;
pub mod server;
pub mod submit;
