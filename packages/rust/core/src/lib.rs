//! Pipeline orchestration and collaborator steps for Lectern.
//!
//! - [`pipeline`] — per-archive extract + normalize, with directory-batch
//!   error isolation
//! - [`rename`] — the `.txt` → `.md` rename step
//! - [`dispatch`] — sends ordered chapters to a completion endpoint

pub mod dispatch;
pub mod pipeline;
pub mod rename;
