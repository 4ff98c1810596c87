//! Workspace ownership for the forms platform
//!
//! This crate owns the workspace documents: which forms an admin has grouped
//! together, and the transactional operations that change that grouping.
//! It is consumed by the formdesk-api HTTP service but has no HTTP knowledge.

pub mod db;
pub mod error;
pub mod form;
pub mod store;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Result, WorkspaceError};
pub use form::{Form, FormArchiver, FormStatus, SqlFormArchiver};
pub use workspace::{
    DeleteWorkspaceRequest, MoveFormsRequest, UpdateWorkspaceTitleRequest, Workspace,
    WorkspaceService, WORKSPACE_TITLE_MAX_LENGTH,
};
