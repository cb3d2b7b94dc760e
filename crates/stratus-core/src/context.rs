//! Request context.

use serde::{Deserialize, Serialize};

/// Role name that grants an admin context.
pub const ADMIN_ROLE: &str = "admin";

/// Identity and correlation data for one request.
///
/// Contexts are values: privilege changes produce a new context through
/// [`RequestContext::elevated`] and never mutate the caller's copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub request_id: String,
}

impl RequestContext {
    /// Create a context for a user acting within a project.
    pub fn new(
        user_id: impl Into<String>,
        project_id: impl Into<String>,
        is_admin: bool,
    ) -> Self {
        let roles = if is_admin {
            vec![ADMIN_ROLE.to_string()]
        } else {
            Vec::new()
        };
        Self {
            user_id: Some(user_id.into()),
            project_id: Some(project_id.into()),
            roles,
            is_admin,
            request_id: generate_request_id(),
        }
    }

    /// Create a project-less admin context for internal tasks.
    pub fn internal_admin() -> Self {
        Self {
            user_id: None,
            project_id: None,
            roles: vec![ADMIN_ROLE.to_string()],
            is_admin: true,
            request_id: generate_request_id(),
        }
    }

    /// Build a context from a role list; any `admin` role yields an admin context.
    pub fn from_roles(
        user_id: Option<String>,
        project_id: Option<String>,
        roles: Vec<String>,
    ) -> Self {
        let is_admin = roles.iter().any(|r| r.eq_ignore_ascii_case(ADMIN_ROLE));
        Self {
            user_id,
            project_id,
            roles,
            is_admin,
            request_id: generate_request_id(),
        }
    }

    /// Replace the request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Return a privileged copy of this context.
    ///
    /// Identity and request ID carry over so audit trails still point at the
    /// original caller.
    pub fn elevated(&self) -> Self {
        let mut ctx = self.clone();
        ctx.is_admin = true;
        if !ctx.roles.iter().any(|r| r == ADMIN_ROLE) {
            ctx.roles.push(ADMIN_ROLE.to_string());
        }
        ctx
    }

    /// Whether records owned by `project_id` are visible to this context.
    pub fn can_access_project(&self, project_id: &str) -> bool {
        self.is_admin || self.project_id.as_deref() == Some(project_id)
    }
}

/// Generate a request ID in the `req-<uuid>` form.
pub fn generate_request_id() -> String {
    format!("req-{}", uuid::Uuid::new_v4())
}
