//! The authenticated identity for one request or tool call.

use super::{AuthError, AuthResult};

/// Identity resolved from a verified credential. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject_id: String,
    tenant_id: Option<String>,
    session_id: Option<String>,
}

impl Principal {
    pub fn new(subject_id: impl Into<String>, tenant_id: Option<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            tenant_id,
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Member or user ID.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Organization ID, present for B2B identities.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Ticket scope for this principal. Fails closed without a tenant.
    pub fn org_scope(&self) -> AuthResult<OrgScope> {
        match self.tenant_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(OrgScope {
                organization_id: id.to_string(),
            }),
            _ => Err(AuthError::missing_claim("organization_id")),
        }
    }

    /// Task scope for this principal.
    pub fn owner_scope(&self) -> OwnerScope {
        OwnerScope {
            user_id: self.subject_id.clone(),
        }
    }
}

/// Organization a ticket operation is confined to.
///
/// Only obtainable from a [`Principal`], so handlers cannot build one from
/// request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgScope {
    organization_id: String,
}

impl OrgScope {
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }
}

/// Owner a task operation is confined to. Only obtainable from a [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerScope {
    user_id: String,
}

impl OwnerScope {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
