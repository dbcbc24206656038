use crate::auth::Claims;
use crate::models::{AuthorizationContext, RoleClaim, ServiceError};
use crate::repositories::PrincipalRepository;
use crate::services::authorization::resolve_roles;
use std::sync::Arc;

/// Builds the per-call [`AuthorizationContext`]. Role precedence — claim
/// over stored role over the `USER` default — is applied here and only
/// here, so every call site resolves a principal's roles identically.
pub struct IdentityService {
    principals: Arc<dyn PrincipalRepository>,
}

impl IdentityService {
    pub fn new(principals: Arc<dyn PrincipalRepository>) -> Self {
        Self { principals }
    }

    pub async fn context_for(
        &self,
        principal_id: &str,
        claim: Option<&RoleClaim>,
    ) -> Result<AuthorizationContext, ServiceError> {
        let record = self.principals.find_by_id(principal_id).await?;
        let stored_role = record.as_ref().and_then(|r| r.role.as_deref());
        let roles = resolve_roles(claim, stored_role);
        let direct_reports = record.map(|r| r.direct_reports).unwrap_or_default();

        Ok(AuthorizationContext::new(principal_id, roles).with_direct_reports(direct_reports))
    }

    /// Context for an already-verified token.
    pub async fn context_from_claims(
        &self,
        claims: &Claims,
    ) -> Result<AuthorizationContext, ServiceError> {
        self.context_for(&claims.sub, claims.role.as_ref()).await
    }
}
