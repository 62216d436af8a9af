use crate::backend::{unique_id, Backend, Query, ServiceError};
use crate::models::{Identity, NewIdentity};

use super::ActionError;

/// Create an identity, or return the existing one registered with the same
/// email.
///
/// A conflict from the identity service triggers a lookup by email; the
/// first identity whose email matches exactly is returned. If the lookup
/// finds nothing (the conflict came from another unique field), the
/// conflict is returned to the caller.
pub async fn create_identity(
    backend: &Backend,
    new: &NewIdentity,
) -> Result<Identity, ActionError> {
    let user_id = unique_id();

    match backend.identities.create(&user_id, new).await {
        Ok(identity) => {
            tracing::info!(user_id = %identity.id, "Identity created");
            Ok(identity)
        }
        Err(ServiceError::Conflict(message)) => {
            tracing::warn!(%message, "Email conflict, reusing existing identity");

            let queries = [Query::equal("email", &new.email)];
            let existing = backend.identities.list(&queries).await.map_err(|e| {
                tracing::error!(error = %e, "Lookup of existing identity failed");
                e
            })?;

            existing
                .into_iter()
                .find(|identity| identity.email == new.email)
                .ok_or(ActionError::Service(ServiceError::Conflict(message)))
        }
        Err(e) => {
            tracing::error!(error = %e, "An error occurred while creating a new user");
            Err(e.into())
        }
    }
}

/// Fetch one identity by id.
pub async fn get_identity(backend: &Backend, user_id: &str) -> Result<Identity, ActionError> {
    backend.identities.get(user_id).await.map_err(|e| {
        tracing::error!(user_id, error = %e, "An error occurred while retrieving the user details");
        ActionError::from_lookup(e, format!("identity {user_id}"))
    })
}
