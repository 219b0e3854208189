//! User management commands.

use routeclouds_api::db::UserRepository;
use routeclouds_core::{UserRole, Username};

use super::{CommandError, connect};

/// Change an existing account's role.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a malformed or unknown
/// username, or a database error.
pub async fn set_role(username: &str, role: UserRole) -> Result<(), CommandError> {
    let username =
        Username::parse(username).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .set_role(&username, role)
        .await?
        .ok_or_else(|| CommandError::InvalidArgument(format!("No user named {username}")))?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %role, "Role updated");
    Ok(())
}
