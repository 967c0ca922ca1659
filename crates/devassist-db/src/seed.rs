//! First-run provisioning of an administrator account.

use devassist_core::error::{DevAssistError, DevAssistResult};
use devassist_core::models::user::{CreateUser, Role};
use devassist_core::repository::UserRepository;
use tracing::info;

/// Credentials for the bootstrap administrator.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Create the administrator unless a user with that email already exists.
///
/// Returns `true` when a user was created. Running it again is a no-op.
pub async fn seed_admin<R: UserRepository>(users: &R, admin: SeedAdmin) -> DevAssistResult<bool> {
    match users.get_by_email(&admin.email).await {
        Ok(_) => {
            info!(email = %admin.email, "Admin user already present");
            return Ok(false);
        }
        Err(DevAssistError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    let user = users
        .create(CreateUser {
            email: admin.email,
            name: admin.name,
            role: Role::Admin,
            password: admin.password,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "Seeded admin user");
    Ok(true)
}
