//! Authentication service: login, refresh rotation, logout and bearer
//! token authentication.

use devassist_core::error::{DevAssistError, DevAssistResult};
use devassist_core::models::user::{Caller, PublicUser, User};
use devassist_core::repository::UserRepository;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, TokenUse};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login or refresh result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Signed JWT refresh token; only its hash is stored.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user: PublicUser,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify email + password and issue a token pair.
    ///
    /// Unknown email and wrong password fail identically. The stored
    /// refresh hash is overwritten, so earlier refresh tokens stop
    /// validating.
    pub async fn login(&self, input: LoginInput) -> DevAssistResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(DevAssistError::NotFound { .. }) => {
                password::verify_against_decoy(&input.password, self.config.pepper.as_deref());
                warn!(email = %input.email, "Login failed: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let output = self.issue_pair(user).await?;
        info!(user_id = %output.user.id, "User logged in");
        Ok(output)
    }

    /// Whether `token` is the refresh token most recently issued to
    /// `user_id`. Unknown users and cleared hashes yield `false`.
    pub async fn validate_refresh_token(&self, user_id: Uuid, token: &str) -> DevAssistResult<bool> {
        let user = match self.user_repo.get_by_id(user_id).await {
            Ok(u) => u,
            Err(DevAssistError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        Ok(user
            .refresh_token_hash
            .is_some_and(|stored| stored == token::hash_refresh_token(token)))
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// consumed: the stored hash now names the new one.
    pub async fn refresh(&self, refresh_token: &str) -> DevAssistResult<LoginOutput> {
        let claims = token::decode_token(refresh_token, TokenUse::Refresh, &self.config)?;
        let user_id = claims.user_id()?;

        if !self.validate_refresh_token(user_id, refresh_token).await? {
            warn!(user_id = %user_id, "Refresh rejected: token not current");
            return Err(AuthError::TokenRevoked.into());
        }

        // Re-read the user so a changed role lands in the new tokens.
        let user = self.user_repo.get_by_id(user_id).await?;
        self.issue_pair(user).await
    }

    /// Forget the stored refresh hash; outstanding access tokens stay
    /// valid until they expire.
    pub async fn logout(&self, user_id: Uuid) -> DevAssistResult<()> {
        self.user_repo.set_refresh_token_hash(user_id, None).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Stateless verification of a bearer access token.
    pub fn authenticate(&self, access_token: &str) -> DevAssistResult<Caller> {
        let claims = token::decode_token(access_token, TokenUse::Access, &self.config)?;
        Ok(Caller {
            id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }

    async fn issue_pair(&self, user: User) -> DevAssistResult<LoginOutput> {
        let access_token = token::issue_token(&user, TokenUse::Access, &self.config)?;
        let refresh_token = token::issue_token(&user, TokenUse::Refresh, &self.config)?;

        self.user_repo
            .set_refresh_token_hash(user.id, Some(token::hash_refresh_token(&refresh_token)))
            .await?;

        Ok(LoginOutput {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_lifetime_secs,
            user: PublicUser::from(user),
        })
    }
}
