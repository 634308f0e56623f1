//! Authentication service: registration, login and current-user lookup.

use tracing::info;
use zoocollab_core::error::{ZooError, ZooResult};
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::user::{AccountType, CreateUser, User};
use zoocollab_core::repository::UserRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub institution: String,
    pub specialization: Option<String>,
    pub account_type: Option<AccountType>,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful registration or login.
#[derive(Debug)]
pub struct AuthOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user: User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
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

    /// Create an account and sign the new user in.
    pub async fn register(&self, input: RegisterInput) -> ZooResult<AuthOutput> {
        let email = normalize_email(&input.email);
        if input.name.trim().is_empty() {
            return Err(ZooError::validation("name is required"));
        }
        if input.institution.trim().is_empty() {
            return Err(ZooError::validation("institution is required"));
        }
        if !email.contains('@') {
            return Err(ZooError::validation("email address is malformed"));
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort(self.config.min_password_length).into());
        }

        let user = self
            .user_repo
            .create(CreateUser {
                name: input.name.trim().to_string(),
                email,
                password: input.password,
                institution: input.institution.trim().to_string(),
                specialization: input.specialization,
                account_type: input.account_type,
            })
            .await?;

        info!(user_id = %user.id, "Registered user");
        self.sign_in(user)
    }

    /// Authenticate with email and password.
    ///
    /// An unknown email and a wrong password produce the same
    /// `AuthenticationFailed` error.
    pub async fn login(&self, input: LoginInput) -> ZooResult<AuthOutput> {
        let email = normalize_email(&input.email);
        let user = match self.user_repo.get_by_email(&email).await {
            Ok(user) => user,
            Err(ZooError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        self.sign_in(user)
    }

    /// The user behind an authenticated actor.
    pub async fn current_user(&self, actor: Actor) -> ZooResult<User> {
        let user_id = actor.user_id().ok_or(AuthError::NotAuthenticated)?;
        self.user_repo.get_by_id(user_id).await
    }

    fn sign_in(&self, user: User) -> ZooResult<AuthOutput> {
        let access_token = token::issue_access_token(user.id, &self.config)?;
        Ok(AuthOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            user,
        })
    }
}
