use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::super::changes::ValidationError;
use super::super::domain::{Role, UserAccount, UserId, UserProfile};
use super::super::repository::{Collection, RepositoryError};
use super::password::{hash_password, verify_password};
use super::token::{Claims, TokenSigner};

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("usr-{id:06}"))
}

pub const GUEST_SUBJECT: &str = "guest";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub organization: String,
}

/// Account created directly by a host.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_approved")]
    pub approved: bool,
    #[serde(default)]
    pub organization: String,
}

fn default_role() -> Role {
    Role::Guest
}

fn default_approved() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub approved: Option<bool>,
    pub organization: Option<String>,
}

/// Successful sign-in payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
}

/// Authentication and user-management failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("your account is pending approval")]
    NotApproved,
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),
    #[error("a bearer token is required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("requires {0} role")]
    Forbidden(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field).into());
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign-in, sign-up and user administration over the user collection.
pub struct AuthService {
    users: Arc<dyn Collection<UserAccount>>,
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(users: Arc<dyn Collection<UserAccount>>, signer: TokenSigner) -> Self {
        Self { users, signer }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AuthError> {
        let wanted = normalize_email(email);
        Ok(self
            .users
            .list()?
            .into_iter()
            .find(|user| normalize_email(&user.email) == wanted))
    }

    fn ensure_email_free(&self, email: &str, except: Option<&UserId>) -> Result<(), AuthError> {
        match self.find_by_email(email)? {
            Some(existing) if Some(&existing.id) != except => {
                Err(AuthError::DuplicateEmail(normalize_email(email)))
            }
            _ => Ok(()),
        }
    }

    /// Create the initial host account unless one with that email already exists.
    pub fn seed_host(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        if self.find_by_email(email)?.is_some() {
            return Ok(());
        }

        self.users.add(UserAccount {
            id: next_user_id(),
            name: name.to_string(),
            email: normalize_email(email),
            role: Role::Host,
            approved: true,
            organization: String::new(),
            password_hash: hash_password(password)?,
        })?;
        info!(email = %normalize_email(email), "seeded host account");
        Ok(())
    }

    pub fn login(&self, request: &LoginRequest) -> Result<Session, AuthError> {
        let Some(user) = self.find_by_email(&request.email)? else {
            warn!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.approved {
            warn!(user_id = %user.id, "login rejected: account pending approval");
            return Err(AuthError::NotApproved);
        }

        let token = self.signer.issue(user.id.as_str(), &user.email, user.role)?;
        info!(user_id = %user.id, role = user.role.as_str(), "login succeeded");
        Ok(Session {
            user: user.profile(),
            token,
        })
    }

    /// Self-service registration. New accounts are read-only guests, approved on creation.
    pub fn signup(&self, request: SignupRequest) -> Result<UserProfile, AuthError> {
        require("name", &request.name)?;
        require("email", &request.email)?;
        require("password", &request.password)?;
        self.ensure_email_free(&request.email, None)?;

        let account = self.users.add(UserAccount {
            id: next_user_id(),
            name: request.name,
            email: normalize_email(&request.email),
            role: Role::Guest,
            approved: true,
            organization: request.organization,
            password_hash: hash_password(&request.password)?,
        })?;
        info!(user_id = %account.id, "guest signed up");
        Ok(account.profile())
    }

    /// Read-only session without a stored account.
    pub fn guest_session(&self) -> Result<Session, AuthError> {
        let token = self.signer.issue(GUEST_SUBJECT, "", Role::Guest)?;
        Ok(Session {
            user: UserProfile {
                id: UserId::from(GUEST_SUBJECT),
                name: "Guest".to_string(),
                email: String::new(),
                role: Role::Guest,
                approved: true,
                organization: String::new(),
            },
            token,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.signer
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn list_users(&self) -> Result<Vec<UserProfile>, AuthError> {
        Ok(self
            .users
            .list()?
            .iter()
            .map(UserAccount::profile)
            .collect())
    }

    pub fn create_user(&self, request: NewUser) -> Result<UserProfile, AuthError> {
        require("name", &request.name)?;
        require("email", &request.email)?;
        require("password", &request.password)?;
        self.ensure_email_free(&request.email, None)?;

        let account = self.users.add(UserAccount {
            id: next_user_id(),
            name: request.name,
            email: normalize_email(&request.email),
            role: request.role,
            approved: request.approved,
            organization: request.organization,
            password_hash: hash_password(&request.password)?,
        })?;
        info!(user_id = %account.id, role = account.role.as_str(), "user created");
        Ok(account.profile())
    }

    pub fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<UserProfile, AuthError> {
        let mut account = self.users.get(id)?.ok_or(RepositoryError::NotFound)?;

        if let Some(name) = patch.name {
            require("name", &name)?;
            account.name = name;
        }
        if let Some(email) = patch.email {
            require("email", &email)?;
            self.ensure_email_free(&email, Some(id))?;
            account.email = normalize_email(&email);
        }
        if let Some(password) = patch.password {
            require("password", &password)?;
            account.password_hash = hash_password(&password)?;
        }
        if let Some(role) = patch.role {
            account.role = role;
        }
        if let Some(approved) = patch.approved {
            account.approved = approved;
        }
        if let Some(organization) = patch.organization {
            account.organization = organization;
        }

        let stored = self.users.update(account)?;
        info!(user_id = %stored.id, approved = stored.approved, "user updated");
        Ok(stored.profile())
    }

    pub fn delete_user(&self, id: &UserId) -> Result<UserProfile, AuthError> {
        let removed = self.users.remove(id)?;
        info!(user_id = %id, "user deleted");
        Ok(removed.profile())
    }
}
