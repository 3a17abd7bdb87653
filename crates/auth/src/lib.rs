use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use voltchat_config::AuthConfig;

pub mod avatar;
pub mod picture;
pub mod themes;

pub use themes::{CustomTheme, Theme, ThemeColors};

const MAX_DISPLAY_NAME_LENGTH: usize = 50;
const MAX_BIO_LENGTH: usize = 500;
const NEW_MEMBER_BIO: &str = "New member";
const PLACEHOLDER_BIO: &str = "Community member";
/// Placeholder profiles kept for unknown usernames. The oldest is evicted beyond this.
const MAX_PLACEHOLDER_PROFILES: usize = 1024;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// In-memory account directory with password login and bearer sessions.
#[derive(Clone)]
pub struct Authenticator {
    directory: Arc<RwLock<Directory>>,
    session_ttl: Duration,
    admin_domain: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("user not found")]
    UserNotFound,
    #[error("{0}")]
    InvalidProfile(String),
    #[error("{0}")]
    InvalidTheme(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    /// Generated avatar, always present.
    pub profile_picture: String,
    pub custom_profile_picture: Option<String>,
    pub bio: String,
    pub theme: Option<String>,
    pub custom_themes: Vec<CustomTheme>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The uploaded picture when there is one, the generated avatar otherwise.
    pub fn effective_picture(&self) -> &str {
        self.custom_profile_picture
            .as_deref()
            .unwrap_or(&self.profile_picture)
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub theme: Option<String>,
}

/// What the public profile page shows about a username.
#[derive(Debug, Clone)]
pub struct PublicProfile {
    pub username: String,
    pub display_name: String,
    pub profile_picture: String,
    pub bio: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

struct Account {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Directory {
    accounts: Vec<Account>,
    sessions: HashMap<String, AuthSession>,
    placeholders: HashMap<String, PublicProfile>,
}

impl Directory {
    fn by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.user.email.eq_ignore_ascii_case(email))
    }

    fn by_id_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.user.id == id)
    }

    fn by_username(&self, username: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.user.username.eq_ignore_ascii_case(username))
    }

    fn unique_username(&self, base: &str) -> String {
        if self.by_username(base).is_none() {
            return base.to_string();
        }
        (2u64..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| self.by_username(candidate).is_none())
            .unwrap_or_else(|| format!("{base}{}", CUID.create_id()))
    }

    fn insert(&mut self, registration: Registration, password_hash: String) -> User {
        let username = match registration.username {
            Some(username) => username,
            None => self.unique_username(&base_username(&registration.email)),
        };

        let user = User {
            id: CUID.create_id(),
            profile_picture: avatar::generate_profile_picture(&registration.email),
            email: registration.email,
            username,
            display_name: registration.display_name,
            custom_profile_picture: None,
            bio: registration.bio,
            theme: None,
            custom_themes: Vec::new(),
            created_at: Utc::now(),
        };

        self.placeholders.remove(&user.username.to_ascii_lowercase());
        self.accounts.push(Account {
            user: user.clone(),
            password_hash,
        });
        user
    }

    /// Drops the oldest placeholders until at most `keep` remain.
    fn evict_placeholders(&mut self, keep: usize) {
        while self.placeholders.len() > keep {
            let oldest = self
                .placeholders
                .iter()
                .min_by_key(|(_, profile)| profile.created_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    self.placeholders.remove(&key);
                    debug!(username = %key, "placeholder profile evicted");
                }
                None => break,
            }
        }
    }
}

struct Registration {
    email: String,
    username: Option<String>,
    display_name: String,
    bio: String,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        let session_ttl = i64::try_from(config.session_ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);

        Self {
            directory: Arc::new(RwLock::new(Directory::default())),
            session_ttl,
            admin_domain: config
                .admin_domain
                .trim()
                .trim_start_matches('@')
                .to_ascii_lowercase(),
        }
    }

    /// Registers the three demo accounts. Existing emails are left alone.
    pub async fn seed_demo_accounts(&self) -> Result<(), AuthError> {
        let demo = [
            (
                "admin@voltaccept.com",
                "admin123",
                "admin",
                "Admin",
                "System Administrator",
            ),
            (
                "user@voltaccept.com",
                "user123",
                "voltuser",
                "Volt User",
                "Voltarian Community Member",
            ),
            (
                "test@gmail.com",
                "test123",
                "testuser",
                "Test User",
                "Testing the platform",
            ),
        ];

        for (email, password, username, display_name, bio) in demo {
            let password_hash = hash_password(password)?;
            let mut directory = self.directory.write().await;
            if directory.by_email(email).is_some() {
                continue;
            }
            let username = directory.unique_username(username);
            directory.insert(
                Registration {
                    email: email.to_string(),
                    username: Some(username),
                    display_name: display_name.to_string(),
                    bio: bio.to_string(),
                },
                password_hash,
            );
        }

        info!(count = demo.len(), "seeded demo accounts");
        Ok(())
    }

    /// Logs in with email and password, registering the email on first use.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<(User, AuthSession), AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let existing = {
            let directory = self.directory.read().await;
            directory
                .by_email(email)
                .map(|account| (account.user.clone(), account.password_hash.clone()))
        };

        if let Some((user, stored)) = existing {
            verify_password(password, &stored)?;
            let session = self.issue_session(&user.id).await;
            info!(user_id = %user.id, username = %user.username, "user logged in");
            return Ok((user, session));
        }

        let password_hash = hash_password(password)?;

        let mut directory = self.directory.write().await;

        // another request may have registered the same email while we were hashing
        if let Some(account) = directory.by_email(email) {
            let user = account.user.clone();
            let stored = account.password_hash.clone();
            drop(directory);
            verify_password(password, &stored)?;
            let session = self.issue_session(&user.id).await;
            return Ok((user, session));
        }

        let local_part = local_part(email);
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(local_part)
            .chars()
            .take(MAX_DISPLAY_NAME_LENGTH)
            .collect();

        let user = directory.insert(
            Registration {
                email: email.to_string(),
                username: None,
                display_name,
                bio: NEW_MEMBER_BIO.to_string(),
            },
            password_hash,
        );
        drop(directory);

        let session = self.issue_session(&user.id).await;
        info!(user_id = %user.id, username = %user.username, "registered new user");
        Ok((user, session))
    }

    pub async fn logout(&self, token: &str) {
        let removed = self.directory.write().await.sessions.remove(token);
        if let Some(session) = removed {
            debug!(user_id = %session.user_id, "session closed");
        }
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let (session, user) = {
            let directory = self.directory.read().await;
            let session = directory
                .sessions
                .get(token)
                .cloned()
                .ok_or(AuthError::SessionNotFound)?;
            let user = directory
                .accounts
                .iter()
                .find(|account| account.user.id == session.user_id)
                .map(|account| account.user.clone());
            (session, user)
        };

        if session.expires_at <= Utc::now() {
            self.directory.write().await.sessions.remove(token);
            return Err(AuthError::SessionExpired);
        }

        let user = user.ok_or(AuthError::SessionNotFound)?;
        Ok((user, session))
    }

    pub fn is_admin(&self, user: &User) -> bool {
        let email = user.email.to_ascii_lowercase();
        email
            .strip_suffix(self.admin_domain.as_str())
            .is_some_and(|rest| rest.ends_with('@') && rest.len() > 1)
    }

    pub async fn user(&self, user_id: &str) -> Result<User, AuthError> {
        self.directory
            .read()
            .await
            .accounts
            .iter()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone())
            .ok_or(AuthError::UserNotFound)
    }

    /// Applies the non-blank fields of `update`. Nothing changes if any field is invalid.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let display_name = non_blank(update.display_name);
        let bio = non_blank(update.bio);
        let picture = non_blank(update.profile_picture);
        let theme = non_blank(update.theme);

        if let Some(name) = &display_name {
            if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
                return Err(AuthError::InvalidProfile(format!(
                    "Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
                )));
            }
        }
        if let Some(bio) = &bio {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(AuthError::InvalidProfile(format!(
                    "Bio must be at most {MAX_BIO_LENGTH} characters"
                )));
            }
        }
        if let Some(picture) = &picture {
            picture::validate_profile_picture(picture)?;
        }

        let mut directory = self.directory.write().await;
        let account = directory.by_id_mut(user_id).ok_or(AuthError::UserNotFound)?;

        if let Some(theme) = &theme {
            let known = themes::is_builtin(theme)
                || account.user.custom_themes.iter().any(|custom| &custom.id == theme);
            if !known {
                return Err(AuthError::InvalidTheme(format!("Unknown theme: {theme}")));
            }
        }

        let user = &mut account.user;
        if let Some(name) = display_name {
            user.display_name = name;
        }
        if let Some(bio) = bio {
            user.bio = bio;
        }
        if let Some(picture) = picture {
            user.custom_profile_picture = Some(picture);
        }
        if let Some(theme) = theme {
            user.theme = Some(theme);
        }

        debug!(user_id, "profile updated");
        Ok(user.clone())
    }

    pub async fn reset_profile_picture(&self, user_id: &str) -> Result<User, AuthError> {
        let mut directory = self.directory.write().await;
        let account = directory.by_id_mut(user_id).ok_or(AuthError::UserNotFound)?;
        account.user.custom_profile_picture = None;
        Ok(account.user.clone())
    }

    pub async fn add_custom_theme(
        &self,
        user_id: &str,
        name: &str,
        colors: ThemeColors,
    ) -> Result<(User, CustomTheme), AuthError> {
        let mut directory = self.directory.write().await;
        let account = directory.by_id_mut(user_id).ok_or(AuthError::UserNotFound)?;

        let theme = themes::build_custom_theme(name, colors, &account.user.custom_themes)?;
        account.user.custom_themes.push(theme.clone());

        info!(user_id, theme_id = %theme.id, "custom theme created");
        Ok((account.user.clone(), theme))
    }

    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        self.directory
            .read()
            .await
            .by_username(username.trim())
            .map(|account| account.user.clone())
    }

    /// Profile for `username`, inventing and remembering a placeholder for unknown names.
    pub async fn public_profile_seed(&self, username: &str) -> PublicProfile {
        let username = username.trim();
        if let Some(user) = self.find_by_username(username).await {
            return PublicProfile {
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                profile_picture: user.effective_picture().to_string(),
                bio: user.bio.clone(),
                email: Some(user.email),
                created_at: user.created_at,
            };
        }

        let key = username.to_ascii_lowercase();
        let mut directory = self.directory.write().await;
        if !directory.placeholders.contains_key(&key) {
            directory.evict_placeholders(MAX_PLACEHOLDER_PROFILES - 1);
        }
        directory
            .placeholders
            .entry(key)
            .or_insert_with(|| PublicProfile {
                username: username.to_ascii_lowercase(),
                display_name: username.to_string(),
                profile_picture: avatar::generate_profile_picture(username),
                bio: PLACEHOLDER_BIO.to_string(),
                email: None,
                created_at: Utc::now(),
            })
            .clone()
    }

    async fn issue_session(&self, user_id: &str) -> AuthSession {
        let now = Utc::now();
        let session = AuthSession {
            token: generate_session_token(),
            user_id: user_id.to_string(),
            expires_at: now
                .checked_add_signed(self.session_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut directory = self.directory.write().await;
        directory.sessions.retain(|_, existing| existing.expires_at > now);
        directory
            .sessions
            .insert(session.token.clone(), session.clone());
        session
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> Result<(), AuthError> {
    let stored_hash = PasswordHash::new(stored)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &stored_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

fn base_username(email: &str) -> String {
    let username: String = local_part(email)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if username.is_empty() {
        "user".to_string()
    } else {
        username
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
