use argon2::{
    Argon2,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use chrono::Utc;
use rand::rngs::OsRng;

use crate::domain::{Account, Profile, Session, SessionToken};

use super::{AppError, SplitService};

/// The authenticated state for one invocation, resolved once and passed
/// explicitly to whatever needs it. There is deliberately no global
/// "current user".
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: Session,
    pub account: Account,
    pub profile: Option<Profile>,
}

impl SessionContext {
    /// Name of the signed-in member, when the account has a linked profile.
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.name.as_str())
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

fn verify_password(candidate: &str, stored_hash: &str) -> Result<(), AppError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|err| match err {
            PasswordHashError::Password => AppError::InvalidCredentials,
            other => AppError::PasswordHash(other.to_string()),
        })
}

impl SplitService {
    /// Create an account and its member profile. If an unlinked profile with
    /// the given name already exists (the group was seeded before everyone
    /// registered), it is claimed by the new account instead.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile_name: &str,
    ) -> Result<(Account, Profile), AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AppError::MissingField("password"));
        }
        let profile_name = profile_name.trim();
        if profile_name.is_empty() {
            return Err(AppError::MissingField("name"));
        }

        if self.repo().get_account_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken(email));
        }

        let account = Account::new(email, hash_password(password)?);
        self.repo().save_account(&account).await?;

        let profile = match self.repo().get_profile_by_name(profile_name).await? {
            Some(existing) if existing.is_linked() => {
                return Err(AppError::ProfileAlreadyExists(profile_name.to_string()));
            }
            Some(existing) => {
                self.repo()
                    .link_profile_account(existing.id, account.id)
                    .await?;
                Profile {
                    account_id: Some(account.id),
                    ..existing
                }
            }
            None => {
                let profile = Profile::new(profile_name).with_account(account.id);
                self.repo().save_profile(&profile).await?;
                profile
            }
        };

        Ok((account, profile))
    }

    /// Verify credentials and issue a session. Unknown email and wrong
    /// password are indistinguishable from the outside.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        self.repo().purge_expired_sessions(Utc::now()).await?;

        let email = email.trim().to_lowercase();
        let account = self
            .repo()
            .get_account_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        let session = Session::issue(account.id);
        self.repo().save_session(&session).await?;
        Ok(session)
    }

    /// Revoke a session. Revoking an unknown token is a no-op.
    pub async fn sign_out(&self, token: SessionToken) -> Result<(), AppError> {
        self.repo().delete_session(token).await?;
        Ok(())
    }

    /// Resolve a token into the full session context, or None when the token
    /// is unknown or expired. Expired sessions are dropped on sight.
    pub async fn current_session(
        &self,
        token: SessionToken,
    ) -> Result<Option<SessionContext>, AppError> {
        let Some(session) = self.repo().get_session(token).await? else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            self.repo().delete_session(token).await?;
            return Ok(None);
        }
        let Some(account) = self.repo().get_account(session.account_id).await? else {
            return Ok(None);
        };
        let profile = self.repo().get_profile_by_account(account.id).await?;

        Ok(Some(SessionContext {
            session,
            account,
            profile,
        }))
    }
}
