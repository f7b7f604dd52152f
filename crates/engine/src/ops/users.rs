use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{Error as PasswordHashError, SaltString},
};
use rand::rngs::OsRng;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, User, users, util::normalize_optional_text};

use super::{Engine, with_tx};

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

fn verify_password(candidate: &str, stored_hash: &str) -> ResultEngine<()> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| EngineError::PasswordHash(err.to_string()))?;
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|err| match err {
            PasswordHashError::Password => EngineError::InvalidCredentials,
            other => EngineError::PasswordHash(other.to_string()),
        })
}

impl Engine {
    /// Creates a login. The password is stored as an argon2 hash.
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> ResultEngine<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidName(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(EngineError::InvalidCredentials);
        }
        let password_hash = hash_password(password)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingUser(username.to_string()));
            }

            let model = users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                email: ActiveValue::Set(normalize_optional_text(email)),
                password_hash: ActiveValue::Set(password_hash),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!("created user {}", model.username);
            Ok(User::from(model))
        })
    }

    /// Checks a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;
        verify_password(password, &model.password_hash)?;
        Ok(User::from(model))
    }

    pub async fn user(&self, username: &str) -> ResultEngine<User> {
        users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert_eq!(
            verify_password("battery staple", &hash).unwrap_err(),
            EngineError::InvalidCredentials
        );
    }
}
