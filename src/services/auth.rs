use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::{
    config::HashingConfig,
    error::{AppError, Result},
    models::user::{NewUser, User},
    state::AppState,
};

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
/// * `cost` - The Argon2 cost parameters.
///
/// # Returns
///
/// A `Result` containing the PHC-formatted hash.
pub fn hash_password(password: &str, cost: &HashingConfig) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to generate salt: {}", e)))?;

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Hashing(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(cost.memory_kib)
            .t_cost(cost.iterations)
            .p_cost(cost.parallelism)
            .build()
            .map_err(|e| AppError::Hashing(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Hashing(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a stored hash.
///
/// The cost parameters are read back from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Hashing(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Generates a fresh opaque session token.
fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Registers a new user. No token is issued until the first login.
pub async fn register(
    state: &AppState,
    username: String,
    password: String,
    name: String,
) -> Result<User> {
    if state.users.find_by_username(&username).await?.is_some() {
        tracing::info!("Registration refused, username taken: {}", username);
        return Err(AppError::username_taken());
    }

    let password_hash = hash_password(&password, &state.config.hashing)?;
    let user = state
        .users
        .create(NewUser {
            username,
            password_hash,
            name,
        })
        .await?;

    tracing::info!("✅ User registered: {} ({})", user.username, user.id);
    Ok(user)
}

/// Checks credentials and rotates the user's token.
///
/// Unknown usernames and wrong passwords fail identically.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<User> {
    let mut user = state
        .users
        .find_by_username(username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = new_token();
    state.users.set_token(user.id, Some(&token)).await?;
    user.token = Some(token);

    tracing::info!("✅ User logged in: {}", user.id);
    Ok(user)
}

/// Clears the user's token.
pub async fn logout(state: &AppState, user: &User) -> Result<()> {
    state.users.set_token(user.id, None).await?;
    tracing::info!("👋 User logged out: {}", user.id);
    Ok(())
}

/// Resolves a raw `Authorization` header value to its user.
pub async fn authenticate(state: &AppState, token: Option<&str>) -> Result<User> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthenticated)?;

    state
        .users
        .find_by_token(token)
        .await?
        .ok_or(AppError::Unauthenticated)
}

/// Applies a partial profile update. The password is rehashed when present.
pub async fn update_profile(
    state: &AppState,
    user: &User,
    name: Option<String>,
    password: Option<String>,
) -> Result<User> {
    if name.is_none() && password.is_none() {
        return Ok(user.clone());
    }

    let password_hash = password
        .as_deref()
        .map(|p| hash_password(p, &state.config.hashing))
        .transpose()?;

    let updated = state
        .users
        .update_profile(user.id, name.as_deref(), password_hash.as_deref())
        .await?;

    tracing::info!(
        user_id = user.id,
        name_changed = name.is_some(),
        password_changed = password_hash.is_some(),
        "Profile updated"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> HashingConfig {
        HashingConfig { memory_kib: 64, iterations: 1, parallelism: 1 }
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("secret", &cheap()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret", &hash).unwrap());
        assert!(!verify_password("Secret", &hash).unwrap());
    }

    #[test]
    fn hashing_is_salted() {
        let first = hash_password("secret", &cheap()).unwrap();
        let second = hash_password("secret", &cheap()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-hash").is_err());
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(new_token(), new_token());
    }
}
