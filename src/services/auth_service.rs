use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    config::AuthSettings,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserSummary},
    error::{AppError, AppResult},
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(user: &User, auth: &AuthSettings) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(auth.token_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// New accounts always get the `user` role.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let email = email.trim().to_lowercase();
    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "name, email and password are required".into(),
        ));
    }

    if state.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("Email already exists".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
        email,
        password_hash: hash_password(&password)?,
        role: Role::User,
        created_at: Utc::now(),
    };
    let user = state.users.insert_user(user).await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::success("User created", user, Some(Meta::empty())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = match state.users.find_user_by_email(&email).await? {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(&user, &state.auth)?;
    tracing::info!(user_id = %user.id, "user logged in");

    let resp = LoginResponse {
        token,
        user: UserSummary {
            id: user.id,
            name: user.name,
            role: user.role,
        },
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}
