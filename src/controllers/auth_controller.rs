use bcrypt::{hash, verify, DEFAULT_COST};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::models::{user::User, Clock};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    repository: UserRepository,
    jwt: JwtConfig,
    clock: Arc<dyn Clock>,
}

impl AuthController {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            repository: UserRepository::new(state.pool.clone()),
            jwt: JwtConfig::from(&state.config),
            clock: state.clock.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<UserResponse>> {
        request.validate()?;

        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash,
            created_at: self.clock.now(),
        };
        let user = self.repository.create(&user).await?;
        info!("🔐 Usuario {} registrado", user.email);

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "User registered".to_string(),
        ))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let user = match self.repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("🔒 Login fallido para {}", email);
                return Err(AppError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;
        if !valid {
            warn!("🔒 Login fallido para {}", email);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = generate_token(user.id, &user.email, &self.jwt, self.clock.as_ref())?;
        info!("✅ Login correcto: {}", user.email);

        Ok(ApiResponse::success(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expiration,
            user: UserResponse::from(user),
        }))
    }
}
