use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::utils::{JwtService, hash_password, validate_password, verify_password};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 注册新用户并直接签发令牌对
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_string();
        if username.len() < 2 || username.len() > 150 {
            return Err(AppError::ValidationError(
                "Username must be 2-150 characters".to_string(),
            ));
        }

        if request.password != request.password_confirm {
            return Err(AppError::ValidationError(
                "Passwords don't match".to_string(),
            ));
        }

        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username.clone()))
            .count(&self.pool)
            .await?;

        if existing > 0 {
            return Err(AppError::ValidationError(
                "Username is already taken".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        let inserted = users::ActiveModel {
            username: Set(username),
            email: Set(request.email.unwrap_or_default()),
            password_hash: Set(password_hash),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            // 唯一索引兜底：并发注册同名用户
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::ValidationError("Username is already taken".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        self.issue_tokens(inserted)
    }

    /// 用户名 + 密码登录
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        self.issue_tokens(user)
    }

    /// 用 refresh token 换取新的令牌对
    pub async fn refresh_token(&self, token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(token)?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.username)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}
