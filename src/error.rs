use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// 加入活动的业务失败原因（守卫未通过时不产生任何写入）
#[derive(Error, Debug)]
pub enum JoinError {
    #[error("Giveaway not found")]
    NotFound,

    #[error("Already joined this giveaway")]
    AlreadyJoined,

    #[error("Participant limit reached")]
    CapacityReached,

    #[error("Registration is closed")]
    RegistrationClosed,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] sea_orm::DbErr),
}

/// 开奖的业务失败原因
/// 除 Persistence 外均为预期结果（调度器按"尚未就绪/已完成"处理），
/// Persistence 表示事务未能提交，可安全重试
#[derive(Error, Debug)]
pub enum DrawError {
    #[error("Giveaway not found")]
    NotFound,

    #[error("Giveaway already drawn")]
    AlreadyDrawn,

    #[error("Draw time has not been reached")]
    DrawNotDue,

    #[error("No participants to draw from")]
    NoParticipants,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] sea_orm::DbErr),
}

fn error_json(code: &str, message: &str) -> serde_json::Value {
    json!({
        "success": false,
        "error": {
            "code": code,
            "message": message
        }
    })
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Permission denied".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(error_json(error_code, &message))
    }
}

impl ResponseError for JoinError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            JoinError::NotFound => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            JoinError::AlreadyJoined => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "ALREADY_JOINED",
                self.to_string(),
            ),
            JoinError::CapacityReached => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "CAPACITY_REACHED",
                self.to_string(),
            ),
            JoinError::RegistrationClosed => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "REGISTRATION_CLOSED",
                self.to_string(),
            ),
            JoinError::Persistence(err) => {
                log::error!("Join persistence failure: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILURE",
                    "Persistence failure".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(error_json(error_code, &message))
    }
}

impl ResponseError for DrawError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            DrawError::NotFound => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            DrawError::AlreadyDrawn => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "ALREADY_DRAWN",
                self.to_string(),
            ),
            DrawError::DrawNotDue => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "DRAW_NOT_DUE",
                self.to_string(),
            ),
            DrawError::NoParticipants => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "NO_PARTICIPANTS",
                self.to_string(),
            ),
            DrawError::Persistence(err) => {
                log::error!("Draw persistence failure: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILURE",
                    "Persistence failure".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(error_json(error_code, &message))
    }
}
