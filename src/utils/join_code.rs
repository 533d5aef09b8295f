use crate::entities::giveaway_entity as giveaways;
use crate::error::{AppError, AppResult};
use rand::Rng;
use regex::Regex;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

const JOIN_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const JOIN_CODE_LEN: usize = 8;

/// 生成8位大写字母+数字的加入码（不保证唯一）
pub fn generate_join_code() -> String {
    let mut rng = rand::thread_rng();
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_CHARS[rng.gen_range(0..JOIN_CODE_CHARS.len())] as char)
        .collect()
}

/// 生成唯一的加入码（对 giveaways 表查重）
pub async fn generate_unique_join_code<C: sea_orm::ConnectionTrait>(conn: &C) -> AppResult<String> {
    loop {
        let code = generate_join_code();

        let exists = giveaways::Entity::find()
            .filter(giveaways::Column::JoinCode.eq(code.clone()))
            .count(conn)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
    }
}

/// 校验用户自定义加入码：4-20位大写字母或数字
pub fn validate_join_code(code: &str) -> AppResult<()> {
    let code_regex = Regex::new(r"^[A-Z0-9]{4,20}$").unwrap();

    if !code_regex.is_match(code) {
        return Err(AppError::ValidationError(
            "Join code must be 4-20 uppercase letters or digits".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_join_code() {
        let code = generate_join_code();
        assert_eq!(code.len(), JOIN_CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generated_code_passes_validation() {
        let code = generate_join_code();
        assert!(validate_join_code(&code).is_ok());
    }

    #[test]
    fn test_validate_join_code() {
        assert!(validate_join_code("IPHONE2025").is_ok());
        assert!(validate_join_code("ABCD").is_ok());
        assert!(validate_join_code("abc123").is_err()); // 小写
        assert!(validate_join_code("AB").is_err()); // 太短
        assert!(validate_join_code("CODE WITH SPACE").is_err());
        assert!(validate_join_code("").is_err());
    }
}
