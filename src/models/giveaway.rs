use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{giveaway_entity as giveaways, participant_entity as participants};
use crate::models::UserSummary;

/// 创建抽奖活动请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateGiveawayRequest {
    #[schema(example = "iPhone 15 Giveaway")]
    pub title: String,
    #[schema(example = "Win a brand new iPhone 15!")]
    pub description: Option<String>,
    /// 加入码；不传则自动生成
    #[schema(example = "IPHONE2025")]
    pub join_code: Option<String>,
    /// 人数上限；不传表示不限
    pub max_participants: Option<i32>,
    /// 开奖时间（UTC，必须在未来）
    pub draw_time: DateTime<Utc>,
    /// 中奖名额 (>=1，默认 1)
    pub winners_count: Option<i32>,
}

/// 活动列表查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GiveawayListQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
    /// true = 仅看自己创建的活动（包含已开奖的）
    pub mine: Option<bool>,
}

/// 凭加入码参与活动
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct JoinByCodeRequest {
    #[schema(example = "IPHONE2025")]
    pub join_code: String,
}

/// 活动详情响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GiveawayResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub join_code: String,
    pub max_participants: Option<i32>,
    pub draw_time: DateTime<Utc>,
    pub is_active: bool,
    pub winners_count: i32,
    pub created_by: i64,
    pub created_at: Option<DateTime<Utc>>,
    /// 当前参与人数
    pub participants_count: i64,
    /// 当前用户是否已参与
    pub is_joined: bool,
    /// 当前用户是否为创建者
    pub is_creator: bool,
}

impl GiveawayResponse {
    pub fn from_model(
        m: giveaways::Model,
        participants_count: i64,
        is_joined: bool,
        requester_id: i64,
    ) -> Self {
        let is_creator = m.created_by == requester_id;
        GiveawayResponse {
            id: m.id,
            title: m.title,
            description: m.description,
            join_code: m.join_code,
            max_participants: m.max_participants,
            draw_time: m.draw_time,
            is_active: m.is_active,
            winners_count: m.winners_count,
            created_by: m.created_by,
            created_at: m.created_at,
            participants_count,
            is_joined,
            is_creator,
        }
    }
}

/// 参与成功响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinedResponse {
    pub participant_id: i64,
    pub giveaway_id: i64,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<participants::Model> for JoinedResponse {
    fn from(m: participants::Model) -> Self {
        JoinedResponse {
            participant_id: m.id,
            giveaway_id: m.giveaway_id,
            joined_at: m.joined_at,
        }
    }
}

/// 参与者列表项
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub user: UserSummary,
    pub joined_at: Option<DateTime<Utc>>,
}

/// 中奖者列表项
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerResponse {
    pub id: i64,
    pub participant_id: i64,
    pub user: UserSummary,
    pub won_at: Option<DateTime<Utc>>,
    pub prize_description: Option<String>,
}
