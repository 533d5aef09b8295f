use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖活动实体
/// 说明:
/// - join_code 为参与者加入活动使用的唯一码（大写字母+数字）
/// - is_active=false 表示已开奖，该状态为终态，不可重新开启
/// - max_participants 为 NULL 表示不限人数
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "giveaways")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 活动标题
    pub title: String,
    /// 活动描述（可为空字符串）
    pub description: String,
    /// 加入码（唯一）
    pub join_code: String,
    /// 人数上限 (NULL = 不限)
    pub max_participants: Option<i32>,
    /// 开奖时间（同时是报名截止时间）
    pub draw_time: DateTime<Utc>,
    /// 是否进行中
    pub is_active: bool,
    /// 计划中奖人数 (>=1)
    pub winners_count: i32,
    /// 创建者用户ID
    pub created_by: i64,
    /// 创建时间
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
