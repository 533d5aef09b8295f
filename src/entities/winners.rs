use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 中奖记录实体
/// 说明:
/// - giveaway_id 冗余存储（可由 participant 推出）方便按活动直接查询
/// - (participant_id, giveaway_id) 数据库层唯一；开奖是一次性的，记录不追加不删除
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "winners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 中奖参与记录ID
    pub participant_id: i64,
    /// 所属活动ID
    pub giveaway_id: i64,
    /// 中奖时间
    pub won_at: Option<DateTime<Utc>>,
    /// 奖品备注
    pub prize_description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
