use serde::Serialize;
use utoipa::ToSchema;

/// 单个中奖者的通知/展示信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawnWinner {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

/// 一次成功开奖的结果摘要
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawSummary {
    /// 实际选出的中奖人数 (= min(计划名额, 参与人数))
    pub winners_count: i64,
    pub winners: Vec<DrawnWinner>,
}
