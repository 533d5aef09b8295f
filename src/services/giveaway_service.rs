use std::collections::{HashMap, HashSet};

use crate::entities::{
    giveaway_entity as giveaways, participant_entity as participants, user_entity as users,
    winner_entity as winners,
};
use crate::error::{AppError, AppResult, JoinError};
use crate::models::{
    CreateGiveawayRequest, GiveawayListQuery, GiveawayResponse, PaginatedResponse,
    PaginationParams, ParticipantResponse, UserSummary, WinnerResponse,
};
use crate::utils::{generate_unique_join_code, validate_join_code};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct GiveawayService {
    pool: DatabaseConnection,
}

impl GiveawayService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建抽奖活动
    /// 校验: 标题非空、开奖时间在未来、名额 >= 1、人数上限 >= 1（若设置）；
    /// 未提供加入码时自动生成唯一码
    pub async fn create_giveaway(
        &self,
        creator_id: i64,
        request: CreateGiveawayRequest,
    ) -> AppResult<GiveawayResponse> {
        let title = request.title.trim().to_string();
        if title.is_empty() || title.len() > 200 {
            return Err(AppError::ValidationError(
                "Title must be 1-200 characters".to_string(),
            ));
        }

        let winners_count = request.winners_count.unwrap_or(1);
        if winners_count < 1 {
            return Err(AppError::ValidationError(
                "Winners count must be at least 1".to_string(),
            ));
        }

        if let Some(cap) = request.max_participants {
            if cap < 1 {
                return Err(AppError::ValidationError(
                    "Participant limit must be at least 1".to_string(),
                ));
            }
        }

        if request.draw_time <= Utc::now() {
            return Err(AppError::ValidationError(
                "Draw time must be in the future".to_string(),
            ));
        }

        let join_code = match &request.join_code {
            Some(code) => {
                let code = code.trim().to_uppercase();
                validate_join_code(&code)?;

                let taken = giveaways::Entity::find()
                    .filter(giveaways::Column::JoinCode.eq(code.clone()))
                    .count(&self.pool)
                    .await?;
                if taken > 0 {
                    return Err(AppError::ValidationError(
                        "Join code is already in use".to_string(),
                    ));
                }
                code
            }
            None => generate_unique_join_code(&self.pool).await?,
        };

        let inserted = giveaways::ActiveModel {
            title: Set(title),
            description: Set(request.description.unwrap_or_default()),
            join_code: Set(join_code),
            max_participants: Set(request.max_participants),
            draw_time: Set(request.draw_time),
            is_active: Set(true),
            winners_count: Set(winners_count),
            created_by: Set(creator_id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(GiveawayResponse::from_model(inserted, 0, false, creator_id))
    }

    /// 活动列表（分页）
    /// mine=false: 所有进行中的活动; mine=true: 自己创建的活动（含已开奖）
    pub async fn list_giveaways(
        &self,
        requester_id: i64,
        query: &GiveawayListQuery,
    ) -> AppResult<PaginatedResponse<GiveawayResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = if query.mine.unwrap_or(false) {
            giveaways::Entity::find().filter(giveaways::Column::CreatedBy.eq(requester_id))
        } else {
            giveaways::Entity::find().filter(giveaways::Column::IsActive.eq(true))
        };

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(giveaways::Column::CreatedAt, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let responses = self.build_responses(items, requester_id).await?;

        Ok(PaginatedResponse::new(
            responses,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 当前用户参与过的活动（分页）
    pub async fn my_participations(
        &self,
        requester_id: i64,
        query: &GiveawayListQuery,
    ) -> AppResult<PaginatedResponse<GiveawayResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let joined_ids: Vec<i64> = participants::Entity::find()
            .filter(participants::Column::UserId.eq(requester_id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| p.giveaway_id)
            .collect();

        if joined_ids.is_empty() {
            return Ok(PaginatedResponse::new(
                vec![],
                params.get_page(),
                params.get_page_size(),
                0,
            ));
        }

        let base_query =
            giveaways::Entity::find().filter(giveaways::Column::Id.is_in(joined_ids));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(giveaways::Column::CreatedAt, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let responses = self.build_responses(items, requester_id).await?;

        Ok(PaginatedResponse::new(
            responses,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 活动详情（带参与人数与当前用户视角字段）
    pub async fn get_giveaway(
        &self,
        giveaway_id: i64,
        requester_id: i64,
    ) -> AppResult<GiveawayResponse> {
        let giveaway = giveaways::Entity::find_by_id(giveaway_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Giveaway not found".to_string()))?;

        let responses = self.build_responses(vec![giveaway], requester_id).await?;
        responses
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InternalError("Giveaway response missing".to_string()))
    }

    /// 参与活动（核心守卫全部在同一事务内评估）:
    /// 1. 活动存在
    /// 2. 活动进行中且未到开奖时间（报名截止即开奖时间）
    /// 3. 当前用户未参与过
    /// 4. 未达人数上限（若设置）
    /// (user_id, giveaway_id) 唯一索引兜底并发下的重复加入
    pub async fn join(
        &self,
        giveaway_id: i64,
        user_id: i64,
    ) -> Result<participants::Model, JoinError> {
        let txn = self.pool.begin().await?;

        let giveaway = giveaways::Entity::find_by_id(giveaway_id)
            .one(&txn)
            .await?
            .ok_or(JoinError::NotFound)?;

        if !giveaway.is_active {
            return Err(JoinError::RegistrationClosed);
        }

        if Utc::now() >= giveaway.draw_time {
            return Err(JoinError::RegistrationClosed);
        }

        let already_joined = participants::Entity::find()
            .filter(participants::Column::UserId.eq(user_id))
            .filter(participants::Column::GiveawayId.eq(giveaway_id))
            .count(&txn)
            .await?;

        if already_joined > 0 {
            return Err(JoinError::AlreadyJoined);
        }

        if let Some(cap) = giveaway.max_participants {
            let current = participants::Entity::find()
                .filter(participants::Column::GiveawayId.eq(giveaway_id))
                .count(&txn)
                .await?;

            if current >= cap as u64 {
                return Err(JoinError::CapacityReached);
            }
        }

        let inserted = participants::ActiveModel {
            user_id: Set(user_id),
            giveaway_id: Set(giveaway_id),
            joined_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            // 唯一索引兜底：并发重复加入按 AlreadyJoined 返回
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                JoinError::AlreadyJoined
            } else {
                JoinError::Persistence(e)
            }
        })?;

        txn.commit().await?;

        Ok(inserted)
    }

    /// 凭加入码参与活动；返回活动与新建的参与记录
    pub async fn join_by_code(
        &self,
        join_code: &str,
        user_id: i64,
    ) -> Result<(giveaways::Model, participants::Model), JoinError> {
        let code = join_code.trim().to_uppercase();

        let giveaway = giveaways::Entity::find()
            .filter(giveaways::Column::JoinCode.eq(code))
            .one(&self.pool)
            .await?
            .ok_or(JoinError::NotFound)?;

        let participant = self.join(giveaway.id, user_id).await?;
        Ok((giveaway, participant))
    }

    /// 活动参与者列表（带用户信息）
    pub async fn list_participants(
        &self,
        giveaway_id: i64,
    ) -> AppResult<Vec<ParticipantResponse>> {
        self.ensure_exists(giveaway_id).await?;

        let participant_list = participants::Entity::find()
            .filter(participants::Column::GiveawayId.eq(giveaway_id))
            .order_by(participants::Column::JoinedAt, Order::Asc)
            .all(&self.pool)
            .await?;

        let users_by_id = self
            .load_users(participant_list.iter().map(|p| p.user_id).collect())
            .await?;

        Ok(participant_list
            .into_iter()
            .filter_map(|p| {
                users_by_id.get(&p.user_id).map(|u| ParticipantResponse {
                    id: p.id,
                    user: UserSummary::from(u),
                    joined_at: p.joined_at,
                })
            })
            .collect())
    }

    /// 活动中奖者列表（带用户信息）
    pub async fn list_winners(&self, giveaway_id: i64) -> AppResult<Vec<WinnerResponse>> {
        self.ensure_exists(giveaway_id).await?;

        let winner_list = winners::Entity::find()
            .filter(winners::Column::GiveawayId.eq(giveaway_id))
            .all(&self.pool)
            .await?;

        let participant_ids: Vec<i64> = winner_list.iter().map(|w| w.participant_id).collect();
        let participant_list = participants::Entity::find()
            .filter(participants::Column::Id.is_in(participant_ids))
            .all(&self.pool)
            .await?;
        let participants_by_id: HashMap<i64, participants::Model> = participant_list
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let users_by_id = self
            .load_users(participants_by_id.values().map(|p| p.user_id).collect())
            .await?;

        Ok(winner_list
            .into_iter()
            .filter_map(|w| {
                let participant = participants_by_id.get(&w.participant_id)?;
                let user = users_by_id.get(&participant.user_id)?;
                Some(WinnerResponse {
                    id: w.id,
                    participant_id: w.participant_id,
                    user: UserSummary::from(user),
                    won_at: w.won_at,
                    prize_description: w.prize_description,
                })
            })
            .collect())
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn ensure_exists(&self, giveaway_id: i64) -> AppResult<giveaways::Model> {
        giveaways::Entity::find_by_id(giveaway_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Giveaway not found".to_string()))
    }

    async fn load_users(&self, ids: Vec<i64>) -> AppResult<HashMap<i64, users::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let list = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(|u| (u.id, u)).collect())
    }

    /// 批量补齐 participants_count / is_joined / is_creator
    async fn build_responses(
        &self,
        items: Vec<giveaways::Model>,
        requester_id: i64,
    ) -> AppResult<Vec<GiveawayResponse>> {
        if items.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = items.iter().map(|g| g.id).collect();
        let participant_rows = participants::Entity::find()
            .filter(participants::Column::GiveawayId.is_in(ids))
            .all(&self.pool)
            .await?;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        let mut joined: HashSet<i64> = HashSet::new();
        for row in &participant_rows {
            *counts.entry(row.giveaway_id).or_insert(0) += 1;
            if row.user_id == requester_id {
                joined.insert(row.giveaway_id);
            }
        }

        Ok(items
            .into_iter()
            .map(|g| {
                let count = counts.get(&g.id).copied().unwrap_or(0);
                let is_joined = joined.contains(&g.id);
                GiveawayResponse::from_model(g, count, is_joined, requester_id)
            })
            .collect())
    }
}
