use std::collections::HashMap;

use crate::entities::{
    giveaway_entity as giveaways, participant_entity as participants, user_entity as users,
    winner_entity as winners,
};
use crate::error::{AppResult, DrawError};
use crate::models::{DrawSummary, DrawnWinner};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait, UpdateResult,
};

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 开奖
    ///
    /// 逻辑:
    /// 1. 事务内加载活动并校验守卫：未开过奖 (is_active 且无中奖记录)、
    ///    已到开奖时间、至少有一名参与者；任一守卫失败立即返回且无任何写入
    /// 2. 实际名额 = min(计划名额, 参与人数)
    /// 3. 从参与者中等概率无放回抽取
    /// 4. 原子翻转活动状态 (update where is_active = true)；并发开奖时
    ///    竞争失败方 rows_affected = 0，按已开奖处理并回滚
    /// 5. 写入中奖记录并提交；状态翻转与中奖写入要么同时生效要么都不生效
    /// 6. 返回中奖者的用户信息供调用方通知/展示
    pub async fn attempt_draw(&self, giveaway_id: i64) -> Result<DrawSummary, DrawError> {
        let txn = self.pool.begin().await?;

        let giveaway = giveaways::Entity::find_by_id(giveaway_id)
            .one(&txn)
            .await?
            .ok_or(DrawError::NotFound)?;

        if !giveaway.is_active {
            return Err(DrawError::AlreadyDrawn);
        }

        if Utc::now() < giveaway.draw_time {
            return Err(DrawError::DrawNotDue);
        }

        let participant_list = participants::Entity::find()
            .filter(participants::Column::GiveawayId.eq(giveaway_id))
            .all(&txn)
            .await?;

        if participant_list.is_empty() {
            return Err(DrawError::NoParticipants);
        }

        // 状态检查之外再确认无中奖记录，防御并发下的重复开奖
        let existing_winners = winners::Entity::find()
            .filter(winners::Column::GiveawayId.eq(giveaway_id))
            .count(&txn)
            .await?;

        if existing_winners > 0 {
            return Err(DrawError::AlreadyDrawn);
        }

        // 参与人数不足名额时所有参与者中奖
        let draw_count = (giveaway.winners_count.max(1) as usize).min(participant_list.len());

        // 等概率无放回抽样（部分 Fisher-Yates）
        let selected: Vec<&participants::Model> = {
            let mut rng = rand::thread_rng();
            rand::seq::index::sample(&mut rng, participant_list.len(), draw_count)
                .into_iter()
                .map(|i| &participant_list[i])
                .collect()
        };

        // 原子翻转：仅当仍为进行中才置为已结束，竞争失败说明另一次开奖已提交
        let update_result: UpdateResult = giveaways::Entity::update_many()
            .col_expr(giveaways::Column::IsActive, Expr::value(false))
            .filter(giveaways::Column::Id.eq(giveaway_id))
            .filter(giveaways::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        if update_result.rows_affected != 1 {
            return Err(DrawError::AlreadyDrawn);
        }

        let now = Utc::now();
        let prize_description = format!("Winner of giveaway '{}'", giveaway.title);

        let winner_rows: Vec<winners::ActiveModel> = selected
            .iter()
            .map(|p| winners::ActiveModel {
                participant_id: Set(p.id),
                giveaway_id: Set(giveaway_id),
                won_at: Set(Some(now)),
                prize_description: Set(Some(prize_description.clone())),
                ..Default::default()
            })
            .collect();

        winners::Entity::insert_many(winner_rows).exec(&txn).await?;

        // 提交前取出中奖用户信息
        let user_ids: Vec<i64> = selected.iter().map(|p| p.user_id).collect();
        let winner_users = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&txn)
            .await?;

        txn.commit().await?;

        let users_by_id: HashMap<i64, users::Model> =
            winner_users.into_iter().map(|u| (u.id, u)).collect();

        let drawn: Vec<DrawnWinner> = selected
            .iter()
            .filter_map(|p| users_by_id.get(&p.user_id))
            .map(|u| DrawnWinner {
                user_id: u.id,
                username: u.username.clone(),
                email: u.email.clone(),
            })
            .collect();

        log::info!(
            "Giveaway {} drawn, {} winners selected",
            giveaway_id,
            drawn.len()
        );

        Ok(DrawSummary {
            winners_count: drawn.len() as i64,
            winners: drawn,
        })
    }

    /// 扫描所有到期的进行中活动并逐个开奖（定时任务调用）
    /// 返回本轮成功开奖的活动数
    pub async fn sweep_due_giveaways(&self) -> AppResult<u64> {
        let due = giveaways::Entity::find()
            .filter(giveaways::Column::IsActive.eq(true))
            .filter(giveaways::Column::DrawTime.lte(Utc::now()))
            .all(&self.pool)
            .await?;

        let mut drawn = 0;
        for giveaway in due {
            match self.attempt_draw(giveaway.id).await {
                Ok(summary) => {
                    log::info!(
                        "Scheduled draw for giveaway {} selected {} winners",
                        giveaway.id,
                        summary.winners_count
                    );
                    drawn += 1;
                }
                // 手动开奖或上一轮扫描抢先完成，属于预期情况
                Err(DrawError::AlreadyDrawn | DrawError::NotFound) => {
                    log::debug!("Giveaway {} already drawn or gone, skipping", giveaway.id);
                }
                Err(DrawError::DrawNotDue) => {
                    log::debug!("Giveaway {} not due yet, skipping", giveaway.id);
                }
                Err(DrawError::NoParticipants) => {
                    log::debug!("Giveaway {} has no participants, skipping", giveaway.id);
                }
                // 仅持久化失败需要告警，下一轮扫描自动重试
                Err(DrawError::Persistence(e)) => {
                    log::error!("Failed to draw giveaway {}: {e:?}", giveaway.id);
                }
            }
        }

        Ok(drawn)
    }
}
