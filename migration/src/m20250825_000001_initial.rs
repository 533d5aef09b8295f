use sea_orm_migration::prelude::*;

/// Users (注册用户)
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
}

/// Giveaways (抽奖活动表)
#[derive(DeriveIden)]
enum Giveaways {
    Table,
    Id,
    Title,
    Description,
    JoinCode,
    MaxParticipants,
    DrawTime,
    IsActive,
    WinnersCount,
    CreatedBy,
    CreatedAt,
}

/// Participants (参与记录)
#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    UserId,
    GiveawayId,
    JoinedAt,
}

/// Winners (中奖记录)
#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    ParticipantId,
    GiveawayId,
    WonAt,
    PrizeDescription,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 初始表结构:
/// - users: 用户名唯一
/// - giveaways: join_code 唯一; is_active=false 表示已开奖（终态）
/// - participants: (user_id, giveaway_id) 唯一，一个用户一个活动只能参与一次
/// - winners: (participant_id, giveaway_id) 唯一，一次开奖后不再追加
///
/// 时间默认值使用 CURRENT_TIMESTAMP（Postgres 与 SQLite 均支持）
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(254)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Users::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 用户名唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_username_unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 抽奖活动表
        manager
            .create_table(
                Table::create()
                    .table(Giveaways::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Giveaways::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Giveaways::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Giveaways::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Giveaways::JoinCode)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Giveaways::MaxParticipants)
                            .integer()
                            .null(), // NULL = 不限人数
                    )
                    .col(
                        ColumnDef::new(Giveaways::DrawTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Giveaways::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Giveaways::WinnersCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Giveaways::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Giveaways::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_giveaway_creator")
                            .from(Giveaways::Table, Giveaways::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 加入码唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_giveaways_join_code_unique")
                    .table(Giveaways::Table)
                    .col(Giveaways::JoinCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 定时开奖扫描用索引 (is_active + draw_time)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_giveaways_active_draw_time")
                    .table(Giveaways::Table)
                    .col(Giveaways::IsActive)
                    .col(Giveaways::DrawTime)
                    .to_owned(),
            )
            .await?;

        // 参与记录表
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::GiveawayId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_user")
                            .from(Participants::Table, Participants::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_giveaway")
                            .from(Participants::Table, Participants::GiveawayId)
                            .to(Giveaways::Table, Giveaways::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个用户在同一活动只能有一条参与记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_user_giveaway_unique")
                    .table(Participants::Table)
                    .col(Participants::UserId)
                    .col(Participants::GiveawayId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按活动查询参与者
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_giveaway")
                    .table(Participants::Table)
                    .col(Participants::GiveawayId)
                    .to_owned(),
            )
            .await?;

        // 中奖记录表
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Winners::ParticipantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Winners::GiveawayId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Winners::WonAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Winners::PrizeDescription).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winner_participant")
                            .from(Winners::Table, Winners::ParticipantId)
                            .to(Participants::Table, Participants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winner_giveaway")
                            .from(Winners::Table, Winners::GiveawayId)
                            .to(Giveaways::Table, Giveaways::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一参与者在一个活动最多中奖一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_participant_giveaway_unique")
                    .table(Winners::Table)
                    .col(Winners::ParticipantId)
                    .col(Winners::GiveawayId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按活动查询中奖者
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_giveaway")
                    .table(Winners::Table)
                    .col(Winners::GiveawayId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：中奖 -> 参与 -> 活动 -> 用户
        manager
            .drop_table(Table::drop().if_exists().table(Winners::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Participants::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Giveaways::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
