//! 针对参与与开奖核心流程的集成测试
//! 使用共享缓存的内存 SQLite 跑真实迁移与服务逻辑

use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use std::collections::HashSet;

use giveaway_backend::entities::{
    giveaway_entity as giveaways, participant_entity as participants, user_entity as users,
    winner_entity as winners,
};
use giveaway_backend::error::{DrawError, JoinError};
use giveaway_backend::models::CreateGiveawayRequest;
use giveaway_backend::services::{DrawService, GiveawayService};

/// 每个测试使用独立命名的共享内存库，互不干扰
async fn setup(db_name: &str) -> DatabaseConnection {
    let url = format!("sqlite:file:{db_name}?mode=memory&cache=shared");
    let mut options = ConnectOptions::new(url);
    options.max_connections(5).sqlx_logging(false);

    let conn = Database::connect(options)
        .await
        .expect("failed to connect to sqlite");
    Migrator::up(&conn, None)
        .await
        .expect("failed to run migrations");
    conn
}

async fn insert_user(conn: &DatabaseConnection, username: &str) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("failed to insert user")
}

/// 直接写入活动记录，绕过创建校验（便于构造已到期的活动）
async fn insert_giveaway(
    conn: &DatabaseConnection,
    creator_id: i64,
    join_code: &str,
    draw_time: chrono::DateTime<Utc>,
    winners_count: i32,
    max_participants: Option<i32>,
) -> giveaways::Model {
    giveaways::ActiveModel {
        title: Set(format!("Giveaway {join_code}")),
        description: Set(String::new()),
        join_code: Set(join_code.to_string()),
        max_participants: Set(max_participants),
        draw_time: Set(draw_time),
        is_active: Set(true),
        winners_count: Set(winners_count),
        created_by: Set(creator_id),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("failed to insert giveaway")
}

async fn winner_rows(conn: &DatabaseConnection, giveaway_id: i64) -> Vec<winners::Model> {
    winners::Entity::find()
        .filter(winners::Column::GiveawayId.eq(giveaway_id))
        .all(conn)
        .await
        .expect("failed to load winners")
}

async fn participant_count(conn: &DatabaseConnection, giveaway_id: i64) -> u64 {
    participants::Entity::find()
        .filter(participants::Column::GiveawayId.eq(giveaway_id))
        .count(conn)
        .await
        .expect("failed to count participants")
}

#[tokio::test]
async fn test_draw_selects_all_when_quota_covers_participants() {
    let conn = setup("draw_all").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;
    let bob = insert_user(&conn, "bob").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "DRAWALL1",
        Utc::now() - Duration::minutes(1),
        2,
        None,
    )
    .await;

    // 开奖时间已过但直接写参与记录（join 会因报名截止而拒绝）
    for user in [&alice, &bob] {
        participants::ActiveModel {
            user_id: Set(user.id),
            giveaway_id: Set(giveaway.id),
            joined_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&conn)
        .await
        .unwrap();
    }

    let service = DrawService::new(conn.clone());
    let summary = service.attempt_draw(giveaway.id).await.unwrap();

    // k = min(2, 2) = 2，两人都中奖
    assert_eq!(summary.winners_count, 2);
    let usernames: HashSet<String> = summary.winners.iter().map(|w| w.username.clone()).collect();
    assert!(usernames.contains("alice"));
    assert!(usernames.contains("bob"));

    // 活动进入终态
    let reloaded = giveaways::Entity::find_by_id(giveaway.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert!(!reloaded.is_active);
    assert_eq!(winner_rows(&conn, giveaway.id).await.len(), 2);
}

#[tokio::test]
async fn test_draw_caps_winners_at_participant_count() {
    let conn = setup("draw_cap").await;
    let organizer = insert_user(&conn, "organizer").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "DRAWCAP1",
        Utc::now() - Duration::minutes(1),
        5,
        None,
    )
    .await;

    let mut expected_participants = HashSet::new();
    for i in 0..3 {
        let user = insert_user(&conn, &format!("player{i}")).await;
        let p = participants::ActiveModel {
            user_id: Set(user.id),
            giveaway_id: Set(giveaway.id),
            joined_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&conn)
        .await
        .unwrap();
        expected_participants.insert(p.id);
    }

    let service = DrawService::new(conn.clone());
    let summary = service.attempt_draw(giveaway.id).await.unwrap();

    // k = min(5, 3) = 3
    assert_eq!(summary.winners_count, 3);

    // 每个中奖记录指向本活动的不同参与者
    let rows = winner_rows(&conn, giveaway.id).await;
    assert_eq!(rows.len(), 3);
    let winner_participants: HashSet<i64> = rows.iter().map(|w| w.participant_id).collect();
    assert_eq!(winner_participants.len(), 3);
    assert!(winner_participants.is_subset(&expected_participants));
}

#[tokio::test]
async fn test_second_draw_returns_already_drawn() {
    let conn = setup("draw_twice").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "DRAWTWO1",
        Utc::now() - Duration::minutes(1),
        1,
        None,
    )
    .await;

    participants::ActiveModel {
        user_id: Set(alice.id),
        giveaway_id: Set(giveaway.id),
        joined_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&conn)
    .await
    .unwrap();

    let service = DrawService::new(conn.clone());
    service.attempt_draw(giveaway.id).await.unwrap();

    let second = service.attempt_draw(giveaway.id).await;
    assert!(matches!(second, Err(DrawError::AlreadyDrawn)));

    // 中奖名单没有被追加
    assert_eq!(winner_rows(&conn, giveaway.id).await.len(), 1);
}

#[tokio::test]
async fn test_draw_before_due_time_rejected() {
    let conn = setup("draw_early").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "DRAWSOON",
        Utc::now() + Duration::hours(1),
        1,
        None,
    )
    .await;

    participants::ActiveModel {
        user_id: Set(alice.id),
        giveaway_id: Set(giveaway.id),
        joined_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&conn)
    .await
    .unwrap();

    let service = DrawService::new(conn.clone());
    let result = service.attempt_draw(giveaway.id).await;
    assert!(matches!(result, Err(DrawError::DrawNotDue)));

    // 活动保持进行中，零写入
    let reloaded = giveaways::Entity::find_by_id(giveaway.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_active);
    assert!(winner_rows(&conn, giveaway.id).await.is_empty());
}

#[tokio::test]
async fn test_draw_without_participants_rejected() {
    let conn = setup("draw_empty").await;
    let organizer = insert_user(&conn, "organizer").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "DRAWNONE",
        Utc::now() - Duration::minutes(1),
        1,
        None,
    )
    .await;

    let service = DrawService::new(conn.clone());
    let result = service.attempt_draw(giveaway.id).await;
    assert!(matches!(result, Err(DrawError::NoParticipants)));

    // 活动保持进行中可重试
    let reloaded = giveaways::Entity::find_by_id(giveaway.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_active);
}

#[tokio::test]
async fn test_draw_unknown_giveaway_rejected() {
    let conn = setup("draw_missing").await;

    let service = DrawService::new(conn.clone());
    let result = service.attempt_draw(9999).await;
    assert!(matches!(result, Err(DrawError::NotFound)));
}

#[tokio::test]
async fn test_concurrent_draws_produce_single_winner_set() {
    let conn = setup("draw_race").await;
    let organizer = insert_user(&conn, "organizer").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "DRAWRACE",
        Utc::now() - Duration::minutes(1),
        2,
        None,
    )
    .await;

    for i in 0..4 {
        let user = insert_user(&conn, &format!("racer{i}")).await;
        participants::ActiveModel {
            user_id: Set(user.id),
            giveaway_id: Set(giveaway.id),
            joined_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&conn)
        .await
        .unwrap();
    }

    let service_a = DrawService::new(conn.clone());
    let service_b = DrawService::new(conn.clone());

    let (first, second) = tokio::join!(
        service_a.attempt_draw(giveaway.id),
        service_b.attempt_draw(giveaway.id)
    );

    // 恰好一次成功；竞争失败方得到"已开奖"或可重试的持久化失败
    let results = [first, second];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one draw must succeed");

    for result in &results {
        if let Err(e) = result {
            assert!(
                matches!(e, DrawError::AlreadyDrawn | DrawError::Persistence(_)),
                "loser must see AlreadyDrawn or a retryable persistence failure, got {e:?}"
            );
        }
    }

    // 只产生一份中奖名单
    assert_eq!(winner_rows(&conn, giveaway.id).await.len(), 2);
    let reloaded = giveaways::Entity::find_by_id(giveaway.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert!(!reloaded.is_active);
}

#[tokio::test]
async fn test_duplicate_join_rejected() {
    let conn = setup("join_dup").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "JOINDUP1",
        Utc::now() + Duration::hours(1),
        1,
        None,
    )
    .await;

    let service = GiveawayService::new(conn.clone());
    service.join(giveaway.id, alice.id).await.unwrap();

    let second = service.join(giveaway.id, alice.id).await;
    assert!(matches!(second, Err(JoinError::AlreadyJoined)));
    assert_eq!(participant_count(&conn, giveaway.id).await, 1);
}

#[tokio::test]
async fn test_join_capacity_boundary() {
    let conn = setup("join_cap").await;
    let organizer = insert_user(&conn, "organizer").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "JOINCAP1",
        Utc::now() + Duration::hours(1),
        1,
        Some(3),
    )
    .await;

    let service = GiveawayService::new(conn.clone());

    // 上限为3：第3个成功，第4个被拒
    for i in 0..3 {
        let user = insert_user(&conn, &format!("entrant{i}")).await;
        service.join(giveaway.id, user.id).await.unwrap();
    }

    let overflow_user = insert_user(&conn, "entrant3").await;
    let result = service.join(giveaway.id, overflow_user.id).await;
    assert!(matches!(result, Err(JoinError::CapacityReached)));
    assert_eq!(participant_count(&conn, giveaway.id).await, 3);
}

#[tokio::test]
async fn test_join_after_deadline_rejected() {
    let conn = setup("join_late").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "JOINLATE",
        Utc::now() - Duration::minutes(1),
        1,
        None,
    )
    .await;

    let service = GiveawayService::new(conn.clone());
    let result = service.join(giveaway.id, alice.id).await;
    assert!(matches!(result, Err(JoinError::RegistrationClosed)));
    assert_eq!(participant_count(&conn, giveaway.id).await, 0);
}

#[tokio::test]
async fn test_join_drawn_giveaway_rejected() {
    let conn = setup("join_drawn").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;
    let bob = insert_user(&conn, "bob").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "JOINDRWN",
        Utc::now() - Duration::minutes(1),
        1,
        None,
    )
    .await;

    participants::ActiveModel {
        user_id: Set(alice.id),
        giveaway_id: Set(giveaway.id),
        joined_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&conn)
    .await
    .unwrap();

    DrawService::new(conn.clone())
        .attempt_draw(giveaway.id)
        .await
        .unwrap();

    // 已开奖的活动永久关闭
    let service = GiveawayService::new(conn.clone());
    let result = service.join(giveaway.id, bob.id).await;
    assert!(matches!(result, Err(JoinError::RegistrationClosed)));
}

#[tokio::test]
async fn test_join_unknown_giveaway_rejected() {
    let conn = setup("join_missing").await;
    let alice = insert_user(&conn, "alice").await;

    let service = GiveawayService::new(conn.clone());
    let result = service.join(4242, alice.id).await;
    assert!(matches!(result, Err(JoinError::NotFound)));
}

#[tokio::test]
async fn test_join_by_code_resolves_giveaway() {
    let conn = setup("join_code").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;

    let giveaway = insert_giveaway(
        &conn,
        organizer.id,
        "CODEJOIN",
        Utc::now() + Duration::hours(1),
        1,
        None,
    )
    .await;

    let service = GiveawayService::new(conn.clone());

    // 加入码大小写不敏感（统一转大写）
    let (resolved, participant) = service.join_by_code(" codejoin ", alice.id).await.unwrap();
    assert_eq!(resolved.id, giveaway.id);
    assert_eq!(participant.giveaway_id, giveaway.id);
    assert_eq!(participant.user_id, alice.id);

    let unknown = service.join_by_code("NOSUCHCODE", alice.id).await;
    assert!(matches!(unknown, Err(JoinError::NotFound)));
}

#[tokio::test]
async fn test_create_giveaway_validations() {
    let conn = setup("create_checks").await;
    let organizer = insert_user(&conn, "organizer").await;
    let service = GiveawayService::new(conn.clone());

    // 名额必须 >= 1
    let zero_winners = service
        .create_giveaway(
            organizer.id,
            CreateGiveawayRequest {
                title: "Bad quota".to_string(),
                description: None,
                join_code: None,
                max_participants: None,
                draw_time: Utc::now() + Duration::hours(1),
                winners_count: Some(0),
            },
        )
        .await;
    assert!(zero_winners.is_err());

    // 开奖时间必须在未来
    let past_draw = service
        .create_giveaway(
            organizer.id,
            CreateGiveawayRequest {
                title: "Too late".to_string(),
                description: None,
                join_code: None,
                max_participants: None,
                draw_time: Utc::now() - Duration::hours(1),
                winners_count: Some(1),
            },
        )
        .await;
    assert!(past_draw.is_err());

    // 正常创建：自动生成的加入码为8位大写字母数字
    let created = service
        .create_giveaway(
            organizer.id,
            CreateGiveawayRequest {
                title: "Valid giveaway".to_string(),
                description: Some("prize".to_string()),
                join_code: None,
                max_participants: Some(10),
                draw_time: Utc::now() + Duration::hours(1),
                winners_count: Some(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.join_code.len(), 8);
    assert!(
        created
            .join_code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );
    assert!(created.is_active);
    assert!(created.is_creator);

    // 重复加入码被拒
    let duplicate_code = service
        .create_giveaway(
            organizer.id,
            CreateGiveawayRequest {
                title: "Duplicate code".to_string(),
                description: None,
                join_code: Some(created.join_code.clone()),
                max_participants: None,
                draw_time: Utc::now() + Duration::hours(1),
                winners_count: Some(1),
            },
        )
        .await;
    assert!(duplicate_code.is_err());
}

#[tokio::test]
async fn test_sweep_draws_due_giveaways_only() {
    let conn = setup("sweep").await;
    let organizer = insert_user(&conn, "organizer").await;
    let alice = insert_user(&conn, "alice").await;

    // 到期且有参与者 -> 开奖
    let due = insert_giveaway(
        &conn,
        organizer.id,
        "SWEEPDUE",
        Utc::now() - Duration::minutes(5),
        1,
        None,
    )
    .await;
    participants::ActiveModel {
        user_id: Set(alice.id),
        giveaway_id: Set(due.id),
        joined_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&conn)
    .await
    .unwrap();

    // 到期但无参与者 -> 跳过且保持进行中
    let empty = insert_giveaway(
        &conn,
        organizer.id,
        "SWEEPEMP",
        Utc::now() - Duration::minutes(5),
        1,
        None,
    )
    .await;

    // 未到期 -> 不处理
    let future = insert_giveaway(
        &conn,
        organizer.id,
        "SWEEPFUT",
        Utc::now() + Duration::hours(1),
        1,
        None,
    )
    .await;

    let service = DrawService::new(conn.clone());
    let drawn = service.sweep_due_giveaways().await.unwrap();
    assert_eq!(drawn, 1);

    let due_reloaded = giveaways::Entity::find_by_id(due.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert!(!due_reloaded.is_active);

    for (id, code) in [(empty.id, "SWEEPEMP"), (future.id, "SWEEPFUT")] {
        let reloaded = giveaways::Entity::find_by_id(id)
            .one(&conn)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.is_active, "{code} must remain active");
        assert!(winner_rows(&conn, id).await.is_empty());
    }

    // 再次扫描幂等：空活动依旧跳过，已开奖的不再计数
    let drawn_again = service.sweep_due_giveaways().await.unwrap();
    assert_eq!(drawn_again, 0);
}
