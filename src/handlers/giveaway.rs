use crate::models::*;
use crate::services::{DrawService, GiveawayService};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 从请求扩展中获取用户ID（中间件在鉴权后注入）
fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    post,
    path = "/giveaways",
    tag = "giveaway",
    request_body = CreateGiveawayRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建活动成功", body = GiveawayResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
/// 创建抽奖活动，创建者为当前用户
pub async fn create_giveaway(
    service: web::Data<GiveawayService>,
    req: HttpRequest,
    request: web::Json<CreateGiveawayRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.create_giveaway(user_id, request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/giveaways",
    tag = "giveaway",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("mine" = Option<bool>, Query, description = "true = 仅自己创建的活动")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动列表成功"),
        (status = 401, description = "未授权")
    )
)]
/// 活动列表：默认为进行中的活动，mine=true 时为自己创建的活动（含已开奖）
pub async fn list_giveaways(
    service: web::Data<GiveawayService>,
    req: HttpRequest,
    query: web::Query<GiveawayListQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.list_giveaways(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/my-participations",
    tag = "giveaway",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取参与过的活动成功"),
        (status = 401, description = "未授权")
    )
)]
/// 当前用户参与过的活动
pub async fn my_participations(
    service: web::Data<GiveawayService>,
    req: HttpRequest,
    query: web::Query<GiveawayListQuery>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.my_participations(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/giveaways/{id}",
    tag = "giveaway",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动详情成功", body = GiveawayResponse),
        (status = 404, description = "活动不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_giveaway(
    service: web::Data<GiveawayService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.get_giveaway(path.into_inner(), user_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/giveaways/join",
    tag = "giveaway",
    request_body = JoinByCodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "参与成功", body = JoinedResponse),
        (status = 400, description = "已参与/已满/报名截止"),
        (status = 404, description = "加入码无效"),
        (status = 401, description = "未授权")
    )
)]
/// 凭加入码参与活动
pub async fn join_by_code(
    service: web::Data<GiveawayService>,
    req: HttpRequest,
    request: web::Json<JoinByCodeRequest>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.join_by_code(&request.join_code, user_id).await {
        Ok((giveaway, participant)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": JoinedResponse::from(participant),
            "message": format!("Joined giveaway '{}'", giveaway.title)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/giveaways/{id}/join",
    tag = "giveaway",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "参与成功", body = JoinedResponse),
        (status = 400, description = "已参与/已满/报名截止"),
        (status = 404, description = "活动不存在"),
        (status = 401, description = "未授权")
    )
)]
/// 按活动ID参与
pub async fn join_giveaway(
    service: web::Data<GiveawayService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    match service.join(path.into_inner(), user_id).await {
        Ok(participant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": JoinedResponse::from(participant),
            "message": "Successfully joined the giveaway"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/giveaways/{id}/draw",
    tag = "giveaway",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开奖成功", body = DrawSummary),
        (status = 400, description = "未到开奖时间/已开奖/无参与者"),
        (status = 403, description = "仅创建者可手动开奖"),
        (status = 404, description = "活动不存在"),
        (status = 401, description = "未授权")
    )
)]
/// 手动开奖（仅活动创建者）。开奖逻辑与定时扫描共用同一入口，
/// 重复触发会得到"已开奖"的业务结果而不是重复的中奖名单
pub async fn draw_giveaway(
    giveaway_service: web::Data<GiveawayService>,
    draw_service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req).unwrap_or(0);
    let giveaway_id = path.into_inner();

    // 创建者校验属于接口层关注点，开奖核心只认活动ID
    let giveaway = match giveaway_service.get_giveaway(giveaway_id, user_id).await {
        Ok(g) => g,
        Err(e) => return Ok(e.error_response()),
    };

    if !giveaway.is_creator {
        return Ok(crate::error::AppError::PermissionDenied.error_response());
    }

    match draw_service.attempt_draw(giveaway_id).await {
        Ok(summary) => {
            let message = format!("Draw completed, {} winners selected", summary.winners_count);
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": summary,
                "message": message
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/giveaways/{id}/participants",
    tag = "giveaway",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取参与者列表成功", body = [ParticipantResponse]),
        (status = 404, description = "活动不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_participants(
    service: web::Data<GiveawayService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.list_participants(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/giveaways/{id}/winners",
    tag = "giveaway",
    params(
        ("id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取中奖者列表成功", body = [WinnerResponse]),
        (status = 404, description = "活动不存在"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_winners(
    service: web::Data<GiveawayService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.list_winners(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn giveaway_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/giveaways")
            // 静态段路由需先于 {id} 注册
            .route("/join", web::post().to(join_by_code))
            .route("", web::post().to(create_giveaway))
            .route("", web::get().to(list_giveaways))
            .route("/{id}", web::get().to(get_giveaway))
            .route("/{id}/join", web::post().to(join_giveaway))
            .route("/{id}/draw", web::post().to(draw_giveaway))
            .route("/{id}/participants", web::get().to(get_participants))
            .route("/{id}/winners", web::get().to(get_winners)),
    )
    .route("/my-participations", web::get().to(my_participations));
}
