//! 방 관리 핸들러

use crate::error::AppError;
use crate::identity::RequestingUser;
use crate::protocol::{
    AdminRoom, CreateRoomRequest, JoinResult, PresenceSnapshot, RoomSummary, RoomsResponse,
    SuccessResponse, UpdateRoomRequest,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// 사용자에게 보이는 방 목록
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    user: RequestingUser,
) -> Result<Json<RoomsResponse<RoomSummary>>, AppError> {
    let rooms = state.reconciler.list_rooms(&user).await?;
    Ok(Json(RoomsResponse { rooms }))
}

/// 관리 화면 목록
pub async fn admin_rooms(
    State(state): State<Arc<AppState>>,
    user: RequestingUser,
) -> Result<Json<RoomsResponse<AdminRoom>>, AppError> {
    let rooms = state.reconciler.admin_rooms(&user).await?;
    Ok(Json(RoomsResponse { rooms }))
}

/// 방 입장 토큰 발급
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    user: RequestingUser,
) -> Result<Json<JoinResult>, AppError> {
    let result = state.reconciler.join_room(&room_id, &user).await?;
    Ok(Json(result))
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    user: RequestingUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<AdminRoom>, AppError> {
    let room = state.reconciler.create_room(request, &user).await?;
    Ok(Json(state.reconciler.room_detail(room)))
}

pub async fn update_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    user: RequestingUser,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<AdminRoom>, AppError> {
    let room = state.reconciler.update_room(&room_id, request, &user).await?;
    Ok(Json(state.reconciler.room_detail(room)))
}

pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    user: RequestingUser,
) -> Result<Json<SuccessResponse>, AppError> {
    state.reconciler.delete_room(&room_id, &user).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn room_presence(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    user: RequestingUser,
) -> Result<Json<PresenceSnapshot>, AppError> {
    let snapshot = state.reconciler.room_presence(&room_id, &user).await?;
    Ok(Json(snapshot))
}
