//! Shared application state.

use std::sync::Arc;

use crate::usecase::RoomCoordinator;

/// Shared application state
pub struct AppState {
    /// RoomCoordinator（接続イベントの振り分けと ChatHub への入口）
    pub coordinator: Arc<RoomCoordinator>,
}
