//! UseCase 層
//!
//! [`ChatHub`] が接続・ルーム・プレゼンスの状態を持ち、各ユースケースが
//! インバウンドイベント 1 種類ずつを処理する。[`RoomCoordinator`] がそれらへの
//! 振り分けを行い、[`LivenessSupervisor`] がハートビートで死活監視する。

pub mod broadcaster;
pub mod coordinator;
pub mod disconnect;
pub mod error;
pub mod hub;
pub mod join_room;
pub mod leave_room;
pub mod list_room;
pub mod liveness;
pub mod send_message;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcaster::Broadcaster;
pub use coordinator::RoomCoordinator;
pub use disconnect::DisconnectUseCase;
pub use error::CoordinatorError;
pub use hub::ChatHub;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_room::ListRoomUseCase;
pub use liveness::LivenessSupervisor;
pub use send_message::SendMessageUseCase;
