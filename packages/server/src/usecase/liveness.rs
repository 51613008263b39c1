//! LivenessSupervisor: ハートビートによる接続の死活監視
//!
//! 一定間隔で全接続を走査する。前回のプローブに応答しなかった接続は
//! 強制的にクローズし、通常の切断と同じ後片付けを行う。それ以外の接続には
//! 新しいプローブ（Ping）を送る。

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time};

use crate::domain::HeartbeatSweep;

use super::coordinator::RoomCoordinator;

pub struct LivenessSupervisor {
    coordinator: Arc<RoomCoordinator>,
    period: Duration,
}

impl LivenessSupervisor {
    pub fn new(coordinator: Arc<RoomCoordinator>, period: Duration) -> Self {
        Self {
            coordinator,
            period,
        }
    }

    /// 1 回分の走査
    pub async fn sweep(&self) -> HeartbeatSweep {
        let sweep = self.coordinator.hub().registry().sweep_heartbeat().await;
        for connection_id in &sweep.evicted {
            tracing::info!(
                "Connection '{}' missed a heartbeat, closing",
                connection_id
            );
            self.coordinator.disconnect(connection_id).await;
        }
        if sweep.probed > 0 || !sweep.evicted.is_empty() {
            tracing::debug!(
                "Heartbeat sweep: probed {}, evicted {}",
                sweep.probed,
                sweep.evicted.len()
            );
        }
        sweep
    }

    /// バックグラウンドで走査を繰り返す
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + self.period, self.period);
            loop {
                interval.tick().await;
                self.sweep().await;
            }
        })
    }
}
