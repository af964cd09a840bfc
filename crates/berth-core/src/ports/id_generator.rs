//! IdGenerator port - task id 生成の抽象化
//!
//! テスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻をタイムスタンプ部に使う ULID ベース

use ulid::Ulid;

use crate::domain::{JobKey, TaskId};
use crate::ports::Clock;

/// IdGenerator は task id を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self, job: &JobKey, instance_id: u32) -> TaskId;
}

/// FixedClock を使えば timestamp 部分が決定的になる
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self, job: &JobKey, instance_id: u32) -> TaskId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        TaskId::for_instance(job, instance_id, ulid)
    }
}
