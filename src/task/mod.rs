// ============================================================================
// src/task/mod.rs - Deferred Work and Timer Queue
// ============================================================================
//!
//! バックグラウンド実行機構。
//!
//! - `Executor` - ジョブ投入先 (システム管理のバックグラウンド実行機構)
//! - `timer` - ティック駆動のタイマーキュー (Executor 実装)
//! - `work` - 同期キャンセル付きのワークアイテム

use alloc::boxed::Box;

pub mod timer;
pub mod work;

pub use timer::TimerQueue;
pub use work::Work;

/// 投入されるジョブ
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// バックグラウンド実行機構
///
/// ジョブは `delay_ms` 経過後に一度だけ実行される。
/// 割り込みコンテキストでは実行されない。
pub trait Executor: Send + Sync {
    /// ジョブを投入
    fn submit(&self, delay_ms: u64, job: Job);
}
