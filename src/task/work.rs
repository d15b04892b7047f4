// ============================================================================
// src/task/work.rs - Work items with synchronous cancellation
// ============================================================================
//!
//! 遅延ワークアイテム。
//!
//! - 同時に保留できる投入は1つだけ (`schedule` は保留中なら false)
//! - 投入には世代番号が付き、キャンセル後に発火した古い投入は破棄される
//! - `cancel_sync` は実行中の発火が終わるまで待ち、保留中の投入を取り消す
//! - 同じワークが並行して2回実行されることはない

use alloc::boxed::Box;
use alloc::sync::Arc;
use spin::Mutex;

use super::Executor;

/// ワークの保留/実行状態
struct Slot {
    /// 保留中の投入の世代
    pending: Option<u64>,
    /// 実行中フラグ
    running: bool,
    /// 次に払い出す世代
    next_gen: u64,
    /// 完了した実行回数
    completed: u64,
}

struct WorkInner {
    name: &'static str,
    slot: Mutex<Slot>,
    func: Box<dyn Fn() + Send + Sync>,
    executor: Arc<dyn Executor>,
}

/// スケジュール可能なワークアイテム
pub struct Work {
    inner: Arc<WorkInner>,
}

impl Work {
    /// 新しいワークを作成（まだ投入しない）
    pub fn new<F>(name: &'static str, executor: Arc<dyn Executor>, func: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(WorkInner {
                name,
                slot: Mutex::new(Slot {
                    pending: None,
                    running: false,
                    next_gen: 0,
                    completed: 0,
                }),
                func: Box::new(func),
                executor,
            }),
        }
    }

    /// `delay_ms` 後に実行されるよう投入する
    ///
    /// 既に保留中なら何もせず false を返す。実行中の投入は可能
    /// (自己再スケジュール)。
    pub fn schedule(&self, delay_ms: u64) -> bool {
        let generation = {
            let mut slot = self.inner.slot.lock();
            if slot.pending.is_some() {
                return false;
            }
            let generation = slot.next_gen;
            slot.next_gen += 1;
            slot.pending = Some(generation);
            generation
        };
        submit(&self.inner, delay_ms, generation);
        true
    }

    /// 保留中の投入を取り消す（実行中の発火は待たない）
    pub fn cancel(&self) -> bool {
        self.inner.slot.lock().pending.take().is_some()
    }

    /// 保留中の投入を取り消し、実行中の発火の完了を待つ
    ///
    /// 戻り値は保留中の投入を取り消したかどうか。
    /// ワーク自身の中から呼んではならない（自分の完了を待ち続ける）。
    pub fn cancel_sync(&self) -> bool {
        let mut cancelled = false;
        loop {
            {
                let mut slot = self.inner.slot.lock();
                cancelled |= slot.pending.take().is_some();
                if !slot.running {
                    return cancelled;
                }
            }
            core::hint::spin_loop();
        }
    }

    /// 保留中かどうか
    pub fn is_pending(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    /// 実行中かどうか
    pub fn is_running(&self) -> bool {
        self.inner.slot.lock().running
    }

    /// 完了した実行回数
    pub fn completed(&self) -> u64 {
        self.inner.slot.lock().completed
    }
}

fn submit(inner: &Arc<WorkInner>, delay_ms: u64, generation: u64) {
    let target = inner.clone();
    inner
        .executor
        .submit(delay_ms, Box::new(move || fire(&target, generation)));
}

fn fire(inner: &Arc<WorkInner>, generation: u64) {
    {
        let mut slot = inner.slot.lock();
        if slot.pending != Some(generation) {
            log::trace!("work {}: stale firing (gen {})", inner.name, generation);
            return;
        }
        if slot.running {
            // 前回の実行がまだ終わっていない: 後で再試行
            drop(slot);
            submit(inner, 0, generation);
            return;
        }
        slot.pending = None;
        slot.running = true;
    }

    (inner.func)();

    let mut slot = inner.slot.lock();
    slot.running = false;
    slot.completed += 1;
}

impl Drop for Work {
    fn drop(&mut self) {
        // 投入済みジョブは WorkInner を保持し続けるので、発火しないようにする
        self.inner.slot.lock().pending = None;
    }
}
