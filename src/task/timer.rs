// ============================================================================
// src/task/timer.rs - Tick-driven timer queue
// ============================================================================
#![allow(dead_code)]

use alloc::collections::BTreeMap;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use super::{Executor, Job};

/// ティック駆動のタイマーキュー（1ms単位）
///
/// カーネルのタイマー割り込み（の下半分）から `advance` を呼ぶと、
/// 期限に達したジョブを期限順に実行する。同一期限は投入順。
pub struct TimerQueue {
    /// 現在のティック
    ticks: AtomicU64,
    /// 投入順序（同一期限の並び替え用）
    seq: AtomicU64,
    /// 期限待ちジョブ (期限, 投入順) -> ジョブ
    queue: Mutex<BTreeMap<(u64, u64), Job>>,
}

impl TimerQueue {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            seq: AtomicU64::new(0),
            queue: Mutex::new(BTreeMap::new()),
        }
    }

    /// 現在のティック数を取得
    pub fn current_tick(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// 時間を進めて期限に達したジョブを実行し、実行数を返す
    pub fn advance(&self, ms: u64) -> usize {
        self.ticks.fetch_add(ms, Ordering::SeqCst);
        self.run_due()
    }

    /// 期限に達したジョブをすべて実行
    ///
    /// ジョブ実行中はキューのロックを保持しない（ジョブが再投入できるように）。
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        loop {
            let now = self.current_tick();
            let job = {
                let mut queue = self.queue.lock();
                match queue.keys().next().copied() {
                    Some(key) if key.0 <= now => queue.remove(&key),
                    _ => None,
                }
            };
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// 待機中のジョブ数
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// 次のジョブの期限
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.lock().keys().next().map(|k| k.0)
    }
}

impl Executor for TimerQueue {
    fn submit(&self, delay_ms: u64, job: Job) {
        let due = self.current_tick().saturating_add(delay_ms);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().insert((due, seq), job);
    }
}
