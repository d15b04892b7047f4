// ============================================================================
// src/io/audio/hda/jack.rs - Jack Poll Task
// ============================================================================
//!
//! ジャック検出ポーリング。
//!
//! 割り込みによるジャック通知を取りこぼした場合の保険として、
//! 電源の落ちているコーデックだけを一時的に起こしてジャック状態を読む。
//! Running 以外では何もせず、再投入もしない。シャットダウン後も同様。
//!
//! コーデックを触っている間は電源参照を保持するので、その間の
//! ランタイムサスペンドは `Busy` で拒否される。

use core::sync::atomic::Ordering;
use log::trace;

use super::controller::HdaController;
use super::types::LifecycleState;

impl HdaController {
    pub(super) fn jack_poll(&self) {
        // 状態確認と参照取得はランタイムサスペンドの idle 判定と同じロック下で行う
        {
            let _hw = self.hw.lock();
            if self.is_shut_down() || self.state() != LifecycleState::Running {
                trace!("hda: stale jack poll in state {}", self.state());
                return;
            }
            self.pm.get();
        }

        for codec in self.engine.codecs() {
            // 電源が入っているコーデックは別経路で更新される
            if codec.is_powered() {
                continue;
            }
            codec.power_up();
            codec.mark_jacks_dirty();
            codec.poll_jacks();
            codec.power_down();
        }

        self.pm.put();
        if self.is_shut_down() {
            trace!("hda: jack poll not rearmed after shutdown");
            return;
        }
        self.jack_work.schedule(self.config.jack_poll_interval_ms);
    }

    pub(super) fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}
