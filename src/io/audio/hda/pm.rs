// ============================================================================
// src/io/audio/hda/pm.rs - System Sleep and Runtime PM Transitions
// ============================================================================
//!
//! 電源遷移。
//!
//! - システムスリープ: ジャックポーリングを止め、ランタイムサスペンドを
//!   強制実行して D3hot を記録する
//! - ランタイムサスペンド: 起動済みならウェイク有効化、チップ停止、
//!   リンクリセット。その後クロックを止める
//! - ランタイムレジューム: クロックを戻し、起動済みならブリングアップと
//!   チップ再初期化

use core::mem;
use log::{debug, warn};

use crate::error::{HdaError, HdaResult, ResourceKind};
use crate::power::DevicePowerState;

use super::super::regs::*;
use super::bringup;
use super::controller::{HdaController, HwState};
use super::types::LifecycleState;

impl HdaController {
    // ========================================================================
    // System Sleep
    // ========================================================================

    /// システムスリープ
    ///
    /// 既にサスペンド済みなら何もしない。
    pub fn suspend(&self) -> HdaResult<()> {
        if self.state() == LifecycleState::SystemSuspended {
            return Ok(());
        }
        // 遅延初期化タスクは完了時にジャックポーリングを投入するので先に待つ
        let parked = self.probe_work.cancel_sync();
        self.jack_work.cancel_sync();

        let mut hw = self.hw.lock();
        let state = self.state();
        match state {
            LifecycleState::Probing
            | LifecycleState::Running
            | LifecycleState::RuntimeSuspended => {}
            _ => {
                debug!("hda: system suspend ignored in state {}", state);
                return Ok(());
            }
        }

        if state != LifecycleState::RuntimeSuspended {
            self.power_down_locked(&mut hw);
        }
        hw.wake_to = Some(state);
        hw.deferred_parked = parked;
        self.report_power_state(&mut hw, DevicePowerState::D3Hot);
        self.set_state(LifecycleState::SystemSuspended);
        Ok(())
    }

    /// システムレジューム
    ///
    /// クロック有効化に失敗した場合は SystemSuspended のまま
    /// エラーを返す。
    pub fn resume(&self) -> HdaResult<()> {
        let mut hw = self.hw.lock();
        if self.state() != LifecycleState::SystemSuspended {
            return Ok(());
        }

        let target = hw.wake_to.unwrap_or(LifecycleState::Running);
        if target != LifecycleState::RuntimeSuspended {
            self.power_up_locked(&mut hw)?;
        }
        hw.wake_to = None;
        self.report_power_state(&mut hw, DevicePowerState::D0);
        self.set_state(target);
        let parked = mem::take(&mut hw.deferred_parked);
        drop(hw);

        if target == LifecycleState::Running {
            self.jack_work.schedule(self.config.jack_poll_interval_ms);
        }
        if parked {
            self.probe_work.schedule(self.config.probe_delay_ms);
        }
        Ok(())
    }

    // ========================================================================
    // Runtime PM
    // ========================================================================

    /// ランタイムサスペンド (アイドル時)
    ///
    /// 電源参照が保持されていれば `Busy`。
    pub fn runtime_suspend(&self) -> HdaResult<()> {
        let mut hw = self.hw.lock();
        let state = self.state();
        match state {
            LifecycleState::Probing | LifecycleState::Running => {}
            _ => return Ok(()),
        }
        if !self.pm.is_enabled() {
            debug!("hda: runtime pm disabled");
            return Ok(());
        }
        if !self.pm.is_idle() {
            debug!("hda: runtime suspend refused, usage {}", self.pm.usage());
            return Err(HdaError::Busy);
        }

        self.power_down_locked(&mut hw);
        hw.resume_to = Some(state);
        self.set_state(LifecycleState::RuntimeSuspended);
        Ok(())
    }

    /// ランタイムレジューム
    ///
    /// クロック有効化に失敗した場合は RuntimeSuspended のまま
    /// `ResourceUnavailable` を返す。
    pub fn runtime_resume(&self) -> HdaResult<()> {
        let mut hw = self.hw.lock();
        if self.state() != LifecycleState::RuntimeSuspended {
            return Ok(());
        }
        let target = self.runtime_resume_locked(&mut hw)?;
        drop(hw);

        if target == LifecycleState::Running {
            self.jack_work.schedule(self.config.jack_poll_interval_ms);
        }
        Ok(())
    }

    /// 電源参照を取得する (ストリームオープン等)
    ///
    /// ランタイムサスペンド中なら同期的に復帰する。復帰に失敗した場合は
    /// 参照を戻してエラーを返す。
    pub fn runtime_get(&self) -> HdaResult<()> {
        self.pm.get();
        self.runtime_resume().inspect_err(|_| {
            self.pm.put();
        })
    }

    pub fn runtime_put(&self) {
        self.pm.put();
    }

    /// RuntimeSuspended から復帰し、戻った状態を返す
    pub(super) fn runtime_resume_locked(&self, hw: &mut HwState) -> HdaResult<LifecycleState> {
        self.power_up_locked(hw)?;
        let fallback = if hw.running {
            LifecycleState::Running
        } else {
            LifecycleState::Probing
        };
        let target = hw.resume_to.take().unwrap_or(fallback);
        self.set_state(target);
        Ok(target)
    }

    // ========================================================================
    // Hardware power sequencing
    // ========================================================================

    /// 起動済みならチップを止めてからクロックを止める（常に成功）
    pub(super) fn power_down_locked(&self, hw: &mut HwState) {
        if hw.running && hw.chip_initialized {
            if let Some(regs) = &hw.regs {
                regs.update16(REG_WAKEEN, 0, STATESTS_INT_MASK);
            }
            self.engine.stop_chip();
            self.engine.enter_link_reset();
            hw.chip_initialized = false;
        }
        self.powered.store(false, core::sync::atomic::Ordering::Release);
        hw.clocks.disable();
    }

    /// クロックを戻し、起動済みならハードウェアを再初期化する
    pub(super) fn power_up_locked(&self, hw: &mut HwState) -> HdaResult<()> {
        hw.clocks.enable().map_err(|e| {
            warn!("hda: resume failed: {}", e);
            HdaError::ResourceUnavailable(ResourceKind::Clock)
        })?;
        self.powered.store(true, core::sync::atomic::Ordering::Release);

        if hw.running {
            if let Some(regs) = hw.regs.clone() {
                bringup::init_hardware(&*regs, self.variant);
                self.engine.init_chip(true);
                hw.chip_initialized = true;
                regs.update16(REG_WAKEEN, STATESTS_INT_MASK, 0);
            }
        }
        Ok(())
    }

    fn report_power_state(&self, hw: &mut HwState, state: DevicePowerState) {
        hw.power_state = state;
        if hw.card_registered {
            self.card.set_power_state(state);
        }
    }
}
