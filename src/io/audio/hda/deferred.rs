// ============================================================================
// src/io/audio/hda/deferred.rs - Deferred Probe Task
// ============================================================================
//!
//! 遅延プローブタスク。
//!
//! コーデック検出は同期プローブの時間予算を超えてブロックし得るため、
//! チップ初期化、コーデック列挙、カード登録はバックグラウンドで一度だけ行う。
//! 実行中は電源参照を保持する。失敗は呼び出し元に返す経路がないので
//! ログに残し、ハンドルを ProbingFailed にする。

use log::{debug, error, info};

use crate::error::{ContextualError, ErrorContext, HdaError, HdaResult, InitStage, ResourceKind};

use super::bringup;
use super::controller::{HdaController, HwState};
use super::types::{CardInfo, LifecycleState};

/// 外部コラボレータのエラーを段階エラーに置き換える（元のエラーはログへ）
fn at_stage<T>(result: HdaResult<T>, stage: InitStage) -> Result<T, InitStage> {
    result.map_err(|e| {
        debug!("hda: {} failed: {}", stage, e);
        stage
    })
}

impl HdaController {
    pub(super) fn deferred_probe(&self) {
        let mut hw = self.hw.lock();
        let state = self.state();
        let probing = match state {
            LifecycleState::Probing => true,
            LifecycleState::RuntimeSuspended => hw.resume_to == Some(LifecycleState::Probing),
            _ => false,
        };
        if !probing || self.is_shut_down() {
            debug!("hda: deferred probe skipped in state {}", state);
            return;
        }

        self.pm.get();
        let result = self.wake_for_probe(&mut hw).and_then(|()| self.first_init(&mut hw));
        match result {
            Ok(()) => {
                self.set_state(LifecycleState::Running);
                self.jack_work.schedule(self.config.jack_poll_interval_ms);
                info!("hda: {} running", self.variant);
            }
            Err(e) => {
                error!("hda: deferred probe failed: {}", e);
                self.release_failed_probe(&mut hw);
                self.set_state(LifecycleState::ProbingFailed);
            }
        }
        self.pm.put();
    }

    /// ランタイムサスペンド中なら電源参照の取得に合わせて復帰する
    fn wake_for_probe(&self, hw: &mut HwState) -> Result<(), ContextualError> {
        if self.state() == LifecycleState::RuntimeSuspended {
            self.runtime_resume_locked(hw).context("runtime resume")?;
        }
        Ok(())
    }

    fn first_init(&self, hw: &mut HwState) -> Result<(), ContextualError> {
        let regs = hw
            .regs
            .clone()
            .ok_or(HdaError::ResourceUnavailable(ResourceKind::RegisterRegion))
            .context("registers")?;

        bringup::init_hardware(&*regs, self.variant);
        self.engine.init_chip(true);
        hw.chip_initialized = true;

        if self.engine.codec_mask() == 0 {
            return Err(HdaError::DetectionError).context("codec detection");
        }

        at_stage(
            self.engine.probe_codecs(self.config.max_codec_slots),
            InitStage::CodecProbe,
        )
        .context("codec probe")?;
        at_stage(self.engine.configure_codecs(), InitStage::CodecConfigure)
            .context("codec configure")?;

        let info = CardInfo::new(self.model.as_deref(), &self.mem, self.irq_line);
        at_stage(self.card.register(&info), InitStage::CardRegister).context("card register")?;
        hw.card_registered = true;

        hw.running = true;
        self.engine.set_power_save(self.config.power_save_ms());
        hw.switch_map = self.collect_switch_map();
        Ok(())
    }

    /// 失敗したプローブの後始末
    ///
    /// レジスタと IRQ は remove まで残す。
    fn release_failed_probe(&self, hw: &mut HwState) {
        if hw.chip_initialized {
            self.engine.stop_chip();
            hw.chip_initialized = false;
        }
        if hw.pages_allocated {
            self.engine.free_stream_pages();
            hw.pages_allocated = false;
        }
        if hw.streams_ready {
            self.engine.free_streams();
            hw.streams_ready = false;
        }
        hw.running = false;
        hw.resume_to = None;
        self.powered.store(false, core::sync::atomic::Ordering::Release);
        hw.clocks.disable();
    }
}
