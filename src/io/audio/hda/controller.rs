// ============================================================================
// src/io/audio/hda/controller.rs - HDA Controller Handle
// ============================================================================
//!
//! コントローラハンドルの実装。
//!
//! - HdaController 構造体と共有ハードウェア状態
//! - 同期プローブ (失敗時は取得順の逆順で解放)
//! - 削除とシャットダウン
//!
//! ライフサイクル状態は `AtomicU8` に置き、バックグラウンドタスクと
//! 割り込み経路はロックなしで読む。書き込むのは実行中の遷移だけで、
//! 遷移は `hw` ミューテックスで直列化される。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use log::{debug, error, info, warn};
use spin::Mutex;

use crate::config::HdaConfig;
use crate::error::{HdaError, HdaResult, InitStage, ResourceKind};
use crate::io::clock::ClockSet;
use crate::io::mmio::RegisterIo;
use crate::io::platform::{ChipVariant, IrqBinding, MemResource, PlatformBus, PlatformDevice};
use crate::power::{DevicePowerState, RuntimePm};
use crate::task::{Executor, Work};

use super::super::regs::*;
use super::bringup;
use super::engine::{SoundCard, StreamEngine, SwitchNameLookup};
use super::irq::InterruptEntry;
use super::types::{CodecSwitch, LifecycleState, StreamTopology};

// ============================================================================
// Bindings
// ============================================================================

/// External collaborators handed to the controller at probe
#[derive(Clone)]
pub struct HdaBindings {
    /// Platform resources (registers, clocks, IRQ)
    pub bus: Arc<dyn PlatformBus>,
    /// Generic stream engine
    pub engine: Arc<dyn StreamEngine>,
    /// Host audio framework card
    pub card: Arc<dyn SoundCard>,
    /// Background execution facility for the two work items
    pub executor: Arc<dyn Executor>,
    /// Optional switch-name table for the diagnostic map
    pub switch_names: Option<Arc<dyn SwitchNameLookup>>,
}

// ============================================================================
// Hardware State
// ============================================================================

/// State mutated only by the transition holding `HdaController::hw`
pub(super) struct HwState {
    /// Mapped register region; `Some` exactly while registers are valid
    pub(super) regs: Option<Arc<dyn RegisterIo>>,
    pub(super) clocks: ClockSet,
    pub(super) irq: Option<Box<dyn IrqBinding>>,
    pub(super) topology: Option<StreamTopology>,
    pub(super) streams_ready: bool,
    pub(super) pages_allocated: bool,
    /// Link out of reset, CORB/RIRB running
    pub(super) chip_initialized: bool,
    /// Hardware ever started (card activated)
    pub(super) running: bool,
    pub(super) card_registered: bool,
    pub(super) power_state: DevicePowerState,
    /// State to return to on runtime resume
    pub(super) resume_to: Option<LifecycleState>,
    /// State to return to on system resume
    pub(super) wake_to: Option<LifecycleState>,
    /// Deferred probe was pending when system sleep cancelled it
    pub(super) deferred_parked: bool,
    pub(super) switch_map: Vec<CodecSwitch>,
}

impl HwState {
    const fn new() -> Self {
        Self {
            regs: None,
            clocks: ClockSet::empty(),
            irq: None,
            topology: None,
            streams_ready: false,
            pages_allocated: false,
            chip_initialized: false,
            running: false,
            card_registered: false,
            power_state: DevicePowerState::D0,
            resume_to: None,
            wake_to: None,
            deferred_parked: false,
            switch_map: Vec::new(),
        }
    }
}

// ============================================================================
// HDA Controller
// ============================================================================

/// SoC HD Audio controller handle
pub struct HdaController {
    pub(super) variant: ChipVariant,
    pub(super) config: HdaConfig,
    pub(super) model: Option<String>,
    pub(super) mem: MemResource,
    pub(super) irq_line: u32,
    /// `LifecycleState` as u8
    state: AtomicU8,
    pub(super) hw: Mutex<HwState>,
    pub(super) bus: Arc<dyn PlatformBus>,
    pub(super) engine: Arc<dyn StreamEngine>,
    pub(super) card: Arc<dyn SoundCard>,
    pub(super) switch_names: Option<Arc<dyn SwitchNameLookup>>,
    pub(super) pm: RuntimePm,
    /// Clocks on and registers live; read by the interrupt entry
    pub(super) powered: Arc<AtomicBool>,
    /// Set once by `shutdown`; background work stops rearming
    pub(super) shut_down: AtomicBool,
    pub(super) probe_work: Work,
    pub(super) jack_work: Work,
}

impl HdaController {
    /// 同期プローブ
    ///
    /// クロック取得/有効化、レジスタマップ、ブリングアップ、IRQ登録、
    /// ストリーム構成の算出とディスクリプタ確保を行い、遅延プローブを
    /// 投入して戻る。途中で失敗した場合は取得済みのリソースを逆順で解放し、
    /// エラーを返す。
    pub fn probe(
        dev: &PlatformDevice,
        bindings: HdaBindings,
        config: HdaConfig,
    ) -> HdaResult<Arc<Self>> {
        let variant = dev.match_variant().ok_or_else(|| {
            error!("hda: no matching compatible in {:?}", dev.compatible);
            HdaError::NoDevice
        })?;
        let irq_line = dev.irq.ok_or_else(|| {
            error!("hda: device has no interrupt line");
            HdaError::ResourceUnavailable(ResourceKind::Irq)
        })?;
        if dev.mem.len < MIN_REGION_LEN || dev.clock_names.is_empty() {
            error!(
                "hda: bad device description (region {:#x} bytes, {} clocks)",
                dev.mem.len,
                dev.clock_names.len()
            );
            return Err(HdaError::InvalidConfig);
        }
        info!("hda: probing {} at {:#x}", variant, dev.mem.start);

        let HdaBindings {
            bus,
            engine,
            card,
            executor,
            switch_names,
        } = bindings;

        let ctrl = Arc::new_cyclic(|weak: &Weak<Self>| {
            let probe_target = weak.clone();
            let jack_target = weak.clone();
            Self {
                variant,
                config,
                model: dev.model.clone(),
                mem: dev.mem,
                irq_line,
                state: AtomicU8::new(LifecycleState::Uninitialized as u8),
                hw: Mutex::new(HwState::new()),
                bus,
                engine,
                card,
                switch_names,
                pm: RuntimePm::new(),
                powered: Arc::new(AtomicBool::new(false)),
                shut_down: AtomicBool::new(false),
                probe_work: Work::new("hda-probe", executor.clone(), move || {
                    if let Some(ctrl) = probe_target.upgrade() {
                        ctrl.deferred_probe();
                    }
                }),
                jack_work: Work::new("hda-jack", executor, move || {
                    if let Some(ctrl) = jack_target.upgrade() {
                        ctrl.jack_poll();
                    }
                }),
            }
        });

        {
            let mut hw = ctrl.hw.lock();
            if let Err(e) = ctrl.probe_hardware(&mut hw, dev) {
                error!("hda: probe failed: {}", e);
                ctrl.teardown(&mut hw);
                ctrl.set_state(LifecycleState::Removed);
                return Err(e);
            }
        }

        ctrl.pm.enable();
        ctrl.probe_work.schedule(ctrl.config.probe_delay_ms);
        Ok(ctrl)
    }

    fn probe_hardware(&self, hw: &mut HwState, dev: &PlatformDevice) -> HdaResult<()> {
        hw.clocks = ClockSet::acquire(&*self.bus, dev.clock_names.as_slice())?;
        hw.clocks.enable()?;
        debug!("hda: clocks {:?} enabled", hw.clocks.names().collect::<Vec<_>>());

        let regs = self.bus.ioremap(&dev.mem)?;
        hw.regs = Some(regs.clone());
        self.powered.store(true, Ordering::Release);
        self.set_state(LifecycleState::Probing);

        bringup::init_hardware(&*regs, self.variant);

        let entry = Arc::new(InterruptEntry::new(
            regs.clone(),
            self.engine.clone(),
            self.powered.clone(),
        ));
        hw.irq = Some(
            self.bus
                .request_shared_irq(self.irq_line, DRIVER_NAME, entry)
                .inspect_err(|_| error!("hda: unable to request IRQ {}", self.irq_line))?,
        );

        bringup::override_sdo_lines(&*regs, self.variant);

        let gcap = regs.read16(REG_GCAP);
        debug!("hda: chipset global capabilities = {:#x}", gcap);
        let topology = StreamTopology::from_gcap(gcap, self.variant);
        info!(
            "hda: {} capture / {} playback streams",
            topology.capture_streams, topology.playback_streams
        );
        hw.topology = Some(topology);

        self.engine.init_streams(&topology).map_err(|e| {
            error!("hda: failed to initialize streams: {}", e);
            HdaError::InitError(InitStage::Streams)
        })?;
        hw.streams_ready = true;

        self.engine.alloc_stream_pages().map_err(|e| {
            error!("hda: failed to allocate stream pages: {}", e);
            HdaError::InitError(InitStage::StreamPages)
        })?;
        hw.pages_allocated = true;

        Ok(())
    }

    /// 取得済みのリソースを逆順で解放する
    ///
    /// どの状態から呼んでもよく、二重解放はしない。
    pub(super) fn teardown(&self, hw: &mut HwState) {
        hw.switch_map.clear();
        if hw.card_registered {
            self.card.free();
            hw.card_registered = false;
        }
        if hw.chip_initialized {
            self.engine.stop_all_streams();
            self.engine.stop_chip();
            hw.chip_initialized = false;
        }
        hw.running = false;
        if hw.pages_allocated {
            self.engine.free_stream_pages();
            hw.pages_allocated = false;
        }
        if hw.streams_ready {
            self.engine.free_streams();
            hw.streams_ready = false;
        }
        if let Some(binding) = hw.irq.take() {
            debug!("hda: releasing irq {}", binding.irq());
        }
        self.powered.store(false, Ordering::Release);
        hw.regs = None;
        hw.clocks.release();
    }

    // ========================================================================
    // Remove / Shutdown
    // ========================================================================

    /// デバイス削除
    ///
    /// 両バックグラウンドタスクをキャンセルして完了を待ってから解体する。
    /// どの状態からでも呼べて、二度目以降は何もしない。
    pub fn remove(&self) {
        self.probe_work.cancel_sync();
        self.jack_work.cancel_sync();

        let mut hw = self.hw.lock();
        if self.state() == LifecycleState::Removed {
            return;
        }
        self.pm.disable();
        self.teardown(&mut hw);
        self.set_state(LifecycleState::Removed);
        info!("hda: removed");
    }

    /// 電源断前のシャットダウン
    ///
    /// バックグラウンドタスクの完了は待たない。実行中のジャック
    /// ポーリングは停止フラグを見て再投入せずに終わる。遷移が実行中なら
    /// ハードウェア停止を諦める。
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
        self.probe_work.cancel();
        self.jack_work.cancel();
        let Some(mut hw) = self.hw.try_lock() else {
            warn!("hda: shutdown during a transition, hardware left running");
            return;
        };
        if self.state() == LifecycleState::Running && hw.chip_initialized {
            self.engine.stop_chip();
            hw.chip_initialized = false;
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
            .unwrap_or(LifecycleState::Removed)
    }

    pub(super) fn set_state(&self, next: LifecycleState) {
        let prev = self.state.swap(next as u8, Ordering::AcqRel);
        if prev != next as u8 {
            debug!(
                "hda: {} -> {}",
                LifecycleState::from_u8(prev).unwrap_or(LifecycleState::Removed),
                next
            );
        }
    }

    pub fn variant(&self) -> ChipVariant {
        self.variant
    }

    pub fn config(&self) -> &HdaConfig {
        &self.config
    }

    pub fn topology(&self) -> Option<StreamTopology> {
        self.hw.lock().topology
    }

    /// Power state last reported to the card
    pub fn power_state(&self) -> DevicePowerState {
        self.hw.lock().power_state
    }

    pub fn clocks_enabled(&self) -> bool {
        self.hw.lock().clocks.is_enabled()
    }

    /// Hardware was started by a successful deferred probe
    pub fn hardware_running(&self) -> bool {
        self.hw.lock().running
    }

    pub fn jack_poll_scheduled(&self) -> bool {
        self.jack_work.is_pending()
    }

    pub fn deferred_probe_pending(&self) -> bool {
        self.probe_work.is_pending()
    }
}

impl Drop for HdaController {
    fn drop(&mut self) {
        // 最後の参照がバックグラウンドタスク内で落ちる場合もあるので、
        // ここではタスクの完了を待たない
        let state = self.state();
        if state != LifecycleState::Removed {
            warn!("hda: dropped in state {} without remove", state);
            let hw = self.hw.get_mut();
            let mut taken = core::mem::replace(hw, HwState::new());
            self.teardown(&mut taken);
        }
    }
}
