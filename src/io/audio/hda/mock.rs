// ============================================================================
// src/io/audio/hda/mock.rs - Recording Test Doubles
// ============================================================================
//!
//! テスト用の記録モック。
//!
//! レジスタ、クロック、IRQ、ストリームエンジン、コーデック、カードの
//! 各呼び出しを記録し、失敗を注入できる。
//! 並行遷移のテスト用にスレッド実行器とゲートも置く。

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use core::time::Duration;
use spin::Mutex;

use crate::config::HdaConfig;
use crate::error::{FaultKind, HdaError, HdaResult, InitStage, ResourceKind};
use crate::io::clock::Clock;
use crate::io::mmio::RegisterIo;
use crate::io::platform::{
    IrqBinding, IrqHandler, IrqReturn, MemResource, PlatformBus, PlatformDevice,
};
use crate::power::DevicePowerState;
use crate::task::{Executor, Job, TimerQueue};

use super::super::regs::*;
use super::controller::{HdaBindings, HdaController};
use super::engine::{Codec, PcmInfo, SoundCard, StreamEngine, SwitchNameLookup};
use super::types::{CardInfo, StreamTopology};

// ============================================================================
// Threads
// ============================================================================

/// Runs each job on its own thread after sleeping for the delay
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn submit(&self, delay_ms: u64, job: Job) {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(delay_ms));
            job();
        });
    }
}

/// Spin until `cond` holds; panics after five seconds
pub fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(std::time::Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// One-way barrier: callers of `pass` block until the test opens it
pub struct Gate {
    entered: AtomicBool,
    open: AtomicBool,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            entered: AtomicBool::new(false),
            open: AtomicBool::new(false),
        }
    }

    pub fn pass(&self) {
        self.entered.store(true, Ordering::SeqCst);
        while !self.open.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn wait_entered(&self) {
        wait_until("gate", || self.entered.load(Ordering::SeqCst));
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Registers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegAccess {
    Read { offset: usize },
    Write { offset: usize, value: u32 },
}

/// Sparse 32-bit register file; 16-bit accesses hit half of a word
pub struct MockRegs {
    words: Mutex<BTreeMap<usize, u32>>,
    log: Mutex<Vec<RegAccess>>,
}

impl MockRegs {
    pub fn new() -> Self {
        Self {
            words: Mutex::new(BTreeMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Set a register without recording an access
    pub fn poke32(&self, offset: usize, value: u32) {
        self.words.lock().insert(offset, value);
    }

    /// Read a register without recording an access
    pub fn peek32(&self, offset: usize) -> u32 {
        self.words.lock().get(&offset).copied().unwrap_or(0)
    }

    pub fn peek16(&self, offset: usize) -> u16 {
        let shift = (offset & 2) * 8;
        (self.peek32(offset & !3) >> shift) as u16
    }

    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.log
            .lock()
            .iter()
            .filter_map(|a| match *a {
                RegAccess::Write { offset, value } => Some((offset, value)),
                RegAccess::Read { .. } => None,
            })
            .collect()
    }

    pub fn snapshot(&self) -> BTreeMap<usize, u32> {
        self.words.lock().clone()
    }

    pub fn log(&self) -> Vec<RegAccess> {
        self.log.lock().clone()
    }

    pub fn access_count(&self) -> usize {
        self.log.lock().len()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }
}

impl RegisterIo for MockRegs {
    fn read16(&self, offset: usize) -> u16 {
        self.log.lock().push(RegAccess::Read { offset });
        self.peek16(offset)
    }

    fn write16(&self, offset: usize, value: u16) {
        self.log.lock().push(RegAccess::Write {
            offset,
            value: value as u32,
        });
        let shift = (offset & 2) * 8;
        let mut words = self.words.lock();
        let word = words.entry(offset & !3).or_insert(0);
        *word = (*word & !(0xFFFF << shift)) | ((value as u32) << shift);
    }

    fn read32(&self, offset: usize) -> u32 {
        self.log.lock().push(RegAccess::Read { offset });
        self.peek32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.log.lock().push(RegAccess::Write { offset, value });
        self.poke32(offset, value);
    }
}

/// Mapping handed out by `MockBus::ioremap`; counts live mappings
struct MappedRegs {
    regs: Arc<MockRegs>,
    mapped: Arc<AtomicUsize>,
}

impl RegisterIo for MappedRegs {
    fn read16(&self, offset: usize) -> u16 {
        self.regs.read16(offset)
    }
    fn write16(&self, offset: usize, value: u16) {
        self.regs.write16(offset, value)
    }
    fn read32(&self, offset: usize) -> u32 {
        self.regs.read32(offset)
    }
    fn write32(&self, offset: usize, value: u32) {
        self.regs.write32(offset, value)
    }
}

impl Drop for MappedRegs {
    fn drop(&mut self) {
        self.mapped.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Clocks
// ============================================================================

pub struct MockClock {
    enabled: AtomicBool,
    fail: AtomicBool,
    enables: AtomicUsize,
    disables: AtomicUsize,
}

impl MockClock {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            fail: AtomicBool::new(false),
            enables: AtomicUsize::new(0),
            disables: AtomicUsize::new(0),
        }
    }

    pub fn fail_enable(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn enable_count(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn disable_count(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

struct ClockHandle(Arc<MockClock>);

impl Clock for ClockHandle {
    fn prepare_enable(&self) -> HdaResult<()> {
        if self.0.fail.load(Ordering::SeqCst) {
            return Err(HdaError::HardwareFault(FaultKind::ClockEnable));
        }
        self.0.enables.fetch_add(1, Ordering::SeqCst);
        self.0.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disable_unprepare(&self) {
        self.0.disables.fetch_add(1, Ordering::SeqCst);
        self.0.enabled.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Platform Bus
// ============================================================================

type HandlerSlot = Arc<Mutex<Option<Arc<dyn IrqHandler>>>>;

pub struct MockBus {
    clocks: Vec<(String, Arc<MockClock>)>,
    regs: Arc<MockRegs>,
    mapped: Arc<AtomicUsize>,
    handler: HandlerSlot,
    fail_ioremap: AtomicBool,
    fail_irq: AtomicBool,
}

impl MockBus {
    pub fn new(clock_names: &[&str]) -> Self {
        Self {
            clocks: clock_names
                .iter()
                .map(|n| (n.to_string(), Arc::new(MockClock::new())))
                .collect(),
            regs: Arc::new(MockRegs::new()),
            mapped: Arc::new(AtomicUsize::new(0)),
            handler: Arc::new(Mutex::new(None)),
            fail_ioremap: AtomicBool::new(false),
            fail_irq: AtomicBool::new(false),
        }
    }

    pub fn clock(&self, name: &str) -> Arc<MockClock> {
        self.clocks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.clone())
            .expect("unknown mock clock")
    }

    /// Enabled flag of every clock, in construction order
    pub fn clock_pattern(&self) -> Vec<bool> {
        self.clocks.iter().map(|(_, c)| c.is_enabled()).collect()
    }

    pub fn regs(&self) -> &Arc<MockRegs> {
        &self.regs
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped.load(Ordering::SeqCst) > 0
    }

    pub fn irq_registered(&self) -> bool {
        self.handler.lock().is_some()
    }

    pub fn fail_ioremap(&self, fail: bool) {
        self.fail_ioremap.store(fail, Ordering::SeqCst);
    }

    pub fn fail_irq(&self, fail: bool) {
        self.fail_irq.store(fail, Ordering::SeqCst);
    }

    /// Deliver an interrupt; `None` if no handler is registered
    pub fn fire_irq(&self) -> Option<IrqReturn> {
        let handler = self.handler.lock().clone();
        handler.map(|h| h.handle())
    }
}

struct MockIrqBinding {
    irq: u32,
    slot: HandlerSlot,
}

impl IrqBinding for MockIrqBinding {
    fn irq(&self) -> u32 {
        self.irq
    }
}

impl Drop for MockIrqBinding {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

impl PlatformBus for MockBus {
    fn ioremap(&self, _mem: &MemResource) -> HdaResult<Arc<dyn RegisterIo>> {
        if self.fail_ioremap.load(Ordering::SeqCst) {
            return Err(HdaError::ResourceUnavailable(ResourceKind::RegisterRegion));
        }
        self.mapped.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MappedRegs {
            regs: self.regs.clone(),
            mapped: self.mapped.clone(),
        }))
    }

    fn clk_get(&self, name: &str) -> Option<Box<dyn Clock>> {
        self.clocks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Box::new(ClockHandle(c.clone())) as Box<dyn Clock>)
    }

    fn request_shared_irq(
        &self,
        irq: u32,
        _name: &'static str,
        handler: Arc<dyn IrqHandler>,
    ) -> HdaResult<Box<dyn IrqBinding>> {
        if self.fail_irq.load(Ordering::SeqCst) {
            return Err(HdaError::ResourceUnavailable(ResourceKind::Irq));
        }
        *self.handler.lock() = Some(handler);
        Ok(Box::new(MockIrqBinding {
            irq,
            slot: self.handler.clone(),
        }))
    }
}

// ============================================================================
// Stream Engine / Codecs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    InitStreams(StreamTopology),
    FreeStreams,
    AllocPages,
    FreePages,
    InitChip(bool),
    StopChip,
    StopAllStreams,
    LinkReset,
    ProbeCodecs(u32),
    ConfigureCodecs,
    SetPowerSave(u32),
}

type PollHook = Arc<dyn Fn() + Send + Sync>;

pub struct MockCodec {
    vendor_id: u32,
    powered: AtomicBool,
    power_ups: AtomicUsize,
    power_downs: AtomicUsize,
    polls: AtomicUsize,
    dirty: AtomicUsize,
    on_poll: Mutex<Option<PollHook>>,
}

impl MockCodec {
    pub fn new(vendor_id: u32, powered: bool) -> Self {
        Self {
            vendor_id,
            powered: AtomicBool::new(powered),
            power_ups: AtomicUsize::new(0),
            power_downs: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            dirty: AtomicUsize::new(0),
            on_poll: Mutex::new(None),
        }
    }

    /// Run `hook` inside every `poll_jacks` call
    pub fn on_poll(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_poll.lock() = Some(Arc::new(hook));
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn dirty_marks(&self) -> usize {
        self.dirty.load(Ordering::SeqCst)
    }

    /// (power_up, power_down) call counts
    pub fn power_refs(&self) -> (usize, usize) {
        (
            self.power_ups.load(Ordering::SeqCst),
            self.power_downs.load(Ordering::SeqCst),
        )
    }
}

impl Codec for MockCodec {
    fn vendor_id(&self) -> u32 {
        self.vendor_id
    }
    fn is_powered(&self) -> bool {
        self.powered.load(Ordering::SeqCst)
    }
    fn power_up(&self) {
        self.power_ups.fetch_add(1, Ordering::SeqCst);
    }
    fn power_down(&self) {
        self.power_downs.fetch_add(1, Ordering::SeqCst);
    }
    fn mark_jacks_dirty(&self) {
        self.dirty.fetch_add(1, Ordering::SeqCst);
    }
    fn poll_jacks(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let hook = self.on_poll.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    codec_mask: AtomicU16,
    codecs: Mutex<Vec<Arc<MockCodec>>>,
    pcms: Mutex<Vec<PcmInfo>>,
    fail: Mutex<Option<InitStage>>,
    scan_gate: Mutex<Option<Arc<Gate>>>,
    interrupts: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            codec_mask: AtomicU16::new(0x1),
            codecs: Mutex::new(Vec::new()),
            pcms: Mutex::new(Vec::new()),
            fail: Mutex::new(None),
            scan_gate: Mutex::new(None),
            interrupts: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: EngineCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn set_codec_mask(&self, mask: u16) {
        self.codec_mask.store(mask, Ordering::SeqCst);
    }

    pub fn add_codec(&self, codec: Arc<MockCodec>) {
        self.codecs.lock().push(codec);
    }

    pub fn add_pcm(&self, device: u32, vendor_id: u32) {
        self.pcms.lock().push(PcmInfo { device, vendor_id });
    }

    /// Make the engine step for `stage` fail
    pub fn fail_at(&self, stage: InitStage) {
        *self.fail.lock() = Some(stage);
    }

    /// Block codec enumeration on `gate`
    pub fn hold_codec_scan(&self, gate: Arc<Gate>) {
        *self.scan_gate.lock() = Some(gate);
    }

    pub fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, stage: InitStage) -> HdaResult<()> {
        match *self.fail.lock() {
            Some(s) if s == stage => Err(HdaError::InitError(stage)),
            _ => Ok(()),
        }
    }
}

impl StreamEngine for MockEngine {
    fn init_streams(&self, topology: &StreamTopology) -> HdaResult<()> {
        self.record(EngineCall::InitStreams(*topology));
        self.check(InitStage::Streams)
    }
    fn free_streams(&self) {
        self.record(EngineCall::FreeStreams);
    }
    fn alloc_stream_pages(&self) -> HdaResult<()> {
        self.record(EngineCall::AllocPages);
        self.check(InitStage::StreamPages)
    }
    fn free_stream_pages(&self) {
        self.record(EngineCall::FreePages);
    }
    fn init_chip(&self, full_reset: bool) {
        self.record(EngineCall::InitChip(full_reset));
    }
    fn stop_chip(&self) {
        self.record(EngineCall::StopChip);
    }
    fn stop_all_streams(&self) {
        self.record(EngineCall::StopAllStreams);
    }
    fn enter_link_reset(&self) {
        self.record(EngineCall::LinkReset);
    }
    fn codec_mask(&self) -> u16 {
        self.codec_mask.load(Ordering::SeqCst)
    }
    fn probe_codecs(&self, max_slots: u32) -> HdaResult<()> {
        self.record(EngineCall::ProbeCodecs(max_slots));
        let gate = self.scan_gate.lock().clone();
        if let Some(gate) = gate {
            gate.pass();
        }
        self.check(InitStage::CodecProbe)
    }
    fn configure_codecs(&self) -> HdaResult<()> {
        self.record(EngineCall::ConfigureCodecs);
        self.check(InitStage::CodecConfigure)
    }
    fn codecs(&self) -> Vec<Arc<dyn Codec>> {
        self.codecs
            .lock()
            .iter()
            .map(|c| c.clone() as Arc<dyn Codec>)
            .collect()
    }
    fn pcms(&self) -> Vec<PcmInfo> {
        self.pcms.lock().clone()
    }
    fn set_power_save(&self, timeout_ms: u32) {
        self.record(EngineCall::SetPowerSave(timeout_ms));
    }
    fn handle_interrupt(&self, _intsts: u32) -> IrqReturn {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        IrqReturn::Handled
    }
}

// ============================================================================
// Card / Switch Names
// ============================================================================

pub struct MockCard {
    info: Mutex<Option<CardInfo>>,
    states: Mutex<Vec<DevicePowerState>>,
    frees: AtomicUsize,
    fail_register: AtomicBool,
}

impl MockCard {
    pub fn new() -> Self {
        Self {
            info: Mutex::new(None),
            states: Mutex::new(Vec::new()),
            frees: AtomicUsize::new(0),
            fail_register: AtomicBool::new(false),
        }
    }

    pub fn info(&self) -> Option<CardInfo> {
        self.info.lock().clone()
    }

    pub fn power_states(&self) -> Vec<DevicePowerState> {
        self.states.lock().clone()
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    pub fn fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }
}

impl SoundCard for MockCard {
    fn register(&self, info: &CardInfo) -> HdaResult<()> {
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(HdaError::InitError(InitStage::CardRegister));
        }
        *self.info.lock() = Some(info.clone());
        Ok(())
    }
    fn set_power_state(&self, state: DevicePowerState) {
        self.states.lock().push(state);
    }
    fn free(&self) {
        self.frees.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockSwitchNames(pub BTreeMap<u16, String>);

impl SwitchNameLookup for MockSwitchNames {
    fn switch_name(&self, codec_id: u16) -> Option<String> {
        self.0.get(&codec_id).cloned()
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub const CLOCK_NAMES: [&str; 3] = ["hda", "hda2hdmi", "hda2codec_2x"];
pub const TEST_IRQ: u32 = 81;
pub const TEST_MEM: MemResource = MemResource {
    start: 0x0351_0000,
    len: 0x1_0000,
};

/// One controller's worth of mocks driven by a manual timer queue
pub struct Fixture {
    pub bus: Arc<MockBus>,
    pub engine: Arc<MockEngine>,
    pub card: Arc<MockCard>,
    pub codec: Arc<MockCodec>,
    pub queue: Arc<TimerQueue>,
    pub switch_names: Option<Arc<MockSwitchNames>>,
}

impl Fixture {
    /// GCAP with 4 capture / 4 playback streams and one unpowered codec
    pub fn new() -> Self {
        let bus = Arc::new(MockBus::new(&CLOCK_NAMES));
        bus.regs().poke32(REG_GCAP, 0x4401);
        let engine = Arc::new(MockEngine::new());
        let codec = Arc::new(MockCodec::new(0x10de_0028, false));
        engine.add_codec(codec.clone());
        Self {
            bus,
            engine,
            card: Arc::new(MockCard::new()),
            codec,
            queue: Arc::new(TimerQueue::new()),
            switch_names: None,
        }
    }

    pub fn device(&self, compatible: &str) -> PlatformDevice {
        PlatformDevice {
            compatible: alloc::vec![compatible.to_string()],
            mem: TEST_MEM,
            irq: Some(TEST_IRQ),
            clock_names: CLOCK_NAMES.iter().map(|s| s.to_string()).collect(),
            model: None,
        }
    }

    pub fn bindings(&self) -> HdaBindings {
        self.bindings_on(self.queue.clone())
    }

    pub fn bindings_on(&self, executor: Arc<dyn Executor>) -> HdaBindings {
        HdaBindings {
            bus: self.bus.clone(),
            engine: self.engine.clone(),
            card: self.card.clone(),
            executor,
            switch_names: self
                .switch_names
                .clone()
                .map(|s| s as Arc<dyn SwitchNameLookup>),
        }
    }

    pub fn probe(&self, compatible: &str) -> HdaResult<Arc<HdaController>> {
        self.probe_with(compatible, HdaConfig::default())
    }

    pub fn probe_with(
        &self,
        compatible: &str,
        config: HdaConfig,
    ) -> HdaResult<Arc<HdaController>> {
        HdaController::probe(&self.device(compatible), self.bindings(), config)
    }

    /// Controller whose background work runs on real threads instead of the queue
    pub fn threaded(&self, config: HdaConfig) -> Arc<HdaController> {
        let dev = self.device("nvidia,tegra194-hda");
        HdaController::probe(&dev, self.bindings_on(Arc::new(ThreadExecutor)), config).unwrap()
    }

    /// Probe and run the deferred task to completion
    pub fn running(&self) -> Arc<HdaController> {
        let ctrl = self.probe("nvidia,tegra194-hda").unwrap();
        self.queue.run_due();
        ctrl
    }

    pub fn run(&self) -> usize {
        self.queue.run_due()
    }

    pub fn advance(&self, ms: u64) -> usize {
        self.queue.advance(ms)
    }
}
