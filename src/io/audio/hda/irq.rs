// ============================================================================
// src/io/audio/hda/irq.rs - Interrupt Entry Point
// ============================================================================
//!
//! 共有割り込みのエントリ。
//!
//! 割り込みコンテキストで呼ばれるためブロックしない。ライフサイクル状態には
//! 触れず、電源フラグとレジスタだけを見てストリームエンジンに委譲する。

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::io::mmio::RegisterIo;
use crate::io::platform::{IrqHandler, IrqReturn};

use super::super::regs::REG_INTSTS;
use super::engine::StreamEngine;

/// Handler registered on the shared interrupt line
pub struct InterruptEntry {
    regs: Arc<dyn RegisterIo>,
    engine: Arc<dyn StreamEngine>,
    powered: Arc<AtomicBool>,
}

impl InterruptEntry {
    pub fn new(
        regs: Arc<dyn RegisterIo>,
        engine: Arc<dyn StreamEngine>,
        powered: Arc<AtomicBool>,
    ) -> Self {
        Self {
            regs,
            engine,
            powered,
        }
    }
}

impl IrqHandler for InterruptEntry {
    fn handle(&self) -> IrqReturn {
        // Clocks off: registers are not readable
        if !self.powered.load(Ordering::Acquire) {
            return IrqReturn::None;
        }
        let status = self.regs.read32(REG_INTSTS);
        // Not ours, or the device has gone away
        if status == 0 || status == u32::MAX {
            return IrqReturn::None;
        }
        self.engine.handle_interrupt(status)
    }
}
