// ============================================================================
// src/io/audio/hda/bringup.rs - Register Bring-up Sequence
// ============================================================================
//!
//! レジスタ立ち上げシーケンス。
//!
//! ブリッジ経路の有効化、バスマスター/割り込み有効化、BAR0 ウィンドウ設定、
//! 及びチップ種別ごとのアクセス解除を順に行う。冪等であり、
//! ランタイムレジュームのたびに再実行してよい。

use crate::io::mmio::RegisterIo;
use crate::io::platform::ChipVariant;

use super::super::regs::*;

#[cfg(feature = "verbose_logging")]
macro_rules! trace_write {
    ($reg:expr, $val:expr) => {
        log::trace!("hda: bringup write {:#06x} <- {:#010x}", $reg, $val)
    };
}

#[cfg(not(feature = "verbose_logging"))]
macro_rules! trace_write {
    ($reg:expr, $val:expr) => {{
        let _ = (&$reg, &$val);
    }};
}

fn write(regs: &dyn RegisterIo, reg: usize, val: u32) {
    trace_write!(reg, val);
    regs.write32(reg, val);
}

/// Bring the bridge and controller to an accessible state
///
/// Clocks must already be enabled.
pub fn init_hardware(regs: &dyn RegisterIo, variant: ChipVariant) {
    // Enable the internal FPCI path
    let v = regs.read32(REG_IPFS_CONFIG);
    write(regs, REG_IPFS_CONFIG, v | IPFS_EN_FPCI);

    // MEM/IO space, bus master, SERR; unmask interrupts
    let cmd = CfgCmd::from_bits_retain(regs.read32(REG_CFG_CMD));
    let cmd = cmd.difference(CfgCmd::INTR_DISABLE).union(CfgCmd::BRINGUP);
    write(regs, REG_CFG_CMD, cmd.bits());

    write(regs, REG_CFG_BAR0, CFG_BAR0_INIT_PROGRAM);
    write(regs, REG_CFG_BAR0, CFG_BAR0_FINAL_PROGRAM);
    write(regs, REG_IPFS_FPCI_BAR0, FPCI_BAR0_START);

    let v = regs.read32(REG_IPFS_INTR_MASK);
    write(regs, REG_IPFS_INTR_MASK, v | IPFS_EN_INTR);

    if variant.needs_gsc_unlock() {
        write(regs, REG_GSC, GSC_ID_TOKEN);
    }
}

/// Patch GCAP_NSDO to the real SDO line count
///
/// Only for variants whose GCAP under-reports it; no-op otherwise.
pub fn override_sdo_lines(regs: &dyn RegisterIo, variant: ChipVariant) {
    if !variant.needs_sdo_override() {
        return;
    }
    log::info!("hda: override SDO lines to {}", KNOWN_SDO_LINES);
    let v = regs.read32(REG_FPCI_DBG_CFG_2) & !FPCI_GCAP_NSDO_MASK;
    write(
        regs,
        REG_FPCI_DBG_CFG_2,
        v | ((KNOWN_SDO_LINES >> 1) << FPCI_GCAP_NSDO_SHIFT),
    );
}
