// ============================================================================
// src/io/audio/regs.rs - SoC HD Audio Register Definitions
// ============================================================================
//!
//! # SoC HD Audio レジスタ定義
//!
//! レジスタ領域は3つのブロックからなる:
//! - IPFS (インターフェースブロック) - オフセット 0x0000
//! - FPCI ブリッジ設定空間 - オフセット 0x1000
//! - HDA コントローラ本体 - オフセット 0x8000

#![allow(dead_code)]

use bitflags::bitflags;

// ============================================================================
// IPFS Block
// ============================================================================

/// IPFS Configuration - 32-bit, RW
/// Offset: 0x180
pub const REG_IPFS_CONFIG: usize = 0x180;

/// Enable the internal FPCI bridge path
pub const IPFS_EN_FPCI: u32 = 1 << 0;

/// IPFS FPCI BAR0 window start - 32-bit, RW
/// Offset: 0x80
pub const REG_IPFS_FPCI_BAR0: usize = 0x80;

/// Bridge window start programmed into IPFS FPCI BAR0
pub const FPCI_BAR0_START: u32 = 0x40;

/// IPFS Interrupt Mask - 32-bit, RW
/// Offset: 0x188
pub const REG_IPFS_INTR_MASK: usize = 0x188;

/// Bridge interrupt enable
pub const IPFS_EN_INTR: u32 = 1 << 16;

// ============================================================================
// GSC (Security) Register
// ============================================================================

/// GSC_ID - 32-bit, WO
/// Offset: 0x1E0
pub const REG_GSC: usize = 0x1E0;

/// Access-unlock token for the APR region
pub const GSC_ID_TOKEN: u32 = 10;

// ============================================================================
// FPCI Bridge Configuration Space (Offset 0x1000)
// ============================================================================

/// FPCI configuration space base
pub const DFPCI_CFG_BASE: usize = 0x1000;

/// Bridge Command - 32-bit, RW
/// Offset: 0x1004
pub const REG_CFG_CMD: usize = 0x1004;

/// Bridge BAR0 - 32-bit, RW
/// Offset: 0x1010
pub const REG_CFG_BAR0: usize = 0x1010;

/// All-ones probe pattern written before the final window size
pub const CFG_BAR0_INIT_PROGRAM: u32 = 0xFFFF_FFFF;

/// Finalized BAR0 window size
pub const CFG_BAR0_FINAL_PROGRAM: u32 = 1 << 14;

/// FPCI Debug Configuration 2 - 32-bit, RW
/// Offset: 0x10F4
pub const REG_FPCI_DBG_CFG_2: usize = 0x10F4;

/// GCAP_NSDO field (bits 19:18): 0 = 1 SDO, 1 = 2 SDO, 2 = 4 SDO lines
pub const FPCI_GCAP_NSDO_SHIFT: u32 = 18;
pub const FPCI_GCAP_NSDO_MASK: u32 = 0x3 << FPCI_GCAP_NSDO_SHIFT;

/// Actual SDO line count on parts whose GCAP under-reports it
pub const KNOWN_SDO_LINES: u32 = 4;

bitflags! {
    /// ブリッジコマンドレジスタのビット
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CfgCmd: u32 {
        /// IO空間有効
        const IO_SPACE = 1 << 0;
        /// メモリ空間有効
        const MEM_SPACE = 1 << 1;
        /// バスマスター有効
        const BUS_MASTER = 1 << 2;
        /// システムエラー報告
        const SERR = 1 << 8;
        /// 割り込み禁止
        const INTR_DISABLE = 1 << 10;

        /// ブリングアップ時に立てるビット
        const BRINGUP = Self::IO_SPACE.bits()
            | Self::MEM_SPACE.bits()
            | Self::BUS_MASTER.bits()
            | Self::SERR.bits();
    }
}

// ============================================================================
// HDA Controller Block (Offset 0x8000)
// ============================================================================

/// HDA controller register block base
pub const HDA_BAR0: usize = 0x8000;

/// Global Capabilities (GCAP) - 16-bit, RO
/// Offset: 0x00
pub const REG_GCAP: usize = HDA_BAR0 + 0x00;

/// Wake Enable (WAKEEN) - 16-bit, RW
/// Offset: 0x0C
pub const REG_WAKEEN: usize = HDA_BAR0 + 0x0C;

/// State Change Status (STATESTS) - 16-bit, RW1C
/// Offset: 0x0E
pub const REG_STATESTS: usize = HDA_BAR0 + 0x0E;

/// Interrupt Status (INTSTS) - 32-bit, RO/RW1C
/// Offset: 0x24
pub const REG_INTSTS: usize = HDA_BAR0 + 0x24;

/// Per-codec state-change bits (8 codec slots)
pub const STATESTS_INT_MASK: u16 = (1 << 8) - 1;

/// Smallest register region that covers every register touched here
pub const MIN_REGION_LEN: usize = REG_INTSTS + 4;

// ============================================================================
// GCAP Bit Definitions
// ============================================================================

/// Input Streams Supported (ISS) - Bits 8-11
pub const GCAP_ISS_SHIFT: u16 = 8;

/// Output Streams Supported (OSS) - Bits 12-15
pub const GCAP_OSS_SHIFT: u16 = 12;

pub const GCAP_STREAMS_MASK: u16 = 0x0F;

// ============================================================================
// Stream Topology Quirks
// ============================================================================

/// Capture streams when GCAP reports nothing
pub const FALLBACK_CAPTURE_STREAMS: u32 = 1;

/// Playback streams when GCAP reports nothing
pub const FALLBACK_PLAYBACK_STREAMS: u32 = 1;

/// Output descriptors on Tegra23x start after 4 input descriptors,
/// although GCAP reports no input streams
pub const TEGRA23X_CAPTURE_STREAMS: u32 = 4;

/// SDO striping limit for legacy 2ch/16-bit playback
pub const LEGACY_SDO_LIMIT: u32 = 16;

// ============================================================================
// Driver Identity
// ============================================================================

/// Driver name, also the default card shortname
pub const DRIVER_NAME: &str = "tegra-hda";

/// Card shortname capacity (bytes)
pub const CARD_SHORTNAME_MAX: usize = 32;

/// Card longname capacity (bytes)
pub const CARD_LONGNAME_MAX: usize = 80;
