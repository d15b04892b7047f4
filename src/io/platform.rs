// ============================================================================
// src/io/platform.rs - Platform bus binding
// ============================================================================
//!
//! プラットフォームバスとのバインディング。
//!
//! - デバイスツリー互換文字列によるマッチテーブル
//! - デバイス記述 (レジスタ領域、IRQ、クロック名、モデル名)
//! - バスが提供するリソース取得のトレイト

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::HdaResult;

use super::clock::Clock;
use super::mmio::RegisterIo;

// ============================================================================
// Chip Variants
// ============================================================================

/// Supported controller variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipVariant {
    Tegra30,
    Tegra194,
    Tegra23x,
}

/// Device-tree match table, in priority order
pub const OF_MATCH_TABLE: [(&str, ChipVariant); 3] = [
    ("nvidia,tegra30-hda", ChipVariant::Tegra30),
    ("nvidia,tegra194-hda", ChipVariant::Tegra194),
    ("nvidia,tegra23x-hda", ChipVariant::Tegra23x),
];

impl ChipVariant {
    pub fn from_compatible(compatible: &str) -> Option<Self> {
        OF_MATCH_TABLE
            .iter()
            .find(|(c, _)| *c == compatible)
            .map(|(_, v)| *v)
    }

    pub fn compatible(&self) -> &'static str {
        match self {
            ChipVariant::Tegra30 => OF_MATCH_TABLE[0].0,
            ChipVariant::Tegra194 => OF_MATCH_TABLE[1].0,
            ChipVariant::Tegra23x => OF_MATCH_TABLE[2].0,
        }
    }

    /// Needs the access-unlock token in the GSC register
    pub fn needs_gsc_unlock(&self) -> bool {
        matches!(self, ChipVariant::Tegra194 | ChipVariant::Tegra23x)
    }

    /// GCAP under-reports the SDO line count
    pub fn needs_sdo_override(&self) -> bool {
        matches!(self, ChipVariant::Tegra194)
    }
}

impl fmt::Display for ChipVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.compatible())
    }
}

// ============================================================================
// Device Description
// ============================================================================

/// Memory resource of the device node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemResource {
    /// Physical start address
    pub start: u64,
    /// Length in bytes
    pub len: usize,
}

/// Platform device description
#[derive(Debug, Clone)]
pub struct PlatformDevice {
    /// Compatible strings of the device node
    pub compatible: Vec<String>,
    /// Register region
    pub mem: MemResource,
    /// Interrupt line (`None` if the node has none)
    pub irq: Option<u32>,
    /// Clock input names, in enable order
    pub clock_names: Vec<String>,
    /// Optional human-readable model name
    pub model: Option<String>,
}

impl PlatformDevice {
    /// マッチテーブルと照合
    ///
    /// テーブル順で最初に一致したものを返す。
    pub fn match_variant(&self) -> Option<ChipVariant> {
        OF_MATCH_TABLE
            .iter()
            .find(|(c, _)| self.compatible.iter().any(|dc| dc == c))
            .map(|(_, v)| *v)
    }
}

// ============================================================================
// Interrupts
// ============================================================================

/// Result of an interrupt handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Not our interrupt (shared line)
    None,
    /// Interrupt was handled
    Handled,
}

/// Interrupt handler; runs in interrupt context and must not block
pub trait IrqHandler: Send + Sync {
    fn handle(&self) -> IrqReturn;
}

/// Registered interrupt; dropping it unregisters the handler
pub trait IrqBinding: Send {
    fn irq(&self) -> u32;
}

// ============================================================================
// Platform Bus
// ============================================================================

/// Resources provided by the platform bus
pub trait PlatformBus: Send + Sync {
    /// Map the register region; the mapping lives until the last handle drops
    fn ioremap(&self, mem: &MemResource) -> HdaResult<Arc<dyn RegisterIo>>;

    /// Look up a named clock input
    fn clk_get(&self, name: &str) -> Option<Box<dyn Clock>>;

    /// Register a handler on a shared interrupt line
    fn request_shared_irq(
        &self,
        irq: u32,
        name: &'static str,
        handler: Arc<dyn IrqHandler>,
    ) -> HdaResult<Box<dyn IrqBinding>>;
}
