// ============================================================================
// src/io/mod.rs - I/O Subsystem Module
// ============================================================================
//!
//! プラットフォームI/O: MMIOレジスタ領域、クロック、プラットフォームバス、
//! およびオーディオコントローラドライバ。

pub mod audio;
pub mod clock;
pub mod mmio;
pub mod platform;

pub use clock::{Clock, ClockSet};
pub use mmio::{MmioRegion, RegisterIo};
pub use platform::{
    ChipVariant, IrqBinding, IrqHandler, IrqReturn, MemResource, PlatformBus, PlatformDevice,
};
