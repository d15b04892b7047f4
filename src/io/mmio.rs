// ============================================================================
// src/io/mmio.rs - Memory-mapped register access
// ============================================================================
//!
//! MMIOレジスタアクセス。
//!
//! `RegisterIo` はレジスタ領域の抽象。実機では `MmioRegion` を、
//! テストでは記録用モックを使う。

use core::ptr::{read_volatile, write_volatile};

/// レジスタ領域へのアクセス
///
/// 割り込みコンテキストからも呼ばれるため、実装はブロックしてはならない。
pub trait RegisterIo: Send + Sync {
    fn read16(&self, offset: usize) -> u16;
    fn write16(&self, offset: usize, value: u16);
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write a 32-bit register
    fn update32(&self, offset: usize, clear: u32, set: u32) {
        let v = self.read32(offset);
        self.write32(offset, (v & !clear) | set);
    }

    /// Read-modify-write a 16-bit register
    fn update16(&self, offset: usize, clear: u16, set: u16) {
        let v = self.read16(offset);
        self.write16(offset, (v & !clear) | set);
    }
}

/// Kernel-mapped MMIO region
pub struct MmioRegion {
    /// Virtual base address of the mapping
    base: usize,
    /// Mapping length in bytes
    len: usize,
}

// SAFETY: MmioRegion only hands out volatile accesses to device memory; the
// mapping itself is immutable after construction and owned by the platform
// layer for as long as any handle to this region exists.
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}

impl MmioRegion {
    /// Wrap an existing kernel mapping
    ///
    /// # Safety
    /// `base..base + len` must be a valid, device-memory mapping that outlives
    /// the returned value.
    pub const unsafe fn new(base: usize, len: usize) -> Self {
        Self { base, len }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn addr(&self, offset: usize, width: usize) -> usize {
        debug_assert!(offset + width <= self.len, "mmio access out of range: {:#x}", offset);
        debug_assert!(offset % width == 0, "unaligned mmio access: {:#x}", offset);
        self.base + offset
    }
}

impl RegisterIo for MmioRegion {
    #[inline]
    fn read16(&self, offset: usize) -> u16 {
        // SAFETY: the mapping is valid per `new`'s contract and offset is
        // range-checked in debug builds; register reads have no memory-safety
        // side effects.
        unsafe { read_volatile(self.addr(offset, 2) as *const u16) }
    }

    #[inline]
    fn write16(&self, offset: usize, value: u16) {
        // SAFETY: see read16.
        unsafe { write_volatile(self.addr(offset, 2) as *mut u16, value) }
    }

    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: see read16.
        unsafe { read_volatile(self.addr(offset, 4) as *const u32) }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: see read16.
        unsafe { write_volatile(self.addr(offset, 4) as *mut u32, value) }
    }
}
