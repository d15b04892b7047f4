// ============================================================================
// src/io/clock.rs - Clock / power-domain bulk management
// ============================================================================
//!
//! クロック一括管理。
//!
//! 名前付きクロックの集合をプローブ時に一度だけ取得し、まとめて
//! 有効化/無効化する。部分的に有効な状態を遷移の外に漏らさない。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use log::{error, trace};

use crate::error::{FaultKind, HdaError, HdaResult, ResourceKind};

use super::platform::PlatformBus;

/// A platform clock handle; released when dropped
pub trait Clock: Send {
    /// Prepare and enable; may block for hardware settle time
    fn prepare_enable(&self) -> HdaResult<()>;
    /// Disable and unprepare
    fn disable_unprepare(&self);
}

/// Ordered set of named clocks, enabled and disabled as a unit
pub struct ClockSet {
    clocks: Vec<(String, Box<dyn Clock>)>,
    enabled: bool,
}

impl ClockSet {
    /// An empty, released set
    pub const fn empty() -> Self {
        Self {
            clocks: Vec::new(),
            enabled: false,
        }
    }

    /// 名前付きクロックをすべて取得
    ///
    /// 一つでも解決できなければ、それまでに取得したハンドルを解放して失敗する。
    pub fn acquire<S: AsRef<str>>(bus: &dyn PlatformBus, names: &[S]) -> HdaResult<Self> {
        let mut clocks = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match bus.clk_get(name) {
                Some(clk) => clocks.push((String::from(name), clk)),
                None => {
                    error!("hda: clock '{}' not found", name);
                    return Err(HdaError::ResourceUnavailable(ResourceKind::Clock));
                }
            }
        }
        Ok(Self {
            clocks,
            enabled: false,
        })
    }

    /// すべてのクロックを順に有効化
    ///
    /// 途中で失敗した場合は有効化済みのものを逆順で無効化してから
    /// `HardwareFault` を返す。既に有効なら何もしない。
    pub fn enable(&mut self) -> HdaResult<()> {
        if self.enabled {
            return Ok(());
        }
        for (i, (name, clk)) in self.clocks.iter().enumerate() {
            if let Err(e) = clk.prepare_enable() {
                error!("hda: failed to enable clock '{}': {}", name, e);
                for (_, done) in self.clocks[..i].iter().rev() {
                    done.disable_unprepare();
                }
                return Err(HdaError::HardwareFault(FaultKind::ClockEnable));
            }
            trace!("hda: clock '{}' enabled", name);
        }
        self.enabled = true;
        Ok(())
    }

    /// すべてのクロックを逆順で無効化（常に成功、既に無効なら何もしない）
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        for (name, clk) in self.clocks.iter().rev() {
            clk.disable_unprepare();
            trace!("hda: clock '{}' disabled", name);
        }
        self.enabled = false;
    }

    /// 無効化してからハンドルを解放
    pub fn release(&mut self) {
        self.disable();
        self.clocks.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clocks.iter().map(|(n, _)| n.as_str())
    }
}

impl Drop for ClockSet {
    fn drop(&mut self) {
        self.disable();
    }
}
