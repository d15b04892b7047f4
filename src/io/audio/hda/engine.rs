// ============================================================================
// src/io/audio/hda/engine.rs - External Collaborators
// ============================================================================
//!
//! 外部コラボレータのトレイト。
//!
//! - `StreamEngine` - 汎用 HDA ストリームエンジン (DMA、CORB/RIRB、コーデック列挙)
//! - `Codec` - 列挙済みコーデック (電源参照とジャック検出のみ使用)
//! - `SoundCard` - ホストのオーディオフレームワークへのカード登録
//! - `SwitchNameLookup` - コーデックIDからスイッチ名を引く外部テーブル
//!
//! コントローラはこれらを `Arc` で明示的に保持し、コールバックには
//! 自身を明示的に渡す。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::HdaResult;
use crate::io::platform::IrqReturn;
use crate::power::DevicePowerState;

use super::types::{CardInfo, StreamTopology};

/// PCM exposed by a codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmInfo {
    /// PCM device number
    pub device: u32,
    /// Vendor id of the owning codec
    pub vendor_id: u32,
}

/// Generic HDA stream engine
pub trait StreamEngine: Send + Sync {
    /// Create stream structures for the given layout
    fn init_streams(&self, topology: &StreamTopology) -> HdaResult<()>;
    fn free_streams(&self);

    /// Allocate stream descriptor (BDL) and position pages
    fn alloc_stream_pages(&self) -> HdaResult<()>;
    fn free_stream_pages(&self);

    /// Reset the link and start CORB/RIRB and interrupts
    fn init_chip(&self, full_reset: bool);
    /// Stop CORB/RIRB, stream DMA and interrupts
    fn stop_chip(&self);
    fn stop_all_streams(&self);
    fn enter_link_reset(&self);

    /// Codec presence bits latched during `init_chip`
    fn codec_mask(&self) -> u16;
    /// Create codec instances for up to `max_slots` addresses
    fn probe_codecs(&self, max_slots: u32) -> HdaResult<()>;
    fn configure_codecs(&self) -> HdaResult<()>;

    fn codecs(&self) -> Vec<Arc<dyn Codec>>;
    fn pcms(&self) -> Vec<PcmInfo>;

    /// Auto power-save timeout (0 = disabled)
    fn set_power_save(&self, timeout_ms: u32);

    /// Data-path interrupt handling; interrupt context
    fn handle_interrupt(&self, intsts: u32) -> IrqReturn;
}

/// An enumerated codec
pub trait Codec: Send + Sync {
    fn vendor_id(&self) -> u32;
    fn is_powered(&self) -> bool;
    /// Take a power reference
    fn power_up(&self);
    /// Drop a power reference
    fn power_down(&self);
    fn mark_jacks_dirty(&self);
    fn poll_jacks(&self);
}

/// Card registration with the host audio framework
pub trait SoundCard: Send + Sync {
    fn register(&self, info: &CardInfo) -> HdaResult<()>;
    fn set_power_state(&self, state: DevicePowerState);
    fn free(&self);
}

/// Switch-name lookup for the diagnostic map
pub trait SwitchNameLookup: Send + Sync {
    fn switch_name(&self, codec_id: u16) -> Option<String>;
}
