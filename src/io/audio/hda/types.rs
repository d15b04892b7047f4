// ============================================================================
// src/io/audio/hda/types.rs - HDA Types and Data Structures
// ============================================================================
//!
//! HDA ドライバで使用される型定義。
//!
//! - ライフサイクル状態
//! - ストリーム構成 (GCAP からの算出)
//! - サウンドカード情報
//! - コーデックのスイッチ名マップ

use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::io::platform::{ChipVariant, MemResource};

use super::super::regs::*;

// ============================================================================
// Lifecycle State
// ============================================================================

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    Probing = 1,
    Running = 2,
    ProbingFailed = 3,
    SystemSuspended = 4,
    RuntimeSuspended = 5,
    Removed = 6,
}

impl LifecycleState {
    /// u8から変換
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Probing),
            2 => Some(Self::Running),
            3 => Some(Self::ProbingFailed),
            4 => Some(Self::SystemSuspended),
            5 => Some(Self::RuntimeSuspended),
            6 => Some(Self::Removed),
            _ => None,
        }
    }

    /// Registers are mapped in this state
    pub fn registers_valid(&self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Removed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Probing => "probing",
            Self::Running => "running",
            Self::ProbingFailed => "probing-failed",
            Self::SystemSuspended => "system-suspended",
            Self::RuntimeSuspended => "runtime-suspended",
            Self::Removed => "removed",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Stream Topology
// ============================================================================

/// Stream descriptor layout derived from GCAP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTopology {
    /// Number of capture (input) streams
    pub capture_streams: u32,
    /// Number of playback (output) streams
    pub playback_streams: u32,
    /// First capture descriptor index
    pub capture_index_offset: u32,
    /// First playback descriptor index
    pub playback_index_offset: u32,
    /// SDO striping limit, if the variant needs one
    pub sdo_limit: Option<u32>,
}

impl StreamTopology {
    /// GCAP の値とチップ種別からストリーム構成を算出
    ///
    /// 入力・出力とも 0 の場合に限り 1/1 にフォールバックする。
    pub fn from_gcap(gcap: u16, variant: ChipVariant) -> Self {
        let mut capture = ((gcap >> GCAP_ISS_SHIFT) & GCAP_STREAMS_MASK) as u32;
        if variant == ChipVariant::Tegra23x {
            capture = TEGRA23X_CAPTURE_STREAMS;
        }
        let mut playback = ((gcap >> GCAP_OSS_SHIFT) & GCAP_STREAMS_MASK) as u32;
        if capture == 0 && playback == 0 {
            capture = FALLBACK_CAPTURE_STREAMS;
            playback = FALLBACK_PLAYBACK_STREAMS;
        }
        let sdo_limit = match variant {
            ChipVariant::Tegra30 => Some(LEGACY_SDO_LIMIT),
            _ => None,
        };
        Self {
            capture_streams: capture,
            playback_streams: playback,
            capture_index_offset: 0,
            playback_index_offset: capture,
            sdo_limit,
        }
    }

    pub fn num_streams(&self) -> u32 {
        self.capture_streams + self.playback_streams
    }
}

// ============================================================================
// Card Information
// ============================================================================

/// Identity handed to the sound-card layer at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    pub driver: &'static str,
    pub shortname: String,
    pub longname: String,
}

impl CardInfo {
    /// モデル名 (省略時はドライバ名) からカード情報を組み立てる
    pub fn new(model: Option<&str>, mem: &MemResource, irq: u32) -> Self {
        let name = model.unwrap_or(DRIVER_NAME);
        if name.len() > CARD_SHORTNAME_MAX {
            log::info!("hda: truncating shortname for card");
        }
        let shortname = String::from(truncate(name, CARD_SHORTNAME_MAX));
        let bus_addr = mem.start + HDA_BAR0 as u64;
        let longname = format!("{} at 0x{:x} irq {}", shortname, bus_addr, irq);
        let longname = String::from(truncate(&longname, CARD_LONGNAME_MAX));
        Self {
            driver: DRIVER_NAME,
            shortname,
            longname,
        }
    }
}

/// 文字境界を保ったまま `max` バイト以内に切り詰める
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Codec Switch Map
// ============================================================================

/// One entry of the codec → switch-name diagnostic map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecSwitch {
    /// PCM device number
    pub pcm_device: u32,
    /// Codec id (low 16 bits of the vendor id)
    pub codec_id: u16,
    /// Switch name reported by the external lookup
    pub switch_name: String,
}
