//! 電源管理
//!
//! デバイス電源状態 (D-States) とランタイムPMの参照カウントを提供する。
//! 実際の遷移処理はコントローラ側 (`io::audio::hda::pm`) にある。

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// デバイスパワー状態 (D-States)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DevicePowerState {
    /// D0: フルオン
    D0 = 0,
    /// D1: 中間省電力
    D1 = 1,
    /// D2: 深い省電力
    D2 = 2,
    /// D3hot: ソフトオフ (復帰可能)
    D3Hot = 3,
    /// D3cold: ハードオフ (完全電源断)
    D3Cold = 4,
}

impl DevicePowerState {
    /// u8から変換
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::D0),
            1 => Some(Self::D1),
            2 => Some(Self::D2),
            3 => Some(Self::D3Hot),
            4 => Some(Self::D3Cold),
            _ => None,
        }
    }
}

impl fmt::Display for DevicePowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevicePowerState::D0 => write!(f, "D0"),
            DevicePowerState::D1 => write!(f, "D1"),
            DevicePowerState::D2 => write!(f, "D2"),
            DevicePowerState::D3Hot => write!(f, "D3hot"),
            DevicePowerState::D3Cold => write!(f, "D3cold"),
        }
    }
}

/// ランタイムPM状態
///
/// 使用カウントが0でない間はランタイムサスペンドを拒否する。
/// システムスリープは強制サスペンドなのでカウントを無視する。
pub struct RuntimePm {
    /// 使用カウント
    usage: AtomicUsize,
    /// ランタイムPM有効フラグ
    enabled: AtomicBool,
}

impl RuntimePm {
    pub const fn new() -> Self {
        Self {
            usage: AtomicUsize::new(0),
            enabled: AtomicBool::new(false),
        }
    }

    /// ランタイムPMを有効化 (プローブ時)
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// ランタイムPMを無効化 (削除時)
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// 参照を取得し、取得後の使用カウントを返す
    pub fn get(&self) -> usize {
        self.usage.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// 参照を解放し、解放後の使用カウントを返す
    pub fn put(&self) -> usize {
        let prev = self
            .usage
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        if prev == 0 {
            log::warn!("runtime pm: unbalanced put");
        }
        prev.saturating_sub(1)
    }

    /// 現在の使用カウント
    pub fn usage(&self) -> usize {
        self.usage.load(Ordering::Acquire)
    }

    /// アイドル (サスペンド可能) かどうか
    pub fn is_idle(&self) -> bool {
        self.usage() == 0
    }
}
