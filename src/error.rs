//! 統一エラーハンドリングモジュール
//!
//! ドライバ全体で使用されるエラー型を定義する。
//! プローブ、電源遷移、クロック層のエラーはすべてここに集約される。

use core::fmt;

/// ドライバ全体の統一エラー型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdaError {
    /// クロック/IRQ/メモリ領域の取得失敗
    ResourceUnavailable(ResourceKind),
    /// 同期プローブ中のハードウェア初期化失敗
    InitError(InitStage),
    /// 遅延プローブでコーデックが1つも見つからない
    DetectionError,
    /// ハードウェア障害
    HardwareFault(FaultKind),
    /// マッチテーブルに該当するデバイスがない
    NoDevice,
    /// 電源参照が保持されているためサスペンド不可
    Busy,
    /// デバイス記述が不正
    InvalidConfig,
}

/// 取得に失敗したリソースの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// プラットフォームクロック
    Clock,
    /// MMIOレジスタ領域
    RegisterRegion,
    /// 割り込みライン
    Irq,
}

/// 初期化に失敗した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    /// ストリーム構造体の初期化
    Streams,
    /// ストリームディスクリプタページの確保
    StreamPages,
    /// コーデックインスタンスの生成
    CodecProbe,
    /// コーデック設定
    CodecConfigure,
    /// サウンドカード登録
    CardRegister,
}

/// ハードウェア障害の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// クロック一括有効化の失敗
    ClockEnable,
}

// ===== Display implementations =====

impl fmt::Display for HdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HdaError::ResourceUnavailable(r) => write!(f, "resource unavailable: {}", r),
            HdaError::InitError(s) => write!(f, "init error: {}", s),
            HdaError::DetectionError => write!(f, "no codecs found"),
            HdaError::HardwareFault(k) => write!(f, "hardware fault: {}", k),
            HdaError::NoDevice => write!(f, "no matching device"),
            HdaError::Busy => write!(f, "device busy"),
            HdaError::InvalidConfig => write!(f, "invalid device description"),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Clock => write!(f, "clock"),
            ResourceKind::RegisterRegion => write!(f, "register region"),
            ResourceKind::Irq => write!(f, "irq"),
        }
    }
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStage::Streams => write!(f, "stream init"),
            InitStage::StreamPages => write!(f, "stream page allocation"),
            InitStage::CodecProbe => write!(f, "codec probe"),
            InitStage::CodecConfigure => write!(f, "codec configure"),
            InitStage::CardRegister => write!(f, "card register"),
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::ClockEnable => write!(f, "clock enable failed"),
        }
    }
}

// ===== From implementations for sub-errors =====

impl From<ResourceKind> for HdaError {
    fn from(r: ResourceKind) -> Self {
        HdaError::ResourceUnavailable(r)
    }
}

impl From<InitStage> for HdaError {
    fn from(s: InitStage) -> Self {
        HdaError::InitError(s)
    }
}

impl From<FaultKind> for HdaError {
    fn from(k: FaultKind) -> Self {
        HdaError::HardwareFault(k)
    }
}

// ===== Result type alias =====

/// ドライバの結果型エイリアス
pub type HdaResult<T> = Result<T, HdaError>;

// ===== Error extension trait =====

/// エラーに追加情報を付加するためのトレイト
pub trait ErrorContext<T> {
    /// エラーにコンテキスト情報を追加
    fn context(self, ctx: &'static str) -> Result<T, ContextualError>;
}

/// コンテキスト付きエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextualError {
    pub error: HdaError,
    pub context: &'static str,
}

impl<T, E: Into<HdaError>> ErrorContext<T> for Result<T, E> {
    fn context(self, ctx: &'static str) -> Result<T, ContextualError> {
        self.map_err(|e| ContextualError {
            error: e.into(),
            context: ctx,
        })
    }
}

impl fmt::Display for ContextualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}
