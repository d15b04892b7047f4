// ============================================================================
// src/io/audio/hda/mod.rs - SoC HD Audio Platform Driver
// ============================================================================
//!
//! # SoC HD Audio プラットフォームドライバ
//!
//! コントローラの電源オフからの立ち上げ、コーデック列挙、
//! システムスリープ/ランタイムPM、および解体を管理する。
//! ストリームエンジン (DMA、コーデックコマンド) とサウンドカード層は
//! 外部コラボレータとしてトレイト越しに扱う。
//!
//! ## モジュール構成
//! - `types` - 状態、ストリーム構成、カード情報
//! - `engine` - 外部コラボレータのトレイト
//! - `bringup` - レジスタ立ち上げシーケンス
//! - `controller` - コントローラハンドルとプローブ/削除/シャットダウン
//! - `pm` - システムスリープとランタイムPMの遷移
//! - `deferred` - 遅延プローブタスク
//! - `jack` - ジャック検出ポーリングタスク
//! - `irq` - 割り込みエントリ
//! - `diag` - コーデックのスイッチ名マップ

mod bringup;
mod controller;
mod deferred;
mod diag;
mod engine;
mod irq;
mod jack;
mod pm;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use bringup::{init_hardware, override_sdo_lines};
pub use controller::{HdaBindings, HdaController};
pub use engine::{Codec, PcmInfo, SoundCard, StreamEngine, SwitchNameLookup};
pub use irq::InterruptEntry;
pub use types::{CardInfo, CodecSwitch, LifecycleState, StreamTopology};
