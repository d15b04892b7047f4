// ============================================================================
// src/lib.rs - SoC HD Audio Platform Driver
// ============================================================================
//!
//! # SoC 内蔵 HD Audio コントローラ用プラットフォームドライバ
//!
//! メモリマップされた HDA コントローラを電源オフ状態から動作可能状態まで
//! 立ち上げ、コーデックを列挙し、システムスリープ/ランタイムアイドルの
//! 電源遷移を管理し、安全に解体する。
//!
//! ## モジュール構成
//! - `error` - 統一エラー型
//! - `config` - ドライバ設定
//! - `power` - デバイス電源状態とランタイムPM参照カウント
//! - `task` - 遅延ワークとタイマーキュー
//! - `io` - MMIO、クロック、プラットフォームバス
//! - `io::audio::hda` - ライフサイクル状態機械

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod error;
pub mod io;
pub mod power;
pub mod task;

pub use config::HdaConfig;
pub use error::{HdaError, HdaResult};
pub use io::audio::hda::{
    CodecSwitch, HdaBindings, HdaController, LifecycleState, StreamTopology,
};
