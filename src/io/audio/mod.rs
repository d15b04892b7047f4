// ============================================================================
// src/io/audio/mod.rs - Audio Subsystem Module
// ============================================================================
//!
//! # オーディオサブシステム
//!
//! SoC 内蔵 HD Audio コントローラのプラットフォームドライバ。
//!
//! ## サポートデバイス
//! - nvidia,tegra30-hda / nvidia,tegra194-hda / nvidia,tegra23x-hda
//!
//! ## モジュール
//! - `hda`: ライフサイクル/電源管理
//! - `regs`: レジスタ定義

pub mod hda;
pub mod regs;

pub use hda::{
    CodecSwitch, HdaBindings, HdaController, LifecycleState, StreamTopology,
};
