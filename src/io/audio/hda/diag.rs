// ============================================================================
// src/io/audio/hda/diag.rs - Codec Switch Map
// ============================================================================
//!
//! 診断用のコーデック/スイッチ名マップ。
//!
//! カード登録時に PCM ごとのコーデックIDを外部テーブルで引いて保存する。

use alloc::vec::Vec;
use log::debug;

use super::controller::HdaController;
use super::types::CodecSwitch;

impl HdaController {
    /// PCM 番号ごとのスイッチ名を集める
    pub(super) fn collect_switch_map(&self) -> Vec<CodecSwitch> {
        let Some(lookup) = &self.switch_names else {
            return Vec::new();
        };

        let mut map = Vec::new();
        for pcm in self.engine.pcms() {
            let codec_id = (pcm.vendor_id & 0xFFFF) as u16;
            match lookup.switch_name(codec_id) {
                Some(switch_name) => map.push(CodecSwitch {
                    pcm_device: pcm.device,
                    codec_id,
                    switch_name,
                }),
                None => debug!("hda: no switch name for codec {:#06x}", codec_id),
            }
        }
        map
    }

    /// Snapshot of the switch map built at card activation
    pub fn codec_switch_map(&self) -> Vec<CodecSwitch> {
        self.hw.lock().switch_map.clone()
    }
}
