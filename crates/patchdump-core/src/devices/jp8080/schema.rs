//! The JP-8080 patch parameter table.
//!
//! One flat 248-byte record: the name, then one byte per parameter in
//! address order. The nine bytes past the bulk split point hold the
//! parameters the JP-8000 lacks; they decode to defaults when a short
//! record was padded.

use crate::schema::{Encoding, ParameterSpec};

fn unsigned(max: u8) -> Encoding {
    Encoding::Unsigned { max }
}

fn signed() -> Encoding {
    Encoding::Offset64 { min: -64, max: 63 }
}

fn flag() -> Encoding {
    Encoding::Flag { bit: 0 }
}

pub fn specs() -> Vec<ParameterSpec> {
    let spec = |section: &str, name: &str, offset: usize, encoding: Encoding| {
        ParameterSpec::new(section, name, offset, encoding)
    };
    vec![
        spec("identity", "name", 0x00, Encoding::Ascii { len: 16 }),
        spec("lfo1", "waveform", 0x10, unsigned(3)),
        spec("lfo1", "rate", 0x11, unsigned(127)),
        spec("lfo1", "fade", 0x12, unsigned(127)),
        spec("lfo2", "rate", 0x13, unsigned(127)),
        spec("lfo2", "depth_select", 0x14, unsigned(2)),
        spec("modulation", "ring_mod", 0x15, flag()),
        spec("modulation", "cross_mod_depth", 0x16, unsigned(127)),
        spec("modulation", "osc_balance", 0x17, signed()),
        spec("modulation", "lfo_env_dest", 0x18, unsigned(2)),
        spec("modulation", "osc_lfo1_depth", 0x19, signed()),
        spec("modulation", "pitch_lfo2_depth", 0x1A, signed()),
        spec("pitch_env", "depth", 0x1B, signed()),
        spec("pitch_env", "attack", 0x1C, unsigned(127)),
        spec("pitch_env", "decay", 0x1D, unsigned(127)),
        spec("osc1", "waveform", 0x1E, unsigned(6)),
        spec("osc1", "ctrl1", 0x1F, unsigned(127)),
        spec("osc1", "ctrl2", 0x20, unsigned(127)),
        spec("osc2", "waveform", 0x21, unsigned(3)),
        spec("osc2", "sync", 0x22, flag()),
        spec("osc2", "range", 0x23, unsigned(50)),
        spec("osc2", "fine", 0x24, unsigned(100)),
        spec("osc2", "ctrl1", 0x25, unsigned(127)),
        spec("osc2", "ctrl2", 0x26, unsigned(127)),
        spec("filter", "type", 0x27, unsigned(2)),
        spec("filter", "slope", 0x28, unsigned(1)),
        spec("filter", "cutoff", 0x29, unsigned(127)),
        spec("filter", "resonance", 0x2A, unsigned(127)),
        spec("filter", "keyfollow", 0x2B, signed()),
        spec("filter", "lfo1_depth", 0x2C, signed()),
        spec("filter", "lfo2_depth", 0x2D, signed()),
        spec("eg1", "depth", 0x2E, signed()),
        spec("eg1", "attack", 0x2F, unsigned(127)),
        spec("eg1", "decay", 0x30, unsigned(127)),
        spec("eg1", "sustain", 0x31, unsigned(127)),
        spec("eg1", "release", 0x32, unsigned(127)),
        spec("amp", "level", 0x33, unsigned(127)),
        spec("amp", "lfo1_depth", 0x34, signed()),
        spec("amp", "lfo2_depth", 0x35, signed()),
        spec("eg2", "attack", 0x36, unsigned(127)),
        spec("eg2", "decay", 0x37, unsigned(127)),
        spec("eg2", "sustain", 0x38, unsigned(127)),
        spec("eg2", "release", 0x39, unsigned(127)),
        spec("tone", "pan_mode", 0x3A, unsigned(2)),
        spec("tone", "bass", 0x3B, signed()),
        spec("tone", "treble", 0x3C, signed()),
        spec("multi_fx", "type", 0x3D, unsigned(12)),
        spec("multi_fx", "level", 0x3E, unsigned(127)),
        spec("delay", "type", 0x3F, unsigned(4)),
        spec("delay", "time", 0x40, unsigned(127)),
        spec("delay", "feedback", 0x41, unsigned(127)),
        spec("delay", "level", 0x42, unsigned(127)),
        spec("pitch", "bend_up", 0x43, unsigned(24)),
        spec("pitch", "bend_down", 0x44, unsigned(24)),
        spec("pitch", "portamento", 0x45, flag()),
        spec("pitch", "portamento_time", 0x46, unsigned(127)),
        spec("voice", "mono", 0x47, flag()),
        spec("voice", "legato", 0x48, flag()),
        spec("voice", "osc_shift", 0x49, unsigned(4)),
        // Past the bulk split point: absent from JP-8000 dumps.
        spec("voice", "unison", 243, flag()),
        spec("voice", "unison_detune", 244, unsigned(127)),
        spec("settings", "patch_gain", 245, unsigned(2)),
        spec("settings", "ext_trigger", 246, flag()),
        spec("settings", "ext_trigger_dest", 247, unsigned(2)),
    ]
}
