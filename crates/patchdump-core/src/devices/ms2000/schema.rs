//! The MS2000 program parameter table.
//!
//! Offsets follow the program data dump layout: global and effect bytes
//! first, then two identical timbre blocks at fixed offsets. Bytes not
//! listed here (the motion sequencer and vocoder regions among them) stay
//! opaque and round-trip untouched.

use crate::schema::{Encoding, ParameterSpec};

use super::layout::{TIMBRE1_OFFSET, TIMBRE2_OFFSET};

fn unsigned(max: u8) -> Encoding {
    Encoding::Unsigned { max }
}

fn bits(shift: u8, mask: u8) -> Encoding {
    Encoding::Bits { shift, mask }
}

fn offset64(min: i64, max: i64) -> Encoding {
    Encoding::Offset64 { min, max }
}

pub fn specs() -> Vec<ParameterSpec> {
    let mut specs = vec![
        ParameterSpec::new("identity", "name", 0, Encoding::Ascii { len: 12 }),
        ParameterSpec::new("voice", "timbre_voice", 16, bits(6, 0x03)),
        ParameterSpec::new("voice", "mode", 16, bits(4, 0x03)),
        ParameterSpec::new("scale", "key", 17, bits(4, 0x0F)),
        ParameterSpec::new("scale", "type", 17, bits(0, 0x0F)),
        ParameterSpec::new("scale", "split_point", 18, unsigned(127)),
        ParameterSpec::new("delay", "sync", 19, Encoding::Flag { bit: 7 }),
        ParameterSpec::new("delay", "timebase", 19, bits(0, 0x0F)),
        ParameterSpec::new("delay", "time", 20, unsigned(127)),
        ParameterSpec::new("delay", "depth", 21, unsigned(127)),
        ParameterSpec::new("delay", "type", 22, unsigned(2)),
        ParameterSpec::new("mod_fx", "speed", 23, unsigned(127)),
        ParameterSpec::new("mod_fx", "depth", 24, unsigned(127)),
        ParameterSpec::new("mod_fx", "type", 25, unsigned(2)),
        ParameterSpec::new("eq", "hi_freq", 26, unsigned(127)),
        ParameterSpec::new("eq", "hi_gain", 27, unsigned(127)),
        ParameterSpec::new("eq", "low_freq", 28, unsigned(127)),
        ParameterSpec::new("eq", "low_gain", 29, unsigned(127)),
        ParameterSpec::new("arpeggiator", "tempo", 30, Encoding::Be16 { max: 300 }),
        ParameterSpec::new("arpeggiator", "on", 32, Encoding::Flag { bit: 7 }),
        ParameterSpec::new("arpeggiator", "latch", 32, Encoding::Flag { bit: 6 }),
        ParameterSpec::new("arpeggiator", "target", 32, bits(4, 0x03)),
        ParameterSpec::new("arpeggiator", "key_sync", 32, Encoding::Flag { bit: 0 }),
        ParameterSpec::new("arpeggiator", "type", 33, bits(0, 0x0F)),
        ParameterSpec::new("arpeggiator", "range", 33, bits(4, 0x0F)),
    ];
    push_timbre(&mut specs, "timbre1", TIMBRE1_OFFSET);
    push_timbre(&mut specs, "timbre2", TIMBRE2_OFFSET);
    specs
}

/// The two timbre blocks share one layout at different base offsets.
fn push_timbre(specs: &mut Vec<ParameterSpec>, timbre: &str, base: usize) {
    let section = |suffix: &str| format!("{timbre}.{suffix}");
    let mut push = |section: String, name: &str, offset: usize, encoding: Encoding| {
        specs.push(ParameterSpec::new(&section, name, base + offset, encoding));
    };

    push(section("voice"), "portamento_time", 5, unsigned(127));

    push(section("osc1"), "wave", 7, bits(0, 0x07));
    push(section("osc1"), "ctrl1", 8, unsigned(127));
    push(section("osc1"), "ctrl2", 9, unsigned(127));
    push(section("osc1"), "dwgs_wave", 10, bits(0, 0x3F));

    push(section("osc2"), "wave", 12, bits(0, 0x03));
    push(section("osc2"), "mod_select", 12, bits(4, 0x03));
    push(section("osc2"), "semitone", 13, offset64(-24, 24));
    push(section("osc2"), "tune", 14, offset64(-64, 63));

    push(section("mixer"), "osc1_level", 16, unsigned(127));
    push(section("mixer"), "osc2_level", 17, unsigned(127));
    push(section("mixer"), "noise_level", 18, unsigned(127));

    push(section("filter"), "type", 19, bits(0, 0x03));
    push(section("filter"), "cutoff", 20, unsigned(127));
    push(section("filter"), "resonance", 21, unsigned(127));
    push(section("filter"), "eg1_intensity", 22, offset64(-64, 63));
    push(section("filter"), "velocity_sense", 23, offset64(-64, 63));
    push(section("filter"), "kbd_track", 24, offset64(-64, 63));

    push(section("amp"), "level", 25, unsigned(127));
    push(section("amp"), "panpot", 26, offset64(-64, 63));
    push(section("amp"), "gate", 27, Encoding::Flag { bit: 6 });
    push(section("amp"), "distortion", 27, Encoding::Flag { bit: 0 });
    push(section("amp"), "velocity_sense", 28, offset64(-64, 63));
    push(section("amp"), "kbd_track", 29, offset64(-64, 63));

    push(section("eg1"), "attack", 30, unsigned(127));
    push(section("eg1"), "decay", 31, unsigned(127));
    push(section("eg1"), "sustain", 32, unsigned(127));
    push(section("eg1"), "release", 33, unsigned(127));

    push(section("eg2"), "attack", 34, unsigned(127));
    push(section("eg2"), "decay", 35, unsigned(127));
    push(section("eg2"), "sustain", 36, unsigned(127));
    push(section("eg2"), "release", 37, unsigned(127));

    push(section("lfo1"), "wave", 38, bits(0, 0x03));
    push(section("lfo1"), "frequency", 39, unsigned(127));
    push(section("lfo1"), "tempo_sync", 40, Encoding::Flag { bit: 0 });
    push(section("lfo1"), "sync_note", 40, bits(1, 0x7F));

    push(section("lfo2"), "wave", 41, bits(0, 0x03));
    push(section("lfo2"), "frequency", 42, unsigned(127));
    push(section("lfo2"), "tempo_sync", 43, Encoding::Flag { bit: 0 });
    push(section("lfo2"), "sync_note", 43, bits(1, 0x7F));

    for route in 0..4 {
        let name = |part: &str| format!("route{}_{part}", route + 1);
        let byte = 44 + route * 2;
        specs.push(ParameterSpec::new(
            &section("matrix"),
            &name("source"),
            base + byte,
            bits(0, 0x0F),
        ));
        specs.push(ParameterSpec::new(
            &section("matrix"),
            &name("destination"),
            base + byte,
            bits(4, 0x0F),
        ));
        specs.push(ParameterSpec::new(
            &section("matrix"),
            &name("intensity"),
            base + byte + 1,
            offset64(-64, 63),
        ));
    }
}
