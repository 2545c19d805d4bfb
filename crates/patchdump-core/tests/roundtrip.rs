//! End-to-end pipeline checks over the public API: whole dumps in, whole
//! dumps out, bit-exact.

use patchdump_core::devices::{jp8080, ms2000};
use patchdump_core::{Bank, FieldValue};

fn ms2000_test_bank(len: usize) -> Bank {
    let patches = (0..len)
        .map(|slot| {
            let mut patch = ms2000::blank_patch().expect("blank");
            let name = format!("Patch {:03}", slot + 1);
            assert!(patch.set("identity", "name", FieldValue::Text(name)));
            assert!(patch.set(
                "timbre1.filter",
                "cutoff",
                FieldValue::Int((slot % 128) as i64)
            ));
            assert!(patch.set(
                "timbre2.amp",
                "panpot",
                FieldValue::Int(slot as i64 % 64 - 32)
            ));
            patch
        })
        .collect();
    Bank {
        device: "ms2000".to_string(),
        patches,
    }
}

#[test]
fn full_ms2000_bank_roundtrips_bit_exact() {
    let bank = ms2000_test_bank(ms2000::BANK_CAPACITY);
    let stream = ms2000::encode_bank(&bank, 2).expect("encode");
    // Header, packed bank payload, terminator.
    assert_eq!(stream.len(), 5 + 37_157 + 1);

    let decoded = ms2000::decode_sysex(&stream).expect("decode");
    assert_eq!(decoded.patches.len(), ms2000::BANK_CAPACITY);
    assert_eq!(decoded.patches, bank.patches);

    // The same bank must re-encode to the same bytes.
    let again = ms2000::encode_bank(&decoded, 2).expect("re-encode");
    assert_eq!(again, stream);
}

#[test]
fn partial_ms2000_bank_is_padded_with_init_programs() {
    let bank = ms2000_test_bank(3);
    let stream = ms2000::encode_bank(&bank, 0).expect("encode");
    let decoded = ms2000::decode_sysex(&stream).expect("decode");
    assert_eq!(decoded.patches.len(), ms2000::BANK_CAPACITY);
    assert_eq!(decoded.patches[..3], bank.patches[..]);
    assert_eq!(decoded.patches[3].name(), Some(""));
    assert_eq!(
        decoded.patches[3].get("timbre1.osc2", "semitone"),
        Some(&FieldValue::Int(0))
    );

    // Padding patches are valid programs, so the decoded bank re-encodes
    // to the same bytes.
    let again = ms2000::encode_bank(&decoded, 0).expect("re-encode");
    assert_eq!(again, stream);
}

#[test]
fn jp8080_bulk_stream_roundtrips_across_slots() {
    let mut stream = Vec::new();
    let mut patches = Vec::new();
    for slot in 0..4 {
        let mut patch = jp8080::blank_patch().expect("blank");
        assert!(patch.set(
            "identity",
            "name",
            FieldValue::Text(format!("Bulk {slot}"))
        ));
        assert!(patch.set("filter", "resonance", FieldValue::Int(20 + slot)));
        assert!(patch.set("voice", "unison", FieldValue::Bool(slot % 2 == 0)));
        for message in jp8080::encode_patch_split(
            &patch,
            jp8080::DEFAULT_DEVICE_ID,
            jp8080::user_patch_address(slot as usize),
        )
        .expect("encode")
        {
            stream.extend(message);
        }
        patches.push(patch);
    }

    let decoded = jp8080::decode_sysex(&stream).expect("decode");
    assert_eq!(decoded.patches, patches);
}

#[test]
fn corrupted_jp8080_body_byte_fails_the_checksum() {
    let patch = jp8080::blank_patch().expect("blank");
    let mut message = jp8080::encode_patch(
        &patch,
        jp8080::DEFAULT_DEVICE_ID,
        jp8080::USER_PATCH_BASE,
    )
    .expect("encode");
    let body_byte = message.len() / 2;
    message[body_byte] ^= 0x01;
    let err = jp8080::decode_sysex(&message).unwrap_err();
    assert!(err.to_string().contains("checksum mismatch"));
}
