mod common;

use common::{PADS, Rig, word_to_bits};
use snespad_core::prelude::*;

// =================================================================
// Read cycle
// =================================================================

#[test]
fn test_select_scenario() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[2]);

    rig.latch();
    let binding = rig.port.binding(0).unwrap();
    assert_eq!(binding.adapter().register(), 0b0000_0000_0000_0100);
    assert!(!rig.data()); // bit 0 (B)

    rig.clock();
    assert!(!rig.data()); // bit 1 (Y)
    rig.clock();
    assert!(rig.data()); // bit 2 (Select)

    for _ in 3..16 {
        rig.clock();
        assert!(!rig.data());
    }

    // 16th clock after the latch is past bit 15
    rig.clock();
    assert!(rig.data());
    assert_eq!(rig.port.binding(0).unwrap().state(), AdapterState::Overrun);
}

#[test]
fn test_every_button_word_reads_back_in_order() {
    let mut rig = Rig::new();
    rig.devices.connect(0, "Full Pad", 16, 0);
    // Route the spare bits to host buttons 12..15 so all 16 bits are live
    for button in SnesButton::ALL.into_iter().filter(|b| b.is_unused()) {
        rig.mappings.set("Full Pad", button, Some(button.bit() as u8));
    }
    rig.attach(0, "Full Pad", PADS).unwrap();

    for word in 0..=u16::MAX {
        let pressed: Vec<usize> = (0..16).filter(|i| (word >> i) & 1 != 0).collect();
        rig.press(0, &pressed);
        assert_eq!(rig.read_bits(), word_to_bits(word), "word {word:#06x}");
    }
}

#[test]
fn test_overrun_holds_data_high() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[]);
    rig.read_bits();

    for _ in 0..100 {
        rig.clock();
        assert!(rig.data());
    }

    // Next latch starts over
    rig.latch();
    assert!(!rig.data());
    assert_eq!(rig.port.binding(0).unwrap().adapter().cursor(), 0);
}

#[test]
fn test_latch_resets_mid_cycle() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[0, 1]);
    rig.latch();
    rig.clock();
    rig.clock();
    rig.clock();

    rig.press(0, &[1]);
    rig.latch();
    assert!(!rig.data()); // B released now
    rig.clock();
    assert!(rig.data()); // Y still pressed
}

#[test]
fn test_register_frozen_between_latches() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[]);
    rig.latch();

    // Pressing after the latch does not change the bits being shifted
    rig.press(0, &[1, 8]);
    rig.clock();
    assert!(!rig.data());
    assert_eq!(rig.port.binding(0).unwrap().adapter().register(), 0);
}

#[test]
fn test_only_rising_edges_advance() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[0]);
    // Each pulse is a rising then a falling edge
    rig.latch();
    rig.clock();
    rig.clock();
    assert_eq!(rig.port.binding(0).unwrap().adapter().cursor(), 2);
}

#[test]
fn test_unused_bits_clear_with_default_mapping() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    let all: Vec<usize> = (0..16).collect();
    rig.press(0, &all);
    assert_eq!(rig.read_bits(), word_to_bits(0x0FFF));
}

#[test]
fn test_absent_device_reads_all_released() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[0, 3, 8]);
    rig.devices.disconnect(0);

    assert_eq!(rig.read_bits(), word_to_bits(0));
    // Reconnecting under the same index picks up again
    rig.devices.connect(0, "Test Pad", 16, 0);
    rig.press(0, &[3]);
    assert_eq!(rig.read_bits(), word_to_bits(1 << 3));
}

#[test]
fn test_small_device_buttons_past_end_read_released() {
    let mut rig = Rig::new();
    rig.devices.connect(0, "Four Button Pad", 4, 0);
    rig.attach(0, "Four Button Pad", PADS).unwrap();
    rig.press(0, &[0, 1, 2, 3]);
    assert_eq!(rig.read_bits(), word_to_bits(0b1111));
}

// =================================================================
// Remapping
// =================================================================

#[test]
fn test_remap_a_to_host_zero_scenario() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.mappings.set("Test Pad", SnesButton::A, Some(0));
    rig.mappings.save_working("Test Pad").unwrap();

    rig.press(0, &[0]);
    let bits = rig.read_bits();
    assert!(bits[SnesButton::A.bit()]);
    // B still bound to host 0 as well: mirrored input
    assert!(bits[SnesButton::B.bit()]);

    // Unbind B: now only A follows host 0
    rig.mappings.set("Test Pad", SnesButton::B, None);
    let bits = rig.read_bits();
    assert!(bits[SnesButton::A.bit()]);
    assert!(!bits[SnesButton::B.bit()]);
}

#[test]
fn test_remap_takes_effect_on_next_latch_only() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[5]);
    rig.latch();

    rig.mappings.set("Test Pad", SnesButton::Down, None);
    for _ in 0..5 {
        rig.clock();
    }
    assert!(rig.data()); // bit 5 (Down) was latched under the old mapping

    assert_eq!(rig.read_bits(), word_to_bits(0));
}

#[test]
fn test_attach_uses_stored_mapping() {
    let mut rig = Rig::new();
    let mut saved = ButtonMapping::new();
    saved.set(SnesButton::Start, Some(9));
    rig.mappings.save("Arcade Stick", &saved).unwrap();

    rig.devices.connect(1, "Arcade Stick", 16, 0);
    rig.attach(1, "Arcade Stick", PADS).unwrap();
    rig.press(1, &[9]);

    let bits = rig.read_bits();
    assert!(bits[SnesButton::Start.bit()]);
    assert!(bits[SnesButton::X.bit()]);
}

// =================================================================
// CPU-side reader
// =================================================================

#[test]
fn test_read_pad_matches_register() {
    let mut rig = Rig::with_pad(0, "Test Pad");
    rig.press(0, &[3, 4, 11]);
    let word = read_pad(&mut rig.pio, PADS).unwrap();
    assert_eq!(word, (1 << 3) | (1 << 4) | (1 << 11));
    assert_eq!(rig.port.binding(0).unwrap().adapter().cursor(), 15);
}

#[test]
fn test_read_pad_rejects_bad_pins() {
    let mut rig = Rig::new();
    let pins = AdapterPins {
        latch: 9,
        clock: 3,
        data: 0,
    };
    assert_eq!(read_pad(&mut rig.pio, pins), Err(PioError::InvalidPin(9)));
}

#[test]
fn test_read_pad_without_adapter_reads_zero() {
    let mut rig = Rig::new();
    assert_eq!(read_pad(&mut rig.pio, PADS).unwrap(), 0);
}
