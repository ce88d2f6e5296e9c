mod common;

use byteorder::BigEndian;
use common::*;
use proptest::prelude::*;
use stagedef_core::{DecodeOptions, GameVariant, ItemReference, StageDecoder};

proptest! {
    /// Whatever a count/offset pair points at, decoding it leaves the cursor
    /// where it was, on success and on failure.
    #[test]
    fn decoding_any_reference_restores_cursor(
        start in 0usize..STAGE_SIZE,
        count in 0u32..8,
        offset in 0u32..(STAGE_SIZE as u32 + 0x40),
    ) {
        let data = smb2_stage();
        let mut decoder = StageDecoder::<BigEndian>::new(&data, GameVariant::Smb2, DecodeOptions::default());
        decoder.set_position(start).unwrap();
        let item = ItemReference::new(count, offset);

        let _ = decoder.decode_goals(item);
        prop_assert_eq!(decoder.position(), start);
        let _ = decoder.decode_cylinders(item);
        prop_assert_eq!(decoder.position(), start);
        let _ = decoder.decode_background_models(item);
        prop_assert_eq!(decoder.position(), start);
        let _ = decoder.decode_level_models(item);
        prop_assert_eq!(decoder.position(), start);
        let _ = decoder.decode_wormholes(item);
        prop_assert_eq!(decoder.position(), start);
        let _ = decoder.decode_fog(offset);
        prop_assert_eq!(decoder.position(), start);
    }

    #[test]
    fn absent_reference_is_empty(count in 0u32..100, start in 0usize..STAGE_SIZE) {
        let data = smb2_stage();
        let mut decoder = StageDecoder::<BigEndian>::new(&data, GameVariant::Smb2, DecodeOptions::default());
        decoder.set_position(start).unwrap();
        let switches = decoder.decode_switches(ItemReference::new(count, 0)).unwrap();
        prop_assert!(switches.is_empty());
        let cones = decoder.decode_cones(ItemReference::new(0, 0x100)).unwrap();
        prop_assert!(cones.is_empty());
        prop_assert_eq!(decoder.position(), start);
    }
}
