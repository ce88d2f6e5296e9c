//! Keyframe animation tracks of collision fields.

use byteorder::ByteOrder;

use crate::byte_reader::ByteReader;
use crate::records::{AnimationTrack, Easing, FieldAnimation, ItemReference, Keyframe, TrackChannel};
use crate::status::StageResult;

/// Size of one keyframe record.
pub const KEYFRAME_STRIDE: usize = 0x14;

/// Decodes the six-track animation header at `header_offset`.
///
/// Returns `None` for a zero offset. Tracks whose reference is absent are
/// left out of the result. The cursor is left where it was.
pub fn decode_field_animation<O: ByteOrder>(
    reader: &mut ByteReader<'_, O>,
    header_offset: u32,
) -> StageResult<Option<FieldAnimation>> {
    if header_offset == 0 {
        return Ok(None);
    }
    //                                                Offset  Size
    // rot X, rot Y, rot Z, pos X, pos Y, pos Z       0x0     6 * 0x8
    let references = reader.with_position(header_offset as usize, |r| {
        let mut references = [ItemReference::default(); 6];
        for reference in references.iter_mut() {
            *reference = r.read_item_reference()?;
        }
        Ok(references)
    })?;

    let mut tracks = Vec::new();
    for (channel, reference) in TrackChannel::ALL.into_iter().zip(references) {
        if reference.is_absent() {
            continue;
        }
        tracks.push(AnimationTrack {
            channel,
            keyframes: decode_keyframes(reader, reference)?,
        });
    }
    Ok(Some(FieldAnimation { tracks }))
}

/// Decodes one keyframe sequence. The cursor is left where it was.
pub fn decode_keyframes<O: ByteOrder>(
    reader: &mut ByteReader<'_, O>,
    reference: ItemReference,
) -> StageResult<Vec<Keyframe>> {
    if reference.is_absent() {
        return Ok(Vec::new());
    }
    let base = reference.offset as usize;
    reader.with_position(base, |r| {
        let mut keyframes = Vec::new();
        for i in 0..reference.count as usize {
            r.set_position(base + i * KEYFRAME_STRIDE)?;
            //                                        Offset  Size
            let raw_easing = r.read_u32()?; //        0x0     0x4
            let time = r.read_f32()?; //              0x4     0x4   seconds
            let value = r.read_f32()?; //             0x8     0x4
            //                                        0xC     0x8   unknown
            let easing = Easing::from_raw(raw_easing);
            if let Easing::Unknown(raw) = easing {
                log::warn!("unknown keyframe easing {raw} at {:#x}", base + i * KEYFRAME_STRIDE);
            }
            keyframes.push(Keyframe { easing, time, value });
        }
        Ok(keyframes)
    })
}
