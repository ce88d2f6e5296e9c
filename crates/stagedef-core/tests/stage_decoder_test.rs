mod common;

use byteorder::{BigEndian, LittleEndian};
use common::*;
use stagedef_core::{
    decode_stage, AnimState, BananaKind, DecodeOptions, Easing, FogKind, GameVariant, GoalKind,
    ItemReference, SeesawType, Stage, StageDecoder, StageError, TrackChannel, Vector3f,
};

fn decode(data: &[u8]) -> Stage {
    decode_stage(data, DecodeOptions::default()).expect("decode failed")
}

#[test]
fn test_start_position_rotation() {
    let stage = decode(&smb2_stage());
    assert_eq!(stage.variant, GameVariant::Smb2);
    assert_eq!(stage.start_positions.len(), 1);
    let start = stage.start_positions[0];
    assert_eq!(start.position, Vector3f::new(1.0, 2.0, 3.0));
    assert_eq!(start.rotation.to_degrees(), Vector3f::new(0.0, 90.0, 0.0));
    assert_eq!(stage.fallout_plane, Some(-20.0));
}

#[test]
fn test_big_and_little_endian_agree() {
    let big = decode(&smb2_stage());
    let little = decode(&smbx_stage());
    assert_eq!(little.variant, GameVariant::SmbX);
    assert_eq!(big.start_positions, little.start_positions);
    assert_eq!(big.background_models, little.background_models);
    assert_eq!(big.fog, little.fog);
    assert_eq!(big.collision_fields, little.collision_fields);
}

#[test]
fn test_blue_goal_per_variant() {
    for stage in [decode(&smb2_stage()), decode(&smbx_stage()), decode(&smb1_stage())] {
        let goals = &stage.collision_fields.last().unwrap().items.goals;
        assert_eq!(goals.len(), 1, "{}", stage.variant);
        assert_eq!(goals[0].kind, GoalKind::Blue, "{}", stage.variant);
        assert_eq!(goals[0].kind.name(), "blue");
    }
}

#[test]
fn test_unknown_goal_kind() {
    let mut b = smb2(STAGE_SIZE);
    fill_smb2_layout(&mut b, 0x4200);
    let stage = decode(&b.into_inner());
    let goal = stage.collision_fields[0].items.goals[0];
    assert_eq!(goal.kind, GoalKind::Unknown(0x4200));
    assert_eq!(goal.kind.name(), "UNKNOWN");
}

#[test]
fn test_collision_field_items() {
    let stage = decode(&smb2_stage());
    assert_eq!(stage.collision_fields.len(), 1);
    let field = &stage.collision_fields[0];
    let items = &field.items;

    assert_eq!(items.bumpers.len(), 1);
    assert_eq!(items.bumpers[0].scale, Vector3f::new(1.0, 2.0, 1.0));
    assert_eq!(items.bumpers[0].rotation.to_degrees().y, 45.0);
    assert!(items.jamabars.is_empty());

    let kinds: Vec<_> = items.bananas.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![BananaKind::Bunch, BananaKind::Single]);
    assert_eq!(items.bananas[1].position, Vector3f::new(0.0, 1.0, 4.0));

    assert_eq!(items.spheres.len(), 1);
    assert_eq!(items.spheres[0].radius, 2.5);
    assert_eq!(items.cones.len(), 1);
    assert_eq!(items.cylinders.len(), 1);
    assert_eq!(items.fallout_volumes.len(), 1);

    assert_eq!(items.reflective_models[0].name.as_deref(), Some("REFLECT"));
    assert_eq!(items.level_models[0].name.as_deref(), Some("LEVEL_MAIN"));

    assert_eq!(items.switches.len(), 1);
    assert_eq!(items.switches[0].kind, AnimState::FastForward);
    assert_eq!(items.switches[0].anim_group_id, 7);
}

#[test]
fn test_cone_cylinder_fallout_volume() {
    for stage in [decode(&smb2_stage()), decode(&smbx_stage())] {
        let items = &stage.collision_fields[0].items;

        let cone = items.cones[0];
        assert_eq!(cone.position, Vector3f::new(4.0, 0.5, -4.0), "{}", stage.variant);
        assert_eq!(cone.rotation.to_degrees(), Vector3f::new(0.0, 0.0, 90.0));
        assert_eq!(cone.scale, Vector3f::new(2.0, 3.0, 2.0));

        let cylinder = items.cylinders[0];
        assert_eq!(cylinder.position, Vector3f::new(-4.0, 0.0, 4.0), "{}", stage.variant);
        assert_eq!(cylinder.radius, 1.5);
        assert_eq!(cylinder.height, 6.0);
        assert_eq!(cylinder.rotation.to_degrees(), Vector3f::new(45.0, 0.0, 0.0));

        let volume = items.fallout_volumes[0];
        assert_eq!(volume.position, Vector3f::new(0.0, -3.0, 0.0), "{}", stage.variant);
        assert_eq!(volume.scale, Vector3f::new(10.0, 1.0, 10.0));
        assert_eq!(volume.rotation.to_degrees(), Vector3f::new(0.0, 180.0, 0.0));
    }
}

#[test]
fn test_collision_field_properties() {
    let stage = decode(&smb2_stage());
    let properties = stage.collision_fields[0].properties.as_ref().unwrap();
    assert_eq!(properties.rotation_center, Vector3f::new(1.0, 0.0, 0.0));
    assert_eq!(properties.initial_rotation.to_degrees().x, 90.0);
    assert_eq!(properties.seesaw_type, SeesawType::Seesaw);
    assert_eq!(properties.conveyor_speed, Vector3f::new(0.0, 0.0, 1.0));
    assert_eq!(properties.collision_grid.grid_step_x_count, 2);
    assert_eq!(properties.collision_grid.grid_start_z, -10.0);
    assert_eq!(properties.anim_group_id, 7);
    assert_eq!(properties.seesaw.sensitivity, 0.5);
    assert_eq!(properties.seesaw.stiffness, 0.25);
    assert_eq!(properties.seesaw.bounds, 30.0);
    assert_eq!(properties.initial_anim_state, AnimState::Pause);
    assert_eq!(properties.anim_loop_time, 60.0);
}

#[test]
fn test_field_animation() {
    let stage = decode(&smb2_stage());
    let properties = stage.collision_fields[0].properties.as_ref().unwrap();
    let animation = properties.animation.as_ref().unwrap();
    assert_eq!(animation.tracks.len(), 1);
    let track = &animation.tracks[0];
    assert_eq!(track.channel, TrackChannel::RotationY);
    assert_eq!(track.keyframes.len(), 2);
    assert_eq!(track.keyframes[0].easing, Easing::Linear);
    assert_eq!(track.keyframes[1].easing, Easing::Unknown(9));
    assert_eq!(track.keyframes[1].easing.name(), "UNKNOWN");
    assert_eq!(track.keyframes[1].value, 45.0);
}

#[test]
fn test_background_and_fog() {
    let stage = decode(&smbx_stage());
    assert_eq!(stage.background_models.len(), 1);
    let background = &stage.background_models[0];
    assert_eq!(background.name.as_deref(), Some("BG_SKY"));
    assert_eq!(background.position, Vector3f::new(5.0, 6.0, 7.0));
    assert_eq!(background.rotation.to_degrees().z, 180.0);

    let fog = stage.fog.unwrap();
    assert_eq!(fog.kind, FogKind::Linear);
    assert_eq!(fog.start, 10.0);
    assert_eq!(fog.end, 100.0);
    assert_eq!(fog.color, Vector3f::new(0.5, 0.25, 1.0));
}

#[test]
fn test_wormhole_forward_reference() {
    let stage = decode(&smb2_stage());
    let wormholes = &stage.collision_fields[0].items.wormholes;
    assert_eq!(wormholes.len(), 2);
    // A names B as its destination before B itself is decoded.
    assert_eq!(wormholes[0].index, Some(0));
    assert_eq!(wormholes[0].destination, Some(1));
    assert_eq!(wormholes[1].index, Some(1));
    assert_eq!(wormholes[1].destination, Some(0));
    assert_eq!(wormholes[1].position, Vector3f::new(5.0, 0.0, 0.0));
}

#[test]
fn test_wormhole_numbering_is_per_session() {
    let data = smb2_stage();
    let first = decode(&data);
    let second = decode(&data);
    assert_eq!(
        first.collision_fields[0].items.wormholes,
        second.collision_fields[0].items.wormholes
    );
}

#[test]
fn test_record_decoders_restore_cursor() {
    let data = smb2_stage();
    let mut decoder = StageDecoder::<BigEndian>::new(&data, GameVariant::Smb2, DecodeOptions::default());
    decoder.set_position(0x42).unwrap();

    decoder.decode_goals(ItemReference::new(1, GOAL as u32)).unwrap();
    assert_eq!(decoder.position(), 0x42);
    decoder.decode_bananas(ItemReference::new(2, BANANAS as u32)).unwrap();
    assert_eq!(decoder.position(), 0x42);
    decoder.decode_wormholes(ItemReference::new(2, WORMHOLE_A as u32)).unwrap();
    assert_eq!(decoder.position(), 0x42);
    decoder.decode_fog(FOG as u32).unwrap();
    assert_eq!(decoder.position(), 0x42);
    decoder.decode_field_animation(ANIMATION as u32).unwrap();
    assert_eq!(decoder.position(), 0x42);
    decoder.decode_collision_fields(ItemReference::new(1, COLLISION_FIELD as u32)).unwrap();
    assert_eq!(decoder.position(), 0x42);
}

#[test]
fn test_level_model_chain_restores_cursor() {
    let data = smbx_stage();
    let mut decoder =
        StageDecoder::<LittleEndian>::new(&data, GameVariant::SmbX, DecodeOptions::default());
    decoder.set_position(0x10).unwrap();
    let models = decoder
        .decode_level_models(ItemReference::new(1, LEVEL_MODEL as u32))
        .unwrap();
    assert_eq!(models[0].name.as_deref(), Some("LEVEL_MAIN"));
    assert_eq!(decoder.position(), 0x10);
}

#[test]
fn test_level_model_zero_hop_has_no_name() {
    let mut b = smb2(STAGE_SIZE);
    fill_smb2_layout(&mut b, 0x0001);
    b.u32(LEVEL_MODEL_A + 0x4, 0);
    let stage = decode(&b.into_inner());
    assert_eq!(stage.collision_fields[0].items.level_models[0].name, None);
}

#[test]
fn test_smb1_stage_items() {
    let stage = decode(&smb1_stage());
    assert_eq!(stage.variant, GameVariant::Smb1);
    assert_eq!(stage.start_positions.len(), 1);
    assert_eq!(stage.fallout_plane, Some(-100.0));
    assert!(stage.fog.is_none());
    assert_eq!(stage.collision_fields.len(), 1);
    let field = &stage.collision_fields[0];
    assert!(field.properties.is_none());
    assert_eq!(field.items.bananas[0].kind, BananaKind::Bunch);
    assert!(field.mesh.is_empty());
}

#[test]
fn test_smb1_animated_model() {
    let stage = decode(&smb1_stage());
    // Only the second of the two collision fields is animated.
    assert_eq!(stage.animated_models.len(), 1);
    let model = &stage.animated_models[0];
    assert_eq!(model.name.as_deref(), Some("SMB1_LIFT"));
    assert_eq!(model.rotation_center, Vector3f::new(1.0, 2.0, 3.0));
    assert_eq!(model.initial_rotation.to_degrees(), Vector3f::new(0.0, 90.0, 0.0));

    let tracks = &model.animation.tracks;
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].channel, TrackChannel::PositionY);
    assert_eq!(tracks[0].keyframes.len(), 2);
    assert_eq!(tracks[0].keyframes[0].easing, Easing::Constant);
    assert_eq!(tracks[0].keyframes[0].value, -1.0);
    assert_eq!(tracks[0].keyframes[1].easing, Easing::Eased);
    assert_eq!(tracks[0].keyframes[1].time, 1.5);
    assert_eq!(tracks[0].keyframes[1].value, 4.0);

    assert!(decode(&smb2_stage()).animated_models.is_empty());
}

#[test]
fn test_smb1_animated_model_restores_cursor() {
    let data = smb1_stage();
    let mut decoder = StageDecoder::<BigEndian>::new(&data, GameVariant::Smb1, DecodeOptions::default());
    decoder.set_position(0x20).unwrap();
    let models = decoder
        .decode_animated_models(ItemReference::new(2, SMB1_FIELDS as u32))
        .unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(decoder.position(), 0x20);
}

#[test]
fn test_unrecognized_variant() {
    let mut data = smb2_stage();
    data[4..8].copy_from_slice(b"GCNE");
    let err = decode_stage(&data, DecodeOptions::default()).unwrap_err();
    assert!(err.is_unrecognized());
}

#[test]
fn test_truncated_stage_fails() {
    let data = smb2_stage();
    // Cut inside the wormhole records.
    let err = decode_stage(&data[..WORMHOLE_B + 0x8], DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, StageError::OutOfBounds { .. }), "{err}");
}

#[test]
fn test_mesh_disabled() {
    let stage = decode_stage(
        &smb2_stage(),
        DecodeOptions {
            reconstruct_mesh: false,
        },
    )
    .unwrap();
    assert_eq!(stage.triangles().count(), 0);
}
