//! Offset-directed decoding of a whole stage definition.
//!
//! The stage header holds count/offset pairs and bare offsets into the same
//! buffer. [`StageDecoder`] follows each of them, decodes the fixed-stride
//! records found there and restores the cursor before returning, so the
//! order in which records are visited never affects what is decoded.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::animation;
use crate::byte_reader::ByteReader;
use crate::game_variant::{Endian, GameVariant};
use crate::mesh_reconstructor;
use crate::records::{
    AnimState, AnimatedModel, BackgroundModel, Banana, BananaKind, CollisionField, CollisionGroupHeader, Cone,
    Cylinder, FalloutVolume, FieldAnimation, FieldItems, FieldProperties, Fog, FogKind, Goal, GoalKind,
    ItemReference, LevelModel, ReflectiveModel, ScaledObject, SeesawParameters, SeesawType, Sphere,
    Stage, StartPosition, Switch, Wormhole,
};
use crate::status::StageResult;
use crate::wormhole_registry::WormholeRegistry;

pub const START_POSITION_STRIDE: usize = 0x14;
pub const GOAL_STRIDE: usize = 0x14;
pub const BUMPER_STRIDE: usize = 0x20;
pub const JAMABAR_STRIDE: usize = 0x20;
pub const BANANA_STRIDE: usize = 0x10;
pub const CONE_STRIDE: usize = 0x20;
pub const SPHERE_STRIDE: usize = 0x14;
pub const CYLINDER_STRIDE: usize = 0x1C;
pub const FALLOUT_VOLUME_STRIDE: usize = 0x20;
pub const REFLECTIVE_MODEL_STRIDE: usize = 0x8;
pub const LEVEL_MODEL_STRIDE: usize = 0x4;
pub const SWITCH_STRIDE: usize = 0x18;
pub const WORMHOLE_STRIDE: usize = 0x1C;
pub const BACKGROUND_MODEL_STRIDE: usize = 0x38;
pub const COLLISION_FIELD_STRIDE: usize = 0x49C;
pub const SMB1_COLLISION_FIELD_STRIDE: usize = 0xC4;

/// Upper bound on up-front allocation for a record array; counts come from
/// untrusted input.
const MAX_PREALLOC: usize = 1024;

/// Options controlling a decode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Rebuild collision triangles from each field's collision grid.
    pub reconstruct_mesh: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            reconstruct_mesh: true,
        }
    }
}

/// Stage header fields, resolved per variant.
#[derive(Debug, Clone, Copy, Default)]
struct StageHeader {
    collision_fields: ItemReference,
    start_positions: ItemReference,
    fallout_plane_offset: u32,
    background_models: ItemReference,
    fog_offset: u32,
    /// SMB1 keeps goals, bumpers, jamabars and bananas in the stage header.
    stage_items: Option<StageItemReferences>,
    /// SMB1 collision fields, of which only the animated ones are kept.
    animated_models: ItemReference,
}

#[derive(Debug, Clone, Copy, Default)]
struct StageItemReferences {
    goals: ItemReference,
    bumpers: ItemReference,
    jamabars: ItemReference,
    bananas: ItemReference,
}

/// Item list references of one collision field header.
#[derive(Debug, Clone, Copy, Default)]
struct FieldItemReferences {
    goals: ItemReference,
    bumpers: ItemReference,
    jamabars: ItemReference,
    bananas: ItemReference,
    cones: ItemReference,
    spheres: ItemReference,
    cylinders: ItemReference,
    fallout_volumes: ItemReference,
    reflective_models: ItemReference,
    level_models: ItemReference,
    switches: ItemReference,
    wormholes: ItemReference,
}

/// One decode session over a stage definition buffer.
///
/// The byte order `O` is fixed for the session. Wormhole indices are
/// assigned by a registry owned by the session, so two sessions never share
/// numbering.
pub struct StageDecoder<'a, O: ByteOrder> {
    reader: ByteReader<'a, O>,
    variant: GameVariant,
    options: DecodeOptions,
    wormholes: WormholeRegistry,
}

impl<'a, O: ByteOrder> StageDecoder<'a, O> {
    pub fn new(data: &'a [u8], variant: GameVariant, options: DecodeOptions) -> Self {
        Self {
            reader: ByteReader::new(data),
            variant,
            options,
            wormholes: WormholeRegistry::new(),
        }
    }

    pub fn variant(&self) -> GameVariant {
        self.variant
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Moves the cursor. Record decoders leave it unchanged.
    pub fn set_position(&mut self, pos: usize) -> StageResult<()> {
        self.reader.set_position(pos)
    }

    /// Decodes the whole stage.
    pub fn decode(&mut self) -> StageResult<Stage> {
        let header = self.read_header()?;
        log::debug!(
            "{} stage: {} collision fields at {:#x}",
            self.variant,
            header.collision_fields.count,
            header.collision_fields.offset
        );

        let start_positions = self.decode_start_positions(header.start_positions)?;
        let fallout_plane = self.decode_fallout_plane(header.fallout_plane_offset)?;
        let background_models = self.decode_background_models(header.background_models)?;
        let fog = self.decode_fog(header.fog_offset)?;

        let mut collision_fields = self.decode_collision_fields(header.collision_fields)?;
        if let Some(refs) = header.stage_items {
            let items = FieldItems {
                goals: self.decode_goals(refs.goals)?,
                bumpers: self.decode_bumpers(refs.bumpers)?,
                jamabars: self.decode_jamabars(refs.jamabars)?,
                bananas: self.decode_bananas(refs.bananas)?,
                ..FieldItems::default()
            };
            if items != FieldItems::default() {
                collision_fields.push(CollisionField {
                    properties: None,
                    items,
                    mesh: Vec::new(),
                });
            }
        }

        let animated_models = self.decode_animated_models(header.animated_models)?;

        Ok(Stage {
            variant: self.variant,
            start_positions,
            fallout_plane,
            background_models,
            fog,
            collision_fields,
            animated_models,
        })
    }

    fn read_header(&mut self) -> StageResult<StageHeader> {
        let r = &mut self.reader;
        let mut header = StageHeader::default();
        match self.variant {
            GameVariant::Smb2 | GameVariant::SmbX => {
                r.set_position(0x8)?;
                header.collision_fields = r.read_item_reference()?;
                let (start, fallout) = (r.read_u32()?, r.read_u32()?);
                header.start_positions = start_position_reference(start, fallout);
                header.fallout_plane_offset = fallout;
                r.set_position(0x58)?;
                header.background_models = r.read_item_reference()?;
                r.set_position(0xC4)?;
                header.fog_offset = r.read_u32()?;
            }
            GameVariant::Smb1 => {
                r.set_position(0x8)?;
                header.animated_models = r.read_item_reference()?;
                let (start, fallout) = (r.read_u32()?, r.read_u32()?);
                header.start_positions = start_position_reference(start, fallout);
                header.fallout_plane_offset = fallout;
                let goals = r.read_item_reference()?; //      0x18
                r.skip(0x8)?; //                              0x20
                let bumpers = r.read_item_reference()?; //    0x28
                let jamabars = r.read_item_reference()?; //   0x30
                let bananas = r.read_item_reference()?; //    0x38
                header.stage_items = Some(StageItemReferences {
                    goals,
                    bumpers,
                    jamabars,
                    bananas,
                });
                r.set_position(0x68)?;
                header.background_models = r.read_item_reference()?;
            }
        }
        Ok(header)
    }

    /// Runs `f` with the cursor at `offset`, restoring it afterwards even on
    /// error.
    fn with_position<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> StageResult<T>,
    ) -> StageResult<T> {
        let saved = self.reader.position();
        self.reader.set_position(offset)?;
        let result = f(self);
        self.reader.set_position(saved)?;
        result
    }

    /// Decodes `item.count` records of `stride` bytes each. The cursor is
    /// placed at each record's start before `decode` runs.
    fn decode_records<T>(
        &mut self,
        item: ItemReference,
        stride: usize,
        mut decode: impl FnMut(&mut Self) -> StageResult<T>,
    ) -> StageResult<Vec<T>> {
        if item.is_absent() {
            return Ok(Vec::new());
        }
        let base = item.offset as usize;
        self.with_position(base, |this| {
            let count = item.count as usize;
            let mut records = Vec::with_capacity(count.min(MAX_PREALLOC));
            for i in 0..count {
                this.reader.set_position(base + i * stride)?;
                records.push(decode(this)?);
            }
            Ok(records)
        })
    }

    pub fn decode_start_positions(&mut self, item: ItemReference) -> StageResult<Vec<StartPosition>> {
        self.decode_records(item, START_POSITION_STRIDE, |this| {
            let r = &mut this.reader;
            Ok(StartPosition {
                position: r.read_vector3f()?,
                rotation: r.read_angles(true)?,
            })
        })
    }

    /// Reads the fallout plane height. A zero offset means there is none.
    pub fn decode_fallout_plane(&mut self, offset: u32) -> StageResult<Option<f32>> {
        if offset == 0 {
            return Ok(None);
        }
        self.reader
            .with_position(offset as usize, |r| r.read_f32())
            .map(Some)
    }

    pub fn decode_goals(&mut self, item: ItemReference) -> StageResult<Vec<Goal>> {
        let variant = self.variant;
        self.decode_records(item, GOAL_STRIDE, |this| {
            let r = &mut this.reader;
            let start = r.position();
            let position = r.read_vector3f()?;
            let rotation = r.read_angles(false)?;
            let kind = variant.goal_kind(r.read_u16()?);
            if let GoalKind::Unknown(raw) = kind {
                log::warn!("unknown goal type {raw:#06x} at {start:#x}");
            }
            Ok(Goal {
                position,
                rotation,
                kind,
            })
        })
    }

    pub fn decode_bumpers(&mut self, item: ItemReference) -> StageResult<Vec<ScaledObject>> {
        self.decode_records(item, BUMPER_STRIDE, |this| read_scaled_object(&mut this.reader))
    }

    pub fn decode_jamabars(&mut self, item: ItemReference) -> StageResult<Vec<ScaledObject>> {
        self.decode_records(item, JAMABAR_STRIDE, |this| read_scaled_object(&mut this.reader))
    }

    pub fn decode_bananas(&mut self, item: ItemReference) -> StageResult<Vec<Banana>> {
        self.decode_records(item, BANANA_STRIDE, |this| {
            let r = &mut this.reader;
            Ok(Banana {
                position: r.read_vector3f()?,
                kind: BananaKind::from_raw(r.read_u32()?),
            })
        })
    }

    pub fn decode_cones(&mut self, item: ItemReference) -> StageResult<Vec<Cone>> {
        self.decode_records(item, CONE_STRIDE, |this| {
            let r = &mut this.reader;
            Ok(Cone {
                position: r.read_vector3f()?,
                rotation: r.read_angles(true)?,
                scale: r.read_vector3f()?,
            })
        })
    }

    pub fn decode_spheres(&mut self, item: ItemReference) -> StageResult<Vec<Sphere>> {
        self.decode_records(item, SPHERE_STRIDE, |this| {
            let r = &mut this.reader;
            Ok(Sphere {
                position: r.read_vector3f()?,
                radius: r.read_f32()?,
            })
        })
    }

    pub fn decode_cylinders(&mut self, item: ItemReference) -> StageResult<Vec<Cylinder>> {
        self.decode_records(item, CYLINDER_STRIDE, |this| {
            let r = &mut this.reader;
            Ok(Cylinder {
                position: r.read_vector3f()?,
                radius: r.read_f32()?,
                height: r.read_f32()?,
                rotation: r.read_angles(true)?,
            })
        })
    }

    pub fn decode_fallout_volumes(&mut self, item: ItemReference) -> StageResult<Vec<FalloutVolume>> {
        self.decode_records(item, FALLOUT_VOLUME_STRIDE, |this| {
            let r = &mut this.reader;
            Ok(FalloutVolume {
                position: r.read_vector3f()?,
                scale: r.read_vector3f()?,
                rotation: r.read_angles(true)?,
            })
        })
    }

    pub fn decode_reflective_models(
        &mut self,
        item: ItemReference,
    ) -> StageResult<Vec<ReflectiveModel>> {
        self.decode_records(item, REFLECTIVE_MODEL_STRIDE, |this| {
            let name_offset = this.reader.read_u32()?;
            Ok(ReflectiveModel {
                name: this.reader.read_c_string(name_offset)?,
            })
        })
    }

    /// Decodes level model B records, each naming a model through two more
    /// levels of indirection.
    pub fn decode_level_models(&mut self, item: ItemReference) -> StageResult<Vec<LevelModel>> {
        self.decode_records(item, LEVEL_MODEL_STRIDE, |this| {
            let pointer_offset = this.reader.read_u32()?;
            Ok(LevelModel {
                name: this.level_model_name(pointer_offset)?,
            })
        })
    }

    fn level_model_name(&mut self, pointer_offset: u32) -> StageResult<Option<String>> {
        let model_offset = self.level_model_offset(pointer_offset)?;
        let name_offset = self.level_model_name_offset(model_offset)?;
        self.reader.read_c_string(name_offset)
    }

    /// Follows a level model pointer record to its level model A offset.
    fn level_model_offset(&mut self, pointer_offset: u32) -> StageResult<u32> {
        if pointer_offset == 0 {
            return Ok(0);
        }
        self.reader
            .with_position(pointer_offset as usize + 0x8, |r| r.read_u32())
    }

    /// Follows a level model A record to its name offset.
    fn level_model_name_offset(&mut self, model_offset: u32) -> StageResult<u32> {
        if model_offset == 0 {
            return Ok(0);
        }
        self.reader
            .with_position(model_offset as usize + 0x4, |r| r.read_u32())
    }

    pub fn decode_switches(&mut self, item: ItemReference) -> StageResult<Vec<Switch>> {
        self.decode_records(item, SWITCH_STRIDE, |this| {
            let r = &mut this.reader;
            let start = r.position();
            let position = r.read_vector3f()?;
            let rotation = r.read_angles(false)?;
            let kind = AnimState::from_raw(r.read_u16()?);
            if let AnimState::Unknown(raw) = kind {
                log::warn!("unknown switch type {raw} at {start:#x}");
            }
            Ok(Switch {
                position,
                rotation,
                kind,
                anim_group_id: r.read_u16()?,
            })
        })
    }

    /// Decodes wormholes, numbering both the records and their destinations
    /// through the session's registry.
    pub fn decode_wormholes(&mut self, item: ItemReference) -> StageResult<Vec<Wormhole>> {
        self.decode_records(item, WORMHOLE_STRIDE, |this| {
            let record_offset = this.reader.position() as u32;
            this.reader.skip(0x4)?;
            let position = this.reader.read_vector3f()?;
            let rotation = this.reader.read_angles(true)?;
            let destination_offset = this.reader.read_u32()?;

            let index = this.wormholes.index_of(record_offset);
            let destination = match destination_offset {
                // A zero destination is not registered.
                0 => None,
                offset => this.wormholes.index_of(offset),
            };
            Ok(Wormhole {
                index,
                position,
                rotation,
                destination,
            })
        })
    }

    pub fn decode_background_models(
        &mut self,
        item: ItemReference,
    ) -> StageResult<Vec<BackgroundModel>> {
        self.decode_records(item, BACKGROUND_MODEL_STRIDE, |this| {
            let r = &mut this.reader;
            r.skip(0x4)?;
            let name_offset = r.read_u32()?; //   0x4
            r.skip(0x4)?;
            let position = r.read_vector3f()?; // 0xC
            let rotation = r.read_angles(true)?; // 0x18
            let scale = r.read_vector3f()?; //    0x20
            Ok(BackgroundModel {
                name: r.read_c_string(name_offset)?,
                position,
                rotation,
                scale,
            })
        })
    }

    /// Reads the fog block. A zero offset means the stage has no fog.
    pub fn decode_fog(&mut self, offset: u32) -> StageResult<Option<Fog>> {
        if offset == 0 {
            return Ok(None);
        }
        let fog = self.reader.with_position(offset as usize, |r| {
            let kind = FogKind::from_raw(r.read_u8()?);
            r.skip(0x3)?;
            Ok(Fog {
                kind,
                start: r.read_f32()?,
                end: r.read_f32()?,
                color: r.read_vector3f()?,
            })
        })?;
        if let FogKind::Unknown(raw) = fog.kind {
            log::warn!("unknown fog type {raw} at {offset:#x}");
        }
        Ok(Some(fog))
    }

    /// Decodes a collision field's keyframe tracks. A zero offset means the
    /// field is not animated.
    pub fn decode_field_animation(&mut self, header_offset: u32) -> StageResult<Option<FieldAnimation>> {
        animation::decode_field_animation(&mut self.reader, header_offset)
    }

    /// Decodes SMB1 collision fields and keeps those with keyframe animation.
    pub fn decode_animated_models(&mut self, item: ItemReference) -> StageResult<Vec<AnimatedModel>> {
        let fields = self.decode_records(item, SMB1_COLLISION_FIELD_STRIDE, |this| {
            let r = &mut this.reader;
            let rotation_center = r.read_vector3f()?;
            let initial_rotation = r.read_angles(true)?;
            let animation_offset = r.read_u32()?; // 0x14
            let name_pointer = r.read_u32()?; //     0x18
            let Some(animation) = this.decode_field_animation(animation_offset)? else {
                return Ok(None);
            };
            let name_offset = this.pointed_offset(name_pointer)?;
            Ok(Some(AnimatedModel {
                name: this.reader.read_c_string(name_offset)?,
                rotation_center,
                initial_rotation,
                animation,
            }))
        })?;
        Ok(fields.into_iter().flatten().collect())
    }

    /// Reads the offset stored at `pointer`. A zero pointer gives zero.
    fn pointed_offset(&mut self, pointer: u32) -> StageResult<u32> {
        if pointer == 0 {
            return Ok(0);
        }
        self.reader.with_position(pointer as usize, |r| r.read_u32())
    }

    /// Decodes every collision field, including its items and, if enabled,
    /// its reconstructed collision mesh.
    pub fn decode_collision_fields(&mut self, item: ItemReference) -> StageResult<Vec<CollisionField>> {
        self.decode_records(item, COLLISION_FIELD_STRIDE, |this| this.decode_collision_field())
    }

    fn decode_collision_field(&mut self) -> StageResult<CollisionField> {
        let r = &mut self.reader;
        let start = r.position();
        let rotation_center = r.read_vector3f()?; //               0x0
        let initial_rotation = r.read_angles(false)?; //           0xC
        let seesaw_type = SeesawType::from_raw(r.read_u16()?); //  0x12
        let animation_offset = r.read_u32()?; //                   0x14
        let conveyor_speed = r.read_vector3f()?; //                0x18
        let collision_grid = read_collision_group_header(r)?; //   0x24

        let mut refs = FieldItemReferences {
            goals: r.read_item_reference()?,             // 0x44
            bumpers: r.read_item_reference()?,           // 0x4C
            jamabars: r.read_item_reference()?,          // 0x54
            bananas: r.read_item_reference()?,           // 0x5C
            cones: r.read_item_reference()?,             // 0x64
            spheres: r.read_item_reference()?,           // 0x6C
            cylinders: r.read_item_reference()?,         // 0x74
            fallout_volumes: r.read_item_reference()?,   // 0x7C
            reflective_models: r.read_item_reference()?, // 0x84
            ..FieldItemReferences::default()
        };
        r.skip(0x8)?; //                                           0x8C  level model instances
        refs.level_models = r.read_item_reference()?; //           0x94
        r.skip(0x8)?; //                                           0x9C
        let anim_group_id = r.read_u16()?; //                      0xA4
        r.skip(0x2)?;
        refs.switches = r.read_item_reference()?; //               0xA8
        r.skip(0x8)?; //                                           0xB0
        let seesaw = SeesawParameters {
            sensitivity: r.read_f32()?, //                         0xB8
            stiffness: r.read_f32()?,   //                         0xBC
            bounds: r.read_f32()?,      //                         0xC0
        };
        refs.wormholes = r.read_item_reference()?; //              0xC4
        let initial_anim_state = AnimState::from_raw(r.read_u32()? as u16); // 0xCC
        r.skip(0x4)?; //                                           0xD0
        let anim_loop_time = r.read_f32()?; //                     0xD4

        if let SeesawType::Unknown(raw) = seesaw_type {
            log::warn!("unknown animation type {raw} in collision field at {start:#x}");
        }
        if let AnimState::Unknown(raw) = initial_anim_state {
            log::warn!("unknown initial animation state {raw} in collision field at {start:#x}");
        }

        let animation = self.decode_field_animation(animation_offset)?;
        let items = self.decode_field_items(&refs)?;
        let mesh = if self.options.reconstruct_mesh {
            mesh_reconstructor::reconstruct(&mut self.reader, &collision_grid)?
        } else {
            Vec::new()
        };
        log::debug!(
            "collision field at {start:#x}: {} triangles, {} wormholes",
            mesh.len(),
            items.wormholes.len()
        );

        Ok(CollisionField {
            properties: Some(FieldProperties {
                rotation_center,
                initial_rotation,
                seesaw_type,
                animation,
                conveyor_speed,
                collision_grid,
                anim_group_id,
                seesaw,
                initial_anim_state,
                anim_loop_time,
            }),
            items,
            mesh,
        })
    }

    fn decode_field_items(&mut self, refs: &FieldItemReferences) -> StageResult<FieldItems> {
        Ok(FieldItems {
            goals: self.decode_goals(refs.goals)?,
            bumpers: self.decode_bumpers(refs.bumpers)?,
            jamabars: self.decode_jamabars(refs.jamabars)?,
            bananas: self.decode_bananas(refs.bananas)?,
            cones: self.decode_cones(refs.cones)?,
            spheres: self.decode_spheres(refs.spheres)?,
            cylinders: self.decode_cylinders(refs.cylinders)?,
            fallout_volumes: self.decode_fallout_volumes(refs.fallout_volumes)?,
            reflective_models: self.decode_reflective_models(refs.reflective_models)?,
            level_models: self.decode_level_models(refs.level_models)?,
            switches: self.decode_switches(refs.switches)?,
            wormholes: self.decode_wormholes(refs.wormholes)?,
        })
    }
}

/// Start positions have no count; they fill the space up to the fallout
/// plane. Without a usable fallout offset a single start is assumed.
fn start_position_reference(start_offset: u32, fallout_offset: u32) -> ItemReference {
    let count = if fallout_offset > start_offset {
        (fallout_offset - start_offset) / START_POSITION_STRIDE as u32
    } else {
        1
    };
    ItemReference::new(count, start_offset)
}

fn read_scaled_object<O: ByteOrder>(r: &mut ByteReader<'_, O>) -> StageResult<ScaledObject> {
    Ok(ScaledObject {
        position: r.read_vector3f()?,
        rotation: r.read_angles(true)?,
        scale: r.read_vector3f()?,
    })
}

fn read_collision_group_header<O: ByteOrder>(
    r: &mut ByteReader<'_, O>,
) -> StageResult<CollisionGroupHeader> {
    Ok(CollisionGroupHeader {
        triangle_list_offset: r.read_u32()?,
        grid_triangle_list_offset: r.read_u32()?,
        grid_start_x: r.read_f32()?,
        grid_start_z: r.read_f32()?,
        grid_step_x: r.read_f32()?,
        grid_step_z: r.read_f32()?,
        grid_step_x_count: r.read_u32()?,
        grid_step_z_count: r.read_u32()?,
    })
}

/// Detects the game variant of `data` and decodes the stage in that
/// variant's byte order.
///
/// # Errors
///
/// Returns `StageError::UnrecognizedVariant` for buffers that are not a known
/// stage definition and `StageError::OutOfBounds` for any offset or record
/// that runs past the end of `data`.
pub fn decode_stage(data: &[u8], options: DecodeOptions) -> StageResult<Stage> {
    let variant = GameVariant::detect(data)?;
    log::debug!("detected {variant} stage ({} bytes)", data.len());
    match variant.endian() {
        Endian::Big => StageDecoder::<BigEndian>::new(data, variant, options).decode(),
        Endian::Little => StageDecoder::<LittleEndian>::new(data, variant, options).decode(),
    }
}
