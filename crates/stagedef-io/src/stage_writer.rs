//! Serialization of a decoded [`Stage`] as an XML document.
//!
//! Rotations are written in degrees. Absent optional records are omitted;
//! empty item lists produce no elements.

use std::io::Write;

use log::debug;
use stagedef_core::records::{
    AnimatedModel, AnimationTrack, BackgroundModel, Banana, CollisionField, CollisionGroupHeader, Cone, Cylinder,
    FalloutVolume, FieldAnimation, FieldItems, FieldProperties, Fog, Goal, Keyframe, ScaledObject,
    Sphere, Stage, StartPosition, Switch, TrackChannel, Wormhole,
};
use stagedef_core::vector::{Vector3Angle16, Vector3f};

use crate::traits::Writer;
use crate::xml_writer::{Attribute, Tag, XmlError, XmlResult, XmlWriter};

/// Format version written on the root element.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Writes `stage` as a complete document and finishes the writer.
pub fn write_stage<W: Write>(stage: &Stage, xml: &mut XmlWriter<W>) -> XmlResult<()> {
    debug!(
        "writing {} stage with {} item groups",
        stage.variant,
        stage.collision_fields.len()
    );
    xml.start_tag(Tag::Stage)?;
    xml.add_attribute(Attribute::Version, DOCUMENT_VERSION)?;

    for start in &stage.start_positions {
        write_start_position(xml, start)?;
    }
    if let Some(y) = stage.fallout_plane {
        xml.start_tag(Tag::FalloutPlane)?;
        xml.add_attribute(Attribute::Y, y)?;
        xml.end_tag()?;
    }
    for background in &stage.background_models {
        write_background_model(xml, background)?;
    }
    if let Some(fog) = &stage.fog {
        write_fog(xml, fog)?;
    }
    for field in &stage.collision_fields {
        write_collision_field(xml, field)?;
    }
    for model in &stage.animated_models {
        write_animated_model(xml, model)?;
    }

    xml.end_tag()?;
    xml.finish()
}

fn write_vector<W: Write>(xml: &mut XmlWriter<W>, tag: Tag, v: Vector3f) -> XmlResult<()> {
    xml.start_tag(tag)?;
    xml.add_attribute(Attribute::X, v.x)?;
    xml.add_attribute(Attribute::Y, v.y)?;
    xml.add_attribute(Attribute::Z, v.z)?;
    xml.end_tag()
}

fn write_rotation<W: Write>(xml: &mut XmlWriter<W>, tag: Tag, rotation: Vector3Angle16) -> XmlResult<()> {
    write_vector(xml, tag, rotation.to_degrees())
}

fn write_start_position<W: Write>(xml: &mut XmlWriter<W>, start: &StartPosition) -> XmlResult<()> {
    xml.start_tag(Tag::Start)?;
    write_vector(xml, Tag::Position, start.position)?;
    write_rotation(xml, Tag::Rotation, start.rotation)?;
    xml.end_tag()
}

fn write_background_model<W: Write>(
    xml: &mut XmlWriter<W>,
    background: &BackgroundModel,
) -> XmlResult<()> {
    xml.start_tag(Tag::BackgroundModel)?;
    if let Some(name) = &background.name {
        xml.write_element(Tag::Name, name.as_str())?;
    }
    write_vector(xml, Tag::Position, background.position)?;
    write_rotation(xml, Tag::Rotation, background.rotation)?;
    write_vector(xml, Tag::Scale, background.scale)?;
    xml.end_tag()
}

fn write_fog<W: Write>(xml: &mut XmlWriter<W>, fog: &Fog) -> XmlResult<()> {
    xml.start_tag(Tag::Fog)?;
    xml.write_element(Tag::Type, fog.kind.name())?;
    xml.write_element(Tag::Start, fog.start)?;
    xml.write_element(Tag::End, fog.end)?;
    xml.write_element(Tag::Red, fog.color.x)?;
    xml.write_element(Tag::Green, fog.color.y)?;
    xml.write_element(Tag::Blue, fog.color.z)?;
    xml.end_tag()
}

fn write_collision_field<W: Write>(xml: &mut XmlWriter<W>, field: &CollisionField) -> XmlResult<()> {
    xml.start_tag(Tag::ItemGroup)?;
    match &field.properties {
        Some(properties) => write_field_with_properties(xml, properties, &field.items)?,
        None => write_items(xml, &field.items)?,
    }
    xml.end_tag()
}

fn write_animated_model<W: Write>(xml: &mut XmlWriter<W>, model: &AnimatedModel) -> XmlResult<()> {
    xml.start_tag(Tag::AnimatedModel)?;
    if let Some(name) = &model.name {
        xml.write_element(Tag::Name, name.as_str())?;
    }
    write_vector(xml, Tag::RotationCenter, model.rotation_center)?;
    write_rotation(xml, Tag::InitialRotation, model.initial_rotation)?;
    write_animation(xml, &model.animation)?;
    xml.end_tag()
}

fn write_field_with_properties<W: Write>(
    xml: &mut XmlWriter<W>,
    properties: &FieldProperties,
    items: &FieldItems,
) -> XmlResult<()> {
    write_vector(xml, Tag::RotationCenter, properties.rotation_center)?;
    write_rotation(xml, Tag::InitialRotation, properties.initial_rotation)?;
    xml.write_element(Tag::AnimSeesawType, properties.seesaw_type.name())?;
    if let Some(animation) = &properties.animation {
        write_animation(xml, animation)?;
    }
    write_vector(xml, Tag::ConveyorSpeed, properties.conveyor_speed)?;
    write_collision_grid(xml, &properties.collision_grid)?;

    write_items(xml, items)?;
    xml.write_element(Tag::AnimGroupId, properties.anim_group_id)?;
    for switch in &items.switches {
        write_switch(xml, switch)?;
    }

    xml.write_element(Tag::SeesawSensitivity, properties.seesaw.sensitivity)?;
    xml.write_element(Tag::SeesawResetStiffness, properties.seesaw.stiffness)?;
    xml.write_element(Tag::SeesawRotationBounds, properties.seesaw.bounds)?;
    for wormhole in &items.wormholes {
        write_wormhole(xml, wormhole)?;
    }
    xml.write_element(Tag::AnimInitialState, properties.initial_anim_state.name())?;
    xml.write_element(Tag::AnimLoopTime, properties.anim_loop_time)?;
    Ok(())
}

/// Writes the item lists shared by every item group, goals through level
/// models.
fn write_items<W: Write>(xml: &mut XmlWriter<W>, items: &FieldItems) -> XmlResult<()> {
    for goal in &items.goals {
        write_goal(xml, goal)?;
    }
    for bumper in &items.bumpers {
        write_scaled_object(xml, Tag::Bumper, bumper)?;
    }
    for jamabar in &items.jamabars {
        write_scaled_object(xml, Tag::Jamabar, jamabar)?;
    }
    for banana in &items.bananas {
        write_banana(xml, banana)?;
    }
    for cone in &items.cones {
        write_cone(xml, cone)?;
    }
    for sphere in &items.spheres {
        write_sphere(xml, sphere)?;
    }
    for cylinder in &items.cylinders {
        write_cylinder(xml, cylinder)?;
    }
    for volume in &items.fallout_volumes {
        write_fallout_volume(xml, volume)?;
    }
    for model in &items.reflective_models {
        write_named(xml, Tag::ReflectiveModel, model.name.as_deref())?;
    }
    for model in &items.level_models {
        write_named(xml, Tag::LevelModel, model.name.as_deref())?;
    }
    Ok(())
}

fn write_animation<W: Write>(xml: &mut XmlWriter<W>, animation: &FieldAnimation) -> XmlResult<()> {
    if animation.tracks.is_empty() {
        return Ok(());
    }
    xml.start_tag(Tag::AnimKeyframes)?;
    for track in &animation.tracks {
        write_track(xml, track)?;
    }
    xml.end_tag()
}

fn channel_tag(channel: TrackChannel) -> Tag {
    match channel {
        TrackChannel::RotationX => Tag::RotX,
        TrackChannel::RotationY => Tag::RotY,
        TrackChannel::RotationZ => Tag::RotZ,
        TrackChannel::PositionX => Tag::PosX,
        TrackChannel::PositionY => Tag::PosY,
        TrackChannel::PositionZ => Tag::PosZ,
    }
}

fn write_track<W: Write>(xml: &mut XmlWriter<W>, track: &AnimationTrack) -> XmlResult<()> {
    xml.start_tag(channel_tag(track.channel))?;
    for keyframe in &track.keyframes {
        write_keyframe(xml, keyframe)?;
    }
    xml.end_tag()
}

fn write_keyframe<W: Write>(xml: &mut XmlWriter<W>, keyframe: &Keyframe) -> XmlResult<()> {
    xml.start_tag(Tag::Keyframe)?;
    xml.add_attribute(Attribute::Time, keyframe.time)?;
    xml.add_attribute(Attribute::Value, keyframe.value)?;
    xml.add_attribute(Attribute::Easing, keyframe.easing.name())?;
    xml.end_tag()
}

fn write_collision_grid<W: Write>(
    xml: &mut XmlWriter<W>,
    grid: &CollisionGroupHeader,
) -> XmlResult<()> {
    xml.start_tag(Tag::CollisionGrid)?;
    xml.start_tag(Tag::Start)?;
    xml.add_attribute(Attribute::X, grid.grid_start_x)?;
    xml.add_attribute(Attribute::Z, grid.grid_start_z)?;
    xml.end_tag()?;
    xml.start_tag(Tag::Step)?;
    xml.add_attribute(Attribute::X, grid.grid_step_x)?;
    xml.add_attribute(Attribute::Z, grid.grid_step_z)?;
    xml.end_tag()?;
    xml.start_tag(Tag::Count)?;
    xml.add_attribute(Attribute::X, grid.grid_step_x_count)?;
    xml.add_attribute(Attribute::Z, grid.grid_step_z_count)?;
    xml.end_tag()?;
    xml.end_tag()
}

fn write_goal<W: Write>(xml: &mut XmlWriter<W>, goal: &Goal) -> XmlResult<()> {
    xml.start_tag(Tag::Goal)?;
    write_vector(xml, Tag::Position, goal.position)?;
    write_rotation(xml, Tag::Rotation, goal.rotation)?;
    xml.write_element(Tag::Type, goal.kind.name())?;
    xml.end_tag()
}

fn write_scaled_object<W: Write>(
    xml: &mut XmlWriter<W>,
    tag: Tag,
    object: &ScaledObject,
) -> XmlResult<()> {
    xml.start_tag(tag)?;
    write_vector(xml, Tag::Position, object.position)?;
    write_rotation(xml, Tag::Rotation, object.rotation)?;
    write_vector(xml, Tag::Scale, object.scale)?;
    xml.end_tag()
}

fn write_banana<W: Write>(xml: &mut XmlWriter<W>, banana: &Banana) -> XmlResult<()> {
    xml.start_tag(Tag::Banana)?;
    write_vector(xml, Tag::Position, banana.position)?;
    xml.write_element(Tag::Type, banana.kind.name())?;
    xml.end_tag()
}

fn write_cone<W: Write>(xml: &mut XmlWriter<W>, cone: &Cone) -> XmlResult<()> {
    xml.start_tag(Tag::Cone)?;
    write_vector(xml, Tag::Position, cone.position)?;
    write_rotation(xml, Tag::Rotation, cone.rotation)?;
    write_vector(xml, Tag::Scale, cone.scale)?;
    xml.end_tag()
}

fn write_sphere<W: Write>(xml: &mut XmlWriter<W>, sphere: &Sphere) -> XmlResult<()> {
    xml.start_tag(Tag::Sphere)?;
    write_vector(xml, Tag::Position, sphere.position)?;
    xml.write_element(Tag::Radius, sphere.radius)?;
    xml.end_tag()
}

fn write_cylinder<W: Write>(xml: &mut XmlWriter<W>, cylinder: &Cylinder) -> XmlResult<()> {
    xml.start_tag(Tag::Cylinder)?;
    write_vector(xml, Tag::Position, cylinder.position)?;
    xml.write_element(Tag::Radius, cylinder.radius)?;
    xml.write_element(Tag::Height, cylinder.height)?;
    write_rotation(xml, Tag::Rotation, cylinder.rotation)?;
    xml.end_tag()
}

fn write_fallout_volume<W: Write>(xml: &mut XmlWriter<W>, volume: &FalloutVolume) -> XmlResult<()> {
    xml.start_tag(Tag::FalloutVolume)?;
    write_vector(xml, Tag::Position, volume.position)?;
    write_vector(xml, Tag::Scale, volume.scale)?;
    write_rotation(xml, Tag::Rotation, volume.rotation)?;
    xml.end_tag()
}

/// Model references carry their name as element text; unnamed ones
/// self-close.
fn write_named<W: Write>(xml: &mut XmlWriter<W>, tag: Tag, name: Option<&str>) -> XmlResult<()> {
    xml.start_tag(tag)?;
    if let Some(name) = name {
        xml.add_value(name)?;
    }
    xml.end_tag()
}

fn write_switch<W: Write>(xml: &mut XmlWriter<W>, switch: &Switch) -> XmlResult<()> {
    xml.start_tag(Tag::Switch)?;
    write_vector(xml, Tag::Position, switch.position)?;
    write_rotation(xml, Tag::Rotation, switch.rotation)?;
    xml.write_element(Tag::Type, switch.kind.name())?;
    xml.write_element(Tag::AnimGroupId, switch.anim_group_id)?;
    xml.end_tag()
}

/// Registry indices; `-1` marks an index the registry could not assign.
fn index_value(index: Option<usize>) -> i64 {
    index.and_then(|i| i64::try_from(i).ok()).unwrap_or(-1)
}

fn write_wormhole<W: Write>(xml: &mut XmlWriter<W>, wormhole: &Wormhole) -> XmlResult<()> {
    xml.start_tag(Tag::Wormhole)?;
    xml.write_element(Tag::Name, index_value(wormhole.index))?;
    write_vector(xml, Tag::Position, wormhole.position)?;
    write_rotation(xml, Tag::Rotation, wormhole.rotation)?;
    xml.write_element(Tag::DestinationName, index_value(wormhole.destination))?;
    xml.end_tag()
}

/// Whole-document XML writer for the [`Writer`] interface.
///
/// Holds the most recently added stage. With no stage added it writes an
/// empty root element.
#[derive(Debug, Clone, Default)]
pub struct StageXmlWriter {
    stage: Option<Stage>,
}

impl Writer for StageXmlWriter {
    type Error = XmlError;

    fn new() -> Self {
        Self::default()
    }

    fn add_stage(&mut self, stage: &Stage) {
        self.stage = Some(stage.clone());
    }

    fn write_to<S: Write>(&self, sink: S) -> XmlResult<()> {
        let mut xml = XmlWriter::new(sink);
        match &self.stage {
            Some(stage) => write_stage(stage, &mut xml),
            None => {
                xml.start_tag(Tag::Stage)?;
                xml.add_attribute(Attribute::Version, DOCUMENT_VERSION)?;
                xml.end_tag()?;
                xml.finish()
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.stage.is_none()
    }
}
