//! Decoded stage records.
//!
//! Everything here is plain data produced by [`crate::stage_decoder`]. Raw
//! discriminants that do not match a known value are kept in an `Unknown`
//! variant so that output stays complete and the anomaly stays visible.

use crate::game_variant::GameVariant;
use crate::mesh_reconstructor::Triangle;
use crate::vector::{Vector3Angle16, Vector3f};

/// A count/offset pair pointing at an array of fixed-size records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemReference {
    pub count: u32,
    pub offset: u32,
}

impl ItemReference {
    pub fn new(count: u32, offset: u32) -> Self {
        Self { count, offset }
    }

    /// True when the referenced array is absent and must be skipped.
    pub fn is_absent(&self) -> bool {
        self.count == 0 || self.offset == 0
    }
}

/// Spatial partition over a collision field's triangle list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionGroupHeader {
    pub triangle_list_offset: u32,
    pub grid_triangle_list_offset: u32,
    pub grid_start_x: f32,
    pub grid_start_z: f32,
    pub grid_step_x: f32,
    pub grid_step_z: f32,
    pub grid_step_x_count: u32,
    pub grid_step_z_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    Blue,
    Green,
    Red,
    Unknown(u16),
}

impl GoalKind {
    pub const fn name(self) -> &'static str {
        match self {
            GoalKind::Blue => "blue",
            GoalKind::Green => "green",
            GoalKind::Red => "red",
            GoalKind::Unknown(_) => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BananaKind {
    Single,
    Bunch,
}

impl BananaKind {
    /// Type 1 is a bunch; every other value is a single banana.
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => BananaKind::Bunch,
            _ => BananaKind::Single,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BananaKind::Single => "single",
            BananaKind::Bunch => "bunch",
        }
    }
}

/// Interpolation mode between a keyframe and the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Constant,
    Linear,
    Eased,
    Unknown(u32),
}

impl Easing {
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Easing::Constant,
            1 => Easing::Linear,
            2 => Easing::Eased,
            other => Easing::Unknown(other),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Easing::Constant => "CONSTANT",
            Easing::Linear => "LINEAR",
            Easing::Eased => "EASED",
            Easing::Unknown(_) => "UNKNOWN",
        }
    }
}

/// How a collision field's animation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeesawType {
    LoopingAnimation,
    PlayOnceAnimation,
    Seesaw,
    Unknown(u16),
}

impl SeesawType {
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => SeesawType::LoopingAnimation,
            1 => SeesawType::PlayOnceAnimation,
            2 => SeesawType::Seesaw,
            other => SeesawType::Unknown(other),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SeesawType::LoopingAnimation => "LOOPING_ANIMATION",
            SeesawType::PlayOnceAnimation => "PLAY_ONCE_ANIMATION",
            SeesawType::Seesaw => "SEESAW",
            SeesawType::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Animation playback state, used by switches and as a field's initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimState {
    Play,
    Pause,
    PlayBackwards,
    FastForward,
    Unknown(u16),
}

impl AnimState {
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => AnimState::Play,
            1 => AnimState::Pause,
            2 => AnimState::PlayBackwards,
            3 => AnimState::FastForward,
            other => AnimState::Unknown(other),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AnimState::Play => "PLAY",
            AnimState::Pause => "PAUSE",
            AnimState::PlayBackwards => "PLAY_BACKWARDS",
            AnimState::FastForward => "FAST_FORWARD",
            AnimState::Unknown(_) => "UNKNOWN",
        }
    }
}

/// GX fog function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogKind {
    None,
    Linear,
    Exp,
    Exp2,
    RevExp,
    RevExp2,
    Unknown(u8),
}

impl FogKind {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => FogKind::None,
            2 => FogKind::Linear,
            4 => FogKind::Exp,
            5 => FogKind::Exp2,
            6 => FogKind::RevExp,
            7 => FogKind::RevExp2,
            other => FogKind::Unknown(other),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FogKind::None => "GX_FOG_NONE",
            FogKind::Linear => "GX_FOG_LIN",
            FogKind::Exp => "GX_FOG_EXP",
            FogKind::Exp2 => "GX_FOG_EXP2",
            FogKind::RevExp => "GX_FOG_REVEXP",
            FogKind::RevExp2 => "GX_FOG_REVEXP2",
            FogKind::Unknown(_) => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPosition {
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
    pub kind: GoalKind,
}

/// Shared layout of bumpers and jamabars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledObject {
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
    pub scale: Vector3f,
}

pub type Bumper = ScaledObject;
pub type Jamabar = ScaledObject;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Banana {
    pub position: Vector3f,
    pub kind: BananaKind,
}

/// Cone collision volume; `scale` holds radius, height and second radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
    pub scale: Vector3f,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: Vector3f,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub position: Vector3f,
    pub radius: f32,
    pub height: f32,
    pub rotation: Vector3Angle16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloutVolume {
    pub position: Vector3f,
    pub scale: Vector3f,
    pub rotation: Vector3Angle16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectiveModel {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelModel {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Switch {
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
    pub kind: AnimState,
    pub anim_group_id: u16,
}

/// A teleporter. `index` and `destination` are registry indices; `None`
/// means the session's wormhole registry was full.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wormhole {
    pub index: Option<usize>,
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
    pub destination: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundModel {
    pub name: Option<String>,
    pub position: Vector3f,
    pub rotation: Vector3Angle16,
    pub scale: Vector3f,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub kind: FogKind,
    pub start: f32,
    pub end: f32,
    pub color: Vector3f,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub easing: Easing,
    pub time: f32,
    pub value: f32,
}

/// Which transform component an animation track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackChannel {
    RotationX,
    RotationY,
    RotationZ,
    PositionX,
    PositionY,
    PositionZ,
}

impl TrackChannel {
    /// Channels in the order their references appear in an animation header.
    pub const ALL: [TrackChannel; 6] = [
        TrackChannel::RotationX,
        TrackChannel::RotationY,
        TrackChannel::RotationZ,
        TrackChannel::PositionX,
        TrackChannel::PositionY,
        TrackChannel::PositionZ,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    pub channel: TrackChannel,
    pub keyframes: Vec<Keyframe>,
}

/// Animated transform of a collision field. Tracks without keyframes are
/// not present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldAnimation {
    pub tracks: Vec<AnimationTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeesawParameters {
    pub sensitivity: f32,
    pub stiffness: f32,
    pub bounds: f32,
}

/// Per-field data that precedes and follows the item lists in a collision
/// field header.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProperties {
    pub rotation_center: Vector3f,
    pub initial_rotation: Vector3Angle16,
    pub seesaw_type: SeesawType,
    pub animation: Option<FieldAnimation>,
    pub conveyor_speed: Vector3f,
    pub collision_grid: CollisionGroupHeader,
    pub anim_group_id: u16,
    pub seesaw: SeesawParameters,
    pub initial_anim_state: AnimState,
    pub anim_loop_time: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldItems {
    pub goals: Vec<Goal>,
    pub bumpers: Vec<Bumper>,
    pub jamabars: Vec<Jamabar>,
    pub bananas: Vec<Banana>,
    pub cones: Vec<Cone>,
    pub spheres: Vec<Sphere>,
    pub cylinders: Vec<Cylinder>,
    pub fallout_volumes: Vec<FalloutVolume>,
    pub reflective_models: Vec<ReflectiveModel>,
    pub level_models: Vec<LevelModel>,
    pub switches: Vec<Switch>,
    pub wormholes: Vec<Wormhole>,
}

/// One item group. SMB1 stage-level items decode into a field without
/// properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionField {
    pub properties: Option<FieldProperties>,
    pub items: FieldItems,
    pub mesh: Vec<Triangle>,
}

/// An SMB1 collision field that moves: a named model driven by keyframe
/// tracks about its rotation center.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedModel {
    pub name: Option<String>,
    pub rotation_center: Vector3f,
    pub initial_rotation: Vector3Angle16,
    pub animation: FieldAnimation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub variant: GameVariant,
    pub start_positions: Vec<StartPosition>,
    pub fallout_plane: Option<f32>,
    pub background_models: Vec<BackgroundModel>,
    pub fog: Option<Fog>,
    pub collision_fields: Vec<CollisionField>,
    /// Only SMB1 stages carry these; later games animate whole item groups.
    pub animated_models: Vec<AnimatedModel>,
}

impl Stage {
    /// Iterates over the reconstructed triangles of every collision field.
    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.collision_fields.iter().flat_map(|field| field.mesh.iter())
    }
}
