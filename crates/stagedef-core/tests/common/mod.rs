//! Synthetic stage definition buffers for integration tests.

#![allow(dead_code)]

use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub const SMB1_MARKER: [u8; 4] = [0x00, 0x00, 0x00, 0x64];
pub const SMB2_MARKER: [u8; 4] = [0x44, 0x7A, 0x00, 0x00];
pub const SMBX_MARKER: [u8; 4] = [0x00, 0x00, 0x7A, 0x44];

/// Zero-filled buffer with typed writers at absolute offsets.
pub struct StageBuffer<O: ByteOrder> {
    pub data: Vec<u8>,
    order: PhantomData<O>,
}

impl<O: ByteOrder> StageBuffer<O> {
    pub fn new(marker: [u8; 4], size: usize) -> Self {
        let mut data = vec![0u8; size];
        data[4..8].copy_from_slice(&marker);
        Self {
            data,
            order: PhantomData,
        }
    }

    pub fn u8(&mut self, at: usize, v: u8) -> &mut Self {
        self.data[at] = v;
        self
    }

    pub fn u16(&mut self, at: usize, v: u16) -> &mut Self {
        O::write_u16(&mut self.data[at..at + 2], v);
        self
    }

    pub fn u32(&mut self, at: usize, v: u32) -> &mut Self {
        O::write_u32(&mut self.data[at..at + 4], v);
        self
    }

    pub fn f32(&mut self, at: usize, v: f32) -> &mut Self {
        O::write_f32(&mut self.data[at..at + 4], v);
        self
    }

    pub fn vec3(&mut self, at: usize, v: [f32; 3]) -> &mut Self {
        self.f32(at, v[0]).f32(at + 4, v[1]).f32(at + 8, v[2])
    }

    pub fn angles(&mut self, at: usize, v: [u16; 3]) -> &mut Self {
        self.u16(at, v[0]).u16(at + 2, v[1]).u16(at + 4, v[2])
    }

    pub fn item_ref(&mut self, at: usize, count: u32, offset: u32) -> &mut Self {
        self.u32(at, count).u32(at + 4, offset)
    }

    /// Writes `s` followed by a NUL.
    pub fn string(&mut self, at: usize, s: &str) -> &mut Self {
        self.data[at..at + s.len()].copy_from_slice(s.as_bytes());
        self.data[at + s.len()] = 0;
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

pub fn smb1(size: usize) -> StageBuffer<BigEndian> {
    StageBuffer::new(SMB1_MARKER, size)
}

pub fn smb2(size: usize) -> StageBuffer<BigEndian> {
    StageBuffer::new(SMB2_MARKER, size)
}

pub fn smbx(size: usize) -> StageBuffer<LittleEndian> {
    StageBuffer::new(SMBX_MARKER, size)
}

pub const COLLISION_FIELD: usize = 0x100;
pub const START_POSITION: usize = 0x600;
pub const FALLOUT_PLANE: usize = 0x614;
pub const BACKGROUND_MODEL: usize = 0x700;
pub const FOG: usize = 0x780;
pub const ANIMATION: usize = 0x800;
pub const KEYFRAMES: usize = 0x840;
pub const GOAL: usize = 0x900;
pub const BUMPER: usize = 0x920;
pub const BANANAS: usize = 0x940;
pub const SPHERE: usize = 0x960;
pub const REFLECTIVE_MODEL: usize = 0x980;
pub const LEVEL_MODEL: usize = 0x990;
pub const SWITCH: usize = 0x9A0;
pub const REFLECTIVE_NAME: usize = 0x9D0;
pub const LEVEL_MODEL_POINTER: usize = 0x9E0;
pub const LEVEL_MODEL_A: usize = 0x9F0;
pub const TRIANGLES: usize = 0xA00;
pub const LEVEL_MODEL_NAME: usize = 0xA80;
pub const GRID: usize = 0xB00;
pub const WORMHOLE_A: usize = 0xC00;
pub const WORMHOLE_B: usize = 0xC1C;
pub const CONE: usize = 0xD00;
pub const CYLINDER: usize = 0xD20;
pub const FALLOUT_VOLUME: usize = 0xD40;
pub const STAGE_SIZE: usize = 0x1000;

/// Fills an SMB2-layout stage with one collision field carrying one or more
/// of every record kind the layout supports.
///
/// `blue_goal` is the variant's raw blue goal discriminant.
pub fn fill_smb2_layout<O: ByteOrder>(b: &mut StageBuffer<O>, blue_goal: u16) {
    // Stage header.
    b.item_ref(0x8, 1, COLLISION_FIELD as u32)
        .u32(0x10, START_POSITION as u32)
        .u32(0x14, FALLOUT_PLANE as u32)
        .item_ref(0x58, 1, BACKGROUND_MODEL as u32)
        .u32(0xC4, FOG as u32);

    b.vec3(START_POSITION, [1.0, 2.0, 3.0])
        .angles(START_POSITION + 0xC, [0, 16384, 0]);
    b.f32(FALLOUT_PLANE, -20.0);

    b.u32(BACKGROUND_MODEL + 0x4, 0x740)
        .vec3(BACKGROUND_MODEL + 0xC, [5.0, 6.0, 7.0])
        .angles(BACKGROUND_MODEL + 0x18, [0, 0, 32768])
        .vec3(BACKGROUND_MODEL + 0x20, [1.0, 1.0, 1.0])
        .string(0x740, "BG_SKY");

    b.u8(FOG, 2)
        .f32(FOG + 0x4, 10.0)
        .f32(FOG + 0x8, 100.0)
        .vec3(FOG + 0xC, [0.5, 0.25, 1.0]);

    // Collision field.
    let f = COLLISION_FIELD;
    b.vec3(f, [1.0, 0.0, 0.0])
        .angles(f + 0xC, [16384, 0, 0])
        .u16(f + 0x12, 2)
        .u32(f + 0x14, ANIMATION as u32)
        .vec3(f + 0x18, [0.0, 0.0, 1.0]);
    b.u32(f + 0x24, TRIANGLES as u32)
        .u32(f + 0x28, GRID as u32)
        .f32(f + 0x2C, -10.0)
        .f32(f + 0x30, -10.0)
        .f32(f + 0x34, 10.0)
        .f32(f + 0x38, 10.0)
        .u32(f + 0x3C, 2)
        .u32(f + 0x40, 1);
    b.item_ref(f + 0x44, 1, GOAL as u32)
        .item_ref(f + 0x4C, 1, BUMPER as u32)
        .item_ref(f + 0x5C, 2, BANANAS as u32)
        .item_ref(f + 0x64, 1, CONE as u32)
        .item_ref(f + 0x6C, 1, SPHERE as u32)
        .item_ref(f + 0x74, 1, CYLINDER as u32)
        .item_ref(f + 0x7C, 1, FALLOUT_VOLUME as u32)
        .item_ref(f + 0x84, 1, REFLECTIVE_MODEL as u32)
        .item_ref(f + 0x94, 1, LEVEL_MODEL as u32)
        .u16(f + 0xA4, 7)
        .item_ref(f + 0xA8, 1, SWITCH as u32)
        .f32(f + 0xB8, 0.5)
        .f32(f + 0xBC, 0.25)
        .f32(f + 0xC0, 30.0)
        .item_ref(f + 0xC4, 2, WORMHOLE_A as u32)
        .u32(f + 0xCC, 1)
        .f32(f + 0xD4, 60.0);

    // Rotation Y track only.
    b.item_ref(ANIMATION + 0x8, 2, KEYFRAMES as u32);
    b.u32(KEYFRAMES, 1)
        .f32(KEYFRAMES + 0x4, 0.0)
        .f32(KEYFRAMES + 0x8, 0.0)
        .u32(KEYFRAMES + 0x14, 9)
        .f32(KEYFRAMES + 0x18, 2.0)
        .f32(KEYFRAMES + 0x1C, 45.0);

    b.vec3(GOAL, [0.0, 0.0, -50.0]).u16(GOAL + 0x12, blue_goal);

    b.vec3(BUMPER, [3.0, 0.0, 3.0])
        .angles(BUMPER + 0xC, [0, 8192, 0])
        .vec3(BUMPER + 0x14, [1.0, 2.0, 1.0]);

    b.vec3(BANANAS, [0.0, 1.0, 0.0])
        .u32(BANANAS + 0xC, 1)
        .vec3(BANANAS + 0x10, [0.0, 1.0, 4.0])
        .u32(BANANAS + 0x1C, 0);

    b.vec3(SPHERE, [2.0, 2.0, 2.0]).f32(SPHERE + 0xC, 2.5);

    // Padding after each angle triple is nonzero and must be skipped.
    b.vec3(CONE, [4.0, 0.5, -4.0])
        .angles(CONE + 0xC, [0, 0, 16384])
        .u16(CONE + 0x12, 0xFFFF)
        .vec3(CONE + 0x14, [2.0, 3.0, 2.0]);

    b.vec3(CYLINDER, [-4.0, 0.0, 4.0])
        .f32(CYLINDER + 0xC, 1.5)
        .f32(CYLINDER + 0x10, 6.0)
        .angles(CYLINDER + 0x14, [8192, 0, 0])
        .u16(CYLINDER + 0x1A, 0xFFFF);

    b.vec3(FALLOUT_VOLUME, [0.0, -3.0, 0.0])
        .vec3(FALLOUT_VOLUME + 0xC, [10.0, 1.0, 10.0])
        .angles(FALLOUT_VOLUME + 0x18, [0, 32768, 0])
        .u16(FALLOUT_VOLUME + 0x1E, 0xFFFF);

    b.u32(REFLECTIVE_MODEL, REFLECTIVE_NAME as u32)
        .string(REFLECTIVE_NAME, "REFLECT");

    b.u32(LEVEL_MODEL, LEVEL_MODEL_POINTER as u32)
        .u32(LEVEL_MODEL_POINTER + 0x8, LEVEL_MODEL_A as u32)
        .u32(LEVEL_MODEL_A + 0x4, LEVEL_MODEL_NAME as u32)
        .string(LEVEL_MODEL_NAME, "LEVEL_MAIN");

    b.vec3(SWITCH, [9.0, 0.0, 9.0])
        .u16(SWITCH + 0x12, 3)
        .u16(SWITCH + 0x14, 7);

    // One floor triangle referenced from both grid cells.
    b.vec3(TRIANGLES, [0.0, 0.0, 0.0])
        .vec3(TRIANGLES + 0xC, [0.0, 1.0, 0.0])
        .angles(TRIANGLES + 0x18, [16384, 0, 0])
        .f32(TRIANGLES + 0x20, 2.0)
        .f32(TRIANGLES + 0x24, 0.0)
        .f32(TRIANGLES + 0x28, 0.0)
        .f32(TRIANGLES + 0x2C, 2.0);
    b.u32(GRID, 0xB10)
        .u32(GRID + 0x4, 0xB20)
        .u16(0xB10, 0)
        .u16(0xB12, 0xFFFF)
        .u16(0xB20, 0)
        .u16(0xB22, 0xFFFF);

    // Wormhole A links forward to B, B links back to A.
    b.vec3(WORMHOLE_A + 0x4, [-5.0, 0.0, 0.0])
        .u32(WORMHOLE_A + 0x18, WORMHOLE_B as u32)
        .vec3(WORMHOLE_B + 0x4, [5.0, 0.0, 0.0])
        .u32(WORMHOLE_B + 0x18, WORMHOLE_A as u32);
}

pub fn smb2_stage() -> Vec<u8> {
    let mut b = smb2(STAGE_SIZE);
    fill_smb2_layout(&mut b, 0x0001);
    b.into_inner()
}

pub fn smbx_stage() -> Vec<u8> {
    let mut b = smbx(STAGE_SIZE);
    fill_smb2_layout(&mut b, 0x0100);
    b.into_inner()
}

pub const SMB1_FIELDS: usize = 0x300;
pub const SMB1_ANIMATION: usize = 0x4A0;
pub const SMB1_KEYFRAMES: usize = 0x4D0;
pub const SMB1_NAME_POINTER: usize = 0x500;
pub const SMB1_NAME: usize = 0x508;

/// SMB1 stage with one start position, one blue goal and one banana bunch
/// in the stage header, plus a static and an animated collision field.
pub fn smb1_stage() -> Vec<u8> {
    let mut b = smb1(0x600);
    b.item_ref(0x8, 2, SMB1_FIELDS as u32)
        .u32(0x10, 0x100)
        .u32(0x14, 0x114)
        .item_ref(0x18, 1, 0x200)
        .item_ref(0x38, 1, 0x240);
    b.vec3(0x100, [0.0, 5.0, 0.0]);
    b.f32(0x114, -100.0);
    b.vec3(0x200, [0.0, 0.0, -30.0]).u16(0x212, 0x4200);
    b.vec3(0x240, [1.0, 1.0, 1.0]).u32(0x24C, 1);

    // The first field has no animation and is dropped.
    b.vec3(SMB1_FIELDS, [7.0, 7.0, 7.0]);
    let f = SMB1_FIELDS + 0xC4;
    b.vec3(f, [1.0, 2.0, 3.0])
        .angles(f + 0xC, [0, 16384, 0])
        .u16(f + 0x12, 0xBEEF)
        .u32(f + 0x14, SMB1_ANIMATION as u32)
        .u32(f + 0x18, SMB1_NAME_POINTER as u32);

    // Position Y track only.
    b.item_ref(SMB1_ANIMATION + 0x20, 2, SMB1_KEYFRAMES as u32);
    b.u32(SMB1_KEYFRAMES, 0)
        .f32(SMB1_KEYFRAMES + 0x4, 0.0)
        .f32(SMB1_KEYFRAMES + 0x8, -1.0)
        .u32(SMB1_KEYFRAMES + 0x14, 2)
        .f32(SMB1_KEYFRAMES + 0x18, 1.5)
        .f32(SMB1_KEYFRAMES + 0x1C, 4.0);

    b.u32(SMB1_NAME_POINTER, SMB1_NAME as u32)
        .string(SMB1_NAME, "SMB1_LIFT");
    b.into_inner()
}
