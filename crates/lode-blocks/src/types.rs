/// Material id stored in the first byte of each voxel record. `0` is air.
pub type BlockId = u8;

/// Highest light level any voxel may carry.
pub const MAX_LIGHT: u8 = 31;

pub mod ids {
    use super::BlockId;

    pub const AIR: BlockId = 0;
    pub const STONE: BlockId = 1;
    pub const LIGHT: BlockId = 2;
    pub const SAND: BlockId = 3;
}

/// Unpacked copy of one 5-byte voxel record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Voxel {
    pub ty: BlockId,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub light: u8,
}

impl Voxel {
    pub const AIR: Voxel = Voxel { ty: ids::AIR, r: 0, g: 0, b: 0, light: 0 };

    #[inline]
    pub const fn solid(ty: BlockId, r: u8, g: u8, b: u8) -> Self {
        Self { ty, r, g, b, light: 0 }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.ty == ids::AIR
    }

    #[inline]
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}
