use crate::constants::Float;

pub const NUM_DIR: usize = 6;

const SIN_60: Float = 0.866_025_403_784_438_6;

// Directions 0..5 run counterclockwise from east in 60 degree steps.
pub const BASIS_X: [Float; NUM_DIR] = [1.0, 0.5, -0.5, -1.0, -0.5, 0.5];
pub const BASIS_Y: [Float; NUM_DIR] = [0.0, SIN_60, SIN_60, 0.0, -SIN_60, -SIN_60];

pub const INV_DIR: [usize; NUM_DIR] = [3, 4, 5, 0, 1, 2];

pub const MIR_DIR_X: [usize; NUM_DIR] = [0, 5, 4, 3, 2, 1];
pub const MIR_DIR_Y: [usize; NUM_DIR] = [3, 2, 1, 0, 5, 4];

// Odd rows sit half a cell east of even rows, which shifts the storage
// column of the four diagonal neighbors.
pub const DISPLACEMENT_X: [[i32; NUM_DIR]; 2] = [
    [1, 0, -1, -1, -1, 0],
    [1, 1, 0, -1, 0, 1],
];
pub const DISPLACEMENT_Y: [[i32; NUM_DIR]; 2] = [
    [0, 1, 1, 0, -1, -1],
    [0, 1, 1, 0, -1, -1],
];

/// Head-on pairs rotate by 60 degrees (tiebreak picks the sense) and the two
/// symmetric triples invert; every other pattern streams through.
pub fn collision_lut() -> Vec<u8> {
    let mut lut = super::identity_collision(NUM_DIR);
    super::install_head_on_cycle(&mut lut, 0);
    super::install_triple_inversion(&mut lut, 0);
    lut
}
