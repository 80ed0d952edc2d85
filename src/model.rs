// ------------------------------------------------------------------------------- MODULES

pub mod fhp_i;
pub mod fhp_ii;
pub mod fhp_iii;
pub mod hpp;

// ------------------------------------------------------------------------------- IMPORTS

use crate::constants::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Hpp,
    FhpI,
    FhpII,
    FhpIII,
}

impl Model {
    /// # Examples
    /// ```
    /// # use lgflow::model::Model;
    /// assert_eq!(Model::from_name("fhp-ii"), Some(Model::FhpII));
    /// assert_eq!(Model::from_name("navier-stokes"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Model> {
        match name {
            "hpp" => Some(Model::Hpp),
            "fhp-i" => Some(Model::FhpI),
            "fhp-ii" => Some(Model::FhpII),
            "fhp-iii" => Some(Model::FhpIII),
            _ => None,
        }
    }

    pub fn is_fhp(&self) -> bool {
        !matches!(self, Model::Hpp)
    }

    pub fn get_model_parameters(&self) -> Parameters {
        match self {
            Model::Hpp => Parameters {
                model: Model::Hpp,
                num_dir: hpp::NUM_DIR,
                num_active_dir: hpp::NUM_DIR,
                basis_x: hpp::BASIS_X.to_vec(),
                basis_y: hpp::BASIS_Y.to_vec(),
                inv_dir: hpp::INV_DIR.to_vec(),
                mir_dir_x: hpp::MIR_DIR_X.to_vec(),
                mir_dir_y: hpp::MIR_DIR_Y.to_vec(),
                displacement_x: hpp::DISPLACEMENT_X.iter().map(|row| row.to_vec()).collect(),
                displacement_y: hpp::DISPLACEMENT_Y.iter().map(|row| row.to_vec()).collect(),
                collision_lut: hpp::collision_lut(),
                bounce_back_lut: permutation_lut(hpp::NUM_DIR, &hpp::INV_DIR),
                bounce_forward_x_lut: permutation_lut(hpp::NUM_DIR, &hpp::MIR_DIR_X),
                bounce_forward_y_lut: permutation_lut(hpp::NUM_DIR, &hpp::MIR_DIR_Y),
            },
            Model::FhpI => Parameters {
                model: Model::FhpI,
                num_dir: fhp_i::NUM_DIR,
                num_active_dir: fhp_i::NUM_DIR,
                basis_x: fhp_i::BASIS_X.to_vec(),
                basis_y: fhp_i::BASIS_Y.to_vec(),
                inv_dir: fhp_i::INV_DIR.to_vec(),
                mir_dir_x: fhp_i::MIR_DIR_X.to_vec(),
                mir_dir_y: fhp_i::MIR_DIR_Y.to_vec(),
                displacement_x: fhp_i::DISPLACEMENT_X
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
                displacement_y: fhp_i::DISPLACEMENT_Y
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
                collision_lut: fhp_i::collision_lut(),
                bounce_back_lut: permutation_lut(fhp_i::NUM_DIR, &fhp_i::INV_DIR),
                bounce_forward_x_lut: permutation_lut(fhp_i::NUM_DIR, &fhp_i::MIR_DIR_X),
                bounce_forward_y_lut: permutation_lut(fhp_i::NUM_DIR, &fhp_i::MIR_DIR_Y),
            },
            Model::FhpII => Parameters {
                model: Model::FhpII,
                num_dir: fhp_ii::NUM_DIR,
                num_active_dir: fhp_ii::NUM_DIR,
                basis_x: fhp_ii::BASIS_X.to_vec(),
                basis_y: fhp_ii::BASIS_Y.to_vec(),
                inv_dir: fhp_ii::INV_DIR.to_vec(),
                mir_dir_x: fhp_ii::MIR_DIR_X.to_vec(),
                mir_dir_y: fhp_ii::MIR_DIR_Y.to_vec(),
                displacement_x: fhp_ii::DISPLACEMENT_X
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
                displacement_y: fhp_ii::DISPLACEMENT_Y
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
                collision_lut: fhp_ii::collision_lut(),
                bounce_back_lut: permutation_lut(fhp_ii::NUM_DIR, &fhp_ii::INV_DIR),
                bounce_forward_x_lut: permutation_lut(fhp_ii::NUM_DIR, &fhp_ii::MIR_DIR_X),
                bounce_forward_y_lut: permutation_lut(fhp_ii::NUM_DIR, &fhp_ii::MIR_DIR_Y),
            },
            Model::FhpIII => Parameters {
                model: Model::FhpIII,
                num_dir: fhp_iii::NUM_DIR,
                num_active_dir: fhp_iii::NUM_ACTIVE_DIR,
                basis_x: fhp_iii::BASIS_X.to_vec(),
                basis_y: fhp_iii::BASIS_Y.to_vec(),
                inv_dir: fhp_iii::INV_DIR.to_vec(),
                mir_dir_x: fhp_iii::MIR_DIR_X.to_vec(),
                mir_dir_y: fhp_iii::MIR_DIR_Y.to_vec(),
                displacement_x: fhp_iii::DISPLACEMENT_X
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
                displacement_y: fhp_iii::DISPLACEMENT_Y
                    .iter()
                    .map(|row| row.to_vec())
                    .collect(),
                collision_lut: fhp_iii::collision_lut(),
                bounce_back_lut: permutation_lut(fhp_iii::NUM_DIR, &fhp_iii::INV_DIR),
                bounce_forward_x_lut: permutation_lut(fhp_iii::NUM_DIR, &fhp_iii::MIR_DIR_X),
                bounce_forward_y_lut: permutation_lut(fhp_iii::NUM_DIR, &fhp_iii::MIR_DIR_Y),
            },
        }
    }
}

// -------------------------------------------------------------------- STRUCT: Parameters

/// Runtime-resolved model descriptor. The stepping kernel reads this record
/// without branching on the model; models differ only in direction count and
/// table contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub model: Model,
    pub num_dir: usize,
    /// Directions eligible to carry particles. Smaller than `num_dir` only
    /// for FHP-III, whose eighth slot is reserved and never populated.
    pub num_active_dir: usize,
    pub basis_x: Vec<Float>,
    pub basis_y: Vec<Float>,
    pub inv_dir: Vec<usize>,
    pub mir_dir_x: Vec<usize>,
    pub mir_dir_y: Vec<usize>,
    /// Integer x-displacement to the neighbor in each direction, indexed by
    /// row parity then direction. Odd FHP rows sit half a cell east, so the
    /// two parities disagree on the diagonals.
    pub displacement_x: Vec<Vec<i32>>,
    pub displacement_y: Vec<Vec<i32>>,
    /// Output pattern per input pattern and tiebreak bit, `(pattern << 1) | bit`.
    pub collision_lut: Vec<u8>,
    pub bounce_back_lut: Vec<u8>,
    pub bounce_forward_x_lut: Vec<u8>,
    pub bounce_forward_y_lut: Vec<u8>,
}

impl Default for Parameters {
    fn default() -> Self {
        Model::FhpI.get_model_parameters()
    }
}

/// # Examples
/// ```
/// # use lgflow::model::Model;
/// let model_parameters = Model::FhpI.get_model_parameters();
/// assert_eq!(model_parameters.get_num_dir(), 6);
/// assert_eq!(model_parameters.get_opposite_direction(1), 4);
/// assert_eq!(model_parameters.bounce_back(0b000010), 0b010000);
/// ```
impl Parameters {
    pub fn get_model(&self) -> Model {
        self.model
    }

    pub fn get_num_dir(&self) -> usize {
        self.num_dir
    }

    pub fn get_num_active_dir(&self) -> usize {
        self.num_active_dir
    }

    pub fn get_basis_x(&self) -> &[Float] {
        &self.basis_x
    }

    pub fn get_basis_y(&self) -> &[Float] {
        &self.basis_y
    }

    pub fn get_opposite_direction(&self, direction: usize) -> usize {
        self.inv_dir[direction]
    }

    pub fn get_mirrored_direction_x(&self, direction: usize) -> usize {
        self.mir_dir_x[direction]
    }

    pub fn get_mirrored_direction_y(&self, direction: usize) -> usize {
        self.mir_dir_y[direction]
    }

    pub fn get_displacement_x(&self, parity: usize, direction: usize) -> i32 {
        self.displacement_x[parity][direction]
    }

    pub fn get_displacement_y(&self, parity: usize, direction: usize) -> i32 {
        self.displacement_y[parity][direction]
    }

    pub fn collide(&self, pattern: u8, tiebreak: bool) -> u8 {
        self.collision_lut[((pattern as usize) << 1) | usize::from(tiebreak)]
    }

    pub fn bounce_back(&self, pattern: u8) -> u8 {
        self.bounce_back_lut[pattern as usize]
    }

    pub fn bounce_forward_x(&self, pattern: u8) -> u8 {
        self.bounce_forward_x_lut[pattern as usize]
    }

    pub fn bounce_forward_y(&self, pattern: u8) -> u8 {
        self.bounce_forward_y_lut[pattern as usize]
    }
}

// -------------------------------------------------------------------- TABLE CONSTRUCTION

/// Expands a per-direction permutation into a full pattern table.
pub(crate) fn permutation_lut(num_dir: usize, map: &[usize]) -> Vec<u8> {
    (0..1usize << num_dir)
        .map(|pattern| {
            let mut out = 0u8;
            for dir in 0..num_dir {
                if pattern & (1 << dir) != 0 {
                    out |= 1 << map[dir];
                }
            }
            out
        })
        .collect()
}

/// Identity collision table over `2^num_dir` patterns and both tiebreak bits.
pub(crate) fn identity_collision(num_dir: usize) -> Vec<u8> {
    (0..1usize << num_dir)
        .flat_map(|pattern| [pattern as u8, pattern as u8])
        .collect()
}

pub(crate) const FHP_MOVING_MASK: u8 = 0b0011_1111;

/// The head-on pair along one of the three FHP axes (or, taken mod 3, the
/// axis a direction belongs to).
pub(crate) fn head_on_pair(axis: usize) -> u8 {
    let axis = axis % 3;
    (1 << axis) | (1 << (axis + 3))
}

/// Head-on pairs rotate by 60 degrees, the sense picked by the tiebreak bit.
/// `spectator_bits` is carried through unchanged on every pattern.
pub(crate) fn install_head_on_cycle(lut: &mut [u8], spectator_bits: u8) {
    for axis in 0..3 {
        let here = head_on_pair(axis) | spectator_bits;
        let counterclockwise = head_on_pair(axis + 1) | spectator_bits;
        let clockwise = head_on_pair(axis + 2) | spectator_bits;
        lut[(here as usize) << 1] = counterclockwise;
        lut[((here as usize) << 1) | 1] = clockwise;
    }
}

/// Four-body head-on patterns (the two vacant moving directions are opposite)
/// rotate by 60 degrees, the sense picked by the tiebreak bit.
pub(crate) fn install_four_body_cycle(lut: &mut [u8], spectator_bits: u8) {
    for axis in 0..3 {
        let here = (!head_on_pair(axis) & FHP_MOVING_MASK) | spectator_bits;
        let counterclockwise = (!head_on_pair(axis + 1) & FHP_MOVING_MASK) | spectator_bits;
        let clockwise = (!head_on_pair(axis + 2) & FHP_MOVING_MASK) | spectator_bits;
        lut[(here as usize) << 1] = counterclockwise;
        lut[((here as usize) << 1) | 1] = clockwise;
    }
}

const TRIPLE_EVEN: u8 = 0b01_0101;
const TRIPLE_ODD: u8 = 0b10_1010;

/// Symmetric three-body patterns invert all their directions.
pub(crate) fn install_triple_inversion(lut: &mut [u8], spectator_bits: u8) {
    for tiebreak in 0..2 {
        lut[(((TRIPLE_EVEN | spectator_bits) as usize) << 1) | tiebreak] =
            TRIPLE_ODD | spectator_bits;
        lut[(((TRIPLE_ODD | spectator_bits) as usize) << 1) | tiebreak] =
            TRIPLE_EVEN | spectator_bits;
    }
}

/// One particle plus the rest particle trades with the narrow pair around the
/// same direction; both carry the momentum of a single unit vector.
pub(crate) fn install_rest_exchange(lut: &mut [u8], rest_bit: u8) {
    for dir in 0..6 {
        let single = (1u8 << dir) | rest_bit;
        let narrow = (1u8 << ((dir + 1) % 6)) | (1u8 << ((dir + 5) % 6));
        for tiebreak in 0..2 {
            lut[((single as usize) << 1) | tiebreak] = narrow;
            lut[((narrow as usize) << 1) | tiebreak] = single;
        }
    }
}

/// A head-on pair with one moving spectator rotates away from the spectator;
/// the other rotation sense is always blocked, so the exchange is its own
/// inverse.
pub(crate) fn install_pair_spectator(lut: &mut [u8], spectator_bits: u8) {
    for axis in 0..3 {
        let pair = head_on_pair(axis);
        for spectator in 0..6u8 {
            if pair & (1 << spectator) != 0 {
                continue;
            }
            let here = pair | (1 << spectator) | spectator_bits;
            let counterclockwise = head_on_pair(axis + 1);
            let rotated = if counterclockwise & (1 << spectator) == 0 {
                counterclockwise
            } else {
                head_on_pair(axis + 2)
            };
            let out = rotated | (1 << spectator) | spectator_bits;
            for tiebreak in 0..2 {
                lut[((here as usize) << 1) | tiebreak] = out;
            }
        }
    }
}

// ---------------------------------------------------------------------------------- TESTS

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS: [Model; 4] = [Model::Hpp, Model::FhpI, Model::FhpII, Model::FhpIII];

    fn momentum(params: &Parameters, pattern: u8) -> (Float, Float) {
        let mut momentum_x = 0.0;
        let mut momentum_y = 0.0;
        for dir in 0..params.get_num_dir() {
            if pattern & (1 << dir) != 0 {
                momentum_x += params.get_basis_x()[dir];
                momentum_y += params.get_basis_y()[dir];
            }
        }
        (momentum_x, momentum_y)
    }

    #[test]
    fn test_collision_conserves_mass_and_momentum() {
        for model in MODELS {
            let params = model.get_model_parameters();
            for pattern in 0..1u16 << params.get_num_dir() {
                let pattern = pattern as u8;
                for tiebreak in [false, true] {
                    let out = params.collide(pattern, tiebreak);
                    assert_eq!(
                        out.count_ones(),
                        pattern.count_ones(),
                        "mass changed for {model:?} pattern {pattern:#010b}"
                    );
                    let (in_x, in_y) = momentum(&params, pattern);
                    let (out_x, out_y) = momentum(&params, out);
                    assert!(
                        (in_x - out_x).abs() < 1e-9 && (in_y - out_y).abs() < 1e-9,
                        "momentum changed for {model:?} pattern {pattern:#010b}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_luts_are_permutations() {
        for model in MODELS {
            let params = model.get_model_parameters();
            let num_patterns = 1usize << params.get_num_dir();
            for tiebreak in [false, true] {
                let mut seen = vec![false; num_patterns];
                for pattern in 0..num_patterns {
                    seen[params.collide(pattern as u8, tiebreak) as usize] = true;
                }
                assert!(seen.iter().all(|&hit| hit), "collision not bijective: {model:?}");
            }
            for lut in [
                &params.bounce_back_lut,
                &params.bounce_forward_x_lut,
                &params.bounce_forward_y_lut,
            ] {
                let mut seen = vec![false; num_patterns];
                for pattern in 0..num_patterns {
                    seen[lut[pattern] as usize] = true;
                }
                assert!(seen.iter().all(|&hit| hit), "bounce not bijective: {model:?}");
            }
        }
    }

    #[test]
    fn test_bounce_back_is_an_involution() {
        for model in MODELS {
            let params = model.get_model_parameters();
            for pattern in 0..1u16 << params.get_num_dir() {
                let pattern = pattern as u8;
                assert_eq!(params.bounce_back(params.bounce_back(pattern)), pattern);
            }
        }
    }

    #[test]
    fn test_mirror_maps_match_the_basis() {
        for model in MODELS {
            let params = model.get_model_parameters();
            for dir in 0..params.get_num_dir() {
                let across_x = params.get_mirrored_direction_x(dir);
                assert!((params.get_basis_x()[across_x] - params.get_basis_x()[dir]).abs() < 1e-12);
                assert!((params.get_basis_y()[across_x] + params.get_basis_y()[dir]).abs() < 1e-12);
                let across_y = params.get_mirrored_direction_y(dir);
                assert!((params.get_basis_x()[across_y] + params.get_basis_x()[dir]).abs() < 1e-12);
                assert!((params.get_basis_y()[across_y] - params.get_basis_y()[dir]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_hpp_head_on_entry() {
        let params = Model::Hpp.get_model_parameters();
        assert_eq!(params.collide(0b0101, false), 0b1010);
        assert_eq!(params.collide(0b0101, true), 0b1010);
        assert_eq!(params.collide(0b1010, false), 0b0101);
        // A lone particle streams through unchanged.
        assert_eq!(params.collide(0b0001, true), 0b0001);
    }

    #[test]
    fn test_fhp_i_head_on_rotation_depends_on_tiebreak() {
        let params = Model::FhpI.get_model_parameters();
        let east_west = 0b001001;
        assert_eq!(params.collide(east_west, false), 0b010010);
        assert_eq!(params.collide(east_west, true), 0b100100);
        assert_eq!(params.collide(0b010101, false), 0b101010);
        assert_eq!(params.collide(0b101010, true), 0b010101);
    }

    #[test]
    fn test_fhp_ii_rest_exchange() {
        let params = Model::FhpII.get_model_parameters();
        let rest = 1u8 << fhp_ii::REST_DIR;
        let single_east = 0b000001 | rest;
        let narrow_pair = 0b100010;
        assert_eq!(params.collide(single_east, false), narrow_pair);
        assert_eq!(params.collide(narrow_pair, true), single_east);
    }

    #[test]
    fn test_fhp_iii_extra_collisions() {
        let params = Model::FhpIII.get_model_parameters();
        // Pair {0,3} with spectator 1 can only rotate clockwise.
        assert_eq!(params.collide(0b001011, false), 0b100110);
        assert_eq!(params.collide(0b100110, false), 0b001011);
        // Four-body head-on rotation with the rest slot preserved.
        let rest = 1u8 << fhp_iii::REST_DIR;
        let four_body = 0b110110 | rest;
        assert_eq!(params.collide(four_body, false), 0b101101 | rest);
        // The reserved slot passes through untouched.
        let reserved = 1u8 << fhp_iii::RESERVED_DIR;
        assert_eq!(params.collide(0b001001 | reserved, false), 0b010010 | reserved);
    }
}
