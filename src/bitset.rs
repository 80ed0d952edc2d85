// ------------------------------------------------------------------------------- IMPORTS

use rand::Rng;

pub const BITS_PER_BLOCK: usize = 64;

const BYTES_PER_BLOCK: usize = BITS_PER_BLOCK / 8;

// ------------------------------------------------------------------------ STRUCT: Bitset

/// Compact boolean array packed into 64-bit blocks, addressable bit-, byte-
/// and block-at-a-time.
///
/// # Examples
/// ```
/// # use lgflow::bitset::Bitset;
/// let mut bitset = Bitset::new(100);
/// bitset.set(3, true);
/// bitset.set(64, true);
///
/// assert_eq!(bitset.len(), 100);
/// assert!(!bitset.is_empty());
/// assert!(bitset.get(3));
/// assert!(!bitset.get(4));
/// assert_eq!(bitset.popcount(), 2);
///
/// bitset.set(3, false);
/// assert_eq!(bitset.popcount(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitset {
    num_bits: usize,
    blocks: Vec<u64>,
}

impl Bitset {
    pub fn new(num_bits: usize) -> Self {
        let num_blocks = num_bits.div_ceil(BITS_PER_BLOCK);
        Bitset {
            num_bits,
            blocks: vec![0; num_blocks],
        }
    }

    pub fn len(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    pub fn get(&self, bit: usize) -> bool {
        debug_assert!(bit < self.num_bits);
        self.blocks[bit / BITS_PER_BLOCK] & (1 << (bit % BITS_PER_BLOCK)) != 0
    }

    pub fn set(&mut self, bit: usize, value: bool) {
        debug_assert!(bit < self.num_bits);
        let mask = 1 << (bit % BITS_PER_BLOCK);
        if value {
            self.blocks[bit / BITS_PER_BLOCK] |= mask;
        } else {
            self.blocks[bit / BITS_PER_BLOCK] &= !mask;
        }
    }

    /// # Examples
    /// ```
    /// # use lgflow::bitset::Bitset;
    /// let mut bitset = Bitset::new(32);
    /// bitset.set_byte(2, 0b1010_0001);
    ///
    /// assert_eq!(bitset.get_byte(2), 0b1010_0001);
    /// assert!(bitset.get(16));
    /// assert!(bitset.get(21));
    /// assert!(bitset.get(23));
    /// ```
    pub fn get_byte(&self, byte: usize) -> u8 {
        (self.blocks[byte / BYTES_PER_BLOCK] >> ((byte % BYTES_PER_BLOCK) * 8)) as u8
    }

    pub fn set_byte(&mut self, byte: usize, value: u8) {
        let shift = (byte % BYTES_PER_BLOCK) * 8;
        let block = &mut self.blocks[byte / BYTES_PER_BLOCK];
        *block = (*block & !(0xff << shift)) | ((value as u64) << shift);
    }

    pub fn popcount(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum()
    }

    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [u64] {
        &mut self.blocks
    }

    pub fn clear(&mut self) {
        self.blocks.fill(0);
    }

    /// Refills every bit from the generator, masking the tail so `popcount`
    /// stays consistent with `len`.
    pub fn fill_random(&mut self, rng: &mut impl Rng) {
        for block in &mut self.blocks {
            *block = rng.gen::<u64>();
        }
        let tail = self.num_bits % BITS_PER_BLOCK;
        if tail != 0 {
            if let Some(last) = self.blocks.last_mut() {
                *last &= (1 << tail) - 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------------- TESTS
