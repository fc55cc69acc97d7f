//! Big number type, construction and two's-complement conversion.

/// Limb type for big number representation.
pub type Limb = u64;

/// Bits per limb.
pub const LIMB_BITS: usize = 64;

/// A heap-allocated signed integer of arbitrary size.
///
/// Internally represented as a sign flag and a little-endian array of `u64`
/// limbs holding the magnitude. Zero is never negative.
#[derive(Clone, Hash)]
pub struct BigNum {
    /// Little-endian limbs (limbs[0] is the least significant).
    limbs: Vec<Limb>,
    /// True if the number is negative.
    negative: bool,
}

impl BigNum {
    /// Create a zero-valued BigNum.
    pub fn zero() -> Self {
        Self {
            limbs: vec![0],
            negative: false,
        }
    }

    /// Create a BigNum from a `u64` value.
    pub fn from_u64(value: u64) -> Self {
        Self {
            limbs: vec![value],
            negative: false,
        }
    }

    /// Create a non-negative BigNum from big-endian magnitude bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }

        let num_limbs = bytes.len().div_ceil(8);
        let mut limbs = vec![0u64; num_limbs];

        for (i, &byte) in bytes.iter().rev().enumerate() {
            let limb_idx = i / 8;
            let bit_pos = (i % 8) * 8;
            limbs[limb_idx] |= (byte as u64) << bit_pos;
        }

        let mut bn = Self {
            limbs,
            negative: false,
        };
        bn.normalize();
        bn
    }

    /// Create a BigNum from big-endian two's-complement bytes, the content
    /// encoding of an ASN.1 INTEGER.
    pub fn from_signed_bytes_be(bytes: &[u8]) -> Self {
        match bytes.first() {
            None => Self::zero(),
            Some(&first) if first & 0x80 == 0 => Self::from_bytes_be(bytes),
            Some(_) => {
                // magnitude = !bytes + 1
                let mut magnitude: Vec<u8> = bytes.iter().map(|b| !b).collect();
                for byte in magnitude.iter_mut().rev() {
                    let (sum, carry) = byte.overflowing_add(1);
                    *byte = sum;
                    if !carry {
                        break;
                    }
                }
                let mut bn = Self::from_bytes_be(&magnitude);
                bn.negative = true;
                bn.normalize();
                bn
            }
        }
    }

    /// Export the magnitude as big-endian bytes (sign is dropped).
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let bits = self.bit_len();
        if bits == 0 {
            return vec![0];
        }

        let num_bytes = bits.div_ceil(8);
        let mut bytes = vec![0u8; num_bytes];

        for i in 0..num_bytes {
            let limb_idx = i / 8;
            let bit_pos = (i % 8) * 8;
            if limb_idx < self.limbs.len() {
                bytes[num_bytes - 1 - i] = (self.limbs[limb_idx] >> bit_pos) as u8;
            }
        }

        bytes
    }

    /// Return the number of significant bits of the magnitude.
    pub fn bit_len(&self) -> usize {
        for i in (0..self.limbs.len()).rev() {
            if self.limbs[i] != 0 {
                return i * LIMB_BITS + (LIMB_BITS - self.limbs[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Return true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Return true if this number is negative.
    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    pub(crate) fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    /// Convert to `i64` if the value fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.bit_len() > LIMB_BITS {
            return None;
        }
        let magnitude = self.limbs[0] as i128;
        let value = if self.is_negative() {
            -magnitude
        } else {
            magnitude
        };
        i64::try_from(value).ok()
    }

    /// Convert to `u64` if the value is non-negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() || self.bit_len() > LIMB_BITS {
            return None;
        }
        Some(self.limbs[0])
    }

    pub(crate) fn from_parts(limbs: Vec<Limb>, negative: bool) -> Self {
        let mut bn = Self {
            limbs: if limbs.is_empty() { vec![0] } else { limbs },
            negative,
        };
        bn.normalize();
        bn
    }

    /// Remove leading zero limbs.
    pub(crate) fn normalize(&mut self) {
        while self.limbs.len() > 1 && self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
    }
}

impl Default for BigNum {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for BigNum {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl std::fmt::Debug for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let hex = self
            .to_bytes_be()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        write!(f, "BigNum({sign}0x{hex})")
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative && self.limbs == other.limbs
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_abs(other),
            // Both negative: larger absolute value is smaller
            (true, true) => other.cmp_abs(self),
        }
    }
}
