//! Comparison, negation and radix formatting for BigNum.

use crate::bignum::{BigNum, Limb};

/// Largest power of ten that fits in a limb.
const DEC_CHUNK: Limb = 10_000_000_000_000_000_000;
const DEC_CHUNK_DIGITS: usize = 19;

impl BigNum {
    /// Compare absolute values.
    pub(crate) fn cmp_abs(&self, other: &BigNum) -> std::cmp::Ordering {
        let a_bits = self.bit_len();
        let b_bits = other.bit_len();
        if a_bits != b_bits {
            return a_bits.cmp(&b_bits);
        }
        let max_limbs = self.limbs().len().max(other.limbs().len());
        for i in (0..max_limbs).rev() {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = other.limbs().get(i).copied().unwrap_or(0);
            if a != b {
                return a.cmp(&b);
            }
        }
        std::cmp::Ordering::Equal
    }

    /// Return the negated value.
    pub fn neg(&self) -> BigNum {
        BigNum::from_parts(self.limbs().to_vec(), !self.is_negative())
    }

    /// Divide the magnitude by a single limb. The quotient keeps the sign.
    ///
    /// Panics if `divisor` is zero.
    pub(crate) fn div_rem_small(&self, divisor: Limb) -> (BigNum, Limb) {
        assert!(divisor != 0, "division by zero");
        let mut quotient = vec![0 as Limb; self.limbs().len()];
        let mut rem: u128 = 0;
        for i in (0..self.limbs().len()).rev() {
            let cur = (rem << 64) | self.limbs()[i] as u128;
            quotient[i] = (cur / divisor as u128) as Limb;
            rem = cur % divisor as u128;
        }
        (
            BigNum::from_parts(quotient, self.is_negative()),
            rem as Limb,
        )
    }

    /// Render as a decimal string, e.g. `-1311768467294899695`.
    pub fn to_dec_string(&self) -> String {
        let mut chunks = Vec::new();
        let mut cur = BigNum::from_parts(self.limbs().to_vec(), false);
        loop {
            let (q, r) = cur.div_rem_small(DEC_CHUNK);
            chunks.push(r);
            if q.is_zero() {
                break;
            }
            cur = q;
        }

        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        let mut iter = chunks.iter().rev();
        if let Some(first) = iter.next() {
            out.push_str(&first.to_string());
        }
        for chunk in iter {
            out.push_str(&format!("{chunk:0width$}", width = DEC_CHUNK_DIGITS));
        }
        out
    }
}

impl std::fmt::Display for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad_integral(
            !self.is_negative(),
            "",
            self.to_dec_string().trim_start_matches('-'),
        )
    }
}

impl std::fmt::LowerHex for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex: String = self.to_bytes_be().iter().map(|b| format!("{b:02x}")).collect();
        f.pad_integral(!self.is_negative(), "0x", trim_hex(&hex))
    }
}

impl std::fmt::UpperHex for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex: String = self.to_bytes_be().iter().map(|b| format!("{b:02X}")).collect();
        f.pad_integral(!self.is_negative(), "0x", trim_hex(&hex))
    }
}

fn trim_hex(hex: &str) -> &str {
    match hex.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(v: i64) -> BigNum {
        BigNum::from_signed_bytes_be(&v.to_be_bytes())
    }

    #[test]
    fn test_dec_string_small() {
        assert_eq!(BigNum::zero().to_string(), "0");
        assert_eq!(BigNum::from_u64(7).to_string(), "7");
        assert_eq!(signed(-42).to_string(), "-42");
    }

    #[test]
    fn test_dec_string_multi_chunk() {
        // 2^64 = 18446744073709551616
        let n = BigNum::from_bytes_be(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(n.to_string(), "18446744073709551616");
        // 10^19 exactly exercises the zero-padded inner chunk
        let n = BigNum::from_u64(DEC_CHUNK);
        assert_eq!(n.to_string(), "10000000000000000000");
    }

    #[test]
    fn test_serial_number_decimal() {
        let n = BigNum::from_bytes_be(&[0x12, 0x34, 0x56, 0x78, 0x90, 0xAB, 0xCD, 0xEF]);
        assert_eq!(n.to_string(), "1311768467294899695");
    }

    #[test]
    fn test_hex_formatting() {
        let n = signed(-255);
        assert_eq!(format!("{n:x}"), "-ff");
        assert_eq!(format!("{n:#X}"), "-0xFF");
        assert_eq!(format!("{:x}", BigNum::from_u64(0x0102)), "102");
        assert_eq!(format!("{:#x}", BigNum::from_u64(65537)), "0x10001");
        assert_eq!(format!("{:x}", BigNum::zero()), "0");
    }

    #[test]
    fn test_neg_and_div_rem_small() {
        let n = signed(-100);
        assert_eq!(n.neg().to_i64(), Some(100));
        assert!(BigNum::zero().neg().is_zero());
        let (q, r) = n.div_rem_small(7);
        assert_eq!(q.to_i64(), Some(-14));
        assert_eq!(r, 2);
    }
}
