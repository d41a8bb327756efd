//! Witness state hex codec
//!
//! A full assignment is written as one bit per fact, variables ascending and
//! values ascending inside a variable, set iff the value holds. Bits are
//! packed four per hex digit, most significant first; the final digit is
//! padded with zero bits.

use crate::stateset::FactEncoding;

use super::errors::{LedgerError, LedgerResult};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encode a full assignment as a hex nibble stream.
pub fn encode_state(encoding: &FactEncoding, state: &[usize]) -> String {
    let mut out = String::with_capacity(encoding.fact_count().div_ceil(4));
    let mut nibble = 0u8;
    let mut filled = 0;

    for var in 0..encoding.num_variables() {
        for value in 0..encoding.domain_size(var) {
            nibble = (nibble << 1) | u8::from(state[var] == value);
            filled += 1;
            if filled == 4 {
                out.push(HEX_DIGITS[nibble as usize] as char);
                nibble = 0;
                filled = 0;
            }
        }
    }

    if filled > 0 {
        nibble <<= 4 - filled;
        out.push(HEX_DIGITS[nibble as usize] as char);
    }
    out
}

/// Inverse of [`encode_state`].
///
/// Rejects strings of the wrong length, non-hex characters, variables
/// without exactly one set bit and non-zero padding.
pub fn decode_state(encoding: &FactEncoding, hex: &str) -> LedgerResult<Vec<usize>> {
    let expected = encoding.fact_count().div_ceil(4);
    if hex.len() != expected {
        return Err(LedgerError::witness_malformed(format!(
            "expected {} hex digits, got {}",
            expected,
            hex.len()
        )));
    }

    let mut bits = Vec::with_capacity(expected * 4);
    for c in hex.chars() {
        let digit = c.to_digit(16).ok_or_else(|| {
            LedgerError::witness_malformed(format!("'{}' is not a hex digit", c))
        })?;
        for shift in (0..4).rev() {
            bits.push((digit >> shift) & 1 == 1);
        }
    }

    if bits[encoding.fact_count()..].iter().any(|b| *b) {
        return Err(LedgerError::witness_malformed("non-zero padding bits"));
    }

    let mut state = Vec::with_capacity(encoding.num_variables());
    let mut offset = 0;
    for var in 0..encoding.num_variables() {
        let size = encoding.domain_size(var);
        let set: Vec<usize> = (0..size).filter(|v| bits[offset + v]).collect();
        if set.len() != 1 {
            return Err(LedgerError::witness_malformed(format!(
                "variable {} has {} values set",
                var,
                set.len()
            )));
        }
        state.push(set[0]);
        offset += size;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        let enc = FactEncoding::from_domains(&[2, 3]);
        // bits 01 001 -> 0100 1000
        assert_eq!(encode_state(&enc, &[1, 2]), "48");
        // bits 10 100 -> 1010 0000
        assert_eq!(encode_state(&enc, &[0, 0]), "a0");
    }

    #[test]
    fn test_exact_nibble_has_no_padding_digit() {
        let enc = FactEncoding::from_domains(&[2, 2]);
        assert_eq!(encode_state(&enc, &[1, 0]), "6");
    }

    #[test]
    fn test_decode_roundtrip() {
        let enc = FactEncoding::from_domains(&[3, 16, 1, 5]);
        let state = vec![2, 15, 0, 3];
        let hex = encode_state(&enc, &state);
        assert_eq!(decode_state(&enc, &hex).unwrap(), state);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let enc = FactEncoding::from_domains(&[2, 3]);
        assert!(decode_state(&enc, "4").is_err());
        assert!(decode_state(&enc, "4z").is_err());
        // both values of var 0 set
        assert!(decode_state(&enc, "c8").is_err());
        // padding bit set
        assert!(decode_state(&enc, "49").is_err());
    }
}
