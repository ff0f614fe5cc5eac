use core::cmp::Ordering;

// Condition code for a signed arithmetic result: zero, negative, positive
pub fn cc_signed(value: i64) -> u8 {
    match value.cmp(&0) {
        Ordering::Equal => 0,
        Ordering::Less => 1,
        Ordering::Greater => 2,
    }
}

// Condition code for comparisons: equal, first low, first high
pub fn cc_compare<T: Ord>(first: T, second: T) -> u8 {
    match first.cmp(&second) {
        Ordering::Equal => 0,
        Ordering::Less => 1,
        Ordering::Greater => 2,
    }
}

// Logical (unsigned) add: result and CC (bit 1 = carry, bit 0 = nonzero)
pub fn add_logical(left: u32, right: u32) -> (u32, u8) {
    let (sum, carry) = left.overflowing_add(right);
    (sum, (carry as u8) << 1 | (sum != 0) as u8)
}

// Logical subtract is add of the ones' complement plus one
pub fn sub_logical(left: u32, right: u32) -> (u32, u8) {
    let (partial, c1) = left.overflowing_add(!right);
    let (diff, c2) = partial.overflowing_add(1);
    (diff, ((c1 || c2) as u8) << 1 | (diff != 0) as u8)
}

// Arithmetic left shift of the 31 numeric bits, sign preserved: (result, overflow)
pub fn shift_left_single(value: u32, amount: u32) -> (u32, bool) {
    let wide = (value as i32 as i128) << amount;
    let overflow = wide < i32::MIN as i128 || wide > i32::MAX as i128;
    let shifted = ((value as u64) << amount) as u32;
    ((value & 0x8000_0000) | (shifted & 0x7FFF_FFFF), overflow)
}

// Same as above over a 63-bit numeric field
pub fn shift_left_double(value: u64, amount: u32) -> (u64, bool) {
    let wide = (value as i64 as i128) << amount;
    let overflow = wide < i64::MIN as i128 || wide > i64::MAX as i128;
    let shifted = ((value as u128) << amount) as u64;
    (
        (value & 0x8000_0000_0000_0000) | (shifted & 0x7FFF_FFFF_FFFF_FFFF),
        overflow,
    )
}

// Packed decimal: two digits per byte, sign in the rightmost nibble.
// A..F are valid signs, B and D negative.

pub const PLUS_SIGN: u8 = 0xC;
pub const MINUS_SIGN: u8 = 0xD;

fn is_negative_sign(sign: u8) -> bool {
    sign == 0xB || sign == 0xD
}

// Parse a packed field; None when a digit or the sign is invalid
pub fn parse_packed(field: &[u8]) -> Option<i128> {
    let mut value: i128 = 0;
    let last = field.len() - 1;
    for (i, byte) in field.iter().enumerate() {
        let high = byte >> 4;
        let low = byte & 0xF;
        if high > 9 {
            return None;
        }
        value = value * 10 + high as i128;
        if i == last {
            if low < 0xA {
                return None;
            }
            if is_negative_sign(low) {
                value = -value;
            }
        } else {
            if low > 9 {
                return None;
            }
            value = value * 10 + low as i128;
        }
    }
    Some(value)
}

// Encode into `field`, returning true when significant digits were lost.
// Zero results are positive unless digits were lost.
pub fn encode_packed(value: i128, field: &mut [u8]) -> bool {
    let digits = field.len() * 2 - 1;
    let mut magnitude = value.unsigned_abs();
    let limit = 10u128.pow(digits as u32);
    let overflow = magnitude >= limit;
    magnitude %= limit;

    let negative = value < 0 && (magnitude != 0 || overflow);
    let mut nibbles = [0u8; 32];
    nibbles[0] = if negative { MINUS_SIGN } else { PLUS_SIGN };
    for n in nibbles.iter_mut().take(digits + 1).skip(1) {
        *n = (magnitude % 10) as u8;
        magnitude /= 10;
    }

    let len = field.len();
    for (i, byte) in field.iter_mut().enumerate() {
        // nibble index counted from the right-hand end
        let lo = (len - 1 - i) * 2;
        *byte = nibbles[lo + 1] << 4 | nibbles[lo];
    }
    overflow
}

#[cfg(test)]
mod util_tests {
    use super::*;

    #[test]
    fn test_logical_cc() {
        assert_eq!(add_logical(0, 0), (0, 0));
        assert_eq!(add_logical(1, 2), (3, 1));
        assert_eq!(add_logical(0xFFFF_FFFF, 1), (0, 2));
        assert_eq!(add_logical(0xFFFF_FFFF, 2), (1, 3));
        assert_eq!(sub_logical(5, 5), (0, 2));
        assert_eq!(sub_logical(5, 3), (2, 3));
        assert_eq!(sub_logical(3, 5), (0xFFFF_FFFE, 1));
    }

    #[test]
    fn test_shift_left_single() {
        assert_eq!(shift_left_single(1, 4), (16, false));
        assert_eq!(shift_left_single(0x4000_0000, 1), (0, true));
        assert_eq!(shift_left_single(0xFFFF_FFFF, 8), (0xFFFF_FF00, false));
        assert_eq!(shift_left_single(0x8000_0000, 1), (0x8000_0000, true));
    }

    #[test]
    fn test_packed_parse() {
        assert_eq!(parse_packed(&[0x12, 0x3C]), Some(123));
        assert_eq!(parse_packed(&[0x12, 0x3D]), Some(-123));
        assert_eq!(parse_packed(&[0x0F]), Some(0));
        assert_eq!(parse_packed(&[0x1A, 0x3C]), None);
        assert_eq!(parse_packed(&[0x12, 0x34]), None);
    }

    #[test]
    fn test_packed_encode() {
        let mut field = [0u8; 3];
        assert!(!encode_packed(-1234, &mut field));
        assert_eq!(field, [0x01, 0x23, 0x4D]);
        assert!(encode_packed(123_456, &mut field));
        assert_eq!(field, [0x23, 0x45, 0x6C]);
        assert!(!encode_packed(0, &mut field));
        assert_eq!(field, [0x00, 0x00, 0x0C]);
    }
}
