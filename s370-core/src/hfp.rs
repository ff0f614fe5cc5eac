//! Hexadecimal floating point.
//!
//! Sign bit, 7-bit excess-64 characteristic and a base-16 fraction of 6 (short)
//! or 14 (long) digits. Intermediate sums carry one guard digit and every
//! result is truncated, never rounded.

use crate::constants::interrupts;
use core::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Short,
    Long,
}

impl Precision {
    fn fraction_bits(self) -> u32 {
        match self {
            Precision::Short => 24,
            Precision::Long => 56,
        }
    }

    /// Shift that widens a fraction of this precision to 56 bits
    fn widen(self) -> u32 {
        56 - self.fraction_bits()
    }
}

/// Unpacked floating value; `fraction` is right-aligned in its precision's width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hfp {
    pub sign: bool,
    pub characteristic: i32,
    pub fraction: u64,
}

/// Exceptional conditions detected while forming a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    ExponentOverflow,
    ExponentUnderflow,
    Significance,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub value: Hfp,
    pub exception: Option<Exception>,
}

impl Hfp {
    pub const ZERO: Hfp = Hfp {
        sign: false,
        characteristic: 0,
        fraction: 0,
    };

    pub fn from_short(bits: u32) -> Hfp {
        Hfp {
            sign: bits & 0x8000_0000 != 0,
            characteristic: ((bits >> 24) & 0x7F) as i32,
            fraction: (bits & 0x00FF_FFFF) as u64,
        }
    }

    pub fn from_long(bits: u64) -> Hfp {
        Hfp {
            sign: bits & 0x8000_0000_0000_0000 != 0,
            characteristic: ((bits >> 56) & 0x7F) as i32,
            fraction: bits & 0x00FF_FFFF_FFFF_FFFF,
        }
    }

    pub fn to_short(&self) -> u32 {
        (self.sign as u32) << 31
            | ((self.characteristic as u32) & 0x7F) << 24
            | (self.fraction as u32) & 0x00FF_FFFF
    }

    pub fn to_long(&self) -> u64 {
        (self.sign as u64) << 63
            | ((self.characteristic as u64) & 0x7F) << 56
            | self.fraction & 0x00FF_FFFF_FFFF_FFFF
    }

    pub fn is_zero(&self) -> bool {
        self.fraction == 0
    }

    pub fn negate(&self) -> Hfp {
        Hfp {
            sign: !self.sign,
            ..*self
        }
    }

    /// Condition code of a floating result: zero, negative, positive
    pub fn cc(&self) -> u8 {
        match (self.is_zero(), self.sign) {
            (true, _) => 0,
            (false, true) => 1,
            (false, false) => 2,
        }
    }

    /// Shift the fraction left until the leading digit is nonzero
    fn normalized(&self, p: Precision) -> (u64, i32) {
        let top = p.fraction_bits() - 4;
        let (mut f, mut c) = (self.fraction, self.characteristic);
        while f != 0 && f >> top == 0 {
            f <<= 4;
            c -= 1;
        }
        (f, c)
    }
}

impl Outcome {
    fn exact(value: Hfp) -> Outcome {
        Outcome {
            value,
            exception: None,
        }
    }

    /// Apply the program-mask rules: the value to store (if any) and the
    /// interruption code to raise (if any).
    pub fn resolve(self, underflow_enabled: bool, significance_enabled: bool) -> (Option<Hfp>, Option<u16>) {
        match self.exception {
            None => (Some(self.value), None),
            Some(Exception::ExponentOverflow) => (Some(self.value), Some(interrupts::EXPONENT_OVERFLOW)),
            Some(Exception::ExponentUnderflow) if underflow_enabled => {
                (Some(self.value), Some(interrupts::EXPONENT_UNDERFLOW))
            }
            Some(Exception::Significance) if significance_enabled => {
                (Some(self.value), Some(interrupts::SIGNIFICANCE))
            }
            Some(Exception::ExponentUnderflow) | Some(Exception::Significance) => (Some(Hfp::ZERO), None),
            Some(Exception::Divide) => (None, Some(interrupts::FLOATING_POINT_DIVIDE)),
        }
    }
}

/// Characteristic range check; out-of-range characteristics wrap by 128
fn finish(sign: bool, characteristic: i32, fraction: u64) -> Outcome {
    let (characteristic, exception) = if characteristic > 127 {
        (characteristic - 128, Some(Exception::ExponentOverflow))
    } else if characteristic < 0 {
        (characteristic + 128, Some(Exception::ExponentUnderflow))
    } else {
        (characteristic, None)
    };
    Outcome {
        value: Hfp {
            sign,
            characteristic,
            fraction,
        },
        exception,
    }
}

fn shift_digits_right(value: u64, digits: i32) -> u64 {
    if digits >= 16 {
        0
    } else {
        value >> (4 * digits)
    }
}

/// Aligned signed sum with guard digit: (sign, characteristic, magnitude)
fn guarded_sum(a: &Hfp, b: &Hfp, p: Precision) -> (bool, i32, u64) {
    let width = p.fraction_bits() + 4;
    let mut fa = a.fraction << 4;
    let mut fb = b.fraction << 4;
    let mut c = a.characteristic;
    match a.characteristic.cmp(&b.characteristic) {
        Ordering::Greater => fb = shift_digits_right(fb, a.characteristic - b.characteristic),
        Ordering::Less => {
            fa = shift_digits_right(fa, b.characteristic - a.characteristic);
            c = b.characteristic;
        }
        Ordering::Equal => {}
    }

    let va = if a.sign { -(fa as i128) } else { fa as i128 };
    let vb = if b.sign { -(fb as i128) } else { fb as i128 };
    let sum = va + vb;
    let mut mag = sum.unsigned_abs() as u64;

    if mag >> width != 0 {
        mag >>= 4;
        c += 1;
    }
    (sum < 0, c, mag)
}

/// a + b; unnormalized forms (AU, AW, SU, SW) skip the final left shift
pub fn add(a: &Hfp, b: &Hfp, p: Precision, normalize: bool) -> Outcome {
    let width = p.fraction_bits() + 4;
    let (sign, mut c, mut mag) = guarded_sum(a, b, p);

    if mag == 0 {
        return Outcome {
            value: Hfp {
                sign: false,
                characteristic: c,
                fraction: 0,
            },
            exception: Some(Exception::Significance),
        };
    }

    if normalize {
        while mag >> (width - 4) == 0 {
            mag <<= 4;
            c -= 1;
        }
    }
    mag >>= 4;

    finish(sign && mag != 0, c, mag)
}

pub fn subtract(a: &Hfp, b: &Hfp, p: Precision, normalize: bool) -> Outcome {
    add(a, &b.negate(), p, normalize)
}

/// Ordering of a against b; zeros of either sign compare equal
pub fn compare(a: &Hfp, b: &Hfp, p: Precision) -> Ordering {
    let (sign, _, mag) = guarded_sum(a, &b.negate(), p);
    match (mag, sign) {
        (0, _) => Ordering::Equal,
        (_, true) => Ordering::Less,
        (_, false) => Ordering::Greater,
    }
}

/// Product of two `operand`-precision values, delivered at `result` precision
pub fn multiply(a: &Hfp, b: &Hfp, operand: Precision, result: Precision) -> Outcome {
    if a.is_zero() || b.is_zero() {
        return Outcome::exact(Hfp::ZERO);
    }
    let (fa, ca) = a.normalized(operand);
    let (fb, cb) = b.normalized(operand);

    let mut product = ((fa << operand.widen()) as u128) * ((fb << operand.widen()) as u128);
    let mut c = ca + cb - 64;
    if product >> 108 == 0 {
        product <<= 4;
        c -= 1;
    }
    let fraction = ((product >> 56) as u64) >> result.widen();
    finish(a.sign != b.sign, c, fraction)
}

pub fn divide(a: &Hfp, b: &Hfp, p: Precision) -> Outcome {
    if b.is_zero() {
        return Outcome {
            value: *a,
            exception: Some(Exception::Divide),
        };
    }
    if a.is_zero() {
        return Outcome::exact(Hfp::ZERO);
    }
    let (fa, ca) = a.normalized(p);
    let (fb, cb) = b.normalized(p);

    let quotient = ((fa << p.widen()) as u128) << 60;
    let quotient = quotient / ((fb << p.widen()) as u128);
    let mut c = ca - cb + 64;
    let fraction = if quotient >> 60 != 0 {
        c += 1;
        (quotient >> 8) as u64
    } else {
        (quotient >> 4) as u64
    };
    finish(a.sign != b.sign, c, fraction >> p.widen())
}

/// a / 2 (HER, HDR): shift right one bit, then normalize
pub fn halve(a: &Hfp, p: Precision) -> Outcome {
    if a.is_zero() {
        return Outcome::exact(Hfp::ZERO);
    }
    let width = p.fraction_bits() + 4;
    let mut mag = (a.fraction << 4) >> 1;
    let mut c = a.characteristic;
    while mag >> (width - 4) == 0 {
        mag <<= 4;
        c -= 1;
    }
    finish(a.sign, c, mag >> 4)
}
