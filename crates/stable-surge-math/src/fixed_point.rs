//! WAD (18-decimal) fixed-point arithmetic over arbitrary-precision
//! integers, matching the rounding behavior of the on-chain FixedPoint
//! library: `1e18` represents `1.0`, multiplication and division round in
//! an explicit direction, and `complement` saturates at zero.

use {super::error::Error, num::BigInt, std::sync::LazyLock};

/// 1e18, the fixed-point representation of `1.0`.
pub static WAD: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(1_000_000_000_000_000_000_u64));

/// Multiply two WAD values, rounding up.
pub fn mul_up_fixed(a: &BigInt, b: &BigInt) -> BigInt {
    let product = a * b;
    if product == BigInt::from(0) {
        return BigInt::from(0);
    }
    (&product - 1) / &*WAD + 1
}

/// Multiply two WAD values, rounding down.
pub fn mul_down_fixed(a: &BigInt, b: &BigInt) -> BigInt {
    let product = a * b;
    product / &*WAD
}

/// Divide two WAD values, rounding down.
pub fn div_down_fixed(a: &BigInt, b: &BigInt) -> Result<BigInt, Error> {
    if a == &BigInt::from(0) {
        return Ok(BigInt::from(0));
    }
    if b == &BigInt::from(0) {
        return Err(Error::ZeroDivision);
    }
    let a_inflated = a * &*WAD;
    Ok(a_inflated / b)
}

/// Divide two WAD values, rounding up.
pub fn div_up_fixed(a: &BigInt, b: &BigInt) -> Result<BigInt, Error> {
    if a == &BigInt::from(0) {
        return Ok(BigInt::from(0));
    }
    if b == &BigInt::from(0) {
        return Err(Error::ZeroDivision);
    }
    let a_inflated = a * &*WAD;
    Ok((&a_inflated - 1) / b + 1)
}

/// `1 - x`, saturating at zero for inputs above one.
pub fn complement_fixed(x: &BigInt) -> BigInt {
    if x < &*WAD {
        &*WAD - x
    } else {
        BigInt::from(0)
    }
}

/// Integer square root, rounding down.
///
/// Newton's method starting from a power-of-two guess derived from the bit
/// length of the operand, so the first guess is always at or above the
/// root and the iteration decreases monotonically onto it.
pub fn sqrt(x: &BigInt) -> Result<BigInt, Error> {
    if x < &BigInt::from(0) {
        return Err(Error::InvalidExponent);
    }
    if x == &BigInt::from(0) {
        return Ok(BigInt::from(0));
    }

    let mut guess: BigInt = BigInt::from(1) << ((x.bits() + 1) / 2);
    loop {
        let next: BigInt = (&guess + x / &guess) >> 1;
        if next >= guess {
            return Ok(guess);
        }
        guess = next;
    }
}
