//! ITU-T basic operators for 16/32-bit fixed-point arithmetic
//!
//! Bit-exact with the reference basic operator set: every operation saturates
//! to the `Word16` / `Word32` range instead of wrapping. There is no global
//! overflow flag; callers that need to know whether saturation happened
//! compare against [`MAX_16`]/[`MIN_16`] themselves.

#![allow(missing_docs)]

pub type Word16 = i16;
pub type Word32 = i32;

pub const MAX_16: Word16 = i16::MAX;
pub const MIN_16: Word16 = i16::MIN;
pub const MAX_32: Word32 = i32::MAX;
pub const MIN_32: Word32 = i32::MIN;

/// Clamp a 32-bit value into the 16-bit range.
#[inline]
pub fn saturate(l_var1: Word32) -> Word16 {
    l_var1.clamp(MIN_16 as Word32, MAX_16 as Word32) as Word16
}

/// 16-bit addition, result in [`MIN_16`, `MAX_16`].
#[inline]
pub fn add(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 + var2 as Word32)
}

/// 16-bit subtraction, result in [`MIN_16`, `MAX_16`].
#[inline]
pub fn sub(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 - var2 as Word32)
}

/// Q15 multiplication: `(var1 * var2) >> 15`, saturated.
///
/// Only `mult(MIN_16, MIN_16)` saturates (to `MAX_16`).
#[inline]
pub fn mult(var1: Word16, var2: Word16) -> Word16 {
    saturate((var1 as Word32 * var2 as Word32) >> 15)
}

/// Multiply with left shift: `(var1 * var2) << 1` as a 32-bit result.
///
/// Only `l_mult(MIN_16, MIN_16)` saturates (to `MAX_32`).
#[inline]
pub fn l_mult(var1: Word16, var2: Word16) -> Word32 {
    let product = var1 as Word32 * var2 as Word32;
    if product == 0x4000_0000 {
        MAX_32
    } else {
        product * 2
    }
}

/// 32-bit addition, result in [`MIN_32`, `MAX_32`].
#[inline]
pub fn l_add(l_var1: Word32, l_var2: Word32) -> Word32 {
    l_var1.saturating_add(l_var2)
}

/// Multiply-accumulate: `l_var3 + l_mult(var1, var2)`, saturated.
#[inline]
pub fn l_mac(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_add(l_var3, l_mult(var1, var2))
}

/// Upper 16 bits of a 32-bit value.
#[inline]
pub fn extract_h(l_var1: Word32) -> Word16 {
    (l_var1 >> 16) as Word16
}

/// Lower 16 bits of a 32-bit value (no saturation).
#[inline]
pub fn extract_l(l_var1: Word32) -> Word16 {
    l_var1 as Word16
}
