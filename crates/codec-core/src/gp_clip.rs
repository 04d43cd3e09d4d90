//! Gain-pitch clipping
//!
//! When the pitch is highly predictive for a while (around 250 ms) the
//! long-term prediction gain is limited to 1.0 so that encoder and decoder
//! cannot drift apart through LTP error accumulation. The memory tracks a
//! smoothed minimum ISF distance and a long-term average of the quantized
//! pitch gain; the engine updates it with [`GpClipMemory::test_isf`] and
//! [`GpClipMemory::test_gain_pit`] once per frame, and consults
//! [`GpClipMemory::gp_clip`] before the next frame's pitch search.
//!
//! All arithmetic goes through the saturating basic operators.

use crate::types::Mode;
use crate::utils::basic_ops::{add, extract_h, extract_l, l_mac, l_mult, mult, sub, Word16};

/// LP order; number of ISF coefficients per frame
pub const ISF_ORDER: usize = 16;

/// Distance ceiling for the two lowest rates: 150 Hz (6400 Hz = 16384)
pub const DIST_ISF_MAX_IO: Word16 = 384;
/// Distance ceiling for the other rates: 120 Hz
pub const DIST_ISF_MAX: Word16 = 307;
/// Fixed-threshold distance: 60 Hz
pub const DIST_ISF_THRES: Word16 = 154;
/// Fixed gain threshold, 0.9 in Q14
pub const GAIN_PIT_THRES: Word16 = 14746;
/// Floor of the smoothed pitch gain, 0.6 in Q14
pub const GAIN_PIT_MIN: Word16 = 9830;

/// Persistent state of the clipping decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpClipMemory {
    /// Smoothed minimum ISF distance, at most [`DIST_ISF_MAX_IO`]
    pub isf_distance: Word16,
    /// Smoothed pitch gain in Q14, at least [`GAIN_PIT_MIN`]
    pub gain_pitch: Word16,
}

impl GpClipMemory {
    /// Create the memory in its initial state
    pub fn new() -> Self {
        Self {
            isf_distance: DIST_ISF_MAX,
            gain_pitch: GAIN_PIT_MIN,
        }
    }

    /// Return to the initial state (homing reset)
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Clipping threshold in Q14 used for the two lowest rates.
    ///
    /// `0.9 + 0.1 * distance / DIST_ISF_MAX_IO`, i.e. between 0.9 and 1.0 for
    /// a non-negative stored distance.
    pub fn low_rate_threshold(&self) -> Word16 {
        add(
            14746,
            mult(
                1638,
                extract_l(l_mult(self.isf_distance, 16384 / DIST_ISF_MAX_IO)),
            ),
        )
    }

    /// Whether the pitch gain must be clipped to 1.0 for the coming frame
    pub fn gp_clip(&self, mode: Mode) -> bool {
        if mode.is_low_rate() {
            sub(self.gain_pitch, self.low_rate_threshold()) > 0
        } else {
            sub(self.isf_distance, DIST_ISF_THRES) < 0 && sub(self.gain_pitch, GAIN_PIT_THRES) > 0
        }
    }

    /// Fold this frame's minimum ISF spacing into the distance memory
    pub fn test_isf(&mut self, mode: Mode, isf: &[Word16; ISF_ORDER]) {
        let mut dist_min = sub(isf[1], isf[0]);
        for i in 2..ISF_ORDER - 1 {
            let dist = sub(isf[i], isf[i - 1]);
            if sub(dist, dist_min) < 0 {
                dist_min = dist;
            }
        }

        // 0.8 * previous + 0.2 * current
        let dist = extract_h(l_mac(l_mult(26214, self.isf_distance), 6554, dist_min));

        let ceiling = if mode.is_low_rate() {
            DIST_ISF_MAX_IO
        } else {
            DIST_ISF_MAX
        };
        self.isf_distance = dist.min(ceiling);
    }

    /// Fold this frame's quantized pitch gain (Q14) into the gain memory
    pub fn test_gain_pit(&mut self, mode: Mode, gain_pit: Word16) {
        let l_tmp = if mode.is_low_rate() {
            // 0.98 * previous + 0.02 * current, long-term average (> 250 ms)
            l_mac(l_mult(32113, self.gain_pitch), 655, gain_pit)
        } else {
            // 0.9 * previous + 0.1 * current
            l_mac(l_mult(29491, self.gain_pitch), 3277, gain_pit)
        };
        self.gain_pitch = extract_h(l_tmp).max(GAIN_PIT_MIN);
    }
}

impl Default for GpClipMemory {
    fn default() -> Self {
        Self::new()
    }
}
