//! Encoder-side frame type scheduling under DTX
//!
//! While the speech encoder reports DTX, only every eighth frame carries a
//! silence descriptor update; the first DTX frame after speech is a
//! `SID_FIRST`, the rest are `NO_DATA`.

use crate::types::{CodingMode, TxFrameType};

/// Frames between two SID updates
const SID_UPDATE_INTERVAL: i16 = 8;

/// Delay of the first update after a `SID_FIRST`
const SID_FIRST_DELAY: i16 = 3;

/// Running DTX state of the encode direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxState {
    sid_update_counter: i16,
    sid_handover_debt: i16,
    prev_frame_type: TxFrameType,
}

impl TxState {
    /// Create the initial state
    pub fn new() -> Self {
        Self {
            sid_update_counter: SID_FIRST_DELAY,
            sid_handover_debt: 0,
            prev_frame_type: TxFrameType::Speech,
        }
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Request `count` extra SID updates, sent as soon as the update delay
    /// allows (used after a handover so the far end refreshes its comfort
    /// noise quickly).
    pub fn schedule_handover_updates(&mut self, count: i16) {
        self.sid_handover_debt = self.sid_handover_debt.saturating_add(count.max(0));
    }

    /// Frame type of the previous frame
    pub fn prev_frame_type(&self) -> TxFrameType {
        self.prev_frame_type
    }

    /// Decide the frame type for a frame coded with `coding_mode`
    pub fn frame_type(&mut self, coding_mode: CodingMode) -> TxFrameType {
        let frame_type = match coding_mode {
            CodingMode::Dtx => {
                self.sid_update_counter -= 1;
                if self.prev_frame_type == TxFrameType::Speech {
                    self.sid_update_counter = SID_FIRST_DELAY;
                    TxFrameType::SidFirst
                } else if self.sid_handover_debt > 0 && self.sid_update_counter > 2 {
                    // extra updates are delayed past a possible SID_FIRST
                    self.sid_handover_debt -= 1;
                    TxFrameType::SidUpdate
                } else if self.sid_update_counter == 0 {
                    self.sid_update_counter = SID_UPDATE_INTERVAL;
                    TxFrameType::SidUpdate
                } else {
                    TxFrameType::NoData
                }
            }
            CodingMode::Speech(_) => {
                self.sid_update_counter = SID_UPDATE_INTERVAL;
                TxFrameType::Speech
            }
        };
        self.prev_frame_type = frame_type;
        frame_type
    }
}

impl Default for TxState {
    fn default() -> Self {
        Self::new()
    }
}
