//! Forgiveness timers (jump buffer, coyote time)
//!
//! A countdown is live while its remaining time is above zero. It is never
//! floored: after expiring it keeps counting down, and only the sign matters.

use serde::{Deserialize, Serialize};

use crate::settings::ControllerSettings;

/// Countdown register refreshed by an event and drained by elapsed time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    /// A countdown that has never been triggered
    pub const EXPIRED: Self = Self { remaining: 0.0 };

    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.remaining -= dt;
    }

    #[inline]
    pub fn reset(&mut self, duration: f32) {
        self.remaining = duration;
    }

    /// The triggering event has been used up
    #[inline]
    pub fn consume(&mut self) {
        self.remaining = self.remaining.min(0.0);
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.remaining > 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// The two windows that decouple jump input from the exact tick of contact
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpTimers {
    /// Live while a jump press is waiting for ground
    pub jump_buffer: Countdown,
    /// Live while a recent ground contact still allows a jump
    pub grace: Countdown,
}

impl JumpTimers {
    /// Drain by `dt`, then refresh from this tick's events
    pub fn update(&mut self, dt: f32, jump_pressed: bool, grounded: bool, settings: &ControllerSettings) {
        self.jump_buffer.tick(dt);
        self.grace.tick(dt);

        if jump_pressed {
            self.jump_buffer.reset(settings.jump_buffer_time);
        }
        if grounded {
            self.grace.reset(settings.coyote_time);
        }
    }

    /// A launch uses up both the buffered press and the ground grace
    pub fn consume(&mut self) {
        self.jump_buffer.consume();
        self.grace.consume();
    }
}
