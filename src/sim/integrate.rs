//! Velocity integration
//!
//! Produces this tick's velocity from last tick's velocity, input, contact
//! flags and timers. The sub-steps run in a fixed order and the order is
//! load-bearing:
//!
//! 1. apex check (reads last tick's vertical speed)
//! 2. run (horizontal)
//! 3. gravity (vertical)
//! 4. jump launch / jump cut (may override gravity's result)
//! 5. restriction against blocked directions (must see the launch)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contacts::ContactFlags;
use super::timers::JumpTimers;
use crate::move_towards;
use crate::settings::ControllerSettings;

/// Jump state machine flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpMode {
    /// From launch until a landing edge
    pub jumping: bool,
    /// Jump released mid-ascent; latched until the next launch or landing
    pub jump_cutting: bool,
    /// Recomputed every tick
    pub at_apex: bool,
}

/// Named view of the jump state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPhase {
    Grounded,
    Rising,
    AtApex,
    Falling,
    JumpCut,
    AirborneNoJump,
}

/// What the down-contact did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTransition {
    None,
    Landed,
    LeftGround,
}

impl JumpMode {
    /// Bookkeeping tied to contact transitions. Runs right after detection.
    pub fn on_contacts(&mut self, now: ContactFlags, before: ContactFlags) -> GroundTransition {
        if now.down() {
            self.jump_cutting = false;
        }
        match (before.down(), now.down()) {
            (false, true) => {
                self.jumping = false;
                GroundTransition::Landed
            }
            (true, false) => GroundTransition::LeftGround,
            _ => GroundTransition::None,
        }
    }

    pub fn phase(&self, grounded: bool, vertical_velocity: f32) -> MotionPhase {
        if grounded {
            MotionPhase::Grounded
        } else if !self.jumping {
            MotionPhase::AirborneNoJump
        } else if self.at_apex {
            MotionPhase::AtApex
        } else if self.jump_cutting {
            MotionPhase::JumpCut
        } else if vertical_velocity > 0.0 {
            MotionPhase::Rising
        } else {
            MotionPhase::Falling
        }
    }
}

/// How a launch was allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchKind {
    /// Grounded and pressed this tick
    Grounded,
    /// Pressed shortly before landing
    Buffered,
    /// Pressed shortly after leaving the ground
    Coyote,
}

/// Result of the jump sub-step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    None,
    Launched(LaunchKind),
    Cut,
}

/// Jump input edges for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JumpEdges {
    pub pressed: bool,
    pub released: bool,
}

/// 1. Apex check against last tick's vertical speed
#[inline]
pub fn apex_check(mode: &JumpMode, last_vy: f32, settings: &ControllerSettings) -> bool {
    mode.jumping && last_vy.abs() <= settings.apex_speed_threshold
}

/// 2. Horizontal run
pub fn run(last_vx: f32, input_x: f32, at_apex: bool, settings: &ControllerSettings, dt: f32) -> f32 {
    if input_x != 0.0 {
        let target = input_x * settings.max_run_speed;
        let mut vx = move_towards(last_vx, target, settings.run_acceleration * dt);
        if at_apex {
            vx += input_x.signum() * settings.apex_bonus_move_speed * dt;
        }
        vx.clamp(-settings.max_run_speed, settings.max_run_speed)
    } else {
        move_towards(last_vx, 0.0, settings.run_deceleration * dt)
    }
}

/// 3. Gravity. Apex hang takes precedence over jump-cut gravity.
pub fn gravity(last_vy: f32, mode: &JumpMode, settings: &ControllerSettings, dt: f32) -> f32 {
    let scale = if mode.at_apex {
        settings.apex_gravity_mult
    } else if mode.jump_cutting {
        settings.jump_cut_gravity_mult
    } else {
        1.0
    };
    (last_vy - settings.gravity * scale * dt).max(-settings.max_fall_speed)
}

/// 4. Jump launch and jump cut.
///
/// A launch needs headroom and either a buffered press while grounded or a
/// fresh press inside the coyote window. A cut fires at most once per jump.
pub fn jump(
    vy: f32,
    flags: ContactFlags,
    edges: JumpEdges,
    timers: &mut JumpTimers,
    mode: &mut JumpMode,
    settings: &ControllerSettings,
) -> (f32, JumpOutcome) {
    let grounded = flags.down();
    let buffered_ground = grounded && timers.jump_buffer.is_live();
    let grace_press = edges.pressed && !mode.jumping && timers.grace.is_live();

    if !flags.blocked_above() && (buffered_ground || grace_press) {
        let kind = if !grounded {
            LaunchKind::Coyote
        } else if edges.pressed {
            LaunchKind::Grounded
        } else {
            LaunchKind::Buffered
        };
        mode.jumping = true;
        mode.jump_cutting = false;
        timers.consume();
        return (settings.jump_speed, JumpOutcome::Launched(kind));
    }

    if !grounded && edges.released && !mode.jump_cutting && mode.jumping && vy > 0.0 {
        mode.jump_cutting = true;
        return (vy * settings.jump_cut_speed_mult, JumpOutcome::Cut);
    }

    (vy, JumpOutcome::None)
}

/// 5. Zero velocity components pushing into blocked directions
pub fn restrict(velocity: Vec2, flags: ContactFlags) -> Vec2 {
    let mut v = velocity;
    if (v.x > 0.0 && flags.right()) || (v.x < 0.0 && flags.left()) {
        v.x = 0.0;
    }
    if (v.y < 0.0 && flags.down()) || (v.y > 0.0 && flags.blocked_above()) {
        v.y = 0.0;
    }
    v
}

/// Everything the integrator reads for one tick
#[derive(Debug, Clone, Copy)]
pub struct IntegrateInput {
    pub last_velocity: Vec2,
    pub horizontal: f32,
    pub edges: JumpEdges,
    pub flags: ContactFlags,
    pub dt: f32,
}

/// Run all five sub-steps in order
pub fn integrate_velocity(
    input: IntegrateInput,
    timers: &mut JumpTimers,
    mode: &mut JumpMode,
    settings: &ControllerSettings,
) -> (Vec2, JumpOutcome) {
    let last = input.last_velocity;
    mode.at_apex = apex_check(mode, last.y, settings);

    let vx = run(last.x, input.horizontal, mode.at_apex, settings, input.dt);
    let vy = gravity(last.y, mode, settings, input.dt);
    let (vy, outcome) = jump(vy, input.flags, input.edges, timers, mode, settings);

    (restrict(Vec2::new(vx, vy), input.flags), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::contacts::{Contact, Corner};
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded() -> ContactFlags {
        ContactFlags::EMPTY.with(Contact::Down)
    }

    #[test]
    fn test_run_scenario_clamps_at_tick_nine() {
        let settings = ControllerSettings {
            run_acceleration: 90.0,
            max_run_speed: 13.0,
            ..Default::default()
        };
        let mut vx = 0.0;
        let mut history = Vec::new();
        for _ in 0..10 {
            vx = run(vx, 1.0, false, &settings, DT);
            history.push(vx);
        }
        for i in 1..9 {
            assert!(history[i] > history[i - 1], "tick {} did not accelerate", i + 1);
        }
        assert!(history[7] < 13.0);
        assert_eq!(history[8], 13.0);
        assert_eq!(history[9], 13.0);
    }

    #[test]
    fn test_run_deceleration_stops_at_zero() {
        let settings = ControllerSettings::default();
        let mut vx = 5.0;
        for _ in 0..60 {
            let next = run(vx, 0.0, false, &settings, DT);
            assert!(next >= 0.0);
            assert!(next <= vx);
            vx = next;
        }
        assert_eq!(vx, 0.0);
    }

    #[test]
    fn test_apex_bonus_speeds_up_but_respects_max() {
        let settings = ControllerSettings::default();
        let plain = run(2.0, 1.0, false, &settings, DT);
        let boosted = run(2.0, 1.0, true, &settings, DT);
        assert!(boosted > plain);
        assert_eq!(run(13.0, 1.0, true, &settings, DT), 13.0);
    }

    #[test]
    fn test_apex_check() {
        let settings = ControllerSettings::default();
        let mut mode = JumpMode::default();
        assert!(!apex_check(&mode, 0.0, &settings));
        mode.jumping = true;
        assert!(apex_check(&mode, 2.5, &settings));
        assert!(apex_check(&mode, -3.0, &settings));
        assert!(!apex_check(&mode, 8.0, &settings));
    }

    #[test]
    fn test_gravity_multipliers() {
        let settings = ControllerSettings::default();
        let normal = gravity(0.0, &JumpMode::default(), &settings, DT);
        let apex = gravity(
            0.0,
            &JumpMode {
                jumping: true,
                at_apex: true,
                jump_cutting: true,
            },
            &settings,
            DT,
        );
        let cut = gravity(
            0.0,
            &JumpMode {
                jumping: true,
                jump_cutting: true,
                at_apex: false,
            },
            &settings,
            DT,
        );
        assert!((normal + settings.gravity * DT).abs() < 1e-5);
        // Apex wins over cutting
        assert!((apex - normal * settings.apex_gravity_mult).abs() < 1e-5);
        assert!((cut - normal * settings.jump_cut_gravity_mult).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_clamps_fall_speed() {
        let settings = ControllerSettings::default();
        assert_eq!(gravity(-39.9, &JumpMode::default(), &settings, DT), -settings.max_fall_speed);
    }

    #[test]
    fn test_grounded_press_launches_at_jump_speed() {
        let settings = ControllerSettings::default();
        let mut timers = JumpTimers::default();
        let mut mode = JumpMode::default();
        timers.update(DT, true, true, &settings);

        let input = IntegrateInput {
            last_velocity: Vec2::ZERO,
            horizontal: 0.0,
            edges: JumpEdges {
                pressed: true,
                released: false,
            },
            flags: grounded(),
            dt: DT,
        };
        let (v, outcome) = integrate_velocity(input, &mut timers, &mut mode, &settings);
        assert_eq!(v.y, settings.jump_speed);
        assert_eq!(outcome, JumpOutcome::Launched(LaunchKind::Grounded));
        assert!(mode.jumping);
        assert!(!timers.jump_buffer.is_live());
        assert!(!timers.grace.is_live());
    }

    #[test]
    fn test_buffered_press_fires_on_ground() {
        let settings = ControllerSettings::default();
        let mut timers = JumpTimers::default();
        let mut mode = JumpMode::default();
        timers.jump_buffer.reset(0.05);

        let (vy, outcome) = jump(0.0, grounded(), JumpEdges::default(), &mut timers, &mut mode, &settings);
        assert_eq!(vy, settings.jump_speed);
        assert_eq!(outcome, JumpOutcome::Launched(LaunchKind::Buffered));
    }

    #[test]
    fn test_coyote_press_requires_grace_and_no_jump() {
        let settings = ControllerSettings::default();
        let press = JumpEdges {
            pressed: true,
            released: false,
        };

        let mut timers = JumpTimers::default();
        timers.grace.reset(0.05);
        let mut mode = JumpMode::default();
        let (_, outcome) = jump(-1.0, ContactFlags::EMPTY, press, &mut timers, &mut mode, &settings);
        assert_eq!(outcome, JumpOutcome::Launched(LaunchKind::Coyote));

        // Grace live but already jumping: no double jump
        let mut timers = JumpTimers::default();
        timers.grace.reset(0.05);
        let mut mode = JumpMode {
            jumping: true,
            ..Default::default()
        };
        let (vy, outcome) = jump(-1.0, ContactFlags::EMPTY, press, &mut timers, &mut mode, &settings);
        assert_eq!(outcome, JumpOutcome::None);
        assert_eq!(vy, -1.0);

        // Grace expired
        let mut timers = JumpTimers::default();
        timers.grace.reset(0.05);
        timers.grace.tick(0.06);
        let mut mode = JumpMode::default();
        let (_, outcome) = jump(-1.0, ContactFlags::EMPTY, press, &mut timers, &mut mode, &settings);
        assert_eq!(outcome, JumpOutcome::None);
    }

    #[test]
    fn test_ceiling_blocks_launch_unless_grazed() {
        let settings = ControllerSettings::default();
        let press = JumpEdges {
            pressed: true,
            released: false,
        };

        let mut timers = JumpTimers::default();
        timers.jump_buffer.reset(0.1);
        let mut mode = JumpMode::default();
        let blocked = grounded().with(Contact::Up);
        let (_, outcome) = jump(0.0, blocked, press, &mut timers, &mut mode, &settings);
        assert_eq!(outcome, JumpOutcome::None);

        let grazed = blocked.with_corner(Corner::TopLeft);
        let (vy, outcome) = jump(0.0, grazed, press, &mut timers, &mut mode, &settings);
        assert_eq!(outcome, JumpOutcome::Launched(LaunchKind::Grounded));
        assert_eq!(restrict(Vec2::new(0.0, vy), grazed).y, settings.jump_speed);
    }

    #[test]
    fn test_jump_cut_scenario() {
        let settings = ControllerSettings {
            jump_cut_speed_mult: 0.5,
            ..Default::default()
        };
        let mut timers = JumpTimers::default();
        let mut mode = JumpMode {
            jumping: true,
            ..Default::default()
        };
        let release = JumpEdges {
            pressed: false,
            released: true,
        };

        let (vy, outcome) = jump(5.0, ContactFlags::EMPTY, release, &mut timers, &mut mode, &settings);
        assert_eq!(vy, 2.5);
        assert_eq!(outcome, JumpOutcome::Cut);
        assert!(mode.jump_cutting);

        // Second release before the next launch: no further effect
        let (vy, outcome) = jump(2.5, ContactFlags::EMPTY, release, &mut timers, &mut mode, &settings);
        assert_eq!(vy, 2.5);
        assert_eq!(outcome, JumpOutcome::None);
    }

    #[test]
    fn test_cut_ignored_when_falling_or_not_jumping() {
        let settings = ControllerSettings::default();
        let mut timers = JumpTimers::default();
        let release = JumpEdges {
            pressed: false,
            released: true,
        };

        let mut mode = JumpMode {
            jumping: true,
            ..Default::default()
        };
        assert_eq!(
            jump(-4.0, ContactFlags::EMPTY, release, &mut timers, &mut mode, &settings),
            (-4.0, JumpOutcome::None)
        );

        let mut mode = JumpMode::default();
        assert_eq!(
            jump(4.0, ContactFlags::EMPTY, release, &mut timers, &mut mode, &settings),
            (4.0, JumpOutcome::None)
        );
    }

    #[test]
    fn test_restrict_blocks_into_walls_only() {
        let flags = ContactFlags::EMPTY.with(Contact::Right).with(Contact::Down);
        assert_eq!(restrict(Vec2::new(3.0, -2.0), flags), Vec2::ZERO);
        assert_eq!(restrict(Vec2::new(-3.0, 2.0), flags), Vec2::new(-3.0, 2.0));
    }

    #[test]
    fn test_landing_clears_jump_state() {
        let mut mode = JumpMode {
            jumping: true,
            jump_cutting: true,
            at_apex: false,
        };
        let landed = mode.on_contacts(grounded(), ContactFlags::EMPTY);
        assert_eq!(landed, GroundTransition::Landed);
        assert!(!mode.jumping);
        assert!(!mode.jump_cutting);

        assert_eq!(mode.on_contacts(ContactFlags::EMPTY, grounded()), GroundTransition::LeftGround);
        assert_eq!(mode.on_contacts(grounded(), grounded()), GroundTransition::None);
    }

    #[test]
    fn test_motion_phase() {
        let mut mode = JumpMode::default();
        assert_eq!(mode.phase(true, 0.0), MotionPhase::Grounded);
        assert_eq!(mode.phase(false, -1.0), MotionPhase::AirborneNoJump);
        mode.jumping = true;
        assert_eq!(mode.phase(false, 10.0), MotionPhase::Rising);
        assert_eq!(mode.phase(false, -10.0), MotionPhase::Falling);
        mode.jump_cutting = true;
        assert_eq!(mode.phase(false, 10.0), MotionPhase::JumpCut);
        mode.at_apex = true;
        assert_eq!(mode.phase(false, 1.0), MotionPhase::AtApex);
    }

    proptest! {
        #[test]
        fn prop_held_input_never_exceeds_max_run_speed(
            start in -13.0f32..13.0,
            inputs in prop::collection::vec(0.01f32..=1.0, 1..120),
            apex in prop::collection::vec(any::<bool>(), 120),
            sign in prop::bool::ANY,
        ) {
            let settings = ControllerSettings::default();
            let dir = if sign { 1.0 } else { -1.0 };
            let mut vx = start;
            for (i, input) in inputs.iter().enumerate() {
                vx = run(vx, dir * input, apex[i], &settings, DT);
                prop_assert!(vx.abs() <= settings.max_run_speed);
            }
        }

        #[test]
        fn prop_deceleration_is_monotonic(start in -13.0f32..13.0, ticks in 1usize..200) {
            let settings = ControllerSettings::default();
            let mut vx = start;
            for _ in 0..ticks {
                let next = run(vx, 0.0, false, &settings, DT);
                prop_assert!(next.abs() <= vx.abs());
                prop_assert!(next == 0.0 || next.signum() == start.signum());
                vx = next;
            }
        }

        #[test]
        fn prop_fall_speed_is_clamped(
            start in -40.0f32..30.0,
            ticks in 1usize..600,
            apex in any::<bool>(),
            cutting in any::<bool>(),
        ) {
            let settings = ControllerSettings::default();
            let mode = JumpMode { jumping: apex || cutting, jump_cutting: cutting, at_apex: apex };
            let mut vy = start;
            for _ in 0..ticks {
                vy = gravity(vy, &mode, &settings, DT);
                prop_assert!(vy >= -settings.max_fall_speed);
            }
        }
    }
}
