//! Audible alarm lifecycle.
//!
//! # Responsibility
//! - Run at most one repeating alarm loop.
//! - Bound every loop with an unconditional auto-stop.
//!
//! # Invariants
//! - `start` while active is a no-op; `stop` while idle is a no-op.
//! - Playback failures are logged and never stop the loop.
//! - Disabling sound stops an active loop and turns `start` into a no-op.
//!
//! ```text
//!            start()                     ceiling configured
//!   Idle ─────────────► Looping ───────────────────────────► Expiring
//!    ▲                    │                                     │
//!    └──── stop() ────────┘◄──── stop() / stop_at reached ──────┘
//! ```

use crate::config::ReminderConfig;
use crate::reminder::platform::AlarmPlayer;
use chrono::{Duration, NaiveDateTime};
use log::{debug, info, warn};

/// Observable alert loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Idle,
    /// Repeating playback with no auto-stop armed.
    Looping { next_play_at: NaiveDateTime },
    /// Repeating playback with a safety auto-stop armed.
    Expiring {
        next_play_at: NaiveDateTime,
        stop_at: NaiveDateTime,
    },
}

impl AlertState {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Alert channel contract owned by the reminder scheduler.
pub trait AlertChannel {
    fn start(&mut self, now: NaiveDateTime);
    fn stop(&mut self);
    /// Advances the loop: plays when due, auto-stops past the ceiling.
    fn tick(&mut self, now: NaiveDateTime);
    fn state(&self) -> AlertState;
    fn set_sound_enabled(&mut self, enabled: bool);
    fn sound_enabled(&self) -> bool;

    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Earliest instant at which `tick` has work to do.
    fn next_wakeup(&self) -> Option<NaiveDateTime> {
        match self.state() {
            AlertState::Idle => None,
            AlertState::Looping { next_play_at } => Some(next_play_at),
            AlertState::Expiring {
                next_play_at,
                stop_at,
            } => Some(next_play_at.min(stop_at)),
        }
    }
}

/// Default alert channel: immediate playback, fixed cadence, bounded run.
pub struct LoopingAlertChannel<P: AlarmPlayer> {
    player: P,
    repeat_interval: Duration,
    ceiling: Option<Duration>,
    sound_enabled: bool,
    state: AlertState,
}

impl<P: AlarmPlayer> LoopingAlertChannel<P> {
    pub fn new(player: P, config: &ReminderConfig) -> Self {
        Self {
            player,
            repeat_interval: config.repeat_interval(),
            ceiling: config.alert_ceiling(),
            sound_enabled: true,
            state: AlertState::Idle,
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    fn play_once(&mut self) {
        if let Err(err) = self.player.play() {
            warn!(
                "event=alert_play module=reminder status=error error={}",
                err
            );
        }
    }
}

impl<P: AlarmPlayer> AlertChannel for LoopingAlertChannel<P> {
    fn start(&mut self, now: NaiveDateTime) {
        if !self.sound_enabled {
            debug!("event=alert_start module=reminder status=skip reason=sound_disabled");
            return;
        }
        if self.state.is_active() {
            debug!("event=alert_start module=reminder status=skip reason=already_active");
            return;
        }

        info!("event=alert_start module=reminder status=ok");
        self.play_once();
        let next_play_at = now + self.repeat_interval;
        self.state = match self.ceiling {
            Some(ceiling) => AlertState::Expiring {
                next_play_at,
                stop_at: now + ceiling,
            },
            None => AlertState::Looping { next_play_at },
        };
    }

    fn stop(&mut self) {
        if !self.state.is_active() {
            return;
        }
        info!("event=alert_stop module=reminder status=ok");
        self.state = AlertState::Idle;
    }

    fn tick(&mut self, now: NaiveDateTime) {
        let (next_play_at, stop_at) = match self.state {
            AlertState::Idle => return,
            AlertState::Looping { next_play_at } => (next_play_at, None),
            AlertState::Expiring {
                next_play_at,
                stop_at,
            } => (next_play_at, Some(stop_at)),
        };

        if let Some(stop_at) = stop_at {
            if now >= stop_at {
                info!("event=alert_stop module=reminder status=ok reason=ceiling");
                self.state = AlertState::Idle;
                return;
            }
        }
        if now < next_play_at {
            return;
        }

        self.play_once();
        // A late tick plays once and re-anchors instead of bursting.
        let next_play_at = now + self.repeat_interval;
        self.state = match stop_at {
            Some(stop_at) => AlertState::Expiring {
                next_play_at,
                stop_at,
            },
            None => AlertState::Looping { next_play_at },
        };
    }

    fn state(&self) -> AlertState {
        self.state
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }
}
