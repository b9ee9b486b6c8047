// src/logging/trigger.rs

//! Rollover bookkeeping for the active log file.
//!
//! Timestamps are whole seconds since the Unix epoch. Wall-clock boundaries
//! (`midnight`, weekday rolls, archive suffixes) are evaluated in UTC or in
//! the local timezone depending on the policy.

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeZone, Timelike, Utc};

use crate::logging::policy::{RotationTrigger, When};

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Live rollover state derived from a [`RotationTrigger`].
#[derive(Debug, Clone)]
pub enum TriggerState {
    Time(TimeSchedule),
    Size { max_bytes: u64 },
}

impl TriggerState {
    /// `created` is the active file's mtime, or now for a fresh file.
    pub fn new(trigger: &RotationTrigger, created: i64) -> Self {
        match *trigger {
            RotationTrigger::Time {
                when,
                interval,
                at_time,
                utc,
            } => TriggerState::Time(TimeSchedule::new(when, interval, at_time, utc, created)),
            RotationTrigger::Size { max_bytes } => TriggerState::Size { max_bytes },
        }
    }

    /// Whether writing `pending` more bytes at `now` must rotate first.
    pub fn should_rollover(&self, now: i64, current_size: u64, pending: u64) -> bool {
        match self {
            TriggerState::Time(schedule) => now >= schedule.rollover_at(),
            TriggerState::Size { max_bytes } => {
                *max_bytes > 0 && current_size + pending >= *max_bytes
            }
        }
    }
}

/// Next wall-clock rollover of a time-triggered log.
#[derive(Debug, Clone)]
pub struct TimeSchedule {
    when: When,
    interval_secs: i64,
    at_time: Option<NaiveTime>,
    utc: bool,
    rollover_at: i64,
}

impl TimeSchedule {
    pub fn new(when: When, interval: u32, at_time: Option<NaiveTime>, utc: bool, start: i64) -> Self {
        let mut schedule = Self {
            when,
            interval_secs: when.base_secs() * i64::from(interval.max(1)),
            at_time,
            utc,
            rollover_at: 0,
        };
        schedule.rollover_at = schedule.compute_rollover(start);
        schedule
    }

    pub fn rollover_at(&self) -> i64 {
        self.rollover_at
    }

    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    /// First rollover strictly after `current`.
    pub fn compute_rollover(&self, current: i64) -> i64 {
        let fallback = current + self.interval_secs;
        if !matches!(self.when, When::Midnight | When::Weekday(_)) {
            return fallback;
        }
        let Some((secs_of_day, weekday)) = self.clock(current) else {
            return fallback;
        };

        let rotate_secs = match self.at_time {
            Some(t) => i64::from(t.num_seconds_from_midnight()),
            None => SECS_PER_DAY,
        };
        let mut remaining = rotate_secs - secs_of_day;
        let mut day = weekday;
        if remaining <= 0 {
            remaining += SECS_PER_DAY;
            day = (day + 1) % 7;
        }
        let mut result = current + remaining;

        if let When::Weekday(target) = self.when {
            let target = i64::from(target);
            if day != target {
                let days_to_wait = if day < target {
                    target - day
                } else {
                    6 - day + target + 1
                };
                result += days_to_wait * SECS_PER_DAY;
            }
        }
        result
    }

    /// Move the schedule past `now` after a rotation.
    pub fn advance(&mut self, now: i64) {
        let mut next = self.compute_rollover(now);
        while next <= now {
            next += self.interval_secs;
        }
        self.rollover_at = next;
    }

    /// Archive token for the period that just ended, e.g. `20240101`.
    pub fn suffix(&self) -> String {
        let start = self.rollover_at - self.interval_secs;
        let format = self.when.suffix_format();
        if self.utc {
            DateTime::<Utc>::from_timestamp(start, 0)
                .map(|dt| dt.format(format).to_string())
                .unwrap_or_else(|| start.to_string())
        } else {
            Local
                .timestamp_opt(start, 0)
                .earliest()
                .map(|dt| dt.format(format).to_string())
                .unwrap_or_else(|| start.to_string())
        }
    }

    /// Seconds since midnight and weekday (Monday = 0) of `ts`.
    fn clock(&self, ts: i64) -> Option<(i64, i64)> {
        let (secs, weekday) = if self.utc {
            let dt = DateTime::<Utc>::from_timestamp(ts, 0)?;
            (dt.num_seconds_from_midnight(), dt.weekday())
        } else {
            let dt = Local.timestamp_opt(ts, 0).earliest()?;
            (dt.num_seconds_from_midnight(), dt.weekday())
        };
        Some((i64::from(secs), i64::from(weekday.num_days_from_monday())))
    }
}
