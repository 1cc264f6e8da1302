use chrono::{DateTime, Local, Timelike, Utc};

/// Time source for session timestamps and time-of-day greetings.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0..=23) in the operator's local timezone.
    fn local_hour(&self) -> u32;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Clock pinned to a fixed instant and hour; used by tests and replays.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub local_hour: u32,
}

impl FixedClock {
    pub fn at_hour(local_hour: u32) -> Self {
        Self { now: Utc::now(), local_hour: local_hour.min(23) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_hour(&self) -> u32 {
        self.local_hour
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    pub fn salutation(&self) -> &'static str {
        match self {
            Self::Morning => "Good morning",
            Self::Afternoon => "Good afternoon",
            Self::Evening => "Good evening",
        }
    }
}
