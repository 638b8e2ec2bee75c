use service::clock::ClockService;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// System clock in UTC.
pub struct ClockServiceImpl;

impl ClockServiceImpl {
    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

impl ClockService for ClockServiceImpl {
    fn time_now(&self) -> Time {
        Self::now().time()
    }
    fn date_now(&self) -> Date {
        Self::now().date()
    }
    fn date_time_now(&self) -> PrimitiveDateTime {
        let now = Self::now();
        PrimitiveDateTime::new(now.date(), now.time())
    }
}
