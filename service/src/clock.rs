use clinic_utils::TimeOfDay;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};

/// Wall clock of the clinic. Every "today" and "now" decision of the
/// booking rules reads it from here.
#[automock]
pub trait ClockService {
    fn time_now(&self) -> Time;
    fn date_now(&self) -> Date;
    fn date_time_now(&self) -> PrimitiveDateTime;

    /// Current minute of the day on the scale of the slot grid.
    fn time_of_day_now(&self) -> TimeOfDay {
        TimeOfDay::from(self.time_now())
    }
}
