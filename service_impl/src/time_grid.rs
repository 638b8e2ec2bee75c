use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{DayOfWeek, TimeOfDay, MINUTES_PER_DAY};
use dao::{
    break_interval::BreakIntervalDao, off_day::OffDayDao, working_hours::WorkingHoursDao,
    TransactionDao,
};
use service::{
    time_grid::{ScheduleConflict, TimeGridService, SLOT_STRIDE_MINUTES},
    ServiceError, ValidationFailureItem,
};
use time::Date;
use tracing::debug;
use uuid::Uuid;

use crate::gen_service_impl;

fn overlaps_break(start: u32, duration_minutes: u32, breaks: &[(TimeOfDay, TimeOfDay)]) -> bool {
    breaks.iter().any(|(break_start, break_end)| {
        start < break_end.minutes() && start.saturating_add(duration_minutes) > break_start.minutes()
    })
}

/// Slot starts from `window_start` in steps of 30 minutes whose slot fits
/// into the window and does not touch any break.
pub fn compute_grid(
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    duration_minutes: u32,
    breaks: &[(TimeOfDay, TimeOfDay)],
) -> Vec<TimeOfDay> {
    let end = window_end.minutes();
    (window_start.minutes()..)
        .step_by(SLOT_STRIDE_MINUTES as usize)
        .take_while(|start| start.saturating_add(duration_minutes) <= end)
        .filter(|start| !overlaps_break(*start, duration_minutes, breaks))
        .filter_map(|start| TimeOfDay::from_minutes(start).ok())
        .collect()
}

/// Checks a single start against the working hours of its weekday.
///
/// Accepts exactly the members of
/// `compute_grid(working_hours.0, working_hours.1, duration_minutes, breaks)`.
pub fn check_slot(
    date: Date,
    off_day: bool,
    working_hours: Option<(TimeOfDay, TimeOfDay)>,
    breaks: &[(TimeOfDay, TimeOfDay)],
    start: TimeOfDay,
    duration_minutes: u32,
) -> Result<(), ScheduleConflict> {
    if off_day {
        return Err(ScheduleConflict::OffDay(date));
    }
    let (work_start, work_end) =
        working_hours.ok_or_else(|| ScheduleConflict::NotWorkingDay(DayOfWeek::from(date)))?;
    if start < work_start || start.minutes().saturating_add(duration_minutes) > work_end.minutes() {
        return Err(ScheduleConflict::OutsideWorkingHours {
            start: work_start,
            end: work_end,
        });
    }
    if (start.minutes() - work_start.minutes()) % SLOT_STRIDE_MINUTES != 0 {
        return Err(ScheduleConflict::NotOnGrid(start));
    }
    if let Some((break_start, break_end)) = breaks.iter().find(|(break_start, break_end)| {
        start.minutes() < break_end.minutes()
            && start.minutes().saturating_add(duration_minutes) > break_start.minutes()
    }) {
        return Err(ScheduleConflict::Break {
            start: *break_start,
            end: *break_end,
        });
    }
    Ok(())
}

fn validate_duration(duration_minutes: u32) -> Result<(), ServiceError> {
    if duration_minutes == 0 || duration_minutes > MINUTES_PER_DAY {
        return Err(ServiceError::ValidationError(
            [ValidationFailureItem::InvalidValue("duration_minutes".into())].into(),
        ));
    }
    Ok(())
}

gen_service_impl! {
    struct TimeGridServiceImpl: service::time_grid::TimeGridService = TimeGridServiceDeps {
        WorkingHoursDao: dao::working_hours::WorkingHoursDao<Transaction = Self::Transaction> = working_hours_dao,
        BreakIntervalDao: dao::break_interval::BreakIntervalDao<Transaction = Self::Transaction> = break_interval_dao,
        OffDayDao: dao::off_day::OffDayDao<Transaction = Self::Transaction> = off_day_dao,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

struct DaySchedule {
    off_day: bool,
    working_hours: Option<(TimeOfDay, TimeOfDay)>,
    breaks: Vec<(TimeOfDay, TimeOfDay)>,
}

impl<Deps: TimeGridServiceDeps> TimeGridServiceImpl<Deps> {
    async fn load_day(
        &self,
        doctor_id: Uuid,
        date: Date,
        tx: Deps::Transaction,
    ) -> Result<DaySchedule, ServiceError> {
        let off_day = self
            .off_day_dao
            .find_by_doctor_and_date(doctor_id, date, tx.clone())
            .await?
            .is_some();
        if off_day {
            return Ok(DaySchedule {
                off_day,
                working_hours: None,
                breaks: Vec::new(),
            });
        }
        let working_hours = self
            .working_hours_dao
            .find_by_doctor_and_day(doctor_id, DayOfWeek::from(date), tx.clone())
            .await?
            .map(|working_hours| (working_hours.start, working_hours.end));
        let breaks = self
            .break_interval_dao
            .find_by_doctor_and_date(doctor_id, date, tx)
            .await?
            .iter()
            .map(|break_interval| (break_interval.start, break_interval.end))
            .collect();
        Ok(DaySchedule {
            off_day,
            working_hours,
            breaks,
        })
    }
}

#[async_trait]
impl<Deps: TimeGridServiceDeps> TimeGridService for TimeGridServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn compute_slots(
        &self,
        doctor_id: Uuid,
        date: Date,
        duration_minutes: u32,
        earliest: Option<TimeOfDay>,
        latest: Option<TimeOfDay>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[TimeOfDay]>, ServiceError> {
        validate_duration(duration_minutes)?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let day = self.load_day(doctor_id, date, tx.clone()).await?;

        let slots: Arc<[TimeOfDay]> = match day.working_hours {
            Some((work_start, work_end)) if !day.off_day => {
                let window_start = earliest.map_or(work_start, |earliest| earliest.max(work_start));
                let window_end = latest.map_or(work_end, |latest| latest.min(work_end));
                compute_grid(window_start, window_end, duration_minutes, &day.breaks).into()
            }
            _ => Vec::<TimeOfDay>::new().into(),
        };
        debug!(
            "Computed {} slots for doctor {} on {}",
            slots.len(),
            doctor_id,
            date
        );

        self.transaction_dao.commit(tx).await?;
        Ok(slots)
    }

    async fn validate_slot(
        &self,
        doctor_id: Uuid,
        date: Date,
        start: TimeOfDay,
        duration_minutes: u32,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        validate_duration(duration_minutes)?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let day = self.load_day(doctor_id, date, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;

        check_slot(
            date,
            day.off_day,
            day.working_hours,
            &day.breaks,
            start,
            duration_minutes,
        )
        .map_err(ServiceError::ScheduleConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn hm(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn test_grid_fills_window() {
        let grid = compute_grid(hm(9, 0), hm(11, 0), 30, &[]);
        assert_eq!(vec![hm(9, 0), hm(9, 30), hm(10, 0), hm(10, 30)], grid);
    }

    #[test]
    fn test_grid_slot_may_end_at_closing_time() {
        let grid = compute_grid(hm(9, 0), hm(10, 0), 60, &[]);
        assert_eq!(vec![hm(9, 0)], grid);
    }

    #[test]
    fn test_grid_empty_when_duration_exceeds_window() {
        assert!(compute_grid(hm(9, 0), hm(9, 45), 60, &[]).is_empty());
        assert!(compute_grid(hm(9, 0), hm(9, 0), 30, &[]).is_empty());
    }

    #[test]
    fn test_grid_break_is_half_open() {
        let grid = compute_grid(hm(9, 0), hm(12, 0), 30, &[(hm(10, 0), hm(10, 30))]);
        assert_eq!(
            vec![hm(9, 0), hm(9, 30), hm(10, 30), hm(11, 0), hm(11, 30)],
            grid
        );
    }

    #[test]
    fn test_grid_break_is_duration_aware() {
        let grid = compute_grid(hm(9, 0), hm(12, 0), 60, &[(hm(10, 0), hm(10, 30))]);
        assert_eq!(vec![hm(9, 0), hm(10, 30), hm(11, 0)], grid);
    }

    #[test]
    fn test_grid_oversized_duration_does_not_fit() {
        assert!(compute_grid(hm(8, 0), hm(17, 0), u32::MAX, &[]).is_empty());
        assert!(compute_grid(
            hm(8, 0),
            hm(17, 0),
            u32::MAX,
            &[(hm(10, 0), hm(10, 30))]
        )
        .is_empty());
        assert_eq!(
            Err(ScheduleConflict::OutsideWorkingHours {
                start: hm(8, 0),
                end: hm(17, 0)
            }),
            check_slot(
                date!(2030 - 01 - 07),
                false,
                Some((hm(8, 0), hm(17, 0))),
                &[],
                hm(8, 0),
                u32::MAX
            )
        );
    }

    #[test]
    fn test_check_slot_reasons() {
        let monday = date!(2030 - 01 - 07);
        let hours = Some((hm(8, 0), hm(12, 0)));
        let breaks = [(hm(10, 0), hm(10, 30))];

        assert_eq!(
            Err(ScheduleConflict::OffDay(monday)),
            check_slot(monday, true, hours, &breaks, hm(9, 0), 30)
        );
        assert_eq!(
            Err(ScheduleConflict::NotWorkingDay(DayOfWeek::Monday)),
            check_slot(monday, false, None, &breaks, hm(9, 0), 30)
        );
        assert_eq!(
            Err(ScheduleConflict::OutsideWorkingHours {
                start: hm(8, 0),
                end: hm(12, 0)
            }),
            check_slot(monday, false, hours, &breaks, hm(11, 30), 60)
        );
        assert_eq!(
            Err(ScheduleConflict::NotOnGrid(hm(9, 15))),
            check_slot(monday, false, hours, &breaks, hm(9, 15), 30)
        );
        assert_eq!(
            Err(ScheduleConflict::Break {
                start: hm(10, 0),
                end: hm(10, 30)
            }),
            check_slot(monday, false, hours, &breaks, hm(9, 30), 60)
        );
        assert_eq!(
            Ok(()),
            check_slot(monday, false, hours, &breaks, hm(11, 30), 30)
        );
    }
}
