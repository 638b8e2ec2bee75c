use std::sync::Arc;

use async_trait::async_trait;
use clinic_utils::{DayOfWeek, TimeOfDay};
use dao::{clinic_service::ClinicServiceDao, TransactionDao};
use service::{
    availability::AvailabilityService,
    clock::ClockService,
    config::ConfigService,
    suggestion::{ScoredSlot, SuggestionRequest, SuggestionService, TimePreference},
    time_grid::TimeGridService,
    ServiceError, ValidationFailureItem,
};
use time::Date;
use tracing::debug;

use crate::gen_service_impl;

/// Half-open `[from, to)` windows in minutes of the day.
const MORNING: (u32, u32) = (8 * 60, 11 * 60);
const AFTERNOON: (u32, u32) = (14 * 60, 16 * 60);
const NEAR_LUNCH: (u32, u32) = (11 * 60 + 30, 13 * 60);
const EARLY_MORNING: (u32, u32) = (8 * 60, 9 * 60);
const OPTIMAL: (u32, u32) = (9 * 60, 10 * 60);
const LATE_DAY_FROM: u32 = 16 * 60 + 30;
const SOON_DAYS: i64 = 3;

fn in_window(minute: u32, (from, to): (u32, u32)) -> bool {
    from <= minute && minute < to
}

/// Heuristic rank of an open slot. Higher is better.
pub fn score_slot(
    date: Date,
    start: TimeOfDay,
    remaining: u32,
    max_per_slot: u32,
    preference: TimePreference,
    today: Date,
) -> i32 {
    let mut score = if remaining >= max_per_slot {
        10
    } else if remaining.saturating_mul(2) >= max_per_slot {
        5
    } else {
        2
    };

    let minute = start.minutes();
    if in_window(minute, MORNING) {
        score += if preference == TimePreference::Morning { 5 } else { 3 };
    }
    if in_window(minute, AFTERNOON) {
        score += if preference == TimePreference::Afternoon { 5 } else { 2 };
    }
    if in_window(minute, NEAR_LUNCH) {
        score -= 2;
    }
    if minute >= LATE_DAY_FROM {
        score -= 2;
    }
    if in_window(minute, EARLY_MORNING) {
        score += 1;
    }
    if in_window(minute, OPTIMAL) {
        score += 2;
    }

    if !DayOfWeek::from(date).is_weekend() {
        score += 1;
    }
    let days_ahead = (date - today).whole_days();
    if (0..=SOON_DAYS).contains(&days_ahead) {
        score += 2;
    }
    score
}

gen_service_impl! {
    struct SuggestionServiceImpl: service::suggestion::SuggestionService = SuggestionServiceDeps {
        ClinicServiceDao: dao::clinic_service::ClinicServiceDao<Transaction = Self::Transaction> = clinic_service_dao,
        TimeGridService: service::time_grid::TimeGridService<Transaction = Self::Transaction> = time_grid_service,
        AvailabilityService: service::availability::AvailabilityService<Transaction = Self::Transaction> = availability_service,
        ConfigService: service::config::ConfigService = config_service,
        ClockService: service::clock::ClockService = clock_service,
        TransactionDao: dao::TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

#[async_trait]
impl<Deps: SuggestionServiceDeps> SuggestionService for SuggestionServiceImpl<Deps> {
    type Transaction = Deps::Transaction;

    async fn suggest_slots(
        &self,
        request: &SuggestionRequest,
        limit: usize,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[ScoredSlot]>, ServiceError> {
        if request.from > request.to {
            return Err(ServiceError::DateOrderWrong(request.from, request.to));
        }
        let config = self.config_service.get_config().await?;
        if (request.to - request.from).whole_days() >= config.max_suggestion_days as i64 {
            return Err(ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue("to".into())].into(),
            ));
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let clinic_service = self
            .clinic_service_dao
            .find_by_id(request.service_id, tx.clone())
            .await?
            .filter(|clinic_service| clinic_service.deleted.is_none())
            .ok_or(ServiceError::EntityNotFound(request.service_id))?;
        let today = self.clock_service.date_now();
        let now = self.clock_service.time_of_day_now();

        let mut slots = Vec::new();
        let mut next_date = Some(request.from.max(today));
        while let Some(date) = next_date.filter(|date| *date <= request.to) {
            let starts = self
                .time_grid_service
                .compute_slots(
                    request.doctor_id,
                    date,
                    clinic_service.duration_minutes,
                    request.earliest,
                    request.latest,
                    Some(tx.clone()),
                )
                .await?;
            for start in starts.iter().copied() {
                if date == today && start <= now {
                    continue;
                }
                let availability = self
                    .availability_service
                    .check_availability(
                        request.doctor_id,
                        date,
                        start,
                        clinic_service.max_slots_per_hour,
                        Some(tx.clone()),
                    )
                    .await?;
                if availability.remaining == 0 {
                    continue;
                }
                let end = start
                    .add_minutes(clinic_service.duration_minutes)
                    .map_err(|_| ServiceError::InternalError)?;
                slots.push(ScoredSlot {
                    date,
                    start,
                    end,
                    remaining: availability.remaining,
                    score: score_slot(
                        date,
                        start,
                        availability.remaining,
                        clinic_service.max_slots_per_hour,
                        request.preference,
                        today,
                    ),
                });
            }
            next_date = date.next_day();
        }

        slots.sort_by(|a, b| b.score.cmp(&a.score));
        slots.truncate(limit);
        debug!(
            "Suggesting {} slots of doctor {} between {} and {}",
            slots.len(),
            request.doctor_id,
            request.from,
            request.to
        );

        self.transaction_dao.commit(tx).await?;
        Ok(slots.into())
    }
}
