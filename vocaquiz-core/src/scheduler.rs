use crate::{CardId, CoreError, Quality, Schedule, EF_MIN, MAX_INTERVAL_DAYS};
use chrono::{DateTime, Duration, Utc};

/// A computed schedule waiting to be written back to the card store.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleUpdate {
    pub card_id: CardId,
    pub schedule: Schedule,
}

fn ease_delta(q: u8) -> f64 {
    let miss = f64::from(5 - q);
    0.1 - miss * (0.08 + miss * 0.02)
}

/// SM-2 update for one rating.
///
/// Lapses (quality < 3) reset the repetition count and fall back to a one day
/// interval. Successful reviews step through 1, 6, then `round(prev * ease)`
/// days, where `ease` is the factor in effect before this rating. Intervals
/// are capped at [`MAX_INTERVAL_DAYS`]. The ease factor moves on every rating
/// and is floored at [`EF_MIN`].
pub fn apply_sm2_update(
    schedule: &Schedule,
    quality: u8,
    now: DateTime<Utc>,
) -> Result<Schedule, CoreError> {
    let quality = Quality::new(quality)?;
    Ok(apply_quality(schedule, quality, now))
}

pub fn apply_quality(schedule: &Schedule, quality: Quality, now: DateTime<Utc>) -> Schedule {
    let q = quality.value();

    let (repetitions, interval) = if quality.is_correct() {
        let reps = schedule.repetitions + 1;
        let interval = match reps {
            1 => 1,
            2 => 6,
            _ => {
                let base = f64::from(schedule.interval.clamp(1, MAX_INTERVAL_DAYS));
                (base * schedule.ease_factor)
                    .round()
                    .clamp(1.0, f64::from(MAX_INTERVAL_DAYS)) as u32
            }
        };
        (reps, interval)
    } else {
        (0, 1)
    };

    let ease_factor = (schedule.ease_factor + ease_delta(q)).max(EF_MIN);

    Schedule {
        ease_factor,
        interval,
        repetitions,
        last_review: Some(now),
        next_review: Some(
            now.checked_add_signed(Duration::days(i64::from(interval)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        ),
        last_quality: Some(quality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn delta_table() {
        let expected = [(1, -0.54), (2, -0.32), (3, -0.14), (4, 0.0), (5, 0.1)];
        for (q, d) in expected {
            assert!((ease_delta(q) - d).abs() < 1e-9, "q={q}");
        }
    }

    #[test]
    fn zero_quality_is_rejected() {
        let err = apply_sm2_update(&Schedule::default(), 0, now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuality(0)));
    }

    #[test]
    fn interval_uses_ease_before_update() {
        let s = Schedule {
            ease_factor: 2.5,
            interval: 6,
            repetitions: 2,
            ..Schedule::default()
        };
        // quality 3 lowers ease to 2.36, but the step still uses 2.5
        let out = apply_sm2_update(&s, 3, now()).unwrap();
        assert_eq!(out.interval, 15);
        assert!((out.ease_factor - 2.36).abs() < 1e-9);
    }
}
