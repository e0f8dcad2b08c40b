//! Payment schedule generation
//!
//! Due dates advance one calendar month at a time from the previous due
//! date. When the target month is shorter than the current day of month the
//! date is clamped to that month's last day, and later dates continue from
//! the clamped day: 2025-01-31, 2025-02-28, 2025-03-28, ...

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::decimal::{share_down, to_money};
use crate::loan::model::Installment;

/// Due dates for `count` monthly payments starting on `start`; empty when `count <= 0`
pub fn payment_dates(start: NaiveDate, count: i64) -> Vec<NaiveDate> {
    let Ok(count) = usize::try_from(count) else {
        return Vec::new();
    };

    std::iter::successors(Some(start), |previous| {
        previous.checked_add_months(Months::new(1))
    })
    .take(count)
    .collect()
}

/// Installments splitting `total` evenly over the due dates
///
/// Every share but the last is truncated to cents; the last one takes the
/// remainder, so no installment is negative and the sum is exactly `total`.
pub fn installments(total: Decimal, start: NaiveDate, count: i64) -> Vec<Installment> {
    let dates = payment_dates(start, count);
    let Some(share) = share_down(total, dates.len() as i64) else {
        return Vec::new();
    };

    let last = dates.len() - 1;
    let remainder = to_money(total) - share * Decimal::from(last as i64);

    dates
        .into_iter()
        .enumerate()
        .map(|(index, due_date)| Installment {
            due_date,
            amount: if index == last { to_money(remainder) } else { share },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn twelve_monthly_dates_from_january_first() {
        let dates = payment_dates(date(2025, 1, 1), 12);
        assert_eq!(dates.len(), 12);
        assert_eq!(dates[0], date(2025, 1, 1));
        assert_eq!(dates[1], date(2025, 2, 1));
        assert_eq!(dates[11], date(2025, 12, 1));
    }

    #[test]
    fn crosses_year_boundary() {
        let dates = payment_dates(date(2025, 11, 15), 3);
        assert_eq!(dates, vec![date(2025, 11, 15), date(2025, 12, 15), date(2026, 1, 15)]);
    }

    #[test]
    fn zero_or_negative_count_is_empty() {
        assert!(payment_dates(date(2025, 1, 1), 0).is_empty());
        assert!(payment_dates(date(2025, 1, 1), -3).is_empty());
    }

    #[test]
    fn single_payment_is_the_start_date() {
        assert_eq!(payment_dates(date(2025, 6, 30), 1), vec![date(2025, 6, 30)]);
    }

    #[test]
    fn month_end_clamps_and_then_carries_the_clamped_day() {
        let dates = payment_dates(date(2025, 1, 31), 4);
        assert_eq!(
            dates,
            vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 28), date(2025, 4, 28)]
        );

        let leap = payment_dates(date(2024, 1, 31), 2);
        assert_eq!(leap[1], date(2024, 2, 29));
    }

    #[test]
    fn each_date_is_one_month_after_the_previous() {
        for (start, count) in [(date(2025, 1, 1), 24), (date(2024, 8, 31), 18), (date(2023, 3, 30), 7)] {
            let dates = payment_dates(start, count);
            assert_eq!(dates.len() as i64, count);
            assert_eq!(dates[0], start);
            for pair in dates.windows(2) {
                assert_eq!(pair[0].checked_add_months(Months::new(1)), Some(pair[1]));
            }
        }
    }

    #[test]
    fn same_inputs_same_output() {
        assert_eq!(payment_dates(date(2025, 5, 31), 9), payment_dates(date(2025, 5, 31), 9));
    }

    #[test]
    fn installments_sum_to_total() {
        let plan = installments(dec!(1000), date(2025, 1, 1), 3);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].amount, dec!(333.33));
        assert_eq!(plan[1].amount, dec!(333.33));
        assert_eq!(plan[2].amount, dec!(333.34));
        let sum: Decimal = plan.iter().map(|i| i.amount).sum();
        assert_eq!(sum, dec!(1000));
    }

    #[test]
    fn installments_even_split() {
        let plan = installments(dec!(1200), date(2025, 1, 1), 12);
        assert!(plan.iter().all(|i| i.amount == dec!(100)));
        assert_eq!(plan[11].due_date, date(2025, 12, 1));
    }

    #[test]
    fn small_total_over_many_payments_stays_non_negative() {
        let plan = installments(dec!(6.00), date(2025, 1, 1), 1200);
        assert_eq!(plan.len(), 1200);
        assert!(plan.iter().all(|i| i.amount >= Decimal::ZERO));
        assert_eq!(plan[1199].amount, dec!(6.00));
        let sum: Decimal = plan.iter().map(|i| i.amount).sum();
        assert_eq!(sum, dec!(6.00));
    }

    #[test]
    fn remainder_goes_to_the_last_installment() {
        let plan = installments(dec!(2), date(2025, 1, 1), 3);
        let amounts: Vec<Decimal> = plan.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![dec!(0.66), dec!(0.66), dec!(0.68)]);
    }

    #[test]
    fn installments_empty_for_zero_count() {
        assert!(installments(dec!(1200), date(2025, 1, 1), 0).is_empty());
    }
}
