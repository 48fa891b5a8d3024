// Attendance percentage calculation
// percentage = round(present_days / total_days * 100), where Present and
// Late both count as present; zero records yields zero percent

use crate::attendance::models::{AttendanceStats, AttendanceStatus};

pub fn compute_stats(statuses: &[AttendanceStatus]) -> AttendanceStats {
    let total_days = statuses.len() as i64;
    let present_days = statuses.iter().filter(|s| s.counts_as_present()).count() as i64;

    let percentage = if total_days == 0 {
        0
    } else {
        ((present_days as f64 / total_days as f64) * 100.0).round() as u32
    };

    AttendanceStats {
        total_days,
        present_days,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use AttendanceStatus::{Absent, Late, Present};

    #[test]
    fn test_no_records_is_zero_percent() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.present_days, 0);
        assert_eq!(stats.percentage, 0);
    }

    #[test]
    fn test_late_counts_as_present() {
        let stats = compute_stats(&[Present, Late, Absent, Absent]);
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.present_days, 2);
        assert_eq!(stats.percentage, 50);
    }

    #[test]
    fn test_percentage_is_rounded() {
        // 2 of 3 = 66.67 -> 67
        let stats = compute_stats(&[Present, Present, Absent]);
        assert_eq!(stats.percentage, 67);

        // 1 of 3 = 33.3 -> 33
        let stats = compute_stats(&[Present, Absent, Absent]);
        assert_eq!(stats.percentage, 33);
    }

    #[test]
    fn test_full_attendance_is_one_hundred() {
        let stats = compute_stats(&[Present, Late, Present]);
        assert_eq!(stats.percentage, 100);
    }

    proptest! {
        #[test]
        fn prop_percentage_stays_in_bounds(
            statuses in proptest::collection::vec(
                prop_oneof![Just(Present), Just(Absent), Just(Late)],
                0..200,
            )
        ) {
            let stats = compute_stats(&statuses);
            prop_assert!(stats.percentage <= 100);
            prop_assert!(stats.present_days <= stats.total_days);
        }
    }
}
