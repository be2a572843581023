/// XP granted for a finished attempt: `floor(lesson_xp * correct / total)`.
///
/// Never exceeds `lesson_xp`. An empty attempt earns nothing.
pub fn xp_earned(lesson_xp: u32, correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    (u64::from(lesson_xp) * correct / total as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_correct_earns_full_xp() {
        assert_eq!(xp_earned(10, 2, 2), 10);
    }

    #[test]
    fn partial_credit_rounds_down() {
        assert_eq!(xp_earned(10, 1, 2), 5);
        assert_eq!(xp_earned(10, 1, 3), 3);
        assert_eq!(xp_earned(15, 2, 3), 10);
        assert_eq!(xp_earned(20, 0, 4), 0);
    }

    #[test]
    fn never_exceeds_lesson_xp() {
        for total in 1..=6usize {
            for correct in 0..=total {
                let xp = xp_earned(17, correct, total);
                assert!(xp <= 17);
                assert_eq!(xp, (17 * correct / total) as u32);
            }
        }
        assert_eq!(xp_earned(10, 5, 2), 10);
    }

    #[test]
    fn empty_attempt_earns_nothing() {
        assert_eq!(xp_earned(10, 0, 0), 0);
    }
}
