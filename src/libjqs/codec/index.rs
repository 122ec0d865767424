//! Correct-answer indices are 0-based in memory and 1-based on disk. These
//! two functions are the only place the two meet.

use crate::libjqs::error::CorruptFileError;

pub fn to_file_index(index: usize) -> usize {
    index + 1
}

/// Converts a stored index, checking it names one of `answers` answers.
pub fn from_file_index(stored: i64, answers: usize) -> Result<usize, CorruptFileError> {
    match usize::try_from(stored) {
        Ok(one_based) if (1..=answers).contains(&one_based) => Ok(one_based - 1),
        _ => Err(CorruptFileError::CorrectIndexOutOfRange {
            index: stored,
            answers,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_both_ways() {
        assert_eq!(to_file_index(0), 1);
        assert_eq!(from_file_index(1, 3), Ok(0));
        assert_eq!(from_file_index(3, 3), Ok(2));
        for i in 0..5 {
            assert_eq!(from_file_index(to_file_index(i) as i64, 5), Ok(i));
        }
    }

    #[test]
    fn rejects_zero_negative_and_too_large() {
        for bad in [0, -1, 4] {
            assert_eq!(
                from_file_index(bad, 3),
                Err(CorruptFileError::CorrectIndexOutOfRange {
                    index: bad,
                    answers: 3
                })
            );
        }
    }
}
