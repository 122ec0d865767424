use crate::libjqs::error::CorruptFileError;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Dotted version written at the start of every file, e.g. `0.9` or `0.9.1`.
///
/// Compared part by part as numbers, so `0.10` is newer than `0.9`.
/// Trailing zero parts do not count: `0.9.0` equals `0.9`.
#[derive(Debug, Clone)]
pub struct FormatVersion(Cow<'static, [u32]>);

/// The version this build writes, and the newest it reads.
pub const FILE_FORMAT_VERSION: FormatVersion = FormatVersion(Cow::Borrowed(&[0, 9]));

impl FormatVersion {
    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    fn significant(&self) -> &[u32] {
        let len = self.0.iter().rposition(|&part| part != 0).map_or(0, |i| i + 1);
        &self.0[..len]
    }
}

impl PartialEq for FormatVersion {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for FormatVersion {}

impl Ord for FormatVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant().cmp(other.significant())
    }
}

impl PartialOrd for FormatVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for FormatVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for FormatVersion {
    type Err = CorruptFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| CorruptFileError::InvalidVersion(s.to_string()))?;
        Ok(FormatVersion(Cow::Owned(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> FormatVersion {
        s.parse().unwrap()
    }

    #[test]
    fn compares_numerically() {
        assert!(v("0.10") > v("0.9"));
        assert!(v("1.0") > v("0.99"));
        assert!(v("0.9.1") > FILE_FORMAT_VERSION);
        assert!(v("1.0.0") > FILE_FORMAT_VERSION);
        assert!(v("0.8.7") < FILE_FORMAT_VERSION);
        assert!(v("0.8") < FILE_FORMAT_VERSION);
        assert_eq!(v("0.9.0"), FILE_FORMAT_VERSION);
        assert_eq!(v("1"), v("1.0"));
        assert_eq!(v("0.9.1").parts(), &[0, 9, 1]);
        assert_eq!(FILE_FORMAT_VERSION.to_string(), "0.9");
        assert_eq!(v("0.9.1").to_string(), "0.9.1");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            "v0.9".parse::<FormatVersion>(),
            Err(CorruptFileError::InvalidVersion("v0.9".into()))
        );
        assert!("0..9".parse::<FormatVersion>().is_err());
        assert!("0.9.".parse::<FormatVersion>().is_err());
        assert!("".parse::<FormatVersion>().is_err());
    }
}
