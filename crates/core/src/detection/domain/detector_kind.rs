use std::fmt;

/// Which face detection algorithm to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorKind {
    /// Classical cascade scan. Cheap, lower recall on off-angle or occluded faces.
    #[default]
    Fast,
    /// Learned detection network. Far more compute and memory intensive;
    /// worth it mainly with acceleration hardware.
    Accurate,
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::Fast => write!(f, "fast"),
            DetectorKind::Accurate => write!(f, "accurate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fast() {
        assert_eq!(DetectorKind::default(), DetectorKind::Fast);
    }

    #[test]
    fn test_display() {
        assert_eq!(DetectorKind::Fast.to_string(), "fast");
        assert_eq!(DetectorKind::Accurate.to_string(), "accurate");
    }
}
