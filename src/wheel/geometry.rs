use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Maximum number of threshold markers and thus MIDI channels.
pub const MAX_THRESHOLDS: usize = 16;
/// Maximum number of active segments per wheel.
pub const MAX_DIVISION: usize = 8;

// -------------------------------------------------------------------------------------------------

/// Fixed, ordered set of up to [`MAX_THRESHOLDS`] angular markers in turn fractions (0..1).
///
/// Thresholds are shared by all wheels. Threshold `i` drives MIDI channel `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    values: [f64; MAX_THRESHOLDS],
    len: usize,
}

impl ThresholdSet {
    /// A set without any markers.
    pub const fn empty() -> Self {
        Self {
            values: [0.0; MAX_THRESHOLDS],
            len: 0,
        }
    }

    /// `count` markers, evenly spread over a revolution, starting at 0.
    /// Counts above [`MAX_THRESHOLDS`] are clamped.
    pub fn evenly_spaced(count: usize) -> Self {
        let len = count.min(MAX_THRESHOLDS);
        let mut values = [0.0; MAX_THRESHOLDS];
        for (index, value) in values.iter_mut().take(len).enumerate() {
            *value = index as f64 / len as f64;
        }
        Self { values, len }
    }

    /// Create a set from the given marker positions in turn fractions.
    ///
    /// Positions outside of 0..1 are wrapped into the range. Returns an error when more than
    /// [`MAX_THRESHOLDS`] or non-finite values are passed.
    pub fn from_slice(positions: &[f64]) -> Result<Self, Error> {
        if positions.len() > MAX_THRESHOLDS {
            return Err(Error::ParameterError(format!(
                "at most {MAX_THRESHOLDS} thresholds are supported, got {}",
                positions.len()
            )));
        }
        let mut values = [0.0; MAX_THRESHOLDS];
        for (value, position) in values.iter_mut().zip(positions) {
            if !position.is_finite() {
                return Err(Error::ParameterError(format!(
                    "threshold position '{position}' is not finite"
                )));
            }
            *value = wrap_turn(*position);
        }
        Ok(Self {
            values,
            len: positions.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Marker positions in turn fractions.
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::evenly_spaced(MAX_THRESHOLDS)
    }
}

// -------------------------------------------------------------------------------------------------

/// Boundaries of a wheel's segments for a single block: `2 * division` values in turn
/// fractions. Even indices start an active segment, the following odd index ends it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentAngles {
    angles: [f64; 2 * MAX_DIVISION],
    len: usize,
}

impl SegmentAngles {
    pub fn as_slice(&self) -> &[f64] {
        &self.angles[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of active segments, the wheel's division.
    pub fn division(&self) -> usize {
        self.len / 2
    }

    /// Iterate over all active segments as `(start, end)` pairs.
    pub fn active_segments(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.as_slice()
            .chunks_exact(2)
            .map(|segment| (segment[0], segment[1]))
    }
}

// -------------------------------------------------------------------------------------------------

/// Per threshold flags, marking which thresholds a wheel's active segments currently cover.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdCrossings(u16);

impl ThresholdCrossings {
    pub const NONE: Self = Self(0);

    /// True when threshold `index` is crossed.
    #[inline]
    pub fn is_crossed(&self, index: usize) -> bool {
        index < MAX_THRESHOLDS && self.0 & (1 << index) != 0
    }

    /// Mark threshold `index` as crossed.
    #[inline]
    pub fn set_crossed(&mut self, index: usize) {
        debug_assert!(index < MAX_THRESHOLDS, "Invalid threshold index");
        if index < MAX_THRESHOLDS {
            self.0 |= 1 << index;
        }
    }

    /// Number of crossed thresholds.
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw bit mask, bit `i` representing threshold `i`.
    pub fn bits(&self) -> u16 {
        self.0
    }
}

// -------------------------------------------------------------------------------------------------

/// Wrap a position into a turn fraction in range \[0, 1).
fn wrap_turn(value: f64) -> f64 {
    let wrapped = value.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Calculate the segment boundaries of a wheel at the given phase.
///
/// Boundary `i` is `(phase + i / (2 * division)) mod 1` for `i` in `0..2 * division`.
/// Divisions are clamped into range `1..=MAX_DIVISION`.
pub fn segment_angles(phase: f64, division: usize) -> SegmentAngles {
    let division = division.clamp(1, MAX_DIVISION);
    let phase = if phase.is_finite() { phase } else { 0.0 };
    let len = 2 * division;
    let mut angles = [0.0; 2 * MAX_DIVISION];
    for (index, angle) in angles.iter_mut().take(len).enumerate() {
        *angle = wrap_turn(phase + index as f64 / len as f64);
    }
    SegmentAngles { angles, len }
}

/// Test if the threshold `value` lies within the segment `start..=end`, excluding the start.
/// Segments with `start >= end` wrap around the 0 position.
#[inline]
pub fn is_over_threshold(value: f64, start: f64, end: f64) -> bool {
    if start < end {
        start < value && value <= end
    } else {
        value > start || value <= end
    }
}

/// Calculate which of the first `count` thresholds any of the wheel's active segments cover.
pub fn crossings(
    angles: &SegmentAngles,
    thresholds: &ThresholdSet,
    count: usize,
) -> ThresholdCrossings {
    let mut crossings = ThresholdCrossings::NONE;
    let values = thresholds.as_slice();
    let count = count.min(values.len());
    for (start, end) in angles.active_segments() {
        for (index, value) in values.iter().take(count).enumerate() {
            if is_over_threshold(*value, start, end) {
                crossings.set_crossed(index);
            }
        }
    }
    crossings
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::assert_eq_with_epsilon;

    #[test]
    fn segment_boundaries() {
        assert_eq!(segment_angles(0.0, 1).as_slice(), &[0.0, 0.5]);

        let angles = segment_angles(0.25, 2);
        assert_eq!(angles.as_slice(), &[0.25, 0.5, 0.75, 0.0]);
        assert_eq!(angles.division(), 2);
        assert_eq!(
            angles.active_segments().collect::<Vec<_>>(),
            vec![(0.25, 0.5), (0.75, 0.0)]
        );

        let angles = segment_angles(0.9, 8);
        assert_eq!(angles.len(), 16);
        assert!(angles.as_slice().iter().all(|a| (0.0..1.0).contains(a)));
        assert_eq_with_epsilon!(angles.as_slice()[1], 0.9625, 1e-12);
        assert_eq_with_epsilon!(angles.as_slice()[2], 0.025, 1e-12);

        // divisions are clamped
        assert_eq!(segment_angles(0.0, 0).len(), 2);
        assert_eq!(segment_angles(0.0, 100).len(), 16);
    }

    #[test]
    fn threshold_coverage() {
        assert!(is_over_threshold(0.5, 0.2, 0.8));
        assert!(!is_over_threshold(0.1, 0.2, 0.8));
        assert!(is_over_threshold(0.95, 0.9, 0.1));
        assert!(!is_over_threshold(0.5, 0.9, 0.1));
        // start is exclusive, end inclusive
        assert!(!is_over_threshold(0.2, 0.2, 0.8));
        assert!(is_over_threshold(0.8, 0.2, 0.8));
        assert!(is_over_threshold(0.0, 0.9, 0.1));
    }

    #[test]
    fn wheel_crossings() {
        let thresholds = ThresholdSet::evenly_spaced(4); // 0, 0.25, 0.5, 0.75

        // single active half: (0.1, 0.6]
        let crossed = crossings(&segment_angles(0.1, 1), &thresholds, 4);
        assert!(!crossed.is_crossed(0));
        assert!(crossed.is_crossed(1));
        assert!(crossed.is_crossed(2));
        assert!(!crossed.is_crossed(3));
        assert_eq!(crossed.count(), 2);

        // wrapping active half: (0.6, 0.1]
        let crossed = crossings(&segment_angles(0.6, 1), &thresholds, 4);
        assert_eq!(crossed.bits(), 0b1001);

        // only the first `count` thresholds are considered
        let crossed = crossings(&segment_angles(0.6, 1), &thresholds, 1);
        assert_eq!(crossed.bits(), 0b0001);
        let crossed = crossings(&segment_angles(0.6, 1), &thresholds, 0);
        assert_eq!(crossed, ThresholdCrossings::NONE);

        // two active quarters: (0.1, 0.35] and (0.6, 0.85]
        let crossed = crossings(&segment_angles(0.1, 2), &thresholds, 4);
        assert_eq!(crossed.bits(), 0b1010);
    }

    #[test]
    fn threshold_sets() {
        assert_eq!(ThresholdSet::evenly_spaced(4).as_slice(), &[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(ThresholdSet::evenly_spaced(40).len(), MAX_THRESHOLDS);
        assert!(ThresholdSet::evenly_spaced(0).is_empty());
        assert!(ThresholdSet::empty().is_empty());
        assert_eq!(
            ThresholdSet::from_slice(&[0.5, 1.25, -0.25]).unwrap().as_slice(),
            &[0.5, 0.25, 0.75]
        );
        assert!(ThresholdSet::from_slice(&[0.0; 17]).is_err());
        assert!(ThresholdSet::from_slice(&[f64::NAN]).is_err());
    }
}
