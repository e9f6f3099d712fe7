//! Steering classes and the class-to-angle table
//!
//! The classifier emits a raw class index per frame. A [`LabelMap`] turns
//! that index into a [`SteeringClass`], and a [`SteeringTable`] turns the
//! class into a servo angle. Both are configuration: the training scripts
//! never agreed on which index meant which direction.

use core::fmt;

/// Discrete steering decision produced by the perception model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteeringClass {
    Left,
    Straight,
    Right,
}

impl SteeringClass {
    /// Parse a textual label (case-insensitive)
    ///
    /// Accepts the full names and their first letter.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("left") || label.eq_ignore_ascii_case("l") {
            Some(SteeringClass::Left)
        } else if label.eq_ignore_ascii_case("straight") || label.eq_ignore_ascii_case("s") {
            Some(SteeringClass::Straight)
        } else if label.eq_ignore_ascii_case("right") || label.eq_ignore_ascii_case("r") {
            Some(SteeringClass::Right)
        } else {
            None
        }
    }

    /// Lowercase name used in logs and label files
    pub fn name(&self) -> &'static str {
        match self {
            SteeringClass::Left => "left",
            SteeringClass::Straight => "straight",
            SteeringClass::Right => "right",
        }
    }
}

impl fmt::Display for SteeringClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping from classifier output index to steering class
///
/// Default ordering is `[Straight, Left, Right]` (0 = straight, 1 = left,
/// 2 = right), the convention used by the direction models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMap {
    classes: [SteeringClass; 3],
}

impl LabelMap {
    /// Create a label map from an explicit index ordering
    pub const fn new(classes: [SteeringClass; 3]) -> Self {
        Self { classes }
    }

    /// Resolve a class index
    ///
    /// Returns `None` for indices the model should never produce.
    pub fn class_for(&self, index: usize) -> Option<SteeringClass> {
        self.classes.get(index).copied()
    }

    /// Reverse lookup used when writing label files
    pub fn index_of(&self, class: SteeringClass) -> Option<usize> {
        self.classes.iter().position(|c| *c == class)
    }

    /// Index ordering
    pub fn classes(&self) -> &[SteeringClass; 3] {
        &self.classes
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new([
            SteeringClass::Straight,
            SteeringClass::Left,
            SteeringClass::Right,
        ])
    }
}

/// Smallest steering offset seen on the chassis (degrees)
pub const MIN_OFFSET_DEG: f32 = 15.0;
/// Largest steering offset seen on the chassis (degrees)
pub const MAX_OFFSET_DEG: f32 = 45.0;

/// Fixed class-to-angle table
///
/// Straight maps to `center`, Left to `center + left_offset` and Right to
/// `center - right_offset`. Angles are not clamped here; the servo layer
/// clamps them into the safe band before conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringTable {
    /// Center angle in degrees (default 90)
    pub center: f32,
    /// Offset added for a left turn (degrees)
    pub left_offset: f32,
    /// Offset subtracted for a right turn (degrees)
    pub right_offset: f32,
}

impl SteeringTable {
    /// Create a symmetric table around `center`
    pub fn symmetric(center: f32, offset: f32) -> Self {
        Self {
            center,
            left_offset: offset,
            right_offset: offset,
        }
    }

    /// Servo angle for a steering class
    pub fn angle_for(&self, class: SteeringClass) -> f32 {
        match class {
            SteeringClass::Straight => self.center,
            SteeringClass::Left => self.center + self.left_offset,
            SteeringClass::Right => self.center - self.right_offset,
        }
    }

    /// Whether both offsets are within the range observed on real chassis
    pub fn offsets_in_observed_range(&self) -> bool {
        let range = MIN_OFFSET_DEG..=MAX_OFFSET_DEG;
        range.contains(&self.left_offset) && range.contains(&self.right_offset)
    }
}

impl Default for SteeringTable {
    fn default() -> Self {
        Self::symmetric(90.0, 30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(SteeringClass::from_label("Left"), Some(SteeringClass::Left));
        assert_eq!(
            SteeringClass::from_label(" straight "),
            Some(SteeringClass::Straight)
        );
        assert_eq!(SteeringClass::from_label("R"), Some(SteeringClass::Right));
        assert_eq!(SteeringClass::from_label("back"), None);
    }

    #[test]
    fn test_default_label_map() {
        let map = LabelMap::default();
        assert_eq!(map.class_for(0), Some(SteeringClass::Straight));
        assert_eq!(map.class_for(1), Some(SteeringClass::Left));
        assert_eq!(map.class_for(2), Some(SteeringClass::Right));
        assert_eq!(map.class_for(3), None);
        assert_eq!(map.index_of(SteeringClass::Right), Some(2));
    }

    #[test]
    fn test_custom_label_map() {
        // Some models were trained with 0 = left
        let map = LabelMap::new([
            SteeringClass::Left,
            SteeringClass::Straight,
            SteeringClass::Right,
        ]);
        assert_eq!(map.class_for(0), Some(SteeringClass::Left));
        assert_eq!(map.index_of(SteeringClass::Straight), Some(1));
    }

    #[test]
    fn test_table_angles() {
        let table = SteeringTable::default();
        assert_eq!(table.angle_for(SteeringClass::Straight), 90.0);
        assert_eq!(table.angle_for(SteeringClass::Left), 120.0);
        assert_eq!(table.angle_for(SteeringClass::Right), 60.0);
    }

    #[test]
    fn test_asymmetric_table() {
        let table = SteeringTable {
            center: 85.0,
            left_offset: 25.0,
            right_offset: 15.0,
        };
        assert_eq!(table.angle_for(SteeringClass::Left), 110.0);
        assert_eq!(table.angle_for(SteeringClass::Right), 70.0);
        assert!(table.offsets_in_observed_range());

        let wide = SteeringTable::symmetric(90.0, 60.0);
        assert!(!wide.offsets_in_observed_range());
    }
}
