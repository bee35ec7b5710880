use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Side length of the resolution-independent coordinate space.
pub const COORD_SCALE: i32 = 1000;

/// A polygon corner as reported by the OCR engine, in source pixels.
///
/// The engine omits coordinates that are zero, so both default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in the 0–1000 normalized space, serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct BBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BBox {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Builds a box from two arbitrary corners, ordering and clamping them.
    pub fn from_corners(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
        .clamped()
    }

    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y1 - self.y0).max(0)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Inclusive containment: `other` lies within `self`, edges allowed to touch.
    pub fn contains(&self, other: &Self) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }

    /// Inclusive overlap: boxes sharing only an edge count as intersecting.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.x1 < other.x0 || self.x0 > other.x1 || self.y1 < other.y0 || self.y0 > other.y1)
    }

    pub fn clamped(&self) -> Self {
        let clamp = |v: i32| v.clamp(0, COORD_SCALE);
        let x0 = clamp(self.x0);
        let y0 = clamp(self.y0);
        Self {
            x0,
            y0,
            x1: clamp(self.x1).max(x0),
            y1: clamp(self.y1).max(y0),
        }
    }

    pub fn is_valid(&self) -> bool {
        0 <= self.x0
            && self.x0 <= self.x1
            && self.x1 <= COORD_SCALE
            && 0 <= self.y0
            && self.y0 <= self.y1
            && self.y1 <= COORD_SCALE
    }
}

impl TryFrom<[i32; 4]> for BBox {
    type Error = Error;

    fn try_from(value: [i32; 4]) -> Result<Self> {
        let bbox = BBox::new(value[0], value[1], value[2], value[3]);
        if bbox.x0 > bbox.x1 || bbox.y0 > bbox.y1 {
            return Err(Error::validation(format!("inverted bbox {value:?}")));
        }
        Ok(bbox)
    }
}

impl From<BBox> for [i32; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.x0, bbox.y0, bbox.x1, bbox.y1]
    }
}

/// Scales corners 0 and 2 of an OCR quad into the normalized space.
///
/// Coordinates truncate toward zero. Taking min/max of the two corners keeps the
/// result valid when the engine reports a slightly rotated quad.
pub fn normalize_bbox(vertices: &[Vertex], width: u32, height: u32) -> Result<BBox> {
    if width == 0 || height == 0 {
        return Err(Error::validation(format!(
            "image dimensions must be non-zero, got {width}x{height}"
        )));
    }
    if vertices.len() < 4 {
        return Err(Error::validation(format!(
            "bounding polygon needs 4 vertices, got {}",
            vertices.len()
        )));
    }

    let scale_x = |x: f64| (x * f64::from(COORD_SCALE) / f64::from(width)) as i32;
    let scale_y = |y: f64| (y * f64::from(COORD_SCALE) / f64::from(height)) as i32;

    let (a, b) = (vertices[0], vertices[2]);
    Ok(BBox::from_corners(
        scale_x(a.x),
        scale_y(a.y),
        scale_x(b.x),
        scale_y(b.y),
    ))
}

/// Rectangle spanning the horizontal gap between two boxes on one row.
///
/// The vertical extent is the union of both. When the boxes overlap the result
/// collapses to zero width at `right.x0`.
pub fn gap_between(left: &BBox, right: &BBox) -> BBox {
    BBox {
        x0: left.x1.min(right.x0),
        y0: left.y0.min(right.y0),
        x1: right.x0,
        y1: left.y1.max(right.y1),
    }
    .clamped()
}

/// First-match sequential line clustering over box top edges.
///
/// Boxes are scanned in input order against an ordered list of representative
/// y values. Each y0 joins the *first* representative within `tolerance`
/// (inclusive), not the nearest; otherwise it becomes a new representative.
/// Representatives never move, so one line can span up to twice `tolerance`,
/// and the grouping depends on input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineGroups {
    representatives: Vec<i32>,
    assignments: Vec<i32>,
}

impl LineGroups {
    pub fn build<I>(ys: I, tolerance: i32) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let mut groups = LineGroups::default();
        for y in ys {
            let representative = match groups.representative_for(y, tolerance) {
                Some(rep) => rep,
                None => {
                    groups.representatives.push(y);
                    y
                }
            };
            groups.assignments.push(representative);
        }
        groups
    }

    pub fn from_boxes<'a, I>(boxes: I, tolerance: i32) -> Self
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        Self::build(boxes.into_iter().map(|bbox| bbox.y0), tolerance)
    }

    fn representative_for(&self, y: i32, tolerance: i32) -> Option<i32> {
        self.representatives
            .iter()
            .copied()
            .find(|rep| (rep - y).abs() <= tolerance)
    }

    /// Representative y of the box at `index` in the scanned order.
    pub fn representative(&self, index: usize) -> i32 {
        self.assignments[index]
    }

    /// Representatives in the order they were registered.
    pub fn representatives(&self) -> &[i32] {
        &self.representatives
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Box indices per line, lines in representative registration order.
    pub fn lines(&self) -> Vec<Vec<usize>> {
        self.representatives
            .iter()
            .map(|rep| {
                self.assignments
                    .iter()
                    .enumerate()
                    .filter(|(_, assigned)| *assigned == rep)
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quad(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Vertex> {
        vec![
            Vertex::new(x0, y0),
            Vertex::new(x1, y0),
            Vertex::new(x1, y1),
            Vertex::new(x0, y1),
        ]
    }

    #[test]
    fn normalizes_into_thousand_space() {
        let bbox = normalize_bbox(&quad(100.0, 50.0, 300.0, 150.0), 2000, 1000).unwrap();
        assert_eq!(bbox, BBox::new(50, 50, 150, 150));
    }

    #[test]
    fn normalization_truncates_toward_zero() {
        let bbox = normalize_bbox(&quad(1.0, 1.0, 2.9, 2.9), 3, 3).unwrap();
        assert_eq!(bbox, BBox::new(333, 333, 966, 966));
    }

    #[test]
    fn normalization_orders_rotated_corners() {
        let vertices = vec![
            Vertex::new(300.0, 150.0),
            Vertex::new(100.0, 150.0),
            Vertex::new(100.0, 50.0),
            Vertex::new(300.0, 50.0),
        ];
        let bbox = normalize_bbox(&vertices, 1000, 1000).unwrap();
        assert_eq!(bbox, BBox::new(100, 50, 300, 150));
    }

    #[test]
    fn normalization_clamps_out_of_image_points() {
        let bbox = normalize_bbox(&quad(-5.0, -5.0, 1200.0, 900.0), 1000, 1000).unwrap();
        assert_eq!(bbox, BBox::new(0, 0, 1000, 900));
        assert!(bbox.is_valid());
    }

    #[test]
    fn normalization_rejects_bad_input() {
        assert!(matches!(
            normalize_bbox(&quad(0.0, 0.0, 1.0, 1.0), 0, 100),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            normalize_bbox(&[Vertex::new(0.0, 0.0)], 100, 100),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn line_groups_use_first_match_not_nearest() {
        // 14 is within 5 of both 10 and 18; the earlier representative wins.
        let groups = LineGroups::build([10, 18, 14], 5);
        assert_eq!(groups.representatives(), &[10, 18]);
        assert_eq!(groups.representative(2), 10);
    }

    #[test]
    fn line_groups_do_not_move_representatives() {
        let groups = LineGroups::build([100, 104, 108, 112], 5);
        assert_eq!(groups.representatives(), &[100, 108]);
        assert_eq!(groups.representative(1), 100);
        assert_eq!(groups.representative(3), 108);
    }

    #[test]
    fn one_line_can_span_twice_the_tolerance() {
        let groups = LineGroups::build([100, 95, 105], 5);
        assert_eq!(groups.representatives(), &[100]);
        assert_eq!(groups.lines(), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn line_groups_depend_on_scan_order() {
        let forward = LineGroups::build([0, 5, 10], 5);
        let backward = LineGroups::build([10, 5, 0], 5);
        assert_eq!(forward.lines(), vec![vec![0, 1], vec![2]]);
        assert_eq!(backward.lines(), vec![vec![0, 1], vec![2]]);
        assert_eq!(forward.representatives(), &[0, 10]);
        assert_eq!(backward.representatives(), &[10, 0]);
    }

    #[test]
    fn gap_between_spans_neighbors() {
        let left = BBox::new(10, 100, 40, 120);
        let right = BBox::new(90, 102, 130, 124);
        assert_eq!(gap_between(&left, &right), BBox::new(40, 100, 90, 124));

        let overlapping = BBox::new(30, 100, 60, 120);
        let gap = gap_between(&left, &overlapping);
        assert_eq!((gap.x0, gap.x1), (30, 30));
    }

    #[test]
    fn bbox_serializes_as_array() {
        let json = serde_json::to_string(&BBox::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        assert!(serde_json::from_str::<BBox>("[5,2,3,4]").is_err());
    }
}
