use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            if !(point.x.is_finite() && point.y.is_finite()) {
                return None;
            }
            min = min.min(*point);
            max = max.max(*point);
        }

        if !(min.x.is_finite() && max.x.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn width(self) -> f32 {
        self.half_extent * 2.0
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    /// Squared gap between two squares, zero when they overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }

    fn quadrant(self, index: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sx = if index & 1 == 0 { -quarter } else { quarter };
        let sy = if index & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sx, sy),
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }
}

/// Barnes-Hut cell carrying the aggregate charge and the largest collision
/// radius of the points below it.
pub(super) struct Quad {
    pub(super) bounds: Square,
    pub(super) charge: f32,
    pub(super) charge_center: Vec2,
    pub(super) max_radius: f32,
    pub(super) points: Vec<usize>,
    pub(super) children: [Option<Box<Quad>>; 4],
}

impl Quad {
    pub(super) fn build(positions: &[Vec2], charges: &[f32], radii: &[f32]) -> Option<Self> {
        let bounds = Square::enclosing(positions)?;
        let points = (0..positions.len()).collect();
        Some(Self::build_cell(bounds, points, positions, charges, radii, 0))
    }

    fn build_cell(
        bounds: Square,
        points: Vec<usize>,
        positions: &[Vec2],
        charges: &[f32],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let mut charge = 0.0;
        let mut weight = 0.0;
        let mut weighted = Vec2::ZERO;
        let mut centroid = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &points {
            let point_charge = charges.get(index).copied().unwrap_or(0.0);
            charge += point_charge;
            weight += point_charge.abs();
            weighted += positions[index] * point_charge.abs();
            centroid += positions[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }

        let charge_center = if weight > 0.0 {
            weighted / weight
        } else if !points.is_empty() {
            centroid / points.len() as f32
        } else {
            bounds.center
        };

        let mut cell = Self {
            bounds,
            charge,
            charge_center,
            max_radius,
            points,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.points.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.points {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }

        // Coincident points cannot be split further.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            cell.children[quadrant] = Some(Box::new(Self::build_cell(
                bounds.quadrant(quadrant),
                bucket,
                positions,
                charges,
                radii,
                depth + 1,
            )));
        }
        cell.points.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &Quad> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}
