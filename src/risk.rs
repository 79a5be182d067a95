//! Earthquake-risk scoring for a furniture layout.
//!
//! Three rules, each contributing to an additive score:
//! 1. furniture whose fall zone overlaps a bed,
//! 2. tall items standing close to the exit segment,
//! 3. screens in the one-cell band at a bed's head.
//!
//! Every rule hit is recorded as a [`Violation`] naming the offending item,
//! so callers can surface them in logs or tint them in the scene.

use std::fmt;

use anyhow::Result;
use cgmath::{InnerSpace, Point2};

use crate::layout::{Furniture, FurnitureKind, Room};

/// Items at least this many cells tall count as tall for the exit rule.
pub const TALL_ITEM_CELLS: u32 = 5;
/// Tall items closer to the exit segment than this are flagged.
pub const EXIT_CLEARANCE_CELLS: f32 = 2.0;

/// A single rule hit. `subject` is the name of the offending item.
#[derive(Clone, Debug)]
pub struct Violation {
    pub subject: String,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.detail)
    }
}

/// Accumulated score and the violations behind it.
#[derive(Clone, Debug, Default)]
pub struct RiskReport {
    pub score: f32,
    pub violations: Vec<Violation>,
}

impl RiskReport {
    fn add(&mut self, raw: f32, subject: &str, detail: String) {
        self.score += raw;
        self.violations.push(Violation {
            subject: subject.to_string(),
            detail,
        });
    }

    fn absorb(&mut self, other: RiskReport) {
        self.score += other.score;
        self.violations.extend(other.violations);
    }
}

/// Distance from point `p` to the segment `a`-`b`.
pub fn point_to_segment_dist(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let denom = ab.magnitude2();
    if denom == 0.0 {
        return ap.magnitude();
    }
    let t = (ap.dot(ab) / denom).clamp(0.0, 1.0);
    (p - (a + ab * t)).magnitude()
}

/// Rule 1: furniture whose fall zone overlaps a bed. Scores a base point
/// plus a tenth per overlapping cell.
pub fn fall_hazard_onto_beds(items: &[Furniture]) -> RiskReport {
    let mut report = RiskReport::default();
    let beds: Vec<_> = items
        .iter()
        .filter(|f| f.kind == FurnitureKind::Bed)
        .collect();

    for item in items {
        if item.kind == FurnitureKind::Bed {
            continue;
        }
        let zone = match item.fall_zone() {
            Some(zone) => zone,
            None => continue,
        };
        for bed in &beds {
            let overlap = zone.intersection_area(bed.footprint());
            if overlap <= 0 {
                continue;
            }
            report.add(
                1.0 + 0.1 * overlap as f32,
                &item.name,
                format!("fall zone covers {} by {overlap} cells", bed.name),
            );
        }
    }
    report
}

/// Rule 2: tall items standing within [`EXIT_CLEARANCE_CELLS`] of the exit
/// segment. The closer to the exit, the higher the score.
pub fn tall_items_near_exit(room: &Room, items: &[Furniture]) -> RiskReport {
    let mut report = RiskReport::default();

    for item in items {
        if item.height < TALL_ITEM_CELLS {
            continue;
        }
        let dist = point_to_segment_dist(item.center(), room.exit_a, room.exit_b);
        if dist > EXIT_CLEARANCE_CELLS {
            continue;
        }
        report.add(
            1.0 + (EXIT_CLEARANCE_CELLS - dist),
            &item.name,
            format!("{} cells tall, {dist:.2} cells from the exit", item.height),
        );
    }
    report
}

/// Rule 3: TVs and TV stands overlapping the band at a bed's head. Fails
/// when a bed has no pillow side set.
pub fn screens_at_bed_head(items: &[Furniture]) -> Result<RiskReport> {
    let mut report = RiskReport::default();
    let screens: Vec<_> = items
        .iter()
        .filter(|f| matches!(f.kind, FurnitureKind::Tv | FurnitureKind::TvStand))
        .collect();

    for bed in items.iter().filter(|f| f.kind == FurnitureKind::Bed) {
        let head_zone = bed.bed_head_zone()?;
        for screen in &screens {
            let overlap = head_zone.intersection_area(screen.footprint());
            if overlap <= 0 {
                continue;
            }
            report.add(
                1.0 + 0.1 * overlap as f32,
                &screen.name,
                format!("overlaps the head of {} by {overlap} cells", bed.name),
            );
        }
    }
    Ok(report)
}

/// Run all three rules over a layout. The layout is assumed valid, see
/// [`crate::layout::validate_layout`].
pub fn assess(room: &Room, items: &[Furniture]) -> Result<RiskReport> {
    let mut report = fall_hazard_onto_beds(items);
    report.absorb(tall_items_near_exit(room, items));
    report.absorb(screens_at_bed_head(items)?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Direction, sample_room};

    #[test]
    fn segment_distance_handles_clamping_and_degenerate_segments() {
        let a = Point2::new(0.0, 4.0);
        let b = Point2::new(0.0, 6.0);
        // Perpendicular foot inside the segment.
        assert!((point_to_segment_dist(Point2::new(1.5, 5.0), a, b) - 1.5).abs() < 1e-6);
        // Beyond the far endpoint: distance to the endpoint itself.
        assert!((point_to_segment_dist(Point2::new(0.0, 9.0), a, b) - 3.0).abs() < 1e-6);
        // Degenerate segment collapses to a point.
        assert!((point_to_segment_dist(Point2::new(3.0, 4.0), a, a) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn sample_room_flags_the_shelf_twice() {
        let (room, furniture) = sample_room();
        let report = assess(&room, &furniture).unwrap();

        // Fall zone over the bed: 1.0 + 0.1 * 6 cells. Near the exit:
        // 1.0 + (2.0 - 1.5).
        assert!((report.score - 3.1).abs() < 1e-5);
        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().all(|v| v.subject == "shelf"));
    }

    #[test]
    fn screens_clear_of_the_bed_head_score_nothing() {
        let (_, furniture) = sample_room();
        let report = screens_at_bed_head(&furniture).unwrap();
        assert_eq!(report.score, 0.0);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn screen_in_the_head_band_is_flagged() {
        let (_, mut furniture) = sample_room();
        // Move the TV stand into the bed's head band at (9, 3)..(10, 6).
        furniture[2].x = 9;
        furniture[2].y = 3;
        furniture[2].width = 1;
        furniture[2].depth = 2;
        let report = screens_at_bed_head(&furniture).unwrap();
        assert!((report.score - 1.2).abs() < 1e-6);
        assert_eq!(report.violations[0].subject, "tv stand");
    }

    #[test]
    fn bed_without_a_pillow_side_is_an_error() {
        let (room, mut furniture) = sample_room();
        furniture[1].pillow_side = None;
        assert!(assess(&room, &furniture).is_err());
    }

    #[test]
    fn fall_rule_ignores_items_that_stay_put() {
        let (_, mut furniture) = sample_room();
        furniture[0].fall_direction = None;
        let report = fall_hazard_onto_beds(&furniture);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn short_items_near_the_exit_are_fine() {
        let (room, mut furniture) = sample_room();
        furniture[0].height = TALL_ITEM_CELLS - 1;
        furniture[0].fall_direction = Some(Direction::West);
        let report = tall_items_near_exit(&room, &furniture);
        assert!(report.violations.is_empty());
    }
}
