//! Room and furniture layout on a cell grid.
//!
//! A [`Room`] is a `width` x `height` grid of floor cells (origin at the
//! south-west corner, x growing east, y growing north) with an exit segment
//! on its boundary. [`Furniture`] occupies an axis-aligned rectangle of
//! cells and has a height in cells. [`validate_layout`] checks that every
//! item fits inside the room and that no two items share a cell.

use std::collections::HashMap;

use anyhow::{Result, bail};
use cgmath::Point2;

/// Compass direction on the grid. North is +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FurnitureKind {
    Bed,
    Tv,
    TvStand,
    Other,
}

/// Half-open cell rectangle `[x0, x1) x [y0, y1)`. Derived zones may extend
/// past the room boundary, hence the signed coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    /// Overlap with `other` in cells, zero when disjoint.
    pub fn intersection_area(self, other: Rect) -> i32 {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1);
        let y1 = self.y1.min(other.y1);
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        (x1 - x0) * (y1 - y0)
    }
}

/// A room: grid dimensions and the exit segment, in cell coordinates.
#[derive(Clone, Debug)]
pub struct Room {
    pub width: u32,
    pub height: u32,
    pub exit_a: Point2<f32>,
    pub exit_b: Point2<f32>,
}

impl Room {
    /// Check that `item`'s footprint lies inside the room.
    pub fn check_inside(&self, item: &Furniture) -> Result<()> {
        if item.width == 0 || item.depth == 0 {
            bail!(
                "{}: degenerate size {}x{}",
                item.name,
                item.width,
                item.depth
            );
        }
        if item.x + item.width > self.width || item.y + item.depth > self.height {
            bail!(
                "{}: sticks out of the room (x={}..{}, y={}..{})",
                item.name,
                item.x,
                item.x + item.width - 1,
                item.y,
                item.y + item.depth - 1
            );
        }
        Ok(())
    }
}

/// A piece of furniture: a `width` x `depth` footprint at cell `(x, y)`,
/// `height` cells tall.
#[derive(Clone, Debug)]
pub struct Furniture {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub depth: u32,
    pub height: u32,
    pub kind: FurnitureKind,
    /// Which way the item topples in a quake; `None` means it stays put.
    pub fall_direction: Option<Direction>,
    /// For beds, the side the pillow is on.
    pub pillow_side: Option<Direction>,
}

impl Furniture {
    pub fn footprint(&self) -> Rect {
        Rect {
            x0: self.x as i32,
            y0: self.y as i32,
            x1: (self.x + self.width) as i32,
            y1: (self.y + self.depth) as i32,
        }
    }

    /// Center of the footprint in cell coordinates.
    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.depth as f32 / 2.0,
        )
    }

    /// The band of cells the item would cover if it toppled over: its
    /// footprint extended by `height` cells in the fall direction.
    pub fn fall_zone(&self) -> Option<Rect> {
        let Rect { x0, y0, x1, y1 } = self.footprint();
        let h = self.height as i32;
        let zone = match self.fall_direction? {
            Direction::North => Rect {
                x0,
                y0: y1,
                x1,
                y1: y1 + h,
            },
            Direction::East => Rect {
                x0: x1,
                y0,
                x1: x1 + h,
                y1,
            },
            Direction::South => Rect {
                x0,
                y0: y0 - h,
                x1,
                y1: y0,
            },
            Direction::West => Rect {
                x0: x0 - h,
                y0,
                x1: x0,
                y1,
            },
        };
        Some(zone)
    }

    /// The one-cell band on the pillow side of a bed.
    pub fn bed_head_zone(&self) -> Result<Rect> {
        let Rect { x0, y0, x1, y1 } = self.footprint();
        let side = match self.pillow_side {
            Some(side) => side,
            None => bail!("{}: a bed needs its pillow side set", self.name),
        };
        Ok(match side {
            Direction::North => Rect {
                x0,
                y0: y1,
                x1,
                y1: y1 + 1,
            },
            Direction::East => Rect {
                x0: x1,
                y0,
                x1: x1 + 1,
                y1,
            },
            Direction::South => Rect {
                x0,
                y0: y0 - 1,
                x1,
                y1: y0,
            },
            Direction::West => Rect {
                x0: x0 - 1,
                y0,
                x1: x0,
                y1,
            },
        })
    }
}

/// Check every item against the room bounds and against each other: no item
/// may stick out and no two items may occupy the same cell.
pub fn validate_layout(room: &Room, items: &[Furniture]) -> Result<()> {
    let mut occupied: HashMap<(u32, u32), &str> = HashMap::new();

    for item in items {
        room.check_inside(item)?;
        for x in item.x..item.x + item.width {
            for y in item.y..item.y + item.depth {
                if let Some(other) = occupied.insert((x, y), &item.name) {
                    bail!(
                        "cell ({x}, {y}) is occupied by both {other} and {}",
                        item.name
                    );
                }
            }
        }
    }
    Ok(())
}

/// A small bedroom used by the binary and the tests: a tall shelf near the
/// exit, a bed in its fall path and a TV stand along the south wall.
pub fn sample_room() -> (Room, Vec<Furniture>) {
    let room = Room {
        width: 10,
        height: 10,
        exit_a: Point2::new(0.0, 4.0),
        exit_b: Point2::new(0.0, 6.0),
    };
    let furniture = vec![
        Furniture {
            name: "shelf".to_string(),
            x: 1,
            y: 4,
            width: 1,
            depth: 2,
            height: 6,
            kind: FurnitureKind::Other,
            fall_direction: Some(Direction::East),
            pillow_side: None,
        },
        Furniture {
            name: "bed".to_string(),
            x: 5,
            y: 3,
            width: 4,
            depth: 3,
            height: 1,
            kind: FurnitureKind::Bed,
            fall_direction: None,
            pillow_side: Some(Direction::East),
        },
        Furniture {
            name: "tv stand".to_string(),
            x: 5,
            y: 0,
            width: 2,
            depth: 1,
            height: 2,
            kind: FurnitureKind::TvStand,
            fall_direction: None,
            pillow_side: None,
        },
    ];
    (room, furniture)
}
