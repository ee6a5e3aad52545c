//! Axis-aligned plane subdivision
//!
//! The water surfaces are drawn as grids of small quads so per-vertex
//! lighting picks up the spotlight cones. Each helper takes two opposite
//! corners of a rectangle lying in one of the coordinate planes.

use glam::Vec3;

use crate::math3d::lerp_pinned;

/// An (N+1)x(N+1) lattice of points on a plane
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    divisions: usize,
    points: Vec<Vec3>,
}

impl Grid {
    fn build(divisions: usize, point: impl Fn(usize, usize) -> Vec3) -> Self {
        assert!(divisions >= 1, "a grid needs at least one division");
        let side = divisions + 1;
        let mut points = Vec::with_capacity(side * side);
        for i in 0..side {
            for j in 0..side {
                points.push(point(i, j));
            }
        }
        Self { divisions, points }
    }

    /// Point at first-axis index `i`, second-axis index `j`
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> Vec3 {
        self.points[i * (self.divisions + 1) + j]
    }

    /// The four corners in index order (0,0), (N,0), (N,N), (0,N)
    pub fn corners(&self) -> [Vec3; 4] {
        let n = self.divisions;
        [self.at(0, 0), self.at(n, 0), self.at(n, n), self.at(0, n)]
    }

    /// The N*N quads, each `[p(i,j), p(i+1,j), p(i+1,j+1), p(i,j+1)]`
    pub fn quads(&self) -> impl Iterator<Item = [Vec3; 4]> + '_ {
        let n = self.divisions;
        (0..n).flat_map(move |i| {
            (0..n).map(move |j| {
                [
                    self.at(i, j),
                    self.at(i + 1, j),
                    self.at(i + 1, j + 1),
                    self.at(i, j + 1),
                ]
            })
        })
    }
}

/// Grid in a plane of constant z: i walks x, j walks y
pub fn subdivide_xy(a: Vec3, b: Vec3, divisions: usize) -> Grid {
    Grid::build(divisions, |i, j| {
        Vec3::new(
            lerp_pinned(a.x, b.x, i, divisions),
            lerp_pinned(a.y, b.y, j, divisions),
            a.z,
        )
    })
}

/// Grid in a plane of constant x: i walks y, j walks z
pub fn subdivide_yz(a: Vec3, b: Vec3, divisions: usize) -> Grid {
    Grid::build(divisions, |i, j| {
        Vec3::new(
            a.x,
            lerp_pinned(a.y, b.y, i, divisions),
            lerp_pinned(a.z, b.z, j, divisions),
        )
    })
}

/// Grid in a plane of constant y: i walks x, j walks z
pub fn subdivide_xz(a: Vec3, b: Vec3, divisions: usize) -> Grid {
    Grid::build(divisions, |i, j| {
        Vec3::new(
            lerp_pinned(a.x, b.x, i, divisions),
            a.y,
            lerp_pinned(a.z, b.z, j, divisions),
        )
    })
}
