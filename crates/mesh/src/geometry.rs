use cgmath::InnerSpace;

pub type Vector3 = cgmath::Vector3<f64>;

// We rely on Vector3 being repr(c).
static_assertions::assert_eq_size!(Vector3, [f64; 3]);
static_assertions::assert_eq_align!(Vector3, f64);

/// One of the three coordinate axes.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    /// Returns the (unnormalized) normal following the p0 -> p1 -> p2 winding.
    pub fn normal(&self) -> Vector3 {
        (self.p1 - self.p0).cross(self.p2 - self.p0)
    }

    pub fn area(&self) -> f64 {
        0.5 * self.normal().magnitude()
    }

    pub fn centroid(&self) -> Vector3 {
        (self.p0 + self.p1 + self.p2) / 3.0
    }

    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::from_point(self.p0);
        b.expand_point(self.p1);
        b.expand_point(self.p2);
        b
    }
}

impl std::default::Default for Triangle {
    fn default() -> Self {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        Self {
            p0: origin,
            p1: origin,
            p2: origin,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Bounds {
    pub min: Vector3,
    pub max: Vector3,
}

impl Bounds {
    pub fn from_point(p: Vector3) -> Self {
        Self { min: p, max: p }
    }

    /// Computes the bounds of a set of points, or `None` if there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vector3>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Bounds::from_point(*iter.next()?);
        for p in iter {
            bounds.expand_point(*p);
        }
        Some(bounds)
    }

    pub fn expand_point(&mut self, p: Vector3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn expand(&mut self, other: &Bounds) {
        self.expand_point(other.min);
        self.expand_point(other.max);
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// The coordinate halfway between min and max along `axis`.
    pub fn midpoint(&self, axis: Axis) -> f64 {
        0.5 * (self.min[axis.index()] + self.max[axis.index()])
    }

    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        self.extent().magnitude()
    }

    pub fn longest_axis(&self) -> Axis {
        let e = self.extent();
        if e.x >= e.y && e.x >= e.z {
            Axis::X
        } else if e.y >= e.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    pub fn contains(&self, p: Vector3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}
