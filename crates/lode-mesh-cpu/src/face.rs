use lode_geom::Vec3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY,
    NegY,
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::PosY, Face::NegY, Face::PosX, Face::NegX, Face::PosZ, Face::NegZ];

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// The two in-plane axes `(u, v)` spanning the face.
    #[inline]
    pub fn tangents(self) -> ((i32, i32, i32), (i32, i32, i32)) {
        match self {
            Face::PosY | Face::NegY => ((1, 0, 0), (0, 0, 1)),
            Face::PosX | Face::NegX => ((0, 0, 1), (0, 1, 0)),
            Face::PosZ | Face::NegZ => ((1, 0, 0), (0, 1, 0)),
        }
    }

    /// Corner signs `(su, sv)` along the tangents, counter-clockwise seen from
    /// outside the face.
    pub fn ring(self) -> [(i32, i32); 4] {
        const UV: [(i32, i32); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];
        const VU: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, 1), (1, -1)];
        let (u, v) = self.tangents();
        let n = self.delta();
        let cross = (u.1 * v.2 - u.2 * v.1, u.2 * v.0 - u.0 * v.2, u.0 * v.1 - u.1 * v.0);
        if cross.0 * n.0 + cross.1 * n.1 + cross.2 * n.2 > 0 { UV } else { VU }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_wind_counter_clockwise_from_outside() {
        for face in Face::ALL {
            let (u, v) = face.tangents();
            let p = |(su, sv): (i32, i32)| {
                let (a, b) = ((su + 1) / 2, (sv + 1) / 2);
                Vec3::new((u.0 * a + v.0 * b) as f32, (u.1 * a + v.1 * b) as f32, (u.2 * a + v.2 * b) as f32)
            };
            let r = face.ring();
            let (e1, e2) = (p(r[1]) - p(r[0]), p(r[2]) - p(r[0]));
            let cross = Vec3::new(e1.y * e2.z - e1.z * e2.y, e1.z * e2.x - e1.x * e2.z, e1.x * e2.y - e1.y * e2.x);
            assert!(cross.dot(face.normal()) > 0.0, "{face:?}");
        }
    }
}
