/// Parametric tessellation for curved primitives.
///
/// Curved inputs are sampled into polylines or face meshes before they enter
/// a primitive buffer. The segment counts below match the visual density the
/// viewer expects; they are constants rather than caller knobs.
use std::f64::consts::PI;

/// Degrees of arc per polyline segment; a full circle becomes 120 segments.
pub const ARC_DEGREES_PER_SEGMENT: f64 = 3.0;
/// Latitude/longitude bands for sphere tessellation.
pub const SPHERE_RESOLUTION: usize = 50;
/// Ring segments for cylinder tessellation.
pub const CYLINDER_RESOLUTION: usize = 50;
/// Ring segments for cone tessellation.
pub const CONE_RESOLUTION: usize = 24;

pub(crate) fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn scale(v: [f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn length(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub(crate) fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = length(v);
    if len == 0.0 {
        return [0.0, 0.0, 0.0];
    }
    scale(v, 1.0 / len)
}

/// A unit vector perpendicular to `v`, picked against the least-aligned
/// world axis for stability.
pub(crate) fn any_perpendicular(v: [f64; 3]) -> [f64; 3] {
    let axis = if v[0].abs() <= v[1].abs() && v[0].abs() <= v[2].abs() {
        [1.0, 0.0, 0.0]
    } else if v[1].abs() <= v[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    normalize(cross(v, axis))
}

/// Sample an arc lying on the plane spanned by `x_axis` and `normal x x_axis`
/// around `center`, from angle `a1` to `a2` (radians, counter-clockwise).
pub fn arc_points(
    center: [f64; 3],
    normal: [f64; 3],
    x_axis: [f64; 3],
    radius: f64,
    a1: f64,
    a2: f64,
) -> Vec<[f64; 3]> {
    let x = normalize(x_axis);
    let y = normalize(cross(normalize(normal), x));
    let sweep = if a2 > a1 { a2 - a1 } else { a2 + 2.0 * PI - a1 };
    let segments = ((sweep.to_degrees() / ARC_DEGREES_PER_SEGMENT) as usize).max(2);

    (0..=segments)
        .map(|i| {
            let t = a1 + sweep * (i as f64) / (segments as f64);
            add(
                center,
                add(scale(x, radius * t.cos()), scale(y, radius * t.sin())),
            )
        })
        .collect()
}

/// UV-sphere tessellation: quad bands between the poles, triangle fans at
/// the caps.
pub fn sphere_mesh(center: [f64; 3], radius: f64) -> (Vec<[f64; 3]>, Vec<Vec<u32>>) {
    let res = SPHERE_RESOLUTION;
    let mut points = Vec::new();
    let mut faces = Vec::new();

    // res+1 rings of res points each; first and last rings degenerate to
    // the poles but keep the indexing regular.
    for i in 0..=res {
        let phi = PI * (i as f64) / (res as f64);
        for j in 0..res {
            let theta = 2.0 * PI * (j as f64) / (res as f64);
            points.push(add(
                center,
                [
                    radius * phi.sin() * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                ],
            ));
        }
    }

    let idx = |ring: usize, seg: usize| (ring * res + seg % res) as u32;
    for i in 0..res {
        for j in 0..res {
            if i == 0 {
                faces.push(vec![idx(0, j), idx(1, j), idx(1, j + 1)]);
            } else if i == res - 1 {
                faces.push(vec![idx(i, j), idx(i + 1, j), idx(i, j + 1)]);
            } else {
                faces.push(vec![idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
    }

    (points, faces)
}

/// Cylinder tessellation from a base center along `axis`: side quads plus
/// optional cap fans.
pub fn cylinder_mesh(
    base: [f64; 3],
    axis: [f64; 3],
    radius: f64,
    height: f64,
    cap: bool,
) -> (Vec<[f64; 3]>, Vec<Vec<u32>>) {
    let res = CYLINDER_RESOLUTION;
    let dir = normalize(axis);
    let x = any_perpendicular(dir);
    let y = cross(dir, x);
    let top = add(base, scale(dir, height));

    let mut points = Vec::new();
    for ring_center in [base, top] {
        for j in 0..res {
            let theta = 2.0 * PI * (j as f64) / (res as f64);
            points.push(add(
                ring_center,
                add(scale(x, radius * theta.cos()), scale(y, radius * theta.sin())),
            ));
        }
    }

    let mut faces = Vec::new();
    for j in 0..res {
        let next = (j + 1) % res;
        faces.push(vec![
            j as u32,
            next as u32,
            (res + next) as u32,
            (res + j) as u32,
        ]);
    }

    if cap {
        points.push(base);
        points.push(top);
        let base_center = (2 * res) as u32;
        let top_center = base_center + 1;
        for j in 0..res {
            let next = (j + 1) % res;
            faces.push(vec![base_center, next as u32, j as u32]);
            faces.push(vec![top_center, (res + j) as u32, (res + next) as u32]);
        }
    }

    (points, faces)
}

/// Cone tessellation from an apex along `axis`. The base ring sits at the
/// end of the axis with `radius = |axis| * tan(angle)`.
pub fn cone_mesh(
    vertex: [f64; 3],
    axis: [f64; 3],
    angle: f64,
    cap: bool,
) -> (Vec<[f64; 3]>, Vec<Vec<u32>>) {
    let res = CONE_RESOLUTION;
    let height = length(axis);
    let radius = height * angle.tan();
    let dir = normalize(axis);
    let x = any_perpendicular(dir);
    let y = cross(dir, x);
    let base = add(vertex, axis);

    let mut points = vec![vertex];
    for j in 0..res {
        let theta = 2.0 * PI * (j as f64) / (res as f64);
        points.push(add(
            base,
            add(scale(x, radius * theta.cos()), scale(y, radius * theta.sin())),
        ));
    }

    let mut faces = Vec::new();
    for j in 0..res {
        let next = (j + 1) % res;
        faces.push(vec![0, (1 + j) as u32, (1 + next) as u32]);
    }

    if cap {
        points.push(base);
        let center = (1 + res) as u32;
        for j in 0..res {
            let next = (j + 1) % res;
            faces.push(vec![center, (1 + next) as u32, (1 + j) as u32]);
        }
    }

    (points, faces)
}
