use std::ops::Mul;

/// Determinants with a smaller magnitude are treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// Row-major 4x4 matrix acting on column vectors, i.e. `p' = M * p`.
/// The translation part lives in the last column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4d {
    pub data: [[f64; 4]; 4],
}

impl Matrix4d {
    pub fn new(data: [[f64; 4]; 4]) -> Self {
        Self { data }
    }

    pub fn identity() -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn from_translation(t: Vector3d) -> Self {
        let mut out = Self::identity();
        out.data[0][3] = t.x;
        out.data[1][3] = t.y;
        out.data[2][3] = t.z;
        out
    }

    pub fn from_scale(s: Vector3d) -> Self {
        let mut out = Self::identity();
        out.data[0][0] = s.x;
        out.data[1][1] = s.y;
        out.data[2][2] = s.z;
        out
    }

    /// Builds a matrix from the glTF layout, which stores columns first.
    pub fn from_column_major(matrix: &[[f32; 4]; 4]) -> Self {
        let mut data = [[0.0f64; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                data[row][col] = matrix[col][row] as f64;
            }
        }
        Self { data }
    }

    /// Same as [`Matrix4d::from_column_major`] for a flat array of 16 values.
    pub fn from_column_major_slice(values: &[f32; 16]) -> Self {
        let mut data = [[0.0f64; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                data[row][col] = values[col * 4 + row] as f64;
            }
        }
        Self { data }
    }

    /// Flattens the matrix into the glTF column-major layout.
    pub fn to_column_major(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = self.data[row][col] as f32;
            }
        }
        out
    }

    /// Homogeneous point transform. A projective row is honored by dividing
    /// through `w` unless it vanishes.
    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let d = &self.data;
        let mut out = [0.0; 3];
        for (row, o) in out.iter_mut().enumerate() {
            *o = d[row][0] * p[0] + d[row][1] * p[1] + d[row][2] * p[2] + d[row][3];
        }
        let w = d[3][0] * p[0] + d[3][1] * p[1] + d[3][2] * p[2] + d[3][3];
        if w != 1.0 && w.abs() > SINGULAR_EPSILON {
            for o in out.iter_mut() {
                *o /= w;
            }
        }
        out
    }

    /// Applies the upper 3x3 linear part only (no translation).
    pub fn transform_vector(&self, v: [f64; 3]) -> [f64; 3] {
        let d = &self.data;
        [
            d[0][0] * v[0] + d[0][1] * v[1] + d[0][2] * v[2],
            d[1][0] * v[0] + d[1][1] * v[1] + d[1][2] * v[2],
            d[2][0] * v[0] + d[2][1] * v[1] + d[2][2] * v[2],
        ]
    }

    /// Determinant of the upper 3x3 linear part. A negative value means the
    /// transform mirrors geometry and flips triangle winding.
    pub fn linear_determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse-transpose of the upper 3x3, used to carry normals through
    /// non-uniform scale. `None` when the linear part is singular.
    pub fn normal_matrix(&self) -> Option<NormalMatrix> {
        let det = self.linear_determinant();
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let m = &self.data;
        // The inverse-transpose equals the cofactor matrix divided by det.
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        let inv_det = 1.0 / det;
        let data = [
            [cof(1, 2, 1, 2) * inv_det, -cof(1, 2, 0, 2) * inv_det, cof(1, 2, 0, 1) * inv_det],
            [-cof(0, 2, 1, 2) * inv_det, cof(0, 2, 0, 2) * inv_det, -cof(0, 2, 0, 1) * inv_det],
            [cof(0, 1, 1, 2) * inv_det, -cof(0, 1, 0, 2) * inv_det, cof(0, 1, 0, 1) * inv_det],
        ];
        Some(NormalMatrix { data })
    }
}

impl Default for Matrix4d {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix4d {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        &self * &other
    }
}

impl Mul for &Matrix4d {
    type Output = Matrix4d;

    fn mul(self, other: Self) -> Self::Output {
        let mut result = Matrix4d::default();
        for i in 0..4 {
            for j in 0..4 {
                result.data[i][j] = self.data[i][0] * other.data[0][j]
                    + self.data[i][1] * other.data[1][j]
                    + self.data[i][2] * other.data[2][j]
                    + self.data[i][3] * other.data[3][j];
            }
        }
        result
    }
}

/// Inverse-transpose of a linear 3x3 part, see [`Matrix4d::normal_matrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalMatrix {
    data: [[f64; 3]; 3],
}

impl NormalMatrix {
    /// Transforms a direction and re-normalizes it. Zero-length input stays zero.
    pub fn transform_normal(&self, n: [f64; 3]) -> [f64; 3] {
        let d = &self.data;
        let out = [
            d[0][0] * n[0] + d[0][1] * n[1] + d[0][2] * n[2],
            d[1][0] * n[0] + d[1][1] * n[1] + d[1][2] * n[2],
            d[2][0] * n[0] + d[2][1] * n[1] + d[2][2] * n[2],
        ];
        normalize(out)
    }
}

pub(crate) fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= SINGULAR_EPSILON {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaterniond {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaterniond {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle` radians around a (not necessarily unit) axis.
    pub fn from_axis_angle(axis: Vector3d, angle: f64) -> Self {
        let len = (axis.x * axis.x + axis.y * axis.y + axis.z * axis.z).sqrt();
        if len <= SINGULAR_EPSILON {
            return Self::identity();
        }
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(c, axis.x / len * s, axis.y / len * s, axis.z / len * s)
    }

    pub fn to_matrix4(&self) -> Matrix4d {
        // glTF does not require unit quaternions on disk.
        let norm = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        let (w, x, y, z) = if norm > SINGULAR_EPSILON {
            (self.w / norm, self.x / norm, self.y / norm, self.z / norm)
        } else {
            (1.0, 0.0, 0.0, 0.0)
        };

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let xw = x * w;
        let yz = y * z;
        let yw = y * w;
        let zw = z * w;

        Matrix4d {
            data: [
                [1.0 - 2.0 * (yy + zz), 2.0 * (xy - zw), 2.0 * (xz + yw), 0.0],
                [2.0 * (xy + zw), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - xw), 0.0],
                [2.0 * (xz - yw), 2.0 * (yz + xw), 1.0 - 2.0 * (xx + yy), 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Default for Quaterniond {
    fn default() -> Self {
        Self::identity()
    }
}

/// Stores one or more of a translation, rotation and scale, or a full
/// transformation matrix, exactly as a glTF node does.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrsMatrix {
    matrix: Option<Matrix4d>,
    translation: Option<Vector3d>,
    rotation: Option<Quaterniond>,
    scale: Option<Vector3d>,
}

impl TrsMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matrix(matrix: Matrix4d) -> Self {
        let mut out = Self::new();
        out.set_matrix(matrix);
        out
    }

    pub fn set_matrix(&mut self, matrix: Matrix4d) -> &mut Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn matrix(&self) -> Option<&Matrix4d> {
        self.matrix.as_ref()
    }

    pub fn set_translation(&mut self, translation: Vector3d) -> &mut Self {
        self.translation = Some(translation);
        self
    }

    pub fn translation(&self) -> Option<&Vector3d> {
        self.translation.as_ref()
    }

    pub fn set_rotation(&mut self, rotation: Quaterniond) -> &mut Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn rotation(&self) -> Option<&Quaterniond> {
        self.rotation.as_ref()
    }

    pub fn set_scale(&mut self, scale: Vector3d) -> &mut Self {
        self.scale = Some(scale);
        self
    }

    pub fn scale(&self) -> Option<&Vector3d> {
        self.scale.as_ref()
    }

    // Returns the matrix if it has been set. Otherwise composes T * R * S
    // from whichever components are present.
    pub fn compute_transformation_matrix(&self) -> Matrix4d {
        if let Some(matrix) = &self.matrix {
            return *matrix;
        }

        let translation = self.translation
            .map(Matrix4d::from_translation)
            .unwrap_or_default();
        let rotation = self.rotation
            .map(|r| r.to_matrix4())
            .unwrap_or_default();
        let scale = self.scale
            .map(Matrix4d::from_scale)
            .unwrap_or_default();

        translation * rotation * scale
    }

    // Returns a boolean indicating whether any of the transforms have been set.
    pub fn transform_set(&self) -> bool {
        self.matrix.is_some() || self.translation.is_some() || self.rotation.is_some() || self.scale.is_some()
    }
}
