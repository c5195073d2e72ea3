//! Triangle meshes as handed to the scene builder.
//!
//! A mesh owns shared vertex attributes and a single material. Emitter meshes
//! additionally carry an area table so points can be sampled uniformly over
//! their surface.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_math::{Aabb, Mat4, Mat4Ext, Ray, Vec2, Vec3};

use crate::cdf::DiscreteCdf;
use crate::error::SceneError;
use crate::hittable::{HitCache, HitRecord};
use crate::material::Material;
use crate::triangle::square_to_uniform_triangle;

/// A mesh consisting of vertex positions, optional normals and UVs, and
/// triangle indices.
///
/// Triangles wound counter-clockwise (seen from outside) face outward.
#[derive(Clone)]
pub struct Mesh {
    /// Name used in log and error messages
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - the geometric normal is used without them)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle vertex indices
    pub indices: Vec<[u32; 3]>,

    pub material: Arc<dyn Material>,

    /// Relative probability of picking this mesh when it is an emitter
    pub sampling_weight: f32,

    area_cdf: DiscreteCdf,
    area: f32,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: None,
            uvs: None,
            indices,
            material,
            sampling_weight: 1.0,
            area_cdf: DiscreteCdf::with_capacity(0),
            area: 0.0,
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_sampling_weight(mut self, weight: f32) -> Self {
        self.sampling_weight = weight;
        self
    }

    /// Parallelogram spanned by `u` and `v` from `corner`. Faces along `u × v`.
    pub fn quad(
        name: impl Into<String>,
        corner: Vec3,
        u: Vec3,
        v: Vec3,
        material: Arc<dyn Material>,
    ) -> Self {
        let normal = u.cross(v).normalize_or_zero();
        Self::new(
            name,
            vec![corner, corner + u, corner + u + v, corner + v],
            vec![[0, 1, 2], [0, 2, 3]],
            material,
        )
        .with_normals(vec![normal; 4])
        .with_uvs(vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y])
    }

    /// Axis-aligned box between two corners, faces pointing outward.
    pub fn cuboid(name: impl Into<String>, a: Vec3, b: Vec3, material: Arc<dyn Material>) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        let d = max - min;
        let dx = Vec3::new(d.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, d.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, d.z);

        let faces = [
            (Vec3::new(max.x, min.y, min.z), dy, dz), // +x
            (min, dz, dy),                            // -x
            (Vec3::new(min.x, max.y, min.z), dz, dx), // +y
            (min, dx, dz),                            // -y
            (Vec3::new(min.x, min.y, max.z), dx, dy), // +z
            (min, dy, dx),                            // -z
        ];

        let mut mesh = Self::new(name, Vec::new(), Vec::new(), material.clone())
            .with_normals(Vec::new())
            .with_uvs(Vec::new());
        for (corner, u, v) in faces {
            mesh.append(&Self::quad(String::new(), corner, u, v, material.clone()));
        }
        mesh
    }

    /// Latitude/longitude tessellated sphere with smooth normals.
    pub fn uv_sphere(
        name: impl Into<String>,
        center: Vec3,
        radius: f32,
        segments: u32,
        rings: u32,
        material: Arc<dyn Material>,
    ) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut positions = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut normals = Vec::with_capacity(positions.capacity());
        let mut uvs = Vec::with_capacity(positions.capacity());
        for r in 0..=rings {
            let theta = PI * r as f32 / rings as f32;
            for s in 0..=segments {
                let phi = 2.0 * PI * s as f32 / segments as f32;
                let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                positions.push(center + radius * n);
                normals.push(n);
                uvs.push(Vec2::new(s as f32 / segments as f32, 1.0 - r as f32 / rings as f32));
            }
        }

        let mut indices = Vec::with_capacity((2 * rings * segments) as usize);
        for r in 0..rings {
            for s in 0..segments {
                let a = r * (segments + 1) + s;
                let b = a + segments + 1;
                // Pole rows would produce zero-area triangles
                if r != 0 {
                    indices.push([a, a + 1, b]);
                }
                if r != rings - 1 {
                    indices.push([a + 1, b + 1, b]);
                }
            }
        }

        Self::new(name, positions, indices, material)
            .with_normals(normals)
            .with_uvs(uvs)
    }

    /// Apply a transform to positions and normals.
    ///
    /// Mirroring transforms reverse the winding so triangles keep facing out.
    pub fn transformed(mut self, transform: Mat4) -> Self {
        for p in &mut self.positions {
            *p = transform.transform_point3(*p);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals.iter_mut() {
                *n = transform.transform_normal(*n);
            }
        }
        if transform.determinant() < 0.0 {
            for tri in &mut self.indices {
                tri.swap(1, 2);
            }
        }
        self
    }

    /// Reverse the facing of every triangle.
    pub fn flipped(mut self) -> Self {
        for tri in &mut self.indices {
            tri.swap(1, 2);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals.iter_mut() {
                *n = -*n;
            }
        }
        self
    }

    /// Append another mesh's geometry. Attributes missing on either side are dropped.
    fn append(&mut self, other: &Mesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|tri| tri.map(|i| i + base)));
        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut own), Some(theirs)) => {
                own.extend_from_slice(theirs);
                Some(own)
            }
            _ => None,
        };
        self.uvs = match (self.uvs.take(), &other.uvs) {
            (Some(mut own), Some(theirs)) => {
                own.extend_from_slice(theirs);
                Some(own)
            }
            _ => None,
        };
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_emissive(&self) -> bool {
        self.material.properties().is_emissive
    }

    /// Bounds of the referenced vertices.
    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing(self.positions.iter().copied())
    }

    /// Bounds of a single triangle.
    pub fn triangle_bounds(&self, prim: usize) -> Aabb {
        Aabb::enclosing(self.vertices(prim))
    }

    fn vertices(&self, prim: usize) -> [Vec3; 3] {
        self.indices[prim].map(|i| self.positions[i as usize])
    }

    /// Unnormalized geometric normal; its length is twice the triangle area.
    fn face_cross(&self, prim: usize) -> Vec3 {
        let [p0, p1, p2] = self.vertices(prim);
        (p1 - p0).cross(p2 - p0)
    }

    /// Check index ranges and attribute lengths.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.indices.len() > u32::MAX as usize {
            return Err(SceneError::TooManyTriangles {
                mesh: self.name.clone(),
                max: u32::MAX as usize,
            });
        }

        let count = self.positions.len();
        for (triangle, tri) in self.indices.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= count) {
                return Err(SceneError::VertexIndexOutOfRange {
                    mesh: self.name.clone(),
                    triangle,
                    index,
                    count,
                });
            }
        }

        let attributes = [
            ("normals", self.normals.as_ref().map(Vec::len)),
            ("uvs", self.uvs.as_ref().map(Vec::len)),
        ];
        for (attribute, len) in attributes {
            if let Some(found) = len {
                if found != count {
                    return Err(SceneError::AttributeLengthMismatch {
                        mesh: self.name.clone(),
                        attribute,
                        expected: count,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the per-triangle area table used for light sampling.
    /// Returns the total surface area.
    pub(crate) fn prepare_sampling_table(&mut self) -> f32 {
        let areas: Vec<f32> = (0..self.indices.len())
            .map(|prim| 0.5 * self.face_cross(prim).length())
            .collect();
        self.area_cdf = DiscreteCdf::from_weights(areas);
        self.area = if self.area_cdf.is_valid() {
            1.0 / self.area_cdf.normalization()
        } else {
            0.0
        };
        self.area
    }

    /// Total area as computed by the sampling table; 0 before it is built.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Area density of [`sample_position`](Self::sample_position).
    pub fn pdf_position(&self) -> f32 {
        if self.area > 0.0 {
            1.0 / self.area
        } else {
            0.0
        }
    }

    /// Pick a point uniformly over the surface.
    ///
    /// `u_triangle` selects the triangle, `sample` the point inside it.
    /// Returns the point and the unit geometric normal there, or `None`
    /// if the mesh has no area.
    pub fn sample_position(&self, u_triangle: f32, sample: (f32, f32)) -> Option<(Vec3, Vec3)> {
        if !self.area_cdf.is_valid() {
            return None;
        }
        let prim = self.area_cdf.sample(u_triangle);
        let [p0, p1, p2] = self.vertices(prim);
        let (b1, b2) = square_to_uniform_triangle(sample);
        let p = p0 + (p1 - p0) * b1 + (p2 - p0) * b2;
        let n = self.face_cross(prim).normalize_or_zero();
        Some((p, n))
    }

    /// Expand a primitive hit into a full surface record.
    pub fn fill_hit_record(&self, ray: &Ray, cache: &HitCache, is_light: bool) -> HitRecord<'_> {
        let prim = cache.prim_id as usize;
        let [i0, i1, i2] = self.indices[prim].map(|i| i as usize);
        let (u, v) = (cache.u, cache.v);
        let w = 1.0 - u - v;

        let geometric = self.face_cross(prim).normalize_or_zero();
        let outward = self
            .normals
            .as_ref()
            .map(|n| (w * n[i0] + u * n[i1] + v * n[i2]).normalize_or_zero())
            .filter(|n| *n != Vec3::ZERO)
            .unwrap_or(geometric);

        let uv = match &self.uvs {
            Some(t) => w * t[i0] + u * t[i1] + v * t[i2],
            None => Vec2::new(u, v),
        };

        // Facing follows the triangle, not the interpolated normal
        let mut rec = HitRecord {
            p: ray.at(cache.t),
            normal: geometric,
            geometric_normal: geometric,
            uv,
            t: cache.t,
            material: self.material.as_ref(),
            front_face: true,
            is_light,
            shape_id: cache.shape_id,
        };
        rec.set_face_normal(ray.direction, geometric);
        rec.geometric_normal = rec.normal;
        rec.normal = if rec.front_face { outward } else { -outward };
        rec
    }
}
