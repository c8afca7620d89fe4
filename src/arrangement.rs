//! The arrangement: construction pipeline and read-only queries.

use crate::aabb::Aabb;
use crate::cell::ray::{FAR_OFFSETS, Shot, shoot};
use crate::cell::{Cell, build_cells, far_corner};
use crate::config::{ArrangementConfig, CoplanarPolicy, EngineKind};
use crate::errors::{ArrangementError, ArrangementResult, ArrangementWarning, InputError, Stage};
use crate::float_types::Real;
use crate::kernel::exact::integer;
use crate::kernel::predicates::{orient3d, point_in_triangle};
use crate::kernel::{ExactPoint, Orientation, Projection};
use crate::mesh::{ArrangementInput, ConformingMesh, OutputFacet, PreparedMesh};
use crate::patch::{Patch, build_patches, edge_map};
use crate::subdivide::{SubdivisionOptions, engine_for};
use crate::validate::validate;
use crate::winding::propagate;
use nalgebra::Point3;
use std::time::Instant;
use tracing::{debug, debug_span, info, warn};

/// Ray lengths tried by [`Arrangement::locate`], as multiples of the far offsets.
const LOCATE_SCALES: [i64; 3] = [1, 3, 29];

/// Spatial decomposition of one or more triangle meshes into a conforming
/// mesh, patches and cells with per-mesh winding numbers.
///
/// # Example
///
/// ```
/// use mesh_arrangement::{ArrangementConfig, ArrangementInput, build_arrangement};
///
/// let vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let facets = vec![[0, 2, 1], [0, 3, 2], [0, 1, 3], [1, 2, 3]];
/// let input = ArrangementInput::new(vertices, facets);
///
/// let arrangement = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
/// assert_eq!(arrangement.cell_count(), 2);
/// assert_eq!(arrangement.winding_at([0.1, 0.1, 0.1]).unwrap(), Some(&[1][..]));
/// ```
#[derive(Debug, Clone)]
pub struct Arrangement {
    engine: EngineKind,
    coplanar_policy: CoplanarPolicy,
    num_meshes: usize,
    mesh: ConformingMesh,
    vertices: Vec<Point3<Real>>,
    facet_patch: Vec<usize>,
    patches: Vec<Patch>,
    cells: Vec<Cell>,
    input_vertex_map: Vec<usize>,
    warnings: Vec<ArrangementWarning>,
}

/// Builds the arrangement of `input`. Same as [`Arrangement::build`].
pub fn build_arrangement(input: &ArrangementInput, config: &ArrangementConfig) -> ArrangementResult<Arrangement> {
    Arrangement::build(input, config)
}

impl Arrangement {
    /// Runs the whole pipeline: preparation, subdivision, optional
    /// validation, patches, cells and winding numbers.
    pub fn build(input: &ArrangementInput, config: &ArrangementConfig) -> ArrangementResult<Self> {
        let started = Instant::now();
        let checkpoint = |stage: Stage| match config.time_limit {
            Some(limit) if started.elapsed() >= limit => Err(ArrangementError::TimeLimitExceeded { stage, limit }),
            _ => {
                debug!(%stage, elapsed = ?started.elapsed(), "stage finished");
                Ok(())
            },
        };

        let engine = engine_for(config)?;
        engine.check_range(input)?;
        let prepared = PreparedMesh::prepare(input, engine.kernel())?;
        let mut warnings = Vec::new();
        if !prepared.dropped.is_empty() {
            warnings.push(ArrangementWarning::DroppedDegenerateFacets {
                facets: prepared.dropped.clone(),
            });
        }
        checkpoint(Stage::Preparation)?;

        let options = SubdivisionOptions {
            coplanar_policy: config.coplanar_policy.unwrap_or_else(|| engine.default_coplanar_policy()),
            delaunay: config.delaunay,
        };
        let mesh = {
            let _span = debug_span!("subdivide", engine = %engine.kind()).entered();
            engine.subdivide(&prepared, &options)?
        };
        if mesh.merged > 0 {
            warnings.push(ArrangementWarning::MergedCoplanarFacets { count: mesh.merged });
        }
        checkpoint(Stage::Subdivision)?;

        if config.validate {
            let _span = debug_span!("validate").entered();
            validate(&mesh, engine.kernel(), options.coplanar_policy, config.bvh_leaf_size)?;
            checkpoint(Stage::Validation)?;
        }

        let edges = edge_map(&mesh);
        let (facet_patch, mut patches) = {
            let _span = debug_span!("patches").entered();
            build_patches(&mesh, &edges)
        };
        debug!(patches = patches.len(), edges = edges.len(), "patches extracted");
        checkpoint(Stage::Patches)?;

        let mut cells = {
            let _span = debug_span!("cells").entered();
            let (cells, cell_warnings) = build_cells(&mesh, &edges, &facet_patch, &mut patches)?;
            warnings.extend(cell_warnings);
            cells
        };
        checkpoint(Stage::Cells)?;

        {
            let _span = debug_span!("winding").entered();
            warnings.extend(propagate(prepared.num_meshes, &mut cells, &patches));
        }
        checkpoint(Stage::Winding)?;

        for warning in &warnings {
            warn!("{warning}");
        }
        info!(
            vertices = mesh.points.len(),
            facets = mesh.facets.len(),
            patches = patches.len(),
            cells = cells.len(),
            "arrangement built"
        );

        Ok(Self {
            engine: engine.kind(),
            coplanar_policy: options.coplanar_policy,
            num_meshes: prepared.num_meshes,
            vertices: mesh.points.iter().map(|p| p.exact.to_point()).collect(),
            mesh,
            facet_patch,
            patches,
            cells,
            input_vertex_map: prepared.input_vertex_map,
            warnings,
        })
    }

    pub const fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Coplanar policy the arrangement was built with.
    pub const fn coplanar_policy(&self) -> CoplanarPolicy {
        self.coplanar_policy
    }

    pub const fn num_meshes(&self) -> usize {
        self.num_meshes
    }

    /// Number of cells, including the exterior.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Output vertices, rounded to the nearest `f64`.
    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    /// Exact position of an output vertex.
    pub fn exact_vertex(&self, vertex: usize) -> Option<&ExactPoint> {
        self.mesh.points.get(vertex).map(|p| &p.exact)
    }

    /// Output facets as vertex index triples.
    pub fn facets(&self) -> Vec<[usize; 3]> {
        self.mesh.facets.iter().map(|f| f.vertices).collect()
    }

    /// Output facets with provenance and winding jumps.
    pub fn output_facets(&self) -> &[OutputFacet] {
        &self.mesh.facets
    }

    /// Source facet id per output facet.
    pub fn face_labels(&self) -> Vec<usize> {
        self.mesh.facets.iter().map(|f| f.source_facet).collect()
    }

    /// `(source mesh, source facet)` of an output facet.
    pub fn source_label(&self, facet: usize) -> Option<(usize, usize)> {
        self.mesh.facets.get(facet).map(|f| (f.mesh, f.source_facet))
    }

    /// Patch id per output facet.
    pub fn patches(&self) -> &[usize] {
        &self.facet_patch
    }

    pub fn patch(&self, patch: usize) -> Option<&Patch> {
        self.patches.get(patch)
    }

    /// `[positive side, negative side]` cell per patch.
    pub fn cells(&self) -> Vec<[usize; 2]> {
        self.patches.iter().map(|p| p.cells).collect()
    }

    pub fn cell(&self, cell: usize) -> Option<&Cell> {
        self.cells.get(cell)
    }

    pub fn warnings(&self) -> &[ArrangementWarning] {
        &self.warnings
    }

    /// Output vertex of every input vertex.
    pub fn input_vertex_map(&self) -> &[usize] {
        &self.input_vertex_map
    }

    /// The facets bounding `cell`, oriented outward from it. A patch with
    /// the cell on both sides contributes both orientations.
    pub fn faces_of_cell(&self, cell: usize) -> ArrangementResult<Vec<[usize; 3]>> {
        let bounded = self.cells.get(cell).ok_or(ArrangementError::InvalidCell {
            cell,
            count: self.cells.len(),
        })?;
        let mut faces = Vec::new();
        for patch in bounded.patches.iter().map(|&p| &self.patches[p]) {
            let facets = patch.facets.iter().map(|&f| self.mesh.facets[f].vertices);
            if patch.positive_cell() == cell {
                faces.extend(facets.clone().map(|[a, b, c]| [a, c, b]));
            }
            if patch.negative_cell() == cell {
                faces.extend(facets);
            }
        }
        Ok(faces)
    }

    fn facet_cells(&self, facet: usize) -> Option<[&Cell; 2]> {
        let patch = self.patches.get(*self.facet_patch.get(facet)?)?;
        Some(patch.cells.map(|c| &self.cells[c]))
    }

    /// Winding number of each facet's own source mesh on its positive and
    /// negative side. `None` where a side's winding is unknown.
    pub fn winding_numbers(&self) -> Vec<Option<[i32; 2]>> {
        (0..self.mesh.facets.len())
            .map(|f| {
                let mesh = self.mesh.facets[f].mesh;
                let [pos, neg] = self.facet_cells(f)?;
                Some([pos.winding.as_ref()?[mesh], neg.winding.as_ref()?[mesh]])
            })
            .collect()
    }

    /// Full winding vectors on the positive and negative side of a facet.
    pub fn facet_winding(&self, facet: usize) -> Option<[&[i32]; 2]> {
        let [pos, neg] = self.facet_cells(facet)?;
        Some([pos.winding.as_deref()?, neg.winding.as_deref()?])
    }

    fn on_surface(&self, p: &ExactPoint) -> bool {
        let probe = Aabb::from_exact([p]);
        self.mesh.facets.iter().any(|facet| {
            let tri = facet.vertices.map(|v| &self.mesh.points[v].exact);
            Aabb::from_exact(tri).intersects(&probe)
                && orient3d(tri[0], tri[1], tri[2], p).is_zero()
                && point_in_triangle(&Projection::for_triangle(tri[0], tri[1], tri[2]), p, tri)
        })
    }

    /// The cell containing `point`, or `None` if the point lies on a facet.
    ///
    /// A non-finite coordinate is reported as
    /// [`InputError::NonFiniteCoordinate`] with vertex `0`.
    pub fn locate(&self, point: [Real; 3]) -> ArrangementResult<Option<usize>> {
        let p = ExactPoint::from_f64(point).ok_or(InputError::NonFiniteCoordinate { vertex: 0 })?;
        if self.on_surface(&p) {
            return Ok(None);
        }
        let corner = far_corner(&self.mesh);
        let rank = |f: usize| (self.facet_patch[f], f);
        for scale in LOCATE_SCALES {
            for offset in FAR_OFFSETS {
                let [x, y, z] = offset.map(|o| integer(o * scale));
                let far = ExactPoint::new(&corner.x + x, &corner.y + y, &corner.z + z);
                match shoot(&self.mesh, rank, 0..self.mesh.facets.len(), &p, &far) {
                    Shot::Degenerate => continue,
                    Shot::Miss => return Ok(Some(0)),
                    Shot::Hit(hit) => {
                        let patch = &self.patches[self.facet_patch[hit.facet]];
                        let side = match hit.side {
                            Orientation::Negative => patch.negative_cell(),
                            _ => patch.positive_cell(),
                        };
                        return Ok(Some(side));
                    },
                }
            }
        }
        Err(ArrangementError::non_conforming(
            Stage::Cells,
            Vec::new(),
            "every ray from the query point grazes a facet boundary",
        ))
    }

    /// Winding vector at `point`; `None` on the surface or in a cell whose
    /// winding is unknown.
    pub fn winding_at(&self, point: [Real; 3]) -> ArrangementResult<Option<&[i32]>> {
        Ok(self
            .locate(point)?
            .and_then(|cell| self.cells[cell].winding.as_deref()))
    }

    /// Facets separating cells on which `accept` differs, oriented outward
    /// from the accepted region. Cells with unknown winding are rejected.
    pub fn extract(&self, accept: impl Fn(&[i32]) -> bool) -> Vec<[usize; 3]> {
        let accepted: Vec<bool> = self
            .cells
            .iter()
            .map(|c| c.winding.as_deref().is_some_and(&accept))
            .collect();
        let mut faces = Vec::new();
        for patch in &self.patches {
            let [pos, neg] = patch.cells.map(|c| accepted[c]);
            if pos == neg {
                continue;
            }
            for &f in &patch.facets {
                let [a, b, c] = self.mesh.facets[f].vertices;
                faces.push(if pos { [a, c, b] } else { [a, b, c] });
            }
        }
        faces
    }

    /// Boundary of the region inside any mesh.
    pub fn union(&self) -> Vec<[usize; 3]> {
        self.extract(|w| w.iter().any(|&x| x != 0))
    }

    /// Boundary of the region inside every mesh.
    pub fn intersection(&self) -> Vec<[usize; 3]> {
        self.extract(|w| !w.is_empty() && w.iter().all(|&x| x != 0))
    }

    /// Boundary of the region inside mesh `a` and outside mesh `b`.
    pub fn difference(&self, a: usize, b: usize) -> Vec<[usize; 3]> {
        self.extract(|w| w.get(a).is_some_and(|&x| x != 0) && w.get(b).is_none_or(|&x| x == 0))
    }

    /// Boundary of the region inside an odd number of meshes.
    pub fn xor(&self) -> Vec<[usize; 3]> {
        self.extract(|w| w.iter().filter(|&&x| x != 0).count() % 2 == 1)
    }
}
