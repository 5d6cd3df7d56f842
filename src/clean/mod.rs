//! Mesh cleanup passes and the pipeline that sequences them.
//!
//! This module contains the four topology-cleanup passes:
//!
//! - **Deduplication**: merge vertices within a distance threshold
//! - **Degenerate dissolution**: drop zero-length edges and collapsed faces
//! - **Loose pruning**: delete vertices and edges nothing references
//! - **Limited dissolve**: collapse near-collinear two-edged vertices
//!
//! [`cleanup`] runs them in that order, which is load-bearing: merging is
//! the primary source of degeneracies, resolving degeneracies can strand
//! loose elements, and the dissolve pass assumes loose geometry is gone.
//!
//! # Example
//!
//! ```
//! use swarf::clean::{cleanup, CleanupOptions};
//! use swarf::mesh::build_from_polygons;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0), // duplicate
//! ];
//! let faces = vec![vec![0, 1, 2], vec![0, 1, 3]];
//! let mut mesh = build_from_polygons(&positions, &faces, &[]).unwrap();
//!
//! let report = cleanup(&mut mesh, &CleanupOptions::default()).unwrap();
//! assert_eq!(report.vertices_merged, 1);
//! ```

mod degenerate;
mod dissolve;
mod merge;
mod progress;
mod prune;

pub use degenerate::dissolve_degenerate;
pub use dissolve::dissolve_two_edged;
pub use merge::{dedup_vertices, merge_groups, SpatialGrid};
pub use progress::Progress;
pub use prune::{prune_loose, PruneCounts};

use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Default merge distance, matching the remove-doubles convention of
/// 0.0001 scene units.
pub const DEFAULT_MERGE_DISTANCE: f64 = 1e-4;

/// Default dissolve angle tolerance: 5 degrees, in radians.
pub const DEFAULT_DISSOLVE_ANGLE: f64 = 5.0 * std::f64::consts::PI / 180.0;

/// Options for a cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Distance threshold for vertex merging. Must be ≥ 0; zero merges
    /// only exactly-coincident vertices.
    pub merge_distance: f64,

    /// Angular tolerance (radians) for two-edged vertex dissolution.
    /// Must be in `[0, π]`.
    pub dissolve_angle: f64,

    /// Whether to run the two-edged dissolve pass. Worth disabling on
    /// very large meshes, where the fixed-point pass dominates the run.
    pub two_edged: bool,

    /// Whether the loose-element pass may remove faces with no neighbor
    /// faces.
    pub prune_faces: bool,

    /// Whether batch runs process meshes in parallel (default: true).
    pub parallel: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            merge_distance: DEFAULT_MERGE_DISTANCE,
            dissolve_angle: DEFAULT_DISSOLVE_ANGLE,
            two_edged: true,
            prune_faces: false,
            parallel: true,
        }
    }
}

impl CleanupOptions {
    /// Set the merge distance threshold.
    pub fn with_merge_distance(mut self, distance: f64) -> Self {
        self.merge_distance = distance;
        self
    }

    /// Set the dissolve angle tolerance, in radians.
    pub fn with_dissolve_angle(mut self, angle: f64) -> Self {
        self.dissolve_angle = angle;
        self
    }

    /// Enable or disable the two-edged dissolve pass.
    pub fn with_two_edged(mut self, enabled: bool) -> Self {
        self.two_edged = enabled;
        self
    }

    /// Allow the loose-element pass to remove unconnected faces.
    pub fn with_prune_faces(mut self, enabled: bool) -> Self {
        self.prune_faces = enabled;
        self
    }

    /// Set whether batch runs use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.merge_distance >= 0.0 && self.merge_distance.is_finite()) {
            return Err(MeshError::invalid_param(
                "merge_distance",
                self.merge_distance,
                "must be a finite value >= 0",
            ));
        }
        if !(self.dissolve_angle >= 0.0 && self.dissolve_angle <= std::f64::consts::PI) {
            return Err(MeshError::invalid_param(
                "dissolve_angle",
                self.dissolve_angle,
                "must be between 0 and pi radians",
            ));
        }
        Ok(())
    }
}

/// Counts of elements removed by a cleanup run.
///
/// Per-stage counts are reported even when a stage is skipped by
/// configuration; a skipped stage contributes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Vertex count before cleanup.
    pub initial_vertices: usize,
    /// Edge count before cleanup.
    pub initial_edges: usize,
    /// Face count before cleanup.
    pub initial_faces: usize,
    /// Vertex count after cleanup.
    pub final_vertices: usize,
    /// Edge count after cleanup.
    pub final_edges: usize,
    /// Face count after cleanup.
    pub final_faces: usize,
    /// Vertices merged into a nearby survivor.
    pub vertices_merged: usize,
    /// Zero-length edges removed.
    pub degenerate_edges: usize,
    /// Collapsed faces removed.
    pub degenerate_faces: usize,
    /// Loose vertices removed.
    pub loose_vertices: usize,
    /// Loose edges removed.
    pub loose_edges: usize,
    /// Loose faces removed (zero unless face pruning was enabled).
    pub loose_faces: usize,
    /// Two-edged vertices dissolved.
    pub two_edged_dissolved: usize,
}

impl CleanupReport {
    /// Check if any pass removed anything.
    pub fn had_changes(&self) -> bool {
        self.vertices_merged > 0
            || self.degenerate_edges > 0
            || self.degenerate_faces > 0
            || self.loose_vertices > 0
            || self.loose_edges > 0
            || self.loose_faces > 0
            || self.two_edged_dissolved > 0
    }
}

impl std::fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Removed: {} doubles, {} degenerate edges, {} degenerate faces, \
             {} loose vertices, {} loose edges, {} loose faces, \
             {} two-edged vertices",
            self.vertices_merged,
            self.degenerate_edges,
            self.degenerate_faces,
            self.loose_vertices,
            self.loose_edges,
            self.loose_faces,
            self.two_edged_dissolved,
        )
    }
}

/// Run the cleanup pipeline on a mesh.
///
/// Validates the parameters and the mesh's referential closure, then runs
/// deduplication, degenerate dissolution, loose pruning, and (unless
/// disabled) two-edged dissolve. Closure is re-checked after every stage;
/// a violation there is an implementation defect and surfaces as
/// [`MeshError::StageInvariant`].
///
/// The pipeline is all-or-nothing per mesh: on error the mesh may be
/// partially cleaned and should be discarded.
pub fn cleanup(mesh: &mut Mesh, options: &CleanupOptions) -> Result<CleanupReport> {
    cleanup_with_progress(mesh, options, &Progress::none())
}

/// Run the cleanup pipeline, reporting stage transitions to `progress`.
pub fn cleanup_with_progress(
    mesh: &mut Mesh,
    options: &CleanupOptions,
    progress: &Progress,
) -> Result<CleanupReport> {
    options.validate()?;
    mesh.validate()?;

    let total = if options.two_edged { 4 } else { 3 };
    let mut report = CleanupReport {
        initial_vertices: mesh.num_vertices(),
        initial_edges: mesh.num_edges(),
        initial_faces: mesh.num_faces(),
        ..CleanupReport::default()
    };

    progress.report(0, total, "Merging doubles");
    report.vertices_merged = dedup_vertices(mesh, options.merge_distance);
    check_stage(mesh, "dedup")?;

    progress.report(1, total, "Dissolving degenerates");
    let (de, df) = dissolve_degenerate(mesh);
    report.degenerate_edges = de;
    report.degenerate_faces = df;
    check_stage(mesh, "degenerate")?;

    progress.report(2, total, "Pruning loose elements");
    let pruned = prune_loose(mesh, options.prune_faces);
    report.loose_vertices = pruned.vertices;
    report.loose_edges = pruned.edges;
    report.loose_faces = pruned.faces;
    check_stage(mesh, "prune")?;

    if options.two_edged {
        progress.report(3, total, "Dissolving two-edged vertices");
        report.two_edged_dissolved = dissolve_two_edged(mesh, options.dissolve_angle);
        check_stage(mesh, "dissolve")?;
    }

    report.final_vertices = mesh.num_vertices();
    report.final_edges = mesh.num_edges();
    report.final_faces = mesh.num_faces();
    progress.report(total, total, "Done");

    Ok(report)
}

/// Clean a batch of meshes, one result per mesh.
///
/// Meshes are independent, so the batch runs in parallel unless the
/// options say otherwise. One mesh's failure never aborts its siblings.
pub fn cleanup_all(meshes: &mut [Mesh], options: &CleanupOptions) -> Vec<Result<CleanupReport>> {
    if options.parallel {
        meshes
            .par_iter_mut()
            .map(|mesh| cleanup(mesh, options))
            .collect()
    } else {
        meshes
            .iter_mut()
            .map(|mesh| cleanup(mesh, options))
            .collect()
    }
}

fn check_stage(mesh: &Mesh, stage: &'static str) -> Result<()> {
    mesh.validate()
        .map_err(|source| MeshError::stage_invariant(stage, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::Point3;

    /// A unit quad split into two triangles by a diagonal, with the second
    /// triangle referencing a near-duplicate of the shared corner.
    fn quad_with_duplicate() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.001), // duplicate of vertex 2
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 3, 4]];
        build_from_polygons(&positions, &faces, &[]).unwrap()
    }

    #[test]
    fn test_quad_scenario() {
        let mut mesh = quad_with_duplicate();
        let options = CleanupOptions::default().with_merge_distance(0.01);

        let report = cleanup(&mut mesh, &options).unwrap();

        assert_eq!(report.vertices_merged, 1);
        assert_eq!(report.degenerate_edges, 0);
        assert_eq!(report.degenerate_faces, 0);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_isolated_vertex_scenario() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0)];
        let mut mesh = build_from_polygons(&positions, &[], &[]).unwrap();

        let report = cleanup(&mut mesh, &CleanupOptions::default()).unwrap();

        assert_eq!(report.loose_vertices, 1);
        assert_eq!(mesh.num_vertices(), 0);
    }

    #[test]
    fn test_pipeline_idempotent() {
        let mut mesh = quad_with_duplicate();
        let options = CleanupOptions::default().with_merge_distance(0.01);

        let first = cleanup(&mut mesh, &options).unwrap();
        assert!(first.had_changes());

        let second = cleanup(&mut mesh, &options).unwrap();
        assert!(!second.had_changes());
    }

    #[test]
    fn test_skip_two_edged() {
        // A subdivided quad edge survives when the dissolve pass is off
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3, 4]];
        let mut mesh = build_from_polygons(&positions, &faces, &[]).unwrap();

        let options = CleanupOptions::default().with_two_edged(false);
        let report = cleanup(&mut mesh, &options).unwrap();

        assert_eq!(report.two_edged_dissolved, 0);
        assert_eq!(mesh.num_vertices(), 5);

        let options = options.with_two_edged(true);
        let report = cleanup(&mut mesh, &options).unwrap();
        assert_eq!(report.two_edged_dissolved, 1);
        assert_eq!(mesh.num_vertices(), 4);
    }

    #[test]
    fn test_negative_merge_distance_rejected() {
        let mut mesh = quad_with_duplicate();
        let options = CleanupOptions::default().with_merge_distance(-1.0);

        let err = cleanup(&mut mesh, &options).unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter { .. }));
        // Nothing ran
        assert_eq!(mesh.num_vertices(), 5);
    }

    #[test]
    fn test_out_of_range_angle_rejected() {
        let mut mesh = quad_with_duplicate();
        let options = CleanupOptions::default().with_dissolve_angle(4.0);

        let err = cleanup(&mut mesh, &options).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidParameter { name: "dissolve_angle", .. }
        ));
    }

    #[test]
    fn test_report_display() {
        let report = CleanupReport {
            vertices_merged: 3,
            two_edged_dissolved: 7,
            ..CleanupReport::default()
        };
        let text = report.to_string();
        assert!(text.contains("3 doubles"));
        assert!(text.contains("7 two-edged vertices"));
    }

    #[test]
    fn test_progress_stages_reported() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_cb = Arc::clone(&calls);
        let progress = Progress::new(move |_, total, _| {
            assert_eq!(total, 4);
            calls_in_cb.fetch_add(1, Ordering::Relaxed);
        });

        let mut mesh = quad_with_duplicate();
        cleanup_with_progress(&mut mesh, &CleanupOptions::default(), &progress).unwrap();

        // Four stage announcements plus the completion report
        assert_eq!(calls.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let mut meshes = vec![quad_with_duplicate(), quad_with_duplicate()];

        let results = cleanup_all(&mut meshes, &CleanupOptions::default());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_batch_sequential() {
        let mut meshes = vec![quad_with_duplicate()];
        let options = CleanupOptions::default().with_parallel(false);

        let results = cleanup_all(&mut meshes, &options);
        assert!(results[0].is_ok());
    }

    #[test]
    fn test_full_cleanup_of_messy_mesh() {
        // Duplicates, a degenerate face, a loose edge chain, an isolated
        // vertex, and a subdivided edge, all at once
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),    // 0: quad corner
            Point3::new(1.0, 0.0, 0.0),    // 1: mid-edge (two-edged)
            Point3::new(2.0, 0.0, 0.0),    // 2: quad corner
            Point3::new(2.0, 2.0, 0.0),    // 3: quad corner
            Point3::new(0.0, 2.0, 0.0),    // 4: quad corner
            Point3::new(0.0, 2.0, 1e-5),   // 5: duplicate of 4
            Point3::new(5.0, 5.0, 5.0),    // 6: loose chain
            Point3::new(6.0, 5.0, 5.0),    // 7: loose chain
            Point3::new(9.0, 9.0, 9.0),    // 8: isolated
        ];
        let faces = vec![
            vec![0, 1, 2, 3, 5],  // the quad, via the duplicate corner
            vec![2, 2, 3],        // degenerate
        ];
        let lines = vec![[6, 7]];
        let mut mesh = build_from_polygons(&positions, &faces, &lines).unwrap();

        let report = cleanup(&mut mesh, &CleanupOptions::default()).unwrap();

        assert_eq!(report.vertices_merged, 1); // 5 into 4
        assert_eq!(report.degenerate_faces, 1);
        assert_eq!(report.degenerate_edges, 1); // the (2,2) self-loop
        assert_eq!(report.loose_edges, 1); // the chain edge
        assert_eq!(report.loose_vertices, 3); // chain endpoints + isolated 8
        assert_eq!(report.two_edged_dissolved, 1); // vertex 1

        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 4);
        assert!(mesh.validate().is_ok());
    }
}
