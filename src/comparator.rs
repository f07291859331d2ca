//! Ties the pipeline together: load sources, check their binning, align them
//! in one traversal and render every completed subgroup.

use crate::binning::BinCoordinate;
use crate::config::{Category, ComparatorConfig, GridAxisStyle, GridSpec};
use crate::error::ComparatorError;
use crate::graph::SourceBinGraph;
use crate::payload::{Histos, PayloadStore};
use crate::render::{ArchiveCollector, ArtifactSink, AxisDisplay, ComparisonRenderer, RenderRequest, SvgGridRenderer};
use crate::traversal::{
    AlignmentObserver, AlignmentTraversal, MissingCell, PayloadInjector, TraversalContext, TraversalError,
};
use crate::validation::check_compatibility;
use std::path::PathBuf;
use tracing::{info, warn};

/// Outcome of one comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub leaves_visited: usize,
    pub subgroups_completed: usize,
    pub artifacts: usize,
    pub missing_cells: Vec<MissingCell>,
}

/// Aligns `sources` (reference first) without rendering anything.
///
/// Useful on its own to inspect the aligned grid; `Comparator::compare`
/// performs the same steps with a rendering observer.
pub fn align_sources<'g>(
    sources: &'g [SourceBinGraph],
    grid: &GridSpec,
) -> Result<(PayloadStore<'g>, Vec<MissingCell>), ComparatorError> {
    let dims = check_compatibility(sources, grid)?;
    let store = PayloadStore::allocate(sources.len(), dims.x.count, dims.y.count);
    let mut ctx = TraversalContext::new(sources, store);
    let mut traversal = AlignmentTraversal::new(&sources[0], grid)?;
    let mut injector = PayloadInjector::new(grid.clone());
    traversal.run(&mut ctx, &mut injector)?;
    Ok((ctx.into_store(), injector.into_missing()))
}

/// Injects payloads on every leaf and renders one artifact per statistic on
/// every completed subgroup.
struct ComparisonObserver<'a, R: ?Sized, S: ?Sized> {
    injector: PayloadInjector,
    subgroup_variable: String,
    statistics: &'static [&'static str],
    labels: Vec<String>,
    x_axis: AxisDisplay,
    y_axis: AxisDisplay,
    renderer: &'a mut R,
    sink: &'a mut S,
    artifacts: usize,
}

impl<'g, 'a, R, S> AlignmentObserver<'g> for ComparisonObserver<'a, R, S>
where
    R: ComparisonRenderer + ?Sized,
    S: ArtifactSink + ?Sized,
{
    fn on_leaf(
        &mut self,
        ctx: &mut TraversalContext<'g>,
        coordinate: &BinCoordinate,
        payload: &'g Histos,
    ) -> Result<(), TraversalError> {
        self.injector.on_leaf(ctx, coordinate, payload)
    }

    fn on_subgroup_complete(&mut self, ctx: &TraversalContext<'g>, subgroup: &BinCoordinate) -> Result<(), TraversalError> {
        let grid = self.injector.grid();
        let (_, num_x, num_y) = ctx.store.dims();
        let (x_bins, y_bins) = if self.subgroup_variable == grid.x {
            let bx = subgroup.require(&grid.x)?;
            (bx..bx + 1, 0..num_y)
        } else {
            let by = subgroup.require(&grid.y)?;
            (0..num_x, by..by + 1)
        };

        let label = subgroup.label();
        for &statistic in self.statistics {
            let name = format!("{}_{}_{}_{}", grid.x, grid.y, label, statistic);
            let request = RenderRequest {
                name: &name,
                statistic,
                subgroup,
                store: &ctx.store,
                x_bins: x_bins.clone(),
                y_bins: y_bins.clone(),
                x_axis: &self.x_axis,
                y_axis: &self.y_axis,
                labels: &self.labels,
            };
            let artifact = self.renderer.render(&request)?;
            self.sink.collect(artifact)?;
            self.artifacts += 1;
        }
        info!(subgroup = %subgroup, statistics = self.statistics.len(), "Rendered subgroup");
        Ok(())
    }
}

/// A configured comparison run.
#[derive(Debug, Clone)]
pub struct Comparator {
    config: ComparatorConfig,
    category: Category,
}

impl Comparator {
    /// Validates the configuration and settles the output category. An
    /// unrecognised category is fatal here, before any source is read.
    pub fn new(config: ComparatorConfig) -> Result<Self, ComparatorError> {
        config.validate()?;
        let category = config.resolve_category()?;
        Ok(Self { config, category })
    }

    pub fn config(&self) -> &ComparatorConfig { &self.config }
    pub fn category(&self) -> Category { self.category }

    pub fn load_sources(&self) -> Result<Vec<SourceBinGraph>, ComparatorError> {
        let mut sources = Vec::with_capacity(self.config.sources.len());
        for spec in &self.config.sources {
            let graph = SourceBinGraph::from_path(&spec.title, &spec.path)?;
            info!(
                source = %spec.title,
                path = %spec.path.display(),
                leaves = graph.leaf_count(),
                "Loaded source"
            );
            sources.push(graph);
        }
        Ok(sources)
    }

    /// Loads the configured sources, compares them and writes the artifact
    /// collection. Returns the report and the path written.
    pub fn run(&self) -> Result<(RunReport, PathBuf), ComparatorError> {
        let sources = self.load_sources()?;
        self.run_on(&sources)
    }

    /// Like `run`, for sources the caller already loaded.
    pub fn run_on(&self, sources: &[SourceBinGraph]) -> Result<(RunReport, PathBuf), ComparatorError> {
        let mut renderer = SvgGridRenderer::new(self.config.render.clone());
        let mut collector = ArchiveCollector::new(&self.config.output, self.category, self.config.labels());
        let report = self.compare(sources, &mut renderer, &mut collector)?;
        let path = collector.finish()?;
        Ok((report, path))
    }

    /// Compares already loaded sources, the first being the reference.
    pub fn compare<R, S>(&self, sources: &[SourceBinGraph], renderer: &mut R, sink: &mut S) -> Result<RunReport, ComparatorError>
    where
        R: ComparisonRenderer + ?Sized,
        S: ArtifactSink + ?Sized,
    {
        let grid = &self.config.grid;
        let dims = check_compatibility(sources, grid)?;
        info!(
            sources = sources.len(),
            x = %grid.x,
            num_x = dims.x.count,
            y = %grid.y,
            num_y = dims.y.count,
            category = self.category.as_str(),
            "Binning compatible, aligning sources"
        );

        let store = PayloadStore::allocate(sources.len(), dims.x.count, dims.y.count);
        let mut ctx = TraversalContext::new(sources, store);
        let mut traversal = AlignmentTraversal::new(&sources[0], grid)?;

        let mut observer = ComparisonObserver {
            injector: PayloadInjector::new(grid.clone()),
            subgroup_variable: traversal.subgroup_variable().to_string(),
            statistics: self.category.statistics(),
            labels: sources.iter().map(|s| s.title().to_string()).collect(),
            x_axis: AxisDisplay::new(&dims.x, &GridAxisStyle::for_variable(&grid.x)),
            y_axis: AxisDisplay::new(&dims.y, &GridAxisStyle::for_variable(&grid.y)),
            renderer,
            sink,
            artifacts: 0,
        };
        let summary = traversal.run(&mut ctx, &mut observer)?;

        let missing_cells = observer.injector.into_missing();
        if !missing_cells.is_empty() {
            warn!(count = missing_cells.len(), "Some cells could not be filled for every source");
        }
        Ok(RunReport {
            leaves_visited: summary.leaves_visited,
            subgroups_completed: summary.subgroups_completed,
            artifacts: observer.artifacts,
            missing_cells,
        })
    }
}
