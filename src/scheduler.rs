//! Dependency-aware readiness tracking for an external executor.
//!
//! The scheduler never runs anything. A driver repeatedly claims ready
//! vertices with [`Scheduler::start`], runs them however it likes, and
//! reports completion with [`Scheduler::finish`]. Each vertex moves through
//! `Pending -> Started -> Finished` exactly once.
//!
//! ## Readiness
//!
//! Finishing a vertex marks every edge leaving it as reached. A vertex is
//! ready once each of its distinct parent edges has been reached, which is
//! the same as every parent vertex being finished.
//!
//! ## Concurrency
//!
//! `start` and `finish` take `&mut self`. Drivers with several workers must
//! serialize calls, for example behind one mutex or from a single owner
//! thread that receives completions over a channel.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::analysis::DagView;
use crate::config::SchedulerConfig;
use crate::error::{Result, ScheduleError};
use crate::types::{Edge, Vertex};

/// Per-vertex progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexState {
    /// Not handed out yet.
    Pending,
    /// Handed out by `start`, not finished.
    Started,
    /// Reported finished.
    Finished,
}

/// Tracks which vertices of one DAG are runnable.
#[derive(Debug, Clone)]
pub struct Scheduler {
    dag: DagView,
    config: SchedulerConfig,
    /// Position of each vertex in `dag.vertices()`.
    index: HashMap<Vertex, usize>,
    states: Vec<VertexState>,
    /// Distinct parent edges not yet reached, per vertex position.
    remaining: Vec<usize>,
    reached_edges: BTreeSet<Edge>,
    ready: BTreeSet<usize>,
    running: BTreeSet<usize>,
    finished: BTreeSet<usize>,
}

impl Scheduler {
    /// Build a scheduler over everything reachable from `roots`.
    ///
    /// Fails if the graph has a cycle.
    pub fn new(roots: impl IntoIterator<Item = Vertex>) -> Result<Self> {
        Self::with_config(roots, SchedulerConfig::default())
    }

    /// Build a scheduler with explicit configuration.
    pub fn with_config(
        roots: impl IntoIterator<Item = Vertex>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        let dag = DagView::from_roots(roots)?;
        let count = dag.vertex_count();

        let mut index = HashMap::with_capacity(count);
        let mut remaining = Vec::with_capacity(count);
        let mut ready = BTreeSet::new();

        for (pos, vertex) in dag.vertices().iter().enumerate() {
            index.insert(vertex.clone(), pos);
            let distinct: BTreeSet<&Edge> = vertex.parents().iter().collect();
            if distinct.is_empty() {
                ready.insert(pos);
            }
            remaining.push(distinct.len());
        }

        debug!(
            vertices = count,
            initially_ready = ready.len(),
            params_hash = %config.params_hash(),
            "scheduler created"
        );

        Ok(Self {
            dag,
            config,
            index,
            states: vec![VertexState::Pending; count],
            remaining,
            reached_edges: BTreeSet::new(),
            ready,
            running: BTreeSet::new(),
            finished: BTreeSet::new(),
        })
    }

    /// Claim up to `limit` ready vertices and mark them started.
    ///
    /// Returns vertices in topological order. Returns nothing when no new
    /// vertex became ready since the last call.
    pub fn start(&mut self, limit: Option<usize>) -> Vec<Vertex> {
        let take = limit.unwrap_or(usize::MAX);
        let claimed: Vec<usize> = self.ready.iter().copied().take(take).collect();

        let mut batch = Vec::with_capacity(claimed.len());
        for pos in claimed {
            self.ready.remove(&pos);
            self.running.insert(pos);
            self.states[pos] = VertexState::Started;
            let vertex = self.dag.vertices()[pos].clone();
            trace!(vertex = %vertex, "vertex started");
            batch.push(vertex);
        }

        debug!(
            started = batch.len(),
            running = self.running.len(),
            still_ready = self.ready.len(),
            "batch started"
        );
        batch
    }

    /// [`start`](Self::start) with the configured batch limit.
    pub fn start_batch(&mut self) -> Vec<Vertex> {
        self.start(self.config.batch_limit)
    }

    /// Mark a started vertex finished and release its dependents.
    ///
    /// Misuse leaves the scheduler unchanged and returns an error.
    pub fn finish(&mut self, vertex: &Vertex) -> Result<(), ScheduleError> {
        let pos = self.position(vertex)?;
        match self.states[pos] {
            VertexState::Started => {}
            VertexState::Pending => {
                warn!(vertex = %vertex, "finish called before start");
                return Err(ScheduleError::NotStarted(vertex.to_string()));
            }
            VertexState::Finished => {
                warn!(vertex = %vertex, "finish called twice");
                return Err(ScheduleError::AlreadyFinished(vertex.to_string()));
            }
        }

        self.states[pos] = VertexState::Finished;
        self.running.remove(&pos);
        self.finished.insert(pos);

        let mut released = 0usize;
        for edge in self.dag.outgoing_edges(vertex) {
            if !self.reached_edges.insert(edge.clone()) {
                continue;
            }
            for child in self.dag.dependent_vertices(edge) {
                let Some(&child_pos) = self.index.get(child) else {
                    continue;
                };
                let left = &mut self.remaining[child_pos];
                *left = left.saturating_sub(1);
                if *left == 0 && self.states[child_pos] == VertexState::Pending {
                    self.ready.insert(child_pos);
                    released += 1;
                }
            }
        }

        debug!(
            vertex = %vertex,
            released,
            finished = self.finished.len(),
            total = self.states.len(),
            "vertex finished"
        );
        Ok(())
    }

    /// Whether every vertex has finished.
    pub fn is_done(&self) -> bool {
        self.finished.len() == self.states.len()
    }

    /// Started but not finished, in topological order.
    pub fn running_vertices(&self) -> Vec<Vertex> {
        self.collect(&self.running)
    }

    /// Finished vertices, in topological order.
    pub fn finished_vertices(&self) -> Vec<Vertex> {
        self.collect(&self.finished)
    }

    /// Whether `vertex` is pending with all parents finished.
    pub fn is_ready(&self, vertex: &Vertex) -> bool {
        self.index.get(vertex).is_some_and(|pos| self.ready.contains(pos))
    }

    /// Progress of `vertex`, or `None` if it is not in this DAG.
    pub fn state_of(&self, vertex: &Vertex) -> Option<VertexState> {
        self.index.get(vertex).map(|&pos| self.states[pos])
    }

    /// Number of vertices not yet started.
    pub fn pending_count(&self) -> usize {
        self.states.len() - self.running.len() - self.finished.len()
    }

    /// The analyzed graph.
    pub fn dag(&self) -> &DagView {
        &self.dag
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn position(&self, vertex: &Vertex) -> Result<usize, ScheduleError> {
        self.index.get(vertex).copied().ok_or_else(|| {
            warn!(vertex = %vertex, "finish called for unknown vertex");
            ScheduleError::UnknownVertex(vertex.to_string())
        })
    }

    fn collect(&self, positions: &BTreeSet<usize>) -> Vec<Vertex> {
        let vertices = self.dag.vertices();
        positions.iter().map(|&pos| vertices[pos].clone()).collect()
    }
}
