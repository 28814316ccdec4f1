//! Data association: bipartite candidate graph, connected-component
//! partitioning (union-find), per-component assignment and adaptive
//! relaxation of the search radius.
//!
//! # Algorithm pipeline
//! 1. For each (trajectory, detection) pair that passed gating, add an edge
//!    weighted by squared distance.
//! 2. Partition the graph into **connected components** using union-find.
//!    Components are independent and can be solved in parallel.
//! 3. A component with more trajectories or detections than the subnet
//!    limit is **crowded**: the radius is multiplied by `adaptive_step`,
//!    edges beyond it dropped, and the component re-partitioned. Repeats
//!    while the next radius stays at or above `adaptive_stop`.
//! 4. Solve each remaining component with the **Hungarian algorithm**
//!    (most links, then least total squared distance) or greedily.
//!
//! Track indices are positions in the open-trajectory list, which is kept in
//! ascending id order, so index order is id order for all tie-breaks.

use crate::config::AssignmentStrategy;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::trace;

// ---------------------------------------------------------------------------
// Bipartite graph
// ---------------------------------------------------------------------------

/// A candidate (trajectory, detection) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignEdge {
    pub track_idx: usize,
    pub meas_idx: usize,
    /// Squared distance (pixels²)
    pub cost: f64,
}

/// Sparse bipartite graph: edges between trajectory indices and detection indices.
#[derive(Clone, Debug, Default)]
pub struct BipartiteGraph {
    pub edges: Vec<AssignEdge>,
    pub n_tracks: usize,
    pub n_meas: usize,
}

impl BipartiteGraph {
    pub fn new(n_tracks: usize, n_meas: usize) -> Self {
        Self {
            edges: Vec::new(),
            n_tracks,
            n_meas,
        }
    }

    /// Add an edge (gate-passed association candidate).
    pub fn add_edge(&mut self, track_idx: usize, meas_idx: usize, cost: f64) {
        self.edges.push(AssignEdge {
            track_idx,
            meas_idx,
            cost,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Union-Find (path halving + union by rank)
// ---------------------------------------------------------------------------

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, x: usize, y: usize) {
        let rx = self.find(x);
        let ry = self.find(y);
        if rx == ry {
            return;
        }
        match self.rank[rx].cmp(&self.rank[ry]) {
            Ordering::Less => self.parent[rx] = ry,
            Ordering::Greater => self.parent[ry] = rx,
            Ordering::Equal => {
                self.parent[ry] = rx;
                self.rank[rx] += 1;
            }
        }
    }
}

/// A single connected component in the bipartite graph.
#[derive(Clone, Debug, Default)]
pub struct Component {
    /// Sorted, deduplicated
    pub track_indices: Vec<usize>,
    /// Sorted, deduplicated
    pub meas_indices: Vec<usize>,
    pub edges: Vec<AssignEdge>,
}

impl Component {
    pub fn is_crowded(&self, subnet_size_limit: usize) -> bool {
        self.track_indices.len() > subnet_size_limit || self.meas_indices.len() > subnet_size_limit
    }
}

/// Partition the bipartite graph into connected components, ordered by
/// their smallest track index.
pub fn partition_components(graph: &BipartiteGraph) -> Vec<Component> {
    partition_edges(graph.n_tracks, graph.n_meas, &graph.edges)
}

/// Tracks and measurements share one union-find:
/// - Track i   → node i
/// - Measure j → node n_tracks + j
fn partition_edges(n_tracks: usize, n_meas: usize, edges: &[AssignEdge]) -> Vec<Component> {
    let mut uf = UnionFind::new(n_tracks + n_meas);
    for e in edges {
        uf.union(e.track_idx, n_tracks + e.meas_idx);
    }

    let mut comp_map: HashMap<usize, Component> = HashMap::new();
    for e in edges {
        let root = uf.find(e.track_idx);
        comp_map.entry(root).or_default().edges.push(e.clone());
    }

    let mut components: Vec<Component> = comp_map
        .into_values()
        .map(|mut comp| {
            comp.track_indices = comp.edges.iter().map(|e| e.track_idx).collect();
            comp.track_indices.sort_unstable();
            comp.track_indices.dedup();
            comp.meas_indices = comp.edges.iter().map(|e| e.meas_idx).collect();
            comp.meas_indices.sort_unstable();
            comp.meas_indices.dedup();
            comp
        })
        .collect();
    components.sort_by_key(|c| c.track_indices[0]);
    components
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// One accepted (trajectory, detection) link.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignedPair {
    pub track_idx: usize,
    pub meas_idx: usize,
    pub cost: f64,
}

/// Assignment result for one component.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    pub pairs: Vec<AssignedPair>,
    /// Track indices left without a detection
    pub unmatched_tracks: Vec<usize>,
    /// Detection indices left without a trajectory
    pub unmatched_meas: Vec<usize>,
}

impl Assignment {
    fn from_pairs(component: &Component, mut pairs: Vec<AssignedPair>) -> Self {
        pairs.sort_by_key(|p| p.track_idx);
        let unmatched_tracks = component
            .track_indices
            .iter()
            .copied()
            .filter(|t| !pairs.iter().any(|p| p.track_idx == *t))
            .collect();
        let unmatched_meas = component
            .meas_indices
            .iter()
            .copied()
            .filter(|m| !pairs.iter().any(|p| p.meas_idx == *m))
            .collect();
        Self {
            pairs,
            unmatched_tracks,
            unmatched_meas,
        }
    }
}

/// Pair order used for every tie-break: distance, then trajectory, then detection.
fn pair_order(a: (f64, usize, usize), b: (f64, usize, usize)) -> Ordering {
    a.0.total_cmp(&b.0)
        .then(a.1.cmp(&b.1))
        .then(a.2.cmp(&b.2))
}

/// Solve a component with the chosen strategy.
pub fn solve(component: &Component, strategy: AssignmentStrategy) -> Assignment {
    match strategy {
        AssignmentStrategy::Optimal => hungarian_solve(component),
        AssignmentStrategy::Greedy => greedy_solve(component),
    }
}

/// Accept edges in ascending (distance, track, detection) order while both
/// ends are free.
pub fn greedy_solve(component: &Component) -> Assignment {
    let mut edges: Vec<&AssignEdge> = component.edges.iter().collect();
    edges.sort_by(|a, b| {
        pair_order(
            (a.cost, a.track_idx, a.meas_idx),
            (b.cost, b.track_idx, b.meas_idx),
        )
    });

    let mut pairs: Vec<AssignedPair> = Vec::new();
    for e in edges {
        let taken = pairs
            .iter()
            .any(|p| p.track_idx == e.track_idx || p.meas_idx == e.meas_idx);
        if !taken {
            pairs.push(AssignedPair {
                track_idx: e.track_idx,
                meas_idx: e.meas_idx,
                cost: e.cost,
            });
        }
    }
    Assignment::from_pairs(component, pairs)
}

/// Solve a component with the Hungarian algorithm on a square cost matrix.
///
/// Cells with no candidate edge get a cost larger than any set of real
/// links can add up to, so the solution has the maximum number of links and,
/// among those, the least total squared distance. Such cells decode as
/// "unmatched".
///
/// When several assignments reach that optimum, the one whose links come
/// first in (distance, trajectory, detection) order wins: edges are visited
/// in that order and each is kept if some optimal assignment agreeing with
/// the earlier decisions contains it.
pub fn hungarian_solve(component: &Component) -> Assignment {
    let nt = component.track_indices.len();
    let nm = component.meas_indices.len();

    if nt == 0 || nm == 0 {
        return Assignment {
            pairs: vec![],
            unmatched_tracks: component.track_indices.clone(),
            unmatched_meas: component.meas_indices.clone(),
        };
    }

    let n = nt.max(nm);
    let max_cost = component
        .edges
        .iter()
        .map(|e| e.cost)
        .fold(0.0f64, f64::max);
    let no_edge_cost = (n as f64 + 1.0) * max_cost + 1.0;
    let tolerance = 1e-9 * no_edge_cost;

    let track_local: HashMap<usize, usize> = component
        .track_indices
        .iter()
        .enumerate()
        .map(|(i, &t)| (t, i))
        .collect();
    let meas_local: HashMap<usize, usize> = component
        .meas_indices
        .iter()
        .enumerate()
        .map(|(j, &m)| (m, j))
        .collect();

    // Allowed links; None decodes as "unmatched".
    let mut allowed: Vec<Option<f64>> = vec![None; n * n];
    let mut order: Vec<(f64, usize, usize, usize, usize)> = Vec::new();
    for e in &component.edges {
        if let (Some(&ri), Some(&ci)) = (track_local.get(&e.track_idx), meas_local.get(&e.meas_idx))
        {
            allowed[ri * n + ci] = Some(e.cost);
            order.push((e.cost, e.track_idx, e.meas_idx, ri, ci));
        }
    }
    order.sort_by(|a, b| pair_order((a.0, a.1, a.2), (b.0, b.1, b.2)));

    let solution = run_hungarian(&cost_matrix(&allowed, no_edge_cost), n);
    let target = link_score(&allowed, &solution.row_assign, n);
    let mut row_assign = solution.row_assign;

    for (c, _, _, ri, ci) in order {
        if allowed[ri * n + ci].is_none() {
            continue;
        }
        if row_assign[ri] == ci {
            restrict_to(&mut allowed, n, ri, ci);
            continue;
        }
        // Not tight under the optimal potentials: in no optimal assignment.
        if c - solution.u[ri + 1] - solution.v[ci + 1] > tolerance {
            allowed[ri * n + ci] = None;
            continue;
        }
        let mut trial = allowed.clone();
        restrict_to(&mut trial, n, ri, ci);
        let candidate = run_hungarian(&cost_matrix(&trial, no_edge_cost), n).row_assign;
        let score = link_score(&trial, &candidate, n);
        let same_optimum = score.0 == target.0 && (score.1 - target.1).abs() <= tolerance;
        if candidate[ri] == ci && same_optimum {
            allowed = trial;
            row_assign = candidate;
        } else {
            allowed[ri * n + ci] = None;
        }
    }

    let pairs = row_assign
        .iter()
        .enumerate()
        .filter(|&(ri, &ci)| ri < nt && ci < nm)
        .filter_map(|(ri, &ci)| {
            allowed[ri * n + ci].map(|cost| AssignedPair {
                track_idx: component.track_indices[ri],
                meas_idx: component.meas_indices[ci],
                cost,
            })
        })
        .collect();

    Assignment::from_pairs(component, pairs)
}

fn cost_matrix(allowed: &[Option<f64>], no_edge_cost: f64) -> Vec<f64> {
    allowed.iter().map(|c| c.unwrap_or(no_edge_cost)).collect()
}

/// Keep (row, col) as the only allowed cell in its row and column.
fn restrict_to(allowed: &mut [Option<f64>], n: usize, row: usize, col: usize) {
    for k in 0..n {
        if k != col {
            allowed[row * n + k] = None;
        }
        if k != row {
            allowed[k * n + col] = None;
        }
    }
}

/// (number of real links, their total cost).
fn link_score(allowed: &[Option<f64>], row_assign: &[usize], n: usize) -> (usize, f64) {
    row_assign
        .iter()
        .enumerate()
        .filter_map(|(r, &c)| allowed[r * n + c])
        .fold((0, 0.0), |(k, sum), cost| (k + 1, sum + cost))
}

/// Hungarian output: the assignment plus optimal row / column potentials
/// (1-indexed, `u[i] + v[j] <= cost[i][j]` with equality on assigned cells).
struct HungarianSolution {
    row_assign: Vec<usize>,
    u: Vec<f64>,
    v: Vec<f64>,
}

/// Core Hungarian algorithm on a square n×n cost matrix (row-major).
/// `row_assign[row]` is the assigned column.
fn run_hungarian(cost: &[f64], n: usize) -> HungarianSolution {
    // Potentials for rows (u) and columns (v)
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    // p[j] = row assigned to column j (1-indexed, 0 = none)
    let mut p = vec![0usize; n + 1];
    // way[j] = previous column in augmenting path
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=n {
                if !used[j] {
                    let val = cost[(i0 - 1) * n + (j - 1)] - u[i0] - v[j];
                    if val < minv[j] {
                        minv[j] = val;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Augment
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_assign = vec![0usize; n];
    for j in 1..=n {
        if p[j] != 0 {
            row_assign[p[j] - 1] = j - 1;
        }
    }
    HungarianSolution { row_assign, u, v }
}

// ---------------------------------------------------------------------------
// Adaptive relaxation
// ---------------------------------------------------------------------------

/// Per-frame solver parameters.
#[derive(Clone, Copy, Debug)]
pub struct SolveParams {
    pub strategy: AssignmentStrategy,
    pub subnet_size_limit: usize,
    pub adaptive_stop: f64,
    pub adaptive_step: f64,
}

/// Outcome of solving one component, possibly after relaxation.
#[derive(Clone, Debug, Default)]
pub struct SolvedComponent {
    pub assignment: Assignment,
    /// Radius shrink steps applied across this component's sub-components
    pub relaxations: usize,
    /// Smallest radius any part of the component was solved at
    pub radius: f64,
}

/// Solve `component` found at search `radius`, shrinking the radius while
/// the component (or a piece of it) is crowded.
///
/// Relaxation never fails: once the next radius would fall below
/// `adaptive_stop`, the component is solved as it stands.
pub fn solve_adaptive(component: &Component, radius: f64, params: &SolveParams) -> SolvedComponent {
    if component.is_crowded(params.subnet_size_limit) {
        let next = radius * params.adaptive_step;
        if next >= params.adaptive_stop {
            trace!(
                tracks = component.track_indices.len(),
                detections = component.meas_indices.len(),
                radius = next,
                "relaxing crowded component"
            );
            let r2 = next * next;
            let kept: Vec<AssignEdge> = component
                .edges
                .iter()
                .filter(|e| e.cost <= r2)
                .cloned()
                .collect();
            let n_tracks = component.track_indices.last().map_or(0, |&t| t + 1);
            let n_meas = component.meas_indices.last().map_or(0, |&m| m + 1);

            let mut pairs = Vec::new();
            let mut relaxations = 1;
            let mut smallest = next;
            for sub in partition_edges(n_tracks, n_meas, &kept) {
                let solved = solve_adaptive(&sub, next, params);
                pairs.extend(solved.assignment.pairs);
                relaxations += solved.relaxations;
                smallest = smallest.min(solved.radius);
            }
            return SolvedComponent {
                assignment: Assignment::from_pairs(component, pairs),
                relaxations,
                radius: smallest,
            };
        }
    }
    SolvedComponent {
        assignment: solve(component, params.strategy),
        relaxations: 0,
        radius,
    }
}

/// Enforce one detection per trajectory and one trajectory per detection
/// across merged component results. The lower-distance pair wins; the
/// losers are returned separately.
pub fn resolve_conflicts(mut pairs: Vec<AssignedPair>) -> (Vec<AssignedPair>, Vec<AssignedPair>) {
    pairs.sort_by(|a, b| {
        pair_order(
            (a.cost, a.track_idx, a.meas_idx),
            (b.cost, b.track_idx, b.meas_idx),
        )
    });
    let mut kept: Vec<AssignedPair> = Vec::with_capacity(pairs.len());
    let mut rejected = Vec::new();
    for pair in pairs {
        let clash = kept
            .iter()
            .any(|k| k.track_idx == pair.track_idx || k.meas_idx == pair.meas_idx);
        if clash {
            rejected.push(pair);
        } else {
            kept.push(pair);
        }
    }
    kept.sort_by_key(|p| p.track_idx);
    (kept, rejected)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn component(edges: &[(usize, usize, f64)]) -> Component {
        let mut graph = BipartiteGraph::new(16, 16);
        for &(t, m, c) in edges {
            graph.add_edge(t, m, c);
        }
        let mut comps = partition_components(&graph);
        assert_eq!(comps.len(), 1, "test edges must form one component");
        comps.remove(0)
    }

    fn pair_indices(a: &Assignment) -> Vec<(usize, usize)> {
        a.pairs.iter().map(|p| (p.track_idx, p.meas_idx)).collect()
    }

    #[test]
    fn hungarian_3x3_known() {
        // Cost matrix:
        // [4, 1, 3]
        // [2, 0, 5]
        // [3, 2, 2]
        // Optimal: row0→col1 (1), row1→col0 (2), row2→col2 (2) = 5
        let cost = vec![4.0, 1.0, 3.0, 2.0, 0.0, 5.0, 3.0, 2.0, 2.0];
        let assign = run_hungarian(&cost, 3).row_assign;
        let total: f64 = assign
            .iter()
            .enumerate()
            .map(|(r, &c)| cost[r * 3 + c])
            .sum();
        assert!(
            (total - 5.0).abs() < 1e-9,
            "Expected total cost 5, got {total}"
        );
    }

    #[test]
    fn partition_two_independent_components() {
        let mut graph = BipartiteGraph::new(4, 4);
        graph.add_edge(2, 3, 2.0);
        graph.add_edge(0, 0, 1.0);

        let comps = partition_components(&graph);
        assert_eq!(comps.len(), 2, "Should have 2 independent components");
        assert_eq!(comps[0].track_indices, vec![0]);
        assert_eq!(comps[1].track_indices, vec![2]);
    }

    #[test]
    fn hungarian_solve_simple() {
        let comp = component(&[(0, 0, 1.0), (0, 1, 10.0), (1, 0, 10.0), (1, 1, 1.0)]);
        let ass = hungarian_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(0, 0), (1, 1)]);
        assert!(ass.unmatched_tracks.is_empty());
        assert!(ass.unmatched_meas.is_empty());
    }

    #[test]
    fn hungarian_prefers_more_links() {
        // Track 0 is closest to detection 0, but track 1 can only reach
        // detection 0, so track 0 takes detection 1.
        let comp = component(&[(0, 0, 1.0), (0, 1, 9.0), (1, 0, 4.0)]);
        let ass = hungarian_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn hungarian_never_pairs_without_edge() {
        // 2 tracks, 2 detections, only one candidate pair.
        let comp = component(&[(0, 0, 4.0), (1, 0, 1.0), (1, 1, 100.0)]);
        let ass = hungarian_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(0, 0), (1, 1)]);

        let comp = component(&[(0, 0, 4.0), (1, 0, 1.0)]);
        let ass = hungarian_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(1, 0)]);
        assert_eq!(ass.unmatched_tracks, vec![0]);
        assert!(ass.unmatched_meas.is_empty());
    }

    #[test]
    fn equal_distance_goes_to_lower_track() {
        let comp = component(&[(0, 0, 9.0), (1, 0, 9.0)]);
        for strategy in [AssignmentStrategy::Optimal, AssignmentStrategy::Greedy] {
            let ass = solve(&comp, strategy);
            assert_eq!(pair_indices(&ass), vec![(0, 0)], "{strategy:?}");
            assert_eq!(ass.unmatched_tracks, vec![1]);
        }
    }

    #[test]
    fn equal_totals_keep_the_shortest_link() {
        // Both full assignments cost 4; the one holding the cost-1 link wins.
        let comp = component(&[(0, 0, 3.0), (0, 1, 2.0), (1, 0, 2.0), (1, 1, 1.0)]);
        for strategy in [AssignmentStrategy::Optimal, AssignmentStrategy::Greedy] {
            let ass = solve(&comp, strategy);
            assert_eq!(pair_indices(&ass), vec![(0, 0), (1, 1)], "{strategy:?}");
        }
    }

    #[test]
    fn equal_totals_then_lower_track() {
        // Uniform costs: track 0 takes detection 0, and so on down the diagonal.
        let comp = component(&[
            (0, 0, 5.0),
            (0, 1, 5.0),
            (0, 2, 5.0),
            (1, 0, 5.0),
            (1, 1, 5.0),
            (2, 1, 5.0),
            (2, 2, 5.0),
        ]);
        let ass = hungarian_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn tie_break_never_costs_links() {
        // Cheapest link (1, 0) would strand track 0; cardinality still wins.
        let comp = component(&[(0, 0, 4.0), (1, 0, 1.0), (1, 1, 4.0)]);
        let ass = hungarian_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn greedy_takes_nearest_first() {
        // Greedy locks in the 1.0 pair even though the optimum would link both.
        let comp = component(&[(0, 0, 1.0), (0, 1, 9.0), (1, 0, 4.0)]);
        let ass = greedy_solve(&comp);
        assert_eq!(pair_indices(&ass), vec![(0, 0)]);
        assert_eq!(ass.unmatched_tracks, vec![1]);
        assert_eq!(ass.unmatched_meas, vec![1]);
    }

    fn crowded_chain() -> Component {
        // Three tracks each near "their" detection (d = 1) and the next one (d = 9).
        component(&[
            (0, 0, 1.0),
            (0, 1, 81.0),
            (1, 1, 1.0),
            (1, 2, 81.0),
            (2, 2, 1.0),
        ])
    }

    #[test]
    fn crowded_component_is_relaxed() {
        let params = SolveParams {
            strategy: AssignmentStrategy::Greedy,
            subnet_size_limit: 2,
            adaptive_stop: 1.0,
            adaptive_step: 0.5,
        };
        let solved = solve_adaptive(&crowded_chain(), 10.0, &params);
        assert_eq!(solved.relaxations, 1);
        assert!((solved.radius - 5.0).abs() < 1e-12);
        assert_eq!(pair_indices(&solved.assignment), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn relaxation_stops_at_adaptive_stop() {
        let params = SolveParams {
            strategy: AssignmentStrategy::Optimal,
            subnet_size_limit: 2,
            adaptive_stop: 6.0,
            adaptive_step: 0.5,
        };
        let solved = solve_adaptive(&crowded_chain(), 10.0, &params);
        assert_eq!(solved.relaxations, 0);
        assert!((solved.radius - 10.0).abs() < 1e-12);
        assert_eq!(solved.assignment.pairs.len(), 3);
    }

    #[test]
    fn relaxation_can_orphan_far_pairs() {
        // Crowded chain whose only link to detection 3 is long.
        let comp = component(&[
            (0, 0, 1.0),
            (1, 0, 64.0),
            (1, 1, 1.0),
            (2, 1, 64.0),
            (2, 3, 64.0),
        ]);
        let params = SolveParams {
            strategy: AssignmentStrategy::Optimal,
            subnet_size_limit: 2,
            adaptive_stop: 1.0,
            adaptive_step: 0.5,
        };
        let solved = solve_adaptive(&comp, 10.0, &params);
        assert_eq!(pair_indices(&solved.assignment), vec![(0, 0), (1, 1)]);
        assert_eq!(solved.assignment.unmatched_tracks, vec![2]);
        assert_eq!(solved.assignment.unmatched_meas, vec![3]);
    }

    #[test]
    fn conflicts_resolved_by_distance() {
        let pairs = vec![
            AssignedPair {
                track_idx: 0,
                meas_idx: 5,
                cost: 9.0,
            },
            AssignedPair {
                track_idx: 1,
                meas_idx: 5,
                cost: 4.0,
            },
            AssignedPair {
                track_idx: 2,
                meas_idx: 6,
                cost: 1.0,
            },
        ];
        let (kept, rejected) = resolve_conflicts(pairs);
        assert_eq!(
            kept.iter().map(|p| p.track_idx).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].track_idx, 0);
    }
}
