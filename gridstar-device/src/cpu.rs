use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use gridstar_graph::{GraphPack, NodeId};

use crate::backend::{AgentOutcome, AgentQuery, IterationOutcome, ReturnCode};
use crate::capabilities::DeviceCapabilities;

/// CPU backend: rayon for cross-agent and cross-queue parallelism, a real
/// `AtomicU64` compare-and-swap for the Engine-S info table. Every capability
/// this crate's search engines ask for is satisfied here, so this backend is
/// always available regardless of GPU hardware.
pub struct CpuBackend {
    capabilities: DeviceCapabilities,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities {
                name: "cpu-rayon".to_string(),
                // Nominal shared-memory budget per work-group; advertised so
                // callers sizing S/maxSucc have a number to reason about, not
                // a hard allocation limit on this backend.
                local_memory_bytes: 48 * 1024,
                max_work_group_size: rayon::current_num_threads(),
                has_atomic64: true,
            },
        }
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn upload_graph(&self, pack: &GraphPack) -> Arc<GraphPack> {
        log::debug!(
            "uploading graph to cpu-rayon backend: {} nodes",
            pack.node_count()
        );
        Arc::new(pack.clone())
    }

    pub fn multi_agent_astar(
        &self,
        graph: &Arc<GraphPack>,
        queries: &[AgentQuery],
        max_path_len: usize,
    ) -> Vec<AgentOutcome> {
        queries
            .par_iter()
            .map(|q| single_agent_astar(graph, q.src, q.dst, max_path_len))
            .collect()
    }

    pub fn create_frontier(
        &self,
        graph: &Arc<GraphPack>,
        src: NodeId,
        dst: NodeId,
        queues: usize,
        queue_capacity: usize,
        max_successors: usize,
    ) -> CpuFrontier {
        CpuFrontier::new(graph, src, dst, queues, queue_capacity, max_successors)
    }

    pub fn run_iteration(&self, graph: &Arc<GraphPack>, frontier: &mut CpuFrontier) -> IterationOutcome {
        frontier.run_iteration(graph)
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn euclidean(a: gridstar_graph::NodeCoord, b: gridstar_graph::NodeCoord) -> f32 {
    let dx = (b.x - a.x) as f32;
    let dy = (b.y - a.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Open-list entry ordered for a min-heap on `f`, ties broken by lower `g`,
/// further ties broken by node id for a fully deterministic pop order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenEntry {
    f: f32,
    g: f32,
    id: NodeId,
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.g.partial_cmp(&self.g).unwrap_or(Ordering::Equal))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Independent single-agent A* over `pack`, the Engine-M kernel body. `src ==
/// dst` is handled by the caller; this function always does at least one pop.
fn single_agent_astar(pack: &GraphPack, src: NodeId, dst: NodeId, max_path_len: usize) -> AgentOutcome {
    if src == dst {
        return AgentOutcome {
            code: ReturnCode::Found,
            path: vec![src],
        };
    }

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Status {
        Unseen,
        Open,
        Closed,
    }

    let n = pack.node_count();
    let mut g = vec![f32::INFINITY; n];
    let mut pred = vec![0u32; n];
    let mut status = vec![Status::Unseen; n];
    let dst_coord = pack.coord(dst);
    let h = |id: NodeId| euclidean(pack.coord(id), dst_coord);

    g[src as usize] = 0.0;
    status[src as usize] = Status::Open;
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        f: h(src),
        g: 0.0,
        id: src,
    });

    while let Some(entry) = open.pop() {
        let u = entry.id;
        if status[u as usize] == Status::Closed {
            continue; // stale entry superseded by a better one already popped
        }
        if u == dst {
            let mut path = vec![u];
            let mut cur = u;
            while cur != src {
                cur = pred[cur as usize];
                path.push(cur);
            }
            path.reverse();
            if path.len() > max_path_len {
                return AgentOutcome {
                    code: ReturnCode::PathTooLong,
                    path: Vec::new(),
                };
            }
            return AgentOutcome {
                code: ReturnCode::Found,
                path,
            };
        }
        status[u as usize] = Status::Closed;
        for edge in pack.out_edges(u) {
            let v = edge.target;
            if status[v as usize] == Status::Closed {
                continue;
            }
            let tentative = entry.g + edge.cost;
            if status[v as usize] == Status::Open && tentative >= g[v as usize] {
                continue;
            }
            g[v as usize] = tentative;
            pred[v as usize] = u;
            status[v as usize] = Status::Open;
            open.push(OpenEntry {
                f: tentative + h(v),
                g: tentative,
                id: v,
            });
        }
    }

    AgentOutcome {
        code: ReturnCode::NoPath,
        path: Vec::new(),
    }
}

#[derive(Clone, Copy)]
struct Successor {
    id: NodeId,
    g: f32,
    pred: NodeId,
}

fn pack_word(g: f32, pred: NodeId) -> u64 {
    ((g.to_bits() as u64) << 32) | pred as u64
}

fn unpack_g(word: u64) -> f32 {
    f32::from_bits((word >> 32) as u32)
}

fn unpack_pred(word: u64) -> u32 {
    (word & 0xFFFF_FFFF) as u32
}

/// Engine-S's cooperative search state: `queues` open lists plus a shared
/// atomic info table, advanced one best-first step at a time by
/// [`CpuBackend::run_iteration`]. The outer termination loop lives in the
/// search crate; this type only knows how to take one step.
pub struct CpuFrontier {
    dst: NodeId,
    queues: usize,
    queue_capacity: usize,
    open: Vec<Vec<(NodeId, f32)>>,
    info: Vec<AtomicU64>,
    closed: Vec<AtomicBool>,
    schunk: Vec<Vec<Successor>>,
    tchunk: Vec<Mutex<Vec<Successor>>>,
    found: AtomicBool,
}

impl CpuFrontier {
    fn new(
        pack: &GraphPack,
        src: NodeId,
        dst: NodeId,
        queues: usize,
        queue_capacity: usize,
        max_successors: usize,
    ) -> Self {
        let n = pack.node_count();
        let info: Vec<AtomicU64> = (0..n).map(|_| AtomicU64::new(u64::MAX)).collect();
        let closed: Vec<AtomicBool> = (0..n).map(|_| AtomicBool::new(false)).collect();

        info[src as usize].store(pack_word(0.0, src), AtomicOrdering::Relaxed);
        closed[src as usize].store(true, AtomicOrdering::Relaxed);

        let mut open = vec![Vec::with_capacity(queue_capacity); queues];
        let home = src as usize % queues;
        let h0 = euclidean(pack.coord(src), pack.coord(dst));
        open[home].push((src, h0));

        Self {
            dst,
            queues,
            queue_capacity,
            open,
            info,
            closed,
            schunk: vec![Vec::with_capacity(max_successors); queues],
            tchunk: (0..queues).map(|_| Mutex::new(Vec::new())).collect(),
            found: AtomicBool::new(false),
        }
    }

    /// One outer-driver step: clearS, extractAndExpand, clearT,
    /// duplicateDetection, computeAndPushBack, named to match the five-phase
    /// design this advances.
    fn run_iteration(&mut self, pack: &GraphPack) -> IterationOutcome {
        for s in &mut self.schunk {
            s.clear();
        }

        let dst = self.dst;
        let closed = &self.closed;
        let info = &self.info;
        let found = &self.found;
        self.open
            .par_iter_mut()
            .zip(self.schunk.par_iter_mut())
            .for_each(|(open_q, schunk_q)| {
                extract_and_expand(pack, dst, closed, info, found, open_q, schunk_q);
            });

        if self.found.load(AtomicOrdering::Relaxed) {
            return IterationOutcome::Found;
        }

        for t in &self.tchunk {
            t.lock().unwrap().clear();
        }

        let info = &self.info;
        let tchunk = &self.tchunk;
        let queues = self.queues;
        self.schunk.par_iter().for_each(|schunk_q| {
            duplicate_detection(info, tchunk, queues, schunk_q);
        });

        let overflow = AtomicBool::new(false);
        let tchunk = &self.tchunk;
        let queue_capacity = self.queue_capacity;
        self.open.par_iter_mut().enumerate().for_each(|(q, open_q)| {
            compute_and_push_back(pack, dst, queue_capacity, &tchunk[q], open_q, &overflow);
        });

        if overflow.load(AtomicOrdering::Relaxed) {
            return IterationOutcome::QueueOverflow;
        }

        if self.open.iter().all(|q| q.is_empty()) {
            IterationOutcome::NoPath
        } else {
            IterationOutcome::Running
        }
    }

    /// Walks the info table's predecessor chain from `dst` back to its source.
    pub fn reconstruct_path(&self, dst: NodeId) -> Vec<NodeId> {
        let mut path = vec![dst];
        let mut cur = dst;
        loop {
            let word = self.info[cur as usize].load(AtomicOrdering::Acquire);
            let pred = unpack_pred(word);
            if pred == cur {
                break;
            }
            cur = pred;
            path.push(cur);
        }
        path.reverse();
        path
    }
}

fn extract_and_expand(
    pack: &GraphPack,
    dst: NodeId,
    closed: &[AtomicBool],
    info: &[AtomicU64],
    found: &AtomicBool,
    open_q: &mut Vec<(NodeId, f32)>,
    schunk_q: &mut Vec<Successor>,
) {
    if open_q.is_empty() {
        return;
    }
    let (idx, _) = open_q
        .iter()
        .enumerate()
        .min_by(|a, b| a.1 .1.partial_cmp(&b.1 .1).unwrap_or(Ordering::Equal))
        .unwrap();
    let (id, _f) = open_q.swap_remove(idx);

    if id == dst {
        found.store(true, AtomicOrdering::Relaxed);
        return;
    }

    closed[id as usize].store(true, AtomicOrdering::Relaxed);
    let g_id = unpack_g(info[id as usize].load(AtomicOrdering::Acquire));

    for edge in pack.out_edges(id) {
        if closed[edge.target as usize].load(AtomicOrdering::Relaxed) {
            continue;
        }
        schunk_q.push(Successor {
            id: edge.target,
            g: g_id + edge.cost,
            pred: id,
        });
    }
}

fn duplicate_detection(
    info: &[AtomicU64],
    tchunk: &[Mutex<Vec<Successor>>],
    queues: usize,
    schunk_q: &[Successor],
) {
    for succ in schunk_q {
        loop {
            let old = info[succ.id as usize].load(AtomicOrdering::Acquire);
            let old_g = unpack_g(old);
            if succ.g >= old_g {
                break; // not an improvement, drop
            }
            let new_word = pack_word(succ.g, succ.pred);
            match info[succ.id as usize].compare_exchange_weak(
                old,
                new_word,
                AtomicOrdering::AcqRel,
                AtomicOrdering::Acquire,
            ) {
                Ok(_) => {
                    let home = succ.id as usize % queues;
                    tchunk[home].lock().unwrap().push(*succ);
                    break;
                }
                Err(_) => continue, // another writer won the race, retry against fresh g
            }
        }
    }
}

fn compute_and_push_back(
    pack: &GraphPack,
    dst: NodeId,
    queue_capacity: usize,
    tchunk_q: &Mutex<Vec<Successor>>,
    open_q: &mut Vec<(NodeId, f32)>,
    overflow: &AtomicBool,
) {
    let dst_coord = pack.coord(dst);
    let entries = tchunk_q.lock().unwrap();
    for succ in entries.iter() {
        let f = succ.g + euclidean(pack.coord(succ.id), dst_coord);
        if let Some(existing) = open_q.iter_mut().find(|(id, _)| *id == succ.id) {
            if f < existing.1 {
                existing.1 = f;
            }
        } else if open_q.len() >= queue_capacity {
            overflow.store(true, AtomicOrdering::Relaxed);
        } else {
            open_q.push((succ.id, f));
        }
    }
}
