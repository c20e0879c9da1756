//! Tarjan's strongly-connected-components algorithm over a generic graph,
//! ported from `transmuter_compute_sccs` in the original Python front end
//! (used there both by `TransmuterParser.__post_init__` over the nonterminal
//! FIRST graph and, in this crate, by the syntactic symbol table over the
//! same graph before codegen ever runs).

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Computes the strongly connected components of `graph`, given as an
/// adjacency map from node to its out-edges. Iterative to avoid blowing the
/// stack on large grammars; the original is recursive but grammars are
/// small enough in practice that this is purely a defensive choice.
pub fn compute_sccs<T>(graph: &HashMap<T, HashSet<T>>) -> Vec<HashSet<T>>
where
    T: Eq + Hash + Clone,
{
    tracing::trace!(nodes = graph.len(), "computing strongly connected components");

    let mut indices: HashMap<T, usize> = HashMap::new();
    let mut lowlink: HashMap<T, usize> = HashMap::new();
    let mut on_stack: HashSet<T> = HashSet::new();
    let mut stack: Vec<T> = Vec::new();
    let mut sccs: Vec<HashSet<T>> = Vec::new();
    let mut next_index = 0usize;

    // Explicit work-stack entries: the node being visited, and how far
    // through its successor list we've gotten.
    enum Frame<T> {
        Enter(T),
        Resume(T, usize),
    }

    for root in graph.keys() {
        if indices.contains_key(root) {
            continue;
        }

        let mut work = vec![Frame::Enter(root.clone())];

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(v) => {
                    let idx = next_index;
                    next_index += 1;
                    indices.insert(v.clone(), idx);
                    lowlink.insert(v.clone(), idx);
                    stack.push(v.clone());
                    on_stack.insert(v.clone());
                    work.push(Frame::Resume(v, 0));
                }
                Frame::Resume(v, next_child) => {
                    let successors: Vec<T> = graph.get(&v).into_iter().flatten().cloned().collect();

                    if next_child < successors.len() {
                        let w = successors[next_child].clone();
                        work.push(Frame::Resume(v.clone(), next_child + 1));

                        if !indices.contains_key(&w) {
                            work.push(Frame::Enter(w));
                        } else if on_stack.contains(&w) {
                            let w_idx = indices[&w];
                            let v_low = lowlink[&v];
                            lowlink.insert(v, v_low.min(w_idx));
                        }

                        continue;
                    }

                    // All successors processed; propagate lowlink to parent
                    // once we resume it, and pop an SCC if v is a root.
                    if lowlink[&v] == indices[&v] {
                        let mut scc = HashSet::new();

                        loop {
                            let w = stack.pop().expect("stack nonempty while popping scc");
                            on_stack.remove(&w);
                            let is_v = w == v;
                            scc.insert(w);

                            if is_v {
                                break;
                            }
                        }

                        sccs.push(scc);
                    }

                    // Propagate this node's lowlink up to whoever is next on
                    // the work stack representing its caller.
                    if let Some(parent_frame) = work.last() {
                        if let Frame::Resume(parent, _) = parent_frame {
                            let v_low = lowlink[&v];
                            let p_low = lowlink[parent];
                            lowlink.insert(parent.clone(), p_low.min(v_low));
                        }
                    }
                }
            }
        }
    }

    tracing::debug!(sccs = sccs.len(), "scc computation finished");
    sccs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(edges: &[(&str, &[&str])]) -> HashMap<String, HashSet<String>> {
        edges
            .iter()
            .map(|(k, vs)| {
                (
                    k.to_string(),
                    vs.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn self_loop_is_its_own_scc() {
        let graph = graph_from(&[("A", &["A"])]);
        let sccs = compute_sccs(&graph);
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0], HashSet::from(["A".to_string()]));
    }

    #[test]
    fn mutual_recursion_forms_one_scc() {
        let graph = graph_from(&[("A", &["B"]), ("B", &["A"])]);
        let sccs = compute_sccs(&graph);
        assert_eq!(sccs.len(), 1);
        assert_eq!(
            sccs[0],
            HashSet::from(["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn acyclic_graph_has_singleton_sccs() {
        let graph = graph_from(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        let mut sccs = compute_sccs(&graph);
        sccs.sort_by_key(|s| s.iter().next().cloned());
        assert_eq!(sccs.len(), 3);
    }

    #[test]
    fn three_way_cycle() {
        let graph = graph_from(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
        let sccs = compute_sccs(&graph);
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), 3);
    }
}
