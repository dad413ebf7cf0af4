//! Dependency resolution: stable topological ordering of steps.

use super::StepSpec;
use crate::errors::ResolveError;
use std::collections::{HashMap, HashSet, VecDeque};

/// Orders steps so that every step follows all of its dependencies.
///
/// Kahn's algorithm with a FIFO ready queue. The queue is seeded in input
/// order and each batch of newly ready steps is enqueued in input order, so
/// independent steps keep the order the caller gave them.
///
/// # Errors
///
/// Returns [`ResolveError::DuplicateStep`] if two steps share an id,
/// [`ResolveError::UnknownDependency`] if a step references a missing id, and
/// [`ResolveError::CircularDependency`] if any steps cannot be ordered. A step
/// depending on itself is a cycle.
pub fn resolve_order(steps: &[StepSpec]) -> Result<Vec<&StepSpec>, ResolveError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        if index.insert(step.id.as_str(), i).is_some() {
            return Err(ResolveError::DuplicateStep {
                id: step.id.clone(),
            });
        }
    }

    let mut in_degree = vec![0usize; steps.len()];
    // dependents[i] lists steps waiting on step i, ascending by input position.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); steps.len()];

    for (i, step) in steps.iter().enumerate() {
        let mut seen = HashSet::new();
        for dep in &step.depends_on {
            let Some(&dep_idx) = index.get(dep.as_str()) else {
                return Err(ResolveError::UnknownDependency {
                    step: step.id.clone(),
                    dependency: dep.clone(),
                });
            };
            if seen.insert(dep_idx) {
                in_degree[i] += 1;
                dependents[dep_idx].push(i);
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..steps.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(steps.len());

    while let Some(current) = ready.pop_front() {
        order.push(&steps[current]);
        for &child in &dependents[current] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    if order.len() < steps.len() {
        let remaining = steps
            .iter()
            .zip(&in_degree)
            .filter(|(_, &degree)| degree > 0)
            .map(|(step, _)| step.id.clone())
            .collect();
        return Err(ResolveError::CircularDependency { steps: remaining });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{NoOpWork, StepWork};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn step(id: &str, deps: &[&str]) -> StepSpec {
        let work: Arc<dyn StepWork> = Arc::new(NoOpWork);
        StepSpec::new(id, work).with_dependencies(deps.iter().copied())
    }

    fn ids(order: &[&StepSpec]) -> Vec<String> {
        order.iter().map(|s| s.id.clone()).collect()
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|s| s == id).unwrap()
    }

    #[test]
    fn test_independent_steps_preserve_order() {
        let steps = vec![step("a", &[]), step("b", &[]), step("c", &[])];
        let order = resolve_order(&steps).unwrap();
        assert_eq!(ids(&order), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_linear_chain_regardless_of_input_order() {
        let steps = vec![step("c", &["b"]), step("b", &["a"]), step("a", &[])];
        let order = resolve_order(&steps).unwrap();
        assert_eq!(ids(&order), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond() {
        let steps = vec![
            step("A", &[]),
            step("B", &["A"]),
            step("C", &["A"]),
            step("D", &["B", "C"]),
        ];
        let order = ids(&resolve_order(&steps).unwrap());

        assert_eq!(order.first().map(String::as_str), Some("A"));
        assert_eq!(order.last().map(String::as_str), Some("D"));
        assert!(position(&order, "B") < position(&order, "D"));
        assert!(position(&order, "C") < position(&order, "D"));
    }

    #[test]
    fn test_ties_broken_by_input_position() {
        // Both late steps become ready when root completes; y_late comes first in the input.
        let steps = vec![
            step("y_late", &["root"]),
            step("root", &[]),
            step("x_late", &["root"]),
            step("free", &[]),
        ];
        let order = ids(&resolve_order(&steps).unwrap());
        assert_eq!(order, vec!["root", "free", "y_late", "x_late"]);
    }

    #[test]
    fn test_two_step_cycle() {
        let steps = vec![step("a", &["b"]), step("b", &["a"])];
        let err = resolve_order(&steps).unwrap_err();

        assert!(err.is_cycle());
        assert_eq!(
            err,
            ResolveError::CircularDependency {
                steps: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let steps = vec![step("ok", &[]), step("loop", &["loop"])];
        let err = resolve_order(&steps).unwrap_err();

        assert!(err.is_cycle());
        assert_eq!(
            err,
            ResolveError::CircularDependency {
                steps: vec!["loop".to_string()]
            }
        );
    }

    #[test]
    fn test_cycle_downstream_steps_are_reported() {
        let steps = vec![
            step("a", &[]),
            step("b", &["c"]),
            step("c", &["b"]),
            step("d", &["c"]),
        ];
        let err = resolve_order(&steps).unwrap_err();
        assert_eq!(
            err,
            ResolveError::CircularDependency {
                steps: vec!["b".to_string(), "c".to_string(), "d".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_dependency() {
        let steps = vec![step("a", &["missing"])];
        let err = resolve_order(&steps).unwrap_err();

        assert!(err.is_unknown_dependency());
        assert_eq!(
            err,
            ResolveError::UnknownDependency {
                step: "a".to_string(),
                dependency: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let steps = vec![step("a", &[]), step("a", &[])];
        let err = resolve_order(&steps).unwrap_err();
        assert_eq!(err, ResolveError::DuplicateStep { id: "a".to_string() });
    }

    #[test]
    fn test_repeated_dependency_counted_once() {
        let mut dup = step("b", &["a"]);
        dup.depends_on.push("a".to_string());
        let steps = vec![step("a", &[]), dup];

        let order = resolve_order(&steps).unwrap();
        assert_eq!(ids(&order), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_order(&[]).unwrap().is_empty());
    }
}
