//! Dependency Grapher (C8, spec.md §4.8): project reference graph, cycle
//! detection, and diagram-text rendering.

use crate::model::Project;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct DependencyGraph {
    pub edges: Vec<(String, Vec<String>)>,
    pub has_cycles: bool,
    pub cycles: Vec<Vec<String>>,
}

fn project_name_by_id(projects: &[Project]) -> HashMap<&str, &str> {
    projects.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect()
}

fn edges_by_name(projects: &[Project]) -> Vec<(String, Vec<String>)> {
    let names = project_name_by_id(projects);
    projects
        .iter()
        .map(|p| {
            let referenced: Vec<String> = p
                .project_references
                .iter()
                .map(|id| names.get(id.as_str()).map(|n| n.to_string()).unwrap_or_else(|| "Unknown".to_string()))
                .collect();
            (p.name.clone(), referenced)
        })
        .collect()
}

/// Depth-first cycle detection with an explicit recursion-stack set
/// (spec.md §4.8). On hitting a node already on the current path, records
/// the path from its first occurrence through the closing edge.
fn detect_cycles(edges: &[(String, Vec<String>)]) -> Vec<Vec<String>> {
    let adjacency: HashMap<&str, &Vec<String>> = edges.iter().map(|(n, refs)| (n.as_str(), refs)).collect();

    let mut cycles = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();

    for (start, _) in edges {
        if visited.contains(start) {
            continue;
        }
        let mut stack_path: Vec<String> = Vec::new();
        let mut on_stack: HashSet<String> = HashSet::new();
        visit(start, &adjacency, &mut stack_path, &mut on_stack, &mut visited, &mut cycles);
    }

    cycles
}

fn visit(
    node: &str,
    adjacency: &HashMap<&str, &Vec<String>>,
    stack_path: &mut Vec<String>,
    on_stack: &mut HashSet<String>,
    visited: &mut HashSet<String>,
    cycles: &mut Vec<Vec<String>>,
) {
    stack_path.push(node.to_string());
    on_stack.insert(node.to_string());
    visited.insert(node.to_string());

    if let Some(refs) = adjacency.get(node) {
        for next in refs.iter() {
            if on_stack.contains(next) {
                let start_idx = stack_path.iter().position(|n| n == next).unwrap();
                let mut cycle: Vec<String> = stack_path[start_idx..].to_vec();
                cycle.push(next.clone());
                cycles.push(cycle);
            } else if !visited.contains(next) {
                visit(next, adjacency, stack_path, on_stack, visited, cycles);
            }
        }
    }

    stack_path.pop();
    on_stack.remove(node);
}

pub fn build_graph(projects: &[Project]) -> DependencyGraph {
    let edges = edges_by_name(projects);
    let cycles = detect_cycles(&edges);
    DependencyGraph {
        has_cycles: !cycles.is_empty(),
        edges,
        cycles,
    }
}

fn sanitize_node_id(name: &str) -> String {
    name.chars()
        .map(|c| if c == '.' || c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// Render as a one-edge-per-line diagram text (spec.md §4.8's "mermaid"
/// format option), node ids sanitized.
pub fn render_diagram(graph: &DependencyGraph) -> String {
    let mut out = String::new();
    for (node, refs) in &graph.edges {
        for target in refs {
            out.push_str(&format!("{} --> {}\n", sanitize_node_id(node), sanitize_node_id(target)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str, refs: &[&str]) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            path: format!("{name}.csproj").into(),
            language: "C#".to_string(),
            documents: vec![],
            project_references: refs.iter().map(|r| r.to_string()).collect(),
            external_references: vec![],
        }
    }

    #[test]
    fn detects_three_project_cycle() {
        let projects = vec![
            project("p1", "P1", &["p2"]),
            project("p2", "P2", &["p3"]),
            project("p3", "P3", &["p1"]),
        ];
        let graph = build_graph(&projects);
        assert!(graph.has_cycles);
        assert_eq!(graph.cycles.len(), 1);
        assert_eq!(graph.cycles[0].len(), 4);
    }

    #[test]
    fn acyclic_graph_reports_no_cycles() {
        let projects = vec![project("p1", "P1", &["p2"]), project("p2", "P2", &[])];
        let graph = build_graph(&projects);
        assert!(!graph.has_cycles);
        assert!(graph.cycles.is_empty());
    }

    #[test]
    fn unresolved_reference_renders_as_unknown() {
        let projects = vec![project("p1", "P1", &["missing"])];
        let graph = build_graph(&projects);
        assert_eq!(graph.edges[0].1, vec!["Unknown".to_string()]);
    }

    #[test]
    fn diagram_sanitizes_node_ids() {
        let projects = vec![project("p1", "My.App-Core", &["p2"]), project("p2", "My App", &[])];
        let graph = build_graph(&projects);
        let diagram = render_diagram(&graph);
        assert!(diagram.contains("My_App_Core --> My_App"));
    }
}
