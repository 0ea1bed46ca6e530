/*!
 * Mermaid diagram generation from the accumulated file records
 *
 * All three diagrams are naming-convention heuristics over the dependency
 * map, not real program analysis. Each one degrades to a placeholder so the
 * visualization section always holds at least one renderable block.
 */

use std::collections::BTreeMap;

use crate::types::{FileRecord, VisualizationLevel};

const CLASS_NODE_CAP: usize = 5;
const COMPONENT_FILE_CAP: usize = 3;

fn node_id(index: usize, relative_path: &str) -> String {
    let sanitized: String = relative_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("F{}_{}", index, sanitized)
}

fn basename(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// A dependency string resolves to a known file when, after dropping leading
/// `./` and `../` segments, it is a suffix of or contained in that file's
/// relative path. Known to produce false edges for short names; accepted as a
/// display heuristic.
fn resolves(dep: &str, relative_path: &str) -> bool {
    let mut dep = dep;
    loop {
        if let Some(rest) = dep.strip_prefix("./") {
            dep = rest;
        } else if let Some(rest) = dep.strip_prefix("../") {
            dep = rest;
        } else {
            break;
        }
    }
    if dep.is_empty() {
        return false;
    }
    relative_path.ends_with(dep) || relative_path.contains(dep)
}

/// Render the visualization section for the configured level; empty string
/// when the level is `none`.
pub fn generate(records: &BTreeMap<String, FileRecord>, level: VisualizationLevel) -> String {
    if level == VisualizationLevel::None {
        return String::new();
    }

    let mut out = String::from("\n## Code Visualization\n");
    out.push_str(&dependency_graph(records));

    if matches!(
        level,
        VisualizationLevel::Medium
            | VisualizationLevel::Detailed
            | VisualizationLevel::Comprehensive
    ) {
        out.push_str(&class_sketch(records));
    }
    if level == VisualizationLevel::Comprehensive {
        out.push_str(&component_sketch(records));
    }

    out
}

/// One node per known file, edges wherever an import resolves to another file
pub fn dependency_graph(records: &BTreeMap<String, FileRecord>) -> String {
    let mut out = String::from("\n### Dependency Graph\n\n```mermaid\ngraph LR\n");

    if records.is_empty() {
        out.push_str("    P[No files analyzed]\n```\n");
        return out;
    }

    let ids: BTreeMap<&str, String> = records
        .keys()
        .enumerate()
        .map(|(i, path)| (path.as_str(), node_id(i, path)))
        .collect();

    for (path, id) in &ids {
        out.push_str(&format!("    {}[\"{}\"]\n", id, basename(path)));
    }

    let mut edges = 0;
    for (path, record) in records {
        let from = &ids[path.as_str()];
        for dep in &record.imports {
            for (other, to) in &ids {
                if *other != path.as_str() && resolves(dep, other) {
                    out.push_str(&format!("    {} --> {}\n", from, to));
                    edges += 1;
                    break;
                }
            }
        }
    }

    if edges == 0 {
        out.push_str("    note[\"No cross-file dependencies detected\"]\n");
    }
    out.push_str("```\n");
    out
}

/// Uppercase-named source files sketched as pseudo-classes with
/// naming-convention relationships
pub fn class_sketch(records: &BTreeMap<String, FileRecord>) -> String {
    let mut out = String::from("\n### Class Relationships\n\n```mermaid\nclassDiagram\n");

    let stems: Vec<String> = records
        .keys()
        .filter_map(|path| {
            let name = basename(path);
            let stem = name.split('.').next().unwrap_or(name);
            stem.chars()
                .next()
                .filter(|c| c.is_ascii_uppercase())
                .map(|_| stem.to_string())
        })
        .take(CLASS_NODE_CAP)
        .collect();

    if stems.is_empty() {
        out.push_str("    class Placeholder {\n        +no classes detected\n    }\n```\n");
        return out;
    }

    for stem in &stems {
        out.push_str(&format!("    class {}\n", stem));
    }
    for stem in &stems {
        if let Some(base) = stem.strip_suffix("Controller") {
            if let Some(service) = stems.iter().find(|s| s.as_str() == format!("{}Service", base))
            {
                out.push_str(&format!("    {} ..> {} : uses\n", stem, service));
            }
        }
        if let Some(base) = stem.strip_suffix("Repository") {
            if let Some(model) = stems.iter().find(|s| s.as_str() == base) {
                out.push_str(&format!("    {} ..> {} : manages\n", stem, model));
            }
        }
        if let Some(rest) = stem.strip_prefix('I') {
            if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                if let Some(impl_) = stems.iter().find(|s| s.as_str() == rest) {
                    out.push_str(&format!("    {} <|.. {} : implements\n", stem, impl_));
                }
            }
        }
    }

    out.push_str("```\n");
    out
}

/// Directories with more than one file become subgraphs; edges appear when a
/// file's import resolves into a different directory's file set
pub fn component_sketch(records: &BTreeMap<String, FileRecord>) -> String {
    let mut out = String::from("\n### Component Interactions\n\n```mermaid\nflowchart TB\n");

    let mut by_dir: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for path in records.keys() {
        let dir = match path.rfind('/') {
            Some(pos) => path[..pos].to_string(),
            None => ".".to_string(),
        };
        by_dir.entry(dir).or_default().push(path);
    }
    by_dir.retain(|_, files| files.len() > 1);

    if by_dir.is_empty() {
        out.push_str("    single[\"Single component\"]\n```\n");
        return out;
    }

    let ids: BTreeMap<&str, String> = records
        .keys()
        .enumerate()
        .map(|(i, path)| (path.as_str(), node_id(i, path)))
        .collect();

    for (dir, files) in &by_dir {
        let dir_id: String = dir
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        out.push_str(&format!("    subgraph {}[\"{}\"]\n", dir_id, dir));
        for path in files.iter().take(COMPONENT_FILE_CAP) {
            out.push_str(&format!("        {}[\"{}\"]\n", ids[*path], basename(path)));
        }
        if files.len() > COMPONENT_FILE_CAP {
            out.push_str(&format!(
                "        {}_more[\"...and {} more\"]\n",
                dir_id,
                files.len() - COMPONENT_FILE_CAP
            ));
        }
        out.push_str("    end\n");
    }

    for (dir, files) in &by_dir {
        for path in files {
            let Some(record) = records.get(*path) else {
                continue;
            };
            for dep in &record.imports {
                for (other_dir, other_files) in &by_dir {
                    if other_dir == dir {
                        continue;
                    }
                    if let Some(target) = other_files.iter().find(|f| resolves(dep, f)) {
                        out.push_str(&format!("    {} --> {}\n", ids[*path], ids[*target]));
                    }
                }
            }
        }
    }

    out.push_str("```\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(rel: &str, imports: &[&str]) -> (String, FileRecord) {
        (
            rel.to_string(),
            FileRecord {
                absolute_path: PathBuf::from(format!("/ws/{}", rel)),
                relative_path: rel.to_string(),
                size: 10,
                language: "javascript".to_string(),
                imports: imports.iter().map(|s| s.to_string()).collect(),
                importance: 0.7,
            },
        )
    }

    #[test]
    fn dependency_graph_links_resolved_imports() {
        let records: BTreeMap<_, _> = vec![
            record("src/main.js", &["./utils.js"]),
            record("src/utils.js", &[]),
        ]
        .into_iter()
        .collect();

        let out = dependency_graph(&records);
        assert!(out.contains("graph LR"));
        assert!(out.contains("main.js"));
        assert!(out.contains("utils.js"));
        assert!(out.contains(" --> "));
    }

    #[test]
    fn empty_records_render_a_placeholder() {
        let records = BTreeMap::new();
        let out = dependency_graph(&records);
        assert!(out.contains("No files analyzed"));
        assert!(out.contains("```mermaid"));
    }

    #[test]
    fn class_sketch_uses_naming_conventions() {
        let records: BTreeMap<_, _> = vec![
            record("src/UserController.js", &[]),
            record("src/UserService.js", &[]),
            record("src/helpers.js", &[]),
        ]
        .into_iter()
        .collect();

        let out = class_sketch(&records);
        assert!(out.contains("class UserController"));
        assert!(out.contains("class UserService"));
        assert!(out.contains("UserController ..> UserService : uses"));
        assert!(!out.contains("helpers"));
    }

    #[test]
    fn component_sketch_groups_multi_file_directories() {
        let records: BTreeMap<_, _> = vec![
            record("api/routes.js", &["../db/client.js"]),
            record("api/auth.js", &[]),
            record("db/client.js", &[]),
            record("db/schema.js", &[]),
        ]
        .into_iter()
        .collect();

        let out = component_sketch(&records);
        assert!(out.contains("flowchart TB"));
        assert!(out.contains("subgraph api"));
        assert!(out.contains("subgraph db"));
        assert!(out.contains(" --> "));
    }

    #[test]
    fn parent_relative_imports_draw_edges() {
        assert!(resolves("../db/client.js", "db/client.js"));
        assert!(resolves("./utils.js", "src/utils.js"));
        assert!(!resolves("../", "db/client.js"));

        let records: BTreeMap<_, _> = vec![
            record("api/routes.js", &["../db/client.js"]),
            record("db/client.js", &[]),
        ]
        .into_iter()
        .collect();
        assert!(dependency_graph(&records).contains(" --> "));
    }

    #[test]
    fn level_none_omits_the_section() {
        let records: BTreeMap<_, _> =
            vec![record("src/main.js", &[])].into_iter().collect();
        assert_eq!(generate(&records, VisualizationLevel::None), "");
        let basic = generate(&records, VisualizationLevel::Basic);
        assert!(basic.contains("Dependency Graph"));
        assert!(!basic.contains("Class Relationships"));
        let full = generate(&records, VisualizationLevel::Comprehensive);
        assert!(full.contains("Component Interactions"));
    }
}
