/*!
 * Integration test: flatten a small mixed-language workspace end to end
 */

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use flatmd::config::Config;
use flatmd::flatten::Flattener;
use flatmd::types::{CompactLevel, HighlightStyle, VisualizationLevel};

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn flattens_a_mixed_workspace() {
    let workspace = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_file(
        &workspace.path().join("package.json"),
        "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\"\n}\n",
    );
    write_file(
        &workspace.path().join("src/index.js"),
        "const api = require('./api.js');\napi.serve();\n",
    );
    write_file(
        &workspace.path().join("src/api.js"),
        "module.exports = { serve() {} };\n",
    );
    write_file(
        &workspace.path().join("scripts/setup.py"),
        "import os\nimport sys\n\nprint(os.getcwd())\n",
    );
    write_file(&workspace.path().join("README.md"), "# Demo\n\nA demo project.\n");
    write_file(&workspace.path().join(".env"), "DB_PASSWORD=hunter2\n");
    write_file(&workspace.path().join("node_modules/left-pad/index.js"), "x\n");

    let config = Config {
        workspace_dir: workspace.path().to_path_buf(),
        output_file: output.path().join("demo_flattened.md"),
        project_name: "demo".to_string(),
        include_patterns: Vec::new(),
        exclude_patterns: Vec::new(),
        max_file_size: 1024 * 1024,
        max_output_file_size: 5 * 1024 * 1024,
        num_threads: 2,
        respect_gitignore: true,
        respect_flattenignore: true,
        minify: true,
        compact_level: CompactLevel::Moderate,
        enhanced_toc: true,
        prioritize: true,
        visualization_level: VisualizationLevel::Comprehensive,
        highlight_style: HighlightStyle::Text,
        change_depth_days: 7,
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let mut progress = |_: &str, _: f64| {};
    let outcome = Flattener::new(&config, cancel).run(&mut progress).unwrap();

    assert_eq!(outcome.files_processed, 5);
    assert_eq!(outcome.files_skipped, 0);
    assert_eq!(outcome.parts_written, 1);
    assert!(outcome.total_bytes > 0);

    let doc = fs::read_to_string(&config.output_file).unwrap();

    // document skeleton
    assert!(doc.starts_with("# Project Digest: demo\n"));
    assert!(doc.contains("## Table of Contents"));
    assert!(doc.contains("# Directory Structure"));
    assert!(doc.contains("# Files Content"));
    assert!(doc.contains("## Code Visualization"));
    assert!(doc.contains("### Component Interactions"));

    // enhanced TOC categories
    assert!(doc.contains("### Configuration"));
    assert!(doc.contains("### Documentation"));
    assert!(doc.contains("### Javascript"));

    // content sections with dependency metadata
    assert!(doc.contains("## src/index.js"));
    assert!(doc.contains("- `./api.js`"));
    assert!(doc.contains("## scripts/setup.py"));
    assert!(doc.contains("- `os`"));

    // tree listing reflects the filtered workspace
    assert!(doc.contains("[DIR] src/"));
    assert!(doc.contains("[FILE] index.js"));
    assert!(!doc.contains("node_modules"));

    // the sensitive file is structurally absent
    assert!(!doc.contains("DB_PASSWORD"));
    assert!(!doc.contains("hunter2"));
    assert!(!doc.contains("## .env"));
}
