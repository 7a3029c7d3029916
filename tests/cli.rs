//! End-to-end tests of the `kpet` binary.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HOSTS_YAML: &str = r"
host_type_regex: ^normal
host_types:
    normal: {}
    panicky:
        ignore_panic: true
    multihost_1: {}
recipesets:
    rcs1:
      - normal
      - panicky
    rcs2:
      - multihost_1
      - multihost_2
";

const TREE_XML: &str = "<job/>\n";

fn assets(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("write asset");
    }
    dir
}

fn kpet(db: &Path) -> Command {
    let mut command = Command::cargo_bin("kpet").expect("bin");
    command.current_dir(db).arg("--db").arg(db);
    command
}

fn run_generate(db: &Path) -> Command {
    let mut command = kpet(db);
    command.args(["run", "generate", "--tree", "tree", "-a", "arch"]);
    command
}

fn index_with(extra: &str) -> String {
    format!("{HOSTS_YAML}{extra}")
}

#[test]
fn empty_tree_list() {
    let db = assets(&[("index.yaml", "# Empty but valid database\n{}\n")]);

    kpet(db.path())
        .args(["tree", "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn tree_list_keeps_declaration_order() {
    let db = assets(&[(
        "index.yaml",
        "trees:\n  upstream: upstream.xml\n  rhel8: rhel8.xml\n",
    )]);

    kpet(db.path())
        .args(["tree", "list"])
        .assert()
        .success()
        .stdout("upstream\nrhel8\n");
}

#[test]
fn tree_list_as_json() {
    let db = assets(&[("index.yaml", "trees:\n  upstream: upstream.xml\n")]);

    kpet(db.path())
        .args(["tree", "list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""upstream""#));
}

#[test]
fn arch_and_host_type_lists() {
    let db = assets(&[("index.yaml", &index_with("arches: [x86_64, s390x]\n"))]);

    kpet(db.path())
        .args(["arch", "list"])
        .assert()
        .success()
        .stdout("x86_64\ns390x\n");

    kpet(db.path())
        .args(["host-type", "list"])
        .assert()
        .success()
        .stdout("normal\npanicky (ignore panic)\nmultihost_1\n");

    kpet(db.path())
        .args(["host-type", "list", "--eligible"])
        .assert()
        .success()
        .stdout("normal\n");
}

#[test]
fn empty_run_generate() {
    let db = assets(&[("index.yaml", "# Empty but valid database\n{}\n")]);

    run_generate(db.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#"Architecture "arch" not found"#));
}

#[test]
fn undeclared_arch_run_generate() {
    let db = assets(&[
        ("index.yaml", &index_with("arches: [x86_64]\ntrees:\n  tree: tree.xml\n")),
        ("tree.xml", TREE_XML),
    ]);

    run_generate(db.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#"Architecture "arch" not found"#));
}

#[test]
fn minimal_run_generate() {
    let db = assets(&[
        ("index.yaml", &index_with("arches:\n  - arch\ntrees:\n  tree: tree.xml\n")),
        ("tree.xml", TREE_XML),
    ]);

    run_generate(db.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)<job>\s*</job>").unwrap());
}

#[test]
fn missing_tree_template_run_generate() {
    let db = assets(&[(
        "index.yaml",
        &index_with("arches:\n  - arch\ntrees:\n  missing_template: missing_template.xml\n"),
    )]);

    kpet(db.path())
        .args(["run", "generate", "-a", "arch", "-t", "missing_template"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TemplateNotFound"));

    kpet(db.path())
        .args(["run", "generate", "-a", "arch", "--tree", "missing_template"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TemplateNotFound"));
}

#[test]
fn template_override_for_undeclared_tree() {
    let db = assets(&[
        ("index.yaml", &index_with("arches:\n  - arch\n")),
        ("custom.xml", TREE_XML),
    ]);

    kpet(db.path())
        .args(["run", "generate", "-a", "arch", "-t", "custom.xml"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)<job>\s*</job>").unwrap());
}

#[test]
fn missing_suite_file_run_generate() {
    let db = assets(&[
        (
            "index.yaml",
            &index_with("trees:\n  tree: tree.xml\nsuites:\n  - missing.yaml\n"),
        ),
        ("tree.xml", TREE_XML),
    ]);

    run_generate(db.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.yaml"));
}

#[test]
fn invalid_top_yaml_tree_list() {
    let db = assets(&[("index.yaml", &index_with("\ntree: {\n"))]);

    kpet(db.path())
        .args(["tree", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("serde_yaml::Error"));
}

#[test]
fn invalid_suite_yaml_tree_list() {
    let db = assets(&[
        ("index.yaml", &index_with("suites:\n    - suite.yaml\n")),
        ("suite.yaml", "{\nmaintainers:\n"),
    ]);

    kpet(db.path())
        .args(["tree", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("serde_yaml::Error"));
}

#[test]
fn invalid_top_data_tree_list() {
    let db = assets(&[(
        "index.yaml",
        &index_with("trees: {}\nunknown_node: True\n"),
    )]);

    kpet(db.path())
        .args(["tree", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Base data"));
}

#[test]
fn invalid_suite_data_tree_list() {
    let db = assets(&[
        ("index.yaml", &index_with("suites:\n    - suite.yaml\n")),
        ("suite.yaml", "description: \"Suite data with missing nodes\"\ncases: []\n"),
    ]);

    kpet(db.path())
        .args(["tree", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Suite data"));
}

#[test]
fn empty_suite_run_generate() {
    let db = assets(&[
        (
            "index.yaml",
            "host_types:\n  normal: {}\nhost_type_regex: ^normal\nrecipesets:\n  rcs1:\n    - normal\narches:\n  - arch\ntrees:\n  tree: tree.xml\nsuites:\n  - suite.yaml\n",
        ),
        ("suite.yaml", "description: Empty suite\nmaintainers:\n  - maint1\ncases: []\n\n"),
        ("tree.xml", TREE_XML),
    ]);

    run_generate(db.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)<job>\s*</job>").unwrap());
}

#[test]
fn case_without_patterns_run_generate() {
    let db = assets(&[
        (
            "index.yaml",
            &index_with("arches:\n  - arch\ntrees:\n  tree: tree.xml\nsuites:\n  - suite.yaml\n"),
        ),
        (
            "suite.yaml",
            "description: suite1\nmaintainers:\n  - maint1\ncases:\n  - name: case1\n    max_duration_seconds: 600\n",
        ),
        ("tree.xml", TREE_XML),
    ]);

    run_generate(db.path())
        .assert()
        .success()
        .stdout(
            predicate::str::is_match(
                r#"(?s)<job>\s*<host name="normal">.*<suite description="suite1">.*<case name="case1" max_duration_seconds="600"/>.*</host>\s*</job>"#,
            )
            .unwrap(),
        );

    kpet(db.path())
        .args(["run", "print-test-cases", "--tree", "tree", "-a", "arch"])
        .assert()
        .success()
        .stdout("normal/suite1/case1\n");
}

#[test]
fn case_with_pattern_run_generate() {
    let db = assets(&[
        (
            "index.yaml",
            &index_with("arches: [arch, other]\ntrees:\n  tree: tree.xml\nsuites:\n  - suite.yaml\n"),
        ),
        (
            "suite.yaml",
            "description: suite1\nmaintainers:\n  - maint1\ncases:\n  - name: case1\n    max_duration_seconds: 600\n    pattern:\n      arches: other\n",
        ),
        ("tree.xml", TREE_XML),
    ]);

    run_generate(db.path())
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)<job>\s*</job>").unwrap());

    kpet(db.path())
        .args(["run", "generate", "--tree", "tree", "-a", "other"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<case name="case1""#));
}
