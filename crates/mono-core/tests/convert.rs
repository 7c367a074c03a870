use anyhow::Result;
use camino::Utf8Path;
use mono_core::{convert, read_json, ConvertOptions, FsTree, MemoryTree, Tree};

fn root_lib_workspace() -> MemoryTree {
    MemoryTree::with_files(&[
        (".gitignore", "node_modules\ndist\n"),
        ("README.md", "# my-lib\n"),
        ("tools/scripts/custom_script.sh", "#!/bin/sh\necho ok\n"),
        (
            "project.json",
            r#"{
  "name": "my-lib",
  "projectType": "library",
  "sourceRoot": "src",
  "targets": {
    "build": {
      "executor": "@nx/js:tsc",
      "options": {
        "main": "src/index.ts",
        "tsConfig": "tsconfig.lib.json"
      }
    }
  }
}"#,
        ),
        ("src/index.ts", "export * from './lib/my-lib';\n"),
        ("src/lib/my-lib.ts", "export function myLib() {}\n"),
        (
            "tsconfig.json",
            r#"{
  "compileOnSave": false,
  "compilerOptions": { "target": "es2022", "strict": true },
  "files": [],
  "references": [{ "path": "./tsconfig.lib.json" }]
}"#,
        ),
        (
            "tsconfig.lib.json",
            r#"{ "extends": "./tsconfig.json", "include": ["src/**/*.ts"] }"#,
        ),
        (
            "libs/other-lib/project.json",
            r#"{ "name": "other-lib", "sourceRoot": "libs/other-lib/src" }"#,
        ),
        ("libs/other-lib/src/index.ts", "export {};\n"),
    ])
}

fn packages_options() -> ConvertOptions {
    ConvertOptions {
        libs_dir: "packages".to_string(),
        ..ConvertOptions::default()
    }
}

#[test]
fn converts_a_root_library_and_preserves_globals() -> Result<()> {
    let mut tree = root_lib_workspace();
    let report = convert(&mut tree, &packages_options())?;

    let moved = report.moved.expect("library should move");
    assert_eq!(moved.name, "my-lib");
    assert_eq!(moved.old_root, ".");
    assert_eq!(moved.new_root, "packages/my-lib");
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);

    let manifest = read_json(&tree, Utf8Path::new("packages/my-lib/project.json"))?;
    assert_eq!(manifest["root"], "packages/my-lib");
    assert_eq!(manifest["sourceRoot"], "packages/my-lib/src");
    assert_eq!(
        manifest["targets"]["build"]["options"]["main"],
        "packages/my-lib/src/index.ts"
    );
    assert_eq!(
        manifest["targets"]["build"]["options"]["tsConfig"],
        "packages/my-lib/tsconfig.lib.json"
    );

    // Sources kept their internal structure under the new root.
    assert!(tree.exists(Utf8Path::new("packages/my-lib/src/lib/my-lib.ts")));
    for old in ["project.json", "src/index.ts", "tsconfig.json", "tsconfig.lib.json"] {
        assert!(!tree.exists(Utf8Path::new(old)), "{old} should have moved");
    }

    // Workspace-global files stayed exactly where they were.
    assert_eq!(tree.read(Utf8Path::new(".gitignore"))?, "node_modules\ndist\n");
    assert_eq!(tree.read(Utf8Path::new("README.md"))?, "# my-lib\n");
    assert_eq!(
        tree.read(Utf8Path::new("tools/scripts/custom_script.sh"))?,
        "#!/bin/sh\necho ok\n"
    );
    Ok(())
}

#[test]
fn extracts_a_compiler_base_the_project_extends() -> Result<()> {
    let mut tree = root_lib_workspace();
    convert(&mut tree, &packages_options())?;

    let base = read_json(&tree, Utf8Path::new("tsconfig.base.json"))?;
    assert_eq!(base["compileOnSave"], false);
    assert_eq!(base["compilerOptions"]["target"], "es2022");

    let overlay = read_json(&tree, Utf8Path::new("packages/my-lib/tsconfig.json"))?;
    assert_eq!(overlay["extends"], "../../tsconfig.base.json");
    assert!(overlay.get("compilerOptions").is_none());
    // Project-specific structure survives in the override.
    assert_eq!(overlay["references"][0]["path"], "./tsconfig.lib.json");
    Ok(())
}

#[test]
fn converts_a_root_application_with_lint_and_test_configs() -> Result<()> {
    let mut tree = MemoryTree::with_files(&[
        (
            "project.json",
            r#"{
  "name": "demo",
  "projectType": "application",
  "sourceRoot": "src",
  "targets": {
    "build": {
      "executor": "@nx/webpack:webpack",
      "options": {
        "main": "src/main.tsx",
        "index": "index.html",
        "tsConfig": "tsconfig.app.json",
        "webpackConfig": "webpack.config.js"
      }
    },
    "test": {
      "executor": "@nx/jest:jest",
      "options": { "jestConfig": "jest.config.json" }
    }
  }
}"#,
        ),
        ("src/main.tsx", "render();\n"),
        ("index.html", "<!doctype html>\n"),
        ("tsconfig.json", r#"{ "compilerOptions": { "jsx": "react-jsx" } }"#),
        ("tsconfig.app.json", r#"{ "extends": "./tsconfig.json", "include": ["src"] }"#),
        (
            ".eslintrc.json",
            r#"{
  "root": true,
  "extends": ["plugin:react/recommended"],
  "plugins": ["react"],
  "rules": { "no-console": "error" },
  "overrides": [{ "files": ["*.tsx"], "rules": {} }]
}"#,
        ),
        (
            "jest.config.json",
            r#"{
  "displayName": "demo",
  "testEnvironment": "jsdom",
  "transform": { "^.+\\.tsx?$": "ts-jest" },
  "coverageDirectory": "coverage"
}"#,
        ),
        ("webpack.config.js", "module.exports = (config) => config;\n"),
    ]);

    let report = convert(&mut tree, &ConvertOptions::default())?;
    let moved = report.moved.expect("application should move");
    assert_eq!(moved.new_root, "apps/demo");

    let manifest = read_json(&tree, Utf8Path::new("apps/demo/project.json"))?;
    assert_eq!(manifest["sourceRoot"], "apps/demo/src");
    assert_eq!(manifest["targets"]["build"]["options"]["main"], "apps/demo/src/main.tsx");
    assert_eq!(
        manifest["targets"]["build"]["options"]["webpackConfig"],
        "apps/demo/webpack.config.js"
    );
    assert_eq!(
        manifest["targets"]["test"]["options"]["jestConfig"],
        "apps/demo/jest.config.json"
    );

    // Lint: shared settings in the base, the override extends it as an array.
    let lint_base = read_json(&tree, Utf8Path::new(".eslintrc.base.json"))?;
    assert_eq!(lint_base["rules"]["no-console"], "error");
    assert_eq!(lint_base["extends"], serde_json::json!(["plugin:react/recommended"]));
    let lint = read_json(&tree, Utf8Path::new("apps/demo/.eslintrc.json"))?;
    assert_eq!(lint["extends"], serde_json::json!(["../../.eslintrc.base.json"]));
    assert!(lint.get("overrides").is_some());
    assert!(lint.get("rules").is_none());

    // Test runner: defaults in the preset, identity stays with the project.
    let preset = read_json(&tree, Utf8Path::new("jest.preset.json"))?;
    assert_eq!(preset["testEnvironment"], "jsdom");
    assert!(preset["transform"].is_object());
    let jest = read_json(&tree, Utf8Path::new("apps/demo/jest.config.json"))?;
    assert_eq!(jest["preset"], "../../jest.preset.json");
    assert_eq!(jest["displayName"], "demo");

    // Opaque bundler config relocates verbatim.
    assert_eq!(
        tree.read(Utf8Path::new("apps/demo/webpack.config.js"))?,
        "module.exports = (config) => config;\n"
    );
    assert!(tree.exists(Utf8Path::new("tsconfig.base.json")));
    Ok(())
}

#[test]
fn nested_projects_stay_byte_identical() -> Result<()> {
    let nested_manifest = r#"{ "name": "inner-lib", "sourceRoot": "inner/my-lib/src" }"#;
    let nested_source = "export const inner = 1;\n";
    let nested_tsconfig = r#"{ "include": ["src/**/*.ts"] }"#;
    let mut tree = MemoryTree::with_files(&[
        (
            "project.json",
            r#"{ "name": "demo", "projectType": "application", "sourceRoot": "src" }"#,
        ),
        ("src/main.ts", "boot();\n"),
        ("inner/my-lib/project.json", nested_manifest),
        ("inner/my-lib/src/index.ts", nested_source),
        ("inner/my-lib/tsconfig.json", nested_tsconfig),
    ]);

    let report = convert(&mut tree, &ConvertOptions::default())?;
    assert_eq!(report.moved.expect("moved").new_root, "apps/demo");

    assert_eq!(tree.read(Utf8Path::new("inner/my-lib/project.json"))?, nested_manifest);
    assert_eq!(tree.read(Utf8Path::new("inner/my-lib/src/index.ts"))?, nested_source);
    assert_eq!(tree.read(Utf8Path::new("inner/my-lib/tsconfig.json"))?, nested_tsconfig);
    assert!(tree.exists(Utf8Path::new("apps/demo/src/main.ts")));
    Ok(())
}

#[test]
fn a_second_run_is_a_no_op() -> Result<()> {
    let mut tree = root_lib_workspace();
    let first = convert(&mut tree, &packages_options())?;
    assert!(first.moved.is_some());

    let snapshot: Vec<(String, String)> = tree
        .files()
        .into_iter()
        .map(|path| {
            let contents = tree.read(&path).expect("readable");
            (path.into_string(), contents)
        })
        .collect();

    let second = convert(&mut tree, &packages_options())?;
    assert!(second.moved.is_none());
    assert!(second.warnings.is_empty());

    let after: Vec<(String, String)> = tree
        .files()
        .into_iter()
        .map(|path| {
            let contents = tree.read(&path).expect("readable");
            (path.into_string(), contents)
        })
        .collect();
    assert_eq!(snapshot, after);
    Ok(())
}

#[test]
fn existing_base_config_gains_only_missing_fields() -> Result<()> {
    let mut tree = root_lib_workspace();
    tree.write(
        Utf8Path::new("tsconfig.base.json"),
        r#"{ "compilerOptions": { "target": "es2015", "baseUrl": "." } }"#,
    )?;

    convert(&mut tree, &packages_options())?;

    let base = read_json(&tree, Utf8Path::new("tsconfig.base.json"))?;
    // The base keeps its own values and gains what the project contributed.
    assert_eq!(base["compilerOptions"]["target"], "es2015");
    assert_eq!(base["compilerOptions"]["baseUrl"], ".");
    assert_eq!(base["compilerOptions"]["strict"], true);
    assert_eq!(base["compileOnSave"], false);

    let overlay = read_json(&tree, Utf8Path::new("packages/my-lib/tsconfig.json"))?;
    assert_eq!(overlay["extends"], "../../tsconfig.base.json");
    Ok(())
}

#[test]
fn malformed_artifacts_relocate_verbatim_with_a_warning() -> Result<()> {
    let mut tree = MemoryTree::with_files(&[
        (
            "project.json",
            r#"{ "name": "my-lib", "projectType": "library", "sourceRoot": "src" }"#,
        ),
        ("src/index.ts", "export {};\n"),
        ("tsconfig.json", "{ \"compilerOptions\": \n"),
    ]);

    let report = convert(&mut tree, &ConvertOptions::default())?;
    assert!(report.moved.is_some());
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.path == Utf8Path::new("tsconfig.json")));

    // Copied as-is to the new location, and no base was derived from it.
    assert_eq!(
        tree.read(Utf8Path::new("libs/my-lib/tsconfig.json"))?,
        "{ \"compilerOptions\": \n"
    );
    assert!(!tree.exists(Utf8Path::new("tsconfig.base.json")));
    Ok(())
}

#[test]
fn workspace_metadata_tracks_the_new_location() -> Result<()> {
    let mut tree = root_lib_workspace();
    tree.write(
        Utf8Path::new("workspace.json"),
        r#"{ "version": 2, "projects": { "my-lib": ".", "other-lib": "libs/other-lib" } }"#,
    )?;
    tree.write(
        Utf8Path::new("package.json"),
        r#"{ "name": "workspace", "workspaces": ["libs/*"] }"#,
    )?;

    convert(&mut tree, &packages_options())?;

    let workspace = read_json(&tree, Utf8Path::new("workspace.json"))?;
    assert_eq!(workspace["projects"]["my-lib"], "packages/my-lib");
    assert_eq!(workspace["projects"]["other-lib"], "libs/other-lib");

    let package = read_json(&tree, Utf8Path::new("package.json"))?;
    assert_eq!(
        package["workspaces"],
        serde_json::json!(["libs/*", "packages/*"])
    );
    Ok(())
}

#[test]
fn converts_a_workspace_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut tree = FsTree::new(dir.path());
    tree.write(
        Utf8Path::new("project.json"),
        r#"{
  "name": "demo",
  "projectType": "application",
  "sourceRoot": "src",
  "targets": {
    "build": { "executor": "@nx/js:tsc", "options": { "main": "src/main.ts" } }
  }
}"#,
    )?;
    tree.write(Utf8Path::new("src/main.ts"), "boot();\n")?;
    tree.write(Utf8Path::new("README.md"), "# demo\n")?;

    let report = convert(&mut tree, &ConvertOptions::default())?;
    assert_eq!(report.moved.expect("moved").new_root, "apps/demo");

    assert!(dir.path().join("apps/demo/src/main.ts").exists());
    assert!(dir.path().join("README.md").exists());
    // The old source directory is gone entirely, not left behind empty.
    assert!(!dir.path().join("src").exists());

    let manifest = read_json(&tree, Utf8Path::new("apps/demo/project.json"))?;
    assert_eq!(manifest["sourceRoot"], "apps/demo/src");
    Ok(())
}
