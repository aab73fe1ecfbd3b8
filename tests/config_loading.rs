// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use assetflow::config::{load_and_validate, load_or_default, ConfigFile, RawConfigFile};
use assetflow::errors::PipelineError;
use assetflow::types::TriggerWhileRunningBehaviour;
use assetflow_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn defaults_match_fixed_layout() -> TestResult {
    init_tracing();

    let cfg = ConfigFile::try_from(RawConfigFile::default())?;
    let paths = cfg.paths();

    assert_eq!(paths.source_root, PathBuf::from("./app/"));
    assert_eq!(paths.output_root, PathBuf::from("./public/"));
    assert_eq!(paths.sass_source(), PathBuf::from("./app/sass"));
    assert_eq!(paths.css_output(), PathBuf::from("./public/css"));
    assert_eq!(paths.js_output(), PathBuf::from("./public/js"));
    assert_eq!(paths.font_output(), PathBuf::from("./public/fonts"));
    assert_eq!(paths.dependency_dir, PathBuf::from("./node_modules"));
    assert_eq!(cfg.server().addr(), "127.0.0.1:3000");
    assert_eq!(
        cfg.watch().triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
    assert_eq!(cfg.watch().queue_length, 1);

    Ok(())
}

#[test]
fn partial_file_overrides_only_given_keys() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("assetflow.toml");
    fs::write(
        &path,
        r#"
[paths]
output_root = "./dist/"

[server]
port = 8080

[watch]
triggered_while_running_behaviour = "cancel"
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.paths().output_root, PathBuf::from("./dist/"));
    assert_eq!(cfg.paths().source_root, PathBuf::from("./app/"));
    assert_eq!(cfg.server().port, 8080);
    assert_eq!(cfg.server().host, "127.0.0.1");
    assert_eq!(
        cfg.watch().triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Cancel
    );

    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("assetflow.toml");
    fs::write(&path, "[paths]\nsass = \"styles\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, PipelineError::Toml(_)), "got {err:?}");
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() {
    let err = load_or_default(Some(std::path::Path::new("definitely/not/here.toml"))).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)), "got {err:?}");
}

#[test]
fn same_source_and_output_root_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("assetflow.toml");
    fs::write(
        &path,
        "[paths]\nsource_root = \"./site/\"\noutput_root = \"site\"\n",
    )?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ref m) if m.contains("must differ")), "got {err:?}");
    Ok(())
}

#[test]
fn nested_roots_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("assetflow.toml");
    fs::write(
        &path,
        "[paths]\nsource_root = \"./app/\"\noutput_root = \"./app/public\"\n",
    )?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(
        matches!(err, PipelineError::Config(ref m) if m.contains("must not contain")),
        "got {err:?}"
    );
    Ok(())
}

#[test]
fn absolute_sub_dir_and_zero_queue_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;

    let abs = dir.path().join("abs.toml");
    fs::write(&abs, "[paths]\nsass_dir = \"/etc/sass\"\n")?;
    let err = load_and_validate(&abs).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ref m) if m.contains("sass_dir")), "got {err:?}");

    let zero = dir.path().join("zero.toml");
    fs::write(&zero, "[watch]\nqueue_length = 0\n")?;
    let err = load_and_validate(&zero).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ref m) if m.contains("queue_length")), "got {err:?}");

    Ok(())
}

#[test]
fn empty_path_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("assetflow.toml");
    fs::write(&path, "[paths]\njs_dir = \"\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ref m) if m.contains("js_dir")), "got {err:?}");
    Ok(())
}
