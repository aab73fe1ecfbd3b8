// tests/copy_tasks.rs

use std::error::Error;
use std::sync::Arc;

use assetflow::exec::ProgressReporter;
use assetflow::tasks::{BuildTask, CopyTask, FileSet};
use assetflow_test_utils::{init_tracing, RecordingNotifier, SiteBuilder};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn scripts_are_copied_with_relative_paths() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .source("js/app.js", "console.log('app');\n")
        .source("js/vendor/lib.js", "var lib = 1;\n")
        .source("js/notes.txt", "not a script\n")
        .build();
    let ctx = site.context(Arc::new(RecordingNotifier::new()));
    let task = CopyTask::scripts();

    let report = task.execute(&ctx, ProgressReporter::detached(task.id())).await?;

    assert_eq!(report.written.len(), 2);
    assert_eq!(site.read_output("js/app.js"), "console.log('app');\n");
    assert_eq!(site.read_output("js/vendor/lib.js"), "var lib = 1;\n");
    assert!(!site.output_exists("js/notes.txt"));

    Ok(())
}

#[tokio::test]
async fn fonts_copy_every_file_and_skips_identical_outputs() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .source("fonts/icons.woff", "woff-bytes")
        .source("fonts/sub/icons.ttf", "ttf-bytes")
        .build();
    let ctx = site.context(Arc::new(RecordingNotifier::new()));
    let task = CopyTask::fonts();

    let first = task.execute(&ctx, ProgressReporter::detached(task.id())).await?;
    assert_eq!(first.written.len(), 2);
    assert_eq!(first.unchanged, 0);

    let second = task.execute(&ctx, ProgressReporter::detached(task.id())).await?;
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged, 2);

    site.write_source("fonts/icons.woff", "new-woff-bytes");
    let third = task.execute(&ctx, ProgressReporter::detached(task.id())).await?;
    assert_eq!(third.written, vec![site.output_path("fonts/icons.woff")]);
    assert_eq!(site.read_output("fonts/icons.woff"), "new-woff-bytes");

    Ok(())
}

#[tokio::test]
async fn missing_source_dir_copies_nothing() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new().build();
    let ctx = site.context(Arc::new(RecordingNotifier::new()));
    let task = CopyTask::fonts();

    let report = task.execute(&ctx, ProgressReporter::detached(task.id())).await?;
    assert!(report.written.is_empty());
    assert!(!site.output_exists("fonts"));

    Ok(())
}

#[tokio::test]
async fn single_star_stays_within_one_directory() -> TestResult {
    let site = SiteBuilder::new()
        .source("a.html", "")
        .source("b.html", "")
        .source("partials/nav.html", "")
        .build();

    let set = FileSet::resolve(&site.paths().source_root, "*.html").await?;
    let names: Vec<_> = set.entries().iter().map(|e| e.relative.clone()).collect();
    assert_eq!(names, vec![std::path::PathBuf::from("a.html"), "b.html".into()]);

    let deep = FileSet::resolve(&site.paths().source_root, "**/*.html").await?;
    assert_eq!(deep.len(), 3);

    Ok(())
}
