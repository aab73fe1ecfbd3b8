// tests/stylesheet_compile.rs

use std::error::Error;
use std::sync::Arc;

use assetflow::exec::ProgressReporter;
use assetflow::tasks::stylesheet::compile_scss;
use assetflow::tasks::{BuildTask, StylesheetCompile};
use assetflow::types::TaskId;
use assetflow_test_utils::{init_tracing, RecordingNotifier, SiteBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn progress() -> ProgressReporter {
    ProgressReporter::detached(TaskId::StylesheetCompile)
}

#[tokio::test]
async fn compiles_top_level_stylesheets_into_css_dir() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .source("sass/main.scss", "$c: #ff0000;\nbody { color: $c; }\n")
        .source("sass/print.scss", "p { margin: 0; }\n")
        .build();
    let notifier = RecordingNotifier::new();
    let ctx = site.context(Arc::new(notifier.clone()));

    let report = StylesheetCompile.execute(&ctx, progress()).await?;

    assert_eq!(report.written.len(), 2);
    assert_eq!(report.failed, 0);
    let css = site.read_output("css/main.css");
    assert!(css.contains("body"), "{css}");
    assert!(css.contains("color: #ff0000") || css.contains("color: red"), "{css}");
    assert!(!css.contains("$c"));
    assert!(site.output_exists("css/print.css"));
    assert!(notifier.notifications().is_empty());

    Ok(())
}

#[tokio::test]
async fn broken_stylesheet_is_notified_and_others_still_compile() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .source("sass/broken.scss", "body { color: $undefined-variable; }\n")
        .source("sass/ok.scss", "a { color: blue; }\n")
        .build();
    let notifier = RecordingNotifier::new();
    let ctx = site.context(Arc::new(notifier.clone()));

    let report = StylesheetCompile.execute(&ctx, progress()).await?;

    assert_eq!(report.failed, 1);
    assert!(site.output_exists("css/ok.css"));
    assert!(!site.output_exists("css/broken.css"));

    let seen = notifier.notifications();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path.as_deref(), Some(site.source_path("sass/broken.scss").as_path()));
    assert!(!seen[0].message.is_empty());

    Ok(())
}

#[tokio::test]
async fn partials_are_imported_but_not_emitted() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .source("sass/_colors.scss", "$brand: #123456;\n")
        .source("sass/main.scss", "@import 'colors';\nh1 { color: $brand; }\n")
        .build();
    let ctx = site.context(Arc::new(RecordingNotifier::new()));

    StylesheetCompile.execute(&ctx, progress()).await?;

    assert!(site.read_output("css/main.css").contains("#123456"));
    assert!(!site.output_exists("css/_colors.css"));
    assert!(!site.output_exists("css/colors.css"));

    Ok(())
}

#[tokio::test]
async fn imports_resolve_against_dependency_dir() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .dependency("theme/_vars.scss", "$gutter: 12px;\n")
        .source("sass/main.scss", "@import 'theme/vars';\n.row { margin: $gutter; }\n")
        .build();
    let notifier = RecordingNotifier::new();
    let ctx = site.context(Arc::new(notifier.clone()));

    StylesheetCompile.execute(&ctx, progress()).await?;

    assert!(notifier.notifications().is_empty(), "{:?}", notifier.notifications());
    assert!(site.read_output("css/main.css").contains("12px"));

    Ok(())
}

#[tokio::test]
async fn missing_sass_dir_is_not_an_error() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new().build();
    let ctx = site.context(Arc::new(RecordingNotifier::new()));

    let report = StylesheetCompile.execute(&ctx, progress()).await?;
    assert!(report.written.is_empty());

    Ok(())
}

#[test]
fn compile_scss_reports_syntax_errors() {
    let err = compile_scss("a { color: ".to_string(), &[]).unwrap_err();
    assert!(!err.is_empty());
}
