// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::dag::Scheduler;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::{PipelineError, Result};
use crate::exec::RealExecutorBackend;
use crate::pipeline::Pipeline;
use crate::server::ReloadHub;
use crate::tasks::{LogNotifier, TaskContext, TaskRegistry};
use crate::watch::{compile_bindings, spawn_watcher, standard_bindings, validate_binding_order};

/// High-level entry point used by `main.rs`.
///
/// Loads the configuration, then either prints the dry-run report or runs
/// the selected pipeline until Ctrl-C (or a fatal error).
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))?;
    let pipeline = Pipeline::from(args.command());

    if args.dry_run {
        print_dry_run(&cfg, pipeline)?;
        return Ok(());
    }

    let ctx = TaskContext::new(Arc::new(cfg), ReloadHub::new(), Arc::new(LogNotifier));
    run_pipeline(pipeline, ctx, TaskRegistry::standard(), RuntimeOptions::default()).await
}

/// Run `pipeline` with the given context and task implementations.
///
/// This wires together:
/// - build graph / scheduler / queue / runtime
/// - executor
/// - (watch pipeline only) the file watcher
/// - Ctrl-C handling
/// - the startup triggers for every task of the pipeline
pub async fn run_pipeline(
    pipeline: Pipeline,
    ctx: TaskContext,
    registry: TaskRegistry,
    options: RuntimeOptions,
) -> Result<()> {
    let graph = pipeline.graph()?;
    info!(
        pipeline = pipeline.name(),
        order = ?graph.topological_order(),
        "starting pipeline"
    );

    let watch_cfg = ctx.config().watch().clone();
    let source_root = ctx.paths().source_root.clone();
    let bindings = standard_bindings(ctx.paths());

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone(), registry, Arc::new(ctx));

    let _watcher_handle = if pipeline.watches() {
        validate_binding_order(&bindings, &graph)?;
        let compiled = compile_bindings(&bindings)?;
        Some(spawn_watcher(source_root, compiled, rt_tx.clone())?)
    } else {
        None
    };

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    for &task in pipeline.tasks() {
        rt_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::Manual,
            })
            .await
            .map_err(|e| PipelineError::Other(anyhow::anyhow!("runtime channel closed: {e}")))?;
    }

    let scheduler = Scheduler::new(graph);
    let core = CoreRuntime::new(
        scheduler,
        watch_cfg.triggered_while_running_behaviour,
        watch_cfg.queue_length,
        options,
    );

    let runtime = Runtime::new(core, rt_rx, executor);
    runtime.run().await
}

/// Dry-run output: resolved paths, task order and watch bindings.
fn print_dry_run(cfg: &ConfigFile, pipeline: Pipeline) -> Result<()> {
    let graph = pipeline.graph()?;
    let paths = cfg.paths();

    println!("assetflow dry-run ({})", pipeline.name());
    println!("  paths.source_root = {}", paths.source_root.display());
    println!("  paths.output_root = {}", paths.output_root.display());
    println!("  paths.dependency_dir = {}", paths.dependency_dir.display());
    println!("  server = http://{}", cfg.server().addr());
    println!(
        "  watch.triggered_while_running_behaviour = {:?}",
        cfg.watch().triggered_while_running_behaviour
    );
    println!("  watch.queue_length = {}", cfg.watch().queue_length);
    println!();

    println!("tasks ({}):", graph.topological_order().len());
    for task in graph.topological_order() {
        println!("  - {task}");
        let deps = graph.dependencies_of(*task);
        if !deps.is_empty() {
            let names: Vec<&str> = deps.iter().map(|d| d.name()).collect();
            println!("      after: {names:?}");
        }
        if task.is_long_lived() {
            println!("      long_lived: true");
        }
    }

    if pipeline.watches() {
        let bindings = standard_bindings(paths);
        validate_binding_order(&bindings, &graph)?;
        println!();
        println!("watch bindings ({}):", bindings.len());
        for binding in &bindings {
            let names: Vec<&str> = binding.tasks.iter().map(|t| t.name()).collect();
            println!("  - {} -> {names:?}", binding.pattern);
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
