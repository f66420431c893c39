//! Process wiring: watch setup, the two loops, and shutdown

use tokio::io::BufReader;

use rtest_core::{
    build_watch_set, load_config, run_manual_trigger, signal_channels, CliOverrides, Dispatcher,
    NotifyWatcher, ShutdownCoordinator, TestCommand,
};

/// Run until SIGINT/SIGTERM.
///
/// Startup failures (configuration, directory walk, watch registration) are
/// returned before anything is watched. After that the filesystem event loop
/// and the manual trigger loop run side by side; the event loop dying does
/// not stop the process.
///
/// # Errors
///
/// Returns error if configuration cannot be loaded, the initial watch set
/// cannot be built, or signal handlers cannot be installed.
pub async fn run(cli: CliOverrides) -> anyhow::Result<()> {
    let config = load_config(cli).await?;
    tracing::debug!(
        root = %config.root.display(),
        program = %config.command.program,
        extra_args = ?config.extra_args,
        "configuration loaded"
    );

    let (watcher, streams) = NotifyWatcher::new()?;
    let watch_set = build_watch_set(&config.root, watcher)?;
    tracing::debug!(dirs = watch_set.len(), "initial watches added");

    let (mut sigint, mut sigterm) = signal_channels().await?;
    let coordinator = ShutdownCoordinator::default();
    let runner = TestCommand::from_config(&config);

    let dispatcher = Dispatcher::new(watch_set, runner.clone());
    coordinator
        .register_task(tokio::spawn(async move {
            if dispatcher.run(streams).await.is_err() {
                tracing::warn!("no longer watching for changes; press enter to run tests");
            }
        }))
        .await;

    if config.manual_trigger {
        let root = config.root.clone();
        coordinator
            .register_task(tokio::spawn(async move {
                let stdin = BufReader::new(tokio::io::stdin());
                run_manual_trigger(stdin, &runner, &root).await;
            }))
            .await;
    }

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }

    tracing::info!("Exiting");
    coordinator.shutdown().await;
    Ok(())
}
