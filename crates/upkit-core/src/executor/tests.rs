//! Tests for the thread-backed executor.

use std::path::Path;
use std::sync::Arc;

use super::{CheckTask, DownloadTask, Executor, Pending, UpdateExecutor};
use crate::builder::UpdateConfig;
use crate::callback::{CheckCallback, DownloadCallback, UpdateEvent};
use crate::checksum;
use crate::config::StrategyConfig;
use crate::error::UpdateError;
use crate::install::Installer;
use crate::model::Update;
use crate::test_support::{
    drain, observed_builder, settings, update, FnCheckWorker, GatedCheckWorker,
    WriteDownloadWorker,
};
use crate::updater::Updater;
use crate::worker::{CheckOutcome, TaskKind};

fn check_task(executor: &Arc<UpdateExecutor>, config: &Arc<UpdateConfig>) -> CheckTask {
    let updater = Updater::new(executor.clone() as Arc<dyn Executor>);
    CheckTask::new(Arc::clone(config), CheckCallback::new(Arc::clone(config), updater))
}

#[test]
fn check_runs_in_background_and_releases_slot() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder
        .check_worker(Arc::new(FnCheckWorker(|| -> Result<CheckOutcome, UpdateError> {
            Ok(CheckOutcome::Available(update("3.0")))
        })))
        .build()
        .unwrap();

    let handle = executor.check(check_task(&executor, &config)).unwrap();
    let outcome = handle.wait_blocking().unwrap();

    assert_eq!(outcome, CheckOutcome::Available(update("3.0")));
    assert!(!executor.is_running(TaskKind::Check));
    assert_eq!(drain(&mut rx), vec![UpdateEvent::UpdateAvailable(update("3.0"))]);
}

#[test]
fn second_check_is_handed_back_while_first_runs() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let (worker, release) = GatedCheckWorker::new();
    let (builder, _rx) = observed_builder(settings(dir.path()));
    let config = builder.check_worker(Arc::new(worker)).build().unwrap();

    let first = executor.check(check_task(&executor, &config)).unwrap();
    assert!(executor.is_running(TaskKind::Check));
    assert!(!executor.is_running(TaskKind::Download));

    let rejected = executor.check(check_task(&executor, &config));
    assert!(rejected.is_err());

    release.send(()).unwrap();
    assert_eq!(first.wait_blocking().unwrap(), CheckOutcome::UpToDate);
    assert!(!executor.is_running(TaskKind::Check));

    // Slot is reusable once idle.
    let again = executor.check(check_task(&executor, &config)).unwrap();
    release.send(()).unwrap();
    again.wait_blocking().unwrap();
}

#[test]
fn panicking_worker_reports_error_and_frees_slot() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder
        .check_worker(Arc::new(FnCheckWorker(|| -> Result<CheckOutcome, UpdateError> {
            panic!("worker bug")
        })))
        .build()
        .unwrap();

    let err = executor
        .check(check_task(&executor, &config))
        .unwrap()
        .wait_blocking()
        .unwrap_err();

    assert!(matches!(err, UpdateError::WorkerPanicked(TaskKind::Check)));
    assert!(!executor.is_running(TaskKind::Check));
    assert_eq!(
        drain(&mut rx),
        vec![UpdateEvent::CheckFailed("check task panicked".to_string())]
    );
}

#[test]
fn download_verifies_and_reports_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let body = b"hello\n";
    let mut u = update("3.0");
    u.size = Some(body.len() as u64);
    u.sha256 = Some(checksum_of(body));

    let executor = Arc::new(UpdateExecutor::new());
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder
        .download_worker(Arc::new(WriteDownloadWorker::new(body)))
        .build()
        .unwrap();
    let callback = DownloadCallback::new(Arc::clone(&config), u.clone());

    let path = executor
        .download(DownloadTask::new(u.clone(), Arc::clone(&config), callback))
        .unwrap()
        .wait_blocking()
        .unwrap();

    assert_eq!(path, dir.path().join("update-3.0.pkg"));
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert!(!executor.is_running(TaskKind::Download));
    assert_eq!(
        drain(&mut rx),
        vec![
            UpdateEvent::DownloadStarted,
            UpdateEvent::DownloadProgress {
                current: 6,
                total: Some(6)
            },
            UpdateEvent::DownloadComplete(path.clone()),
            UpdateEvent::InstallReady {
                update: u,
                file: path
            },
        ]
    );
}

#[test]
fn download_failing_verification_is_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let mut u = update("3.0");
    u.sha256 = Some("00".repeat(32));

    let executor = Arc::new(UpdateExecutor::new());
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder
        .download_worker(Arc::new(WriteDownloadWorker::new(b"tampered")))
        .build()
        .unwrap();
    let callback = DownloadCallback::new(Arc::clone(&config), u.clone());

    let err = executor
        .download(DownloadTask::new(u, Arc::clone(&config), callback))
        .unwrap()
        .wait_blocking()
        .unwrap_err();

    assert!(matches!(err, UpdateError::Integrity(_)));
    assert!(!dir.path().join("update-3.0.pkg").exists());
    let events = drain(&mut rx);
    assert!(
        matches!(events.last(), Some(UpdateEvent::DownloadFailed(msg)) if msg.contains("sha256"))
    );
}

#[test]
fn check_and_download_run_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let (worker, release) = GatedCheckWorker::new();
    let (builder, _rx) = observed_builder(settings(dir.path()));
    let config = builder
        .check_worker(Arc::new(worker))
        .download_worker(Arc::new(WriteDownloadWorker::new(b"pkg")))
        .build()
        .unwrap();

    let check = executor.check(check_task(&executor, &config)).unwrap();
    let u = update("4.0");
    let callback = DownloadCallback::new(Arc::clone(&config), u.clone());
    let download = executor
        .download(DownloadTask::new(u, Arc::clone(&config), callback))
        .unwrap();

    assert!(download.wait_blocking().is_ok());
    assert!(executor.is_running(TaskKind::Check));
    release.send(()).unwrap();
    check.wait_blocking().unwrap();
}

struct PanickingInstaller;

impl Installer for PanickingInstaller {
    fn install(&self, _update: &Update, _file: &Path) -> Result<(), UpdateError> {
        panic!("installer bug")
    }
}

#[test]
fn panicking_installer_still_ends_with_download_failed() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder
        .download_worker(Arc::new(WriteDownloadWorker::new(b"pkg")))
        .installer(Arc::new(PanickingInstaller))
        .strategy(StrategyConfig {
            auto_download: false,
            auto_install: true,
        })
        .build()
        .unwrap();
    let u = update("5.0");
    let callback = DownloadCallback::new(Arc::clone(&config), u.clone());

    let err = executor
        .download(DownloadTask::new(u, Arc::clone(&config), callback))
        .unwrap()
        .wait_blocking()
        .unwrap_err();

    assert!(matches!(err, UpdateError::WorkerPanicked(TaskKind::Download)));
    assert!(!executor.is_running(TaskKind::Download));
    let events = drain(&mut rx);
    let path = dir.path().join("update-5.0.pkg");
    assert!(events.contains(&UpdateEvent::DownloadComplete(path)));
    assert_eq!(
        events.last(),
        Some(&UpdateEvent::DownloadFailed(
            "download task panicked".to_string()
        ))
    );
}

#[test]
fn panicking_check_listener_still_reports_failure() {
    use crate::callback::CheckListener;

    struct Exploding;
    impl CheckListener for Exploding {
        fn no_update(&self) {
            panic!("listener bug")
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let config = crate::builder::UpdateBuilder::new(settings(dir.path()))
        .check_worker(Arc::new(FnCheckWorker(|| -> Result<CheckOutcome, UpdateError> {
            Ok(CheckOutcome::UpToDate)
        })))
        .check_listener(Arc::new(Exploding))
        .build()
        .unwrap();

    let err = executor
        .check(check_task(&executor, &config))
        .unwrap()
        .wait_blocking()
        .unwrap_err();

    assert!(matches!(err, UpdateError::WorkerPanicked(TaskKind::Check)));
    assert!(!executor.is_running(TaskKind::Check));
}

#[test]
fn task_dropped_before_running_reports_worker_lost() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder.build().unwrap();
    let u = update("6.0");
    let callback = DownloadCallback::new(Arc::clone(&config), u.clone());

    drop(Pending::new(
        TaskKind::Download,
        DownloadTask::new(u, Arc::clone(&config), callback),
    ));

    assert_eq!(
        drain(&mut rx),
        vec![UpdateEvent::DownloadFailed(
            "download task exited without a result".to_string()
        )]
    );
}

#[test]
fn task_taken_from_pending_is_not_abandoned() {
    let dir = tempfile::tempdir().unwrap();
    let executor = Arc::new(UpdateExecutor::new());
    let (builder, mut rx) = observed_builder(settings(dir.path()));
    let config = builder.build().unwrap();

    let mut pending = Pending::new(TaskKind::Check, check_task(&executor, &config));
    let task = pending.take();
    drop(pending);

    assert!(task.is_some());
    assert!(drain(&mut rx).is_empty());
}

fn checksum_of(body: &[u8]) -> String {
    let f = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(f.path(), body).unwrap();
    checksum::sha256_path(f.path()).unwrap()
}
