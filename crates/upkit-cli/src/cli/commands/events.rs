//! Prints listener events until the request settles.

use std::io::Write;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;
use upkit_core::callback::UpdateEvent;

const PROGRESS_INTERVAL_MS: u128 = 500;

/// Prints progress and returns the first terminal event (`None` if the channel closed first).
pub(crate) async fn follow(rx: &mut UnboundedReceiver<UpdateEvent>) -> Option<UpdateEvent> {
    let mut last_print: Option<Instant> = None;
    while let Some(event) = rx.recv().await {
        match &event {
            UpdateEvent::DownloadStarted => println!("Downloading..."),
            UpdateEvent::DownloadProgress { current, total } => {
                let now = Instant::now();
                let due = last_print
                    .map(|t| now.duration_since(t).as_millis() >= PROGRESS_INTERVAL_MS)
                    .unwrap_or(true);
                let finished = total.map(|t| *current >= t).unwrap_or(false);
                if due || finished {
                    print_progress(*current, *total);
                    last_print = Some(now);
                }
            }
            UpdateEvent::DownloadComplete(path) => {
                println!();
                tracing::debug!(path = %path.display(), "download complete");
            }
            _ => {}
        }
        if event.is_terminal() {
            return Some(event);
        }
    }
    None
}

fn print_progress(current: u64, total: Option<u64>) {
    let done_mib = current as f64 / 1_048_576.0;
    match total {
        Some(total) if total > 0 => {
            let total_mib = total as f64 / 1_048_576.0;
            let pct = current as f64 / total as f64 * 100.0;
            print!("\r  {:.1} / {:.1} MiB ({:.1}%)  ", done_mib, total_mib, pct);
        }
        _ => print!("\r  {:.1} MiB  ", done_mib),
    }
    let _ = std::io::stdout().flush();
}
