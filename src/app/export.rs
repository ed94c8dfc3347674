//! Export logic: join pending decodes, capture, encode, write

use super::App;
use crate::card::{self, CaptureOptions, CardState};
use crate::constants::DECODE_JOIN_TIMEOUT_SECS;
use crate::types::ExportStatus;
use crate::utils::export_filename;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fan-in on uploads still decoding, bounded so a wedged decode can never
/// stall an export. On expiry the capture proceeds with whatever has landed.
async fn join_pending(handles: Vec<tokio::task::JoinHandle<()>>, timeout: Duration) {
    if handles.is_empty() {
        return;
    }
    let join = futures::future::join_all(handles);
    if tokio::time::timeout(timeout, join).await.is_err() {
        warn!(
            timeout_secs = timeout.as_secs(),
            "Uploads still decoding, capturing without them"
        );
    }
}

/// Capture a snapshot and write the PNG. Capture runs before any filesystem
/// IO, so a failed capture leaves nothing behind.
fn run_export(
    card: &CardState,
    opts: &CaptureOptions,
    fontdb: &Arc<resvg::usvg::fontdb::Database>,
    dir: &Path,
) -> Result<PathBuf, String> {
    let img = card::capture(card, opts, fontdb)?;
    std::fs::create_dir_all(dir).map_err(|e| format!("could not create {}: {e}", dir.display()))?;
    let path = dir.join(export_filename());
    img.save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| format!("PNG write failed: {e}"))?;
    Ok(path)
}

impl App {
    /// Kick off the one-shot export. Idle -> Capturing; the task reports back
    /// through the shared status slot. Not cancellable once started.
    pub fn start_export(&mut self, ctx: &egui::Context) {
        {
            let mut status = self.export_status.lock().unwrap();
            if *status == ExportStatus::Capturing {
                return;
            }
            *status = ExportStatus::Capturing;
        }

        let card = self.card.clone();
        let status = self.export_status.clone();
        let fontdb = self.fontdb.clone();
        let opts = self.capture_options;
        let dir = self.export_path.clone();
        let ctx = ctx.clone();
        let pending: Vec<_> = self.pending_decodes.lock().unwrap().drain(..).collect();

        info!(
            mode = ?opts.mode,
            target = opts.target,
            scale = opts.scale as f64,
            "Starting card export"
        );

        self.runtime.spawn(async move {
            join_pending(pending, Duration::from_secs(DECODE_JOIN_TIMEOUT_SECS)).await;

            let snapshot = card.lock().unwrap().clone();
            // Rasterization is CPU-bound and the write is synchronous; keep
            // them off the runtime workers
            let result = match tokio::task::spawn_blocking(move || {
                run_export(&snapshot, &opts, &fontdb, &dir)
            })
            .await
            {
                Ok(result) => result,
                Err(e) => Err(format!("export task failed: {e}")),
            };

            *status.lock().unwrap() = match result {
                Ok(path) => {
                    info!(path = %path.display(), "Card exported");
                    ExportStatus::Succeeded(path)
                }
                Err(e) => {
                    error!(error = %e, "Export failed");
                    ExportStatus::Failed(e)
                }
            };
            ctx.request_repaint();
        });
    }

    /// Drain a finished export back onto the UI thread: toast on success,
    /// blocking error dialog on failure, then back to Idle.
    pub fn poll_export(&mut self) {
        let status = self.export_status.clone();
        let mut status = status.lock().unwrap();
        match std::mem::replace(&mut *status, ExportStatus::Idle) {
            ExportStatus::Succeeded(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.last_export = Some(path.clone());
                self.toast_message = Some(format!("Exported {}", name));
                self.toast_start = Some(std::time::Instant::now());
            }
            ExportStatus::Failed(msg) => {
                self.export_error = Some(msg);
            }
            other => *status = other,
        }
    }

    pub fn is_capturing(&self) -> bool {
        *self.export_status.lock().unwrap() == ExportStatus::Capturing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CaptureMode;

    fn test_fontdb() -> Arc<resvg::usvg::fontdb::Database> {
        let mut db = resvg::usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    }

    #[tokio::test]
    async fn settled_decodes_pass_straight_through() {
        let handles = vec![tokio::spawn(async {}), tokio::spawn(async {})];
        let start = std::time::Instant::now();
        join_pending(handles, Duration::from_secs(5)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn wedged_decode_falls_through_after_timeout() {
        let handles = vec![tokio::spawn(futures::future::pending::<()>())];
        let start = std::time::Instant::now();
        join_pending(handles, Duration::from_millis(100)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn no_pending_decodes_is_a_no_op() {
        let start = std::time::Instant::now();
        join_pending(Vec::new(), Duration::from_secs(5)).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn failed_capture_writes_no_file() {
        let dir = std::env::temp_dir().join("quote-card-studio-export-fail");
        std::fs::remove_dir_all(&dir).ok();
        let opts = CaptureOptions {
            mode: CaptureMode::Exact,
            target: 0,
            scale: 1.0,
            transparent_background: false,
        };
        let result = run_export(&CardState::default(), &opts, &test_fontdb(), &dir);
        assert!(result.is_err());
        // Capture failed before any IO, so not even the directory exists
        assert!(!dir.exists());
    }

    #[test]
    fn successful_export_writes_exactly_one_png() {
        let dir = std::env::temp_dir().join("quote-card-studio-export-ok");
        std::fs::remove_dir_all(&dir).ok();
        let opts = CaptureOptions {
            mode: CaptureMode::Exact,
            target: 64,
            scale: 1.0,
            transparent_background: false,
        };
        let path = run_export(&CardState::default(), &opts, &test_fontdb(), &dir).unwrap();
        assert!(path.exists());
        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
