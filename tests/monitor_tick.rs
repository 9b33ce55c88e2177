use async_trait::async_trait;
use image::{GrayImage, Luma};
use layerwatch::{
    DefectHighlighter, HeightSource, MaskSource, Milestone, MilestoneTable, Monitor,
    SelectionStrategy, StatusError,
};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

fn frame(blob: Option<(u32, u32)>) -> GrayImage {
    let mut image = GrayImage::from_pixel(64, 48, Luma([40]));
    if let Some((x0, y0)) = blob {
        for y in y0..y0 + 12 {
            for x in x0..x0 + 12 {
                image.put_pixel(x, y, Luma([220]));
            }
        }
    }
    image
}

fn setup(dir: &Path) -> Monitor {
    frame(None).save(dir.join("ref_5.png")).unwrap();
    frame(Some((20, 20))).save(dir.join("live.png")).unwrap();

    let table = MilestoneTable::new(vec![
        Milestone::new(5.0, dir.join("ref_5.png")),
        Milestone::new(9.0, dir.join("missing.png")),
    ]);
    Monitor::new(table, DefectHighlighter::default(), dir.join("out"))
}

/// Replays a fixed list of readings, then reports nothing
struct Scripted(Mutex<Vec<Option<f64>>>);

#[async_trait]
impl HeightSource for Scripted {
    async fn query_height(&self) -> Result<f64, StatusError> {
        let next = {
            let mut readings = self.0.lock().unwrap();
            if readings.is_empty() {
                None
            } else {
                readings.remove(0)
            }
        };
        next.ok_or(StatusError::MalformedResponse {
            reason: "no reading".to_string(),
        })
    }
}

#[test]
fn test_step_persists_stages() {
    let dir = TempDir::new().unwrap();
    let monitor = setup(dir.path());

    let report = monitor
        .step(Some(5.03), None, &dir.path().join("live.png"))
        .expect("milestone at 5.0 should match");

    assert_eq!(report.milestone_height, 5.0);
    assert_eq!(report.layer, None);
    assert_eq!(report.stage_files.len(), 4);
    assert!(report.stage_files.iter().all(|p| p.is_file()));
    assert!(report.output_dir.starts_with(dir.path().join("out")));
    assert!(report
        .output_dir
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("-z5.03")));
    assert!(report.deviation_pixels > 0);
}

#[test]
fn test_step_skips_missing_inputs() {
    let dir = TempDir::new().unwrap();
    let monitor = setup(dir.path());
    let live = dir.path().join("live.png");

    // between milestones
    assert!(monitor.step(Some(7.0), None, &live).is_none());
    // matched milestone whose reference is gone
    assert!(monitor.step(Some(9.0), None, &live).is_none());
    // unreadable live frame
    assert!(monitor
        .step(Some(5.0), None, &dir.path().join("nope.png"))
        .is_none());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_roi_excludes_deviation() {
    let dir = TempDir::new().unwrap();
    let monitor = setup(dir.path())
        .with_mask(MaskSource::Polygon(vec![(0, 0), (16, 0), (16, 16), (0, 16)]));

    let report = monitor
        .step(Some(5.0), None, &dir.path().join("live.png"))
        .unwrap();
    assert_eq!(report.deviation_pixels, 0);
}

#[test]
fn test_prefer_layer_matches_by_layer() {
    let dir = TempDir::new().unwrap();
    let monitor = setup(dir.path()).with_strategy(SelectionStrategy::PreferLayer);

    let report = monitor
        .step(None, Some(24), &dir.path().join("live.png"))
        .unwrap();
    assert_eq!(report.milestone_height, 5.0);
    assert_eq!(report.height, None);
}

#[test]
fn test_prefer_layer_without_layer_matches_height_only() {
    let dir = TempDir::new().unwrap();
    let monitor = setup(dir.path()).with_strategy(SelectionStrategy::PreferLayer);
    let live = dir.path().join("live.png");

    // 5.08 mm is layer 24 like the 5.0 mm milestone, but outside its tolerance
    assert!(monitor.step(Some(5.08), None, &live).is_none());
    assert!(monitor.step(Some(5.08), Some(24), &live).is_some());
}

#[tokio::test]
async fn test_watch_skips_ticks_without_height() {
    let dir = TempDir::new().unwrap();
    let monitor = setup(dir.path());
    let source = Scripted(Mutex::new(vec![None, Some(5.0), Some(7.0), Some(4.96)]));

    let mut heights = Vec::new();
    let compared = monitor
        .watch(
            &source,
            &dir.path().join("live.png"),
            Duration::from_millis(5),
            Some(5),
            |report| heights.push(report.height),
        )
        .await;

    assert_eq!(compared, 2);
    assert_eq!(heights, vec![Some(5.0), Some(4.96)]);
}
