use super::*;
use crate::media::frames::frame_file_name;
use image::RgbImage;
use std::sync::Mutex;

fn scratch(name: &str) -> PathBuf {
    let root = PathBuf::from("target").join("unit_pipeline").join(name);
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn gradient(i: u64) -> RgbImage {
    RgbImage::from_fn(16, 8, |x, y| {
        let v = ((x * 16 + y * 3 + i as u32) % 256) as u8;
        image::Rgb([v, v / 2, 255 - v])
    })
}

struct FakeDecoder {
    frames: u64,
    corrupt: Vec<u64>,
    has_audio: bool,
    fail_probe: bool,
}

impl FakeDecoder {
    fn new(frames: u64) -> Self {
        Self {
            frames,
            corrupt: Vec::new(),
            has_audio: true,
            fail_probe: false,
        }
    }
}

impl VideoDecoder for FakeDecoder {
    fn probe(&self, source: &Path) -> MilkResult<VideoSourceInfo> {
        if self.fail_probe {
            return Err(MilkError::source_open("cannot open"));
        }
        Ok(VideoSourceInfo {
            source_path: source.to_path_buf(),
            width: 16,
            height: 8,
            fps: Fps::integer(30).unwrap(),
            duration_sec: self.frames as f64 / 30.0,
            has_audio: self.has_audio,
        })
    }

    fn extract(
        &self,
        _source: &VideoSourceInfo,
        out_dir: &Path,
        req: &ExtractRequest,
    ) -> MilkResult<()> {
        for i in 0..self.frames {
            let path = out_dir.join(frame_file_name(i, &req.ext));
            if self.corrupt.contains(&i) {
                std::fs::write(path, b"not a jpeg").unwrap();
            } else {
                gradient(i).save(path).unwrap();
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeEncoder {
    fail: bool,
    seen: Mutex<Vec<(MuxRequest, usize)>>,
}

impl VideoEncoder for FakeEncoder {
    fn mux(&self, req: &MuxRequest) -> MilkResult<()> {
        let files = std::fs::read_dir(&req.frames_dir).unwrap().count();
        self.seen.lock().unwrap().push((req.clone(), files));
        if self.fail {
            return Err(MilkError::encode_process("boom"));
        }
        Ok(())
    }
}

fn config(root: &Path) -> PipelineConfig {
    let mut cfg = PipelineConfig::for_source(root.join("clip.mp4"));
    cfg.work_dir = Some(root.join("work"));
    cfg.filter.workers = 3;
    cfg.filter.seed = Some(5);
    cfg.filter.effect = true;
    cfg
}

#[test]
fn run_filters_every_frame_and_muxes_with_audio() {
    let root = scratch("happy");
    let cfg = config(&root);
    let pipeline = Pipeline::new(FakeDecoder::new(7), FakeEncoder::default());

    let report = pipeline.run(&cfg).unwrap();

    assert_eq!(report.output, root.join("clip_filtered.mp4"));
    assert_eq!(report.fps, Fps::integer(30).unwrap());
    assert_eq!(report.stride, 1);
    assert_eq!(report.stats.frames_written, 7);
    assert_eq!(report.stats.workers_used, 3);
    assert_eq!(pipeline.progress().get(), 7);
    assert_eq!(pipeline.progress().total(), 7);
    assert!(report.work_dir.is_none());

    let seen = pipeline.encoder.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (req, files) = &seen[0];
    assert_eq!(*files, 7);
    assert_eq!(req.frame_ext, "jpg");
    assert_eq!(req.audio_source.as_deref(), Some(cfg.source.as_path()));
    assert!(!root.join("work").exists());
}

#[test]
fn target_fps_sets_output_rate_and_stride() {
    let root = scratch("target_fps");
    let mut cfg = config(&root);
    cfg.target_fps = Some(10);
    let mut decoder = FakeDecoder::new(3);
    decoder.has_audio = false;
    let pipeline = Pipeline::new(decoder, FakeEncoder::default());

    let report = pipeline.run(&cfg).unwrap();
    assert_eq!(report.fps, Fps::integer(10).unwrap());
    assert_eq!(report.stride, 3);
    let seen = pipeline.encoder.seen.lock().unwrap();
    assert_eq!(seen[0].0.audio_source, None);
}

#[test]
fn corrupt_frames_are_skipped_not_fatal() {
    let root = scratch("corrupt");
    let cfg = config(&root);
    let mut decoder = FakeDecoder::new(5);
    decoder.corrupt = vec![1, 4];
    let pipeline = Pipeline::new(decoder, FakeEncoder::default());

    let report = pipeline.run(&cfg).unwrap();
    assert_eq!(report.stats.frames_written, 3);
    assert_eq!(
        report.stats.skipped,
        vec![frame_file_name(1, "jpg"), frame_file_name(4, "jpg")]
    );
    assert_eq!(pipeline.encoder.seen.lock().unwrap()[0].1, 3);
}

#[test]
fn every_frame_corrupt_is_fatal() {
    let root = scratch("all_corrupt");
    let mut decoder = FakeDecoder::new(2);
    decoder.corrupt = vec![0, 1];
    let pipeline = Pipeline::new(decoder, FakeEncoder::default());

    assert!(matches!(
        pipeline.run(&config(&root)),
        Err(MilkError::Filter(_))
    ));
    assert!(pipeline.encoder.seen.lock().unwrap().is_empty());
}

#[test]
fn empty_extraction_is_a_source_error() {
    let root = scratch("empty");
    let pipeline = Pipeline::new(FakeDecoder::new(0), FakeEncoder::default());
    assert!(matches!(
        pipeline.run(&config(&root)),
        Err(MilkError::SourceOpen(_))
    ));
    assert!(!root.join("work").join("og").exists());
}

#[test]
fn probe_failure_stops_before_any_directory_work() {
    let root = scratch("probe_fail");
    let mut decoder = FakeDecoder::new(3);
    decoder.fail_probe = true;
    let pipeline = Pipeline::new(decoder, FakeEncoder::default());
    assert!(matches!(
        pipeline.run(&config(&root)),
        Err(MilkError::SourceOpen(_))
    ));
    assert!(!root.join("work").exists());
}

#[test]
fn encoder_failure_propagates_and_cleans_up() {
    let root = scratch("encode_fail");
    let encoder = FakeEncoder {
        fail: true,
        ..FakeEncoder::default()
    };
    let pipeline = Pipeline::new(FakeDecoder::new(2), encoder);
    assert!(matches!(
        pipeline.run(&config(&root)),
        Err(MilkError::EncodeProcess(_))
    ));
    assert!(!root.join("work").exists());
}

#[test]
fn keep_frames_leaves_intermediates() {
    let root = scratch("keep");
    let mut cfg = config(&root);
    cfg.keep_frames = true;
    let pipeline = Pipeline::new(FakeDecoder::new(2), FakeEncoder::default());

    let report = pipeline.run(&cfg).unwrap();
    let work = report.work_dir.unwrap();
    assert_eq!(work, root.join("work"));
    assert_eq!(std::fs::read_dir(work.join("og")).unwrap().count(), 2);
    assert_eq!(std::fs::read_dir(work.join("filtered")).unwrap().count(), 2);
}

#[test]
fn cancelled_run_does_not_mux() {
    let root = scratch("cancel");
    let token = CancelToken::new();
    token.cancel();
    let pipeline =
        Pipeline::new(FakeDecoder::new(4), FakeEncoder::default()).with_cancel_token(token);
    assert!(matches!(
        pipeline.run(&config(&root)),
        Err(MilkError::Cancelled)
    ));
    assert!(pipeline.encoder.seen.lock().unwrap().is_empty());
}

#[test]
fn frames_dir_mode_writes_same_names() {
    let root = scratch("frames_dir");
    let input = root.join("in");
    std::fs::create_dir_all(&input).unwrap();
    for i in 0..4 {
        gradient(i).save(input.join(frame_file_name(i, "png"))).unwrap();
    }
    let cfg = FilterConfig {
        workers: 2,
        seed: Some(9),
        ..FilterConfig::default()
    };

    let stats = filter_frames_dir(&input, &root.join("out"), &cfg).unwrap();
    assert_eq!(stats.frames_written, 4);
    for i in 0..4 {
        assert!(root.join("out").join(frame_file_name(i, "png")).is_file());
    }

    assert!(matches!(
        filter_frames_dir(&root.join("out_missing_in"), &root.join("x"), &cfg),
        Err(MilkError::Directory(_))
    ));
}

#[test]
fn single_image_defaults_to_filtered_prefix() {
    let root = scratch("image");
    let input = root.join("dog.png");
    gradient(0).save(&input).unwrap();

    let out = filter_image_file(&input, None, &FilterConfig::default()).unwrap();
    assert_eq!(out, root.join("filtered_dog.png"));
    let img = image::open(&out).unwrap().into_rgb8();
    assert_eq!(img.dimensions(), (16, 8));
    let allowed = FilterConfig::default().palette.colors().map(|c| c.to_array());
    assert!(img.pixels().all(|p| allowed.contains(&p.0)));

    std::fs::write(root.join("bad.png"), b"nope").unwrap();
    assert!(matches!(
        filter_image_file(&root.join("bad.png"), None, &FilterConfig::default()),
        Err(MilkError::FrameDecode(_))
    ));
}
