use super::*;
use crate::palette::table::PaletteVariant;
use crate::schedule::partition::PartitionPolicy;

#[test]
fn json_config_fills_defaults() {
    let json = r#"{
        "source": "clips/cat.mp4",
        "target_fps": 12,
        "filter": { "palette": 2, "effect": true, "recompress": 40, "workers": 3,
                    "partition": "balanced" }
    }"#;
    let cfg: PipelineConfig = serde_json::from_str(json).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.target_fps, Some(12));
    assert!(cfg.overwrite);
    assert!(!cfg.keep_frames);
    assert_eq!(cfg.filter.palette, PaletteVariant::Type2);
    assert!(cfg.filter.effect);
    assert_eq!(cfg.filter.recompress.map(|n| n.get()), Some(40));
    assert_eq!(cfg.filter.workers, 3);
    assert_eq!(cfg.filter.partition, PartitionPolicy::Balanced);
    assert_eq!(cfg.filter.seed, None);
}

#[test]
fn json_config_rejects_bad_values() {
    for json in [
        r#"{"source":"a.mp4","filter":{"palette":3}}"#,
        r#"{"source":"a.mp4","filter":{"recompress":101}}"#,
        r#"{"source":"a.mp4","colour":"blue"}"#,
    ] {
        assert!(serde_json::from_str::<PipelineConfig>(json).is_err(), "{json}");
    }
}

#[test]
fn validate_catches_semantic_errors() {
    assert!(PipelineConfig::default().validate().is_err());

    let mut cfg = PipelineConfig::for_source("a.mp4");
    cfg.target_fps = Some(0);
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::for_source("a.mp4");
    cfg.scale = Some((0, 10));
    assert!(cfg.validate().is_err());

    let mut cfg = PipelineConfig::for_source("a.mp4");
    cfg.filter.workers = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn default_output_sits_next_to_source() {
    let cfg = PipelineConfig::for_source("videos/cat.mp4");
    assert_eq!(cfg.output_path(), PathBuf::from("videos/cat_filtered.mp4"));
    assert_eq!(
        default_output_path(Path::new("noext"), "_filtered"),
        PathBuf::from("noext_filtered")
    );
    assert_eq!(
        default_image_output_path(Path::new("pics/dog.png")),
        PathBuf::from("pics/filtered_dog.png")
    );
}

#[test]
fn missing_config_file_is_an_error() {
    assert!(PipelineConfig::from_path(Path::new("target/nope/config.json")).is_err());
}

#[test]
fn default_work_dir_ignores_source_name() {
    let cfg = PipelineConfig::for_source("/videos/clip [1080p]*?.mp4");
    let a = cfg.work_dir();
    let b = cfg.work_dir();
    assert_ne!(a, b);
    for dir in [&a, &b] {
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("milktone-"), "{name}");
        assert!(!name.contains("clip"), "{name}");
        assert!(!name.contains(['[', ']', '*', '?']), "{name}");
    }

    let mut cfg = cfg;
    cfg.work_dir = Some(PathBuf::from("work/[x]"));
    assert_eq!(cfg.work_dir(), PathBuf::from("work/[x]"));
}
