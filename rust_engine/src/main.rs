//! flame-rig - 导入 FLAME 头部并打印绑定摘要

use std::path::PathBuf;
use std::sync::Arc;

use flame_engine::{load_flame_head, FlameFrames, FramePlayer, RigConfig};

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} <model.json> <additive.json> [frames.json] [--config cfg.json]",
        program
    );
    eprintln!("       {} --example-config", program);
    eprintln!();
    eprintln!("Import a FLAME head model, personalise it with additive data and build the rig.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  model.json     Tensor document with f, J_regressor, kintree_table, J, weights,");
    eprintln!("                 posedirs, v_template, shapedirs");
    eprintln!("  additive.json  Tensor document with shape, static_offset");
    eprintln!("  frames.json    Optional animation frames to validate and apply");
    eprintln!("  --config       Rig configuration (JSON); missing fields keep their defaults");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("flame-rig");

    if args.iter().any(|a| a == "--example-config") {
        match serde_json::to_string_pretty(&RigConfig::default()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut positional: Vec<PathBuf> = Vec::new();
    let mut config_path: Option<PathBuf> = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            match iter.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => {
                    print_usage(program);
                    std::process::exit(1);
                }
            }
        } else {
            positional.push(PathBuf::from(arg));
        }
    }

    if positional.len() < 2 || positional.len() > 3 {
        print_usage(program);
        std::process::exit(1);
    }

    let config = match &config_path {
        Some(path) => RigConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {}", path.display(), e);
            std::process::exit(1);
        }),
        None => RigConfig::default(),
    };

    let mut rig = load_flame_head(&positional[0], &positional[1], &config).unwrap_or_else(|e| {
        eprintln!("Error importing FLAME head: {}", e);
        std::process::exit(1);
    });

    println!("FLAME Rig");
    println!("=========");
    println!("Vertices:      {}", rig.vertex_count());
    println!("Triangles:     {}", rig.triangle_count());
    println!("Bones:         {}", rig.bone_count());
    println!(
        "Blend shapes:  {} ({} pose, {} expression)",
        rig.blend_shape_count(),
        rig.pose_shape_count(),
        rig.expression_shape_count()
    );

    if let Some(frames_path) = positional.get(2) {
        let frames = std::fs::read_to_string(frames_path)
            .map_err(flame_engine::FlameError::from)
            .and_then(|json| FlameFrames::from_json(&json, &config))
            .unwrap_or_else(|e| {
                eprintln!("Error loading frames {}: {}", frames_path.display(), e);
                std::process::exit(1);
            });

        let player = FramePlayer::new(Arc::new(frames));
        println!("Frames:        {}", player.frame_count());

        if player.apply(&mut rig, &config) {
            rig.update();
            let (min, max) = rig.positions().iter().fold(
                (glam::Vec3::splat(f32::MAX), glam::Vec3::splat(f32::MIN)),
                |(min, max), p| (min.min(*p), max.max(*p)),
            );
            println!("Frame 0 bounds: {:?} .. {:?}", min, max);
        }
    }
}
