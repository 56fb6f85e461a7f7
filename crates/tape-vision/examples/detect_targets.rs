use tape_vision::detect;
use tape_vision::pipeline::PipelineConfig;

#[cfg(feature = "tracing")]
use tape_vision::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false, log::LevelFilter::Info);

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: detect_targets <image_path>");
        return Ok(());
    };

    let result = detect::detect_targets_in_file(path, &PipelineConfig::default())?;
    match result.geometry {
        Some(pair) => println!(
            "targets at {:?} and {:?}, center ({:.1}, {:.1})",
            pair.target1, pair.target2, result.center[0], result.center[1]
        ),
        None => println!("no target pair"),
    }

    Ok(())
}
