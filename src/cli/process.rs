// Dance Skeleton 🕺 AGPL-3.0 License

use std::process;

use crate::cli::args::ProcessArgs;
use crate::config::PoseConfig;
use crate::delegate::Delegate;
use crate::model::PoseModel;
use crate::visualizer::color::SkeletonColor;
use crate::error;
#[cfg(feature = "video")]
use crate::{VERSION, success, verbose};

#[cfg(feature = "annotate")]
use crate::annotate::annotate_frame;

#[cfg(feature = "visualize")]
use crate::visualizer::{Viewer, ViewerState};

/// Run skeleton overlay processing over a dance video.
#[allow(
    clippy::too_many_lines,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn run_processing(args: &ProcessArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let color: SkeletonColor = match args.color.parse() {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let delegate: Delegate = match &args.delegate {
        Some(d) => match d.parse() {
            Ok(d) => d,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        },
        None => Delegate::Cpu,
    };

    let mut config = PoseConfig::new()
        .with_confidence(args.conf)
        .with_iou(args.iou)
        .with_half(args.half)
        .with_delegate(delegate);

    if let Some(sz) = args.imgsz {
        config = config.with_imgsz(sz, sz);
    }

    // Fetch the model on first run
    let model_path = match crate::download::ensure_model(&args.model) {
        Ok(path) => path,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let model = match PoseModel::load_with_config(&model_path, config) {
        Ok(m) => m,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    #[cfg(not(feature = "video"))]
    {
        let _ = (model, color);
        error!(
            "Video processing requires the 'video' feature. Compile with --features video to enable it."
        );
        process::exit(1);
    }

    #[cfg(feature = "video")]
    process_video(args, model, color);
}

#[cfg(feature = "video")]
#[allow(
    clippy::too_many_lines,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn process_video(args: &ProcessArgs, mut model: PoseModel, color: SkeletonColor) {
    use crate::io::VideoWriter;
    use crate::source::VideoReader;

    let reader = match VideoReader::open(&args.source) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let info = reader.info();
    let precision = if args.half || model.metadata().half {
        "FP16"
    } else {
        "FP32"
    };

    println!(
        "dance-skeleton {VERSION} 🕺 Rust ONNX {precision} {}",
        model.config().delegate
    );

    let imgsz = model.imgsz();
    verbose!(
        "{} summary: {} keypoints, imgsz=({}, {})",
        args.model,
        model.num_keypoints(),
        imgsz.0,
        imgsz.1
    );
    verbose!(
        "{}: {}x{} at {:.1} fps, {} frames",
        args.source,
        info.width,
        info.height,
        info.fps,
        info.total_frames.map_or_else(|| "?".to_string(), |n| n.to_string())
    );
    verbose!("");

    let mut writer = if args.save {
        match VideoWriter::new(
            &args.output,
            info.width as usize,
            info.height as usize,
            info.fps,
        ) {
            Ok(w) => Some(w),
            Err(e) => {
                error!("Failed to create output video: {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    #[cfg(feature = "visualize")]
    let mut viewer: Option<Viewer> = if args.show {
        match Viewer::new(
            "Dance Skeleton",
            info.width as usize,
            info.height as usize,
        ) {
            Ok(v) => Some(v),
            Err(e) => {
                error!("Failed to create window: {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    #[cfg(not(feature = "visualize"))]
    if args.show {
        crate::warn!(
            "--show requires the 'visualize' feature. Compile with --features visualize to enable it."
        );
    }

    // Producer thread decodes frames while the main thread runs the model;
    // the bounded channel also backpressures decoding while paused
    let (sender, receiver) = std::sync::mpsc::sync_channel(4);
    std::thread::spawn(move || {
        for item in reader {
            if sender.send(item).is_err() {
                break; // Receiver dropped, stop decoding
            }
        }
    });

    let mut frame_count = 0usize;
    let mut total_preprocess = 0.0;
    let mut total_inference = 0.0;
    let mut total_postprocess = 0.0;
    let mut stopped = false;

    for item in receiver {
        let (frame, meta) = match item {
            Ok(val) => val,
            Err(e) => {
                error!("Error reading video: {e}");
                break;
            }
        };

        let result = match model.detect(&frame, meta.path.clone()) {
            Ok(r) => r,
            Err(e) => {
                error!("Error processing frame {}: {e}", meta.frame_idx);
                break;
            }
        };

        #[cfg(feature = "annotate")]
        let annotated = annotate_frame(&frame, &result, color);
        #[cfg(not(feature = "annotate"))]
        let annotated = frame;

        if let Some(w) = &mut writer {
            if let Err(e) = w.write_frame(&annotated) {
                error!("Failed to write frame: {e}");
                break;
            }
        }

        #[cfg(feature = "visualize")]
        if let Some(v) = &mut viewer {
            match v.update(&annotated) {
                Ok(ViewerState::Stopped) => {
                    stopped = true;
                }
                Ok(ViewerState::Paused) => {
                    // Hold the frame until the user resumes or stops
                    loop {
                        match v.idle() {
                            Ok(ViewerState::Paused) => {
                                std::thread::sleep(std::time::Duration::from_millis(30));
                            }
                            Ok(ViewerState::Playing) => break,
                            Ok(ViewerState::Stopped) | Err(_) => {
                                stopped = true;
                                break;
                            }
                        }
                    }
                }
                Ok(ViewerState::Playing) => {}
                Err(e) => {
                    error!("Viewer error: {e}");
                    stopped = true;
                }
            }
        }

        frame_count += 1;
        total_preprocess += result.speed.preprocess.unwrap_or(0.0);
        total_inference += result.speed.inference.unwrap_or(0.0);
        total_postprocess += result.speed.postprocess.unwrap_or(0.0);

        let total_frames_str = meta
            .total_frames
            .map_or_else(|| "?".to_string(), |n| n.to_string());

        verbose!(
            "frame {}/{} {}: {}x{} {}, {:.1}ms",
            meta.frame_idx + 1,
            total_frames_str,
            meta.path,
            result.orig_shape.1,
            result.orig_shape.0,
            result.verbose(),
            result.speed.inference.unwrap_or(0.0)
        );

        if !crate::cli::logging::is_verbose() {
            render_progress(meta.frame_idx + 1, meta.total_frames);
        }

        if stopped {
            break;
        }
    }

    if !crate::cli::logging::is_verbose() {
        eprintln!();
    }

    if let Some(w) = writer.take() {
        if let Err(e) = w.finish() {
            error!("Failed to finish output video: {e}");
            process::exit(1);
        }
    }

    let num_frames = frame_count.max(1) as f64;
    verbose!(
        "Speed: {:.1}ms preprocess, {:.1}ms inference, {:.1}ms postprocess per frame at shape (1, 3, {}, {})",
        total_preprocess / num_frames,
        total_inference / num_frames,
        total_postprocess / num_frames,
        imgsz.0,
        imgsz.1
    );

    if stopped {
        verbose!("Processing stopped after {frame_count} frames");
    }

    if args.save && frame_count > 0 {
        success!("Annotated video saved to {}", args.output);
    }
}

/// Render a percentage progress bar on stderr.
#[cfg(feature = "video")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn render_progress(frame_idx: usize, total_frames: Option<usize>) {
    use std::io::Write;

    const BAR_WIDTH: usize = 24;

    if let Some(total) = total_frames {
        if total > 0 {
            let progress = (frame_idx as f64 / total as f64).min(1.0);
            let percent = (progress * 100.0) as u8;
            let bar = crate::download::generate_bar(progress, BAR_WIDTH);
            eprint!("\r\x1b[K{percent}% {bar} frame {frame_idx}/{total}");
            std::io::stderr().flush().ok();
            return;
        }
    }

    eprint!("\r\x1b[Kframe {frame_idx}");
    std::io::stderr().flush().ok();
}
