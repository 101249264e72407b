// Dance Skeleton 🕺 AGPL-3.0 License

use crate::download::DEFAULT_MODEL;
use crate::io::DEFAULT_OUTPUT;
use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Process Options:
    --source, -s <SOURCE>  Input dance video (mp4, avi, mov, mkv, ...)
    --model, -m <MODEL>    Path to ONNX pose model [default: yolo11n-pose.onnx]
    --conf <CONF>          Detection confidence threshold [default: 0.5]
    --color <COLOR>        Skeleton color (default, green, blue, red, yellow)
    --save <BOOL>          Write the annotated video [default: true]
    --output, -o <OUTPUT>  Output video path [default: dance_skeleton_output.mp4]
    --show                 Display frames in a window (Space pauses, Esc/Q stops)
    --half                 Use FP16 half-precision inference
    --delegate <DELEGATE>  Compute backend (cpu, cuda:0, coreml)
    --verbose              Show verbose output

Examples:
    dance-skeleton process --source bachata.mp4
    dance-skeleton process -s bachata.mp4 --conf 0.6 --color blue
    dance-skeleton process -s bachata.mp4 --show --save false
    dance-skeleton process -s bachata.mp4 -o annotated.mp4 --half"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Overlay the skeleton on a dance video
    Process(ProcessArgs),
}

/// Arguments for the process command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProcessArgs {
    /// Input dance video
    #[arg(short, long)]
    pub source: String,

    /// Path to ONNX pose model file
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Detection confidence threshold
    #[arg(long, default_value_t = 0.5)]
    pub conf: f32,

    /// `IoU` threshold for NMS
    #[arg(long, default_value_t = 0.45)]
    pub iou: f32,

    /// Skeleton overlay color
    #[arg(long, default_value = "default")]
    pub color: String,

    /// Write the annotated video to disk
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub save: bool,

    /// Output video path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Display frames in a window (Space pauses, Esc/Q stops)
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Inference image size
    #[arg(long)]
    pub imgsz: Option<usize>,

    /// Use FP16 half-precision inference
    #[arg(long, default_value_t = false)]
    pub half: bool,

    /// Compute backend (cpu, cuda:0, coreml)
    #[arg(long)]
    pub delegate: Option<String>,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_args_defaults() {
        let args = Cli::parse_from(["app", "process", "--source", "dance.mp4"]);
        match args.command {
            Commands::Process(process_args) => {
                assert_eq!(process_args.source, "dance.mp4");
                assert_eq!(process_args.model, "yolo11n-pose.onnx");
                assert!((process_args.conf - 0.5).abs() < f32::EPSILON);
                assert!((process_args.iou - 0.45).abs() < f32::EPSILON);
                assert_eq!(process_args.color, "default");
                assert!(process_args.save);
                assert_eq!(process_args.output, "dance_skeleton_output.mp4");
                assert!(!process_args.show);
                assert!(!process_args.half);
                assert!(process_args.verbose);
            }
        }
    }

    #[test]
    fn test_process_args_custom() {
        let args = Cli::parse_from([
            "app",
            "process",
            "--source",
            "dance.mp4",
            "--conf",
            "0.8",
            "--color",
            "azul",
            "--save",
            "false",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Process(process_args) => {
                assert_eq!(process_args.source, "dance.mp4");
                assert!((process_args.conf - 0.8).abs() < f32::EPSILON);
                assert_eq!(process_args.color, "azul");
                assert!(!process_args.save);
                assert!(!process_args.verbose);
            }
        }
    }
}
