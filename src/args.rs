use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera index; skips the rear-camera preference
    #[arg(short, long)]
    pub cam_index: Option<u32>,

    /// List available cameras
    #[arg(long)]
    pub list: bool,

    /// Configuration file
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Shape the stream for a portrait (handheld) viewport
    #[arg(long)]
    pub handheld: bool,

    /// Mirror the camera output
    #[arg(long)]
    pub mirror: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["rusty-hue"]);
        assert_eq!(args.cam_index, None);
        assert!(!args.list);
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert!(!args.handheld && !args.mirror);
    }

    #[test]
    fn explicit_camera() {
        let args = Args::parse_from(["rusty-hue", "-c", "2", "--handheld", "--config", "x.json"]);
        assert_eq!(args.cam_index, Some(2));
        assert!(args.handheld);
        assert_eq!(args.config, PathBuf::from("x.json"));
    }
}
