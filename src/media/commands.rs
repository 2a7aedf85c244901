use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{KatariError, Result};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set pixel format
    pub fn pixel_format<S: Into<String>>(self, format: S) -> Self {
        self.arg("-pix_fmt").arg(format)
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Add complex filter graph
    pub fn filter_complex<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-filter_complex").arg(filter)
    }

    /// Map a filter graph output stream
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    /// Limit output duration in seconds
    pub fn duration(self, seconds: f64) -> Self {
        self.arg("-t").arg(seconds.to_string())
    }

    /// Execute the command, discarding output
    pub async fn execute(&self) -> Result<()> {
        debug!(
            "Executing media processing command: {} {:?}",
            self.binary_path, self.args
        );
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args).kill_on_drop(true);

        let output = cmd
            .output()
            .await
            .map_err(|e| KatariError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KatariError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(())
    }

    /// Execute the command, capturing stdout (used for probing)
    pub async fn execute_capture(&self) -> Result<String> {
        debug!(
            "Executing media probe command: {} {:?}",
            self.binary_path, self.args
        );

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| KatariError::Media(format!("Failed to execute media probe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KatariError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the media operations of the assembly pipeline
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
        }
    }

    /// Build the clip rendering command: loop one still image against an
    /// audio track for `duration` seconds with fade-in and fade-out.
    pub fn render_clip<P: AsRef<Path>>(
        &self,
        image_path: P,
        audio_path: P,
        duration: f64,
        fade: f64,
        encode_options: &[String],
        output_path: P,
    ) -> MediaCommand {
        let filter = format!(
            "[0:v]fade=t=in:st=0:d={fade},fade=t=out:st={fade_out_start}:d={fade}[v];[1:a]anull[a]",
            fade = fade,
            fade_out_start = duration - fade,
        );

        let mut cmd = MediaCommand::new(&self.binary_path, "Clip rendering")
            .arg("-loop")
            .arg("1")
            .input(&image_path)
            .input(&audio_path)
            .filter_complex(filter)
            .map("[v]")
            .map("[a]")
            .video_codec("libx264")
            .duration(duration)
            .pixel_format("yuv420p")
            .arg("-shortest");

        for option in encode_options {
            cmd = cmd.arg(option);
        }

        cmd.overwrite().output(output_path)
    }

    /// Build the final assembly command: concatenate the ordered clip list
    /// and burn in the subtitle track.
    pub fn concat_with_subtitles<P: AsRef<Path>>(
        &self,
        concat_list_path: P,
        subtitle_path: P,
        output_path: P,
    ) -> MediaCommand {
        // The subtitles filter parses backslashes as escapes
        let subtitle_arg = subtitle_path.as_ref().to_string_lossy().replace('\\', "/");

        MediaCommand::new(&self.binary_path, "Video assembly")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .input(&concat_list_path)
            .video_filter(format!("subtitles={}", subtitle_arg))
            .video_codec("libx264")
            .pixel_format("yuv420p")
            .overwrite()
            .output(output_path)
    }

    /// Build the audio duration probe command
    pub fn probe_duration<P: AsRef<Path>>(&self, audio_path: P) -> MediaCommand {
        MediaCommand::new(&self.probe_path, "Duration probe")
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .input(audio_path)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_clip_command_shape() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.render_clip(
            &PathBuf::from("image_0.png"),
            &PathBuf::from("audio_0.wav"),
            2.0,
            1.0,
            &[],
            &PathBuf::from("clip_0.mp4"),
        );

        let args = cmd.args.join(" ");
        assert!(args.starts_with("-loop 1 -i image_0.png -i audio_0.wav"));
        assert!(args.contains("fade=t=in:st=0:d=1"));
        assert!(args.contains("fade=t=out:st=1:d=1"));
        assert!(args.contains("-map [v] -map [a]"));
        assert!(args.contains("-c:v libx264 -t 2 -pix_fmt yuv420p -shortest"));
        assert!(args.ends_with("-y clip_0.mp4"));
    }

    #[test]
    fn test_concat_command_shape() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.concat_with_subtitles(
            &PathBuf::from("concat_list.txt"),
            &PathBuf::from("subtitles.ass"),
            &PathBuf::from("output.mp4"),
        );

        let args = cmd.args.join(" ");
        assert!(args.starts_with("-f concat -safe 0 -i concat_list.txt"));
        assert!(args.contains("-vf subtitles=subtitles.ass"));
        assert!(args.contains("-c:v libx264 -pix_fmt yuv420p"));
    }

    #[test]
    fn test_probe_uses_probe_binary() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.probe_duration(&PathBuf::from("audio_0.wav"));
        assert_eq!(cmd.binary_path, "ffprobe");
        assert!(cmd.args.join(" ").contains("format=duration"));
    }
}
