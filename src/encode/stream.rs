use crate::encode::encoder::{Artifact, EncoderConfig, FrameCounter, FrameEncoder, check_config};
use crate::foundation::core::{Fps, FrameIndex, PixelBuffer};
use crate::foundation::error::{CaptureError, CaptureResult};
use crate::foundation::math::flatten_over_background;
use std::io::{Read, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Video container produced by a [`StreamEncoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoContainer {
    /// H.264 in MP4, yuv420p.
    Mp4,
    /// VP9 in WebM, yuv420p.
    Webm,
}

impl VideoContainer {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

/// Options for [`StreamEncoder`].
#[derive(Clone, Debug)]
pub struct StreamEncoderOpts {
    /// Output container and codec.
    pub container: VideoContainer,
    /// Background used to flatten alpha (the video has no alpha channel).
    pub bg_rgb: [u8; 3],
    /// `ffmpeg` executable.
    pub ffmpeg: PathBuf,
}

impl StreamEncoderOpts {
    /// Options for `container` using `ffmpeg` from `PATH`.
    pub fn new(container: VideoContainer) -> Self {
        Self {
            container,
            bg_rgb: [0, 0, 0],
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Streams frames into one continuous video via the system `ffmpeg`.
///
/// Raw RGBA frames are piped to stdin, one write per submitted frame. The encode lands in a
/// temporary file that is read back into the [`Artifact`] and removed. Closing stdin early
/// still yields a playable (shorter) video.
pub struct StreamEncoder {
    opts: StreamEncoderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    out_path: Option<PathBuf>,

    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
    counter: FrameCounter,
}

impl StreamEncoder {
    /// Create an encoder; nothing is spawned until `start`.
    pub fn new(opts: StreamEncoderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            out_path: None,
            scratch: Vec::new(),
            cfg: None,
            counter: FrameCounter::default(),
        }
    }

    fn temp_output_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!(
            "orbitcap_stream_{}_{}.{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            self.opts.container.extension()
        ))
    }

    fn join_stderr(&mut self) -> String {
        let bytes = match self.stderr_drain.take() {
            Some(handle) => handle.join().ok().and_then(Result::ok).unwrap_or_default(),
            None => Vec::new(),
        };
        String::from_utf8_lossy(&bytes).trim().to_owned()
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        if let Some(path) = self.out_path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl FrameEncoder for StreamEncoder {
    fn start(&mut self, cfg: EncoderConfig) -> CaptureResult<()> {
        check_config(&cfg)?;
        if self.opts.container == VideoContainer::Mp4
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            return Err(CaptureError::encoder_init(
                "stream width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if !is_ffmpeg_available(&self.opts.ffmpeg) {
            return Err(CaptureError::encoder_init(
                "ffmpeg is required for video capture, but was not found",
            ));
        }

        let out_path = self.temp_output_path();
        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        match self.opts.container {
            VideoContainer::Mp4 => {
                cmd.args([
                    "-c:v",
                    "libx264",
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]);
            }
            VideoContainer::Webm => {
                cmd.args([
                    "-c:v",
                    "libvpx-vp9",
                    "-pix_fmt",
                    "yuv420p",
                    "-b:v",
                    "0",
                    "-crf",
                    "31",
                ]);
            }
        }
        cmd.arg(&out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| CaptureError::encoder_init(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CaptureError::encoder_init("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| CaptureError::encoder_init("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            container = ?self.opts.container,
            "ffmpeg stream started"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.out_path = Some(out_path);
        self.cfg = Some(cfg);
        self.counter = FrameCounter::default();
        Ok(())
    }

    fn submit_frame(&mut self, idx: FrameIndex, frame: &PixelBuffer) -> CaptureResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| CaptureError::encoder_write("stream encoder not started"))?;
        self.counter.accept(idx, frame, cfg)?;

        flatten_over_background(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgb,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CaptureError::encoder_write("stream encoder already finished"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            CaptureError::encoder_write(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn finish(&mut self, cancelled: bool) -> CaptureResult<Artifact> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| CaptureError::encoder_write("stream encoder not started"))?;
        let delivered = self.counter.delivered();
        let ext = self.opts.container.extension();

        if delivered == 0 {
            self.abort();
            return Ok(Artifact {
                bytes: Vec::new(),
                suggested_name: format!("{}_turntable.{ext}", cfg.name_hint),
                frame_count_delivered: 0,
                was_partial: cancelled,
            });
        }

        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| CaptureError::encoder_write("stream encoder not started"))?;
        let status = child.wait().map_err(|e| {
            CaptureError::encoder_write(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr = self.join_stderr();
        let out_path = self
            .out_path
            .take()
            .ok_or_else(|| CaptureError::encoder_write("stream output path missing"))?;

        if !status.success() {
            let _ = std::fs::remove_file(&out_path);
            return Err(CaptureError::encoder_write(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }

        let bytes = std::fs::read(&out_path).map_err(|e| {
            CaptureError::encoder_write(format!(
                "failed to read encoded video '{}': {e}",
                out_path.display()
            ))
        })?;
        let _ = std::fs::remove_file(&out_path);

        let was_partial = cancelled && delivered < cfg.total_frames;
        let suggested_name = if was_partial {
            format!("{}_turntable_partial.{ext}", cfg.name_hint)
        } else {
            format!("{}_turntable.{ext}", cfg.name_hint)
        };
        tracing::debug!(delivered, was_partial, bytes = bytes.len(), "ffmpeg stream finished");

        Ok(Artifact {
            bytes,
            suggested_name,
            frame_count_delivered: delivered,
            was_partial,
        })
    }
}

impl Drop for StreamEncoder {
    fn drop(&mut self) {
        if self.child.is_some() || self.out_path.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // rawvideo input rate goes before `-i`, as a rational.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Return `true` when `ffmpeg` can be invoked.
pub fn is_ffmpeg_available(ffmpeg: &std::path::Path) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
