use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use audio_recorder_core::{Format, Recorder, RecorderConfiguration, RecorderError, ShutdownReason};
use audio_recorder_gst::GstEngine;

#[derive(Parser, Debug)]
#[command(name = "audio-recorder")]
#[command(version)]
#[command(about = "Record audio from the default capture device")]
struct Args {
    /// Directory for recordings (created if missing)
    #[arg(short, long, default_value = "tmp")]
    location: PathBuf,

    /// Stop after this many seconds; zero or negative records until
    /// end of stream or Ctrl+C
    #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
    duration: i64,

    /// Output format: raw, wav, ogg, mp3 or flac
    #[arg(short, long, default_value = "raw")]
    format: Format,

    /// Write a JSON metadata sidecar next to the recording
    #[arg(long)]
    metadata: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match record(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn record(args: Args) -> Result<u8, RecorderError> {
    let mut config =
        RecorderConfiguration::new(args.location, args.format).with_duration_secs(args.duration);
    config.write_metadata = args.metadata;

    let engine = Arc::new(GstEngine::new("audio-recorder")?);
    let recorder = Recorder::new(engine, config)?;
    recorder.start()?;

    let mut worker = {
        let recorder = Arc::clone(&recorder);
        tokio::task::spawn_blocking(move || recorder.run())
    };

    tokio::select! {
        joined = &mut worker => {
            if let Err(e) = joined {
                log::error!("Event loop worker failed: {}", e);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    log::info!("Interrupted, stopping");
                    let stopper = Arc::clone(&recorder);
                    if let Err(e) = tokio::task::spawn_blocking(move || {
                        stopper.shutdown(ShutdownReason::Interrupted)
                    })
                    .await
                    {
                        log::error!("Shutdown task failed: {}", e);
                    }
                }
                Err(e) => log::error!("Unable to listen for Ctrl+C: {}", e),
            }
            if let Err(e) = worker.await {
                log::error!("Event loop worker failed: {}", e);
            }
        }
    }

    let result = recorder.finish();
    log::info!(
        "Recording {} ({})",
        result.file_path.display(),
        result.reason
    );
    Ok(result.exit_code())
}
