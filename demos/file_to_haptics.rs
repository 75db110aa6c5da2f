// Decode a media file and print the haptic parameters it drives
// Run with: cargo run --example file_to_haptics -- <audio file> [config.json]
//
// Pages are paced by a TimerOutput at the file's own rate, so nothing is
// played; a logging actuator stands in for the haptic engine.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use audio_haptics::haptics::ActuatorResult;
use audio_haptics::{
    Actuator, ContinuousPattern, HapticParameters, HapticPipeline, MediaFile, PipelineConfig,
    TimerOutput, create_notification_channel,
};
use audio_haptics::messaging::NotificationLevel;
use ringbuf::traits::Consumer;

const MAX_RUN_SECS: f64 = 10.0;

/// Prints every update it receives
struct LoggingActuator {
    updates: usize,
}

impl Actuator for LoggingActuator {
    fn supports_haptic_feedback(&self) -> bool {
        true
    }

    fn prepare(&mut self, pattern: &ContinuousPattern) -> ActuatorResult<()> {
        log::info!(
            "Continuous event: intensity {:.2}, sharpness {:.2}, {:.0}s",
            pattern.initial_intensity,
            pattern.initial_sharpness,
            pattern.duration_secs
        );
        Ok(())
    }

    fn start(&mut self, at_time: f64) -> ActuatorResult<()> {
        log::info!("Player started at +{:.3}s", at_time);
        Ok(())
    }

    fn send_parameters(&mut self, parameters: HapticParameters, _at_time: f64) -> ActuatorResult<()> {
        self.updates += 1;
        let bar = "#".repeat((parameters.intensity * 40.0).round() as usize);
        println!(
            "{:>6}  i={:.3} s={:.3}  {}",
            self.updates, parameters.intensity, parameters.sharpness, bar
        );
        Ok(())
    }

    fn stop(&mut self) -> ActuatorResult<()> {
        log::info!("Player stopped after {} updates", self.updates);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: file_to_haptics <audio file> [config.json]");
        std::process::exit(2);
    };
    let config = match args.next() {
        Some(config_path) => PipelineConfig::load_from_file(config_path)?,
        None => PipelineConfig::default(),
    };

    let (notification_tx, mut notification_rx) =
        create_notification_channel(config.notification_capacity);
    let page_size = config.page_size;

    let mut pipeline = HapticPipeline::try_new(
        config,
        LoggingActuator { updates: 0 },
        TimerOutput::new(44100, page_size),
    )?
    .with_notifications(Arc::new(Mutex::new(notification_tx)));

    let source = MediaFile::new(&path);
    pipeline.load(&source)?;

    if let Some(rate) = pipeline.sample_rate() {
        pipeline.output_mut().set_sample_rate(rate);
    }
    let duration = pipeline
        .page_buffer()
        .lock()
        .map(|pages| pages.samples().duration_secs())
        .unwrap_or(0.0);

    pipeline.start()?;
    thread::sleep(Duration::from_secs_f64(duration.min(MAX_RUN_SECS)));
    pipeline.stop();

    while let Some(notification) = notification_rx.try_pop() {
        if notification.is_at_least(NotificationLevel::Warning) {
            eprintln!("{}", notification);
        } else {
            println!("{}", notification);
        }
    }

    Ok(())
}
