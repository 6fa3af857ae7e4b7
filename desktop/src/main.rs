use std::path::PathBuf;
use std::time::Duration;

use verseclock_core::{
    clock::{LocalTime, NetworkStatus, TickInputs, VerseClock, WeatherReading},
    config::{DisplaySettings, StorePaths, TempUnit},
    display::{HEIGHT, WIDTH},
    framebuffer::DisplayBuffers,
    version,
};

use crate::display::{CaptureDisplay, MinifbDisplay};
use crate::volume::HostVolume;

mod display;
mod volume;

const USAGE: &str = "usage: verseclock-desktop [--data DIR] [--12h] [--glance] [--fahrenheit] \
[--temp C] [--address A] [--at HH:MM] [--screenshot PATH] [--version]";

#[derive(Debug)]
struct Options {
    root: PathBuf,
    settings: DisplaySettings,
    temperature: Option<f32>,
    address: Option<String>,
    at: Option<(u8, u8)>,
    screenshot: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            settings: DisplaySettings::default(),
            temperature: None,
            address: None,
            at: None,
            screenshot: None,
        }
    }
}

fn parse_time(value: &str) -> Option<(u8, u8)> {
    let (hour, minute) = value.split_once(':')?;
    let hour: u8 = hour.parse().ok()?;
    let minute: u8 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--data" => options.root = PathBuf::from(value("--data")?),
            "--12h" => options.settings.clock24 = false,
            "--glance" => options.settings.glance = true,
            "--fahrenheit" => options.settings.unit = TempUnit::Fahrenheit,
            "--temp" => {
                let raw = value("--temp")?;
                let celsius = raw
                    .parse()
                    .map_err(|_| format!("invalid temperature: {raw}"))?;
                options.temperature = Some(celsius);
            }
            "--address" => options.address = Some(value("--address")?),
            "--at" => {
                let raw = value("--at")?;
                options.at = Some(parse_time(&raw).ok_or_else(|| format!("invalid time: {raw}"))?);
            }
            "--screenshot" => options.screenshot = Some(value("--screenshot")?),
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn local_time(fixed: Option<(u8, u8)>) -> LocalTime {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    let (hour, minute) = fixed.unwrap_or((now.hour(), now.minute()));
    LocalTime {
        hour,
        minute,
        weekday: now.weekday().number_days_from_sunday(),
        month: u8::from(now.month()) - 1,
        day: now.day(),
    }
}

fn inputs(options: &Options) -> TickInputs {
    TickInputs {
        time: local_time(options.at),
        settings: options.settings,
        weather: options.temperature.map(|temperature_c| WeatherReading {
            temperature_c,
            valid: true,
        }),
        network: NetworkStatus {
            connected: options.address.is_some(),
            address: options.address.clone(),
        },
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version") {
        println!("{} ({}) built {}", version::VERSION, version::DEVICE_ID, version::BUILD_TIME);
        return;
    }
    let options = match parse_args(args.into_iter()) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };
    log::info!("verse clock desktop started, data root {}", options.root.display());

    let mut clock = VerseClock::new(HostVolume::new(&options.root), StorePaths::default());
    let mut display_buffers = Box::new(DisplayBuffers::new());

    if let Some(path) = &options.screenshot {
        let mut capture = CaptureDisplay::default();
        clock.tick(&inputs(&options), &mut display_buffers, &mut capture);
        let Some(frame) = capture.frame else {
            log::error!("nothing was rendered");
            std::process::exit(1);
        };
        if let Err(err) = display::save_png(&frame, path) {
            log::error!("failed to write {}: {}", path, err);
            std::process::exit(1);
        }
        log::info!("screenshot written to {}", path);
        return;
    }

    let mut window = minifb::Window::new(
        "Verse Clock Desktop",
        WIDTH,
        HEIGHT,
        minifb::WindowOptions::default(),
    )
    .unwrap_or_else(|e| {
        panic!("Unable to open window: {}", e);
    });
    window.set_target_fps(30);

    let mut display = Box::new(MinifbDisplay::new(window));
    while display.is_open() {
        clock.tick(&inputs(&options), &mut display_buffers, &mut *display);
        display.update();
        std::thread::sleep(Duration::from_millis(200));
    }
    log::info!("window closed after {} paints", display.paints());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_flags() {
        let options = parse_args(args(&[
            "--data", "/sd", "--12h", "--glance", "--fahrenheit", "--temp", "21.5", "--at", "16:30",
        ]))
        .unwrap();
        assert_eq!(options.root, PathBuf::from("/sd"));
        assert!(!options.settings.clock24);
        assert!(options.settings.glance);
        assert_eq!(options.settings.unit, TempUnit::Fahrenheit);
        assert_eq!(options.temperature, Some(21.5));
        assert_eq!(options.at, Some((16, 30)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args(&["--at", "25:00"])).is_err());
        assert!(parse_args(args(&["--temp"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn address_implies_connection() {
        let options = parse_args(args(&["--address", "10.0.0.2", "--at", "3:16"])).unwrap();
        let tick = inputs(&options);
        assert_eq!(tick.time.hour, 3);
        assert_eq!(tick.time.minute, 16);
        assert_eq!(tick.network.setup_url().as_deref(), Some("http://10.0.0.2/"));
    }

    #[test]
    fn screenshot_of_missing_pack_shows_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let mut clock = VerseClock::new(HostVolume::new(dir.path()), StorePaths::default());
        let mut buffers = Box::new(DisplayBuffers::new());
        let mut capture = CaptureDisplay::default();
        let options = parse_args(args(&["--at", "3:16"])).unwrap();
        let report = clock.tick(&inputs(&options), &mut buffers, &mut capture).unwrap();
        assert_eq!(report.reference, None);
        assert!(capture.frame.is_some());
    }
}
