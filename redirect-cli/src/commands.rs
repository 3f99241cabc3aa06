use std::io::{self, BufRead};

use clap::Args;
use serde::Serialize;

use redirect_core::{
    parse_sample_rate, string_to_format, AudioHost, DeviceDescriptor, DeviceId, RedirectError,
    RedirectMode, Redirector, SampleFormat, StreamConfig, VolumeBoost,
};
use redirect_cpal::CpalHost;

use crate::audio_state::{CliObserver, DeviceInfo, DeviceListing, FormatListing};

/// Stream options shared by the `loopback` and `duplex` commands.
#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Sample format: f32, s32, s24, s16, u8 (or a full label such as "s16 (Signed 16-bit)")
    #[arg(long, default_value = "f32")]
    pub format: String,

    /// Sample rate, e.g. 48000 or "44100 Hz"
    #[arg(long, default_value = "48000")]
    pub rate: String,

    #[arg(long, default_value_t = 2)]
    pub channels: u16,

    /// Output volume in percent, 0 to 100 x boost
    #[arg(long, default_value_t = 100)]
    pub volume: u32,

    /// Volume boost multiplier, 1 to 10
    #[arg(long, default_value_t = 1)]
    pub boost: u8,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => log::error!("failed to serialize output: {}", e),
    }
}

pub fn list_devices(host: CpalHost, json: bool) -> Result<(), RedirectError> {
    let redirector = Redirector::new(host);
    let devices = redirector.enumerate_devices()?;
    let listing = DeviceListing {
        playback: DeviceInfo::list(&devices.playback),
        capture: DeviceInfo::list(&devices.capture),
    };

    if json {
        print_json(&listing);
        return Ok(());
    }
    for (title, infos) in [("Playback", &listing.playback), ("Capture", &listing.capture)] {
        println!("{} devices:", title);
        if infos.is_empty() {
            println!("  (none)");
        }
        for info in infos {
            let marker = if info.is_default { " [default]" } else { "" };
            println!("  {:>2}: {}{}", info.index, info.name, marker);
        }
    }
    Ok(())
}

pub fn list_formats(json: bool) {
    let listing = FormatListing::supported();
    if json {
        print_json(&listing);
        return;
    }
    println!("Formats:");
    for option in &listing.formats {
        println!("  {:<4} {}", option.value, option.label);
    }
    println!("Sample rates:");
    for option in &listing.sample_rates {
        println!("  {}", option.label);
    }
    println!("Volume boosts:");
    for option in &listing.boosts {
        println!("  {}", option.label);
    }
}

/// Build and check the stream config requested on the command line.
pub fn stream_config(args: &StreamArgs) -> Result<StreamConfig, RedirectError> {
    let format = parse_format(&args.format)
        .ok_or_else(|| RedirectError::configuration(format!("unrecognized format: {}", args.format)))?;
    let sample_rate = parse_sample_rate(&args.rate)
        .ok_or_else(|| RedirectError::configuration(format!("invalid sample rate: {}", args.rate)))?;

    let config = StreamConfig::new(format, args.channels, sample_rate);
    config.validate().map_err(RedirectError::configuration)?;
    Ok(config)
}

/// Short code (`s16`) or full picker label (`s16 (Signed 16-bit)`).
fn parse_format(text: &str) -> Option<SampleFormat> {
    SampleFormat::from_short_name(text)
        .or_else(|| string_to_format(text))
        .filter(|f| *f != SampleFormat::Unknown)
}

pub fn volume_boost(args: &StreamArgs) -> Result<VolumeBoost, RedirectError> {
    VolumeBoost::try_from(args.boost).map_err(RedirectError::configuration)
}

/// Resolve a device by enumeration index or by id; `default` picks the
/// default device. `side` names the selection in errors ("input"/"output").
pub fn resolve_device(
    devices: &[DeviceDescriptor],
    selector: &str,
    side: &str,
) -> Result<DeviceId, RedirectError> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(RedirectError::configuration(format!(
            "Please select an {} device",
            side
        )));
    }
    if selector.eq_ignore_ascii_case("default") {
        return devices
            .iter()
            .find(|d| d.is_default)
            .map(|d| d.id.clone())
            .ok_or_else(|| RedirectError::configuration(format!("no default {} device", side)));
    }
    if let Ok(index) = selector.parse::<usize>() {
        return devices.get(index).map(|d| d.id.clone()).ok_or_else(|| {
            RedirectError::configuration(format!(
                "Selected {} device index is out of range.",
                side
            ))
        });
    }
    devices
        .iter()
        .find(|d| d.id.as_str() == selector || d.name == selector)
        .map(|d| d.id.clone())
        .ok_or_else(|| RedirectError::configuration(format!("no {} device named {:?}", side, selector)))
}

pub fn run_loopback(
    host: CpalHost,
    from: &str,
    to: &str,
    args: &StreamArgs,
) -> Result<(), RedirectError> {
    let mut redirector = Redirector::new(host);
    run(&mut redirector, RedirectMode::Loopback, from, to, args, io::stdin().lock())
}

pub fn run_duplex(
    host: CpalHost,
    capture: &str,
    playback: &str,
    args: &StreamArgs,
) -> Result<(), RedirectError> {
    let mut redirector = Redirector::new(host);
    run(&mut redirector, RedirectMode::Duplex, capture, playback, args, io::stdin().lock())
}

/// Start `mode`, then serve console commands from `input` until it asks to
/// stop or ends.
pub fn run<H: AudioHost>(
    redirector: &mut Redirector<H>,
    mode: RedirectMode,
    input_selector: &str,
    output_selector: &str,
    args: &StreamArgs,
    input: impl BufRead,
) -> Result<(), RedirectError> {
    let config = stream_config(args)?;
    let boost = volume_boost(args)?;

    let observer = CliObserver::new();
    redirector.set_observer(observer.clone());

    let devices = redirector.enumerate_devices()?;
    let input_devices = match mode {
        RedirectMode::Loopback => &devices.playback,
        RedirectMode::Duplex => &devices.capture,
    };
    let from = resolve_device(input_devices, input_selector, "input")?;
    let to = resolve_device(&devices.playback, output_selector, "output")?;

    match mode {
        RedirectMode::Loopback => {
            redirector.set_loopback_config(config);
            redirector.start_loopback_redirect(&from, &to)?;
        }
        RedirectMode::Duplex => {
            redirector.set_duplex_config(config);
            redirector.start_duplex_redirect(&from, &to)?;
        }
    }
    set_volume(redirector, mode, boost.gain_for_percent(args.volume))?;

    println!("{} redirect: {} → {}", mode, from, to);
    println!("Commands: status | volume <percent> | rate <hz> | format <name> | restart | quit (or Enter)");

    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("stdin read failed: {}", e);
                break;
            }
        };
        match Action::parse(&line) {
            Action::Stop => break,
            Action::Status => print_status(redirector, mode),
            Action::Volume(percent) => {
                let gain = boost.gain_for_percent(percent);
                if set_volume(redirector, mode, gain).is_ok() {
                    println!("volume {}% (gain {:.2})", percent.min(boost.max_percent()), gain);
                }
            }
            Action::Rate(rate) => {
                match mode {
                    RedirectMode::Loopback => redirector.set_loopback_sample_rate(rate),
                    RedirectMode::Duplex => redirector.set_duplex_sample_rate(rate),
                }
                println!("sample rate {} Hz applies on restart", rate);
            }
            Action::Format(format) => {
                match mode {
                    RedirectMode::Loopback => redirector.set_loopback_format(format),
                    RedirectMode::Duplex => redirector.set_duplex_format(format),
                }
                println!("format {} applies on restart", format.short_name());
            }
            Action::Restart => {
                let result = match mode {
                    RedirectMode::Loopback => redirector.restart_loopback_redirect(),
                    RedirectMode::Duplex => redirector.restart_duplex_redirect(),
                };
                // observer already logged the failure
                match result {
                    Ok(()) => print_status(redirector, mode),
                    Err(_) => println!("restart failed; {} redirect is {}", mode, observer.state(mode)),
                }
            }
            Action::Invalid(message) => println!("{}", message),
        }
    }

    let result = match mode {
        RedirectMode::Loopback => redirector.stop_loopback_redirect(),
        RedirectMode::Duplex => redirector.stop_duplex_redirect(),
    };
    if observer.error_count() > 0 {
        log::info!("{} error(s) during this session", observer.error_count());
    }
    result
}

fn set_volume<H: AudioHost>(
    redirector: &mut Redirector<H>,
    mode: RedirectMode,
    gain: f32,
) -> Result<(), RedirectError> {
    match mode {
        RedirectMode::Loopback => redirector.set_playback_volume(gain),
        RedirectMode::Duplex => redirector.set_duplex_volume(gain),
    }
}

fn print_status<H: AudioHost>(redirector: &Redirector<H>, mode: RedirectMode) {
    let (state, config, volume) = match mode {
        RedirectMode::Loopback => (
            redirector.loopback_state(),
            redirector.loopback_active_config(),
            redirector.playback_volume().ok(),
        ),
        RedirectMode::Duplex => (
            redirector.duplex_state(),
            redirector.duplex_active_config(),
            redirector.duplex_volume().ok(),
        ),
    };
    let mut line = format!("{}: {}", mode, state);
    if let Some(config) = config {
        line.push_str(&format!(
            ", {} ch {} Hz {}",
            config.channels,
            config.sample_rate,
            config.format.short_name()
        ));
    }
    if let Some(volume) = volume {
        line.push_str(&format!(", gain {:.2}", volume));
    }
    if let Some(frames) = redirector.loopback_buffered_frames().filter(|_| mode == RedirectMode::Loopback) {
        line.push_str(&format!(", {} frames buffered", frames));
    }
    println!("{}", line);
}

/// One console command typed while a redirect runs.
#[derive(Debug, PartialEq)]
enum Action {
    Stop,
    Status,
    Volume(u32),
    Rate(u32),
    Format(SampleFormat),
    Restart,
    Invalid(String),
}

impl Action {
    fn parse(line: &str) -> Action {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Action::Stop;
        };
        let argument = words.collect::<Vec<_>>().join(" ");

        match command.to_ascii_lowercase().as_str() {
            "q" | "quit" | "stop" => Action::Stop,
            "s" | "status" => Action::Status,
            "r" | "restart" => Action::Restart,
            "v" | "volume" => match argument.trim_end_matches('%').parse() {
                Ok(percent) => Action::Volume(percent),
                Err(_) => Action::Invalid(format!("invalid volume: {:?}", argument)),
            },
            "rate" => match parse_sample_rate(&argument) {
                Some(rate) if redirect_core::SUPPORTED_SAMPLE_RATES.contains(&rate) => {
                    Action::Rate(rate)
                }
                _ => Action::Invalid(format!("unsupported sample rate: {:?}", argument)),
            },
            "format" => match parse_format(&argument) {
                Some(format) => Action::Format(format),
                None => Action::Invalid(format!("unrecognized format: {:?}", argument)),
            },
            other => Action::Invalid(format!("unknown command: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use redirect_core::testing::mock_host::MockHost;
    use redirect_core::{DeviceDirection, DeviceRole, ErrorKind, RedirectState};

    use super::*;

    fn args() -> StreamArgs {
        StreamArgs {
            format: "f32".into(),
            rate: "48000".into(),
            channels: 2,
            volume: 100,
            boost: 1,
        }
    }

    fn devices() -> Vec<DeviceDescriptor> {
        ["Speakers", "Headphones"]
            .iter()
            .enumerate()
            .map(|(i, name)| DeviceDescriptor {
                id: DeviceId::new(format!("dev-{}", i)),
                name: name.to_string(),
                is_default: i == 1,
                direction: DeviceDirection::Playback,
            })
            .collect()
    }

    #[test]
    fn resolves_by_index_id_name_and_default() {
        let list = devices();
        assert_eq!(resolve_device(&list, "0", "input").unwrap().as_str(), "dev-0");
        assert_eq!(resolve_device(&list, "dev-1", "input").unwrap().as_str(), "dev-1");
        assert_eq!(resolve_device(&list, "Speakers", "input").unwrap().as_str(), "dev-0");
        assert_eq!(resolve_device(&list, "default", "output").unwrap().as_str(), "dev-1");
    }

    #[test]
    fn out_of_range_index_names_the_side() {
        let err = resolve_device(&devices(), "7", "output").unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::Configuration("Selected output device index is out of range.".into())
        );
        let err = resolve_device(&devices(), "  ", "input").unwrap_err();
        assert!(err.to_string().contains("input"));
    }

    #[test]
    fn stream_config_accepts_codes_and_labels() {
        let mut a = args();
        a.format = "s16 (Signed 16-bit)".into();
        a.rate = "44100 Hz".into();
        let config = stream_config(&a).unwrap();
        assert_eq!(config, StreamConfig::new(SampleFormat::S16, 2, 44100));

        a.rate = "fast".into();
        assert!(stream_config(&a).is_err());
        a.rate = "12345".into();
        assert!(stream_config(&a).is_err());
        a.rate = "48000".into();
        a.format = "unknown".into();
        assert!(stream_config(&a).is_err());
    }

    #[test]
    fn boost_outside_range_is_rejected() {
        let mut a = args();
        a.boost = 11;
        assert!(volume_boost(&a).is_err());
    }

    #[test]
    fn actions_parse() {
        assert_eq!(Action::parse(""), Action::Stop);
        assert_eq!(Action::parse("q"), Action::Stop);
        assert_eq!(Action::parse("volume 150%"), Action::Volume(150));
        assert_eq!(Action::parse("rate 44100 Hz"), Action::Rate(44100));
        assert_eq!(Action::parse("format s24"), Action::Format(SampleFormat::S24));
        assert!(matches!(Action::parse("rate 1"), Action::Invalid(_)));
        assert!(matches!(Action::parse("jump"), Action::Invalid(_)));
    }

    #[test]
    fn session_applies_rate_change_on_restart() {
        let host = MockHost::new();
        let mut redirector = Redirector::new(host.clone());
        let mut a = args();
        a.volume = 50;

        let script = Cursor::new("status\nrate 44100\nrestart\nvolume 80\nquit\n");
        run(&mut redirector, RedirectMode::Loopback, "0", "spk-2", &a, script).unwrap();

        let opened = host.opened();
        assert_eq!(opened.len(), 4);
        assert_eq!(opened[0].1.sample_rate, 48000);
        assert_eq!(opened[3].1.sample_rate, 44100);
        assert_eq!(redirector.loopback_state(), RedirectState::Idle);
        assert_eq!(host.live_handles(), 0);
    }

    #[test]
    fn duplex_session_uses_capture_list() {
        let host = MockHost::new();
        let mut redirector = Redirector::new(host.clone());

        let script = Cursor::new("\n");
        run(&mut redirector, RedirectMode::Duplex, "default", "default", &args(), script).unwrap();

        assert_eq!(host.opened()[0].0, DeviceRole::Duplex);
        assert_eq!(host.live_handles(), 0);
    }
}
