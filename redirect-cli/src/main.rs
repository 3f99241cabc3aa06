mod audio_state;
mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use redirect_core::RedirectError;
use redirect_cpal::CpalHost;

use commands::StreamArgs;

/// Redirect audio from one endpoint to another: loopback (what a playback
/// device renders) or duplex (a capture device) into a playback device.
#[derive(Parser, Debug)]
#[command(name = "audio-redirect", version)]
struct Cli {
    /// Audio host to use (e.g. WASAPI, ALSA, JACK); platform default if unset
    #[arg(long, global = true)]
    host: Option<String>,

    /// Print listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List playback and capture devices
    Devices,
    /// List the formats, sample rates and volume boosts the stream options accept
    Formats,
    /// Redirect what a playback device renders into another playback device
    Loopback {
        /// Source playback device: index, id, or "default"
        #[arg(long, default_value = "default")]
        from: String,
        /// Destination playback device: index, id, or "default"
        #[arg(long)]
        to: String,
        #[command(flatten)]
        stream: StreamArgs,
    },
    /// Redirect a capture device into a playback device
    Duplex {
        #[arg(long, default_value = "default")]
        capture: String,
        #[arg(long, default_value = "default")]
        playback: String,
        #[command(flatten)]
        stream: StreamArgs,
    },
}

fn open_host(name: Option<&str>) -> Result<CpalHost, RedirectError> {
    match name {
        Some(name) => CpalHost::with_host_name(name).inspect_err(|_| {
            log::error!(
                "available hosts: {}",
                CpalHost::available_host_names().join(", ")
            );
        }),
        None => CpalHost::new(),
    }
}

fn run(cli: Cli) -> Result<(), RedirectError> {
    match cli.command {
        Command::Formats => {
            commands::list_formats(cli.json);
            Ok(())
        }
        Command::Devices => commands::list_devices(open_host(cli.host.as_deref())?, cli.json),
        Command::Loopback { from, to, stream } => {
            commands::run_loopback(open_host(cli.host.as_deref())?, &from, &to, &stream)
        }
        Command::Duplex {
            capture,
            playback,
            stream,
        } => commands::run_duplex(open_host(cli.host.as_deref())?, &capture, &playback, &stream),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.report());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn loopback_parses_stream_options() {
        let cli = Cli::try_parse_from([
            "audio-redirect",
            "loopback",
            "--to",
            "1",
            "--format",
            "s16",
            "--volume",
            "250",
            "--boost",
            "3",
        ])
        .unwrap();
        match cli.command {
            Command::Loopback { from, to, stream } => {
                assert_eq!(from, "default");
                assert_eq!(to, "1");
                assert_eq!(stream.format, "s16");
                assert_eq!(stream.rate, "48000");
                assert_eq!(stream.volume, 250);
                assert_eq!(stream.boost, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn loopback_requires_destination() {
        assert!(Cli::try_parse_from(["audio-redirect", "loopback"]).is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["audio-redirect", "devices", "--json", "--host", "ALSA"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.host.as_deref(), Some("ALSA"));
    }
}
