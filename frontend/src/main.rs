use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{ArgAction, Parser, Subcommand};
use snespad_core::input::{ButtonMapping, DevicePoller, MappingStore, SnesButton, StoreError};
use tracing::{Level, warn};

mod config;
mod host;
mod monitor;
mod store;

use config::Settings;
use host::SdlDevices;
use store::FileStore;

/// SNES joypad on a user-port PIO, driven by host game controllers.
#[derive(Parser)]
#[command(name = "snespad", version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: <config dir>/snespad/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List connected controllers.
    List,
    /// Show a controller's button mapping.
    Show { index: usize },
    /// Bind a pad button to a host button (or `ignore`) and save.
    Map {
        index: usize,
        button: SnesButton,
        #[arg(value_parser = parse_host_index, allow_hyphen_values = true)]
        host: HostIndex,
    },
    /// Restore and save the default mapping for a controller.
    Reset { index: usize },
    /// Attach a controller and print pad reads as they change.
    Monitor { index: usize },
}

#[derive(Clone, Copy, Debug)]
struct HostIndex(Option<u8>);

fn parse_host_index(s: &str) -> Result<HostIndex, String> {
    if s.eq_ignore_ascii_case("ignore") || s == "-1" {
        return Ok(HostIndex(None));
    }
    s.parse::<u8>()
        .map(|i| HostIndex(Some(i)))
        .map_err(|_| format!("expected a host button index 0-255 or `ignore`, got {s:?}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("snespad: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config_dir = config::config_dir();
    let settings = match cli
        .config
        .clone()
        .or_else(|| config_dir.as_ref().map(|dir| dir.join("config.toml")))
    {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };

    let mapping_path = settings
        .mapping_path(config_dir.as_deref())
        .ok_or("no config directory found; set mapping_file in the settings file")?;
    let mut mappings = MappingStore::new(open_store(&mapping_path)?);

    let sdl = sdl2::init()?;
    let devices = Rc::new(SdlDevices::open(sdl.game_controller()?)?);

    match cli.command {
        Command::List => {
            let connected = devices.list_connected();
            if connected.is_empty() {
                println!("no game controllers connected");
            }
            for device in connected {
                println!(
                    "{}: {} ({} buttons, {} axes)",
                    device.index,
                    device.id,
                    device.state.buttons.len(),
                    device.state.axes.len()
                );
            }
        }
        Command::Show { index } => {
            let id = device_id(&devices, index)?;
            print_mapping(&id, &mappings.working(&id));
        }
        Command::Map {
            index,
            button,
            host,
        } => {
            let id = device_id(&devices, index)?;
            mappings.set(&id, button, host.0);
            mappings.save_working(&id)?;
            print_mapping(&id, &mappings.working(&id));
        }
        Command::Reset { index } => {
            let id = device_id(&devices, index)?;
            mappings.save(&id, &ButtonMapping::new())?;
            print_mapping(&id, &mappings.working(&id));
        }
        Command::Monitor { index } => {
            let mut event_pump = sdl.event_pump()?;
            monitor::run(
                devices,
                &mut event_pump,
                &mut mappings,
                index,
                settings.adapter_pins(),
                settings.poll_interval(),
            )?;
        }
    }

    Ok(())
}

/// Open the mapping file. An unreadable file is treated as empty; the next
/// save replaces it.
fn open_store(path: &std::path::Path) -> Result<FileStore, StoreError> {
    match FileStore::open(path) {
        Ok(store) => Ok(store),
        Err(StoreError::Format(msg)) => {
            warn!(path = %path.display(), %msg, "ignoring unreadable mapping file");
            Ok(FileStore::empty(path))
        }
        Err(e) => Err(e),
    }
}

fn device_id(devices: &SdlDevices, index: usize) -> Result<String, String> {
    devices
        .device_id(index)
        .ok_or_else(|| format!("no controller at index {index}"))
}

fn print_mapping(id: &str, mapping: &ButtonMapping) {
    println!("{id}");
    for button in SnesButton::ALL {
        match mapping.host_index(button) {
            Some(index) => println!(
                "  {:<8} {index:>3} ({})",
                button.name(),
                host::host_button_name(index)
            ),
            None => println!("  {:<8} ignore", button.name()),
        }
    }
}
