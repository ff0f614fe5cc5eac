extern crate clap;
use crossbeam_channel::bounded; // Inter-thread communication
use ctrlc; // exit using cntrl-c
use env_logger;
use log::{error, info};

use s370_core::{Cpu, CpuConfig, ExecResult, Strategy};

// Runner defaults
const DEFAULT_LOAD_ADDRESS: u32 = 0x0000;
const DEFAULT_MEMORY_KIB: usize = 16 * 1024;

/// Configures command-line interface using clap
fn get_cli_config<'a>() -> clap::ArgMatches<'a> {
    let description = "System/370 BC-mode instruction execution core";
    clap::App::new("s370")
        .version("0.1")
        .about(description)
        .arg(
            clap::Arg::with_name("IMAGE")
                .help("Raw core image loaded byte for byte into real storage")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::with_name("load")
                .long("load")
                .takes_value(true)
                .help("Storage address the image is loaded at (hex, default 0)"),
        )
        .arg(
            clap::Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .help("Initial instruction address (hex, defaults to the load address)"),
        )
        .arg(
            clap::Arg::with_name("memory")
                .long("memory")
                .takes_value(true)
                .help("Installed storage in KiB (default 16384)"),
        )
        .arg(
            clap::Arg::with_name("dispatch")
                .long("dispatch")
                .takes_value(true)
                .possible_values(&["match", "table"])
                .help("Opcode dispatch strategy"),
        )
        .arg(
            clap::Arg::with_name("max-steps")
                .long("max-steps")
                .takes_value(true)
                .help("Stop after this many instructions"),
        )
        .arg(
            clap::Arg::with_name("count")
                .long("count")
                .help("Report per-opcode execution counts on exit"),
        )
        .get_matches()
}

fn parse_address(text: &str) -> Result<u32, String> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("bad address '{}': {}", text, e))
}

fn parse_number(text: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .map_err(|e| format!("bad number '{}': {}", text, e))
}

/// Everything the runner needs, parsed up front
struct RunConfig {
    image: String,
    load: u32,
    start: u32,
    max_steps: Option<usize>,
    cpu: CpuConfig,
}

fn run_config(matches: &clap::ArgMatches) -> Result<RunConfig, String> {
    let load = match matches.value_of("load") {
        Some(v) => parse_address(v)?,
        None => DEFAULT_LOAD_ADDRESS,
    };
    let start = match matches.value_of("start") {
        Some(v) => parse_address(v)?,
        None => load,
    };
    let memory_kib = match matches.value_of("memory") {
        Some(v) => parse_number(v)?,
        None => DEFAULT_MEMORY_KIB,
    };
    let max_steps = match matches.value_of("max-steps") {
        Some(v) => Some(parse_number(v)?),
        None => None,
    };
    let strategy = match matches.value_of("dispatch") {
        Some("match") => Strategy::Match,
        _ => Strategy::Table,
    };

    Ok(RunConfig {
        image: matches.value_of("IMAGE").unwrap_or_default().to_string(),
        load,
        start,
        max_steps,
        cpu: CpuConfig {
            memory_size: memory_kib * 1024,
            strategy,
            count_opcodes: matches.is_present("count"),
        },
    })
}

/// The image must lie wholly inside installed storage; no wrap into low core
fn image_fits(load: u32, len: usize, memory_size: usize) -> bool {
    (load as usize)
        .checked_add(len)
        .map_or(false, |end| end <= memory_size)
}

fn report_counts(cpu: &Cpu) {
    if let Some(counts) = cpu.opcode_counts() {
        for (opcode, count) in counts.iter().enumerate().filter(|(_, c)| **c > 0) {
            info!("opcode {:02X}: {}", opcode, count);
        }
    }
}

/// Main entry point for the runner
fn main() {
    env_logger::init();

    // Set up Ctrl-C handler with channel communication
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(-1); // Emergency exit if channel blocked
        }
        let _send_result = signal_sender.send(()); // Send shutdown signal
    });

    if let Err(e) = handler_result {
        error!("Signal handler failed: {:?}", e);
        std::process::exit(1);
    }

    // Parse command-line arguments
    let cli_matches = get_cli_config();
    let config = match run_config(&cli_matches) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Load the core image
    let image = match std::fs::read(&config.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Unable to read {}: {}", config.image, e);
            std::process::exit(1);
        }
    };

    let mut cpu = Cpu::new(config.cpu);
    if !image_fits(config.load, image.len(), cpu.memory_size()) {
        error!(
            "Image of {} bytes at 0x{:06X} does not fit in {} bytes of storage",
            image.len(),
            config.load,
            cpu.memory_size()
        );
        std::process::exit(1);
    }
    cpu.poke_bytes(config.load, &image);
    cpu.set_ia(config.start);
    info!(
        "Loaded {} bytes at 0x{:06X}, starting at 0x{:06X}",
        image.len(),
        config.load,
        config.start
    );

    // Main execution loop
    let mut failed = false;
    loop {
        if !signal_receiver.is_empty() {
            info!("Interrupted at 0x{:06X}", cpu.ia());
            break;
        }
        if let Some(limit) = config.max_steps {
            if cpu.total_instructions >= limit {
                info!("Step limit of {} reached", limit);
                break;
            }
        }

        match cpu.execute_instruction(0) {
            Ok(ExecResult::Ok) => {
                if cpu.is_waiting() {
                    info!("Wait state, PSW {:016X}", cpu.psw().to_u64());
                    break;
                }
            }
            Ok(ExecResult::Privileged(code)) => {
                info!("Privileged operation 0x{:X} at 0x{:06X}", code, cpu.ia());
                break;
            }
            Ok(ExecResult::InvalidOpcode) => {
                error!("Unimplemented instruction at 0x{:06X}", cpu.ia());
                failed = true;
                break;
            }
            Err(e) => {
                error!("{}", e);
                failed = true;
                break;
            }
        }
    }

    info!("{} instructions executed", cpu.total_instructions);
    report_counts(&cpu);
    if failed {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    #[test]
    fn test_image_fits() {
        assert!(image_fits(0, 4096, 4096));
        assert!(image_fits(0x800, 0x800, 4096));
        assert!(!image_fits(0x801, 0x800, 4096));
        assert!(!image_fits(0, 4097, 4096));
        assert!(image_fits(0x00FF_FFF0, 0x10, 1 << 24));
        assert!(!image_fits(0x00FF_FFF0, 0x11, 1 << 24));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1000"), Ok(0x1000));
        assert_eq!(parse_address("FF"), Ok(0xFF));
        assert!(parse_address("zz").is_err());
    }
}
