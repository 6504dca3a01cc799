use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use nesulator::cli::parse_u16;
use nesulator::cpu::Cpu;
use nesulator::error::CpuError;
use nesulator::memory::{Ram, Rom};

const RAM_START: u16 = 0x0000;
const RAM_SIZE: usize = 0x0800;
const ROM_START: u16 = 0x8000;
const ROM_SIZE: usize = 0x8000;

struct HostConfig {
    image: PathBuf,
    load_address: u16,
    max_steps: Option<u64>,
}

impl HostConfig {
    fn from_args(args: &[String]) -> Result<Self> {
        if args.len() < 2 {
            bail!("Usage: {} <image> [load-address] [max-steps]", args[0]);
        }

        let load_address = match args.get(2) {
            Some(s) => parse_u16(s).with_context(|| format!("bad load address: {}", s))?,
            None => ROM_START,
        };
        if load_address < ROM_START {
            bail!("load address 0x{:04X} is below the ROM window at 0x{:04X}", load_address, ROM_START);
        }

        let max_steps = match args.get(3) {
            Some(s) => Some(s.parse::<u64>().with_context(|| format!("bad step limit: {}", s))?),
            None => None,
        };

        Ok(HostConfig {
            image: PathBuf::from(&args[1]),
            load_address,
            max_steps,
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = HostConfig::from_args(&args)?;

    log::info!("Loading image: {}", config.image.display());
    let offset = (config.load_address - ROM_START) as usize;
    let rom = Rom::load_from_file(&config.image, ROM_SIZE, offset)
        .with_context(|| format!("loading {}", config.image.display()))?;

    let mut cpu = Cpu::new();
    cpu.register_device(RAM_START, Ram::new(RAM_SIZE))
        .context("registering RAM")?;
    cpu.register_device(ROM_START, rom)
        .context("registering ROM")?;
    cpu.regs.pc = config.load_address;

    log::info!("Starting execution at 0x{:04X}", cpu.regs.pc);

    let mut steps = 0u64;
    loop {
        if config.max_steps.is_some_and(|limit| steps >= limit) {
            log::info!("Step limit reached");
            break;
        }
        match cpu.step() {
            Ok(_) => steps += 1,
            Err(CpuError::IllegalOpcode { opcode, address }) => {
                log::info!("Stopped on opcode 0x{:02X} at 0x{:04X}", opcode, address);
                break;
            }
        }
    }

    let regs = cpu.registers();
    println!(
        "steps={} cycles={} A={:02X} X={:02X} Y={:02X} SP={:02X} PC={:04X} P={:02X}",
        steps,
        cpu.cycles(),
        regs.a,
        regs.x,
        regs.y,
        regs.sp,
        regs.pc,
        regs.status.bits()
    );
    if cpu.bus().unmapped_accesses() > 0 {
        log::warn!("{} unmapped bus accesses", cpu.bus().unmapped_accesses());
    }

    Ok(())
}
