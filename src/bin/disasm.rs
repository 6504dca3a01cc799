use std::env;
use std::fs;

use anyhow::{bail, Context, Result};

use nesulator::cli::parse_u16;
use nesulator::disasm::disassemble;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("Usage: {} <image> [origin]", args[0]);
    }

    let path = &args[1];
    let origin = match args.get(2) {
        Some(s) => parse_u16(s).with_context(|| format!("bad origin: {}", s))?,
        None => 0x8000,
    };

    let image = fs::read(path).with_context(|| format!("reading {}", path))?;
    log::info!("{}: {} bytes at 0x{:04X}", path, image.len(), origin);

    let lines = disassemble(&image, origin);
    let undefined = lines.iter().filter(|l| l.text.starts_with(".byte")).count();
    for line in &lines {
        println!("{}", line);
    }

    println!("\n{} lines, {} undefined bytes", lines.len(), undefined);
    Ok(())
}
