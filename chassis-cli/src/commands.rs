//! CLI command implementations.
//!
//! Each command reports its own errors on stderr and returns the exit code
//! to use as `Err`.

use crate::cli::RunArgs;
use crate::EXIT_USAGE;
use chassis_common::error::ALL_FAULTS;
use chassis_common::{strerr, CodeSection};
use chassis_vm::{Vm, VmConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn read_bytes(path: &Path) -> Result<Vec<u8>, i32> {
    fs::read(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        EXIT_USAGE
    })
}

/// Execute a bytecode file. `Ok` carries r0 as the exit status.
pub fn run(args: &RunArgs) -> Result<i32, i32> {
    let code = read_bytes(&args.code)?;
    let seed = match &args.data {
        Some(path) => read_bytes(path)?,
        None => vec![0],
    };

    let section = match args.size {
        Some(size) => CodeSection::with_size(&code, size),
        None => CodeSection::new(&code),
    };
    let config = VmConfig::default().data_size(args.data_size);
    debug!(
        code_len = code.len(),
        declared = section.size(),
        data_size = config.data_size,
        "loading"
    );

    let mut vm = Vm::with_config(section, config);
    if args.skip_passthru {
        vm.set_passthru(|block: &[u8]| info!(len = block.len(), "skipping native block"));
    }

    match vm.start(&seed) {
        Ok(r0) => Ok(r0 as i32),
        Err(e) => {
            eprintln!("panic: {e} (code {})", e.exit_code());
            Err(e.exit_code())
        }
    }
}

/// Assemble a text file to bytecode.
pub fn assemble(input: &Path, output: Option<&Path>) -> Result<(), i32> {
    let output: PathBuf = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("bin"));

    let text = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", input.display());
        EXIT_USAGE
    })?;

    let code = chassis_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {e}");
        EXIT_USAGE
    })?;

    fs::write(&output, &code).map_err(|e| {
        eprintln!("error: cannot write '{}': {e}", output.display());
        EXIT_USAGE
    })?;

    eprintln!("assembled {} bytes -> {}", code.len(), output.display());
    Ok(())
}

/// Disassemble a bytecode file to text on stdout.
pub fn disassemble(input: &Path) -> Result<(), i32> {
    let code = read_bytes(input)?;
    print!("{}", chassis_assembler::disassemble(&code));
    Ok(())
}

/// Describe one fault code, or list the whole taxonomy.
pub fn explain(code: Option<u32>) -> Result<(), i32> {
    match code {
        Some(code) => {
            let text = strerr(code).ok_or_else(|| {
                eprintln!("error: unknown fault code {code}");
                EXIT_USAGE
            })?;
            println!("{code}: {text}");
        }
        None => {
            for fault in ALL_FAULTS {
                println!("{}: {}", fault.code(), fault.description());
            }
        }
    }
    Ok(())
}
