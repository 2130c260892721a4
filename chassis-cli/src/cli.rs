use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chassis", version, about = "Run and build Chassis bytecode")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Execute a bytecode file; the exit status is r0 or the fault code
    Run(RunArgs),
    /// Assemble a text file to bytecode
    Assemble {
        input: PathBuf,
        /// Output path (defaults to the input with a .bin extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Disassemble a bytecode file to text
    Disassemble { input: PathBuf },
    /// Describe a fault code, or list all of them
    Explain { code: Option<u32> },
}

#[derive(Args)]
pub struct RunArgs {
    /// Bytecode file
    pub code: PathBuf,
    /// File whose contents seed the data section
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Data section capacity in bytes
    #[arg(long, default_value_t = chassis_vm::config::DATA_SECTION_SIZE)]
    pub data_size: usize,
    /// Declared code size (defaults to the file length)
    #[arg(long)]
    pub size: Option<u32>,
    /// Log and step over PASSTHRU blocks instead of faulting
    #[arg(long)]
    pub skip_passthru: bool,
}
