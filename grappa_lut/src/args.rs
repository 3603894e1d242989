use clap;
use std::path::PathBuf;

#[derive(clap::Parser,Debug)]
#[command(about = "GRAPPA-style 3D k-space undersampling lut generator")]
pub struct GrappaLutArgs {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(clap::Subcommand,Debug)]
pub enum Action {
    /// write a config file with default parameters
    NewConfig(NewConfigArgs),
    /// generate a lut from a config file
    Build(BuildArgs),
    /// generate a lut from command line parameters
    Generate(GenerateArgs),
    /// summarize an existing lut (file or directory)
    Inspect(InspectArgs),
}

#[derive(clap::Args,Debug)]
pub struct NewConfigArgs {
    pub destination:PathBuf
}

#[derive(clap::Args,Debug)]
pub struct BuildArgs {
    pub config:PathBuf,
    #[clap(short, long)]
    pub output_dir:Option<PathBuf>
}

#[derive(clap::Args,Debug)]
pub struct GenerateArgs {
    pub ky:usize,
    pub kz:usize,
    #[clap(long, default_value_t = 25)]
    pub acs_ky:usize,
    #[clap(long, default_value_t = 25)]
    pub acs_kz:usize,
    #[clap(long, default_value_t = 2.0)]
    pub ry:f64,
    #[clap(long, default_value_t = 2.0)]
    pub rz:f64,
    #[clap(short, long, default_value = "./output")]
    pub output_dir:PathBuf,
    #[clap(long)]
    pub no_mask:bool,
    #[clap(long)]
    pub no_headfile:bool,
}

#[derive(clap::Args,Debug)]
pub struct InspectArgs {
    pub path:PathBuf
}
