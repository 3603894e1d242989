use clap::Parser;
use log::error;
use grappa_lut::args::*;
use grappa_lut::build::{build, generate, inspect, new_config};
use grappa_lut::error::BuildError;

fn main(){
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = GrappaLutArgs::parse();
    use Action::*;
    let result:Result<(),BuildError> = match &args.action {
        NewConfig(args) => new_config(args),
        Build(args) => build(args).map(|out| println!("{}\n",out)),
        Generate(args) => generate(args).map(|out| println!("{}\n",out)),
        Inspect(args) => inspect(args).map(|report| println!("{}",report)),
    };
    if let Err(e) = result {
        error!("{}",e);
        std::process::exit(1);
    }
}
