use anyhow::Result;
use arcade::{
    cli::{self, Args, SAVE_DIR_VAR},
    logging, output, run,
};
use arcade_atari_env::ale::Ale;
use clap::Parser;
use std::env;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.experiment_config()?;

    if args.show_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let requested = args.requested_save_dir(env::var_os(SAVE_DIR_VAR));
    let save_dir = output::resolve_save_dir(&args.project_dir, requested.as_deref())?;
    logging::init(&save_dir.path)?;
    cli::warn_if_rejected(&save_dir);

    run::train::<Ale>(&config, &save_dir.path)?;

    Ok(())
}
