use crate::cli::InitArgs;
use crate::config::Config;
use anyhow::bail;

pub fn execute(args: InitArgs) -> anyhow::Result<()> {
    if args.config.exists() && !args.force {
        bail!(
            "{:?} already exists, use --force to overwrite",
            args.config
        );
    }

    let yaml = serde_yaml::to_string(&Config::default())?;
    std::fs::write(&args.config, yaml)?;
    println!("Wrote starter config to {:?}", args.config);
    Ok(())
}
