use clap::Parser;
use env_logger::Env;
use highmask::{
    batch::BatchCoordinator,
    discover::{InputFilter, find_images},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The directory containing the source images.
    #[arg(default_value = "Online-test")]
    image_dir: PathBuf,

    /// The directory to write the `<name>_mask.png` files to.
    #[arg(short, long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Number of worker threads, defaults to the available parallelism.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Which files in the image directory are processed.
    #[arg(long, value_enum, default_value_t = InputFilter::Extension)]
    filter: InputFilter,
}

fn main() -> highmask::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!(
        "Starting mask creation for directory: {:?}",
        args.image_dir
    );

    let image_files = find_images(&args.image_dir, args.filter)?;
    let coordinator = BatchCoordinator::new(args.threads)?;
    coordinator.run(&image_files, &args.output_dir);

    Ok(())
}
