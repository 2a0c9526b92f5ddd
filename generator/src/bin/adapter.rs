use vkc3_generator::{
    logging,
    write_adapters,
    GeneratorError,
    VK_CONFIG,
};
use std::path::{
    Path,
    PathBuf,
};

fn main() -> Result<(), GeneratorError> {
    logging::init(env!("CARGO_CRATE_NAME"));
    let cwd = std::env::current_dir()?;
    let out_dir = match std::env::var_os("VKC3_OUT") {
        Some(dir) => PathBuf::from(dir),
        None if cwd.ends_with("generator") => Path::new("..").to_path_buf(),
        None => Path::new(".").to_path_buf(),
    };
    write_adapters(&VK_CONFIG, &out_dir)
}
