use vkc3_generator::{
    logging,
    write_adapters,
    write_source_code,
    GeneratorError,
    VK_CONFIG,
};
use std::{
    borrow::Cow,
    ffi::OsStr,
    path::{
        Path,
        PathBuf,
    },
};

#[inline(always)]
fn env_or<'a, K: AsRef<OsStr>>(key: K, default_value: &'a Path) -> Cow<'a, Path> {
    std::env::var_os(key)
        .map(PathBuf::from)
        .map_or(Cow::Borrowed(default_value), Cow::Owned)
}

fn main() -> Result<(), GeneratorError> {
    logging::init(env!("CARGO_CRATE_NAME"));
    let cwd = std::env::current_dir()?;
    let (headers_default, out_default) = if cwd.ends_with("generator") {
        (Path::new("headers"), Path::new(".."))
    } else {
        (Path::new("generator/headers"), Path::new("."))
    };
    let headers_dir = env_or("VKC3_HEADERS", headers_default);
    let out_dir = env_or("VKC3_OUT", out_default);
    write_source_code(&VK_CONFIG, headers_dir.as_ref(), &*out_dir)?;
    write_adapters(&VK_CONFIG, &*out_dir)
}
