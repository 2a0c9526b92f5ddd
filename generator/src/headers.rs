use std::{
    fs,
    path::Path,
};
use crate::{
    config::{BindingsConfig, HeaderSource},
    GeneratorError,
};

/// Makes sure every configured header exists in `dir`, downloading the
/// missing ones. Headers already present are never refreshed.
pub fn fetch_headers(config: &BindingsConfig<'_>, dir: &Path) -> Result<(), GeneratorError> {
    fs::create_dir_all(dir)?;
    for header in config.headers {
        let path = dir.join(header.file);
        if path.is_file() {
            trace!("using cached header {}", path.display());
            continue;
        }
        let text = download(config, header)?;
        fs::write(&path, text)?;
        info!("fetched {} into {}", header.file, dir.display());
    }
    Ok(())
}

#[cfg(feature = "fetch")]
fn download(config: &BindingsConfig<'_>, header: &HeaderSource<'_>) -> Result<String, GeneratorError> {
    let url = config.header_url(header);
    debug!("GET {}", &url);
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let response = client.get(&url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(GeneratorError::HttpStatus { url, status: status.as_u16() });
    }
    Ok(response.text()?)
}

#[cfg(not(feature = "fetch"))]
fn download(_config: &BindingsConfig<'_>, header: &HeaderSource<'_>) -> Result<String, GeneratorError> {
    Err(GeneratorError::MissingHeader(header.file.to_string()))
}

/// Concatenates the parsed headers in configuration order.
pub fn read_sources(config: &BindingsConfig<'_>, dir: &Path) -> Result<String, GeneratorError> {
    let mut src = String::new();
    for header in config.parsed_headers() {
        let path = dir.join(header.file);
        if !path.is_file() {
            return Err(GeneratorError::MissingHeader(header.file.to_string()));
        }
        src.push_str(&fs::read_to_string(&path)?);
    }
    debug!("read {} bytes of header source", src.len());
    Ok(src)
}
