#![warn(
    clippy::use_self,
    deprecated_in_future,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

#[macro_use]
extern crate log;

use std::{
    collections::HashSet,
    fs,
    path::Path,
};

#[doc(hidden)]
#[macro_export]
macro_rules! get_variant {
    ($variant:path) => {
        |enum_| match enum_ {
            $variant(inner) => Some(inner),
            _ => None,
        }
    };
    ($variant:path { $($member:ident),+ }) => {
        |enum_| match enum_ {
            $variant { $($member),+, .. } => Some(( $($member),+ )),
            _ => None,
        }
    };
}

macro_rules! static_regex {
    ($($name:ident = $s:expr),+ $(,)?) => {
        $(
            static $name: ::once_cell::sync::Lazy<::regex::Regex> =
                ::once_cell::sync::Lazy::new(|| ::regex::Regex::new($s).unwrap());
        )+
    };
}

pub mod config;
pub mod vulkan;
pub use vulkan::VK_CONFIG;

pub mod adapter;
pub mod constants;
pub mod ctype;
pub mod enums;
pub mod extract;
pub mod headers;
pub mod logging;
pub mod procedures;
pub mod structs;
pub mod util;

use config::BindingsConfig;
use enums::{EnumDef, ReconstructError};

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "fetch")]
    #[error("failed to fetch header: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("GET {url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: u16,
    },
    #[error("header {0} is not in the header cache")]
    MissingHeader(String),
    #[error("failed to reconstruct flags: {0}")]
    Reconstruct(#[from] ReconstructError),
    #[error("malformed declaration of {name}: `{text}`")]
    MalformedDeclaration {
        name: String,
        text: String,
    },
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

pub const CORE_FILE: &str = "core.c3i";
pub const ENUMS_FILE: &str = "enums.c3i";
pub const STRUCTS_FILE: &str = "structs.c3i";
pub const PROCEDURES_FILE: &str = "procedures.c3i";
pub const LOADER_FILE: &str = "function-loader.c3";
pub const ADAPTERS_FILE: &str = "public-procedures.c3";

/// Output of the first pass, one string per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub core: String,
    pub enums: String,
    pub structs: String,
    pub procedures: String,
    pub function_loader: String,
}

impl GeneratedFiles {
    pub fn files(&self) -> [(&'static str, &str); 5] {
        [
            (CORE_FILE, self.core.as_str()),
            (ENUMS_FILE, self.enums.as_str()),
            (STRUCTS_FILE, self.structs.as_str()),
            (PROCEDURES_FILE, self.procedures.as_str()),
            (LOADER_FILE, self.function_loader.as_str()),
        ]
    }
}

/// Comment and module line every generated file starts with.
pub fn file_header(config: &BindingsConfig<'_>) -> String {
    let source = config.parsed_headers()
        .next()
        .map(|h| config.header_url(h))
        .unwrap_or_else(|| config.include_root.to_string());
    format!(
        "//\n// Vulkan wrapper generated from \"{}\"\n//\nmodule {};\n",
        source,
        config.module_name,
    )
}

/// Generates every first-pass file from the concatenated header source.
pub fn generate(config: &BindingsConfig<'_>, src: &str) -> Result<GeneratedFiles, GeneratorError> {
    let header = file_header(config);

    let enum_defs = enums::collect_enums(config, src)?;
    let mut declared: HashSet<String> = constants::declared_constants(constants::CORE_PREAMBLE)
        .map(str::to_string)
        .collect();
    declared.extend(
        enum_defs.iter()
            .filter_map(get_variant!(EnumDef::Plain))
            .flat_map(|e| e.member_names().map(str::to_string)),
    );

    let core = format!(
        "{}{}{}{}\n\n",
        &header,
        constants::CORE_PREAMBLE,
        constants::write_constants(config, src, &declared)?,
        constants::write_handles(src),
    );
    let enums = format!("{}\n{}", &header, enums::write_enums(config, src, &enum_defs)?);
    let structs = format!(
        "{}{}\n{}\n\n",
        &header,
        structs::STRUCTS_PREAMBLE,
        structs::write_structs(config, src)?,
    );

    let procs = procedures::collect_procedures(config, src)?;
    debug!("collected {} procedures", procs.len());
    let procedures = format!("{}\n{}", &header, procedures::write_procedures(&procs));
    let function_loader = format!("{}\n{}", &header, procedures::write_loader(&procs));

    Ok(GeneratedFiles {
        core,
        enums,
        structs,
        procedures,
        function_loader,
    })
}

/// Fetches missing headers into `headers_dir`, then regenerates every
/// first-pass file in `out_dir`.
pub fn write_source_code<P: AsRef<Path>>(
    config: &BindingsConfig<'_>,
    headers_dir: &Path,
    out_dir: P,
) -> Result<(), GeneratorError> {
    info!("writing {} bindings from {}", config.module_name, headers_dir.display());
    headers::fetch_headers(config, headers_dir)?;
    let src = headers::read_sources(config, headers_dir)?;
    let files = generate(config, &src)?;

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    for (name, contents) in files.files() {
        let path = out_dir.join(name);
        fs::write(&path, contents)?;
        debug!("wrote {}", path.display());
    }
    Ok(())
}

/// Second pass: reads `procedures.c3i` from `out_dir` and writes the
/// wrappers next to it.
pub fn write_adapters<P: AsRef<Path>>(config: &BindingsConfig<'_>, out_dir: P) -> Result<(), GeneratorError> {
    let out_dir = out_dir.as_ref();
    let procedures = fs::read_to_string(out_dir.join(PROCEDURES_FILE))?;
    let adapters = adapter::write_adapters(config.module_name, config.result_type, &procedures);
    let path = out_dir.join(ADAPTERS_FILE);
    fs::write(&path, adapters)?;
    info!("wrote {}", path.display());
    Ok(())
}
