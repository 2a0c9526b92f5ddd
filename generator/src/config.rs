use std::fmt;

/// Which loader entry point populates a procedure's function pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchGroup {
    Loader,
    Misc,
    Instance,
    Device,
}

impl DispatchGroup {
    /// Order in which procedure type blocks are written.
    pub const ALL: [DispatchGroup; 4] = [
        DispatchGroup::Loader,
        DispatchGroup::Misc,
        DispatchGroup::Instance,
        DispatchGroup::Device,
    ];

    /// Groups that get a function pointer variable and a loader entry.
    pub const LOADED: [DispatchGroup; 3] = [
        DispatchGroup::Loader,
        DispatchGroup::Instance,
        DispatchGroup::Device,
    ];

    #[inline(always)]
    pub fn is_loaded(self) -> bool {
        self != DispatchGroup::Misc
    }
}

impl fmt::Display for DispatchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loader => "Loader",
            Self::Misc => "Misc",
            Self::Instance => "Instance",
            Self::Device => "Device",
        })
    }
}

/// One upstream header: local file name, path below the include root, and
/// whether its declarations are parsed or it is only cached.
#[derive(Debug, Clone, Copy)]
pub struct HeaderSource<'a> {
    pub file: &'a str,
    pub upstream_path: &'a str,
    pub parse: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FunctionsConfig<'a> {
    /// Procedures whose group is fixed regardless of their parameters.
    pub known_fns: &'a [(&'a str, DispatchGroup)],
    /// First-parameter type to group.
    pub dispatch_types: &'a [(&'a str, DispatchGroup)],
    /// First-parameter types of callbacks, which are never loaded.
    pub misc_types: &'a [&'a str],
}

impl<'a> FunctionsConfig<'a> {
    /// `first_param` is the converted type of the first formal parameter, or
    /// `None` for a `(void)` parameter list.
    pub fn dispatch_group(&self, proc_name: &str, first_param: Option<&str>) -> DispatchGroup {
        if let Some(&(_, group)) = self.known_fns.iter().find(|&&(n, _)| n == proc_name) {
            return group;
        }
        let Some(ty) = first_param else {
            return DispatchGroup::Misc;
        };
        self.dispatch_types
            .iter()
            .find(|&&(t, _)| t == ty)
            .map(|&(_, group)| group)
            .or_else(|| self.misc_types.contains(&ty).then_some(DispatchGroup::Misc))
            .unwrap_or(DispatchGroup::Loader)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConstantsConfig<'a> {
    /// `#define VK_<name>` names copied into the general constants block.
    pub general: &'a [&'a str],
    /// Suffixes a `#define VK_STD_<name>` must end with to be copied.
    pub codec_suffixes: &'a [&'a str],
}

#[derive(Debug, Clone, Copy)]
pub struct BindingsConfig<'a> {
    pub module_name: &'a str,
    pub include_root: &'a str,
    pub headers: &'a [HeaderSource<'a>],
    pub vendor_suffixes: &'a [&'a str],
    pub flag_suffixes: (&'a str, &'a str),
    pub result_type: &'a str,
    pub constants: ConstantsConfig<'a>,
    pub functions: FunctionsConfig<'a>,
}

impl<'a> BindingsConfig<'a> {
    #[inline(always)]
    pub fn bits_to_flags(&self, s: &str) -> String {
        let (bits, flags) = self.flag_suffixes;
        s.replace(bits, flags)
    }

    #[inline]
    pub fn header_url(&self, header: &HeaderSource<'_>) -> String {
        format!("{}{}", self.include_root, header.upstream_path)
    }

    #[inline]
    pub fn parsed_headers(&self) -> impl Iterator<Item = &HeaderSource<'a>> + '_ {
        self.headers.iter().filter(|h| h.parse)
    }

    /// Returns `(vendor, stripped)` for the first configured vendor suffix
    /// that `name` ends with after an underscore.
    pub fn strip_vendor_suffix<'s>(&self, name: &'s str) -> Option<(&'a str, &'s str)> {
        self.vendor_suffixes.iter().copied().find_map(|vendor| {
            name.strip_suffix(vendor)
                .and_then(|s| s.strip_suffix('_'))
                .map(|s| (vendor, s))
        })
    }
}
