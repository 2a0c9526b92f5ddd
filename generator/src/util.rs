use heck::ToUpperCamelCase;
use itertools::Itertools;

pub trait NameExt {
    /// Removes the `Vk`/`VK_` and Vulkan Video `Std`/`STD_`/`VK_STD` prefixes
    /// from every word, and renames `PFN_` function pointer types to `Proc`.
    ///
    /// The prefixes are stripped at the start of *every* `\w+` run, so a name
    /// that merely starts with `Std` (`Stdout`) loses it as well.
    fn strip_vk(&self) -> String;
    /// `CullModeFlagBits` => `CULL_MODE_FLAG_BITS`
    fn shouty_snake_case(&self) -> String;
    /// Field and parameter names: drops Hungarian pointer prefixes and
    /// escapes names reserved in C3.
    fn fix_arg(&self) -> String;
    /// `FooKhr` => `FooKHR`
    fn fix_ext_suffix(&self, vendors: &[&str]) -> String;
    fn fix_enum_arg(&self, is_flag_bit: bool, vendors: &[&str]) -> String;
    /// `ProcCreateInstance` => `createInstance`
    fn proc_var_name(&self) -> String;
    fn is_int(&self) -> bool;
}

impl NameExt for str {
    fn strip_vk(&self) -> String {
        static_regex! {
            VK_PREFIX = r"(?:Vk|VK_)?(\w+)",
            STD_PREFIX = r"(?:Std|STD_|VK_STD)?(\w+)",
        }
        let s = self
            .replace("PFN_vk_icd", "Procicd")
            .replace("PFN_vk", "Proc")
            .replace("PFN_", "Proc");
        let s = VK_PREFIX.replace_all(&s, "${1}");
        STD_PREFIX.replace_all(&s, "${1}").into_owned()
    }

    fn shouty_snake_case(&self) -> String {
        static_regex! {
            WORD_START = r"(.)([A-Z][a-z]+)",
            CASE_CHANGE = r"([a-z0-9])([A-Z])",
        }
        let s = WORD_START.replace_all(self, "${1}_${2}");
        CASE_CHANGE.replace_all(&s, "${1}_${2}").to_uppercase()
    }

    fn fix_arg(&self) -> String {
        let mut name = self;
        for prefix in ["s_", "p_", "pp_", "pfn_"] {
            if let Some(s) = name.strip_prefix(prefix) {
                name = s;
            }
        }
        let mut name = name.to_string();
        if matches!(name.as_str(), "module" | "any") {
            name.push('_');
        }
        name.replace("__", "_")
    }

    fn fix_ext_suffix(&self, vendors: &[&str]) -> String {
        vendors
            .iter()
            .map(|v| (v, v.to_upper_camel_case()))
            .find_map(|(vendor, title)| self.strip_suffix(title.as_str()).map(|s| format!("{s}{vendor}")))
            .unwrap_or_else(|| self.to_string())
    }

    fn fix_enum_arg(&self, is_flag_bit: bool, vendors: &[&str]) -> String {
        let mut name = self.fix_ext_suffix(vendors);
        let mut chars = name.chars();
        if let Some(first) = chars.next().filter(char::is_ascii_digit) {
            if !name.starts_with("0x") && !name.is_int() {
                name = match chars.next() {
                    // 2D_ARRAY => D2_ARRAY
                    Some('D') => format!("D{first}{}", &name[2..]),
                    _ => format!("_{name}"),
                };
            }
        }
        if is_flag_bit {
            name = name.replace("_BIT", "");
        }
        if matches!(name.as_str(), "module" | "any" | "MODULE" | "ANY") {
            name.push('_');
        }
        name
    }

    fn proc_var_name(&self) -> String {
        let Some(rest) = self.strip_prefix("Proc") else {
            return self.to_string();
        };
        let mut chars = rest.chars();
        chars
            .next()
            .map(|c| c.to_lowercase().chain(chars).collect())
            .unwrap_or_default()
    }

    #[inline]
    fn is_int(&self) -> bool {
        self.trim().parse::<i128>().is_ok()
    }
}

/// Width of the longest name, used to align a block of declarations.
pub fn column_width<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> usize {
    names
        .into_iter()
        .map(|s| s.as_ref().len())
        .max()
        .unwrap_or(0)
}

/// Joins lines with `\n`, leaving a trailing newline.
pub fn lines<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> String {
    items
        .into_iter()
        .map(|s| format!("{}\n", s.as_ref()))
        .join("")
}
