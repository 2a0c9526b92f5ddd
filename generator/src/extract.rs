//! Regex extraction of the declaration families found in the Khronos headers.
//!
//! These are pattern matches over raw header text, not a C parser. The
//! grammar they accept is the narrow, regular one the published headers use.

use itertools::Itertools;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumDecl<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember<'a> {
    /// Without the `VK_`/`STD_` prefix.
    pub name: &'a str,
    pub value: &'a str,
}

/// A `static const Vk…FlagBits2 VK_… = …;` pseudo-enum member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticFlag<'a> {
    pub ty: &'a str,
    pub name: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    Union,
}

impl StructKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructDecl<'a> {
    pub kind: StructKind,
    /// Without the `Vk`/`Std` prefix.
    pub name: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl<'a> {
    pub ty: &'a str,
    /// May carry an array suffix (`name[N]`) or be a bare bit width.
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcTypedef<'a> {
    pub return_type: &'a str,
    /// The C name, `PFN_vk…`.
    pub name: &'a str,
    pub params: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Define<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handles<'a> {
    pub dispatchable: Vec<&'a str>,
    pub non_dispatchable: Vec<&'a str>,
}

pub fn enums(src: &str) -> Vec<EnumDecl<'_>> {
    static_regex! {
        ENUM = r"(?s)typedef enum (\w+) \{(.+?)\} \w+;",
    }
    ENUM.captures_iter(src)
        .filter_map(|c| Some(EnumDecl {
            name: c.get(1)?.as_str(),
            body: c.get(2)?.as_str(),
        }))
        .collect()
}

/// Members written as `NAME = value` followed by a comma. The trailing
/// `_MAX_ENUM` member has no comma and is never matched.
pub fn enum_members(body: &str) -> Vec<EnumMember<'_>> {
    static_regex! {
        MEMBER = r"(?s)\b(?:VK_|STD_)(\w+?) = (.*?)(?:,|\})",
    }
    MEMBER.captures_iter(body)
        .filter_map(|c| Some(EnumMember {
            name: c.get(1)?.as_str(),
            value: c.get(2)?.as_str().trim(),
        }))
        .collect()
}

pub fn static_flag_bits(src: &str) -> Vec<StaticFlag<'_>> {
    static_regex! {
        STATIC_FLAG = r"static const Vk(\w+FlagBits2) VK_(\w+?) = (\w+);",
    }
    STATIC_FLAG.captures_iter(src)
        .filter_map(|c| Some(StaticFlag {
            ty: c.get(1)?.as_str(),
            name: c.get(2)?.as_str(),
            value: c.get(3)?.as_str(),
        }))
        .collect()
}

pub fn handles(src: &str) -> Handles<'_> {
    static_regex! {
        HANDLE = r"VK_DEFINE_HANDLE\(Vk(\w+)\)",
        NON_DISPATCHABLE_HANDLE = r"VK_DEFINE_NON_DISPATCHABLE_HANDLE\(Vk(\w+)\)",
    }
    let names = |re: &Regex| re
        .captures_iter(src)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .unique()
        .collect();
    Handles {
        dispatchable: names(&HANDLE),
        non_dispatchable: names(&NON_DISPATCHABLE_HANDLE),
    }
}

/// Names declared as `typedef VkFlags Vk<name>;`.
pub fn flag_typedefs(src: &str) -> Vec<&str> {
    static_regex! {
        FLAGS = r"typedef VkFlags Vk(\w+?);",
    }
    FLAGS.captures_iter(src)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

pub fn structs(src: &str) -> Vec<StructDecl<'_>> {
    static_regex! {
        VK_STRUCT = r"(?s)typedef (struct|union) Vk(\w+?) \{(.+?)\} \w+?;",
        STD_STRUCT = r"(?s)typedef (struct|union) Std(\w+?) \{(.+?)\} \w+?;",
    }
    [&*VK_STRUCT, &*STD_STRUCT]
        .into_iter()
        .flat_map(|re| re.captures_iter(src))
        .filter_map(|c| Some(StructDecl {
            kind: match c.get(1)?.as_str() {
                "union" => StructKind::Union,
                _ => StructKind::Struct,
            },
            name: c.get(2)?.as_str(),
            body: c.get(3)?.as_str(),
        }))
        .collect()
}

pub fn struct_fields(body: &str) -> Vec<FieldDecl<'_>> {
    static_regex! {
        FIELD = r"\s+(.+?)[\s:]+([_a-zA-Z0-9\[\]]+);",
    }
    FIELD.captures_iter(body)
        .filter_map(|c| Some(FieldDecl {
            ty: c.get(1)?.as_str(),
            name: c.get(2)?.as_str(),
        }))
        .collect()
}

/// `typedef Vk<target> Vk<name>;` pairs as `(target, name)`.
pub fn type_aliases(src: &str) -> Vec<(&str, &str)> {
    static_regex! {
        ALIAS = r"typedef Vk(\w+?) Vk(\w+?);",
    }
    ALIAS.captures_iter(src)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect()
}

pub fn proc_typedefs(src: &str) -> Vec<ProcTypedef<'_>> {
    static_regex! {
        PROC = r"(?s)typedef (\w+\*?) \(\w+ \*(\w+)\)\((.+?)\);",
    }
    PROC.captures_iter(src)
        .filter_map(|c| Some(ProcTypedef {
            return_type: c.get(1)?.as_str(),
            name: c.get(2)?.as_str(),
            params: c.get(3)?.as_str(),
        }))
        .collect()
}

fn collect_defines<'a>(re: &Regex, src: &'a str) -> Vec<Define<'a>> {
    re.captures_iter(src)
        .filter_map(|c| Some(Define {
            name: c.get(1)?.as_str(),
            value: c.get(2)?.as_str(),
        }))
        .collect()
}

/// `#define VK_<name> <value>`
pub fn vk_defines(src: &str) -> Vec<Define<'_>> {
    static_regex! {
        VK_DEFINE = r"(?m)^#define VK_(\w+)[ \t]+(.+?)[ \t]*\r?$",
    }
    collect_defines(&VK_DEFINE, src)
}

/// `#define STD_<name> <value>`
pub fn std_defines(src: &str) -> Vec<Define<'_>> {
    static_regex! {
        STD_DEFINE = r"(?m)^#define STD_(\w+)[ \t]+(.+?)[ \t]*\r?$",
    }
    collect_defines(&STD_DEFINE, src)
}

/// `#define VK_STD_<name> <value>`
pub fn std_codec_defines(src: &str) -> Vec<Define<'_>> {
    static_regex! {
        STD_CODEC_DEFINE = r"(?m)^#define VK_STD_(\w+)[ \t]+(.+?)[ \t]*\r?$",
    }
    collect_defines(&STD_CODEC_DEFINE, src)
}

/// `#define VK_<name> <value>` where `<name>` starts or ends with one of
/// `vendors`, as in `VK_KHR_surface` or `VK_SHADER_UNUSED_KHR`.
pub fn vendor_defines<'a>(src: &'a str, vendors: &[&str]) -> Result<Vec<Define<'a>>, regex::Error> {
    let vendors = vendors.iter().map(|v| regex::escape(v)).join("|");
    let re = Regex::new(&format!(
        r"(?m)^#define[ \t]+VK_((?:(?:{vendors})_\w+)|(?:\w+?_(?:{vendors})))\b[ \t]*(.*?)[ \t]*\r?$"
    ))?;
    Ok(collect_defines(&re, src))
}
