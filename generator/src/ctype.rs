use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit1, hex_digit1, multispace0, multispace1, one_of},
    combinator::{all_consuming, eof, map, map_opt, map_res, opt, recognize, value},
    multi::{many1, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use crate::{
    config::BindingsConfig,
    util::NameExt,
};

/// Maps a C type spelling (after prefix stripping) to its C3 spelling.
fn lookup(t: &str) -> Option<&'static str> {
    Some(match t {
        "Bool32" => "uint",
        "float" => "float",
        "double" => "double",
        "size_t" => "usz",
        "int8_t" => "ichar",
        "int16_t" => "short",
        "int32_t" => "int",
        "int64_t" => "long",
        "int" => "CInt",
        "uint8_t" => "char",
        "uint16_t" => "ushort",
        "uint32_t" => "uint",
        "uint64_t" => "ulong",
        "char" => "ichar",
        "void" => "void",
        "void*" | "void *" => "any",
        "char*" | "uint8_t*" => "ZString",
        "uint32_t* const*" => "uint*[]",
        "char* const*" => "ZString*",
        "ObjectTableEntryNVX* const*" => "ObjectTableEntryNVX**",
        "void* const *" => "any*",
        "AccelerationStructureGeometryKHR* const*" => "AccelerationStructureGeometryKHR**",
        "AccelerationStructureBuildRangeInfoKHR* const*" => "AccelerationStructureBuildRangeInfoKHR**",
        "MicromapUsageEXT* const*" => "MicromapUsageEXT*[]",
        "struct BaseOutStructure" => "BaseOutStructure",
        "struct BaseInStructure" => "BaseInStructure",
        "struct wl_display" => "WLDisplay",
        "struct wl_surface" => "WLSurface",
        "Display" => "XlibDisplay",
        "Window" => "XlibWindow",
        "VisualID" => "XlibVisualID",
        "xcb_visualid_t" => "XCBVisualID",
        "xcb_connection_t" => "XCBConnection",
        "xcb_window_t" => "XCBWindow",
        "HANDLE" => "Win32_HANDLE",
        "HINSTANCE" => "Win32_HINSTANCE",
        "HWND" => "Win32_HWND",
        "HMONITOR" => "Win32_HMONITOR",
        "DWORD" => "Win32_DWORD",
        "LPCWSTR" => "Win32_LPCWSTR",
        "SECURITY_ATTRIBUTES" => "Win32_SECURITY_ATTRIBUTES",
        "LPCSTR" => "Win32_LPCSTR",
        _ => return None,
    })
}

/// Converts an already prefix-stripped C type. `const` qualifiers are
/// dropped and pointer depth is preserved.
pub fn convert_type(t: &str) -> String {
    if let Some(c3) = lookup(t) {
        c3.to_string()
    } else if let Some(rest) = t.strip_prefix("const ") {
        convert_type(rest)
    } else if let Some(rest) = t.strip_suffix('*') {
        format!("{}*", convert_type(rest))
    } else if let Some(rest) = t.strip_suffix(" const") {
        convert_type(rest)
    } else {
        t.to_string()
    }
}

/// Full conversion of a raw header type spelling.
pub fn binding_type(config: &BindingsConfig<'_>, c_type: &str) -> String {
    config.bits_to_flags(&convert_type(&c_type.strip_vk()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CType {
    Int,
    UInt,
    ULong,
}

impl CType {
    fn c3_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::UInt => "uint",
            Self::ULong => "ulong",
        }
    }
}

fn parse_int_suffix(i: &str) -> IResult<&str, CType> {
    alt((
        value(CType::ULong, tag_no_case("ULL")),
        value(CType::ULong, tag_no_case("UL")),
        value(CType::UInt, tag_no_case("U")),
        value(CType::Int, tag_no_case("LL")),
        value(CType::Int, tag_no_case("L")),
    ))(i)
}

fn parse_hex_digits(i: &str) -> IResult<&str, &str> {
    preceded(alt((tag("0x"), tag("0X"))), hex_digit1)(i)
}

fn parse_cfloat(i: &str) -> IResult<&str, &str> {
    terminated(recognize(tuple((digit1, char('.'), digit1))), opt(one_of("fF")))(i)
}

/// `(~0U)` => `~(uint)0`, `(~0U-1)` => `~(uint)0 - 1`
fn parse_inverse_number(i: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('('),
            pair(
                preceded(char('~'), pair(digit1, opt(parse_int_suffix))),
                opt(preceded(char('-'), digit1)),
            ),
            char(')'),
        ),
        |((num, ty), minus)| {
            let ty = ty.unwrap_or(CType::UInt).c3_name();
            match minus {
                Some(minus) => format!("~({ty}){num} - {minus}"),
                None => format!("~({ty}){num}"),
            }
        },
    )(i)
}

fn parse_c_literal(i: &str) -> IResult<&str, String> {
    alt((
        parse_inverse_number,
        map(parse_cfloat, str::to_string),
        map(terminated(parse_hex_digits, opt(parse_int_suffix)), |h| format!("0x{h}")),
        map(terminated(digit1, opt(parse_int_suffix)), str::to_string),
    ))(i)
}

/// Rewrites the value of a `#define`: drops a `VK_` prefix and turns C
/// numeric literals into C3 ones. Anything else is returned unchanged.
pub fn convert_define_value(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix("VK_").unwrap_or(value);
    match all_consuming(parse_c_literal)(value) {
        Ok((_, v)) => v,
        Err(_) => value.to_string(),
    }
}

/// An enum member value after prefix stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumLiteral<'a> {
    Hex(u64),
    Decimal(u64),
    Ident(&'a str),
}

fn parse_c_identifier(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == '_' || c.is_alphanumeric())(i)
}

pub fn parse_enum_literal(i: &str) -> Option<EnumLiteral<'_>> {
    let hex = map_res(terminated(parse_hex_digits, opt(parse_int_suffix)), |h| {
        u64::from_str_radix(h, 16).map(EnumLiteral::Hex)
    });
    let decimal = map_res(terminated(digit1, opt(parse_int_suffix)), |d: &str| {
        d.parse().map(EnumLiteral::Decimal)
    });
    let ident = map(parse_c_identifier, EnumLiteral::Ident);
    let (_, literal) = alt((
        terminated(hex, eof),
        terminated(decimal, eof),
        terminated(ident, eof),
    ))(i.trim())
    .ok()?;
    Some(literal)
}

/// A single C parameter, for example:
///
/// ```c
/// const VkAllocationCallbacks* pAllocator
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CParameter<'a> {
    pub ty: &'a str,
    pub name: &'a str,
    pub array_len: Option<&'a str>,
}

fn split_declaration(decl: &str) -> Option<(&str, &str)> {
    let decl = decl.trim_end();
    let split = decl.rfind(|c: char| !(c == '_' || c.is_alphanumeric()))?;
    let (ty, name) = decl.split_at(split + 1);
    let ty = ty.trim();
    (!ty.is_empty() && !name.is_empty()).then_some((ty, name))
}

fn parse_c_parameter(i: &str) -> IResult<&str, CParameter<'_>> {
    map_opt(
        preceded(
            multispace0,
            pair(
                recognize(many1(alt((parse_c_identifier, tag("*"), multispace1)))),
                opt(delimited(char('['), parse_c_identifier, char(']'))),
            ),
        ),
        |(decl, array_len)| {
            let (ty, name) = split_declaration(decl)?;
            Some(CParameter { ty, name, array_len })
        },
    )(i)
}

/// Parses the parameter list of a function pointer typedef. `(void)` yields
/// an empty list.
pub fn parse_c_parameters(list: &str) -> Option<Vec<CParameter<'_>>> {
    if list.trim() == "void" {
        return Some(Vec::new());
    }
    all_consuming(separated_list1(char(','), terminated(parse_c_parameter, multispace0)))(list)
        .ok()
        .map(|(_, params)| params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VK_CONFIG;

    #[test]
    fn converts_types() {
        assert_eq!(binding_type(&VK_CONFIG, "const VkDeviceMemory*"), "DeviceMemory*");
        assert_eq!(binding_type(&VK_CONFIG, "uint32_t"), "uint");
        assert_eq!(binding_type(&VK_CONFIG, "const char* const*"), "ZString*");
        assert_eq!(binding_type(&VK_CONFIG, "const void*"), "any");
        assert_eq!(binding_type(&VK_CONFIG, "void**"), "any*");
        assert_eq!(binding_type(&VK_CONFIG, "struct VkBaseOutStructure*"), "BaseOutStructure*");
        assert_eq!(binding_type(&VK_CONFIG, "struct wl_display*"), "WLDisplay*");
        assert_eq!(binding_type(&VK_CONFIG, "VkCullModeFlagBits"), "CullModeFlags");
        assert_eq!(binding_type(&VK_CONFIG, "const VkFoo* const*"), "Foo**");
        assert_eq!(binding_type(&VK_CONFIG, "HWND"), "Win32_HWND");
    }

    #[test]
    fn converts_define_values() {
        assert_eq!(convert_define_value("(~0U)"), "~(uint)0");
        assert_eq!(convert_define_value("(~0ULL)"), "~(ulong)0");
        assert_eq!(convert_define_value("(~0U-1)"), "~(uint)0 - 1");
        assert_eq!(convert_define_value("256U"), "256");
        assert_eq!(convert_define_value("1000.0F"), "1000.0");
        assert_eq!(convert_define_value("VK_LUID_SIZE"), "LUID_SIZE");
        assert_eq!(convert_define_value("\"VK_KHR_surface\""), "\"VK_KHR_surface\"");
    }

    #[test]
    fn parses_enum_literals() {
        assert_eq!(parse_enum_literal("0x00000004"), Some(EnumLiteral::Hex(4)));
        assert_eq!(parse_enum_literal("0x100000000ULL"), Some(EnumLiteral::Hex(1 << 32)));
        assert_eq!(parse_enum_literal("0"), Some(EnumLiteral::Decimal(0)));
        assert_eq!(parse_enum_literal("1_BIT"), Some(EnumLiteral::Ident("1_BIT")));
        assert_eq!(parse_enum_literal("FRONT_BIT"), Some(EnumLiteral::Ident("FRONT_BIT")));
        assert_eq!(parse_enum_literal("(1 << 3)"), None);
    }

    #[test]
    fn parses_parameters() {
        let params = parse_c_parameters(
            "VkCommandBuffer commandBuffer, const float blendConstants[4], const VkAllocationCallbacks* pAllocator",
        )
        .unwrap();
        assert_eq!(
            params,
            vec![
                CParameter { ty: "VkCommandBuffer", name: "commandBuffer", array_len: None },
                CParameter { ty: "const float", name: "blendConstants", array_len: Some("4") },
                CParameter { ty: "const VkAllocationCallbacks*", name: "pAllocator", array_len: None },
            ]
        );
    }

    #[test]
    fn parses_multiline_callback_parameters() {
        let params = parse_c_parameters(
            "\n    void*                                       pUserData,\n    size_t                                      size)",
        );
        assert!(params.is_none());
        let params = parse_c_parameters(
            "\n    void*                                       pUserData,\n    size_t                                      size",
        )
        .unwrap();
        assert_eq!(params[0], CParameter { ty: "void*", name: "pUserData", array_len: None });
        assert_eq!(params[1].ty, "size_t");
    }

    #[test]
    fn void_parameter_list_is_empty() {
        assert_eq!(parse_c_parameters("void"), Some(Vec::new()));
    }
}
