use std::collections::HashSet;
use crate::{
    config::BindingsConfig,
    ctype::convert_define_value,
    extract::{self, Define},
    util::{column_width, lines},
};

pub const CORE_PREAMBLE: &str = include_str!("../templates/core.c3i");

/// Names of the `const` declarations in a block of C3 source.
pub fn declared_constants(c3: &str) -> impl Iterator<Item = &str> {
    static_regex! {
        CONST = r"(?m)^const\s+(?:\w+\s+)?(\w+)\s*=",
    }
    CONST.captures_iter(c3)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

fn constant_block<'a>(title: &str, defines: impl IntoIterator<Item = Define<'a>>) -> String {
    let defines: Vec<(String, String)> = defines
        .into_iter()
        .map(|d| (d.name.to_uppercase(), convert_define_value(d.value)))
        .collect();
    let width = column_width(defines.iter().map(|(n, _)| n));
    let body = lines(defines.iter().map(|(name, value)| format!("const {:width$} = {};", name, value)));
    format!("// {title}\n{body}")
}

/// `#define` constants that go in `core.c3i`. Vendor constants whose name is
/// in `declared` (the fixed preamble, enum members) are left out, as are
/// repeated names.
pub fn write_constants(config: &BindingsConfig<'_>, src: &str, declared: &HashSet<String>) -> Result<String, regex::Error> {
    let general = extract::vk_defines(src)
        .into_iter()
        .filter(|d| config.constants.general.contains(&d.name));
    let video = extract::std_defines(src);
    let codec = extract::std_codec_defines(src)
        .into_iter()
        .filter(|d| config.constants.codec_suffixes.iter().any(|s| d.name.ends_with(s)));

    let mut seen = HashSet::new();
    let vendor = extract::vendor_defines(src, config.vendor_suffixes)?
        .into_iter()
        .filter(|d| {
            let name = d.name.to_uppercase();
            if d.value.is_empty() {
                trace!("skipping valueless define VK_{}", d.name);
                false
            } else if declared.contains(&name) {
                debug!("skipping VK_{}, {} is already declared", d.name, &name);
                false
            } else {
                seen.insert(name)
            }
        })
        .collect::<Vec<_>>();

    Ok([
        constant_block("General Constants", general),
        constant_block("Vulkan Video Constants", video),
        constant_block("Vulkan Video Codec Constants", codec),
        constant_block("Vendor Constants", vendor),
    ]
    .join("\n")
        + "\n")
}

/// Dispatchable handles wrap `Handle`, the rest `NonDispatchableHandle`.
pub fn write_handles(src: &str) -> String {
    let handles = extract::handles(src);
    let block = |names: &[&str], base: &str| {
        let width = column_width(names);
        lines(names.iter().map(|h| format!("distinct {:width$} = {};", h, base)))
    };
    format!(
        "// Handles types\n{}{}",
        block(&handles.dispatchable, "Handle"),
        block(&handles.non_dispatchable, "NonDispatchableHandle"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VK_CONFIG;

    const SRC: &str = r#"
#define VK_HEADER_VERSION 303
#define VK_HEADER_VERSION_COMPLETE VK_MAKE_API_VERSION(0, 1, 4, VK_HEADER_VERSION)
#define VK_MAX_DRIVER_NAME_SIZE           256U
#define STD_VIDEO_H264_CPB_CNT_LIST_SIZE 32
#define VK_STD_VULKAN_VIDEO_CODEC_H264_DECODE_EXTENSION_NAME "VK_STD_vulkan_video_codec_h264_decode"
#define VK_STD_VULKAN_VIDEO_CODEC_H264_DECODE_SPEC_VERSION VK_STD_VULKAN_VIDEO_CODEC_H264_DECODE_API_VERSION_1_0_0
#define VK_KHR_surface 1
#define VK_KHR_SURFACE_EXTENSION_NAME     "VK_KHR_surface"
#define VK_QUEUE_FAMILY_FOREIGN_EXT       (~2U)
#define VK_MAX_GLOBAL_PRIORITY_SIZE_EXT   VK_MAX_GLOBAL_PRIORITY_SIZE
VK_DEFINE_HANDLE(VkInstance)
VK_DEFINE_HANDLE(VkPhysicalDevice)
VK_DEFINE_NON_DISPATCHABLE_HANDLE(VkSurfaceKHR)
"#;

    #[test]
    fn preamble_constants_are_found() {
        let names: HashSet<&str> = declared_constants(CORE_PREAMBLE).collect();
        assert!(names.contains("WHOLE_SIZE"));
        assert!(names.contains("MAX_GLOBAL_PRIORITY_SIZE_EXT"));
        assert!(declared_constants("const Format FORMAT_UNDEFINED = 0;").eq(["FORMAT_UNDEFINED"]));
    }

    #[test]
    fn writes_constant_blocks() {
        let declared = declared_constants(CORE_PREAMBLE).map(str::to_string).collect();
        let out = write_constants(&VK_CONFIG, SRC, &declared).unwrap();
        assert_eq!(
            out,
            r#"// General Constants
const HEADER_VERSION       = 303;
const MAX_DRIVER_NAME_SIZE = 256;

// Vulkan Video Constants
const VIDEO_H264_CPB_CNT_LIST_SIZE = 32;

// Vulkan Video Codec Constants
const VULKAN_VIDEO_CODEC_H264_DECODE_EXTENSION_NAME = "VK_STD_vulkan_video_codec_h264_decode";

// Vendor Constants
const KHR_SURFACE                = 1;
const KHR_SURFACE_EXTENSION_NAME = "VK_KHR_surface";
const QUEUE_FAMILY_FOREIGN_EXT   = ~(uint)2;

"#
        );
    }

    #[test]
    fn writes_handles() {
        assert_eq!(
            write_handles(SRC),
            "// Handles types\n\
             distinct Instance       = Handle;\n\
             distinct PhysicalDevice = Handle;\n\
             distinct SurfaceKHR = NonDispatchableHandle;\n"
        );
    }
}
