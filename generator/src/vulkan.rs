use crate::config::*;

const fn header<'a>(file: &'a str, upstream_path: &'a str, parse: bool) -> HeaderSource<'a> {
    HeaderSource {
        file,
        upstream_path,
        parse,
    }
}

pub const VK_CONFIG: BindingsConfig<'static> = BindingsConfig {
    module_name: "vk",
    include_root: "https://raw.githubusercontent.com/KhronosGroup/Vulkan-Headers/main/include/",
    headers: &[
        header("vk_platform.h", "vulkan/vk_platform.h", false),
        header("vulkan_core.h", "vulkan/vulkan_core.h", true),
        header("vk_layer.h", "vulkan/vk_layer.h", false),
        header("vk_icd.h", "vulkan/vk_icd.h", false),
        header("vulkan_win32.h", "vulkan/vulkan_win32.h", true),
        header("vulkan_metal.h", "vulkan/vulkan_metal.h", true),
        header("vulkan_macos.h", "vulkan/vulkan_macos.h", true),
        header("vulkan_ios.h", "vulkan/vulkan_ios.h", true),
        header("vulkan_wayland.h", "vulkan/vulkan_wayland.h", true),
        header("vulkan_xlib.h", "vulkan/vulkan_xlib.h", true),
        header("vulkan_xcb.h", "vulkan/vulkan_xcb.h", true),
        // Vulkan Video
        header("vulkan_video_codec_av1std.h", "vk_video/vulkan_video_codec_av1std.h", true),
        header("vulkan_video_codec_av1std_decode.h", "vk_video/vulkan_video_codec_av1std_decode.h", true),
        header("vulkan_video_codec_av1std_encode.h", "vk_video/vulkan_video_codec_av1std_encode.h", true),
        header("vulkan_video_codec_h264std.h", "vk_video/vulkan_video_codec_h264std.h", true),
        header("vulkan_video_codec_h264std_decode.h", "vk_video/vulkan_video_codec_h264std_decode.h", true),
        header("vulkan_video_codec_h264std_encode.h", "vk_video/vulkan_video_codec_h264std_encode.h", true),
        header("vulkan_video_codec_h265std.h", "vk_video/vulkan_video_codec_h265std.h", true),
        header("vulkan_video_codec_h265std_decode.h", "vk_video/vulkan_video_codec_h265std_decode.h", true),
        header("vulkan_video_codec_h265std_encode.h", "vk_video/vulkan_video_codec_h265std_encode.h", true),
    ],
    vendor_suffixes: &[
        "KHR",
        "EXT",
        "AMD",
        "NV",
        "NVX",
        "GOOGLE",
        "KHX",
    ],
    flag_suffixes: ("FlagBits", "Flags"),
    result_type: "Result",
    constants: ConstantsConfig {
        general: &[
            "HEADER_VERSION",
            "MAX_DRIVER_NAME_SIZE",
            "MAX_DRIVER_INFO_SIZE",
        ],
        codec_suffixes: &[
            "_EXTENSION_NAME",
        ],
    },
    functions: FunctionsConfig {
        known_fns: &[
            ("ProcGetInstanceProcAddr", DispatchGroup::Loader),
            ("ProcGetDeviceProcAddr", DispatchGroup::Instance),
        ],
        dispatch_types: &[
            ("Instance", DispatchGroup::Instance),
            ("PhysicalDevice", DispatchGroup::Instance),
            ("Device", DispatchGroup::Device),
            ("Queue", DispatchGroup::Device),
            ("CommandBuffer", DispatchGroup::Device),
        ],
        misc_types: &[
            "DebugReportFlagsEXT",
        ],
    },
};
